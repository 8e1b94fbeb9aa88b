//! Exporter configuration loaded from a YAML file.

use crate::error::{ExporterError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Credentials used to talk to one management controller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Per-group enablement flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectConfig {
    #[serde(default = "enabled")]
    pub system: bool,
    #[serde(default = "enabled")]
    pub sensors: bool,
    #[serde(default = "enabled")]
    pub sel: bool,
    #[serde(default = "enabled")]
    pub power: bool,
    #[serde(default = "enabled")]
    pub storage: bool,
    #[serde(default = "enabled")]
    pub memory: bool,
}

fn enabled() -> bool {
    true
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            system: true,
            sensors: true,
            sel: true,
            power: true,
            storage: true,
            memory: true,
        }
    }
}

/// Root configuration of the exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Address to bind the HTTP server to
    #[serde(default = "default_address")]
    pub address: String,
    /// Port to bind the HTTP server to
    #[serde(default = "default_port")]
    pub port: u16,
    /// Timeout in seconds for a single request to a management controller
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Upper bound in seconds a scrape waits on a collection cycle
    #[serde(default = "default_gather_timeout")]
    pub gather_timeout: u64,
    /// Namespace prefix of every exported metric
    #[serde(default = "default_metrics_prefix")]
    pub metrics_prefix: String,
    /// When set, the only target this exporter answers for
    #[serde(default)]
    pub single_host: String,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub collect: CollectConfig,
    /// Credentials per host; the `default` entry applies to unlisted hosts
    #[serde(default)]
    pub hosts: HashMap<String, HostConfig>,
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    crate::DEFAULT_PORT
}

fn default_timeout() -> u64 {
    10
}

fn default_gather_timeout() -> u64 {
    60
}

fn default_metrics_prefix() -> String {
    "idrac".to_string()
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            timeout: default_timeout(),
            gather_timeout: default_gather_timeout(),
            metrics_prefix: default_metrics_prefix(),
            single_host: String::new(),
            verbose: false,
            collect: CollectConfig::default(),
            hosts: HashMap::new(),
        }
    }
}

impl ExporterConfig {
    /// Read, override from the environment and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExporterError::config_error(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration document without touching the environment.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ExporterError::config_error(format!("Invalid configuration: {}", e)))
    }

    /// Apply `CONFIG_*` overrides looked up through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup("CONFIG_ADDRESS") {
            self.address = address;
        }
        if let Some(port) = lookup("CONFIG_PORT").and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(prefix) = lookup("CONFIG_METRICS_PREFIX") {
            self.metrics_prefix = prefix;
        }
        if let Some(host) = lookup("CONFIG_SINGLE_HOST") {
            self.single_host = host;
        }

        let username = lookup("CONFIG_DEFAULT_USERNAME");
        let password = lookup("CONFIG_DEFAULT_PASSWORD");
        if username.is_some() || password.is_some() {
            let default = self.hosts.entry("default".to_string()).or_default();
            if let Some(username) = username {
                default.username = username;
            }
            if let Some(password) = password {
                default.password = password;
            }
        }
    }

    /// Check invariants the rest of the exporter relies on.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ExporterError::config_error("port must be non-zero"));
        }
        if !is_valid_prefix(&self.metrics_prefix) {
            return Err(ExporterError::config_error(format!(
                "metrics_prefix '{}' is not a valid metric name",
                self.metrics_prefix
            )));
        }
        if self.gather_timeout == 0 {
            return Err(ExporterError::config_error("gather_timeout must be non-zero"));
        }
        Ok(())
    }

    /// The single-target override, if configured.
    pub fn single_host(&self) -> Option<&str> {
        if self.single_host.is_empty() {
            None
        } else {
            Some(&self.single_host)
        }
    }

    /// Credentials for `target`, falling back to the `default` entry.
    pub fn credentials(&self, target: &str) -> Option<&HostConfig> {
        self.hosts.get(target).or_else(|| self.hosts.get("default"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn gather_timeout(&self) -> Duration {
        Duration::from_secs(self.gather_timeout)
    }

    /// Copy of this configuration safe to print.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for host in config.hosts.values_mut() {
            if !host.password.is_empty() {
                host.password = "********".to_string();
            }
        }
        config
    }
}

fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        // An empty prefix yields bare subsystem names.
        None => true,
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        Some(_) => false,
    }
}
