//! Web server configuration.

use crate::config::ExporterConfig;

/// Where the HTTP server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    /// Host to bind the server to
    pub host: String,
    /// Port to bind the server to
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: crate::DEFAULT_PORT,
        }
    }
}

impl WebConfig {
    /// Create a new web configuration with custom host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Listen address taken from the exporter configuration.
    pub fn from_config(config: &ExporterConfig) -> Self {
        Self::new(&config.address, config.port)
    }

    /// Set the host for the web server.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port for the web server.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Get the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let config = ExporterConfig {
            address: "127.0.0.1".to_string(),
            ..Default::default()
        };
        let web = WebConfig::from_config(&config).with_port(9100);
        assert_eq!(web.bind_address(), "127.0.0.1:9100");
        assert_eq!(WebConfig::default().with_host("::").port, crate::DEFAULT_PORT);
    }
}
