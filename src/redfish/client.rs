//! HTTP client for a single Redfish controller.

use crate::config::{ExporterConfig, HostConfig};
use crate::error::{ExporterError, Result};
use crate::metrics::data::SampleSink;
use crate::metrics::groups::{
    EventLogMetricGroup, MemoryMetricGroup, PowerMetricGroup, SensorsMetricGroup,
    StorageMetricGroup, SystemMetricGroup,
};
use crate::metrics::traits::{ClientBinder, RemoteClient};
use crate::redfish::models::{
    Collection, ComputerSystem, Drive, LogEntries, MemoryModule, Power, StorageController,
    Thermal,
};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

const SYSTEMS: &str = "/redfish/v1/Systems";
const CHASSIS: &str = "/redfish/v1/Chassis";
const MANAGERS: &str = "/redfish/v1/Managers";

/// Base URL for a target given as a host, `host:port` or full URL.
pub fn base_url(target: &str) -> String {
    let target = target.trim_end_matches('/');
    if target.contains("://") {
        target.to_string()
    } else {
        format!("https://{}", target)
    }
}

/// Client bound to the first system, chassis and manager of a controller.
pub struct RedfishClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    system_path: String,
    chassis_path: String,
    manager_path: String,
}

impl RedfishClient {
    /// Discover the resource paths of the target.
    pub async fn connect(http: reqwest::Client, target: &str, credentials: &HostConfig) -> Result<Self> {
        let mut client = Self {
            http,
            base_url: base_url(target),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            system_path: String::new(),
            chassis_path: String::new(),
            manager_path: String::new(),
        };

        client.system_path = client.first_member(SYSTEMS).await?;
        client.chassis_path = client.first_member(CHASSIS).await?;
        client.manager_path = client.first_member(MANAGERS).await?;

        info!(
            "Connected to {} (system {}, chassis {}, manager {})",
            client.base_url, client.system_path, client.chassis_path, client.manager_path
        );
        Ok(client)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let body = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn first_member(&self, path: &str) -> Result<String> {
        let collection: Collection = self.get(path).await?;
        collection
            .first_member()
            .map(str::to_string)
            .ok_or_else(|| ExporterError::bind_error(&self.base_url, format!("{} has no members", path)))
    }

    async fn members(&self, path: &str) -> Result<Vec<String>> {
        let collection: Collection = self.get(path).await?;
        Ok(collection
            .members
            .into_iter()
            .map(|link| link.odata_id)
            .filter(|id| !id.is_empty())
            .collect())
    }
}

#[async_trait]
impl RemoteClient for RedfishClient {
    async fn refresh_system(&self, group: &SystemMetricGroup, sink: &mut SampleSink) -> Result<()> {
        let system: ComputerSystem = self.get(&self.system_path).await?;
        system.emit(group, sink);
        Ok(())
    }

    async fn refresh_sensors(&self, group: &SensorsMetricGroup, sink: &mut SampleSink) -> Result<()> {
        let thermal: Thermal = self.get(&format!("{}/Thermal", self.chassis_path)).await?;
        thermal.emit(group, sink);
        Ok(())
    }

    async fn refresh_power(&self, group: &PowerMetricGroup, sink: &mut SampleSink) -> Result<()> {
        let power: Power = self.get(&format!("{}/Power", self.chassis_path)).await?;
        power.emit(group, sink);
        Ok(())
    }

    async fn refresh_event_log(&self, group: &EventLogMetricGroup, sink: &mut SampleSink) -> Result<()> {
        let path = format!("{}/LogServices/Sel/Entries", self.manager_path);
        let entries: LogEntries = self.get(&path).await?;
        entries.emit(group, sink);
        Ok(())
    }

    async fn refresh_storage(&self, group: &StorageMetricGroup, sink: &mut SampleSink) -> Result<()> {
        for controller_path in self.members(&format!("{}/Storage", self.system_path)).await? {
            let controller: StorageController = self.get(&controller_path).await?;
            for link in &controller.drives {
                let drive: Drive = self.get(&link.odata_id).await?;
                drive.emit(group, sink);
            }
        }
        Ok(())
    }

    async fn refresh_memory(&self, group: &MemoryMetricGroup, sink: &mut SampleSink) -> Result<()> {
        for module_path in self.members(&format!("{}/Memory", self.system_path)).await? {
            let module: MemoryModule = self.get(&module_path).await?;
            if module.is_absent() {
                continue;
            }
            module.emit(group, sink);
        }
        Ok(())
    }
}

/// Binds [`RedfishClient`]s using the configured credentials.
pub struct RedfishBinder {
    config: Arc<ExporterConfig>,
    http: reqwest::Client,
}

impl RedfishBinder {
    pub fn new(config: Arc<ExporterConfig>) -> Result<Self> {
        // Controllers ship self-signed certificates.
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl ClientBinder for RedfishBinder {
    async fn bind(&self, target: &str) -> Result<Arc<dyn RemoteClient>> {
        let credentials = self
            .config
            .credentials(target)
            .ok_or_else(|| ExporterError::bind_error(target, "no credentials configured"))?;

        let client = RedfishClient::connect(self.http.clone(), target, credentials)
            .await
            .map_err(|e| match e {
                ExporterError::ClientBind { .. } => e,
                other => ExporterError::bind_error(target, other.to_string()),
            })?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("10.0.0.5"), "https://10.0.0.5");
        assert_eq!(base_url("bmc-01:8443"), "https://bmc-01:8443");
        assert_eq!(base_url("http://127.0.0.1:8000/"), "http://127.0.0.1:8000");
    }

    #[tokio::test]
    async fn test_bind_without_credentials() {
        let binder = RedfishBinder::new(Arc::new(ExporterConfig::default())).unwrap();
        let err = binder.bind("bmc-01").await.err().unwrap();
        assert!(matches!(err, ExporterError::ClientBind { .. }));
        assert!(err.to_string().contains("no credentials configured"));
    }
}
