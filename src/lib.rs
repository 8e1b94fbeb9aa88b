//! # Redfish Exporter
//!
//! Polls hardware management controllers over their Redfish REST API and
//! republishes the readings as a pull-based text metrics feed.
//!
//! ## Features
//!
//! - **Single-flight collection**: one remote fetch per target and metric
//!   group selection at a time, shared by every concurrent scrape
//! - **Metric groups**: system, sensors, power, event log, storage and memory,
//!   each enabled independently
//! - **Collector cache**: clients are bound once per target and reused until
//!   an explicit reset
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use redfish_exporter::{
//!     start_web_server, AppState, CollectorRegistry, ExporterConfig, RedfishBinder, WebConfig,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(ExporterConfig::load("/etc/prometheus/idrac.yml")?);
//!     let binder = Arc::new(RedfishBinder::new(config.clone())?);
//!     let registry = Arc::new(CollectorRegistry::new(config.clone(), binder));
//!
//!     start_web_server(WebConfig::from_config(&config), AppState::new(registry)).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod redfish;
pub mod web;

// Re-export public API
pub use config::{CollectConfig, ExporterConfig, HostConfig};
pub use error::{ExporterError, Result};
pub use metrics::{
    ClientBinder, Collector, CollectorRegistry, MetricGroup, MetricGroupType, RemoteClient,
    SampleSink,
};
pub use redfish::{RedfishBinder, RedfishClient};
pub use web::{start_web_server, AppState, WebConfig};

/// The default web server port
pub const DEFAULT_PORT: u16 = 9348;

/// The default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/prometheus/idrac.yml";
