//! HTTP surface of the exporter.
//!
//! Exposes `/metrics` and `/reset`, both taking `target` and `metric_group`
//! query parameters, plus a `/health` probe.

pub mod config;
pub mod handlers;
pub mod params;
pub mod router;

// Re-export commonly used items
pub use config::WebConfig;
pub use params::{gzip_accepted, metric_group_name, parse_metric_group, resolve_target};
pub use router::create_app;

use crate::config::ExporterConfig;
use crate::error::{ExporterError, Result};
use crate::metrics::CollectorRegistry;
use std::sync::Arc;
use tracing::info;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CollectorRegistry>,
    pub config: Arc<ExporterConfig>,
}

impl AppState {
    pub fn new(registry: Arc<CollectorRegistry>) -> Self {
        let config = Arc::clone(registry.config());
        Self { registry, config }
    }
}

/// Start the web server and serve until it fails.
pub async fn start_web_server(config: WebConfig, state: AppState) -> Result<()> {
    let app = create_app(state);
    let addr = config.bind_address();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ExporterError::web_server_error(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Listening on http://{}", addr);
    info!("Metrics endpoint: http://{}/metrics?target=<host>", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ExporterError::web_server_error(format!("Server error: {}", e)))?;

    Ok(())
}
