//! HTTP handlers for the exporter endpoints.

use crate::error::{ExporterError, Result};
use crate::metrics::render::TEXT_CONTENT_TYPE;
use crate::metrics::MetricGroupType;
use crate::web::params::{gzip_requested, metric_group_name, ScrapeParams};
use crate::web::AppState;
use axum::{
    extract::{Query, State},
    http::{
        header::{CONTENT_ENCODING, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use tracing::{debug, error};

fn log_suffix(group: MetricGroupType) -> String {
    match group {
        MetricGroupType::Any => " (all metric groups)".to_string(),
        group => format!(" ({})", metric_group_name(group)),
    }
}

fn resolve(state: &AppState, params: &ScrapeParams) -> Result<(String, MetricGroupType)> {
    params.resolve(state.config.single_host()).map_err(|e| {
        error!("Rejected request: {}", e);
        e
    })
}

/// Collect and return the metrics of a target.
pub async fn metrics(
    State(state): State<AppState>,
    Query(params): Query<ScrapeParams>,
    headers: HeaderMap,
) -> Result<Response> {
    let (target, group) = resolve(&state, &params)?;
    debug!("Handling request for host {}{}", target, log_suffix(group));

    let collector = state.registry.get(&target, group).await.map_err(|e| {
        error!("Error instantiating metrics collector for host {}: {}", target, e);
        e
    })?;

    debug!("Collecting metrics for host {}", target);
    let text = collector.gather().await.map_err(|e| {
        error!("Error collecting metrics for host {}: {}", target, e);
        e
    })?;
    debug!("Metrics for host {} collected", target);

    if gzip_requested(&headers) {
        let body = gzip(text.as_bytes())?;
        return Ok((
            [(CONTENT_TYPE, TEXT_CONTENT_TYPE), (CONTENT_ENCODING, "gzip")],
            body,
        )
            .into_response());
    }

    Ok(([(CONTENT_TYPE, TEXT_CONTENT_TYPE)], text).into_response())
}

/// Drop the cached collector of a target so the next scrape reconnects.
pub async fn reset(
    State(state): State<AppState>,
    Query(params): Query<ScrapeParams>,
) -> Result<StatusCode> {
    let (target, group) = resolve(&state, &params)?;
    debug!("Handling reset-request for host {}{}", target, log_suffix(group));

    state.registry.reset(&target, group);
    Ok(StatusCode::OK)
}

/// Liveness probe.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 4), Compression::default());
    encoder.write_all(data)?;
    encoder
        .finish()
        .map_err(|e| ExporterError::serialization_error(format!("gzip: {}", e)))
}
