//! Query parameter and header handling shared by the handlers.

use crate::error::{ExporterError, Result};
use crate::metrics::MetricGroupType;
use axum::http::header::ACCEPT_ENCODING;
use axum::http::HeaderMap;
use serde::Deserialize;

/// Query string accepted by `/metrics` and `/reset`.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeParams {
    pub target: Option<String>,
    pub metric_group: Option<String>,
}

impl ScrapeParams {
    /// Resolve the effective target and metric group of a request.
    pub fn resolve(&self, single_host: Option<&str>) -> Result<(String, MetricGroupType)> {
        let target = resolve_target(self.target.as_deref(), single_host)?;
        let group = parse_metric_group(self.metric_group.as_deref())?;
        Ok((target, group))
    }
}

/// Pick the target to scrape.
///
/// With a single-host override the target may be omitted, but if present
/// it must equal the override.
pub fn resolve_target(target: Option<&str>, single_host: Option<&str>) -> Result<String> {
    let target = target.unwrap_or_default();
    match (target.is_empty(), single_host) {
        (true, None) => Err(ExporterError::parameter_error(
            "Query parameter 'target' is mandatory",
        )),
        (true, Some(forced)) => Ok(forced.to_string()),
        (false, Some(forced)) if target != forced => Err(ExporterError::parameter_error(format!(
            "Query parameter 'target' must be either omitted or set to {}",
            forced
        ))),
        (false, _) => Ok(target.to_string()),
    }
}

/// Parse the `metric_group` parameter; absent means every group.
pub fn parse_metric_group(value: Option<&str>) -> Result<MetricGroupType> {
    value.unwrap_or_default().parse()
}

/// Name of a selector as accepted by [`parse_metric_group`].
pub fn metric_group_name(group: MetricGroupType) -> &'static str {
    group.as_str()
}

/// Whether an `Accept-Encoding` value lists gzip.
pub fn gzip_accepted(accept_encoding: &str) -> bool {
    accept_encoding
        .split(',')
        .map(str::trim)
        .any(|part| part == "gzip" || part.starts_with("gzip;"))
}

/// [`gzip_accepted`] applied to the request headers.
pub fn gzip_requested(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(gzip_accepted)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_target() {
        assert!(resolve_target(None, None).is_err());
        assert!(resolve_target(Some(""), None).is_err());
        assert_eq!(resolve_target(None, Some("bmc-01")).unwrap(), "bmc-01");
        assert_eq!(resolve_target(Some("bmc-01"), Some("bmc-01")).unwrap(), "bmc-01");
        assert_eq!(resolve_target(Some("10.0.0.9"), None).unwrap(), "10.0.0.9");

        let err = resolve_target(Some("bmc-02"), Some("bmc-01")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Query parameter 'target' must be either omitted or set to bmc-01"
        );
    }

    #[test]
    fn test_metric_group_names_round_trip() {
        for group in std::iter::once(MetricGroupType::Any).chain(MetricGroupType::GROUPS) {
            let name = metric_group_name(group);
            assert_eq!(parse_metric_group(Some(name)).unwrap(), group);
        }
        assert_eq!(parse_metric_group(None).unwrap(), MetricGroupType::Any);
        assert!(parse_metric_group(Some("fans")).is_err());
    }

    #[test]
    fn test_gzip_accepted() {
        assert!(gzip_accepted("gzip"));
        assert!(gzip_accepted("deflate, gzip"));
        assert!(gzip_accepted("gzip;q=0.5"));
        assert!(!gzip_accepted(""));
        assert!(!gzip_accepted("identity"));
        assert!(!gzip_accepted("x-gzip"));
    }

    #[test]
    fn test_gzip_requested_without_header() {
        let mut headers = HeaderMap::new();
        assert!(!gzip_requested(&headers));
        headers.insert(ACCEPT_ENCODING, "br, gzip".parse().unwrap());
        assert!(gzip_requested(&headers));
    }
}
