//! Error handling for the Redfish exporter crate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// A specialized `Result` type for exporter operations.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// The main error type for exporter operations.
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// Bad or missing query parameter
    #[error("{0}")]
    Parameter(String),

    /// Connecting to the management controller failed
    #[error("Failed to bind client for host {target}: {message}")]
    ClientBind { target: String, message: String },

    /// A single metric group could not be refreshed
    #[error("Failed to refresh metric group {group}: {message}")]
    GroupRefresh { group: String, message: String },

    /// A specifically requested metric group is disabled in the configuration
    #[error("The requested metric group '{0}' isn't enabled")]
    GroupDisabled(String),

    /// Rendering the collected samples failed
    #[error("Failed to serialize metrics: {0}")]
    Serialization(String),

    /// Waiting on a collection cycle exceeded its bound
    #[error("Timed out after {seconds}s waiting for metrics of host {target}")]
    GatherTimeout { target: String, seconds: u64 },

    /// HTTP transport error talking to the management controller
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),
}

impl ExporterError {
    /// Create a new parameter error
    pub fn parameter_error(msg: impl Into<String>) -> Self {
        Self::Parameter(msg.into())
    }

    /// Create a new client binding error
    pub fn bind_error(target: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ClientBind {
            target: target.into(),
            message: msg.into(),
        }
    }

    /// Create a new metric group refresh error
    pub fn refresh_error(group: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::GroupRefresh {
            group: group.into(),
            message: msg.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// HTTP status an error turns into when it reaches a handler.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Parameter(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ExporterError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_errors_are_client_errors() {
        let err = ExporterError::parameter_error("Query parameter 'target' is mandatory");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Query parameter 'target' is mandatory");
    }

    #[test]
    fn test_other_errors_are_server_errors() {
        let err = ExporterError::bind_error("10.0.0.1", "connection refused");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("10.0.0.1"));

        let err = ExporterError::GroupDisabled("power".to_string());
        assert!(err.to_string().contains("power"));
    }
}
