//! Error taxonomy shared by the embedding client, persistence layer, HTTP
//! API, and CLI.
//!
//! Library code returns [`Error`] values instead of panicking; the HTTP layer
//! converts each kind into a status code plus a JSON body, and the CLI
//! converts them into console messages with a non-zero exit code. Nothing is
//! retried and nothing is swallowed — every external-call failure surfaces
//! immediately to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad or missing settings, detected at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Empty or out-of-range request fields.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The embedding endpoint answered with a non-success response.
    /// Includes the "model missing" sub-case with remediation text.
    #[error("embedding endpoint error: {0}")]
    Endpoint(String),

    /// Network or timeout failure talking to the embedding endpoint.
    /// Distinguished from permanent configuration errors so a caller can
    /// decide whether to retry; this crate itself never retries.
    #[error("transient error: {0}")]
    Transient(String),

    /// No record matched the lookup.
    #[error("not found: {0}")]
    NotFound(String),

    /// Persistence failure from the database driver.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    /// Machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::InvalidInput(_) => "invalid_input",
            Error::Endpoint(_) => "embedding_endpoint",
            Error::Transient(_) => "upstream_unavailable",
            Error::NotFound(_) => "not_found",
            Error::Database(_) => "database",
        }
    }

    /// HTTP status for this error kind: validation errors map to 4xx,
    /// embedding/persistence failures to 5xx.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Endpoint(_) => StatusCode::BAD_GATEWAY,
            Error::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Configuration(_) | Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_4xx() {
        assert_eq!(
            Error::InvalidInput("limit out of range".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::NotFound("no such section".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_upstream_errors_are_5xx() {
        assert!(Error::Endpoint("model missing".into())
            .status()
            .is_server_error());
        assert!(Error::Transient("timed out".into())
            .status()
            .is_server_error());
        assert!(Error::Configuration("bad dim".into())
            .status()
            .is_server_error());
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(Error::InvalidInput(String::new()).code(), "invalid_input");
        assert_eq!(Error::NotFound(String::new()).code(), "not_found");
        assert_eq!(Error::Endpoint(String::new()).code(), "embedding_endpoint");
        assert_eq!(
            Error::Transient(String::new()).code(),
            "upstream_unavailable"
        );
    }
}
