//! Gateway errors and their HTTP rendering.
//!
//! | Error | HTTP status |
//! |---|---|
//! | [`GatewayError::Validation`] | `400 Bad Request` |
//! | [`UpstreamError::Timeout`] | `504 Gateway Timeout` |
//! | [`UpstreamError::Failed`] | `502 Bad Gateway` |
//!
//! Every error body is `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tonic::{Code, Status};

/// Message of the status tonic's server returns when a request outlives its
/// timeout.
const SERVER_TIMEOUT_MESSAGE: &str = "Timeout expired";

/// Outcome of a failed call to the ETA service.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum UpstreamError {
    /// No answer within the deadline, from either side of the call.
    #[error("ETA service did not respond within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The service answered with, or the transport produced, a non-OK status.
    #[error("ETA service error: {message}")]
    Failed { code: Code, message: String },
}

impl UpstreamError {
    /// Classifies a status returned by the call.
    ///
    /// Only the `CANCELLED` tonic sends when the server's request timeout
    /// (driven by our `grpc-timeout`) fires counts as a timeout. Faults the
    /// service reports, including its own store timing out, are failures.
    pub fn from_status(status: &Status, timeout_ms: u64) -> Self {
        if status.code() == Code::Cancelled && status.message() == SERVER_TIMEOUT_MESSAGE {
            return Self::Timeout { timeout_ms };
        }
        Self::Failed {
            code: status.code(),
            message: status.message().to_string(),
        }
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// The query string was missing, malformed or out of range.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl GatewayError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(UpstreamError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(UpstreamError::Failed { .. }) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_http_codes() {
        assert_eq!(
            GatewayError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::from(UpstreamError::Timeout { timeout_ms: 10 }).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            GatewayError::from(UpstreamError::Failed {
                code: Code::Unavailable,
                message: "down".into()
            })
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn server_request_timeout_is_a_timeout() {
        let cancelled = Status::cancelled("Timeout expired");
        assert_eq!(
            UpstreamError::from_status(&cancelled, 1000),
            UpstreamError::Timeout { timeout_ms: 1000 }
        );
    }

    #[test]
    fn other_statuses_are_failures() {
        for status in [
            Status::unavailable("Vehicle lookup timed out after 5000 ms"),
            Status::deadline_exceeded("lookup timed out"),
            Status::cancelled("stream reset by peer"),
            Status::failed_precondition("No available vehicles near the requested point"),
            Status::unavailable("tcp connect error"),
            Status::invalid_argument("bad coordinates"),
            Status::internal("boom"),
        ] {
            let err = UpstreamError::from_status(&status, 1000);
            assert_eq!(
                err,
                UpstreamError::Failed {
                    code: status.code(),
                    message: status.message().to_string()
                }
            );
        }
    }
}
