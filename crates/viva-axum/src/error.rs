//! Gateway error types and HTTP mappings.
//!
//! Only the HTTP surface uses these. Session-level failures travel over
//! the WebSocket as `session:error` events instead, since by then there
//! is no HTTP response left to fail.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use viva_core::AuthError;

/// Errors returned by the gateway's HTTP endpoints.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or rejected credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A collaborator service we depend on is down.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Invalid => Self::Unauthorized("token rejected".to_string()),
            AuthError::Unavailable(msg) => Self::ServiceUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_status_codes() {
        let cases = [
            (
                HttpError::BadRequest("x".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                HttpError::Unauthorized("x".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                HttpError::ServiceUnavailable("x".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn auth_errors_map_by_class() {
        assert!(matches!(
            HttpError::from(AuthError::Invalid),
            HttpError::Unauthorized(_)
        ));
        assert!(matches!(
            HttpError::from(AuthError::Unavailable("down".to_string())),
            HttpError::ServiceUnavailable(_)
        ));
    }
}
