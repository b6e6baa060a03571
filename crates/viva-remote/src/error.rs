//! Internal transport error, mapped to core port errors at the boundary.
//!
//! The clients in this crate share one failure vocabulary: a non-success
//! status, a network-level error, or an undecodable body. Each port's
//! `From` impl below decides which of the port's own variants that
//! becomes, so the engine only ever sees the vocabulary it has a recovery
//! policy for.

use thiserror::Error;
use viva_core::{AuthError, EvaluatorError, ReportError, SttError, TtsError};

/// Result type alias for raw transport operations.
pub(crate) type RemoteResult<T> = Result<T, RemoteError>;

/// Errors produced while talking to a collaborator service.
#[derive(Debug, Error)]
pub(crate) enum RemoteError {
    /// The service answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// Network or HTTP client error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RemoteError {
    /// Whether another attempt might succeed. 5xx and network errors are
    /// transient; 4xx means the request itself is wrong.
    pub(crate) const fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500,
            Self::Network(_) => true,
            Self::Decode(_) => false,
        }
    }
}

impl From<RemoteError> for SttError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Status { status, .. } if status >= 500 => {
                Self::Unavailable(err.to_string())
            }
            RemoteError::Status { .. } => Self::RequestFailed(err.to_string()),
            RemoteError::Network(e) => Self::Unavailable(e.to_string()),
            RemoteError::Decode(e) => Self::Malformed(e.to_string()),
        }
    }
}

impl From<RemoteError> for EvaluatorError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Status { status, .. } if status >= 500 => {
                Self::Unavailable(err.to_string())
            }
            RemoteError::Status { .. } => Self::RequestFailed(err.to_string()),
            RemoteError::Network(e) => Self::Unavailable(e.to_string()),
            RemoteError::Decode(e) => Self::Malformed(e.to_string()),
        }
    }
}

impl From<RemoteError> for TtsError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Status { status, .. } if status >= 500 => {
                Self::Unavailable(err.to_string())
            }
            RemoteError::Network(e) => Self::Unavailable(e.to_string()),
            // Synthesis replies are raw audio; a decode error here means
            // the service broke its contract.
            RemoteError::Status { .. } | RemoteError::Decode(_) => {
                Self::RequestFailed(err.to_string())
            }
        }
    }
}

impl From<RemoteError> for ReportError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Status { status, .. } if status >= 500 => {
                Self::Unavailable(err.to_string())
            }
            RemoteError::Network(e) => Self::Unavailable(e.to_string()),
            RemoteError::Status { .. } | RemoteError::Decode(_) => {
                Self::RequestFailed(err.to_string())
            }
        }
    }
}

impl From<RemoteError> for AuthError {
    fn from(err: RemoteError) -> Self {
        match err {
            // The auth service rejects bad tokens with 401/403; everything
            // else means we could not get a verdict at all.
            RemoteError::Status {
                status: 401 | 403, ..
            } => Self::Invalid,
            other => Self::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> RemoteError {
        RemoteError::Status {
            status: code,
            url: "http://svc/v1/op".to_string(),
        }
    }

    fn decode() -> RemoteError {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        RemoteError::Decode(err)
    }

    #[test]
    fn transient_classification() {
        assert!(status(500).is_transient());
        assert!(status(503).is_transient());
        assert!(!status(400).is_transient());
        assert!(!status(404).is_transient());
        assert!(!decode().is_transient());
    }

    #[test]
    fn stt_mapping() {
        assert!(matches!(SttError::from(status(503)), SttError::Unavailable(_)));
        assert!(matches!(
            SttError::from(status(422)),
            SttError::RequestFailed(_)
        ));
        assert!(matches!(SttError::from(decode()), SttError::Malformed(_)));
    }

    #[test]
    fn evaluator_mapping() {
        assert!(matches!(
            EvaluatorError::from(status(502)),
            EvaluatorError::Unavailable(_)
        ));
        assert!(matches!(
            EvaluatorError::from(status(400)),
            EvaluatorError::RequestFailed(_)
        ));
        assert!(matches!(
            EvaluatorError::from(decode()),
            EvaluatorError::Malformed(_)
        ));
    }

    #[test]
    fn tts_mapping_has_no_malformed_class() {
        assert!(matches!(TtsError::from(status(500)), TtsError::Unavailable(_)));
        assert!(matches!(
            TtsError::from(status(404)),
            TtsError::RequestFailed(_)
        ));
        assert!(matches!(TtsError::from(decode()), TtsError::RequestFailed(_)));
    }

    #[test]
    fn report_mapping() {
        assert!(matches!(
            ReportError::from(status(503)),
            ReportError::Unavailable(_)
        ));
        assert!(matches!(
            ReportError::from(status(409)),
            ReportError::RequestFailed(_)
        ));
    }

    #[test]
    fn auth_rejection_statuses_map_to_invalid() {
        assert!(matches!(AuthError::from(status(401)), AuthError::Invalid));
        assert!(matches!(AuthError::from(status(403)), AuthError::Invalid));
    }

    #[test]
    fn auth_faults_map_to_unavailable() {
        assert!(matches!(
            AuthError::from(status(500)),
            AuthError::Unavailable(_)
        ));
        assert!(matches!(
            AuthError::from(status(404)),
            AuthError::Unavailable(_)
        ));
        assert!(matches!(AuthError::from(decode()), AuthError::Unavailable(_)));
    }

    #[test]
    fn status_error_message_carries_url_and_code() {
        let msg = status(503).to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("http://svc/v1/op"));
    }
}
