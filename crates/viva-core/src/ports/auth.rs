//! Token validation port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::UserId;

/// Errors returned by the auth service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token is expired, malformed, or unknown.
    #[error("token rejected")]
    Invalid,

    /// The service could not be reached or failed.
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

/// Resolve a bearer token to the user it belongs to.
///
/// The gateway calls this once per connection, before any `session:join`
/// is accepted.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<UserId, AuthError>;
}
