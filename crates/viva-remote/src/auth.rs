//! HTTP client for the token validation service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use viva_core::{AuthError, TokenValidator, UserId};

use crate::config::RemoteConfig;
use crate::http::Backend;

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateReply {
    user_id: UserId,
}

/// Token validation over the collaborator's HTTP API.
///
/// A 401 or 403 from the service means the token itself was rejected;
/// every other failure means no verdict was reached and the connection
/// must not proceed.
pub struct RemoteAuth {
    backend: Backend,
}

impl RemoteAuth {
    #[must_use]
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            backend: Backend::new(config),
        }
    }
}

#[async_trait]
impl TokenValidator for RemoteAuth {
    async fn validate(&self, token: &str) -> Result<UserId, AuthError> {
        let reply: ValidateReply = self
            .backend
            .post_json("/v1/auth/validate", &ValidateRequest { token })
            .await?;
        Ok(reply.user_id)
    }
}
