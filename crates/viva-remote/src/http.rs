//! Shared request plumbing for the port clients.
//!
//! Every collaborator API in this system is a POST endpoint: JSON in most
//! places, raw audio bytes where speech crosses the boundary. The backend
//! here owns the reqwest client, bearer auth, and the retry loop; the port
//! clients own paths, payload shapes, and error mapping.

use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};

/// Request body shapes the collaborator APIs use.
enum Body {
    Json(serde_json::Value),
    Audio(Bytes),
    Empty,
}

/// One configured HTTP connection to a collaborator service.
///
/// Transient failures (network errors, 5xx) are retried with exponential
/// backoff up to the configured attempt budget; 4xx fails immediately.
pub(crate) struct Backend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u8,
    retry_base_delay: Duration,
}

impl Backend {
    /// Build a backend from the service configuration.
    pub(crate) fn new(config: &RemoteConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        }
    }

    /// Join a path (starting with `/`) onto the service base URL.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, url: &str, body: &Body) -> reqwest::RequestBuilder {
        let mut request = self.client.post(url);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }
        match body {
            Body::Json(value) => request.json(value),
            Body::Audio(bytes) => request
                .header("Content-Type", "application/octet-stream")
                .body(bytes.clone()),
            Body::Empty => request,
        }
    }

    /// POST with automatic retry for transient errors.
    async fn post_with_retry(&self, url: &str, body: &Body) -> RemoteResult<reqwest::Response> {
        let mut attempt: u8 = 0;
        loop {
            let err = match self.request(url, body).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => RemoteError::Status {
                    status: response.status().as_u16(),
                    url: url.to_string(),
                },
                Err(e) => RemoteError::Network(e),
            };

            if !err.is_transient() || attempt >= self.max_retries {
                return Err(err);
            }

            attempt += 1;
            let delay = self.retry_base_delay * 2u32.pow((u32::from(attempt) - 1).min(16));
            tokio::time::sleep(delay).await;
        }
    }

    /// POST a JSON payload, decode a JSON reply.
    pub(crate) async fn post_json<Resp>(
        &self,
        path: &str,
        payload: &impl Serialize,
    ) -> RemoteResult<Resp>
    where
        Resp: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let body = Body::Json(serde_json::to_value(payload)?);
        let response = self.post_with_retry(&url, &body).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// POST a JSON payload, return the raw reply bytes.
    pub(crate) async fn post_json_for_bytes(
        &self,
        path: &str,
        payload: &impl Serialize,
    ) -> RemoteResult<Bytes> {
        let url = self.endpoint(path);
        let body = Body::Json(serde_json::to_value(payload)?);
        let response = self.post_with_retry(&url, &body).await?;
        Ok(response.bytes().await?)
    }

    /// POST raw audio, decode an optional JSON reply.
    pub(crate) async fn post_audio<Resp>(
        &self,
        path: &str,
        audio: Bytes,
    ) -> RemoteResult<Option<Resp>>
    where
        Resp: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let response = self.post_with_retry(&url, &Body::Audio(audio)).await?;
        decode_optional(response).await
    }

    /// POST with no body, decode an optional JSON reply.
    pub(crate) async fn post_empty<Resp>(&self, path: &str) -> RemoteResult<Option<Resp>>
    where
        Resp: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let response = self.post_with_retry(&url, &Body::Empty).await?;
        decode_optional(response).await
    }
}

/// Decode a reply that may legitimately carry nothing: `204 No Content`,
/// an empty body, and a JSON `null` all mean "nothing to report".
async fn decode_optional<T: DeserializeOwned>(
    response: reqwest::Response,
) -> RemoteResult<Option<T>> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(None);
    }
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_creation_copies_config() {
        let config = RemoteConfig::new()
            .with_base_url("http://svc:9000")
            .with_api_key("key")
            .with_max_retries(4);
        let backend = Backend::new(&config);

        assert_eq!(backend.base_url, "http://svc:9000");
        assert_eq!(backend.api_key, Some("key".to_string()));
        assert_eq!(backend.max_retries, 4);
        assert_eq!(backend.retry_base_delay, Duration::from_millis(200));
    }

    #[test]
    fn endpoint_joins_path_onto_base() {
        let config = RemoteConfig::new().with_base_url("http://svc:9000");
        let backend = Backend::new(&config);
        assert_eq!(backend.endpoint("/v1/evaluate"), "http://svc:9000/v1/evaluate");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash_in_base() {
        let config = RemoteConfig {
            base_url: "http://svc:9000/".to_string(),
            ..RemoteConfig::default()
        };
        let backend = Backend::new(&config);
        assert_eq!(
            backend.endpoint("/v1/transcribe"),
            "http://svc:9000/v1/transcribe"
        );
    }
}
