//! HTTP client for the speech synthesis service.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use viva_core::{SpeechSynthesizer, TtsError};

use crate::config::RemoteConfig;
use crate::http::Backend;

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
}

/// Speech synthesis over the collaborator's HTTP API.
///
/// Sends the utterance text, receives encoded audio bytes. The engine
/// decides what encoding the service is configured for; this client
/// treats the reply as opaque.
pub struct RemoteTts {
    backend: Backend,
}

impl RemoteTts {
    #[must_use]
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            backend: Backend::new(config),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for RemoteTts {
    async fn synthesize(&self, text: &str) -> Result<Bytes, TtsError> {
        let audio = self
            .backend
            .post_json_for_bytes("/v1/synthesize", &SynthesizeRequest { text })
            .await?;
        Ok(audio)
    }
}
