//! HTTP client for the transcription service.

use async_trait::async_trait;
use bytes::Bytes;
use viva_core::{SessionId, SpeechToText, SttError, SttFragment};

use crate::config::RemoteConfig;
use crate::http::Backend;

/// Streaming transcription over the collaborator's HTTP API.
///
/// The service holds recognizer state per session; this client only routes
/// chunks to the right stream. Audio goes up as `application/octet-stream`,
/// hypotheses come back as JSON, and an empty reply means the recognizer
/// has nothing new to say about the utterance yet.
pub struct RemoteStt {
    backend: Backend,
}

impl RemoteStt {
    #[must_use]
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            backend: Backend::new(config),
        }
    }
}

#[async_trait]
impl SpeechToText for RemoteStt {
    async fn push_chunk(
        &self,
        session_id: SessionId,
        audio: Bytes,
    ) -> Result<Option<SttFragment>, SttError> {
        let path = format!("/v1/transcribe/{session_id}");
        let fragment = self.backend.post_audio(&path, audio).await?;
        Ok(fragment)
    }

    async fn finish_utterance(
        &self,
        session_id: SessionId,
    ) -> Result<Option<SttFragment>, SttError> {
        let path = format!("/v1/transcribe/{session_id}/finish");
        let fragment = self.backend.post_empty(&path).await?;
        Ok(fragment)
    }
}
