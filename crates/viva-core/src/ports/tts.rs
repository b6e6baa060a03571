//! Speech synthesis port.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors returned by the synthesis service.
///
/// Synthesis is never fatal: on failure the engine delivers the utterance
/// text-only and logs the degraded mode.
#[derive(Debug, Error)]
pub enum TtsError {
    /// The service could not be reached.
    #[error("synthesis service unreachable: {0}")]
    Unavailable(String),

    /// The service answered but refused or failed the request.
    #[error("synthesis request failed: {0}")]
    RequestFailed(String),
}

/// Text to encoded speech audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render `text` to audio bytes in the service's configured encoding.
    async fn synthesize(&self, text: &str) -> Result<Bytes, TtsError>;
}
