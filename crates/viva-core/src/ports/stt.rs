//! Streaming speech-to-text port.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::SessionId;

// ── DTOs ─────────────────────────────────────────────────────────────────────

/// One recognition hypothesis for the session's current utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SttFragment {
    /// Recognized text of the utterance so far.
    pub text: String,
    /// `true` once the recognizer will not revise this utterance again.
    pub is_final: bool,
    /// Recognizer confidence in `0.0..=1.0`.
    pub confidence: f32,
}

// ── Error ────────────────────────────────────────────────────────────────────

/// Errors returned by the transcription service.
///
/// The engine retries a failed chunk a bounded number of times; exhausting
/// the retries is an unrecoverable session fault.
#[derive(Debug, Error)]
pub enum SttError {
    /// The service could not be reached.
    #[error("transcription service unreachable: {0}")]
    Unavailable(String),

    /// The service answered but refused or failed the request.
    #[error("transcription request failed: {0}")]
    RequestFailed(String),

    /// The service's reply could not be decoded.
    #[error("transcription response malformed: {0}")]
    Malformed(String),
}

// ── Port trait ───────────────────────────────────────────────────────────────

/// Streaming transcription, keyed by session.
///
/// The implementation holds per-session recognizer state between calls.
/// The engine serializes calls per session (one in flight at a time), so
/// implementations never see concurrent chunks for the same session.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Feed one chunk of utterance audio.
    ///
    /// May yield a partial hypothesis, a final one when the recognizer
    /// detected an utterance boundary on its own, or nothing.
    async fn push_chunk(
        &self,
        session_id: SessionId,
        audio: Bytes,
    ) -> Result<Option<SttFragment>, SttError>;

    /// Close the current utterance and force the final hypothesis.
    ///
    /// Returns `None` when no speech was recognized since the last final.
    async fn finish_utterance(
        &self,
        session_id: SessionId,
    ) -> Result<Option<SttFragment>, SttError>;
}
