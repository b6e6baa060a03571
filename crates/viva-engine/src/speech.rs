//! Single-flight speech synthesis with newest-generation-wins.
//!
//! Only one synthesis may be in flight per session. Starting a newer one
//! supersedes the old: the old task still runs to completion, but its
//! result no longer matches the slot and is discarded on arrival.

use std::sync::Arc;

use tokio::sync::mpsc;
use viva_core::{Generation, SpeechSynthesizer, UtteranceKind};

use crate::actor::SessionEvent;

/// Tracks which synthesis, if any, currently owns the speaker.
#[derive(Debug, Default)]
pub(crate) struct SpeechSlot {
    current: Option<Generation>,
}

impl SpeechSlot {
    /// Claim the slot for `generation`. Returns the superseded generation
    /// when an older synthesis was still pending.
    pub fn begin(&mut self, generation: Generation) -> Option<Generation> {
        self.current.replace(generation)
    }

    /// Release the slot if `generation` still owns it. Returns false when
    /// the result belongs to a superseded synthesis.
    pub fn finish(&mut self, generation: Generation) -> bool {
        if self.current == Some(generation) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Drop any pending claim. Used at teardown.
    pub fn cancel(&mut self) {
        self.current = None;
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }
}

/// Synthesize one utterance off-actor and post the outcome back.
///
/// Synthesis failure or timeout degrades to text-only delivery rather than
/// blocking the turn: the event still carries the text, just no audio.
pub(crate) fn spawn_synthesis(
    tts: Arc<dyn SpeechSynthesizer>,
    inbox: mpsc::UnboundedSender<SessionEvent>,
    generation: Generation,
    kind: UtteranceKind,
    text: String,
    reason: Option<String>,
    timeout_ms: u64,
) {
    tokio::spawn(async move {
        let deadline = std::time::Duration::from_millis(timeout_ms);
        let audio = match tokio::time::timeout(deadline, tts.synthesize(&text)).await {
            Ok(Ok(bytes)) => Some(bytes),
            Ok(Err(err)) => {
                tracing::warn!(%generation, error = %err, "Synthesis failed; delivering text only");
                None
            }
            Err(_) => {
                tracing::warn!(%generation, timeout_ms, "Synthesis timed out; delivering text only");
                None
            }
        };
        let _ = inbox.send(SessionEvent::SynthesisDone {
            generation,
            kind,
            text,
            reason,
            audio,
        });
    });
}
