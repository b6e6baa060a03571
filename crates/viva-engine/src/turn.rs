//! Turn-taking state machine.
//!
//! ```text
//!   Idle → AiSpeaking → Listening ⇄ Evaluating → AiSpeaking → …
//!                │            │          │
//!                │            └──────────┴─→ AiSpeaking (cut-in)
//!                └─→ UserSpeakingFollowup → Evaluating
//! ```
//!
//! Every successful transition produces a fresh [`Generation`]; in-flight
//! evaluator verdicts, synthesis results, and timers stamped with an older
//! generation are discarded by the actor instead of applied.

use thiserror::Error;
use viva_core::{Generation, TurnState};

/// A transition outside the legal edge set. Logged and dropped by the
/// actor; never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal turn transition {from} -> {to}")]
pub(crate) struct IllegalTransition {
    pub from: TurnState,
    pub to: TurnState,
}

/// Owns the session's [`TurnState`] and generation counter.
#[derive(Debug)]
pub(crate) struct TurnController {
    state: TurnState,
    generation: Generation,
}

impl TurnController {
    pub fn new() -> Self {
        Self {
            state: TurnState::Idle,
            generation: Generation::default(),
        }
    }

    pub const fn state(&self) -> TurnState {
        self.state
    }

    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Attempt a transition; bumps the generation on success.
    pub fn transition(&mut self, to: TurnState) -> Result<Generation, IllegalTransition> {
        if !allowed(self.state, to) {
            return Err(IllegalTransition {
                from: self.state,
                to,
            });
        }
        self.generation = self.generation.next();
        tracing::debug!(
            from = %self.state,
            to = %to,
            generation = %self.generation,
            "Turn transition"
        );
        self.state = to;
        Ok(self.generation)
    }

    /// Bump the generation without changing state, cancelling all
    /// in-flight work. Used once, at finalization.
    pub fn invalidate(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.generation
    }
}

/// Legal turn edges.
const fn allowed(from: TurnState, to: TurnState) -> bool {
    use TurnState::{AiSpeaking, Evaluating, Idle, Listening, UserSpeakingFollowup};
    matches!(
        (from, to),
        (Idle, AiSpeaking)
            | (AiSpeaking, Listening | UserSpeakingFollowup)
            | (Listening | UserSpeakingFollowup, Evaluating | AiSpeaking)
            | (Evaluating, AiSpeaking | Listening)
    )
}
