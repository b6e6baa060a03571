//! Turn-taking state and the generation stamp for in-flight work.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which phase of the speaking exchange an active session is in.
///
/// Exactly one value exists per session at any instant; only the session's
/// actor task transitions it. The legal edges live in the engine's turn
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// Session exists but the opening has not been spoken yet.
    Idle,
    /// The interviewer is speaking; candidate audio is rejected.
    AiSpeaking,
    /// The candidate holds the floor for the current primary question.
    Listening,
    /// An answer is being judged; candidate audio is rejected.
    Evaluating,
    /// The candidate holds the floor for a probe follow-up.
    UserSpeakingFollowup,
}

impl TurnState {
    /// Whether candidate audio chunks are accepted in this state.
    pub const fn accepts_audio(self) -> bool {
        matches!(self, Self::Listening | Self::UserSpeakingFollowup)
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::AiSpeaking => "ai_speaking",
            Self::Listening => "listening",
            Self::Evaluating => "evaluating",
            Self::UserSpeakingFollowup => "user_speaking_followup",
        };
        f.write_str(label)
    }
}

/// Monotonic stamp for asynchronous work issued by a session.
///
/// Every turn transition produces a new generation. Evaluator verdicts,
/// synthesis results, and timer firings carry the generation they were
/// issued under; anything older than the session's current generation is
/// discarded instead of applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Produce the successor stamp.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Whether work stamped with `self` was issued before `current`.
    pub const fn is_stale(self, current: Self) -> bool {
        self.0 < current.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_acceptance_per_state() {
        assert!(TurnState::Listening.accepts_audio());
        assert!(TurnState::UserSpeakingFollowup.accepts_audio());
        assert!(!TurnState::Idle.accepts_audio());
        assert!(!TurnState::AiSpeaking.accepts_audio());
        assert!(!TurnState::Evaluating.accepts_audio());
    }

    #[test]
    fn staleness_is_strict() {
        let g0 = Generation::default();
        let g1 = g0.next();
        assert!(g0.is_stale(g1));
        assert!(!g1.is_stale(g1));
        assert!(!g1.is_stale(g0));
    }
}
