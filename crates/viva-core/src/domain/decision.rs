//! Interviewer decisions derived from evaluator verdicts.

use serde::{Deserialize, Serialize};

/// What the interviewer does next with the answer heard so far.
///
/// This is the closed action vocabulary shared with the evaluator wire
/// contract; anything else coming off the wire fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    /// Keep listening; say nothing.
    Continue,
    /// Cut in while the candidate is speaking.
    Interrupt,
    /// Ask one drill-down follow-up on the current answer.
    Probe,
    /// Steer the candidate back to the current question.
    Redirect,
    /// Accept the answer and advance to the next question.
    MoveForward,
}

impl DecisionAction {
    /// Whether this action produces an interviewer utterance.
    pub const fn speaks(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// A concrete next step for the interviewer, after engine policy
/// (cooldowns, probe budgets, fallbacks) has been applied to a verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: DecisionAction,
    /// What the interviewer says, when the action speaks.
    pub text: String,
    /// Short machine-readable cause, surfaced on interruptions.
    pub reason: Option<String>,
}

impl Decision {
    pub fn new(action: DecisionAction, text: impl Into<String>) -> Self {
        Self {
            action,
            text: text.into(),
            reason: None,
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continue_is_the_only_silent_action() {
        assert!(!DecisionAction::Continue.speaks());
        assert!(DecisionAction::Interrupt.speaks());
        assert!(DecisionAction::Probe.speaks());
        assert!(DecisionAction::Redirect.speaks());
        assert!(DecisionAction::MoveForward.speaks());
    }

    #[test]
    fn action_wire_names_are_snake_case() {
        let json = serde_json::to_string(&DecisionAction::MoveForward).unwrap();
        assert_eq!(json, "\"move_forward\"");
    }
}
