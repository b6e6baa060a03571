//! Decision planning: turns evaluator verdicts into interviewer moves.
//!
//! The evaluator is advisory. This module applies the engine's own policy
//! on top of a verdict: interrupts respect a cooldown, probes respect a
//! per-question budget, and a dead or slow evaluator degrades to a
//! deterministic fallback instead of stalling the interview.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use viva_core::{
    AnswerEvaluator, Decision, DecisionAction, EvaluationRequest, Generation, UtteranceKind,
};

use crate::actor::SessionEvent;

/// What the interviewer says when the evaluator is unusable mid-question.
const FALLBACK_ADVANCE_TEXT: &str = "Thanks, let's keep moving.";

/// Spoken when the question list runs out.
const CLOSING_TEXT: &str =
    "That brings us to the end of the interview. Thank you for your time.";

// ── Per-question progress ────────────────────────────────────────────────────

/// Counters scoped to the question currently on the floor.
#[derive(Debug, Clone, Copy)]
pub(crate) struct QuestionProgress {
    /// Probes already spent on this question.
    pub probes_used: u8,
    /// Whether a committed, non-empty answer exists for this question.
    pub has_final_answer: bool,
    /// Transcript seq where this question began; answer text is gathered
    /// from here on.
    pub started_seq: u64,
}

impl QuestionProgress {
    pub fn new(started_seq: u64) -> Self {
        Self {
            probes_used: 0,
            has_final_answer: false,
            started_seq,
        }
    }
}

// ── Planner ──────────────────────────────────────────────────────────────────

/// The planner's answer: hold the floor state, or speak.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlannedStep {
    /// No interviewer action; the candidate keeps the floor.
    Stay,
    /// The interviewer takes the floor with this utterance.
    Speak {
        kind: UtteranceKind,
        decision: Decision,
    },
}

/// Applies engine policy to evaluator verdicts.
#[derive(Debug)]
pub(crate) struct DecisionPlanner {
    max_probes_per_question: u8,
    interrupt_cooldown: Duration,
    last_interrupt_at: Option<Instant>,
}

impl DecisionPlanner {
    pub fn new(max_probes_per_question: u8, interrupt_cooldown: Duration) -> Self {
        Self {
            max_probes_per_question,
            interrupt_cooldown,
            last_interrupt_at: None,
        }
    }

    /// Decide what to do with a verdict delivered at `now`.
    pub fn plan(
        &mut self,
        decision: Decision,
        progress: &mut QuestionProgress,
        now: Instant,
    ) -> PlannedStep {
        match decision.action {
            DecisionAction::Continue => PlannedStep::Stay,
            DecisionAction::Interrupt => self.plan_interrupt(decision, now),
            DecisionAction::Probe => self.plan_probe(decision, progress),
            DecisionAction::Redirect => speak_or_stay(UtteranceKind::Redirect, decision),
            DecisionAction::MoveForward => {
                speak_or_stay(UtteranceKind::MoveForward, decision)
            }
        }
    }

    /// Deterministic stand-in when the evaluator times out or errors.
    pub fn fallback(&self, progress: &QuestionProgress) -> PlannedStep {
        if progress.has_final_answer {
            PlannedStep::Speak {
                kind: UtteranceKind::MoveForward,
                decision: Decision::new(
                    DecisionAction::MoveForward,
                    FALLBACK_ADVANCE_TEXT.to_owned(),
                ),
            }
        } else {
            PlannedStep::Stay
        }
    }

    fn plan_interrupt(&mut self, decision: Decision, now: Instant) -> PlannedStep {
        if let Some(last) = self.last_interrupt_at {
            let since = now.saturating_duration_since(last);
            if since < self.interrupt_cooldown {
                tracing::info!(
                    since_ms = since.as_millis() as u64,
                    cooldown_ms = self.interrupt_cooldown.as_millis() as u64,
                    "Suppressing interrupt inside cooldown"
                );
                return PlannedStep::Stay;
            }
        }
        let step = speak_or_stay(UtteranceKind::Interruption, decision);
        if matches!(step, PlannedStep::Speak { .. }) {
            self.last_interrupt_at = Some(now);
        }
        step
    }

    fn plan_probe(
        &mut self,
        decision: Decision,
        progress: &mut QuestionProgress,
    ) -> PlannedStep {
        if progress.probes_used >= self.max_probes_per_question {
            tracing::info!(
                probes_used = progress.probes_used,
                "Probe budget exhausted; moving forward instead"
            );
            return PlannedStep::Speak {
                kind: UtteranceKind::MoveForward,
                decision: Decision::new(
                    DecisionAction::MoveForward,
                    FALLBACK_ADVANCE_TEXT.to_owned(),
                ),
            };
        }
        let step = speak_or_stay(UtteranceKind::Probe, decision);
        if matches!(step, PlannedStep::Speak { .. }) {
            progress.probes_used += 1;
        }
        step
    }
}

fn speak_or_stay(kind: UtteranceKind, decision: Decision) -> PlannedStep {
    if decision.text.trim().is_empty() {
        tracing::warn!(action = ?decision.action, "Verdict carries no text; holding state");
        return PlannedStep::Stay;
    }
    PlannedStep::Speak { kind, decision }
}

// ── Utterance composition ────────────────────────────────────────────────────

/// Opening line spoken before the first question.
pub(crate) fn compose_opening(first_question: &str) -> String {
    format!("Welcome, and thanks for joining. Let's get started. {first_question}")
}

/// Combine the advance lead-in with the next question, or with the closing
/// line when the question list is exhausted.
pub(crate) fn compose_move_forward(lead: &str, next_question: Option<&str>) -> String {
    match next_question {
        Some(question) => format!("{lead} {question}"),
        None => format!("{lead} {CLOSING_TEXT}"),
    }
}

// ── Evaluation calls ─────────────────────────────────────────────────────────

/// Run one evaluation off-actor under a deadline and post the outcome back.
///
/// `generation` travels with the result so the actor can discard verdicts
/// that arrive after the turn has moved on.
pub(crate) fn spawn_evaluation(
    evaluator: Arc<dyn AnswerEvaluator>,
    inbox: mpsc::UnboundedSender<SessionEvent>,
    generation: Generation,
    request: EvaluationRequest,
    timeout_ms: u64,
) {
    tokio::spawn(async move {
        let deadline = Duration::from_millis(timeout_ms);
        let event = match tokio::time::timeout(deadline, evaluator.evaluate(request)).await {
            Ok(Ok(verdict)) => SessionEvent::EvaluationReady {
                generation,
                verdict,
            },
            Ok(Err(err)) => SessionEvent::EvaluationFailed {
                generation,
                detail: err.to_string(),
            },
            Err(_) => SessionEvent::EvaluationFailed {
                generation,
                detail: format!("no verdict within {timeout_ms}ms"),
            },
        };
        let _ = inbox.send(event);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> DecisionPlanner {
        DecisionPlanner::new(1, Duration::from_secs(15))
    }

    fn verdict(action: DecisionAction, text: &str) -> Decision {
        Decision::new(action, text.to_owned())
    }

    #[test]
    fn continue_holds_state() {
        let mut p = planner();
        let mut progress = QuestionProgress::new(1);
        let step = p.plan(verdict(DecisionAction::Continue, ""), &mut progress, Instant::now());
        assert_eq!(step, PlannedStep::Stay);
    }

    #[test]
    fn second_interrupt_inside_cooldown_is_suppressed() {
        let mut p = planner();
        let mut progress = QuestionProgress::new(1);
        let t0 = Instant::now();

        let first = p.plan(verdict(DecisionAction::Interrupt, "Hold on."), &mut progress, t0);
        assert!(matches!(
            first,
            PlannedStep::Speak { kind: UtteranceKind::Interruption, .. }
        ));

        let second = p.plan(
            verdict(DecisionAction::Interrupt, "One more thing."),
            &mut progress,
            t0 + Duration::from_secs(5),
        );
        assert_eq!(second, PlannedStep::Stay);

        let third = p.plan(
            verdict(DecisionAction::Interrupt, "Let me stop you."),
            &mut progress,
            t0 + Duration::from_secs(16),
        );
        assert!(matches!(third, PlannedStep::Speak { .. }));
    }

    #[test]
    fn suppressed_interrupt_does_not_restart_cooldown() {
        let mut p = planner();
        let mut progress = QuestionProgress::new(1);
        let t0 = Instant::now();

        p.plan(verdict(DecisionAction::Interrupt, "Hold on."), &mut progress, t0);
        p.plan(
            verdict(DecisionAction::Interrupt, "Again."),
            &mut progress,
            t0 + Duration::from_secs(14),
        );
        // 15s after the first spoken interrupt, not after the suppressed one.
        let step = p.plan(
            verdict(DecisionAction::Interrupt, "Now."),
            &mut progress,
            t0 + Duration::from_secs(15),
        );
        assert!(matches!(step, PlannedStep::Speak { .. }));
    }

    #[test]
    fn probe_spends_the_budget_then_degrades() {
        let mut p = planner();
        let mut progress = QuestionProgress::new(1);

        let first = p.plan(
            verdict(DecisionAction::Probe, "Can you expand on that?"),
            &mut progress,
            Instant::now(),
        );
        assert!(matches!(first, PlannedStep::Speak { kind: UtteranceKind::Probe, .. }));
        assert_eq!(progress.probes_used, 1);

        let second = p.plan(
            verdict(DecisionAction::Probe, "And one more detail?"),
            &mut progress,
            Instant::now(),
        );
        match second {
            PlannedStep::Speak { kind, decision } => {
                assert_eq!(kind, UtteranceKind::MoveForward);
                assert_eq!(decision.text, FALLBACK_ADVANCE_TEXT);
            }
            PlannedStep::Stay => panic!("exhausted probe should degrade to move_forward"),
        }
        assert_eq!(progress.probes_used, 1);
    }

    #[test]
    fn empty_text_verdict_is_ignored() {
        let mut p = planner();
        let mut progress = QuestionProgress::new(1);
        let step = p.plan(verdict(DecisionAction::Redirect, "   "), &mut progress, Instant::now());
        assert_eq!(step, PlannedStep::Stay);
    }

    #[test]
    fn fallback_advances_only_with_a_final_answer() {
        let p = planner();
        let mut progress = QuestionProgress::new(1);
        assert_eq!(p.fallback(&progress), PlannedStep::Stay);

        progress.has_final_answer = true;
        match p.fallback(&progress) {
            PlannedStep::Speak { kind, decision } => {
                assert_eq!(kind, UtteranceKind::MoveForward);
                assert_eq!(decision.text, FALLBACK_ADVANCE_TEXT);
            }
            PlannedStep::Stay => panic!("fallback with a final answer should advance"),
        }
    }

    #[test]
    fn move_forward_composition_appends_question_or_closing() {
        assert_eq!(
            compose_move_forward("Good.", Some("What is a mutex?")),
            "Good. What is a mutex?"
        );
        assert!(compose_move_forward("Good.", None).ends_with(CLOSING_TEXT));
    }
}
