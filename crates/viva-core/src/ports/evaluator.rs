//! Answer evaluation port.
//!
//! The evaluator is an opaque judgment service: it sees the current
//! question, the answer text heard so far, and interview context, and
//! returns one action from the closed [`DecisionAction`] vocabulary. All
//! pacing policy (timeouts, cooldowns, probe budgets, fallbacks) lives in
//! the engine, not here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DecisionAction, Difficulty, InterviewMode};

// ── DTOs ─────────────────────────────────────────────────────────────────────

/// Interview context sent alongside every evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationContext {
    pub mode: InterviewMode,
    pub difficulty: Difficulty,
    /// Skills the interview was configured around.
    pub skills: Vec<String>,
    /// Zero-based index of the question being answered.
    pub question_index: usize,
    /// Probes already spent on this question. The evaluator must not
    /// request another probe once the budget is used up; the engine
    /// degrades such verdicts to `move_forward` anyway.
    pub probes_used: u8,
}

/// One evaluation request for the answer state heard so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    /// The question currently on the floor.
    pub question: String,
    /// Candidate text for this question, including any open partial
    /// hypothesis.
    pub transcript_so_far: String,
    /// Whether `transcript_so_far` ends in a committed final answer.
    pub is_final: bool,
    pub context: EvaluationContext,
}

/// The evaluator's judgment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationVerdict {
    pub action: DecisionAction,
    /// What the interviewer should say, when the action speaks.
    #[serde(default)]
    pub text: String,
    /// Score for the answer so far, `0.0..=1.0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Free-form note kept for the report, never spoken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

// ── Error ────────────────────────────────────────────────────────────────────

/// Errors returned by the evaluation service.
///
/// Evaluation failures never stall a session: the engine falls back to a
/// deterministic decision after its timeout.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// The service could not be reached.
    #[error("evaluation service unreachable: {0}")]
    Unavailable(String),

    /// The service answered but refused or failed the request.
    #[error("evaluation request failed: {0}")]
    RequestFailed(String),

    /// The service's reply could not be decoded.
    #[error("evaluation response malformed: {0}")]
    Malformed(String),
}

// ── Port trait ───────────────────────────────────────────────────────────────

/// Judge the answer heard so far and pick the interviewer's next action.
#[async_trait]
pub trait AnswerEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationVerdict, EvaluatorError>;
}
