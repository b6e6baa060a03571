//! Session identity, lifecycle status, and interview configuration.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an interview session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of the authenticated candidate who owns a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a session.
///
/// Separate from [`super::TurnState`]: status tracks whether the session
/// exists and is usable at all, the turn state tracks who is speaking
/// inside an `Active` session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Registered by the setup flow; no client has joined yet.
    Created,
    /// A client connection is bound; the opening has not been delivered.
    Ready,
    /// The interview is running.
    Active,
    /// Terminated normally (completed, user request, time budget, timeout).
    Ended,
    /// Terminated by an unrecoverable fault.
    Error,
}

impl SessionStatus {
    /// Whether this status admits no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Error)
    }

    /// Legal status edges. Anything else is a state violation.
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Created, Self::Ready)
            | (Self::Ready, Self::Active)
            | (Self::Created | Self::Ready | Self::Active, Self::Ended | Self::Error) => true,
            _ => false,
        }
    }
}

/// Interview style the evaluator runs the session in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMode {
    Technical,
    Behavioral,
    Mixed,
}

/// Seniority calibration for question difficulty and evaluation strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Junior,
    Mid,
    Senior,
}

/// Everything the engine needs to run one interview.
///
/// Prepared by the external setup flow before the candidate connects; the
/// engine never generates questions itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub mode: InterviewMode,
    pub difficulty: Difficulty,
    /// Skills the questions were drawn from, passed through to the evaluator.
    pub skills: Vec<String>,
    /// Primary questions in the order they will be asked.
    pub questions: Vec<String>,
    /// Wall-clock budget for the whole interview, in seconds.
    pub duration_secs: u64,
}

/// A single interview session and its mutable progress.
///
/// Owned exclusively by the session's actor task; everything outside the
/// engine works with copies of individual fields.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub status: SessionStatus,
    pub config: SessionConfig,
    /// Index into `config.questions` of the question currently on the floor.
    pub current_question_index: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, user_id: UserId, config: SessionConfig) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            status: SessionStatus::Created,
            config,
            current_question_index: 0,
            created_at: now,
            last_activity_at: now,
        }
    }

    /// The question currently being answered, if the budget is not exhausted.
    pub fn current_question(&self) -> Option<&str> {
        self.config
            .questions
            .get(self.current_question_index)
            .map(String::as_str)
    }

    /// Advance to the next question and return it, or `None` when the
    /// question budget is exhausted.
    pub fn advance_question(&mut self) -> Option<&str> {
        self.current_question_index += 1;
        self.current_question()
    }

    /// Questions fully completed so far (capped at the total count).
    pub fn questions_completed(&self) -> usize {
        self.current_question_index.min(self.config.questions.len())
    }

    /// Record candidate activity for idle accounting.
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// Seconds elapsed since the session was created.
    pub fn elapsed_secs(&self) -> u64 {
        let secs = (Utc::now() - self.created_at).num_seconds();
        u64::try_from(secs).unwrap_or(0)
    }
}
