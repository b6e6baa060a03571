//! Events the engine emits to the client.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::codec::b64_opt;
use crate::domain::{Difficulty, InterviewMode, SessionId, Speaker};

/// Why a session ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Every prepared question was completed.
    Completed,
    /// The candidate sent `session:end`.
    UserRequest,
    /// The wall-clock budget ran out.
    TimeBudget,
    /// The client disconnected and never came back within the grace period.
    ClientTimeout,
}

/// Server-to-client events, tagged by protocol name.
///
/// `audio` fields are absent when synthesis failed and the engine degraded
/// to text-only delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Acknowledges a `session:join`; the connection is now bound.
    #[serde(rename = "session:joined")]
    SessionJoined {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
        mode: InterviewMode,
        difficulty: Difficulty,
    },

    /// The interviewer's opening: greeting plus the first question.
    #[serde(rename = "session:started")]
    SessionStarted {
        #[serde(rename = "openingText")]
        opening_text: String,
        #[serde(rename = "openingAudio", with = "b64_opt", default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        opening_audio: Option<Bytes>,
    },

    /// Live caption update for the candidate's current utterance.
    #[serde(rename = "transcript:partial")]
    TranscriptPartial {
        speaker: Speaker,
        text: String,
        #[serde(rename = "isFinal")]
        is_final: bool,
    },

    /// The interviewer cut in while the candidate was speaking.
    #[serde(rename = "ai:interrupt")]
    AiInterrupt {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(with = "b64_opt", default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        audio: Option<Bytes>,
    },

    /// One drill-down follow-up on the current answer.
    #[serde(rename = "ai:probe")]
    AiProbe {
        text: String,
        #[serde(with = "b64_opt", default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        audio: Option<Bytes>,
    },

    /// Steer the candidate back to the current question.
    #[serde(rename = "ai:redirect")]
    AiRedirect {
        text: String,
        #[serde(with = "b64_opt", default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        audio: Option<Bytes>,
    },

    /// Accept the answer and move to the next question (or close out).
    #[serde(rename = "ai:move_forward")]
    AiMoveForward {
        text: String,
        #[serde(with = "b64_opt", default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        audio: Option<Bytes>,
    },

    /// Terminal event for a normally ended session.
    #[serde(rename = "session:ended")]
    SessionEnded {
        reason: EndReason,
        #[serde(rename = "questionsCompleted")]
        questions_completed: usize,
        #[serde(rename = "durationSeconds")]
        duration_seconds: u64,
    },

    /// Terminal event for a session killed by an unrecoverable fault.
    #[serde(rename = "session:error")]
    SessionError { message: String },
}

impl ServerEvent {
    /// Protocol name of this event, for logging and tests.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::SessionJoined { .. } => "session:joined",
            Self::SessionStarted { .. } => "session:started",
            Self::TranscriptPartial { .. } => "transcript:partial",
            Self::AiInterrupt { .. } => "ai:interrupt",
            Self::AiProbe { .. } => "ai:probe",
            Self::AiRedirect { .. } => "ai:redirect",
            Self::AiMoveForward { .. } => "ai:move_forward",
            Self::SessionEnded { .. } => "session:ended",
            Self::SessionError { .. } => "session:error",
        }
    }

    /// Whether this event terminates the session stream.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::SessionEnded { .. } | Self::SessionError { .. })
    }

    pub fn joined(session_id: SessionId, mode: InterviewMode, difficulty: Difficulty) -> Self {
        Self::SessionJoined {
            session_id,
            mode,
            difficulty,
        }
    }

    pub fn started(opening_text: impl Into<String>, opening_audio: Option<Bytes>) -> Self {
        Self::SessionStarted {
            opening_text: opening_text.into(),
            opening_audio,
        }
    }

    pub fn transcript(speaker: Speaker, text: impl Into<String>, is_final: bool) -> Self {
        Self::TranscriptPartial {
            speaker,
            text: text.into(),
            is_final,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::SessionError {
            message: message.into(),
        }
    }
}
