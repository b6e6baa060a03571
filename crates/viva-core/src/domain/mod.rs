//! Pure domain model for interview sessions.
//!
//! These types carry no I/O and no engine behavior. The engine crate owns
//! every mutable instance; adapters only ever see immutable views or wire
//! DTOs derived from them.

mod decision;
mod session;
mod transcript;
mod turn;

pub use decision::{Decision, DecisionAction};
pub use session::{
    Difficulty, InterviewMode, Session, SessionConfig, SessionId, SessionStatus, UserId,
};
pub use transcript::{Speaker, Transcript, TranscriptSnapshot, Utterance, UtteranceKind};
pub use turn::{Generation, TurnState};
