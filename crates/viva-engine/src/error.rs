//! Engine-facing error types.

use thiserror::Error;
use viva_core::SessionId;

/// Why a live session refused a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinError {
    /// The authenticated user does not own this session.
    #[error("session belongs to another user")]
    NotOwner,

    /// The session reached a terminal state before the join landed.
    #[error("session already ended")]
    Ended,
}

/// Errors surfaced to gateway callers of the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No session with this id exists in the registry.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// The session's actor has already shut down.
    #[error("session {0} is no longer running")]
    SessionGone(SessionId),

    /// The session exists but refused the join.
    #[error(transparent)]
    JoinRejected(#[from] JoinError),
}
