//! Post-interview report generation port.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{SessionId, TranscriptSnapshot};

/// Opaque identifier of a generated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Errors returned by the report service.
///
/// Report generation is fire-and-forget from the engine's point of view:
/// failures are logged and the session's termination proceeds regardless.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report service unreachable: {0}")]
    Unavailable(String),

    #[error("report request failed: {0}")]
    RequestFailed(String),
}

/// Turn a frozen transcript into the candidate-facing report.
///
/// Called at most once per session, after finalization froze the
/// transcript.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(
        &self,
        session_id: SessionId,
        transcript: TranscriptSnapshot,
    ) -> Result<ReportId, ReportError>;
}
