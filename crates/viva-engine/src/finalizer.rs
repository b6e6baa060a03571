//! Session teardown: terminal status, terminal event, report generation.

use std::sync::Arc;

use viva_core::{
    EndReason, ReportGenerator, ServerEvent, SessionId, SessionStatus, TranscriptSnapshot,
};

/// Why a session is being torn down. Shapes both the terminal status and
/// the last event the client sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FinalizeCause {
    /// The question list was exhausted.
    Completed,
    /// The client sent an explicit end request.
    UserRequest,
    /// The session outlived its time budget.
    TimeBudget,
    /// The disconnect grace period lapsed with no reconnect.
    ClientTimeout,
    /// An unrecoverable internal fault.
    Fatal(String),
}

impl FinalizeCause {
    pub fn status(&self) -> SessionStatus {
        match self {
            Self::Fatal(_) => SessionStatus::Error,
            _ => SessionStatus::Ended,
        }
    }

    /// The one terminal event emitted for this cause.
    pub fn terminal_event(&self, questions_completed: usize, duration_seconds: u64) -> ServerEvent {
        let reason = match self {
            Self::Completed => EndReason::Completed,
            Self::UserRequest => EndReason::UserRequest,
            Self::TimeBudget => EndReason::TimeBudget,
            Self::ClientTimeout => EndReason::ClientTimeout,
            Self::Fatal(detail) => return ServerEvent::error(detail.clone()),
        };
        ServerEvent::SessionEnded {
            reason,
            questions_completed,
            duration_seconds,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::UserRequest => "user_request",
            Self::TimeBudget => "time_budget",
            Self::ClientTimeout => "client_timeout",
            Self::Fatal(_) => "fatal",
        }
    }
}

/// Generate the post-interview report off-actor. Fire and forget: teardown
/// never waits on the report backend.
pub(crate) fn spawn_report(
    reporter: Arc<dyn ReportGenerator>,
    session_id: SessionId,
    snapshot: TranscriptSnapshot,
) {
    tokio::spawn(async move {
        match reporter.generate(session_id, snapshot).await {
            Ok(report_id) => {
                tracing::info!(%session_id, %report_id, "Interview report generated");
            }
            Err(err) => {
                tracing::warn!(%session_id, error = %err, "Report generation failed");
            }
        }
    });
}
