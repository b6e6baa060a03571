//! Port traits for the engine's external collaborators.
//!
//! # Design Rules
//!
//! - DTOs here are transport-agnostic wire shapes; conversion from adapter
//!   native types happens inside the adapter crates, never here.
//! - One error enum per port. The engine maps each failure class to its
//!   own recovery policy (retry, fallback, degrade, or terminate), so the
//!   enums stay separate instead of collapsing into one transport error.
//! - Every trait is object-safe and `Send + Sync`; the engine holds them
//!   as `Arc<dyn …>` and never knows which adapter is behind a call.

mod auth;
mod evaluator;
mod report;
mod stt;
mod tts;

pub use auth::{AuthError, TokenValidator};
pub use evaluator::{
    AnswerEvaluator, EvaluationContext, EvaluationRequest, EvaluationVerdict, EvaluatorError,
};
pub use report::{ReportError, ReportGenerator, ReportId};
pub use stt::{SpeechToText, SttError, SttFragment};
pub use tts::{SpeechSynthesizer, TtsError};
