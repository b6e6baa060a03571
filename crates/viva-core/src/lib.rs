#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    Decision, DecisionAction, Difficulty, Generation, InterviewMode, Session, SessionConfig,
    SessionId, SessionStatus, Speaker, Transcript, TranscriptSnapshot, TurnState, UserId,
    Utterance, UtteranceKind,
};
pub use events::{ClientEvent, EndReason, ServerEvent};
pub use ports::{
    AnswerEvaluator, AuthError, EvaluationContext, EvaluationRequest, EvaluationVerdict,
    EvaluatorError, ReportError, ReportGenerator, ReportId, SpeechSynthesizer, SpeechToText,
    SttError, SttFragment, TokenValidator, TtsError,
};
