//! Engine tuning knobs.

/// Pacing and capacity configuration for session actors.
///
/// Defaults are the production values; tests override individual fields.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long to wait for an evaluator verdict before falling back (ms).
    pub evaluator_timeout_ms: u64,

    /// How long to wait for speech synthesis before delivering text-only (ms).
    pub tts_timeout_ms: u64,

    /// Silence after a non-empty partial hypothesis before the answer is
    /// closed and evaluated, as if the client had sent `audio:stop` (ms).
    pub silence_timeout_ms: u64,

    /// Continuous speaking time before mid-answer evaluations begin (ms).
    pub partial_eval_after_ms: u64,

    /// Interval between mid-answer evaluations once they begin (ms).
    pub partial_eval_interval_ms: u64,

    /// Minimum spacing between AI-initiated interruptions (ms). A verdict
    /// that would interrupt again inside this window is logged and treated
    /// as `continue`.
    pub interrupt_cooldown_ms: u64,

    /// Drill-down probes allowed per primary question.
    pub max_probes_per_question: u8,

    /// Out-of-order audio chunks held back waiting for a gap to fill.
    /// When exceeded, the expected position jumps forward past the gap.
    pub reorder_window: usize,

    /// Upper bound on audio chunks queued for transcription. Past the cap
    /// the oldest queued chunks are merged pairwise; raw audio is never
    /// dropped.
    pub max_buffered_chunks: usize,

    /// Transcription retries per chunk before the session is failed.
    pub stt_max_retries: u32,

    /// Base delay between transcription retries, doubled per attempt (ms).
    pub stt_retry_backoff_ms: u64,

    /// Hard wall-clock cap on a session, also used when the session config
    /// carries no budget of its own (secs).
    pub max_session_duration_secs: u64,

    /// How long a disconnected (or never-joined) session is held before it
    /// ends with reason `client_timeout` (ms).
    pub disconnect_grace_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            evaluator_timeout_ms: 4_000,
            tts_timeout_ms: 5_000,
            silence_timeout_ms: 2_500,
            partial_eval_after_ms: 10_000,
            partial_eval_interval_ms: 6_000,
            interrupt_cooldown_ms: 15_000,
            max_probes_per_question: 1,
            reorder_window: 8,
            max_buffered_chunks: 64,
            stt_max_retries: 3,
            stt_retry_backoff_ms: 200,
            max_session_duration_secs: 1_800,
            disconnect_grace_ms: 30_000,
        }
    }
}
