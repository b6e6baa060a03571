//! The per-session actor.
//!
//! Each session runs as one task owning all mutable session state. Every
//! input, whether from the connection, a finished service call, or a
//! timer, arrives as a [`SessionEvent`] on the actor's inbox and is
//! handled strictly in order. Handlers are synchronous; anything that
//! waits (transcription, evaluation, synthesis, timers, the report) runs
//! in a spawned task that posts its outcome back to the inbox.
//!
//! Results of spawned work are stamped, either with the turn generation
//! they were issued under or with the utterance or epoch counter they
//! belong to. A stamp that no longer matches means the session moved on
//! while the work was in flight, and the result is discarded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use viva_core::{
    AnswerEvaluator, ClientEvent, Decision, EvaluationContext, EvaluationRequest,
    EvaluationVerdict, Generation, ReportGenerator, ServerEvent, Session, SessionStatus, Speaker,
    SpeechSynthesizer, SpeechToText, SttError, SttFragment, Transcript, TurnState, UserId,
    UtteranceKind,
};

use crate::config::EngineConfig;
use crate::error::JoinError;
use crate::finalizer::{self, FinalizeCause};
use crate::ingest::{self, ChunkBacklog, ReorderBuffer};
use crate::judge::{self, DecisionPlanner, PlannedStep, QuestionProgress};
use crate::registry::{SessionHandle, SessionMap};
use crate::speech::{self, SpeechSlot};
use crate::turn::TurnController;

/// Service clients shared by every session actor.
#[derive(Clone)]
pub struct Collaborators {
    pub stt: Arc<dyn SpeechToText>,
    pub tts: Arc<dyn SpeechSynthesizer>,
    pub evaluator: Arc<dyn AnswerEvaluator>,
    pub reporter: Arc<dyn ReportGenerator>,
}

/// Everything a session actor can receive on its inbox.
pub(crate) enum SessionEvent {
    /// A connection wants to bind to this session.
    Join {
        user_id: UserId,
        outbound: mpsc::Sender<ServerEvent>,
        reply: oneshot::Sender<Result<(), JoinError>>,
    },
    /// A protocol event from the bound connection.
    Client(ClientEvent),
    /// The connection holding `outbound` went away.
    Disconnected { outbound: mpsc::Sender<ServerEvent> },
    /// A transcription call finished.
    SttDone {
        utterance: u64,
        /// Whether this was the utterance-closing call.
        closing: bool,
        result: Result<Option<SttFragment>, SttError>,
    },
    /// The evaluator returned a verdict.
    EvaluationReady {
        generation: Generation,
        verdict: EvaluationVerdict,
    },
    /// The evaluator errored or missed its deadline.
    EvaluationFailed {
        generation: Generation,
        detail: String,
    },
    /// Speech synthesis finished (audio may be absent on degraded delivery).
    SynthesisDone {
        generation: Generation,
        kind: UtteranceKind,
        text: String,
        reason: Option<String>,
        audio: Option<Bytes>,
    },
    /// The per-utterance silence timer fired.
    SilenceElapsed { epoch: u64 },
    /// A mid-answer evaluation tick fired.
    PartialEvalDue { epoch: u64 },
    /// The disconnect grace timer fired.
    GraceExpired { epoch: u64 },
    /// The session's wall-clock budget ran out.
    BudgetExpired,
}

/// One interview session's state and event loop.
pub(crate) struct SessionActor {
    session: Session,
    config: EngineConfig,
    deps: Collaborators,
    registry: Arc<SessionMap>,

    /// Handle for spawned tasks to post results back.
    inbox_tx: mpsc::UnboundedSender<SessionEvent>,
    /// The bound connection, if any.
    outbound: Option<mpsc::Sender<ServerEvent>>,

    turn: TurnController,
    transcript: Transcript,
    planner: DecisionPlanner,
    progress: QuestionProgress,

    reorder: ReorderBuffer,
    backlog: ChunkBacklog,
    /// One transcription call in flight at a time.
    stt_busy: bool,
    /// Bumped on every `audio:start`; stamps transcription results.
    utterance: u64,
    /// The utterance-closing call is owed once the backlog drains.
    finish_requested: bool,

    speech: SpeechSlot,

    // Timer epochs. Bumping an epoch orphans the matching in-flight timer.
    silence_epoch: u64,
    tick_epoch: u64,
    /// Whether the mid-answer evaluation chain is running for this utterance.
    ticks_armed: bool,
    disconnect_epoch: u64,

    /// Set once the closing remark is being spoken; its delivery finalizes.
    closing: bool,
    /// Set once; makes finalization idempotent and stops the loop.
    finalizing: bool,
}

impl SessionActor {
    /// Spawn the actor task and register its handle.
    ///
    /// The registry entry is inserted before the task starts so a caller
    /// holding the fresh id can never miss the session.
    pub(crate) fn spawn(
        session: Session,
        config: EngineConfig,
        deps: Collaborators,
        registry: Arc<SessionMap>,
    ) {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        registry.insert(session.id, SessionHandle::new(session.id, inbox_tx.clone()));

        let planner = DecisionPlanner::new(
            config.max_probes_per_question,
            Duration::from_millis(config.interrupt_cooldown_ms),
        );
        let reorder = ReorderBuffer::new(config.reorder_window);
        let backlog = ChunkBacklog::new(config.max_buffered_chunks);

        let mut actor = Self {
            session,
            config,
            deps,
            registry,
            inbox_tx,
            outbound: None,
            turn: TurnController::new(),
            transcript: Transcript::new(),
            planner,
            progress: QuestionProgress::new(0),
            reorder,
            backlog,
            stt_busy: false,
            utterance: 0,
            finish_requested: false,
            speech: SpeechSlot::default(),
            silence_epoch: 0,
            tick_epoch: 0,
            ticks_armed: false,
            disconnect_epoch: 0,
            closing: false,
            finalizing: false,
        };
        // A session nobody ever joins must still expire.
        actor.arm_grace_timer();
        tokio::spawn(actor.run(inbox_rx));
    }

    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<SessionEvent>) {
        while let Some(event) = inbox.recv().await {
            self.handle(event);
            if self.finalizing {
                break;
            }
        }
    }

    fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Join {
                user_id,
                outbound,
                reply,
            } => self.on_join(user_id, outbound, reply),
            SessionEvent::Client(event) => self.on_client(event),
            SessionEvent::Disconnected { outbound } => self.on_disconnected(&outbound),
            SessionEvent::SttDone {
                utterance,
                closing,
                result,
            } => self.on_stt_done(utterance, closing, result),
            SessionEvent::EvaluationReady {
                generation,
                verdict,
            } => self.on_evaluation_ready(generation, verdict),
            SessionEvent::EvaluationFailed { generation, detail } => {
                self.on_evaluation_failed(generation, &detail);
            }
            SessionEvent::SynthesisDone {
                generation,
                kind,
                text,
                reason,
                audio,
            } => self.on_synthesis_done(generation, kind, text, reason, audio),
            SessionEvent::SilenceElapsed { epoch } => self.on_silence_elapsed(epoch),
            SessionEvent::PartialEvalDue { epoch } => self.on_partial_eval_due(epoch),
            SessionEvent::GraceExpired { epoch } => self.on_grace_expired(epoch),
            SessionEvent::BudgetExpired => self.on_budget_expired(),
        }
    }

    // ── Connection lifecycle ─────────────────────────────────────────────

    fn on_join(
        &mut self,
        user_id: UserId,
        outbound: mpsc::Sender<ServerEvent>,
        reply: oneshot::Sender<Result<(), JoinError>>,
    ) {
        if self.session.status.is_terminal() {
            let _ = reply.send(Err(JoinError::Ended));
            return;
        }
        if user_id != self.session.user_id {
            tracing::warn!(
                session_id = %self.session.id,
                %user_id,
                "Join rejected: session belongs to another user"
            );
            let _ = reply.send(Err(JoinError::NotOwner));
            return;
        }

        let rebind = self.outbound.is_some();
        self.outbound = Some(outbound);
        // Cancel any pending grace timer and restart chunk numbering; seqs
        // are per-connection.
        self.disconnect_epoch += 1;
        self.reorder.reset();
        self.session.touch();
        let _ = reply.send(Ok(()));

        self.emit(ServerEvent::joined(
            self.session.id,
            self.session.config.mode,
            self.session.config.difficulty,
        ));

        if self.session.status == SessionStatus::Created {
            self.set_status(SessionStatus::Ready);
            self.begin_interview();
        } else {
            tracing::info!(
                session_id = %self.session.id,
                rebind,
                question_index = self.session.current_question_index,
                turn = %self.turn.state(),
                "Connection bound to session in progress"
            );
        }
    }

    fn begin_interview(&mut self) {
        let Some(first) = self.session.current_question() else {
            tracing::warn!(session_id = %self.session.id, "Session has no questions");
            self.finalize(&FinalizeCause::Completed);
            return;
        };
        let opening = judge::compose_opening(first);
        self.progress = QuestionProgress::new(self.transcript.next_seq());
        self.speak(UtteranceKind::Opening, opening, None);
    }

    fn on_disconnected(&mut self, dead: &mpsc::Sender<ServerEvent>) {
        let Some(current) = &self.outbound else {
            return;
        };
        if !current.same_channel(dead) {
            tracing::debug!(
                session_id = %self.session.id,
                "Disconnect for an already replaced connection ignored"
            );
            return;
        }
        self.outbound = None;
        tracing::info!(
            session_id = %self.session.id,
            grace_ms = self.config.disconnect_grace_ms,
            "Connection lost; holding session for reconnect"
        );
        self.arm_grace_timer();
    }

    fn on_grace_expired(&mut self, epoch: u64) {
        if epoch != self.disconnect_epoch || self.outbound.is_some() {
            return;
        }
        tracing::info!(session_id = %self.session.id, "Reconnect grace expired");
        self.finalize(&FinalizeCause::ClientTimeout);
    }

    fn on_budget_expired(&mut self) {
        tracing::info!(session_id = %self.session.id, "Session time budget exhausted");
        self.finalize(&FinalizeCause::TimeBudget);
    }

    // ── Client protocol ──────────────────────────────────────────────────

    fn on_client(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::SessionJoin { .. } => {
                tracing::debug!(session_id = %self.session.id, "Duplicate session:join ignored");
            }
            ClientEvent::AudioStart => self.on_audio_start(),
            ClientEvent::AudioStream { seq, bytes } => self.on_audio_stream(seq, bytes),
            ClientEvent::AudioStop => self.on_audio_stop(),
            ClientEvent::SessionEnd => self.finalize(&FinalizeCause::UserRequest),
        }
    }

    /// Candidate audio is only meaningful while the candidate holds the
    /// floor of an active session.
    fn accepting_audio(&self) -> bool {
        self.session.status == SessionStatus::Active && self.turn.state().accepts_audio()
    }

    fn on_audio_start(&mut self) {
        if !self.accepting_audio() {
            tracing::debug!(
                session_id = %self.session.id,
                turn = %self.turn.state(),
                "audio:start outside the candidate's turn ignored"
            );
            return;
        }
        self.utterance += 1;
        self.finish_requested = false;
        self.ticks_armed = false;
        self.session.touch();
    }

    fn on_audio_stream(&mut self, seq: u64, bytes: Bytes) {
        if !self.accepting_audio() {
            tracing::debug!(
                session_id = %self.session.id,
                turn = %self.turn.state(),
                seq,
                "Audio chunk outside the candidate's turn dropped"
            );
            return;
        }
        self.session.touch();
        for chunk in self.reorder.accept(seq, bytes) {
            self.backlog.push(chunk);
        }
        self.pump_stt();
    }

    fn on_audio_stop(&mut self) {
        if !self.accepting_audio() {
            tracing::debug!(
                session_id = %self.session.id,
                turn = %self.turn.state(),
                "audio:stop outside the candidate's turn ignored"
            );
            return;
        }
        self.close_utterance();
    }

    /// The candidate's answer is done (explicit stop or silence timeout).
    /// Once the transcription backlog drains, the utterance-closing call
    /// produces the final hypothesis and evaluation follows.
    fn close_utterance(&mut self) {
        if let Err(err) = self.turn.transition(TurnState::Evaluating) {
            tracing::warn!(session_id = %self.session.id, %err, "Cannot close the answer");
            return;
        }
        self.silence_epoch += 1;
        self.tick_epoch += 1;
        self.ticks_armed = false;
        self.finish_requested = true;
        self.session.touch();
        self.pump_stt();
    }

    // ── Transcription ────────────────────────────────────────────────────

    /// Keep exactly one transcription call in flight while work remains.
    fn pump_stt(&mut self) {
        if self.stt_busy {
            return;
        }
        if let Some(chunk) = self.backlog.pop() {
            self.stt_busy = true;
            ingest::spawn_transcribe(
                Arc::clone(&self.deps.stt),
                self.inbox_tx.clone(),
                self.session.id,
                self.utterance,
                chunk,
                self.config.stt_max_retries,
                self.config.stt_retry_backoff_ms,
            );
        } else if self.finish_requested {
            self.finish_requested = false;
            self.stt_busy = true;
            ingest::spawn_finish(
                Arc::clone(&self.deps.stt),
                self.inbox_tx.clone(),
                self.session.id,
                self.utterance,
                self.config.stt_max_retries,
                self.config.stt_retry_backoff_ms,
            );
        }
    }

    fn on_stt_done(
        &mut self,
        utterance: u64,
        closing: bool,
        result: Result<Option<SttFragment>, SttError>,
    ) {
        self.stt_busy = false;
        if utterance != self.utterance {
            tracing::debug!(
                session_id = %self.session.id,
                got = utterance,
                current = self.utterance,
                "Discarding transcription result for a previous utterance"
            );
            self.pump_stt();
            return;
        }
        match result {
            Err(err) => {
                self.finalize(&FinalizeCause::Fatal(format!("transcription failed: {err}")));
            }
            Ok(None) if closing => self.on_final_fragment(None),
            Ok(None) => self.pump_stt(),
            Ok(Some(fragment)) if closing || fragment.is_final => {
                self.on_final_fragment(Some(fragment));
                self.pump_stt();
            }
            Ok(Some(fragment)) => {
                self.on_partial_fragment(&fragment);
                self.pump_stt();
            }
        }
    }

    fn on_partial_fragment(&mut self, fragment: &SttFragment) {
        self.transcript.update_user_partial(&fragment.text);
        if self.backlog.is_empty() {
            self.emit(ServerEvent::transcript(
                Speaker::User,
                fragment.text.clone(),
                false,
            ));
        } else {
            // Caption updates are pointless while we are behind; the next
            // caught-up hypothesis supersedes this one anyway.
            tracing::debug!(
                session_id = %self.session.id,
                backlog = self.backlog.len(),
                "Suppressing caption update under transcription backlog"
            );
        }
        if self.turn.state().accepts_audio() {
            self.arm_silence_timer();
            if !self.ticks_armed {
                self.ticks_armed = true;
                self.arm_partial_tick(self.config.partial_eval_after_ms, true);
            }
        }
    }

    /// The utterance is committed: either the closing call returned its
    /// final hypothesis, or the recognizer detected the boundary itself.
    fn on_final_fragment(&mut self, fragment: Option<SttFragment>) {
        let final_text = match fragment {
            Some(fragment) => fragment.text,
            None => self
                .transcript
                .open_user_partial()
                .map(|open| open.text.clone())
                .unwrap_or_default(),
        };

        self.silence_epoch += 1;
        self.tick_epoch += 1;
        self.ticks_armed = false;

        if !final_text.trim().is_empty() {
            self.transcript.commit_user_final(&final_text);
            self.progress.has_final_answer = true;
            self.emit(ServerEvent::transcript(Speaker::User, final_text, true));
        }

        if self.turn.state() != TurnState::Evaluating {
            if let Err(err) = self.turn.transition(TurnState::Evaluating) {
                tracing::debug!(
                    session_id = %self.session.id,
                    %err,
                    "Final hypothesis landed outside the candidate's turn; evaluation deferred"
                );
                return;
            }
        }
        self.dispatch_evaluation(true);
    }

    // ── Evaluation ───────────────────────────────────────────────────────

    fn dispatch_evaluation(&self, is_final: bool) {
        let Some(question) = self.session.current_question() else {
            return;
        };
        let request = EvaluationRequest {
            question: question.to_owned(),
            transcript_so_far: self.transcript.user_text_since(self.progress.started_seq),
            is_final,
            context: EvaluationContext {
                mode: self.session.config.mode,
                difficulty: self.session.config.difficulty,
                skills: self.session.config.skills.clone(),
                question_index: self.session.current_question_index,
                probes_used: self.progress.probes_used,
            },
        };
        judge::spawn_evaluation(
            Arc::clone(&self.deps.evaluator),
            self.inbox_tx.clone(),
            self.turn.generation(),
            request,
            self.config.evaluator_timeout_ms,
        );
    }

    fn on_evaluation_ready(&mut self, generation: Generation, verdict: EvaluationVerdict) {
        if generation.is_stale(self.turn.generation()) {
            tracing::debug!(
                session_id = %self.session.id,
                %generation,
                current = %self.turn.generation(),
                "Discarding stale verdict"
            );
            return;
        }
        tracing::debug!(
            session_id = %self.session.id,
            action = ?verdict.action,
            score = ?verdict.score,
            "Evaluator verdict"
        );
        let mut decision = Decision::new(verdict.action, verdict.text);
        if let Some(feedback) = verdict.feedback {
            decision = decision.with_reason(feedback);
        }
        let step = self
            .planner
            .plan(decision, &mut self.progress, Instant::now());
        self.apply_step(step);
    }

    fn on_evaluation_failed(&mut self, generation: Generation, detail: &str) {
        if generation.is_stale(self.turn.generation()) {
            tracing::debug!(
                session_id = %self.session.id,
                %generation,
                "Discarding failure of a stale evaluation"
            );
            return;
        }
        tracing::warn!(
            session_id = %self.session.id,
            detail,
            "Evaluation unavailable; applying fallback"
        );
        let step = self.planner.fallback(&self.progress);
        self.apply_step(step);
    }

    fn apply_step(&mut self, step: PlannedStep) {
        match step {
            PlannedStep::Stay => {
                // An answer under judgment goes back to the candidate.
                if self.turn.state() == TurnState::Evaluating {
                    if let Err(err) = self.turn.transition(TurnState::Listening) {
                        tracing::warn!(session_id = %self.session.id, %err, "Cannot return the floor");
                    }
                }
            }
            PlannedStep::Speak {
                kind: UtteranceKind::MoveForward,
                decision,
            } => self.advance_or_close(decision),
            PlannedStep::Speak { kind, decision } => {
                self.speak(kind, decision.text, decision.reason);
            }
        }
    }

    /// A `move_forward` either asks the next question or, when the list is
    /// exhausted, speaks the closing remark and ends the session after it.
    fn advance_or_close(&mut self, decision: Decision) {
        match self.session.advance_question().map(str::to_owned) {
            Some(next) => {
                self.progress = QuestionProgress::new(self.transcript.next_seq());
                let text = judge::compose_move_forward(&decision.text, Some(&next));
                self.speak(UtteranceKind::MoveForward, text, None);
            }
            None => {
                self.closing = true;
                let text = judge::compose_move_forward(&decision.text, None);
                self.speak(UtteranceKind::MoveForward, text, None);
            }
        }
    }

    // ── Speaking ─────────────────────────────────────────────────────────

    fn speak(&mut self, kind: UtteranceKind, text: String, reason: Option<String>) {
        let generation = match self.turn.transition(TurnState::AiSpeaking) {
            Ok(generation) => generation,
            Err(err) => {
                tracing::warn!(session_id = %self.session.id, %err, "Cannot take the floor");
                return;
            }
        };
        if let Some(superseded) = self.speech.begin(generation) {
            tracing::debug!(
                session_id = %self.session.id,
                %superseded,
                "Superseding a pending synthesis"
            );
        }
        speech::spawn_synthesis(
            Arc::clone(&self.deps.tts),
            self.inbox_tx.clone(),
            generation,
            kind,
            text,
            reason,
            self.config.tts_timeout_ms,
        );
    }

    fn on_synthesis_done(
        &mut self,
        generation: Generation,
        kind: UtteranceKind,
        text: String,
        reason: Option<String>,
        audio: Option<Bytes>,
    ) {
        if !self.speech.finish(generation) {
            tracing::debug!(
                session_id = %self.session.id,
                %generation,
                "Discarding superseded synthesis result"
            );
            return;
        }

        let event = match kind {
            UtteranceKind::Opening => ServerEvent::started(text.clone(), audio),
            UtteranceKind::Interruption => ServerEvent::AiInterrupt {
                text: text.clone(),
                reason,
                audio,
            },
            UtteranceKind::Probe => ServerEvent::AiProbe {
                text: text.clone(),
                audio,
            },
            UtteranceKind::Redirect => ServerEvent::AiRedirect {
                text: text.clone(),
                audio,
            },
            UtteranceKind::MoveForward => ServerEvent::AiMoveForward {
                text: text.clone(),
                audio,
            },
            UtteranceKind::Answer => {
                tracing::error!(session_id = %self.session.id, "Synthesized a candidate utterance");
                if let Err(err) = self.turn.transition(TurnState::Listening) {
                    tracing::warn!(session_id = %self.session.id, %err, "Cannot return the floor");
                }
                return;
            }
        };
        self.transcript.push_ai(kind, text);
        self.emit(event);

        if kind == UtteranceKind::Opening {
            self.set_status(SessionStatus::Active);
            self.arm_budget_timer();
            tracing::info!(
                session_id = %self.session.id,
                questions = self.session.config.questions.len(),
                "Interview started"
            );
        }

        if self.closing && kind == UtteranceKind::MoveForward {
            self.finalize(&FinalizeCause::Completed);
            return;
        }

        // Delivery complete; the candidate gets the floor.
        let next = if kind == UtteranceKind::Probe {
            TurnState::UserSpeakingFollowup
        } else {
            TurnState::Listening
        };
        if let Err(err) = self.turn.transition(next) {
            tracing::warn!(session_id = %self.session.id, %err, "Cannot hand over the floor");
        }
    }

    // ── Timers ───────────────────────────────────────────────────────────

    fn arm_silence_timer(&mut self) {
        self.silence_epoch += 1;
        let epoch = self.silence_epoch;
        let delay = Duration::from_millis(self.config.silence_timeout_ms);
        let inbox = self.inbox_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = inbox.send(SessionEvent::SilenceElapsed { epoch });
        });
    }

    fn on_silence_elapsed(&mut self, epoch: u64) {
        if epoch != self.silence_epoch || !self.accepting_audio() {
            return;
        }
        let has_open_answer = self
            .transcript
            .open_user_partial()
            .is_some_and(|open| !open.text.trim().is_empty());
        if !has_open_answer {
            return;
        }
        tracing::info!(
            session_id = %self.session.id,
            silence_ms = self.config.silence_timeout_ms,
            "Silence timeout; treating the answer as finished"
        );
        self.close_utterance();
    }

    fn arm_partial_tick(&mut self, delay_ms: u64, fresh: bool) {
        if fresh {
            self.tick_epoch += 1;
        }
        let epoch = self.tick_epoch;
        let delay = Duration::from_millis(delay_ms);
        let inbox = self.inbox_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = inbox.send(SessionEvent::PartialEvalDue { epoch });
        });
    }

    fn on_partial_eval_due(&mut self, epoch: u64) {
        if epoch != self.tick_epoch {
            return;
        }
        if !self.accepting_audio() {
            // The chain dies here; the next partial hypothesis restarts it.
            self.ticks_armed = false;
            return;
        }
        let has_text = self
            .transcript
            .open_user_partial()
            .is_some_and(|open| !open.text.trim().is_empty());
        if has_text {
            self.dispatch_evaluation(false);
        }
        self.arm_partial_tick(self.config.partial_eval_interval_ms, false);
    }

    fn arm_grace_timer(&mut self) {
        self.disconnect_epoch += 1;
        let epoch = self.disconnect_epoch;
        let delay = Duration::from_millis(self.config.disconnect_grace_ms);
        let inbox = self.inbox_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = inbox.send(SessionEvent::GraceExpired { epoch });
        });
    }

    fn arm_budget_timer(&self) {
        let configured = self.session.config.duration_secs;
        let cap = self.config.max_session_duration_secs;
        let secs = if configured == 0 {
            cap
        } else {
            configured.min(cap)
        };
        let inbox = self.inbox_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            let _ = inbox.send(SessionEvent::BudgetExpired);
        });
    }

    // ── Teardown ─────────────────────────────────────────────────────────

    /// Tear the session down exactly once: terminal status, the report,
    /// one terminal event, then removal from the registry.
    fn finalize(&mut self, cause: &FinalizeCause) {
        if self.finalizing {
            tracing::debug!(session_id = %self.session.id, "Duplicate finalize ignored");
            return;
        }
        self.finalizing = true;
        self.set_status(cause.status());
        self.turn.invalidate();
        self.speech.cancel();

        tracing::info!(
            session_id = %self.session.id,
            cause = cause.label(),
            questions_completed = self.session.questions_completed(),
            duration_secs = self.session.elapsed_secs(),
            "Session finalized"
        );

        finalizer::spawn_report(
            Arc::clone(&self.deps.reporter),
            self.session.id,
            self.transcript.freeze(),
        );
        self.emit(cause.terminal_event(
            self.session.questions_completed(),
            self.session.elapsed_secs(),
        ));
        self.outbound = None;
        self.registry.remove(&self.session.id);
    }

    // ── Plumbing ─────────────────────────────────────────────────────────

    fn set_status(&mut self, next: SessionStatus) {
        if self.session.status == next {
            return;
        }
        if !self.session.status.can_transition_to(next) {
            tracing::warn!(
                session_id = %self.session.id,
                from = ?self.session.status,
                to = ?next,
                "Illegal status transition ignored"
            );
            return;
        }
        tracing::debug!(
            session_id = %self.session.id,
            from = ?self.session.status,
            to = ?next,
            "Status transition"
        );
        self.session.status = next;
    }

    /// Best-effort delivery to the bound connection. A full queue drops the
    /// event; a closed one unbinds and starts the reconnect grace period.
    fn emit(&mut self, event: ServerEvent) {
        let Some(tx) = &self.outbound else {
            tracing::debug!(
                session_id = %self.session.id,
                event = event.event_name(),
                "No connection bound; dropping event"
            );
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    session_id = %self.session.id,
                    event = event.event_name(),
                    "Outbound queue full; dropping event"
                );
            }
            Err(TrySendError::Closed(event)) => {
                tracing::debug!(
                    session_id = %self.session.id,
                    event = event.event_name(),
                    "Connection closed; unbinding"
                );
                self.outbound = None;
                if !self.finalizing {
                    self.arm_grace_timer();
                }
            }
        }
    }
}
