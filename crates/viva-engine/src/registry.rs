//! Session registry: creates session actors and hands out their inboxes.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use viva_core::{ClientEvent, ServerEvent, Session, SessionConfig, SessionId, UserId};

use crate::actor::{Collaborators, SessionActor, SessionEvent};
use crate::config::EngineConfig;
use crate::error::EngineError;

/// Live sessions keyed by id. Each actor removes its own entry at teardown.
pub(crate) type SessionMap = DashMap<SessionId, SessionHandle>;

/// A cheap, cloneable address for one session actor.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    inbox: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    pub(crate) fn new(id: SessionId, inbox: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { id, inbox }
    }

    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Bind a connection to the session and wait for the actor's verdict.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::JoinRejected`] when the actor refuses the
    /// caller, or [`EngineError::SessionGone`] when the actor is already
    /// torn down.
    pub async fn join(
        &self,
        user_id: UserId,
        outbound: mpsc::Sender<ServerEvent>,
    ) -> Result<(), EngineError> {
        let (reply, verdict) = oneshot::channel();
        self.inbox
            .send(SessionEvent::Join {
                user_id,
                outbound,
                reply,
            })
            .map_err(|_| EngineError::SessionGone(self.id))?;
        match verdict.await {
            Ok(result) => result.map_err(EngineError::from),
            Err(_) => Err(EngineError::SessionGone(self.id)),
        }
    }

    /// Forward one client event to the actor.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionGone`] when the actor is torn down.
    pub fn send(&self, event: ClientEvent) -> Result<(), EngineError> {
        self.inbox
            .send(SessionEvent::Client(event))
            .map_err(|_| EngineError::SessionGone(self.id))
    }

    /// Tell the actor that the connection holding `outbound` went away.
    /// A no-op when the actor is already gone.
    pub fn disconnected(&self, outbound: mpsc::Sender<ServerEvent>) {
        let _ = self.inbox.send(SessionEvent::Disconnected { outbound });
    }
}

/// Owns the session map and the shared collaborator set.
pub struct SessionRegistry {
    sessions: Arc<SessionMap>,
    config: EngineConfig,
    deps: Collaborators,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(config: EngineConfig, deps: Collaborators) -> Self {
        Self {
            sessions: Arc::new(SessionMap::new()),
            config,
            deps,
        }
    }

    /// Create a session for `user_id` and spawn its actor. The session
    /// starts in `Created` and waits for the owner to join over a socket.
    pub fn create(&self, user_id: UserId, config: SessionConfig) -> SessionId {
        let id = SessionId::new();
        let session = Session::new(id, user_id, config);
        tracing::info!(
            session_id = %id,
            user_id = %session.user_id,
            mode = ?session.config.mode,
            questions = session.config.questions.len(),
            "Session created"
        );
        SessionActor::spawn(
            session,
            self.config.clone(),
            self.deps.clone(),
            Arc::clone(&self.sessions),
        );
        id
    }

    /// Look up a live session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] when no live actor holds
    /// this id.
    pub fn get(&self, id: SessionId) -> Result<SessionHandle, EngineError> {
        self.sessions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(EngineError::SessionNotFound(id))
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
