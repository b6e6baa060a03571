//! WebSocket gateway for live interview sessions.
//!
//! `GET /ws?token=…` upgrades the connection to the session event
//! protocol. Every frame in both directions is a JSON text frame tagged
//! with a `type` field:
//!
//! | Direction | Type | Content |
//! |---|---|---|
//! | Client → Server | `session:join` | bind this socket to a prepared session |
//! | Client → Server | `audio:start` / `audio:stream` / `audio:stop` | utterance lifecycle, chunks base64-coded |
//! | Client → Server | `session:end` | end the interview early |
//! | Server → Client | `session:joined`, `session:started`, `transcript:partial`, `ai:*` | live session events |
//! | Server → Client | `session:ended` / `session:error` | terminal, nothing follows |
//!
//! ## Lifecycle
//!
//! 1. The token query parameter is validated through the auth port; the
//!    upgrade never completes for an unknown bearer.
//! 2. The first well-formed frame must be `session:join`. The gateway
//!    resolves the session in the registry and offers the actor this
//!    socket's outbound channel; the actor decides whether the join is
//!    allowed (ownership, liveness).
//! 3. After the bind the socket is a dumb pipe. An ingress task turns
//!    text frames into [`ClientEvent`]s and posts them to the session
//!    inbox (malformed frames are logged and dropped); an egress task
//!    drains the outbound channel into JSON frames.
//! 4. `tokio::select!` waits for either task to finish - graceful close
//!    and network drop land in the same place - then the actor is told
//!    the socket is gone so its reconnect grace period starts. The
//!    session itself keeps running; only the finalizer removes it.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use viva_core::{ClientEvent, ServerEvent, SessionId, UserId};
use viva_engine::SessionHandle;

use crate::error::HttpError;
use crate::state::AppState;

/// Outbound events buffered per connection. The actor drops non-terminal
/// events once this fills rather than stalling the session.
const OUTBOUND_BUFFER: usize = 256;

#[derive(Debug, Deserialize)]
pub(crate) struct WsQuery {
    token: Option<String>,
}

/// `GET /ws` - WebSocket upgrade for the session event protocol.
///
/// The bearer token rides the `token` query parameter because browsers
/// cannot set headers on a WebSocket handshake. It is validated before
/// the upgrade completes, so a bad token costs an HTTP 401 instead of a
/// doomed socket.
pub(crate) async fn session_ws(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let token = query
        .token
        .ok_or_else(|| HttpError::Unauthorized("missing token".to_string()))?;
    let user_id = state.auth.validate(&token).await?;
    Ok(ws.on_upgrade(move |socket| handle_session_ws(socket, state, user_id)))
}

async fn handle_session_ws(socket: WebSocket, state: AppState, user_id: UserId) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // A connection speaks for exactly one session.
    let Some((session_id, handle)) = await_join(&mut ws_sender, &mut ws_receiver, &state).await
    else {
        return;
    };

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<ServerEvent>(OUTBOUND_BUFFER);

    if let Err(err) = handle.join(user_id.clone(), outbound_tx.clone()).await {
        tracing::warn!(
            session_id = %session_id,
            user_id = %user_id,
            error = %err,
            "Join refused"
        );
        send_event(&mut ws_sender, &ServerEvent::error(err.to_string())).await;
        let _ = ws_sender.send(Message::Close(None)).await;
        return;
    }

    tracing::info!(session_id = %session_id, user_id = %user_id, "Connection bound to session");

    // ── Ingress: text frames → client events → session inbox ─────────────

    let mut ingress = tokio::spawn({
        let handle = handle.clone();
        async move {
            while let Some(message) = ws_receiver.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        let Some(event) = parse_frame(text.as_str()) else {
                            continue;
                        };
                        if matches!(event, ClientEvent::SessionJoin { .. }) {
                            // One bind per socket; reconnects open a fresh one.
                            tracing::warn!(
                                session_id = %handle.id(),
                                "Duplicate session:join dropped"
                            );
                            continue;
                        }
                        if handle.send(event).is_err() {
                            // Actor already tore down; egress sees its
                            // channel close and finishes the teardown.
                            break;
                        }
                    }
                    Ok(Message::Binary(_)) => {
                        tracing::warn!(
                            session_id = %handle.id(),
                            "Binary frame dropped; audio rides audio:stream"
                        );
                    }
                    // Graceful close or protocol error - stop the loop.
                    Ok(Message::Close(_)) | Err(_) => break,
                    // Ignore ping/pong frames.
                    Ok(_) => {}
                }
            }
        }
    });

    // ── Egress: outbound channel → JSON text frames ───────────────────────

    let mut egress = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let terminal = event.is_terminal();
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(err) => {
                    tracing::error!(error = %err, "Failed to encode server event");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
            if terminal {
                // Terminal events are the last thing a session says.
                let _ = ws_sender.send(Message::Close(None)).await;
                break;
            }
        }
    });

    // Wait for whichever task finishes first, then abort the other. This
    // lands graceful closes and abrupt network drops in the same place.
    tokio::select! {
        _ = &mut ingress => { egress.abort(); }
        _ = &mut egress => { ingress.abort(); }
    }

    // Tell the actor this socket is gone so its reconnect grace starts.
    // If the session already rebound to a newer socket the notice is
    // stale and the actor ignores it.
    handle.disconnected(outbound_tx);

    tracing::info!(session_id = %session_id, "Connection closed");
}

/// Read frames until the first well-formed `session:join`, resolve the
/// session, and hand back its live handle.
///
/// Returns `None` when the socket closes first or the session does not
/// exist (the client gets a `session:error` before the close).
async fn await_join(
    ws_sender: &mut SplitSink<WebSocket, Message>,
    ws_receiver: &mut SplitStream<WebSocket>,
    state: &AppState,
) -> Option<(SessionId, SessionHandle)> {
    while let Some(message) = ws_receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match parse_frame(text.as_str()) {
                Some(ClientEvent::SessionJoin { session_id }) => {
                    match state.registry.get(session_id) {
                        Ok(handle) => return Some((session_id, handle)),
                        Err(err) => {
                            tracing::warn!(session_id = %session_id, error = %err, "Join target not found");
                            send_event(ws_sender, &ServerEvent::error(err.to_string())).await;
                            let _ = ws_sender.send(Message::Close(None)).await;
                            return None;
                        }
                    }
                }
                Some(other) => {
                    tracing::warn!(
                        event = other.event_name(),
                        "Frame before session:join dropped"
                    );
                }
                None => {}
            },
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => {}
        }
    }
    None
}

/// Decode one inbound text frame. Malformed frames are logged and dropped
/// so a buggy client cannot kill its own session with one bad payload.
fn parse_frame(text: &str) -> Option<ClientEvent> {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::warn!(error = %err, "Malformed client frame dropped");
            None
        }
    }
}

async fn send_event(sender: &mut SplitSink<WebSocket, Message>, event: &ServerEvent) {
    if let Ok(frame) = serde_json::to_string(event) {
        let _ = sender.send(Message::Text(frame.into())).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_frames_parse() {
        let event = parse_frame(r#"{"type":"audio:start"}"#).unwrap();
        assert!(matches!(event, ClientEvent::AudioStart));

        let event = parse_frame(r#"{"type":"audio:stream","seq":1,"bytes":"AAEC"}"#).unwrap();
        assert!(matches!(event, ClientEvent::AudioStream { seq: 1, .. }));
    }

    #[test]
    fn malformed_frames_drop_to_none() {
        assert!(parse_frame("not json").is_none());
        assert!(parse_frame(r#"{"type":"audio:rewind"}"#).is_none());
        assert!(parse_frame(r#"{"type":"audio:stream","seq":"one","bytes":""}"#).is_none());
    }
}
