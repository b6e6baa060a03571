//! Events the client sends to the engine.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::codec::b64;
use crate::domain::SessionId;

/// Client-to-server events, tagged by protocol name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Bind this connection to a prepared session.
    #[serde(rename = "session:join")]
    SessionJoin {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
    },

    /// The candidate is about to stream microphone audio.
    #[serde(rename = "audio:start")]
    AudioStart,

    /// One captured audio chunk.
    ///
    /// `seq` starts at 1 on each connection and increments by one per
    /// chunk; the engine reorders out-of-order arrivals within a bounded
    /// window.
    #[serde(rename = "audio:stream")]
    AudioStream {
        seq: u64,
        /// Base64-encoded audio payload.
        #[serde(with = "b64")]
        bytes: Bytes,
    },

    /// The candidate finished speaking.
    #[serde(rename = "audio:stop")]
    AudioStop,

    /// The candidate asked to end the interview early.
    #[serde(rename = "session:end")]
    SessionEnd,
}

impl ClientEvent {
    /// Protocol name of this event, for logging.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::SessionJoin { .. } => "session:join",
            Self::AudioStart => "audio:start",
            Self::AudioStream { .. } => "audio:stream",
            Self::AudioStop => "audio:stop",
            Self::SessionEnd => "session:end",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_parses_from_wire_json() {
        let id = SessionId::new();
        let json = format!(r#"{{"type":"session:join","sessionId":"{id}"}}"#);
        let event: ClientEvent = serde_json::from_str(&json).unwrap();
        match event {
            ClientEvent::SessionJoin { session_id } => assert_eq!(session_id, id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn audio_stream_decodes_base64_payload() {
        let json = r#"{"type":"audio:stream","seq":3,"bytes":"AAEC"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        match event {
            ClientEvent::AudioStream { seq, bytes } => {
                assert_eq!(seq, 3);
                assert_eq!(bytes.as_ref(), &[0u8, 1, 2]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let json = r#"{"type":"audio:rewind"}"#;
        assert!(serde_json::from_str::<ClientEvent>(json).is_err());
    }

    #[test]
    fn malformed_base64_is_rejected() {
        let json = r#"{"type":"audio:stream","seq":1,"bytes":"@@not-base64@@"}"#;
        assert!(serde_json::from_str::<ClientEvent>(json).is_err());
    }
}
