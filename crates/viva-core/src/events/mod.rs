//! Wire events exchanged over a session's WebSocket connection.
//!
//! This module is the single source of truth for the client-facing event
//! contract. Both directions are closed tagged unions: unknown `type` tags
//! or malformed payloads fail deserialization at the gateway and never
//! reach a session actor.
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag carrying the protocol name:
//!
//! ```json
//! { "type": "transcript:partial", "speaker": "user", "text": "so I would", "isFinal": false }
//! ```
//!
//! Audio payloads travel as base64 strings inside the JSON envelope and are
//! exposed as [`bytes::Bytes`] on the Rust side.

mod client;
mod codec;
mod server;

pub use client::ClientEvent;
pub use server::{EndReason, ServerEvent};
