#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

mod actor;
mod config;
mod error;
mod finalizer;
mod ingest;
mod judge;
mod registry;
mod speech;
mod turn;

pub use actor::Collaborators;
pub use config::EngineConfig;
pub use error::{EngineError, JoinError};
pub use registry::{SessionHandle, SessionRegistry};

// Integration tests implement the engine's ports.
#[cfg(test)]
use async_trait as _;
