#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

mod auth;
mod config;
mod error;
mod evaluator;
mod http;
mod report;
mod stt;
mod tts;

pub use auth::RemoteAuth;
pub use config::RemoteConfig;
pub use evaluator::RemoteEvaluator;
pub use report::RemoteReporter;
pub use stt::RemoteStt;
pub use tts::RemoteTts;

// Silence unused dev-dependency warnings
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;
