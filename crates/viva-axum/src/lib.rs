#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

mod bootstrap;
mod error;
mod gateway;
mod routes;
mod state;

pub use bootstrap::{
    CorsConfig, GatewayContext, ServerConfig, ServiceEndpoints, bootstrap, start_server,
};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;

// Silence unused dev-dependency warnings
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tower as _;
