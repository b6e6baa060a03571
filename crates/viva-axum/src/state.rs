//! Shared application state type.

use std::sync::Arc;

use crate::bootstrap::GatewayContext;

/// Application state shared across all handlers.
///
/// An Arc-wrapped [`GatewayContext`] holding the session registry and the
/// token validator.
pub type AppState = Arc<GatewayContext>;
