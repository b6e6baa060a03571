//! Gateway bootstrap - the composition root.
//!
//! This module is the only place where concrete collaborator clients are
//! wired into the engine. Everything downstream works against the
//! `viva-core` port traits.

use std::sync::Arc;

use anyhow::Result;
use viva_core::TokenValidator;
use viva_engine::{Collaborators, EngineConfig, SessionRegistry};
use viva_remote::{RemoteAuth, RemoteConfig, RemoteEvaluator, RemoteReporter, RemoteStt, RemoteTts};

/// CORS configuration for the gateway.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Base URLs of the collaborator services, plus the shared API key.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub stt_url: String,
    pub tts_url: String,
    pub evaluator_url: String,
    pub report_url: String,
    pub auth_url: String,
    /// Bearer token presented to every collaborator, when set.
    pub api_key: Option<String>,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            stt_url: "http://127.0.0.1:7101".to_string(),
            tts_url: "http://127.0.0.1:7102".to_string(),
            evaluator_url: "http://127.0.0.1:7103".to_string(),
            report_url: "http://127.0.0.1:7104".to_string(),
            auth_url: "http://127.0.0.1:7105".to_string(),
            api_key: None,
        }
    }
}

/// Server configuration for the gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// Port for the HTTP server.
    pub port: u16,
    /// Where the collaborator services live.
    pub services: ServiceEndpoints,
    /// Pacing and capacity settings for session actors.
    pub engine: EngineConfig,
    /// CORS configuration.
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Create config with default endpoints and engine pacing.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8070,
            services: ServiceEndpoints::default(),
            engine: EngineConfig::default(),
            cors: CorsConfig::default(),
        }
    }

    /// Set the bind host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the bind port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

/// Application context for the gateway.
///
/// Holds everything the handlers need: the session registry (which owns
/// the actors and their collaborator set) and the token validator for
/// connection auth.
pub struct GatewayContext {
    pub registry: SessionRegistry,
    pub auth: Arc<dyn TokenValidator>,
}

fn remote_config(base_url: &str, api_key: Option<String>) -> RemoteConfig {
    RemoteConfig::new()
        .with_base_url(base_url)
        .with_optional_api_key(api_key)
}

/// Bootstrap the gateway context from configuration.
///
/// Pure construction: no sockets are opened and no collaborator is
/// contacted until a session actually runs.
#[must_use]
pub fn bootstrap(config: &ServerConfig) -> GatewayContext {
    let services = &config.services;
    let key = services.api_key.clone();

    // 1. One HTTP client per collaborator service. Transcription gets no
    //    client-side retries: the engine retries chunks with its own
    //    backoff, and stacking two retry layers would blow the latency
    //    budget of a live conversation.
    let stt = Arc::new(RemoteStt::new(
        &remote_config(&services.stt_url, key.clone()).with_max_retries(0),
    ));
    let tts = Arc::new(RemoteTts::new(&remote_config(&services.tts_url, key.clone())));
    let evaluator = Arc::new(RemoteEvaluator::new(&remote_config(
        &services.evaluator_url,
        key.clone(),
    )));
    let reporter = Arc::new(RemoteReporter::new(&remote_config(
        &services.report_url,
        key.clone(),
    )));
    let auth: Arc<dyn TokenValidator> = Arc::new(RemoteAuth::new(&remote_config(
        &services.auth_url,
        key,
    )));

    // 2. Collaborator set shared by every session actor
    let deps = Collaborators {
        stt,
        tts,
        evaluator,
        reporter,
    };

    // 3. Session registry owning actor creation and lookup
    let registry = SessionRegistry::new(config.engine.clone(), deps);

    GatewayContext { registry, auth }
}

/// Start the gateway on the configured host and port.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;

    let ctx = bootstrap(&config);
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("viva gateway listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
