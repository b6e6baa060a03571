//! Binary entry point.
//!
//! Parses arguments, loads the environment, and hands the assembled
//! configuration to the gateway. All service wiring lives in
//! `viva_axum::bootstrap`, not here.

#![deny(unused_crate_dependencies)]

mod commands;
mod parser;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::Commands;
use parser::Cli;
use viva_axum::{ServerConfig, ServiceEndpoints, start_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            stt_url,
            tts_url,
            evaluator_url,
            report_url,
            auth_url,
            api_key,
            allowed_origins,
        } => {
            let mut config = ServerConfig::with_defaults()
                .with_host(host)
                .with_port(port);
            config.services = ServiceEndpoints {
                stt_url,
                tts_url,
                evaluator_url,
                report_url,
                auth_url,
                api_key,
            };
            if !allowed_origins.is_empty() {
                config = config.with_allowed_origins(allowed_origins);
            }

            start_server(config).await?;
        }
    }

    Ok(())
}
