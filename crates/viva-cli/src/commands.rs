//! Available commands for the gateway binary.

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the interview gateway
    Serve {
        /// Host to bind to
        #[arg(long, env = "VIVA_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to serve the gateway on
        #[arg(short, long, env = "VIVA_PORT", default_value = "8070")]
        port: u16,

        /// Base URL of the transcription service
        #[arg(long, env = "VIVA_STT_URL", default_value = "http://127.0.0.1:7101")]
        stt_url: String,

        /// Base URL of the speech synthesis service
        #[arg(long, env = "VIVA_TTS_URL", default_value = "http://127.0.0.1:7102")]
        tts_url: String,

        /// Base URL of the answer evaluation service
        #[arg(long, env = "VIVA_EVALUATOR_URL", default_value = "http://127.0.0.1:7103")]
        evaluator_url: String,

        /// Base URL of the report generation service
        #[arg(long, env = "VIVA_REPORT_URL", default_value = "http://127.0.0.1:7104")]
        report_url: String,

        /// Base URL of the token validation service
        #[arg(long, env = "VIVA_AUTH_URL", default_value = "http://127.0.0.1:7105")]
        auth_url: String,

        /// API key presented to every collaborator service
        #[arg(long, env = "VIVA_SERVICE_API_KEY")]
        api_key: Option<String>,

        /// Comma-separated CORS origins (all origins allowed when omitted)
        #[arg(long, env = "VIVA_ALLOWED_ORIGINS", value_delimiter = ',')]
        allowed_origins: Vec<String>,
    },
}
