//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the interview gateway.
#[derive(Parser)]
#[command(name = "viva")]
#[command(about = "Run the live AI interview gateway")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::parse_from([
            "viva",
            "serve",
            "--port",
            "9000",
            "--evaluator-url",
            "http://eval.internal:4010",
        ]);
        let Commands::Serve {
            port,
            evaluator_url,
            stt_url,
            ..
        } = cli.command;
        assert_eq!(port, 9000);
        assert_eq!(evaluator_url, "http://eval.internal:4010");
        assert_eq!(stt_url, "http://127.0.0.1:7101");
    }
}
