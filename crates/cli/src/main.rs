//! DocuChat CLI
//!
//! Main entry point for the docuchat command-line tool.
//! Answers questions about PDF and CSV documents using a hosted LLM.

mod commands;
mod session;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, ExtractCommand};
use docuchat_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// DocuChat - ask questions about your PDF and CSV files
#[derive(Parser, Debug)]
#[command(name = "docuchat")]
#[command(about = "Ask questions about your PDF and CSV files", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "DOCUCHAT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DOCUCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_color: bool,

    /// LLM provider (groq, ollama)
    #[arg(short, long, global = true, env = "DOCUCHAT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "DOCUCHAT_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask one question about a set of documents
    Ask(AskCommand),

    /// Chat interactively about a set of documents
    Chat(ChatCommand),

    /// Show the text extracted from documents
    Extract(ExtractCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Environment, .env and config file of the chosen workspace
    let config = AppConfig::load_from(cli.workspace, cli.config)?;

    let config = config.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;
    config.validate()?;

    tracing::info!("DocuChat CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Extract(_) => "extract",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Extract(cmd) => cmd.execute().await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "docuchat", "extract", "report.pdf", "--provider", "ollama", "-v",
        ])
        .unwrap();
        assert_eq!(cli.provider.as_deref(), Some("ollama"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Extract(_)));
    }

    #[test]
    fn test_no_color_env_accepts_any_value() {
        std::env::set_var("NO_COLOR", "1");
        let with_one = Cli::try_parse_from(["docuchat", "extract", "a.csv"]);
        std::env::set_var("NO_COLOR", "0");
        let with_zero = Cli::try_parse_from(["docuchat", "extract", "a.csv"]);
        std::env::remove_var("NO_COLOR");

        assert!(with_one.unwrap().no_color);
        assert!(!with_zero.unwrap().no_color);
    }
}
