//! localrag CLI
//!
//! Main entry point for the localrag command-line tool.
//! Answers questions from local documents, falling back to the web.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AddCommand, AskCommand, ChatCommand, IngestCommand, StatusCommand};
use localrag_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// localrag - question answering over your own PDFs and notes
#[derive(Parser, Debug)]
#[command(name = "localrag")]
#[command(about = "Question answering over local documents with web fallback", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "LOCALRAG_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "LOCALRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Defaults to `chat` when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive question answering session
    Chat(ChatCommand),

    /// Answer a single question
    Ask(AskCommand),

    /// Build or update the vector store from data/
    Ingest(IngestCommand),

    /// Copy files into data/pdf or data/txt
    Add(AddCommand),

    /// Show workspace and index status
    Status(StatusCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // File and environment first, then flags
    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("localrag starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Model: {}", config.llm.model);

    config.validate()?;

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Chat(ChatCommand::default()));

    let command_name = match &command {
        Commands::Chat(_) => "chat",
        Commands::Ask(_) => "ask",
        Commands::Ingest(_) => "ingest",
        Commands::Add(_) => "add",
        Commands::Status(_) => "status",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Add(cmd) => cmd.execute(&config).await,
        Commands::Status(cmd) => cmd.execute(&config).await,
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
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["localrag"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_ask_flags() {
        let cli = Cli::try_parse_from([
            "localrag", "ask", "-k", "3", "--threshold", "0.4", "What", "are", "cats?",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Ask(cmd)) => {
                assert_eq!(cmd.k, Some(3));
                assert_eq!(cmd.threshold, Some(0.4));
                assert_eq!(cmd.question(), "What are cats?");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
