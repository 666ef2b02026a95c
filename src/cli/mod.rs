//! CLI module: command parsing and dispatch
//!
//! All CLI logic lives here. `main.rs` calls `cli::run()`.

pub mod chat;
pub mod config;
pub mod trim;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};

use masgent::config::{log_ignored_overrides, Config};

#[derive(Parser)]
#[command(name = "masgent")]
#[command(version)]
#[command(
    about = "Conversation-window core for a materials-simulation AI assistant",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive AI mode
    Chat {
        /// Direct message to process (non-interactive mode)
        #[arg(short, long)]
        message: Option<String>,
        /// Override the configured window size
        #[arg(short, long)]
        window: Option<usize>,
    },
    /// Trim a JSON conversation history to a window
    Trim {
        /// History file (JSON array of messages)
        #[arg(short, long)]
        input: PathBuf,
        /// Override the configured window size
        #[arg(short, long)]
        window: Option<usize>,
        /// Write the trimmed history here (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate or print configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Check configuration for errors and warnings
    Check {
        /// Config file to check (defaults to ~/.masgent/config.json)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Print the effective configuration, including environment overrides
    Show,
}

/// Entry point for the CLI, called from main().
pub async fn run() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    // Load config early so we can respect the logging settings; fall back to
    // defaults if the config file is missing or unreadable. Rejected env
    // overrides are reported once the subscriber exists.
    let loaded = Config::load_deferred(&Config::path());
    let logging_cfg = loaded
        .as_ref()
        .map(|(config, _)| config.logging.clone())
        .unwrap_or_default();
    if let Err(e) = masgent::utils::logging::init_logging(&logging_cfg) {
        eprintln!("Warning: logging disabled: {}", e);
    }
    let config = loaded.map(|(config, ignored)| {
        log_ignored_overrides(&ignored);
        config
    });

    let cli = Cli::parse();

    match cli.command {
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
        }
        Some(Commands::Version) => {
            cmd_version();
        }
        Some(Commands::Chat { message, window }) => {
            let config = config.context("Failed to load configuration")?;
            chat::cmd_chat(config, message, window).await?;
        }
        Some(Commands::Trim {
            input,
            window,
            output,
        }) => {
            let window = match window {
                Some(size) => size,
                None => {
                    config
                        .context("Failed to load configuration")?
                        .window
                        .size
                }
            };
            trim::cmd_trim(&input, window, output.as_deref())?;
        }
        Some(Commands::Config { action }) => {
            config::cmd_config(action, config).await?;
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("masgent {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Conversation-window core for a materials-simulation AI assistant");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_trim_args() {
        let cli = Cli::parse_from(["masgent", "trim", "--input", "h.json", "--window", "4"]);
        match cli.command {
            Some(Commands::Trim {
                input,
                window,
                output,
            }) => {
                assert_eq!(input, PathBuf::from("h.json"));
                assert_eq!(window, Some(4));
                assert!(output.is_none());
            }
            _ => panic!("expected trim command"),
        }
    }

    #[test]
    fn test_parse_chat_message() {
        let cli = Cli::parse_from(["masgent", "chat", "-m", "hello"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Chat { message: Some(ref m), window: None }) if m == "hello"
        ));
    }

    #[test]
    fn test_window_must_be_numeric() {
        assert!(Cli::try_parse_from(["masgent", "chat", "--window", "ten"]).is_err());
    }
}
