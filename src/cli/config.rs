//! Config command handlers.

use std::path::Path;

use anyhow::{Context, Result};

use masgent::config::validate::{validate_config, DiagnosticLevel};
use masgent::config::Config;

use super::ConfigAction;

/// Validate or print configuration.
///
/// `loaded` is the configuration read at startup; `check` re-reads the raw
/// file itself so it can report problems that stop a normal load.
pub(crate) async fn cmd_config(
    action: ConfigAction,
    loaded: masgent::Result<Config>,
) -> Result<()> {
    match action {
        ConfigAction::Check { path } => {
            let config_path = path.unwrap_or_else(Config::path);
            check(&config_path)?;
        }
        ConfigAction::Show => {
            let config = loaded.context("Failed to load configuration")?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

fn check(config_path: &Path) -> Result<()> {
    println!("Config file: {}", config_path.display());

    if !config_path.exists() {
        println!("[OK] No config file found (using defaults)");
        return Ok(());
    }

    let content = std::fs::read_to_string(config_path).context("Failed to read config file")?;

    let raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            println!("[ERROR] Invalid JSON: {}", e);
            return Ok(());
        }
    };

    let diagnostics = validate_config(&raw);
    for diag in &diagnostics {
        println!("{}", diag);
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.level == DiagnosticLevel::Error)
        .count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.level == DiagnosticLevel::Warn)
        .count();

    if errors == 0 && warnings == 0 {
        println!("\nConfiguration looks good!");
    } else {
        println!("\nFound {} error(s), {} warning(s)", errors, warnings);
    }
    Ok(())
}
