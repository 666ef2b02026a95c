//! Configuration management for Masgent
//!
//! Configuration is loaded from `~/.masgent/config.json` (or an explicit path)
//! with environment variable overrides. There is no process-wide config
//! instance; callers load a [`Config`] once and pass it down.

mod types;
pub mod validate;

pub use types::*;

use std::path::{Path, PathBuf};

use crate::error::{MasgentError, Result};

impl Config {
    /// Returns the Masgent configuration directory path (~/.masgent)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".masgent")
    }

    /// Returns the path to the config file (~/.masgent/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let (config, ignored) = Self::load_deferred(path)?;
        log_ignored_overrides(&ignored);
        Ok(config)
    }

    /// Like [`load_from_path`](Self::load_from_path), but rejected
    /// environment overrides are returned instead of logged.
    ///
    /// Use this before a tracing subscriber is installed, then hand the list
    /// to [`log_ignored_overrides`] once logging is up.
    pub fn load_deferred(path: &Path) -> Result<(Self, Vec<String>)> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content).map_err(|e| {
                MasgentError::Config(format!("{}: {}", path.display(), e))
            })?
        } else {
            Config::default()
        };

        let ignored = config.apply_overrides_from(|key| std::env::var(key).ok());
        Ok((config, ignored))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables follow the pattern: MASGENT_SECTION_KEY
    pub fn apply_env_overrides(&mut self) {
        let ignored = self.apply_overrides_from(|key| std::env::var(key).ok());
        log_ignored_overrides(&ignored);
    }

    /// Apply overrides using `lookup` to resolve variable names. Returns a
    /// description of every override that was rejected.
    fn apply_overrides_from<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut ignored = Vec::new();

        // Window
        if let Some(val) = lookup("MASGENT_WINDOW_SIZE") {
            match val.trim().parse() {
                Ok(v) => self.window.size = v,
                Err(_) => ignored.push(format!("Ignoring invalid MASGENT_WINDOW_SIZE '{}'", val)),
            }
        }

        // Agent
        if let Some(val) = lookup("MASGENT_AGENT_SYSTEM_PROMPT") {
            self.agent.system_prompt = if val.is_empty() { None } else { Some(val) };
        }

        // Logging
        if let Some(val) = lookup("MASGENT_LOGGING_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = lookup("MASGENT_LOGGING_FORMAT") {
            match val.to_lowercase().as_str() {
                "pretty" => self.logging.format = LogFormat::Pretty,
                "component" => self.logging.format = LogFormat::Component,
                "json" => self.logging.format = LogFormat::Json,
                _ => ignored.push(format!("Ignoring invalid MASGENT_LOGGING_FORMAT '{}'", val)),
            }
        }
        if let Some(val) = lookup("MASGENT_LOGGING_FILE") {
            self.logging.file = if val.is_empty() { None } else { Some(val) };
        }

        ignored
    }
}

/// Emit one warning per rejected environment override.
pub fn log_ignored_overrides(ignored: &[String]) {
    for reason in ignored {
        tracing::warn!(component = "config", "{}", reason);
    }
}
