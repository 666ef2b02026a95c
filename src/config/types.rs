//! Configuration type definitions for Masgent
//!
//! All types implement serde traits for JSON serialization and have sensible
//! defaults, so a partial (or missing) config file is always usable.

use serde::{Deserialize, Serialize};

use crate::agent::compaction::DEFAULT_WINDOW_SIZE;

/// Main configuration struct for Masgent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conversation window settings
    pub window: WindowConfig,
    /// Agent turn-loop settings
    pub agent: AgentConfig,
    /// Logging output settings
    pub logging: LoggingConfig,
}

// ============================================================================
// Window Configuration
// ============================================================================

/// Conversation window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Maximum number of trailing messages retained, excluding a preserved
    /// system turn.
    pub size: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_WINDOW_SIZE,
        }
    }
}

// ============================================================================
// Agent Configuration
// ============================================================================

/// Agent turn-loop configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Instruction seeded as the system turn of every new conversation.
    pub system_prompt: Option<String>,
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// `[timestamp] [LEVEL] target message {fields}`, one line per event
    #[default]
    Component,
    /// JSON lines for log aggregators
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Default filter when `RUST_LOG` is unset (e.g. "info", "masgent=debug")
    pub level: String,
    /// Append logs to this file instead of stderr
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Component,
            level: "info".to_string(),
            file: None,
        }
    }
}
