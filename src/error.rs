//! Error types for Masgent
//!
//! This module defines the error type used by the library side of the crate.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations. The window trimmer itself has no error path;
//! these errors come from configuration, message construction, the agent
//! runtime seam and I/O around them.

use thiserror::Error;

/// The primary error type for Masgent operations.
#[derive(Error, Debug)]
pub enum MasgentError {
    /// Configuration-related errors (invalid config, unreadable values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A message that breaks the structural rules of the message model
    /// (empty parts, non-instruction content in a system turn, etc.)
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Failures reported by the external agent runtime while producing a turn
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for Masgent operations.
pub type Result<T> = std::result::Result<T, MasgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MasgentError::Config("window size must be a number".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: window size must be a number"
        );

        let err = MasgentError::InvalidMessage("message has no parts".to_string());
        assert_eq!(err.to_string(), "Invalid message: message has no parts");

        let err = MasgentError::Runtime("model unavailable".to_string());
        assert_eq!(err.to_string(), "Runtime error: model unavailable");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MasgentError = io_err.into();
        assert!(matches!(err, MasgentError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: MasgentError = json_err.into();
        assert!(matches!(err, MasgentError::Json(_)));
    }

    #[test]
    fn test_result_type() {
        fn fails() -> Result<()> {
            Err(MasgentError::Runtime("model unavailable".into()))
        }
        assert!(fails().is_err());
    }
}
