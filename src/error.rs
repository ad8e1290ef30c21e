//! Custom error types for the crate.
//!
//! This module defines the primary error type, `KeychordError`, used across
//! the library and the CLI binary. Using the `thiserror` crate, it provides a
//! centralized way to handle the different kinds of errors that can occur,
//! from configuration loading and validation to dispatcher channel failures.
//!
//! Chord-string parsing and binding registration have their own small error
//! enums ([`ChordParseError`](crate::chord::ChordParseError) and
//! [`BindError`](crate::registry::BindError)); both convert into
//! `KeychordError` via `#[from]` so callers can use the `?` operator
//! throughout.

use crate::chord::ChordParseError;
use crate::registry::BindError;
use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type AppResult<T> = std::result::Result<T, KeychordError>;

/// Errors surfaced by the keychord library.
#[derive(Error, Debug)]
pub enum KeychordError {
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration parsed but failed semantic validation.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The Tokio runtime could not be created.
    #[error("Tokio runtime error: {0}")]
    Tokio(std::io::Error),

    /// A chord string could not be parsed.
    #[error("Chord error: {0}")]
    Chord(#[from] ChordParseError),

    /// A binding could not be registered.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// The dispatcher task is no longer reachable.
    #[error("Dispatcher unavailable: {0}")]
    Dispatcher(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chord_parse_error_converts() {
        let err: KeychordError = ChordParseError::Empty.into();
        assert!(matches!(err, KeychordError::Chord(_)));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn bind_error_message_is_transparent() {
        let err: KeychordError = BindError::DuplicateId("logout".to_string()).into();
        let message = err.to_string();
        assert!(message.contains("already registered"));
        assert!(message.contains("logout"));
    }
}
