//! Error types for Folio operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Folio crates. Uses `thiserror` for derive macros.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in Folio operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific file.
    #[error("I/O error at {}: {source}", path.display())]
    IoWithPath {
        /// Path that was being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed article: missing or unterminated front matter, unparsable
    /// metadata, or a required field that is absent or invalid.
    #[error("Format error: {0}")]
    Format(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Content not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create a format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Wrap an I/O error with the path that caused it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an I/O error from a message (used for directory walker failures).
    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(std::io::Error::other(msg.into()))
    }

    /// Returns true if this is a format error.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// Returns true if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias using Folio's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_display() {
        let err = Error::format("missing closing delimiter");
        assert_eq!(err.to_string(), "Format error: missing closing delimiter");
        assert!(err.is_format());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_io_with_path_display() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::io_with_path(io, "/posts/missing.md");
        let msg = err.to_string();
        assert!(msg.contains("/posts/missing.md"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_io_from_conversion() {
        let io = std::io::Error::other("boom");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_not_found() {
        let err = Error::not_found("article 'ngrx'");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: article 'ngrx'");
    }

    #[test]
    fn test_config_and_serialization() {
        assert_eq!(
            Error::config("bad port").to_string(),
            "Configuration error: bad port"
        );
        assert_eq!(
            Error::serialization("yaml").to_string(),
            "Serialization error: yaml"
        );
    }
}
