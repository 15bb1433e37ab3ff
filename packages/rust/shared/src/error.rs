//! Error types for wordbook.
//!
//! Library crates use [`WordbookError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all wordbook operations.
#[derive(Debug, thiserror::Error)]
pub enum WordbookError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The input document package is missing a required part or is not a
    /// readable OOXML container.
    #[error("package error: {message}")]
    Package { message: String },

    /// XML parsing error inside a package part.
    #[error("xml error in {part}: {message}")]
    Xml { part: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad output layout, invalid config values, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Markdown projection error.
    #[error("conversion error: {0}")]
    Conversion(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WordbookError>;

impl WordbookError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a package error from any displayable message.
    pub fn package(msg: impl Into<String>) -> Self {
        Self::Package {
            message: msg.into(),
        }
    }

    /// Create an XML error for a named part.
    pub fn xml(part: impl Into<String>, msg: impl std::fmt::Display) -> Self {
        Self::Xml {
            part: part.into(),
            message: msg.to_string(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
