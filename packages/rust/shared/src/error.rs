//! Error types for postdate.
//!
//! Library crates use [`PostdateError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Date extraction itself never produces these errors: a document with no
//! usable signal resolves to "undetermined", not to a failure.

use std::path::PathBuf;

/// Top-level error type for all postdate operations.
#[derive(Debug, thiserror::Error)]
pub enum PostdateError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a posting.
    #[error("network error: {0}")]
    Network(String),

    /// Input parsing error (URLs, timestamps given on the command line, ...).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (invalid URL scheme, empty input, ...).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PostdateError>;

impl PostdateError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PostdateError::config("meta_keys must not be empty");
        assert_eq!(err.to_string(), "config error: meta_keys must not be empty");

        let err = PostdateError::validation("unsupported scheme 'ftp'");
        assert!(err.to_string().contains("unsupported scheme"));

        let err = PostdateError::Network("https://jobs.example.com: HTTP 404".into());
        assert!(err.to_string().starts_with("network error:"));
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = PostdateError::io("/tmp/urls.txt", source);
        assert!(err.to_string().contains("urls.txt"));
    }
}
