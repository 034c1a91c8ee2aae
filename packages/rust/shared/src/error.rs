//! Error types for lessonmap.
//!
//! Library crates use [`LessonmapError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Data-shape problems in CMS responses are never errors: the normalizer
//! degrades to defaults or drops the record. These variants cover the
//! boundary failures only (configuration, transport, body decoding, disk).

use std::path::PathBuf;

/// Top-level error type for all lessonmap operations.
#[derive(Debug, thiserror::Error)]
pub enum LessonmapError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to the CMS.
    #[error("network error: {0}")]
    Network(String),

    /// Response body or persisted state could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LessonmapError>;

impl LessonmapError {
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

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
