//! Error types for the markerfix core library.
//!
//! File access and configuration each have their own error type derived with
//! `thiserror`. The binary wraps both in `anyhow` with per-file context.

use std::io;
use std::path::Path;

use thiserror::Error;

// ---------------------------------------------------------------------------
// File errors
// ---------------------------------------------------------------------------

/// Errors from reading or rewriting a target text file.
///
/// Every variant is fatal for the file it names; nothing is retried.
#[derive(Debug, Error)]
pub enum FileError {
    /// The path does not exist.
    #[error("file not found: {path}")]
    NotFound { path: String },

    /// The process may not read or write the path.
    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    /// The file contents are not valid UTF-8.
    #[error("'{path}' is not valid UTF-8 (first invalid byte at offset {valid_up_to})")]
    Encoding { path: String, valid_up_to: usize },

    /// Any other failure while reading.
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Creating or filling the temporary replacement file failed.
    #[error("failed to write replacement for '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Renaming the finished temporary file over the target failed.
    #[error("failed to replace '{path}': {source}")]
    Persist {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// Map an I/O error raised while reading `path`.
    pub fn from_read(path: &Path, err: io::Error) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Read { path, source: err },
        }
    }

    /// Map an I/O error raised while writing the replacement for `path`.
    pub fn from_write(path: &Path, err: io::Error) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Write { path, source: err },
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
