//! Error types for the prompt driver
//!
//! Every failure during an interaction ends up as a single `Exception:` line
//! in the report, so the messages here are what the user actually reads.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the prompt driver
#[derive(Error, Debug)]
pub enum Error {
    // === Child Process Errors ===
    #[error("failed to start '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("child {0} pipe was not captured")]
    PipeUnavailable(&'static str),

    #[error("child closed its output before printing {marker:?}")]
    UnexpectedEof { marker: String },

    // === Timeout Errors ===
    #[error("timed out after {secs} seconds waiting for {marker:?}")]
    MarkerTimeout { marker: String, secs: u64 },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid script file '{path}': {error}")]
    ScriptParse { path: String, error: String },

    // === IO Errors ===
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a spawn error for the given executable
    pub fn spawn(path: &Path, source: io::Error) -> Self {
        Self::Spawn {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a file read error
    pub fn file_read(path: &Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
