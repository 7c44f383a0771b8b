//! Error types for script loading, configuration and persistence
//!
//! Selection itself never fails: unknown categories degrade to fallback
//! text. Only loading and saving surface errors to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for script loading
pub type ScriptResult<T> = Result<T, ScriptError>;

/// A script document could not be used for a session
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("cannot read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed script {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("script {0} defines no categories")]
    Empty(String),

    #[error("script {script} has an empty category '{category}'")]
    EmptyCategory { script: String, category: String },
}

/// Engine configuration could not be loaded
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("probability '{name}' must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
}

/// A transcript could not be written
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("transcript IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transcript serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Orchestrator misuse
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("empty input is not a turn")]
    EmptyInput,

    #[error("unknown phase '{0}' (expected prebrief, simulation or debrief)")]
    UnknownPhase(String),
}
