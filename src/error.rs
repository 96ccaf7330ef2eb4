use std::path::PathBuf;

use thiserror::Error;

/// Reasons a replay or verification request is turned away. Shown to the user as a
/// warning; nothing here is fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("draw a signature first")]
    EmptySignature,

    #[error("a verification is already running")]
    Busy,

    #[error("finish the current stroke first")]
    StrokeInProgress,
}

/// Why a config file was rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {field} in {path}: {reason}")]
    Invalid {
        path: PathBuf,
        field: &'static str,
        reason: String,
    },
}
