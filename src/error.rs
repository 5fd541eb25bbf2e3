//! Error types for ptrack.
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad config, missing snapshot)
//! - 3: Authentication failed
//! - 4: Operation failed (I/O, transport, decoding)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the ptrack CLI.
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const AUTH_FAILED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for ptrack operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No snapshot at {0}; run `ptrack fetch` or pass --refresh")]
    SnapshotMissing(PathBuf),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Snapshot unreadable at {path}: {reason}")]
    Snapshot { path: PathBuf, reason: String },
}

impl Error {
    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_) | Error::SnapshotMissing(_) => exit_codes::USER_ERROR,

            Error::Auth(_) => exit_codes::AUTH_FAILED,

            Error::Http(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::Snapshot { .. } => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for ptrack operations.
pub type Result<T> = std::result::Result<T, Error>;
