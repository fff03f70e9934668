//! Error types for ticksync
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, bad config, missing credentials)
//! - 3: Board configuration error (status columns cannot be resolved)
//! - 4: Operation failed (I/O, transport, remote rejection)

use std::path::PathBuf;
use thiserror::Error;

use crate::checklist::Status;

/// Exit codes for the ticksync CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const BOARD_CONFIG: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for ticksync operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Config file already exists: {0}")]
    ConfigExists(PathBuf),

    // Board configuration (exit code 3)
    #[error("Could not find list for status {0}")]
    UnresolvedStatus(Status),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Board API returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Could not find valid label to apply to todo \"{0}\"")]
    LabelNotResolved(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::MissingCredential(_)
            | Error::InvalidPattern { .. }
            | Error::ConfigExists(_) => exit_codes::USER_ERROR,

            Error::UnresolvedStatus(_) => exit_codes::BOARD_CONFIG,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::Http(_)
            | Error::Remote { .. }
            | Error::LabelNotResolved(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::UnresolvedStatus(status) => {
                Some(serde_json::json!({ "status": status.as_str() }))
            }
            Error::Remote { status, .. } => Some(serde_json::json!({ "http_status": status })),
            Error::InvalidPattern { pattern, .. } => {
                Some(serde_json::json!({ "pattern": pattern }))
            }
            Error::ConfigExists(path) => {
                Some(serde_json::json!({ "path": path.to_string_lossy() }))
            }
            _ => None,
        }
    }
}

/// Result type alias for ticksync operations
pub type Result<T> = std::result::Result<T, Error>;
