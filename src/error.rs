//! Domain-specific error types for activity-board

use thiserror::Error;

/// Main error type for the activity board client.
///
/// The taxonomy mirrors how failures surface in the UI: transport
/// failures get a fixed generic banner, service failures carry the
/// server's own text, and parse failures cover 2xx replies whose body
/// does not decode.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Service error (HTTP {status}): {detail}")]
    Service { status: u16, detail: String },

    #[error("Parse error: {message}")]
    Parse { message: String },
}

impl From<reqwest::Error> for BoardError {
    fn from(err: reqwest::Error) -> Self {
        BoardError::Transport {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for BoardError {
    fn from(err: anyhow::Error) -> Self {
        BoardError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type alias for board operations
pub type Result<T> = std::result::Result<T, BoardError>;
