//! Error types for the feed wire protocol.

use thiserror::Error;

/// Errors that can occur while decoding feed messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data push must carry exactly two items (title probe, value), got {0}")]
    MalformedPush(usize),

    #[error(transparent)]
    Core(#[from] cellfeed_core::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
