//! Error types for cellfeed-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cellfeed-core
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Invalid cell coordinate format
    #[error("Invalid cell coordinate: {0}")]
    InvalidCoordinate(String),

    /// Invalid cell format identifier
    #[error("Invalid cell format: {0}")]
    InvalidFormat(String),

    /// Invalid log level name
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
