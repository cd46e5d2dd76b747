//! Error types for cell subscriptions.

use std::path::PathBuf;

use thiserror::Error;

use crate::subscription::EventKind;

/// Error returned by an event handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by a data source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("Failed to open subscription: {0}")]
    Open(String),

    #[error("Viewport request rejected: {0}")]
    Viewport(String),

    #[error("Subscription closed")]
    Closed,
}

/// Errors surfaced by a [`CellSubscription`](crate::CellSubscription).
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// Row or column missing at construction time.
    #[error("Invalid cell coordinate: {0} is undefined")]
    InvalidCoordinate(&'static str),

    /// A title or data handler failed. The subscription has already been
    /// torn down and a fatal event emitted when this is returned.
    #[error("{message}")]
    DownstreamHandlerFailure {
        kind: EventKind,
        message: String,
        #[source]
        source: HandlerError,
    },

    #[error("Data source error: {0}")]
    Feed(#[from] FeedError),
}

pub type Result<T> = std::result::Result<T, SubscriptionError>;

/// Errors loading a [`FeedConfig`](crate::FeedConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
