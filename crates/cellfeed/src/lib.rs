//! Streaming subscriptions to single analytics grid cells.
//!
//! A grid view shows one value per cell, but each value lives in a remote,
//! continuously recalculated grid. This crate binds one such cell to a
//! [`DataSource`]:
//!
//! - [`CellSubscription`] opens the feed, derives a two-item viewport from the
//!   grid's column layout, and emits `title`, `data` and `fatal` events
//! - [`EventEmitter`] provides the synchronous `on`/`off`/`fire` dispatch
//! - [`MemorySource`] is a data source that records requests, for replaying
//!   feeds and for tests
//! - [`menu`] decides when the contextual cell menu is offered
//!
//! # Architecture
//!
//! Delivery is synchronous. The data source calls
//! [`CellSubscription::handle_meta`], [`CellSubscription::handle_data`] and
//! [`CellSubscription::handle_fatal`]; handlers run to completion on the
//! caller's stack. A failing title or data handler tears the subscription
//! down, emits `fatal`, and comes back to the data source as an `Err`.

pub mod config;
pub mod error;
pub mod events;
pub mod memory;
pub mod menu;
pub mod source;
pub mod subscription;

// Re-export key types
pub use config::{FeedConfig, MenuConfig};
pub use error::{ConfigError, FeedError, HandlerError, Result, SubscriptionError};
pub use events::{Event, EventEmitter, HandlerResult, ListenerId};
pub use memory::{FeedLog, MemorySource};
pub use source::{DataSource, FeedHandle, OpenOptions, SubscriptionId, ViewportRequest};
pub use subscription::{
    CellConfig, CellEvent, CellSubscription, EventKind, FatalEvent, FatalOrigin, TeardownHandle,
    TitleEvent,
};
