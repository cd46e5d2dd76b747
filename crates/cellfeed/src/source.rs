//! The data source a cell subscription streams from.
//!
//! A [`DataSource`] opens subscriptions against a remote grid; each open
//! subscription is a [`FeedHandle`] that accepts viewport requests and can be
//! closed. Delivery runs the other way: the source calls the subscriber's
//! `handle_meta` / `handle_data` / `handle_fatal` entry points.

use std::fmt;

use cellfeed_core::{CellCoordinate, GridSource};

use crate::error::FeedError;

/// Identifier a data source assigns to an open subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options passed when opening a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    /// Skip any cached copy of the grid and stream fresh values.
    pub bypass_cache: bool,
    /// Tag identifying the subscriber in the source's own diagnostics.
    pub label: String,
}

/// The set of cells a subscriber wants values for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportRequest {
    /// Requested coordinates; pushes carry one item per coordinate, in order.
    pub cells: Vec<CellCoordinate>,
    /// Ask the source to attach calculation logs to the pushed values.
    pub log: bool,
}

/// Opens streaming subscriptions against remote grids.
pub trait DataSource {
    fn open(
        &mut self,
        source: &GridSource,
        options: &OpenOptions,
    ) -> Result<Box<dyn FeedHandle>, FeedError>;
}

/// One open subscription.
pub trait FeedHandle {
    fn id(&self) -> &SubscriptionId;

    /// Replace the subscription's viewport.
    fn viewport(&mut self, request: ViewportRequest) -> Result<(), FeedError>;

    /// Release the subscription.
    fn close(&mut self);
}
