//! In-memory data source.
//!
//! `MemorySource` never talks to a server: it hands out handles that record
//! every open, viewport request and close in a shared [`FeedLog`]. Values
//! are delivered by whoever drives the subscription (a replay script, a
//! test).

use std::cell::RefCell;
use std::rc::Rc;

use cellfeed_core::GridSource;

use crate::error::FeedError;
use crate::source::{DataSource, FeedHandle, OpenOptions, SubscriptionId, ViewportRequest};

/// An `open` call as seen by a [`MemorySource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRecord {
    pub id: SubscriptionId,
    pub source: GridSource,
    pub options: OpenOptions,
}

/// Everything subscribers asked of a [`MemorySource`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedLog {
    pub opens: Vec<OpenRecord>,
    pub viewports: Vec<(SubscriptionId, ViewportRequest)>,
    pub closes: Vec<SubscriptionId>,
}

impl FeedLog {
    /// Viewport requests issued by one subscription, oldest first.
    pub fn viewports_for(&self, id: &SubscriptionId) -> Vec<&ViewportRequest> {
        self.viewports
            .iter()
            .filter(|(owner, _)| owner == id)
            .map(|(_, request)| request)
            .collect()
    }

    /// Number of times a subscription was closed.
    pub fn close_count(&self, id: &SubscriptionId) -> usize {
        self.closes.iter().filter(|closed| *closed == id).count()
    }
}

/// A [`DataSource`] that records requests instead of fulfilling them.
#[derive(Debug, Default)]
pub struct MemorySource {
    log: Rc<RefCell<FeedLog>>,
    next_id: u64,
    fail_next_open: Option<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the requests recorded so far.
    pub fn log(&self) -> FeedLog {
        self.log.borrow().clone()
    }

    /// Make the next `open` call fail with `reason`.
    pub fn fail_next_open<S: Into<String>>(&mut self, reason: S) {
        self.fail_next_open = Some(reason.into());
    }
}

impl DataSource for MemorySource {
    fn open(
        &mut self,
        source: &GridSource,
        options: &OpenOptions,
    ) -> Result<Box<dyn FeedHandle>, FeedError> {
        if let Some(reason) = self.fail_next_open.take() {
            return Err(FeedError::Open(reason));
        }

        self.next_id += 1;
        let id = SubscriptionId::new(format!("mem-{}", self.next_id));
        self.log.borrow_mut().opens.push(OpenRecord {
            id: id.clone(),
            source: source.clone(),
            options: options.clone(),
        });
        tracing::debug!(%id, %source, label = %options.label, "opened in-memory subscription");

        Ok(Box::new(MemoryHandle {
            id,
            log: Rc::clone(&self.log),
            closed: false,
        }))
    }
}

struct MemoryHandle {
    id: SubscriptionId,
    log: Rc<RefCell<FeedLog>>,
    closed: bool,
}

impl FeedHandle for MemoryHandle {
    fn id(&self) -> &SubscriptionId {
        &self.id
    }

    fn viewport(&mut self, request: ViewportRequest) -> Result<(), FeedError> {
        if self.closed {
            return Err(FeedError::Closed);
        }
        self.log
            .borrow_mut()
            .viewports
            .push((self.id.clone(), request));
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.borrow_mut().closes.push(self.id.clone());
        }
    }
}
