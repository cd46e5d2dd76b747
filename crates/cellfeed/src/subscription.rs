//! A streaming subscription to a single analytics grid cell.
//!
//! `CellSubscription` opens one feed against a [`DataSource`], waits for the
//! grid's column layout, then asks for a two-item viewport: the title probe
//! (column 0 of the cell's row, which carries the row label) followed by the
//! cell itself. Every push is turned into `title` events (only when the row
//! or column label changed) and `data` events (always).
//!
//! # Example
//!
//! ```rust
//! use cellfeed::{CellConfig, CellEvent, CellSubscription, EventKind, MemorySource};
//! use cellfeed_core::{CellFormat, CellValue, ColumnGroup, DataItem, DataPush, GridMeta, GridSource};
//!
//! let mut source = MemorySource::new();
//! let config = CellConfig::new(GridSource::portfolio("V1"), 3, 1, CellFormat::Cell);
//! let mut cell = CellSubscription::open(config, &mut source, Some("demo")).unwrap();
//!
//! cell.on(EventKind::Data, |event| {
//!     if let CellEvent::Data(item) = event {
//!         println!("value: {}", item.value);
//!     }
//!     Ok(())
//! });
//!
//! let meta = GridMeta::new(ColumnGroup::from_headers(["R", "Name"]), Vec::new());
//! cell.handle_meta(&meta).unwrap();
//! cell.handle_data(&DataPush::new(CellValue::named("RowX"), DataItem::new(101.5))).unwrap();
//! cell.teardown();
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use cellfeed_core::{CellCoordinate, CellFormat, CellValue, DataItem, DataPush, GridMeta, GridSource};

use crate::error::{HandlerError, Result, SubscriptionError};
use crate::events::{Event, EventEmitter, HandlerResult, ListenerId};
use crate::source::{DataSource, FeedHandle, OpenOptions, SubscriptionId, ViewportRequest};

/// Construction parameters for a [`CellSubscription`].
///
/// `row` and `col` are optional here so that a missing coordinate is
/// reported by [`CellSubscription::open`] instead of being defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct CellConfig {
    pub source: GridSource,
    pub row: Option<u32>,
    pub col: Option<u32>,
    pub format: CellFormat,
    /// Ask the source to attach calculation logs to pushed values.
    pub log: bool,
    /// Skip the source's cache when opening.
    pub bypass_cache: bool,
    /// Prefix of the label the source sees for this subscriber.
    pub label_prefix: String,
}

impl CellConfig {
    pub fn new(source: GridSource, row: u32, col: u32, format: CellFormat) -> Self {
        Self {
            source,
            row: Some(row),
            col: Some(col),
            format,
            log: false,
            bypass_cache: true,
            label_prefix: "cell".to_string(),
        }
    }

    pub fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }
}

/// Event names a subscriber can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Title,
    Data,
    Fatal,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Title => "title",
            EventKind::Data => "data",
            EventKind::Fatal => "fatal",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (row label, column label) pair naming what a cell's value means.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleEvent {
    pub row: CellValue,
    /// `None` until the column layout is known, or if the column lies
    /// beyond the announced headers.
    pub column: Option<String>,
}

/// Where a fatal event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FatalOrigin {
    /// The data source reported a terminal condition.
    Transport,
    /// A title or data handler of this subscription failed.
    Handler,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalEvent {
    pub origin: FatalOrigin,
    pub message: String,
}

/// Events emitted by a [`CellSubscription`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellEvent {
    Title(TitleEvent),
    Data(DataItem),
    Fatal(FatalEvent),
}

impl Event for CellEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            CellEvent::Title(_) => EventKind::Title,
            CellEvent::Data(_) => EventKind::Data,
            CellEvent::Fatal(_) => EventKind::Fatal,
        }
    }
}

struct Lifecycle {
    handle: Option<Box<dyn FeedHandle>>,
    tag: String,
}

/// Tears down a subscription from anywhere, including its own handlers.
#[derive(Clone)]
pub struct TeardownHandle {
    inner: Rc<RefCell<Lifecycle>>,
}

impl TeardownHandle {
    /// Close the underlying feed. Returns `false` if it was already closed.
    pub fn teardown(&self) -> bool {
        // Take the handle out first: close() may call back into us.
        let handle = self.inner.borrow_mut().handle.take();
        match handle {
            Some(mut handle) => {
                tracing::debug!(cell = %self.inner.borrow().tag, id = %handle.id(), "tearing down");
                handle.close();
                true
            }
            None => false,
        }
    }

    pub fn is_live(&self) -> bool {
        self.inner.borrow().handle.is_some()
    }

    fn viewport(&self, request: ViewportRequest) -> Result<()> {
        let mut lifecycle = self.inner.borrow_mut();
        match lifecycle.handle.as_mut() {
            Some(handle) => Ok(handle.viewport(request)?),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for TeardownHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeardownHandle")
            .field("live", &self.is_live())
            .finish()
    }
}

/// A live subscription to one grid cell.
pub struct CellSubscription {
    coordinate: CellCoordinate,
    source: GridSource,
    log: bool,
    tag: String,
    id: SubscriptionId,
    column_headers: Vec<String>,
    last_row_label: Option<CellValue>,
    last_column_label: Option<Option<String>>,
    events: EventEmitter<CellEvent>,
    lifecycle: TeardownHandle,
}

impl CellSubscription {
    /// Validate `config` and open a feed for it.
    ///
    /// `label` only tags diagnostics: it is appended to the label the data
    /// source sees and used in log output.
    pub fn open(
        config: CellConfig,
        data_source: &mut dyn DataSource,
        label: Option<&str>,
    ) -> Result<Self> {
        let row = config.row.ok_or(SubscriptionError::InvalidCoordinate("row"))?;
        let col = config.col.ok_or(SubscriptionError::InvalidCoordinate("col"))?;
        let coordinate = CellCoordinate::new(row, col, config.format);

        let options = OpenOptions {
            bypass_cache: config.bypass_cache,
            label: format!("{}{}", config.label_prefix, label.unwrap_or_default()),
        };
        let tag = match label {
            Some(label) => format!("[{label}]"),
            None => format!("[{coordinate}]"),
        };

        let handle = data_source.open(&config.source, &options)?;
        let id = handle.id().clone();
        tracing::debug!(cell = %tag, %id, source = %config.source, "opened cell subscription");

        Ok(Self {
            coordinate,
            source: config.source,
            log: config.log,
            tag: tag.clone(),
            id,
            column_headers: Vec::new(),
            last_row_label: None,
            last_column_label: None,
            events: EventEmitter::new(),
            lifecycle: TeardownHandle {
                inner: Rc::new(RefCell::new(Lifecycle {
                    handle: Some(handle),
                    tag,
                })),
            },
        })
    }

    /// Identifier the data source assigned to this subscription.
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    /// The observed cell.
    pub fn coordinate(&self) -> &CellCoordinate {
        &self.coordinate
    }

    /// The coordinate that resolves the row label.
    pub fn title_probe(&self) -> CellCoordinate {
        self.coordinate.title_probe()
    }

    pub fn source(&self) -> &GridSource {
        &self.source
    }

    /// Header labels from the latest metadata, indexable by column.
    pub fn column_headers(&self) -> &[String] {
        &self.column_headers
    }

    pub fn is_live(&self) -> bool {
        self.lifecycle.is_live()
    }

    /// Register a handler.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> ListenerId
    where
        F: FnMut(&CellEvent) -> HandlerResult + 'static,
    {
        self.events.on(kind, handler)
    }

    /// Remove a handler registered with [`on`](Self::on).
    pub fn off(&mut self, kind: EventKind, id: ListenerId) -> bool {
        self.events.off(kind, id)
    }

    /// Dispatch an event straight to this subscription's handlers.
    pub fn fire(&mut self, event: &CellEvent) -> HandlerResult {
        self.events.fire(event)
    }

    /// Release the feed. Safe to call repeatedly.
    pub fn teardown(&self) {
        self.lifecycle.teardown();
    }

    /// A handle that can tear this subscription down from inside a handler.
    pub fn teardown_handle(&self) -> TeardownHandle {
        self.lifecycle.clone()
    }

    /// Column layout arrived: rebuild the headers and request the viewport.
    pub fn handle_meta(&mut self, meta: &GridMeta) -> Result<()> {
        if !self.is_live() {
            tracing::trace!(cell = %self.tag, "metadata after teardown ignored");
            return Ok(());
        }

        if meta.fixed_group_count() > 1 {
            tracing::warn!(
                cell = %self.tag,
                groups = meta.fixed_group_count(),
                "multiple fixed column groups, only the first is used"
            );
        }
        self.column_headers = meta.column_headers();

        let request = ViewportRequest {
            cells: vec![self.coordinate.title_probe(), self.coordinate.clone()],
            log: self.log,
        };
        tracing::debug!(
            cell = %self.tag,
            headers = self.column_headers.len(),
            title = %request.cells[0],
            value = %request.cells[1],
            "requesting viewport"
        );
        self.lifecycle.viewport(request)
    }

    /// A push arrived.
    ///
    /// If a handler fails, the subscription is torn down and a fatal event
    /// emitted before the failure is returned to the caller.
    pub fn handle_data(&mut self, push: &DataPush) -> Result<()> {
        if !self.is_live() {
            tracing::trace!(cell = %self.tag, "data after teardown ignored");
            return Ok(());
        }

        match self.dispatch(push) {
            Ok(()) => Ok(()),
            Err((kind, source)) => {
                self.teardown();
                let message = format!(
                    "{}: a {} handler failed: {}",
                    self.tag, kind, source
                );
                self.emit_fatal(FatalEvent {
                    origin: FatalOrigin::Handler,
                    message: message.clone(),
                });
                Err(SubscriptionError::DownstreamHandlerFailure {
                    kind,
                    message,
                    source,
                })
            }
        }
    }

    /// The data source reported a terminal condition.
    pub fn handle_fatal(&mut self, message: impl Into<String>) {
        if !self.is_live() {
            return;
        }
        self.emit_fatal(FatalEvent {
            origin: FatalOrigin::Transport,
            message: message.into(),
        });
    }

    fn dispatch(&mut self, push: &DataPush) -> std::result::Result<(), (EventKind, HandlerError)> {
        let row = push.title.value.label();
        let column = self
            .column_headers
            .get(self.coordinate.col as usize)
            .cloned();

        let changed = !self
            .last_row_label
            .as_ref()
            .map_or(false, |last| last.same_label(&row))
            || self.last_column_label.as_ref() != Some(&column);
        if changed {
            tracing::debug!(cell = %self.tag, %row, column = ?column, "title changed");
            self.last_row_label = Some(row.clone());
            self.last_column_label = Some(column.clone());
            self.events
                .fire(&CellEvent::Title(TitleEvent { row, column }))
                .map_err(|e| (EventKind::Title, e))?;
        }

        self.events
            .fire(&CellEvent::Data(push.value.clone()))
            .map_err(|e| (EventKind::Data, e))
    }

    fn emit_fatal(&mut self, event: FatalEvent) {
        tracing::debug!(cell = %self.tag, origin = ?event.origin, message = %event.message, "fatal");
        for error in self.events.fire_all(&CellEvent::Fatal(event)) {
            tracing::warn!(cell = %self.tag, %error, "a fatal handler failed");
        }
    }
}

impl Drop for CellSubscription {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for CellSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellSubscription")
            .field("id", &self.id)
            .field("coordinate", &self.coordinate)
            .field("live", &self.is_live())
            .field("events", &self.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;
    use cellfeed_core::ColumnGroup;

    fn open(source: &mut MemorySource, row: u32, col: u32) -> CellSubscription {
        let config = CellConfig::new(GridSource::portfolio("V1"), row, col, CellFormat::Cell);
        CellSubscription::open(config, source, None).unwrap()
    }

    #[test]
    fn test_open_options() {
        let mut source = MemorySource::new();
        let config = CellConfig::new(GridSource::portfolio("V1"), 2, 5, CellFormat::History);
        let cell = CellSubscription::open(config, &mut source, Some("7")).unwrap();

        let log = source.log();
        assert_eq!(log.opens.len(), 1);
        assert_eq!(log.opens[0].options.label, "cell7");
        assert!(log.opens[0].options.bypass_cache);
        assert_eq!(cell.id(), &log.opens[0].id);
        assert_eq!(cell.coordinate().to_string(), "2,5,HISTORY");
        assert_eq!(cell.title_probe().to_string(), "2,0,CELL");
    }

    #[test]
    fn test_missing_row_is_rejected() {
        let mut source = MemorySource::new();
        let mut config = CellConfig::new(GridSource::default(), 0, 0, CellFormat::Cell);
        config.row = None;
        let err = CellSubscription::open(config, &mut source, None).unwrap_err();
        assert!(matches!(err, SubscriptionError::InvalidCoordinate("row")));
        assert!(source.log().opens.is_empty());
    }

    #[test]
    fn test_open_failure_is_reported() {
        let mut source = MemorySource::new();
        source.fail_next_open("no such view");
        let config = CellConfig::new(GridSource::default(), 0, 0, CellFormat::Cell);
        let err = CellSubscription::open(config, &mut source, None).unwrap_err();
        assert!(matches!(err, SubscriptionError::Feed(_)));
    }

    #[test]
    fn test_meta_reissues_viewport() {
        let mut source = MemorySource::new();
        let mut cell = open(&mut source, 1, 0);
        let meta = GridMeta::new(ColumnGroup::from_headers(["Name"]), Vec::new());

        cell.handle_meta(&meta).unwrap();
        cell.handle_meta(&meta).unwrap();

        let log = source.log();
        let viewports = log.viewports_for(cell.id());
        assert_eq!(viewports.len(), 2);
        // Column 0 cells probe themselves twice
        assert_eq!(viewports[0].cells[0], viewports[0].cells[1]);
    }

    #[test]
    fn test_drop_tears_down() {
        let mut source = MemorySource::new();
        let cell = open(&mut source, 0, 0);
        let id = cell.id().clone();
        drop(cell);
        assert_eq!(source.log().close_count(&id), 1);
    }

    #[test]
    fn test_meta_after_teardown_requests_nothing() {
        let mut source = MemorySource::new();
        let mut cell = open(&mut source, 0, 0);
        cell.teardown();
        cell.handle_meta(&GridMeta::default()).unwrap();
        assert!(source.log().viewports.is_empty());
        assert!(cell.column_headers().is_empty());
    }
}
