//! Wire types for feeding a cell subscription and for reporting what it
//! emits.
//!
//! The protocol is JSON lines: one object per line, tagged by `type` for
//! inbound feed messages and by `event` for outbound cell events.
//!
//! ```text
//! {"type":"meta","columns":{"fixed":[{"columns":[{"header":"R"}]}],"scroll":[]}}
//! {"type":"data","items":[{"v":{"name":"RowX"}},{"v":101.5,"t":"DOUBLE"}]}
//! {"type":"fatal","message":"connection lost"}
//! ```

pub mod error;
pub mod value;

use cellfeed_core::{CellCoordinate, DataItem, DataPush, GridMeta, LogLevel};
use serde::{Deserialize, Serialize};

pub use error::{ProtocolError, Result};

/// A message delivered by a data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    /// Grid layout; precedes the first data push of a connection.
    Meta(GridMeta),

    /// One push for the requested viewport, items in request order.
    Data { items: Vec<WireItem> },

    /// Terminal condition reported by the source.
    Fatal { message: String },
}

/// A single data item as it appears on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireItem {
    /// The value: a scalar, `null`, or a record.
    #[serde(default)]
    pub v: serde_json::Value,
    /// Value type reported by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    /// Calculation log severity, present only when a log exists.
    #[serde(
        default,
        rename = "logLevel",
        skip_serializing_if = "Option::is_none"
    )]
    pub log_level: Option<String>,
}

impl WireItem {
    /// Decode into a [`DataItem`].
    pub fn to_item(&self) -> Result<DataItem> {
        let log_level = match &self.log_level {
            Some(level) => Some(level.parse::<LogLevel>()?),
            None => None,
        };
        Ok(DataItem {
            value: value::from_json(&self.v),
            type_name: self.t.clone(),
            log_level,
        })
    }

    /// Encode a [`DataItem`].
    pub fn from_item(item: &DataItem) -> Self {
        Self {
            v: value::to_json(&item.value),
            t: item.type_name.clone(),
            log_level: item.log_level.map(|l| l.as_str().to_string()),
        }
    }
}

/// A decoded feed message.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Meta(GridMeta),
    Data(DataPush),
    Fatal(String),
}

impl FeedMessage {
    /// Decode into a [`FeedEvent`], checking the shape of data pushes.
    pub fn into_event(self) -> Result<FeedEvent> {
        match self {
            FeedMessage::Meta(meta) => Ok(FeedEvent::Meta(meta)),
            FeedMessage::Data { items } => {
                let [title, value] = items.as_slice() else {
                    return Err(ProtocolError::MalformedPush(items.len()));
                };
                Ok(FeedEvent::Data(DataPush {
                    title: title.to_item()?,
                    value: value.to_item()?,
                }))
            }
            FeedMessage::Fatal { message } => Ok(FeedEvent::Fatal(message)),
        }
    }
}

/// Parse one line of a feed script.
///
/// Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<FeedEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let message: FeedMessage = serde_json::from_str(line)?;
    message.into_event().map(Some)
}

/// Which layer a fatal event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalOrigin {
    /// The data source reported a terminal condition.
    Transport,
    /// A subscriber of the cell failed while handling an event.
    Handler,
}

/// Something a cell subscription emitted, or asked of its data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EmittedEvent {
    /// A viewport request issued to the data source.
    Viewport { cells: Vec<CellCoordinate>, log: bool },

    /// The cell's title changed.
    Title {
        row: serde_json::Value,
        column: Option<String>,
    },

    /// A new value for the cell.
    Data(WireItem),

    /// The subscription hit a terminal condition.
    Fatal { origin: FatalOrigin, message: String },
}
