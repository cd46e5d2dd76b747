//! # cellfeed-core
//!
//! Core data structures for the cellfeed analytics cell pipeline.
//!
//! This crate provides the fundamental types shared by the subscription layer
//! and the wire protocol:
//! - [`CellCoordinate`] and [`CellFormat`] - Addressing a single grid cell
//! - [`CellValue`], [`DataItem`], [`DataPush`] - Values pushed by a data source
//! - [`GridMeta`], [`ColumnGroup`] - Column layout metadata
//! - [`GridSource`] - Which remote grid a subscription binds to
//!
//! ## Example
//!
//! ```rust
//! use cellfeed_core::{CellCoordinate, CellFormat};
//!
//! let coord = CellCoordinate::new(3, 1, CellFormat::Cell);
//! assert_eq!(coord.to_string(), "3,1,CELL");
//!
//! // The title probe always reads column 0 of the same row
//! assert_eq!(coord.title_probe().to_string(), "3,0,CELL");
//! ```

pub mod coordinate;
pub mod error;
pub mod meta;
pub mod source;
pub mod value;

// Re-exports for convenience
pub use coordinate::{CellCoordinate, CellFormat};
pub use error::{Error, Result};
pub use meta::{ColumnGroup, ColumnLayout, ColumnSpec, GridMeta};
pub use source::{GridSource, GridType};
pub use value::{CellValue, DataItem, DataPush, LogLevel};
