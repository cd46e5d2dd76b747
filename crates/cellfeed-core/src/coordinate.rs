//! Cell coordinate and format types

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// How a data source should render the value of a cell.
///
/// The format is opaque to the subscription layer and forwarded verbatim.
/// Unknown identifiers are kept as [`CellFormat::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum CellFormat {
    /// Single formatted cell value
    #[default]
    Cell,
    /// Value history (time series of the cell)
    History,
    /// Full expanded representation (matrices, curves, ...)
    Expanded,
    /// Any other identifier understood by the data source
    Custom(String),
}

impl CellFormat {
    /// Get the wire identifier for this format
    pub fn as_str(&self) -> &str {
        match self {
            CellFormat::Cell => "CELL",
            CellFormat::History => "HISTORY",
            CellFormat::Expanded => "EXPANDED",
            CellFormat::Custom(s) => s,
        }
    }

    /// Parse a format identifier
    ///
    /// Known identifiers are matched exactly. Anything else becomes
    /// [`CellFormat::Custom`], unless it is empty or would break the
    /// `row,col,FORMAT` coordinate syntax.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "CELL" => Ok(CellFormat::Cell),
            "HISTORY" => Ok(CellFormat::History),
            "EXPANDED" => Ok(CellFormat::Expanded),
            "" => Err(Error::InvalidFormat("empty format".into())),
            other if other.contains(',') || other.trim() != other => {
                Err(Error::InvalidFormat(other.to_string()))
            }
            other => Ok(CellFormat::Custom(other.to_string())),
        }
    }
}

impl fmt::Display for CellFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CellFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CellFormat::parse(s)
    }
}

impl TryFrom<String> for CellFormat {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        CellFormat::parse(&s)
    }
}

impl From<CellFormat> for String {
    fn from(format: CellFormat) -> Self {
        match format {
            CellFormat::Custom(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// An addressable item of a grid: a cell position plus the format its value
/// should be delivered in.
///
/// Displayed and parsed as `row,col,FORMAT` (e.g. `3,1,CELL`), the form used
/// in viewport requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct CellCoordinate {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based)
    pub col: u32,
    /// Requested value format
    pub format: CellFormat,
}

impl CellCoordinate {
    /// Create a new coordinate
    pub fn new(row: u32, col: u32, format: CellFormat) -> Self {
        Self { row, col, format }
    }

    /// The coordinate that resolves this row's display label.
    ///
    /// Row labels live in column 0 regardless of which column a cell
    /// observes, and are always requested in [`CellFormat::Cell`].
    pub fn title_probe(&self) -> Self {
        Self {
            row: self.row,
            col: 0,
            format: CellFormat::Cell,
        }
    }

    /// Parse a coordinate from `row,col,FORMAT` notation
    ///
    /// # Examples
    /// ```
    /// use cellfeed_core::{CellCoordinate, CellFormat};
    ///
    /// let coord = CellCoordinate::parse("3,1,CELL").unwrap();
    /// assert_eq!(coord.row, 3);
    /// assert_eq!(coord.col, 1);
    /// assert_eq!(coord.format, CellFormat::Cell);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidCoordinate("empty coordinate".into()));
        }

        let mut parts = s.splitn(3, ',');
        let (Some(row), Some(col), Some(format)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidCoordinate(s.to_string()));
        };

        let row = row
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::InvalidCoordinate(format!("bad row in '{s}'")))?;
        let col = col
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::InvalidCoordinate(format!("bad column in '{s}'")))?;
        let format = CellFormat::parse(format.trim())?;

        Ok(Self { row, col, format })
    }
}

impl fmt::Display for CellCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.row, self.col, self.format)
    }
}

impl FromStr for CellCoordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CellCoordinate::parse(s)
    }
}

impl TryFrom<String> for CellCoordinate {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        CellCoordinate::parse(&s)
    }
}

impl From<CellCoordinate> for String {
    fn from(coord: CellCoordinate) -> Self {
        coord.to_string()
    }
}
