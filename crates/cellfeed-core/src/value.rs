//! Cell value types

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A value pushed by a data source for one addressable cell
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// No value (not yet calculated, or null on the wire)
    #[default]
    Empty,

    /// Boolean value
    Boolean(bool),

    /// Numeric value
    Number(f64),

    /// String value
    String(String),

    /// A structured record carrying a display name
    ///
    /// Row-label cells arrive in this shape; `fields` holds every other
    /// member of the record.
    Named {
        /// Display name of the record
        name: String,
        /// Remaining record members
        fields: BTreeMap<String, CellValue>,
    },

    /// A structured record without a display name
    Record(BTreeMap<String, CellValue>),
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// Create a named record with no further members
    pub fn named<S: Into<String>>(name: S) -> Self {
        CellValue::Named {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// The label this value contributes when it sits in a row's title column.
    ///
    /// Named records are labelled by their name, everything else by the
    /// value itself. An empty name is still a name. A record whose `name`
    /// member is not a string is labelled by that member unless it is empty.
    pub fn label(&self) -> CellValue {
        match self {
            CellValue::Named { name, .. } => CellValue::String(name.clone()),
            CellValue::Record(fields) => match fields.get("name") {
                Some(name) if *name != CellValue::Empty => name.clone(),
                _ => self.clone(),
            },
            other => other.clone(),
        }
    }

    /// Get the display name if this is a named record
    pub fn name(&self) -> Option<&str> {
        match self {
            CellValue::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether two values would read as the same label.
    ///
    /// Unlike `==`, a NaN number matches the same NaN.
    pub fn same_label(&self, other: &CellValue) -> bool {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a == b || a.to_bits() == b.to_bits(),
            (
                CellValue::Named { name: a, fields: fa },
                CellValue::Named { name: b, fields: fb },
            ) => a == b && same_fields(fa, fb),
            (CellValue::Record(fa), CellValue::Record(fb)) => same_fields(fa, fb),
            (a, b) => a == b,
        }
    }

    /// Look up a member of a record value
    pub fn field(&self, key: &str) -> Option<&CellValue> {
        match self {
            CellValue::Named { fields, .. } | CellValue::Record(fields) => fields.get(key),
            _ => None,
        }
    }
}

fn same_fields(a: &BTreeMap<String, CellValue>, b: &BTreeMap<String, CellValue>) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|((ka, va), (kb, vb))| ka == kb && va.same_label(vb))
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Named { name, .. } => write!(f, "{}", name),
            CellValue::Record(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::string(s)
    }
}

/// Severity of the calculation log attached to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Get the wire name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(Error::InvalidLogLevel(s.to_string())),
        }
    }
}

/// One item of a data push: the value plus the metadata the source attaches
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataItem {
    /// The cell value
    pub value: CellValue,
    /// Type of the value as reported by the source (e.g. `DOUBLE`)
    pub type_name: Option<String>,
    /// Severity of the calculation log, if one exists for the cell
    pub log_level: Option<LogLevel>,
}

impl DataItem {
    /// Create an item carrying only a value
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            type_name: None,
            log_level: None,
        }
    }

    /// Set the reported type name
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Attach a log level
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }
}

impl From<CellValue> for DataItem {
    fn from(value: CellValue) -> Self {
        DataItem::new(value)
    }
}

/// A single push for a two-item viewport.
///
/// Items arrive in request order: the title probe first, the observed cell
/// second.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataPush {
    /// Result of the title probe (column 0 of the row)
    pub title: DataItem,
    /// Value of the observed cell
    pub value: DataItem,
}

impl DataPush {
    /// Create a push from its two items
    pub fn new(title: impl Into<DataItem>, value: impl Into<DataItem>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_of_named_record() {
        let mut fields = BTreeMap::new();
        fields.insert("nodeId".to_string(), CellValue::from(17));
        let value = CellValue::Named {
            name: "RowX".into(),
            fields,
        };
        assert_eq!(value.label(), CellValue::string("RowX"));
        assert_eq!(value.field("nodeId"), Some(&CellValue::Number(17.0)));
    }

    #[test]
    fn test_label_of_scalar() {
        assert_eq!(CellValue::from(101.5).label(), CellValue::Number(101.5));
        assert_eq!(CellValue::from("AAPL").label(), CellValue::string("AAPL"));
        assert_eq!(CellValue::Empty.label(), CellValue::Empty);
    }

    #[test]
    fn test_empty_name_is_still_a_name() {
        let value = CellValue::named("");
        assert_eq!(value.label(), CellValue::string(""));
        assert_eq!(value.name(), Some(""));
    }

    #[test]
    fn test_label_of_record_with_non_string_name() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), CellValue::from(3));
        fields.insert("nodeId".to_string(), CellValue::from("N1"));
        assert_eq!(CellValue::Record(fields).label(), CellValue::Number(3.0));

        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), CellValue::Empty);
        let record = CellValue::Record(fields);
        assert_eq!(record.label(), record);
    }

    #[test]
    fn test_same_label() {
        let nan = CellValue::Number(f64::NAN);
        assert!(nan.same_label(&nan.clone()));
        assert!(CellValue::Number(0.0).same_label(&CellValue::Number(-0.0)));
        assert!(!CellValue::Number(1.0).same_label(&CellValue::from("1")));

        let mut fields = BTreeMap::new();
        fields.insert("x".to_string(), nan.clone());
        let record = CellValue::Record(fields);
        assert!(record.same_label(&record.clone()));
        assert!(!record.same_label(&CellValue::Record(BTreeMap::new())));
    }

    #[test]
    fn test_record_display() {
        let mut fields = BTreeMap::new();
        fields.insert("a".to_string(), CellValue::from(1));
        fields.insert("b".to_string(), CellValue::from("x"));
        assert_eq!(CellValue::Record(fields).to_string(), "{a: 1, b: x}");
        assert_eq!(CellValue::named("Swap 5Y").to_string(), "Swap 5Y");
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("ERROR".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Error > LogLevel::Info);
    }
}
