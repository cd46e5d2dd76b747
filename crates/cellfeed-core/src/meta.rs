//! Grid metadata: the column layout a data source announces before it
//! starts pushing values.

/// Metadata describing a grid
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridMeta {
    /// Column layout, split into fixed and scrolling groups
    pub columns: ColumnLayout,
}

/// Partition of a grid's columns into a non-scrolling prefix and a
/// scrollable remainder
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnLayout {
    /// Fixed column groups
    #[cfg_attr(feature = "serde", serde(default))]
    pub fixed: Vec<ColumnGroup>,
    /// Scrolling column groups
    #[cfg_attr(feature = "serde", serde(default))]
    pub scroll: Vec<ColumnGroup>,
}

/// A named set of adjacent columns
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnGroup {
    /// Group caption
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    /// Columns in display order
    #[cfg_attr(feature = "serde", serde(default))]
    pub columns: Vec<ColumnSpec>,
}

/// A single column of a grid
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSpec {
    /// Header label
    pub header: String,
    /// Long description (tooltip)
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    /// Value type of the column
    #[cfg_attr(feature = "serde", serde(default, rename = "type"))]
    pub type_name: Option<String>,
}

impl ColumnSpec {
    /// Create a column with only a header
    pub fn new<S: Into<String>>(header: S) -> Self {
        Self {
            header: header.into(),
            description: None,
            type_name: None,
        }
    }
}

impl ColumnGroup {
    /// Create an unnamed group from header labels
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            columns: headers.into_iter().map(ColumnSpec::new).collect(),
        }
    }

    /// Header labels of this group in display order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.header.as_str())
    }
}

impl GridMeta {
    /// Create metadata from a fixed group and scroll groups
    pub fn new(fixed: ColumnGroup, scroll: Vec<ColumnGroup>) -> Self {
        Self {
            columns: ColumnLayout {
                fixed: vec![fixed],
                scroll,
            },
        }
    }

    /// Number of fixed column groups
    pub fn fixed_group_count(&self) -> usize {
        self.columns.fixed.len()
    }

    /// Flat list of header labels, indexable by column.
    ///
    /// Grids carry a single fixed group, so only the first one is consulted.
    /// Its headers come first, followed by the headers of every scroll group
    /// in group order.
    pub fn column_headers(&self) -> Vec<String> {
        let fixed = self.columns.fixed.first().into_iter();
        fixed
            .chain(self.columns.scroll.iter())
            .flat_map(|group| group.headers())
            .map(str::to_string)
            .collect()
    }
}
