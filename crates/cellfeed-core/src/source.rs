//! Grid source descriptors

use std::fmt;

/// Kind of analytics grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GridType {
    /// Portfolio grid: one row per position or trade
    #[default]
    Portfolio,
    /// Primitives grid: one row per non-portfolio calculation target
    Primitives,
}

impl GridType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GridType::Portfolio => "portfolio",
            GridType::Primitives => "primitives",
        }
    }
}

/// Which remote dataset a subscription binds to.
///
/// The subscription layer treats this as opaque and hands it to the data
/// source unchanged; the flags are read only by view-level helpers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridSource {
    /// View definition the grid is calculated from
    pub view_id: String,
    /// Grid kind
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub grid_type: GridType,
    /// Whether this is a dependency graph grid opened from another cell
    pub depgraph: bool,
    /// Whether the grid is a trade blotter
    pub blotter: bool,
}

impl GridSource {
    /// Create a portfolio grid source for a view
    pub fn portfolio<S: Into<String>>(view_id: S) -> Self {
        Self {
            view_id: view_id.into(),
            ..Default::default()
        }
    }

    /// Create a primitives grid source for a view
    pub fn primitives<S: Into<String>>(view_id: S) -> Self {
        Self {
            view_id: view_id.into(),
            grid_type: GridType::Primitives,
            ..Default::default()
        }
    }

    /// Mark the source as a dependency graph
    pub fn with_depgraph(mut self) -> Self {
        self.depgraph = true;
        self
    }

    /// Mark the source as a blotter
    pub fn with_blotter(mut self) -> Self {
        self.blotter = true;
        self
    }

    pub fn is_primitives(&self) -> bool {
        self.grid_type == GridType::Primitives
    }
}

impl fmt::Display for GridSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.grid_type.as_str(), self.view_id)?;
        if self.depgraph {
            write!(f, " (depgraph)")?;
        }
        Ok(())
    }
}
