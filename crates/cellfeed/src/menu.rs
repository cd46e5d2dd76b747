//! Visibility rules for the contextual menu shown over a hovered grid cell.
//!
//! The menu offers to open the hovered value in another panel. It is not
//! offered on structural cells (row labels, tree nodes, blotter detail
//! columns) or on cells whose right edge is scrolled out of view, since the
//! menu is anchored to that edge.

use cellfeed_core::GridSource;

use crate::config::MenuConfig;

/// Cell type the grid uses for portfolio tree nodes.
pub const NODE_TYPE: &str = "NODE";

/// The grid a cell is hovered in.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    pub source: &'a GridSource,
    /// Width of the visible grid area, in pixels.
    pub visible_width: f64,
}

/// A hovered cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoveredCell {
    pub row: u32,
    pub col: u32,
    /// Value type reported by the source.
    pub type_name: Option<String>,
    /// Right edge of the cell, in pixels from the grid's left edge.
    pub right: f64,
}

/// What the menu should do in response to an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Show,
    Hide,
    /// Discard the frozen (pinned) menu.
    Unfreeze,
    /// Leave the menu as it is.
    Ignore,
}

/// Whether the menu is hidden for `cell`.
pub fn is_hidden(grid: &GridView<'_>, cell: &HoveredCell, config: &MenuConfig) -> bool {
    let source = grid.source;
    let depgraph = source.depgraph;
    let type_name = cell.type_name.as_deref();

    // Depgraph and primitives grids keep the row label in the first column
    let first_column = (depgraph || source.is_primitives()) && cell.col < 1;
    let node = type_name == Some(NODE_TYPE);
    let blotter_detail = source.blotter && cell.col > 0;
    let clipped = cell.right > grid.visible_width;
    let unsupported = depgraph
        && type_name.map_or(false, |t| {
            config.depgraph_blacklist.iter().any(|blocked| blocked == t)
        });

    first_column || node || blotter_detail || clipped || unsupported
}

/// Hover and scroll state of a cell menu.
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    config: MenuConfig,
    frozen: bool,
    busy: bool,
    current: Option<HoveredCell>,
}

impl MenuState {
    pub fn new(config: MenuConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// The pointer entered a cell.
    pub fn hover_in(&mut self, grid: &GridView<'_>, cell: &HoveredCell) -> MenuAction {
        if self.frozen || self.busy {
            return MenuAction::Ignore;
        }
        self.current = Some(cell.clone());
        if is_hidden(grid, cell, &self.config) {
            MenuAction::Hide
        } else {
            MenuAction::Show
        }
    }

    /// Scrolling started: hide the menu, or discard it if it was pinned.
    pub fn scroll_start(&mut self) -> MenuAction {
        self.busy = true;
        if self.frozen {
            self.frozen = false;
            MenuAction::Unfreeze
        } else {
            MenuAction::Hide
        }
    }

    pub fn scroll_end(&mut self) {
        self.busy = false;
    }

    /// Pin the menu to the current cell; hover events are ignored until it
    /// is unfrozen.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The cell most recently hovered while the menu was responsive.
    pub fn current(&self) -> Option<&HoveredCell> {
        self.current.as_ref()
    }
}
