//! Configuration for cell subscriptions and the cell menu.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! bypass_cache = true
//! log = false
//! label_prefix = "cell"
//!
//! [menu]
//! depgraph_blacklist = ["FUNGIBLE_TRADE"]
//! ```

use std::path::Path;

use cellfeed_core::{CellFormat, GridSource};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::subscription::CellConfig;

/// Settings shared by every cell subscription a process opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Skip the data source's cache when opening subscriptions.
    pub bypass_cache: bool,
    /// Ask for calculation logs with every viewport.
    pub log: bool,
    /// Prefix of the label data sources see for each subscriber.
    pub label_prefix: String,
    pub menu: MenuConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            bypass_cache: true,
            log: false,
            label_prefix: "cell".to_string(),
            menu: MenuConfig::default(),
        }
    }
}

/// Settings for the contextual cell menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Cell types that cannot be opened from a dependency graph.
    pub depgraph_blacklist: Vec<String>,
}

impl FeedConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Subscription parameters for one cell, with these settings applied.
    ///
    /// A missing row or column is passed through for
    /// [`CellSubscription::open`](crate::CellSubscription::open) to reject.
    pub fn cell(
        &self,
        source: GridSource,
        row: Option<u32>,
        col: Option<u32>,
        format: CellFormat,
    ) -> CellConfig {
        CellConfig {
            source,
            row,
            col,
            format,
            log: self.log,
            bypass_cache: self.bypass_cache,
            label_prefix: self.label_prefix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(FeedConfig::from_toml_str("").unwrap(), FeedConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = FeedConfig::from_toml_str(
            r#"
            log = true

            [menu]
            depgraph_blacklist = ["NODE", "FUNGIBLE_TRADE"]
            "#,
        )
        .unwrap();
        assert!(config.log);
        assert!(config.bypass_cache);
        assert_eq!(config.label_prefix, "cell");
        assert_eq!(config.menu.depgraph_blacklist, vec!["NODE", "FUNGIBLE_TRADE"]);
    }

    #[test]
    fn test_invalid_config() {
        let err = FeedConfig::from_toml_str("log = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bypass_cache = false\nlabel_prefix = \"grid\"").unwrap();

        let config = FeedConfig::load(file.path()).unwrap();
        assert!(!config.bypass_cache);

        let cell = config.cell(GridSource::portfolio("V1"), Some(1), Some(2), CellFormat::Cell);
        assert!(!cell.bypass_cache);
        assert_eq!(cell.label_prefix, "grid");
        assert_eq!(cell.row, Some(1));
    }

    #[test]
    fn test_missing_file() {
        let err = FeedConfig::load(Path::new("/nonexistent/cellfeed.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
