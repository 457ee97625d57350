// SPDX-License-Identifier: MIT OR Apache-2.0
//! View configuration, stored as RON.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current view configuration format version
pub const VIEW_CONFIG_FORMAT_VERSION: u32 = 1;

/// Error when loading or saving a view configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// RON parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// File was written by a newer version
    #[error("View config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}

/// Settings that control how a topology is drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Config format version
    pub version: u32,
    /// Hide snaps whose band is not linked
    #[serde(default)]
    pub hide_disconnected_snaps: bool,
    /// Gap kept between neighboring blocks
    pub block_spacer_width: u32,
    /// Band thickness
    pub band_width: u32,
    /// Snap width
    pub snap_width: u32,
    /// Hook width
    pub hook_width: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            version: VIEW_CONFIG_FORMAT_VERSION,
            hide_disconnected_snaps: false,
            block_spacer_width: 20,
            band_width: 15,
            snap_width: 20,
            hook_width: 10,
        }
    }
}

impl ViewConfig {
    /// Parse a config from RON
    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        let config: ViewConfig = ron::from_str(s)?;

        if config.version > VIEW_CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: VIEW_CONFIG_FORMAT_VERSION,
            });
        }

        Ok(config)
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load a config from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save the config to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}
