//! Configuration for layer management, style composition and offline packs
//!
//! Every field has a default so a partial JSON file (or none at all) yields a
//! usable configuration.

use crate::{
    core::constants::{DEFAULT_PACK_MAX_ZOOM, DEFAULT_PACK_MIN_ZOOM},
    offline::context::ZoomRange,
    Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options consumed by the style compositor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeOptions {
    /// Upper bound applied to every source's `maxzoom` while merging
    pub max_tile_zoom: Option<u8>,
}

impl ComposeOptions {
    pub fn with_max_tile_zoom(max_tile_zoom: u8) -> Self {
        Self {
            max_tile_zoom: Some(max_tile_zoom),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Showing an opaque layer hides every other opaque layer
    pub mutually_exclusive: bool,
    /// Cap applied to source `maxzoom` values when composing
    pub max_tile_zoom: Option<u8>,
    /// Where the layer collection is persisted; `None` keeps it in memory
    pub store_path: Option<PathBuf>,
    /// Zoom window used for new offline packs when the caller gives none
    pub default_zoom: ZoomRange,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            mutually_exclusive: true,
            max_tile_zoom: None,
            store_path: None,
            default_zoom: ZoomRange::new(DEFAULT_PACK_MIN_ZOOM, DEFAULT_PACK_MAX_ZOOM),
        }
    }
}

impl StackConfig {
    /// Loads a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let config = serde_json::from_slice(&data)?;
        log::debug!("loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            max_tile_zoom: self.max_tile_zoom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StackConfig = serde_json::from_str(r#"{"max_tile_zoom": 14}"#).unwrap();
        assert!(config.mutually_exclusive);
        assert_eq!(config.compose_options(), ComposeOptions::with_max_tile_zoom(14));
        assert_eq!(config.default_zoom, ZoomRange::new(0.0, 16.0));
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"mutually_exclusive": false}"#).unwrap();

        let config = StackConfig::from_file(&path).unwrap();
        assert!(!config.mutually_exclusive);
        assert_eq!(config.max_tile_zoom, None);
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let err = StackConfig::from_file("/nonexistent/mapstack.json").unwrap_err();
        assert!(matches!(err, crate::StackError::Io(_)));
    }
}
