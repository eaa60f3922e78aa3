//! Dashboard configuration, read from an optional JSON file.

use crate::stats::DEFAULT_TOP_N;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Longitude/latitude extent of the Brazil map image: `[west, east, south, north]`.
pub const BRAZIL_MAP_EXTENT: [f64; 4] = [-73.98283055, -33.8, -33.75116944, 5.4];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("top_categories must be at least 1")]
    InvalidTopCategories,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub orders_path: PathBuf,
    pub geolocation_path: PathBuf,
    /// Background drawn under the geolocation scatter. Omitted when unset.
    pub map_image_path: Option<PathBuf>,
    pub map_extent: [f64; 4],
    pub top_categories: usize,
    pub export_dir: PathBuf,
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            orders_path: PathBuf::from("./all_data.csv"),
            geolocation_path: PathBuf::from("./cleaned_geolocation_dataset.csv"),
            map_image_path: None,
            map_extent: BRAZIL_MAP_EXTENT,
            top_categories: DEFAULT_TOP_N,
            export_dir: PathBuf::from("./charts"),
            window_size: [1400.0, 900.0],
        }
    }
}

impl DashboardConfig {
    /// Load from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        if config.top_categories == 0 {
            return Err(ConfigError::InvalidTopCategories);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = DashboardConfig::from_json(
            r#"{ "orders_path": "data/orders.csv", "map_image_path": "brazil.jpg" }"#,
        )
        .unwrap();
        assert_eq!(config.orders_path, PathBuf::from("data/orders.csv"));
        assert_eq!(config.map_image_path, Some(PathBuf::from("brazil.jpg")));
        assert_eq!(config.top_categories, DEFAULT_TOP_N);
        assert_eq!(config.map_extent, BRAZIL_MAP_EXTENT);
    }

    #[test]
    fn test_zero_top_categories_rejected() {
        let result = DashboardConfig::from_json(r#"{ "top_categories": 0 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidTopCategories)));
    }

    #[test]
    fn test_malformed_config() {
        let result = DashboardConfig::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_config_file() {
        let result = DashboardConfig::load("tests/data/no_such_config.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
