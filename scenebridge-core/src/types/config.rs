//! Export configuration
//!
//! Defines the `scenebridge.toml` settings file. Every field has a default, so an
//! empty file (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::version::GodotVersion;

/// Settings for one export invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Engine version the scene is written for
    pub godot_version: GodotVersion,

    /// Target pixels per source unit
    pub pixels_per_unit: u32,

    /// Only export objects that are currently selected
    pub selected_only: bool,

    /// Export groups (collections) as Node2D containers
    pub use_collections: bool,

    /// Folder, beside the target scene, that textures are saved into
    pub texture_folder: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            godot_version: GodotVersion::default(),
            pixels_per_unit: 100,
            selected_only: false,
            use_collections: false,
            texture_folder: "textures".to_string(),
        }
    }
}

/// Errors that can occur when loading or validating a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("pixels_per_unit must be at least 1")]
    InvalidPixelsPerUnit,

    #[error("texture_folder must be a non-empty relative folder name, got '{0}'")]
    InvalidTextureFolder(String),
}

impl ExportConfig {
    /// Load a configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: ExportConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values a file or caller could have set out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pixels_per_unit < 1 {
            return Err(ConfigError::InvalidPixelsPerUnit);
        }
        let folder = self.texture_folder.trim();
        if folder.is_empty() || folder.starts_with('/') || folder.contains("..") {
            return Err(ConfigError::InvalidTextureFolder(self.texture_folder.clone()));
        }
        Ok(())
    }

    /// Pixels per unit as a float for coordinate math
    #[inline]
    pub fn pixels(&self) -> f64 {
        f64::from(self.pixels_per_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();
        assert_eq!(config.godot_version, GodotVersion::V3_5);
        assert_eq!(config.pixels_per_unit, 100);
        assert!(!config.use_collections);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: ExportConfig = toml::from_str(
            r#"
godot_version = "4.0"
use_collections = true
"#,
        )
        .unwrap();
        assert_eq!(config.godot_version, GodotVersion::V4);
        assert!(config.use_collections);
        assert_eq!(config.pixels_per_unit, 100);
        assert_eq!(config.texture_folder, "textures");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ExportConfig {
            pixels_per_unit: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPixelsPerUnit)));

        let config = ExportConfig {
            texture_folder: "../outside".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTextureFolder(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenebridge.toml");
        fs::write(&path, "pixels_per_unit = 64\nselected_only = true\n").unwrap();

        let config = ExportConfig::from_file(&path).unwrap();
        assert_eq!(config.pixels_per_unit, 64);
        assert!(config.selected_only);
    }
}
