//! TOML configuration file support.
//!
//! Settings for the convert command can be kept in a config file:
//!
//! ```toml
//! # sigtree.toml
//! [conversion]
//! layout = "split"
//! compression_level = 9
//! overwrite = true
//! ```
//!
//! Flags given on the command line take precedence.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::LayoutArg;

/// Root configuration structure for sigtree.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Conversion-specific settings.
    #[serde(default)]
    pub conversion: ConversionConfig,
}

/// Configuration for the convert command.
#[derive(Debug, Default, Deserialize)]
pub struct ConversionConfig {
    /// Physical layout of the signal arrays.
    pub layout: Option<LayoutArg>,

    /// ZSTD compression level (1-22).
    pub compression_level: Option<i32>,

    /// Replace existing output files.
    pub overwrite: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [conversion]
            layout = "split"
            compression_level = 9
            overwrite = true
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.conversion.layout, Some(LayoutArg::Split));
        assert_eq!(config.conversion.compression_level, Some(9));
        assert_eq!(config.conversion.overwrite, Some(true));
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [conversion]
            layout = "both"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.conversion.layout, Some(LayoutArg::Both));
        assert_eq!(config.conversion.compression_level, None);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.conversion.layout, None);
        assert_eq!(config.conversion.overwrite, None);
    }

    #[test]
    fn test_unknown_layout_is_rejected() {
        let toml = r#"
            [conversion]
            layout = "diagonal"
        "#;
        assert!(Config::from_str(toml).is_err());
    }
}
