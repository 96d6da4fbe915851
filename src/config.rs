//! Configuration management for the user-graph pipeline.
//!
//! Supports loading from a TOML config file with CLI overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Output directory paths
    #[serde(default)]
    pub paths: PathConfig,

    /// Analytics settings
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,

    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
            reports_dir: default_reports_dir(),
            metadata_dir: default_metadata_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Number of clusters reported in the largest/richest rankings
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl AnalyticsConfig {
    /// Validate analytics configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.top_k == 0 {
            anyhow::bail!("top_k must be > 0");
        }
        Ok(())
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("data/reports")
}

fn default_metadata_dir() -> PathBuf {
    PathBuf::from("data/metadata")
}

fn default_top_k() -> usize {
    10
}

impl PipelineConfig {
    /// Load from a TOML config file
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Ensure all output directories exist
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.paths.raw_dir)?;
        std::fs::create_dir_all(&self.paths.processed_dir)?;
        std::fs::create_dir_all(&self.paths.reports_dir)?;
        std::fs::create_dir_all(&self.paths.metadata_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.analytics.top_k, 10);
        assert_eq!(config.paths.data_dir, PathBuf::from("data"));
        assert_eq!(config.paths.reports_dir, PathBuf::from("data/reports"));
        assert!(config.analytics.validate().is_ok());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: PipelineConfig = toml::from_str("[analytics]\ntop_k = 5\n").unwrap();
        assert_eq!(config.analytics.top_k, 5);
        assert_eq!(config.paths.processed_dir, PathBuf::from("data/processed"));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let config = AnalyticsConfig { top_k: 0 };
        assert!(config.validate().is_err());
    }
}
