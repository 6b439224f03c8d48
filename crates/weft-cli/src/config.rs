//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration, loaded from `weft.toml` under the user config dir.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Database file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Detection tuning
    #[serde(default)]
    pub detect: DetectSettings,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Read-cache entry ceiling
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Read-cache TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

/// Detection tuning persisted in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectSettings {
    /// Similarity score at or above which an edge is produced
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Stems shorter than this are not considered reference mentions
    #[serde(default = "default_min_stem_length")]
    pub min_stem_length: usize,
}

/// Output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_similarity_threshold() -> f64 {
    0.75
}

fn default_min_stem_length() -> usize {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl Default for DetectSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            min_stem_length: default_min_stem_length(),
        }
    }
}

impl Config {
    /// The default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Could not find config directory".into()))?;
        Ok(base.join("weft").join("weft.toml"))
    }

    /// Load configuration from an explicit path, or from the default
    /// location; a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the database path: explicit override, then config file,
    /// then the default data dir.
    pub fn resolve_db_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(p) = override_path {
            return Ok(p.to_path_buf());
        }
        if let Some(p) = &self.db_path {
            return Ok(p.clone());
        }
        let base = dirs::data_dir()
            .ok_or_else(|| CliError::Config("Could not find data directory".into()))?;
        Ok(base.join("weft").join("weft.db"))
    }
}
