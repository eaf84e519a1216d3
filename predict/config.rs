//! Runtime settings: where the artifacts live and how results are displayed.
//!
//! Values are resolved in three layers. Built-in defaults come first, then an
//! optional TOML file, then command-line overrides.

use crate::contributions::DEFAULT_TOP_K;
use crate::dataset::BinRule;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_MODEL_PATH: &str = "insurance_model.toml";
pub const DEFAULT_COLUMNS_PATH: &str = "columns.json";
pub const DEFAULT_DATASET_PATH: &str = "insurance.csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML config file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("top_k must be at least 1.")]
    InvalidTopK,
    #[error("histogram_bins must be at least 1 when set.")]
    InvalidBinCount,
}

/// The resolved settings a command runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub columns_path: PathBuf,
    pub dataset_path: PathBuf,
    pub top_k: usize,
    pub bins: BinRule,
}

/// The on-disk shape of the config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    model: Option<PathBuf>,
    columns: Option<PathBuf>,
    dataset: Option<PathBuf>,
    top_k: Option<usize>,
    histogram_bins: Option<usize>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub model: Option<PathBuf>,
    pub columns: Option<PathBuf>,
    pub dataset: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            columns_path: PathBuf::from(DEFAULT_COLUMNS_PATH),
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            top_k: DEFAULT_TOP_K,
            bins: BinRule::Auto,
        }
    }
}

impl AppConfig {
    pub fn resolve(file: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = file {
            let parsed: ConfigFile = toml::from_str(&fs::read_to_string(path)?)?;
            log::debug!("Read config file {}: {:?}", path.display(), parsed);
            config.apply_file(parsed)?;
        }

        if let Some(model) = overrides.model {
            config.model_path = model;
        }
        if let Some(columns) = overrides.columns {
            config.columns_path = columns;
        }
        if let Some(dataset) = overrides.dataset {
            config.dataset_path = dataset;
        }
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) -> Result<(), ConfigError> {
        if let Some(model) = file.model {
            self.model_path = model;
        }
        if let Some(columns) = file.columns {
            self.columns_path = columns;
        }
        if let Some(dataset) = file.dataset {
            self.dataset_path = dataset;
        }
        if let Some(top_k) = file.top_k {
            if top_k == 0 {
                return Err(ConfigError::InvalidTopK);
            }
            self.top_k = top_k;
        }
        if let Some(bins) = file.histogram_bins {
            if bins == 0 {
                return Err(ConfigError::InvalidBinCount);
            }
            self.bins = BinRule::Fixed(bins);
        }
        Ok(())
    }
}
