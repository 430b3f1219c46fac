use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::task::StatusTaxonomy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("final_statuses must not be empty")]
    NoFinalStatuses,
}

/// Engine settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsConfig {
    pub final_statuses: Vec<String>,
    pub urgent_priority: String,
    pub trend_store: Option<PathBuf>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            final_statuses: StatusTaxonomy::default().final_statuses,
            urgent_priority: "urgent".to_string(),
            trend_store: None,
        }
    }
}

impl AnalyticsConfig {
    pub fn taxonomy(&self) -> StatusTaxonomy {
        StatusTaxonomy::new(self.final_statuses.clone())
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, serde_yaml::Error> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(input)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.final_statuses.is_empty() {
            return Err(ConfigError::NoFinalStatuses);
        }
        Ok(config)
    }

    /// Uses the defaults when no path is given.
    pub fn load_if_provided(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
