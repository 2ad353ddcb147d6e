use crate::kriging::CellFailurePolicy;
use crate::spatial::TrendConstraint;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KrigingConfig {
    /// Threads used to solve grid cells.
    pub worker_count: usize,
    pub trend_constraint: TrendConstraint,
    pub cell_failure_policy: CellFailurePolicy,
}

impl Default for KrigingConfig {
    fn default() -> Self {
        Self {
            worker_count: 1,
            trend_constraint: TrendConstraint::default(),
            cell_failure_policy: CellFailurePolicy::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read kriging config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse kriging config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid kriging config '{}': {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

pub fn load_kriging_config(config_path: impl AsRef<Path>) -> Result<KrigingConfig, ConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config: KrigingConfig =
        serde_json::from_str(&source).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;

    if config.worker_count == 0 {
        return Err(ConfigError::Invalid {
            path: config_path.to_path_buf(),
            message: "workerCount must be at least 1".to_string(),
        });
    }

    Ok(config)
}
