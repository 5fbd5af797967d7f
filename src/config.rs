/// Runtime configuration
///
/// Built once from the command line. The database location falls back
/// through the usual per-user directories until one is writable.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;
use crate::analytics::{clamp_monthly_target, DEFAULT_MONTHLY_TARGET};

/// File name of the SQLite database inside the data directory
pub const DATABASE_FILE_NAME: &str = "goals.db";

/// Errors raised while resolving the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot prepare database directory {path}: {source}")]
    DatabaseDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Monthly target must be between 1 and 31, got {0}")]
    InvalidMonthlyTarget(u32),
}

/// Settings the server starts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub database_path: PathBuf,
    /// Used until a target is persisted through the `monthly_target_set` tool
    pub monthly_target: u32,
}

impl TrackerConfig {
    /// Configuration with an explicit database path, target clamped to 1-31
    pub fn new(database_path: PathBuf, monthly_target: u32) -> Self {
        Self {
            database_path,
            monthly_target: clamp_monthly_target(monthly_target),
        }
    }

    /// Resolve the command line options into a configuration
    ///
    /// A zero target is rejected outright; anything above 31 is clamped.
    /// When no database path is given the default location is used.
    pub fn resolve(database: Option<PathBuf>, monthly_target: Option<u32>) -> Result<Self, ConfigError> {
        let monthly_target = match monthly_target {
            Some(0) => return Err(ConfigError::InvalidMonthlyTarget(0)),
            Some(target) => target,
            None => DEFAULT_MONTHLY_TARGET,
        };

        let database_path = match database {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    ensure_directory(parent)?;
                }
                path
            }
            None => default_database_path()?,
        };

        Ok(Self::new(database_path, monthly_target))
    }
}

fn ensure_directory(path: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(path).map_err(|source| ConfigError::DatabaseDirectory {
        path: path.to_path_buf(),
        source,
    })
}

fn is_writable(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".write_probe");
    if std::fs::write(&probe, b"probe").is_ok() {
        let _ = std::fs::remove_file(&probe);
        true
    } else {
        false
    }
}

/// Default database path with a fallback chain
///
/// Tries `~/.goal_tracker`, then the platform data and config directories,
/// then the working directory, and finally the temp directory.
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    let candidates = [
        dirs::home_dir().map(|p| p.join(".goal_tracker")),
        dirs::data_dir().map(|p| p.join("goal_tracker")),
        dirs::config_dir().map(|p| p.join("goal_tracker")),
        std::env::current_dir().ok().map(|p| p.join(".goal_tracker")),
    ];

    for dir in candidates.iter().flatten() {
        if is_writable(dir) {
            return Ok(dir.join(DATABASE_FILE_NAME));
        }
    }

    let temp_dir = std::env::temp_dir().join("goal_tracker");
    ensure_directory(&temp_dir)?;
    warn!("Using temporary directory for database: {}", temp_dir.display());
    Ok(temp_dir.join(DATABASE_FILE_NAME))
}
