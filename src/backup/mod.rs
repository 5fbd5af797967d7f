/// Backup snapshots, reconciliation and the legacy CSV format
///
/// A backup is a version-1 JSON document holding long-term goals and the
/// category settings. Loading validates the whole document before anything
/// is written; reconciliation then merges it into the live store.

pub mod csv;
pub mod reconcile;

pub use reconcile::{plan_import, reconcile, AmbiguousMatch, ImportPlan, ImportReport};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use thiserror::Error;
use crate::domain::{date_key, CategorySettings, LongTermGoal};
use crate::storage::{GoalStore, StorageError};

/// The only backup format version understood
pub const BACKUP_VERSION: u64 = 1;

/// Errors raised while reading or writing backup files
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Invalid backup format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported backup version {0} (expected 1)")]
    UnsupportedVersion(u64),

    #[error("Backup JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error on line {line}: {message}")]
    Csv { line: u64, message: String },
}

/// A loaded backup document, immutable once parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupSnapshot {
    pub version: u64,
    /// ISO 8601 export instant, kept as written
    pub timestamp: String,
    pub goals: Vec<LongTermGoal>,
    pub settings: Option<CategorySettings>,
}

impl BackupSnapshot {
    /// Build a snapshot from live data
    pub fn new(
        goals: Vec<LongTermGoal>,
        settings: Option<CategorySettings>,
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            version: BACKUP_VERSION,
            timestamp: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            goals,
            settings,
        }
    }

    /// Read the store's long-term goals and settings into a snapshot
    pub fn capture<S: GoalStore>(store: &S, exported_at: DateTime<Utc>) -> Result<Self, StorageError> {
        Ok(Self::new(
            store.list_long_term_goals()?,
            store.get_category_settings()?,
            exported_at,
        ))
    }

    /// Parse and validate a backup document
    ///
    /// Fails when `version` is missing or not 1, when `goals` is not an
    /// array, when any goal record is malformed, or when two records share
    /// an id. Nothing partial is ever returned.
    pub fn from_json(text: &str) -> Result<Self, BackupError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let object = value
            .as_object()
            .ok_or_else(|| BackupError::InvalidFormat("backup must be a JSON object".to_string()))?;

        let version = object
            .get("version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| BackupError::InvalidFormat("missing numeric 'version'".to_string()))?;
        if version != BACKUP_VERSION {
            return Err(BackupError::UnsupportedVersion(version));
        }

        let raw_goals = object
            .get("goals")
            .and_then(|g| g.as_array())
            .ok_or_else(|| BackupError::InvalidFormat("'goals' must be an array".to_string()))?;

        let mut goals: Vec<LongTermGoal> = Vec::with_capacity(raw_goals.len());
        let mut seen_ids = HashSet::with_capacity(raw_goals.len());
        for (position, raw) in raw_goals.iter().enumerate() {
            let goal: LongTermGoal = serde_json::from_value(raw.clone()).map_err(|e| {
                BackupError::InvalidFormat(format!("goal #{}: {}", position + 1, e))
            })?;
            goal.validate().map_err(|e| {
                BackupError::InvalidFormat(format!("goal #{}: {}", position + 1, e))
            })?;
            if !seen_ids.insert(goal.id.clone()) {
                return Err(BackupError::InvalidFormat(format!(
                    "goal #{}: duplicate id {}",
                    position + 1,
                    goal.id
                )));
            }
            goals.push(goal);
        }

        let settings = match object.get("settings") {
            None | Some(serde_json::Value::Null) => None,
            Some(raw) => Some(serde_json::from_value::<CategorySettings>(raw.clone()).map_err(|e| {
                BackupError::InvalidFormat(format!("settings: {}", e))
            })?),
        };

        let timestamp = object
            .get("timestamp")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            version,
            timestamp,
            goals,
            settings,
        })
    }

    /// Pretty-printed JSON, two-space indented
    pub fn to_json_pretty(&self) -> Result<String, BackupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Download name of a backup taken on `date`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("goal_tracker_backup_{}.json", date_key(date))
}
