/// Storage layer for persisting goal data
///
/// This module defines the `GoalStore` contract the rest of the crate
/// consumes, and ships a SQLite implementation of it.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use thiserror::Error;
use crate::domain::{
    CategorySettings, Goal, GoalId, GoalLog, LogsIndex, LongTermGoal, LongTermGoalId,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Goal not found: {goal_id}")]
    GoalNotFound { goal_id: String },

    #[error("Long-term goal not found: {goal_id}")]
    LongTermGoalNotFound { goal_id: String },

    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Goals and logs read together
///
/// Analytics must never combine goals and logs from different revisions,
/// so the store hands both out in one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub goals: Vec<Goal>,
    pub logs: Vec<GoalLog>,
}

impl StoreSnapshot {
    /// Build the logs index for this snapshot
    pub fn index(&self) -> LogsIndex {
        LogsIndex::from_logs(&self.logs)
    }
}

/// Long-term goals and category settings read together
///
/// Reconciliation plans against this, so both halves must come from the
/// same revision of the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LongTermSnapshot {
    pub goals: Vec<LongTermGoal>,
    pub settings: Option<CategorySettings>,
}

/// Trait defining the storage interface for goals, logs and backups
///
/// This trait allows the SQLite backend to be swapped out (or wrapped in
/// tests) while the tools and the reconciliation engine stay unchanged.
pub trait GoalStore {
    /// Create a new goal
    fn create_goal(&self, goal: &Goal) -> Result<(), StorageError>;

    /// Get a goal by ID
    fn get_goal(&self, goal_id: &GoalId) -> Result<Goal, StorageError>;

    /// Update an existing goal
    fn update_goal(&self, goal: &Goal) -> Result<(), StorageError>;

    /// Archive a goal by setting its end date
    fn archive_goal(&self, goal_id: &GoalId, end_date: NaiveDate) -> Result<(), StorageError>;

    /// Hard delete a goal and any logs it still has
    fn delete_goal(&self, goal_id: &GoalId) -> Result<(), StorageError>;

    /// List every goal, archived ones included, oldest first
    fn list_goals(&self) -> Result<Vec<Goal>, StorageError>;

    /// List every log, date ascending
    fn list_logs(&self) -> Result<Vec<GoalLog>, StorageError>;

    /// Number of logs recorded for a goal
    fn count_logs_for_goal(&self, goal_id: &GoalId) -> Result<u32, StorageError>;

    /// Insert or overwrite the log for `(goal_id, date)`
    fn upsert_log(&self, log: &GoalLog) -> Result<(), StorageError>;

    /// Remove the log for `(goal_id, date)`; removing a missing log is not an error
    fn delete_log(&self, goal_id: &GoalId, date: NaiveDate) -> Result<(), StorageError>;

    /// Read goals and logs as one consistent snapshot
    fn snapshot(&self) -> Result<StoreSnapshot, StorageError> {
        Ok(StoreSnapshot {
            goals: self.list_goals()?,
            logs: self.list_logs()?,
        })
    }

    /// List every long-term goal
    fn list_long_term_goals(&self) -> Result<Vec<LongTermGoal>, StorageError>;

    /// Get a long-term goal by ID
    fn get_long_term_goal(&self, goal_id: &LongTermGoalId) -> Result<LongTermGoal, StorageError>;

    /// Insert or overwrite a long-term goal
    fn upsert_long_term_goal(&self, goal: &LongTermGoal) -> Result<(), StorageError>;

    /// Current category settings, if any were ever saved
    fn get_category_settings(&self) -> Result<Option<CategorySettings>, StorageError>;

    /// Read long-term goals and settings as one consistent snapshot
    fn long_term_snapshot(&self) -> Result<LongTermSnapshot, StorageError> {
        Ok(LongTermSnapshot {
            goals: self.list_long_term_goals()?,
            settings: self.get_category_settings()?,
        })
    }

    /// Write a reconciliation result: every goal upsert plus an optional
    /// settings replacement, all or nothing
    fn apply_backup(
        &self,
        goals: &[LongTermGoal],
        settings: Option<&CategorySettings>,
    ) -> Result<(), StorageError>;

    /// Persisted monthly target, if the user ever set one
    fn get_monthly_target(&self) -> Result<Option<u32>, StorageError>;

    /// Persist the monthly target
    fn set_monthly_target(&self, target: u32) -> Result<(), StorageError>;
}
