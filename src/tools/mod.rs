/// MCP tools for goal management
///
/// This module contains all the MCP tools that external clients can call.
/// Each tool is a plain function over a `GoalStore` taking a deserialized
/// parameter struct; the MCP layer only routes and renders.

pub mod backup;
pub mod create;
pub mod list;
pub mod log;
pub mod status;
pub mod update;

// Re-export tool functions for easy access
pub use backup::*;
pub use create::*;
pub use list::*;
pub use log::*;
pub use status::*;
pub use update::*;

use chrono::NaiveDate;
use thiserror::Error;
use crate::backup::reconcile::ReconcileError;
use crate::backup::BackupError;
use crate::domain::{parse_date_key, DomainError, GoalId};
use crate::storage::StorageError;

/// Errors a tool call can end with
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ReconcileError> for ToolError {
    fn from(error: ReconcileError) -> Self {
        match error {
            ReconcileError::Backup(e) => ToolError::Backup(e),
            ReconcileError::Storage(e) => ToolError::Storage(e),
        }
    }
}

/// Parse a goal id argument
pub(crate) fn parse_goal_id(raw: &str) -> Result<GoalId, ToolError> {
    if raw.trim().is_empty() {
        return Err(ToolError::InvalidParams("goal_id cannot be empty".to_string()));
    }
    GoalId::from_string(raw)
        .map_err(|_| ToolError::InvalidParams(format!("'{}' is not a valid goal id", raw)))
}

/// Parse an optional `YYYY-MM-DD` argument, defaulting to `today`
pub(crate) fn date_or_today(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, ToolError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(key) => Ok(parse_date_key(key)?),
        None => Ok(today),
    }
}
