/// Tool for toggling a goal's log
///
/// This module implements the goal_toggle MCP tool. Each call moves the
/// `(goal, date)` pair one step along unmarked -> done -> missed -> unmarked.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use tracing::{debug, warn};
use crate::domain::{GoalId, GoalLog, LogStatus, LogsIndex, ToggleCommand};
use crate::storage::{GoalStore, StorageError};
use crate::tools::{date_or_today, parse_goal_id, ToolError};

/// Parameters for toggling a log
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToggleGoalParams {
    /// ID of the goal to toggle
    pub goal_id: String,
    /// Day to toggle (YYYY-MM-DD, defaults to today)
    pub date: Option<String>,
}

/// Response from toggling a log
#[derive(Debug, Serialize)]
pub struct ToggleGoalResponse {
    pub goal_id: GoalId,
    pub title: String,
    pub date: NaiveDate,
    pub previous: Option<LogStatus>,
    /// New state; None means the day is unmarked again
    pub status: Option<LogStatus>,
    pub message: String,
}

fn persist<S: GoalStore>(storage: &S, command: &ToggleCommand) -> Result<(), StorageError> {
    match command.next {
        Some(status) => storage.upsert_log(&GoalLog::new(command.goal_id.clone(), command.date, status)),
        None => storage.delete_log(&command.goal_id, command.date),
    }
}

/// Toggle the log of a goal on a day
///
/// The new state lands in `logs` first so readers see it immediately; if
/// the store write fails the overlay is rolled back and the error returned.
pub fn toggle_goal<S: GoalStore>(
    storage: &S,
    logs: &mut LogsIndex,
    params: ToggleGoalParams,
    today: NaiveDate,
) -> Result<ToggleGoalResponse, ToolError> {
    let goal_id = parse_goal_id(&params.goal_id)?;
    let date = date_or_today(params.date.as_deref(), today)?;

    // Fails with GoalNotFound before anything is written
    let goal = storage.get_goal(&goal_id)?;
    let command = ToggleCommand::plan(logs, &goal, date)?;

    command.apply(logs);
    if let Err(e) = persist(storage, &command) {
        warn!("Toggle of goal {} on {} failed, rolling back: {}", goal.id, date, e);
        command.undo(logs);
        return Err(e.into());
    }
    debug!("Toggled goal {} on {}: {:?} -> {:?}", goal.id, date, command.previous, command.next);

    let message = match command.next {
        Some(LogStatus::Done) => format!("✅ '{}' marked done on {}", goal.title, date),
        Some(LogStatus::Missed) => format!("❌ '{}' marked missed on {}", goal.title, date),
        None => format!("⬜ '{}' unmarked on {}", goal.title, date),
    };

    Ok(ToggleGoalResponse {
        goal_id: goal.id,
        title: goal.title,
        date,
        previous: command.previous,
        status: command.next,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, Goal};
    use crate::storage::SqliteStorage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn params(goal: &Goal, day: Option<&str>) -> ToggleGoalParams {
        ToggleGoalParams {
            goal_id: goal.id.to_string(),
            date: day.map(str::to_string),
        }
    }

    #[test]
    fn test_full_toggle_cycle() {
        let storage = SqliteStorage::in_memory().unwrap();
        let goal = Goal::new("Read".to_string(), None, date(2024, 1, 1)).unwrap();
        storage.create_goal(&goal).unwrap();
        let mut logs = LogsIndex::new();
        let today = date(2024, 1, 5);

        let first = toggle_goal(&storage, &mut logs, params(&goal, None), today).unwrap();
        assert_eq!(first.status, Some(LogStatus::Done));
        assert_eq!(storage.list_logs().unwrap().len(), 1);

        let second = toggle_goal(&storage, &mut logs, params(&goal, None), today).unwrap();
        assert_eq!(second.previous, Some(LogStatus::Done));
        assert_eq!(second.status, Some(LogStatus::Missed));
        assert_eq!(logs.status(&goal.id, today), Some(LogStatus::Missed));

        let third = toggle_goal(&storage, &mut logs, params(&goal, None), today).unwrap();
        assert_eq!(third.status, None);
        assert!(storage.list_logs().unwrap().is_empty());
        assert!(logs.is_empty());
    }

    #[test]
    fn test_unknown_goal_writes_nothing() {
        let storage = SqliteStorage::in_memory().unwrap();
        let ghost = Goal::new("Ghost".to_string(), None, date(2024, 1, 1)).unwrap();
        let mut logs = LogsIndex::new();

        let result = toggle_goal(&storage, &mut logs, params(&ghost, None), date(2024, 1, 5));
        assert!(matches!(result, Err(ToolError::Storage(StorageError::GoalNotFound { .. }))));
        assert!(logs.is_empty());
    }

    #[test]
    fn test_outside_window_rejected() {
        let storage = SqliteStorage::in_memory().unwrap();
        let goal = Goal::new("Read".to_string(), None, date(2024, 1, 10)).unwrap();
        storage.create_goal(&goal).unwrap();
        let mut logs = LogsIndex::new();

        let result = toggle_goal(&storage, &mut logs, params(&goal, Some("2024-01-09")), date(2024, 1, 12));
        assert!(matches!(
            result,
            Err(ToolError::Domain(DomainError::OutsideValidityWindow { .. }))
        ));
        assert!(storage.list_logs().unwrap().is_empty());
    }
}
