/// Goal logs, the derived logs index, and the toggle cycle
///
/// A `GoalLog` is one stored observation. `LogsIndex` is the read model every
/// analytics component works from: date -> (goal -> status). It is rebuilt
/// from the log set and never persisted. `ToggleCommand` is the unit of
/// change produced by a user toggle; it can be applied to an index and undone.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

use crate::domain::{DomainError, Goal, GoalId, LogStatus};

/// A single stored observation for a goal on a day
///
/// At most one log exists per `(goal_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalLog {
    /// Goal this observation belongs to
    pub goal_id: GoalId,
    /// Calendar day of the observation
    pub date: NaiveDate,
    /// What happened that day
    pub status: LogStatus,
}

impl GoalLog {
    pub fn new(goal_id: GoalId, date: NaiveDate, status: LogStatus) -> Self {
        Self { goal_id, date, status }
    }
}

/// Lookup of every log by date, then by goal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogsIndex {
    days: BTreeMap<NaiveDate, HashMap<GoalId, LogStatus>>,
}

impl LogsIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from a log set; a later duplicate overrides an earlier one
    pub fn from_logs(logs: &[GoalLog]) -> Self {
        let mut index = Self::new();
        for log in logs {
            index.set(&log.goal_id, log.date, Some(log.status));
        }
        index
    }

    /// Status of a goal on a day, None when unmarked
    pub fn status(&self, goal_id: &GoalId, date: NaiveDate) -> Option<LogStatus> {
        self.days.get(&date).and_then(|day| day.get(goal_id)).copied()
    }

    /// Whether a goal is `done` on a day
    pub fn is_done(&self, goal_id: &GoalId, date: NaiveDate) -> bool {
        self.status(goal_id, date) == Some(LogStatus::Done)
    }

    /// Set or clear a status, returning the previous one
    pub fn set(
        &mut self,
        goal_id: &GoalId,
        date: NaiveDate,
        status: Option<LogStatus>,
    ) -> Option<LogStatus> {
        match status {
            Some(status) => self
                .days
                .entry(date)
                .or_default()
                .insert(goal_id.clone(), status),
            None => {
                let day = self.days.get_mut(&date)?;
                let previous = day.remove(goal_id);
                if day.is_empty() {
                    self.days.remove(&date);
                }
                previous
            }
        }
    }

    /// All statuses recorded on a day
    pub fn day(&self, date: NaiveDate) -> Option<&HashMap<GoalId, LogStatus>> {
        self.days.get(&date)
    }

    /// Days that carry at least one log, ascending
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Every `(date, goal, status)` triple in ascending date order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &GoalId, LogStatus)> + '_ {
        self.days
            .iter()
            .flat_map(|(date, day)| day.iter().map(move |(goal_id, status)| (*date, goal_id, *status)))
    }

    /// Earliest day with a log
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    /// Latest day with a log
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    /// Total number of stored logs
    pub fn len(&self) -> usize {
        self.days.values().map(|day| day.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of logs recorded for one goal
    pub fn count_for_goal(&self, goal_id: &GoalId) -> usize {
        self.days.values().filter(|day| day.contains_key(goal_id)).count()
    }

    /// Flatten back into a log list (date ascending)
    pub fn to_logs(&self) -> Vec<GoalLog> {
        self.iter()
            .map(|(date, goal_id, status)| GoalLog::new(goal_id.clone(), date, status))
            .collect()
    }
}

/// Next state of the toggle cycle: unmarked -> done -> missed -> unmarked
pub fn next_status(current: Option<LogStatus>) -> Option<LogStatus> {
    match current {
        None => Some(LogStatus::Done),
        Some(LogStatus::Done) => Some(LogStatus::Missed),
        Some(LogStatus::Missed) => None,
    }
}

/// One step of the toggle cycle for a `(goal, date)` pair
///
/// Planned against the current index, applied to the in-memory overlay before
/// the store write, and undone if the write fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleCommand {
    pub goal_id: GoalId,
    pub date: NaiveDate,
    pub previous: Option<LogStatus>,
    pub next: Option<LogStatus>,
}

impl ToggleCommand {
    /// Compute the next state for `goal` on `date`
    ///
    /// Fails when the date lies outside the goal's validity window; no log
    /// may ever be written for such a date.
    pub fn plan(index: &LogsIndex, goal: &Goal, date: NaiveDate) -> Result<Self, DomainError> {
        goal.ensure_active_on(date)?;
        let previous = index.status(&goal.id, date);
        Ok(Self {
            goal_id: goal.id.clone(),
            date,
            previous,
            next: next_status(previous),
        })
    }

    /// Apply the new state to an index
    pub fn apply(&self, index: &mut LogsIndex) {
        index.set(&self.goal_id, self.date, self.next);
    }

    /// Restore the state the index had before `apply`
    pub fn undo(&self, index: &mut LogsIndex) {
        index.set(&self.goal_id, self.date, self.previous);
    }
}
