/// Critical-day analysis
///
/// For each goal, finds the weekday on which it is most often skipped over
/// the last 90 days.

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDate};
use crate::analytics::weekday::{tally_weekdays, weakest_weekday, NOT_AVAILABLE};
use crate::domain::{weekday_name, Goal, GoalId, GoalStats, LogsIndex};

/// Trailing window of the critical-day analysis, today included
pub const CRITICAL_WINDOW_DAYS: i64 = 90;

/// The weakest weekday of one goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalDay {
    pub goal_id: GoalId,
    pub title: String,
    /// Weekday name, or "N/A" when no weekday has enough observations
    pub day: String,
    /// Rate of that weekday, or the goal's completion rate for "N/A"
    pub rate: u32,
}

impl CriticalDay {
    pub fn is_available(&self) -> bool {
        self.day != NOT_AVAILABLE
    }
}

/// Find the critical day of a single goal
pub fn critical_day(
    goal: &Goal,
    stats: &GoalStats,
    index: &LogsIndex,
    as_of: NaiveDate,
) -> CriticalDay {
    let weakest = goal.elapsed_window(as_of).and_then(|(start, end)| {
        let window_start = start.max(as_of - Duration::days(CRITICAL_WINDOW_DAYS - 1));
        let tallies = tally_weekdays(std::iter::once(goal), index, window_start, end);
        weakest_weekday(&tallies)
    });

    let (day, rate) = match weakest {
        Some((weekday, rate)) => (weekday_name(weekday).to_string(), rate),
        None => (NOT_AVAILABLE.to_string(), stats.completion_rate),
    };

    CriticalDay {
        goal_id: goal.id.clone(),
        title: goal.title.clone(),
        day,
        rate,
    }
}

/// Critical days of every goal, weakest first
///
/// `stats` must hold the streak record of each goal; goals without one are
/// skipped. The sort is stable, so equal rates keep goal order.
pub fn critical_days(
    goals: &[Goal],
    stats: &[GoalStats],
    index: &LogsIndex,
    as_of: NaiveDate,
) -> Vec<CriticalDay> {
    let mut days: Vec<CriticalDay> = goals
        .iter()
        .filter_map(|goal| {
            stats
                .iter()
                .find(|s| s.goal_id == goal.id)
                .map(|s| critical_day(goal, s, index, as_of))
        })
        .collect();

    days.sort_by_key(|day| day.rate);
    days
}
