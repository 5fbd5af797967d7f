/// Activity heatmap and short-term trend

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDate};
use crate::domain::{days_inclusive, rounded_percentage, Goal, GoalId, LogsIndex};

/// Days covered by the heatmap, today included
pub const HEATMAP_DAYS: i64 = 366;

/// Days covered by the trend, today included
pub const TREND_DAYS: i64 = 7;

/// One heatmap cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub date: NaiveDate,
    /// Goals done that day
    pub count: u32,
    /// 0 for nothing done, then 1-4 by quartile of active goals done
    pub intensity: u8,
}

/// Map the done share of active goals onto the 0-4 scale
pub fn intensity(done: u32, active: u32) -> u8 {
    if active == 0 || done == 0 {
        return 0;
    }
    let share = done as f64 / active as f64;
    if share <= 0.25 {
        1
    } else if share <= 0.5 {
        2
    } else if share <= 0.75 {
        3
    } else {
        4
    }
}

/// Heatmap of the last 366 days, oldest first
pub fn heatmap(goals: &[Goal], index: &LogsIndex, as_of: NaiveDate) -> Vec<DayActivity> {
    let start = as_of - Duration::days(HEATMAP_DAYS - 1);
    days_inclusive(start, as_of)
        .map(|day| {
            let mut active = 0;
            let mut done = 0;
            for goal in goals.iter().filter(|goal| goal.is_active_on(day)) {
                active += 1;
                if index.is_done(&goal.id, day) {
                    done += 1;
                }
            }
            DayActivity {
                date: day,
                count: done,
                intensity: intensity(done, active),
            }
        })
        .collect()
}

/// One day of the trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendDay {
    pub date: NaiveDate,
    /// Short weekday name ("Mon")
    pub day_name: String,
    /// 100 when a goal is done that day, 0 otherwise (including inactive goals)
    pub goals: BTreeMap<GoalId, u32>,
    /// Done share of the goals active that day
    pub overall: u32,
}

/// Per-goal trend over the last seven days, oldest first
pub fn trend(goals: &[Goal], index: &LogsIndex, as_of: NaiveDate) -> Vec<TrendDay> {
    let start = as_of - Duration::days(TREND_DAYS - 1);
    days_inclusive(start, as_of)
        .map(|day| {
            let mut active = 0;
            let mut done = 0;
            let mut values = BTreeMap::new();
            for goal in goals {
                let is_done = goal.is_active_on(day) && index.is_done(&goal.id, day);
                if goal.is_active_on(day) {
                    active += 1;
                    if is_done {
                        done += 1;
                    }
                }
                values.insert(goal.id.clone(), if is_done { 100 } else { 0 });
            }
            TrendDay {
                date: day,
                day_name: day.format("%a").to_string(),
                goals: values,
                overall: rounded_percentage(done, active),
            }
        })
        .collect()
}
