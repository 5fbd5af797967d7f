/// Period-over-period comparison
///
/// Compares each goal's completion rate in the current week, month and year
/// against the full previous week, month and year.

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDate};
use crate::domain::{
    days_inclusive, month_start, rounded_percentage, week_start, year_start, Goal, GoalId,
    LogsIndex,
};

/// Comparison horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    Year,
}

impl Period {
    /// First day of the period containing `date` (weeks start on Monday)
    pub fn start_of(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Week => week_start(date),
            Period::Month => month_start(date),
            Period::Year => year_start(date),
        }
    }

    /// Current window `[period start, as_of]` and the full previous period
    pub fn windows(&self, as_of: NaiveDate) -> (PeriodWindow, PeriodWindow) {
        let current_start = self.start_of(as_of);
        let previous_end = current_start - Duration::days(1);
        let previous = PeriodWindow {
            start: self.start_of(previous_end),
            end: previous_end,
        };
        let current = PeriodWindow {
            start: current_start,
            end: as_of,
        };
        (previous, current)
    }
}

/// An inclusive range of days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Direction of a change between two periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    pub fn from_change(change: i32) -> Self {
        if change > 0 {
            Trend::Up
        } else if change < 0 {
            Trend::Down
        } else {
            Trend::Neutral
        }
    }
}

/// Rates of two consecutive periods and how they moved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDelta {
    pub previous: u32,
    pub current: u32,
    pub change: i32,
    pub trend: Trend,
}

impl PeriodDelta {
    pub fn new(previous: u32, current: u32) -> Self {
        let change = current as i32 - previous as i32;
        Self {
            previous,
            current,
            change,
            trend: Trend::from_change(change),
        }
    }
}

/// Week, month and year comparison of one goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalComparison {
    pub goal_id: GoalId,
    pub title: String,
    pub week: PeriodDelta,
    pub month: PeriodDelta,
    pub year: PeriodDelta,
}

impl GoalComparison {
    pub fn get(&self, period: Period) -> &PeriodDelta {
        match period {
            Period::Week => &self.week,
            Period::Month => &self.month,
            Period::Year => &self.year,
        }
    }
}

/// Completion rate of a goal inside a window
///
/// Only the days where the goal was valid count; a goal that was never
/// valid inside the window rates 0.
pub fn window_rate(goal: &Goal, index: &LogsIndex, window: PeriodWindow) -> u32 {
    let start = window.start.max(goal.start_date);
    let end = match goal.end_date {
        Some(end_date) => window.end.min(end_date),
        None => window.end,
    };

    let mut days = 0;
    let mut done = 0;
    for day in days_inclusive(start, end) {
        days += 1;
        if index.is_done(&goal.id, day) {
            done += 1;
        }
    }

    rounded_percentage(done, days)
}

/// Delta of one goal for one period
pub fn compare_period(goal: &Goal, index: &LogsIndex, period: Period, as_of: NaiveDate) -> PeriodDelta {
    let (previous, current) = period.windows(as_of);
    PeriodDelta::new(
        window_rate(goal, index, previous),
        window_rate(goal, index, current),
    )
}

/// Week, month and year comparison for every goal, in goal order
pub fn compare_periods(goals: &[Goal], index: &LogsIndex, as_of: NaiveDate) -> Vec<GoalComparison> {
    goals
        .iter()
        .map(|goal| GoalComparison {
            goal_id: goal.id.clone(),
            title: goal.title.clone(),
            week: compare_period(goal, index, Period::Week, as_of),
            month: compare_period(goal, index, Period::Month, as_of),
            year: compare_period(goal, index, Period::Year, as_of),
        })
        .collect()
}
