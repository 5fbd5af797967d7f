/// Streak and completion calculation
///
/// This module defines `GoalStats`, the per-goal streak record, and the
/// engine that derives it from a `LogsIndex`. Streaks are gap tolerant:
/// an unmarked day neither extends nor breaks a run, only an explicit
/// `missed` does.

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDate};
use crate::domain::{days_inclusive, rounded_percentage, Goal, GoalId, LogStatus, LogsIndex};

/// Length of the rolling completion-rate window, today included
pub const COMPLETION_WINDOW_DAYS: i64 = 30;

/// Hard bound on the backward walk of the current streak
pub const MAX_STREAK_LOOKBACK_DAYS: i64 = 5 * 366;

/// Calculated streak information for a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalStats {
    /// Which goal this streak data is for
    pub goal_id: GoalId,
    pub title: String,
    pub color: Option<String>,
    /// Current run of done days ending today, bridging unmarked days
    pub current_streak: u32,
    /// Best run ever achieved inside the validity window
    pub longest_streak: u32,
    /// Number of done days inside the validity window
    pub total_completed: u32,
    /// Done days over the last 30 days of the window, as a rounded percentage
    pub completion_rate: u32,
    /// Most recent done day, if any
    pub last_completed: Option<NaiveDate>,
}

impl GoalStats {
    /// Create a streak record with zero values
    pub fn empty(goal: &Goal) -> Self {
        Self {
            goal_id: goal.id.clone(),
            title: goal.title.clone(),
            color: goal.color.clone(),
            current_streak: 0,
            longest_streak: 0,
            total_completed: 0,
            completion_rate: 0,
            last_completed: None,
        }
    }

    /// Calculate every statistic for `goal` as of `as_of`
    ///
    /// A goal starting after `as_of` has an empty window and yields zeros.
    pub fn calculate(goal: &Goal, index: &LogsIndex, as_of: NaiveDate) -> Self {
        let Some((start, end)) = goal.elapsed_window(as_of) else {
            return Self::empty(goal);
        };

        let (longest_streak, total_completed, last_completed) =
            Self::scan_window(&goal.id, index, start, end);

        Self {
            goal_id: goal.id.clone(),
            title: goal.title.clone(),
            color: goal.color.clone(),
            current_streak: Self::current_streak(&goal.id, index, start, end),
            longest_streak,
            total_completed,
            completion_rate: Self::completion_rate(&goal.id, index, start, end, as_of),
            last_completed,
        }
    }

    /// Get a motivational message based on current streak status
    pub fn motivational_message(&self) -> String {
        match self.current_streak {
            0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
            1 => "Great start! One day down, keep the momentum going.".to_string(),
            2..=6 => format!("Nice work! {} days in a row. You're building a strong habit.", self.current_streak),
            7..=13 => format!("Excellent! {} days strong. You're in the groove now!", self.current_streak),
            14..=29 => format!("Amazing! {} days straight. This is becoming second nature.", self.current_streak),
            30..=99 => format!("Incredible! {} days of consistency. You're a habit master!", self.current_streak),
            _ => format!("Legendary! {} days of unwavering commitment. You're an inspiration!", self.current_streak),
        }
    }

    // Private helpers, all operating on the window [start, end]

    /// Walk backwards from `end`
    ///
    /// `done` extends the run, `missed` ends the walk, unmarked days are
    /// bridged. The walk stops at `start` or after the lookback bound.
    fn current_streak(goal_id: &GoalId, index: &LogsIndex, start: NaiveDate, end: NaiveDate) -> u32 {
        let floor = start.max(end - Duration::days(MAX_STREAK_LOOKBACK_DAYS));
        let mut streak = 0;
        let mut day = end;

        loop {
            match index.status(goal_id, day) {
                Some(LogStatus::Done) => streak += 1,
                Some(LogStatus::Missed) => break,
                None => {}
            }
            if day <= floor {
                break;
            }
            day = day - Duration::days(1);
        }

        streak
    }

    /// Single forward pass: longest run, total done, last done day
    fn scan_window(
        goal_id: &GoalId,
        index: &LogsIndex,
        start: NaiveDate,
        end: NaiveDate,
    ) -> (u32, u32, Option<NaiveDate>) {
        let mut longest = 0;
        let mut running = 0;
        let mut total = 0;
        let mut last_done = None;

        for day in days_inclusive(start, end) {
            match index.status(goal_id, day) {
                Some(LogStatus::Done) => {
                    running += 1;
                    total += 1;
                    longest = longest.max(running);
                    last_done = Some(day);
                }
                Some(LogStatus::Missed) => running = 0,
                None => {}
            }
        }

        (longest, total, last_done)
    }

    /// Done share of the last 30 days intersected with the window
    fn completion_rate(
        goal_id: &GoalId,
        index: &LogsIndex,
        start: NaiveDate,
        end: NaiveDate,
        as_of: NaiveDate,
    ) -> u32 {
        let rate_start = start.max(as_of - Duration::days(COMPLETION_WINDOW_DAYS - 1));
        let mut days = 0;
        let mut done = 0;

        for day in days_inclusive(rate_start, end) {
            days += 1;
            if index.is_done(goal_id, day) {
                done += 1;
            }
        }

        rounded_percentage(done, days)
    }
}
