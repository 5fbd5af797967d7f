/// Analytics engine for goal statistics and achievements
///
/// This module ties the individual aggregators together. One pass takes a
/// consistent set of goals and logs plus an explicit `as_of` date and
/// recomputes everything from scratch; no state survives between passes.

pub mod activity;
pub mod badges;
pub mod critical;
pub mod overview;
pub mod period;
pub mod weekday;

pub use activity::{DayActivity, TrendDay};
pub use badges::{Badge, BadgeContext, BadgeDefinition, BadgeProgress, BadgeRule, BadgeTier, BADGE_DEFINITIONS};
pub use critical::CriticalDay;
pub use overview::{DayOutcome, MonthStats, OverallStats, WeekStats, YearStats};
pub use period::{GoalComparison, Period, PeriodDelta, Trend};
pub use weekday::{WeekdayHighlight, WeekdayReport, WeekdayStat};

use serde::Serialize;
use chrono::{Datelike, NaiveDate};
use crate::domain::{Goal, GoalStats, LogsIndex};

/// Monthly target used until the user sets one
pub const DEFAULT_MONTHLY_TARGET: u32 = 20;

/// Clamp a monthly target into the days a month can have
pub fn clamp_monthly_target(target: u32) -> u32 {
    target.clamp(1, 31)
}

/// Cross-goal summary numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalStats {
    /// Longest streak of any goal
    pub best_streak: u32,
    /// Mean of the per-goal completion rates, rounded
    pub global_success_rate: u32,
    /// Days with at least one mark
    pub total_active_days: u32,
    pub badges_unlocked: u32,
    pub badges_total: u32,
}

/// Full output of one analytics pass
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub as_of: NaiveDate,
    pub monthly_target: u32,
    pub goal_stats: Vec<GoalStats>,
    /// Monday first
    pub weekdays: WeekdayReport,
    pub comparisons: Vec<GoalComparison>,
    /// Weakest first
    pub critical_days: Vec<CriticalDay>,
    pub overall: OverallStats,
    pub current_month: MonthStats,
    pub current_year: Option<YearStats>,
    /// Table order, each flagged with `unlocked`
    pub badges: Vec<Badge>,
    pub heatmap: Vec<DayActivity>,
    pub trend: Vec<TrendDay>,
    pub global: GlobalStats,
}

impl AnalyticsReport {
    /// Badges with the unlocked ones first, table order kept inside each group
    pub fn badges_unlocked_first(&self) -> Vec<&Badge> {
        let mut badges: Vec<&Badge> = self.badges.iter().collect();
        badges.sort_by_key(|badge| !badge.unlocked);
        badges
    }
}

/// Analytics engine for processing goal data
///
/// Holds the only knob the aggregators need; everything else comes in
/// through `analyze`.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    monthly_target: u32,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MONTHLY_TARGET)
    }
}

impl AnalyticsEngine {
    /// Create a new analytics engine
    pub fn new(monthly_target: u32) -> Self {
        Self {
            monthly_target: clamp_monthly_target(monthly_target),
        }
    }

    pub fn monthly_target(&self) -> u32 {
        self.monthly_target
    }

    pub fn set_monthly_target(&mut self, target: u32) {
        self.monthly_target = clamp_monthly_target(target);
    }

    /// Streak record of a single goal
    pub fn goal_stats(&self, goal: &Goal, index: &LogsIndex, as_of: NaiveDate) -> GoalStats {
        GoalStats::calculate(goal, index, as_of)
    }

    /// Run every aggregator over one snapshot
    pub fn analyze(&self, goals: &[Goal], index: &LogsIndex, as_of: NaiveDate) -> AnalyticsReport {
        let goal_stats: Vec<GoalStats> = goals
            .iter()
            .map(|goal| GoalStats::calculate(goal, index, as_of))
            .collect();

        let outcomes = overview::day_outcomes(index, as_of);
        let overall = overview::overall_stats(&outcomes, &goal_stats, as_of);
        let current_month = overview::month_stats(&outcomes, as_of.year(), as_of.month());
        let current_year = if outcomes.keys().any(|day| day.year() == as_of.year()) {
            Some(overview::year_stats(&outcomes, as_of.year()))
        } else {
            None
        };

        let badges = badges::evaluate_badges(&BadgeContext {
            goals,
            overall: &overall,
            index,
            current_month: Some(&current_month),
            current_year: current_year.as_ref(),
            monthly_target: self.monthly_target,
            as_of,
        });

        let global_success_rate = if goal_stats.is_empty() {
            0
        } else {
            let sum: u32 = goal_stats.iter().map(|s| s.completion_rate).sum();
            (sum as f64 / goal_stats.len() as f64).round() as u32
        };
        let global = GlobalStats {
            best_streak: goal_stats.iter().map(|s| s.longest_streak).max().unwrap_or(0),
            global_success_rate,
            total_active_days: overall.total_days_marked,
            badges_unlocked: badges.iter().filter(|b| b.unlocked).count() as u32,
            badges_total: badges.len() as u32,
        };

        AnalyticsReport {
            as_of,
            monthly_target: self.monthly_target,
            weekdays: weekday::weekday_stats(goals, index, as_of),
            comparisons: period::compare_periods(goals, index, as_of),
            critical_days: critical::critical_days(goals, &goal_stats, index, as_of),
            heatmap: activity::heatmap(goals, index, as_of),
            trend: activity::trend(goals, index, as_of),
            goal_stats,
            overall,
            current_month,
            current_year,
            badges,
            global,
        }
    }
}
