/// Badge (achievement) rule engine
///
/// Badges are a fixed table of definitions, each carrying a tagged rule.
/// Every analytics pass re-evaluates the whole table against the current
/// aggregates; nothing about a badge is ever stored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDate};
use crate::analytics::overview::{MonthStats, OverallStats, YearStats};
use crate::domain::{Goal, GoalId, LogStatus, LogsIndex};

/// Days in a perfect week
pub const PERFECT_WEEK_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// What a badge checks, with its threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadgeRule {
    /// Longest streak of at least `days`
    StreakThreshold { days: u32 },
    /// At least `days` distinct done days
    CumulativeThreshold { days: u32 },
    /// Consistency score of at least `percent`
    ConsistencyThreshold { percent: u32 },
    /// Done days this month reach the monthly target
    GoalAttainment,
    /// Some goal done on seven consecutive days
    PerfectWeek,
    /// At least one done day ever
    FirstRecord,
}

/// Static part of a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub tier: BadgeTier,
    pub rule: BadgeRule,
}

/// Every badge, in presentation order
pub const BADGE_DEFINITIONS: [BadgeDefinition; 15] = [
    // Streak badges
    BadgeDefinition {
        id: "streak_3",
        name: "Promising Start",
        description: "Keep a goal going for 3 days in a row",
        icon: "🔥",
        tier: BadgeTier::Bronze,
        rule: BadgeRule::StreakThreshold { days: 3 },
    },
    BadgeDefinition {
        id: "streak_7",
        name: "One Week",
        description: "Keep a goal going for 7 days in a row",
        icon: "📅",
        tier: BadgeTier::Bronze,
        rule: BadgeRule::StreakThreshold { days: 7 },
    },
    BadgeDefinition {
        id: "streak_14",
        name: "Two Weeks",
        description: "Keep a goal going for 14 days in a row",
        icon: "⚡",
        tier: BadgeTier::Silver,
        rule: BadgeRule::StreakThreshold { days: 14 },
    },
    BadgeDefinition {
        id: "streak_30",
        name: "Month on Fire",
        description: "Keep a goal going for 30 days in a row",
        icon: "🏆",
        tier: BadgeTier::Gold,
        rule: BadgeRule::StreakThreshold { days: 30 },
    },
    BadgeDefinition {
        id: "streak_100",
        name: "Legend",
        description: "Keep a goal going for 100 days in a row",
        icon: "👑",
        tier: BadgeTier::Platinum,
        rule: BadgeRule::StreakThreshold { days: 100 },
    },
    // Total days badges
    BadgeDefinition {
        id: "total_10",
        name: "First Milestone",
        description: "Complete goals on 10 days in total",
        icon: "📖",
        tier: BadgeTier::Bronze,
        rule: BadgeRule::CumulativeThreshold { days: 10 },
    },
    BadgeDefinition {
        id: "total_50",
        name: "Regular",
        description: "Complete goals on 50 days in total",
        icon: "📚",
        tier: BadgeTier::Silver,
        rule: BadgeRule::CumulativeThreshold { days: 50 },
    },
    BadgeDefinition {
        id: "total_100",
        name: "Centurion",
        description: "Complete goals on 100 days in total",
        icon: "🎖️",
        tier: BadgeTier::Gold,
        rule: BadgeRule::CumulativeThreshold { days: 100 },
    },
    BadgeDefinition {
        id: "total_365",
        name: "A Full Year",
        description: "Complete goals on 365 days in total",
        icon: "🌟",
        tier: BadgeTier::Platinum,
        rule: BadgeRule::CumulativeThreshold { days: 365 },
    },
    // Consistency badges
    BadgeDefinition {
        id: "consistency_50",
        name: "Steady",
        description: "Reach 50% consistency",
        icon: "🎯",
        tier: BadgeTier::Bronze,
        rule: BadgeRule::ConsistencyThreshold { percent: 50 },
    },
    BadgeDefinition {
        id: "consistency_80",
        name: "Determined",
        description: "Reach 80% consistency",
        icon: "💪",
        tier: BadgeTier::Silver,
        rule: BadgeRule::ConsistencyThreshold { percent: 80 },
    },
    BadgeDefinition {
        id: "consistency_95",
        name: "Unstoppable",
        description: "Reach 95% consistency",
        icon: "🔱",
        tier: BadgeTier::Gold,
        rule: BadgeRule::ConsistencyThreshold { percent: 95 },
    },
    // Monthly goal badge
    BadgeDefinition {
        id: "monthly_goal",
        name: "Monthly Target",
        description: "Reach your monthly target",
        icon: "🏅",
        tier: BadgeTier::Silver,
        rule: BadgeRule::GoalAttainment,
    },
    // Perfect week badge
    BadgeDefinition {
        id: "perfect_week",
        name: "Perfect Week",
        description: "Complete a goal on all 7 days of a week",
        icon: "✨",
        tier: BadgeTier::Silver,
        rule: BadgeRule::PerfectWeek,
    },
    // First record badge
    BadgeDefinition {
        id: "first_step",
        name: "First Step",
        description: "Record your first completed day",
        icon: "🚀",
        tier: BadgeTier::Bronze,
        rule: BadgeRule::FirstRecord,
    },
];

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct BadgeContext<'a> {
    pub goals: &'a [Goal],
    pub overall: &'a OverallStats,
    pub index: &'a LogsIndex,
    pub current_month: Option<&'a MonthStats>,
    pub current_year: Option<&'a YearStats>,
    pub monthly_target: u32,
    pub as_of: NaiveDate,
}

/// Result of one rule evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeProgress {
    pub unlocked: bool,
    pub progress: Option<u32>,
    pub max_progress: Option<u32>,
}

impl BadgeProgress {
    fn threshold(value: u32, target: u32) -> Self {
        Self {
            unlocked: value >= target,
            progress: Some(value.min(target)),
            max_progress: Some(target),
        }
    }
}

/// A badge definition paired with its derived state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub tier: BadgeTier,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_progress: Option<u32>,
}

/// Evaluate a single rule
pub fn evaluate(rule: &BadgeRule, ctx: &BadgeContext<'_>) -> BadgeProgress {
    match rule {
        BadgeRule::StreakThreshold { days } => {
            BadgeProgress::threshold(ctx.overall.longest_streak, *days)
        }
        BadgeRule::CumulativeThreshold { days } => {
            BadgeProgress::threshold(ctx.overall.total_days_done, *days)
        }
        BadgeRule::ConsistencyThreshold { percent } => {
            BadgeProgress::threshold(ctx.overall.consistency_score, *percent)
        }
        BadgeRule::GoalAttainment => {
            let done = ctx.current_month.map_or(0, |month| month.days_done);
            BadgeProgress {
                unlocked: done >= ctx.monthly_target,
                progress: Some(done),
                max_progress: Some(ctx.monthly_target),
            }
        }
        BadgeRule::PerfectWeek => BadgeProgress {
            unlocked: has_perfect_week(ctx.goals, ctx.index, ctx.as_of),
            progress: None,
            max_progress: None,
        },
        BadgeRule::FirstRecord => BadgeProgress::threshold(ctx.overall.total_days_done, 1),
    }
}

/// Evaluate every badge, in table order
pub fn evaluate_badges(ctx: &BadgeContext<'_>) -> Vec<Badge> {
    BADGE_DEFINITIONS
        .iter()
        .map(|definition| {
            let result = evaluate(&definition.rule, ctx);
            Badge {
                id: definition.id,
                name: definition.name,
                description: definition.description,
                icon: definition.icon,
                tier: definition.tier,
                unlocked: result.unlocked,
                progress: result.progress,
                max_progress: result.max_progress,
            }
        })
        .collect()
}

/// Whether any goal was done on seven consecutive days up to `as_of`
///
/// Only logs of `goals` that fall inside that goal's validity window count.
pub fn has_perfect_week(goals: &[Goal], index: &LogsIndex, as_of: NaiveDate) -> bool {
    let known: HashMap<&GoalId, &Goal> = goals.iter().map(|goal| (&goal.id, goal)).collect();
    // goal -> (last done day, run length)
    let mut runs: HashMap<&GoalId, (NaiveDate, u32)> = HashMap::new();

    for (day, goal_id, status) in index.iter() {
        if day > as_of {
            break;
        }
        if !known.get(goal_id).map_or(false, |goal| goal.is_active_on(day)) {
            continue;
        }
        if status != LogStatus::Done {
            runs.remove(goal_id);
            continue;
        }
        let run = match runs.get(goal_id) {
            Some((last, length)) if day - *last == Duration::days(1) => length + 1,
            _ => 1,
        };
        if run >= PERFECT_WEEK_DAYS {
            return true;
        }
        runs.insert(goal_id, (day, run));
    }

    false
}
