/// Tool for goal statistics
///
/// This module implements the goal_stats MCP tool: one full analytics pass
/// over a consistent snapshot of the store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::analytics::{AnalyticsEngine, AnalyticsReport};
use crate::domain::GoalStats;
use crate::storage::{GoalStore, StorageError};
use crate::tools::{date_or_today, parse_goal_id, ToolError};

/// Parameters for the statistics tool
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GoalStatsParams {
    /// ID of a specific goal (optional - reports on every goal if omitted)
    pub goal_id: Option<String>,
    /// Evaluate as of this day (YYYY-MM-DD, defaults to today)
    pub as_of: Option<String>,
}

/// Response from the statistics tool
#[derive(Debug, Serialize)]
pub struct GoalStatsResponse {
    /// Streak record of the requested goal, when one was named
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalStats>,
    pub report: AnalyticsReport,
    pub message: String,
}

/// Run the analytics pass and summarize it
pub fn goal_stats<S: GoalStore>(
    storage: &S,
    engine: &AnalyticsEngine,
    params: GoalStatsParams,
    today: NaiveDate,
) -> Result<GoalStatsResponse, ToolError> {
    let as_of = date_or_today(params.as_of.as_deref(), today)?;
    let goal_id = params.goal_id.as_deref().map(parse_goal_id).transpose()?;

    let snapshot = storage.snapshot()?;
    let index = snapshot.index();
    let report = engine.analyze(&snapshot.goals, &index, as_of);

    let goal = match &goal_id {
        Some(id) => Some(
            report
                .goal_stats
                .iter()
                .find(|stats| &stats.goal_id == id)
                .cloned()
                .ok_or_else(|| StorageError::GoalNotFound { goal_id: id.to_string() })?,
        ),
        None => None,
    };

    let message = match &goal {
        Some(stats) => single_goal_message(stats),
        None => summary_message(&report),
    };

    Ok(GoalStatsResponse {
        goal,
        report,
        message,
    })
}

fn single_goal_message(stats: &GoalStats) -> String {
    let last = stats
        .last_completed
        .map_or_else(|| "never".to_string(), |day| day.to_string());
    format!(
        "📊 {}\n🔥 Current streak: {} days\n🏆 Longest streak: {} days\n✅ Total completed: {}\n📈 Last 30 days: {}%\n📅 Last completed: {}\n{}",
        stats.title,
        stats.current_streak,
        stats.longest_streak,
        stats.total_completed,
        stats.completion_rate,
        last,
        stats.motivational_message()
    )
}

fn summary_message(report: &AnalyticsReport) -> String {
    if report.goal_stats.is_empty() {
        return "No goals yet. Create one with goal_create to start tracking.".to_string();
    }

    let mut lines = vec![format!("📊 Goal report as of {}", report.as_of)];
    for stats in &report.goal_stats {
        lines.push(format!(
            "• {} - 🔥 {} (best {}) | 📈 {}%",
            stats.title, stats.current_streak, stats.longest_streak, stats.completion_rate
        ));
    }

    let overall = &report.overall;
    lines.push(String::new());
    lines.push(format!(
        "📅 {} days done, {} missed ({}%), consistency {}%",
        overall.total_days_done, overall.total_days_missed, overall.percentage, overall.consistency_score
    ));
    lines.push(format!(
        "🗓️ This month: {}/{} days done (target {})",
        report.current_month.days_done, report.current_month.days_total, report.monthly_target
    ));
    lines.push(format!(
        "📆 Best weekday: {} | Weakest weekday: {}",
        report.weekdays.best_day_name(),
        report.weekdays.worst_day_name()
    ));
    if let Some(critical) = report.critical_days.first() {
        lines.push(format!(
            "⚠️ Needs attention: {} on {} ({}%)",
            critical.title, critical.day, critical.rate
        ));
    }
    lines.push(format!(
        "🏅 Badges: {}/{} unlocked | Global success rate: {}%",
        report.global.badges_unlocked, report.global.badges_total, report.global.global_success_rate
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{days_inclusive, Goal, GoalLog, LogStatus};
    use crate::storage::SqliteStorage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stats_for_single_goal() {
        let storage = SqliteStorage::in_memory().unwrap();
        let goal = Goal::new("Read".to_string(), None, date(2024, 1, 1)).unwrap();
        storage.create_goal(&goal).unwrap();
        for day in days_inclusive(date(2024, 1, 1), date(2024, 1, 4)) {
            storage.upsert_log(&GoalLog::new(goal.id.clone(), day, LogStatus::Done)).unwrap();
        }

        let params = GoalStatsParams {
            goal_id: Some(goal.id.to_string()),
            as_of: Some("2024-01-04".to_string()),
        };
        let response = goal_stats(&storage, &AnalyticsEngine::default(), params, date(2024, 6, 1)).unwrap();

        let stats = response.goal.unwrap();
        assert_eq!(stats.current_streak, 4);
        assert_eq!(response.report.as_of, date(2024, 1, 4));
        assert!(response.message.contains("Current streak: 4 days"));
    }

    #[test]
    fn test_unknown_goal() {
        let storage = SqliteStorage::in_memory().unwrap();
        let params = GoalStatsParams {
            goal_id: Some(crate::domain::GoalId::new().to_string()),
            as_of: None,
        };

        assert!(matches!(
            goal_stats(&storage, &AnalyticsEngine::default(), params, date(2024, 1, 1)),
            Err(ToolError::Storage(StorageError::GoalNotFound { .. }))
        ));
    }

    #[test]
    fn test_empty_store_summary() {
        let storage = SqliteStorage::in_memory().unwrap();
        let response = goal_stats(
            &storage,
            &AnalyticsEngine::default(),
            GoalStatsParams::default(),
            date(2024, 1, 1),
        )
        .unwrap();

        assert!(response.goal.is_none());
        assert!(response.message.starts_with("No goals yet"));
    }
}
