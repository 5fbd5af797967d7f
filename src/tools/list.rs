/// Tool for listing goals
///
/// This module implements the goal_list MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::{Goal, GoalId, GoalStats, LongTermGoal};
use crate::storage::GoalStore;
use crate::tools::ToolError;

/// Parameters for listing goals
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListGoalsParams {
    /// Include archived goals (default: false)
    pub include_archived: Option<bool>,
    /// Sort by: "title", "streak", "completion_rate", "start_date" (default)
    pub sort_by: Option<String>,
}

/// One goal in the list
#[derive(Debug, Serialize)]
pub struct GoalSummary {
    pub goal_id: GoalId,
    pub title: String,
    pub color: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub archived: bool,
    pub current_streak: u32,
    pub completion_rate: u32,
    pub total_completed: u32,
}

impl GoalSummary {
    fn new(goal: &Goal, stats: GoalStats, as_of: NaiveDate) -> Self {
        Self {
            goal_id: goal.id.clone(),
            title: goal.title.clone(),
            color: goal.color.clone(),
            start_date: goal.start_date,
            end_date: goal.end_date,
            archived: goal.is_archived(as_of),
            current_streak: stats.current_streak,
            completion_rate: stats.completion_rate,
            total_completed: stats.total_completed,
        }
    }
}

/// Response from listing goals
#[derive(Debug, Serialize)]
pub struct ListGoalsResponse {
    pub goals: Vec<GoalSummary>,
    pub long_term_goals: Vec<LongTermGoal>,
    pub message: String,
}

/// List goals with their streak summary, plus every long-term goal
pub fn list_goals<S: GoalStore>(
    storage: &S,
    params: ListGoalsParams,
    today: NaiveDate,
) -> Result<ListGoalsResponse, ToolError> {
    let include_archived = params.include_archived.unwrap_or(false);
    let snapshot = storage.snapshot()?;
    let index = snapshot.index();

    let mut goals: Vec<GoalSummary> = snapshot
        .goals
        .iter()
        .filter(|goal| include_archived || !goal.is_archived(today))
        .map(|goal| GoalSummary::new(goal, GoalStats::calculate(goal, &index, today), today))
        .collect();

    match params.sort_by.as_deref().map(str::trim) {
        None | Some("") | Some("start_date") => {}
        Some("title") => goals.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase())),
        Some("streak") => goals.sort_by(|a, b| b.current_streak.cmp(&a.current_streak)),
        Some("completion_rate") => goals.sort_by(|a, b| b.completion_rate.cmp(&a.completion_rate)),
        Some(other) => {
            return Err(ToolError::InvalidParams(format!(
                "Invalid sort_by '{}'. Valid options: title, streak, completion_rate, start_date",
                other
            )));
        }
    }

    let long_term_goals = storage.list_long_term_goals()?;

    let message = if goals.is_empty() && long_term_goals.is_empty() {
        "No goals found. Create your first goal to get started!".to_string()
    } else {
        let mut lines = vec![format!("📋 {} goal(s)", goals.len())];
        for goal in &goals {
            lines.push(format!(
                "• {} - 🔥 {} day streak | 📊 {}% (30 days) | ✅ {} total{}",
                goal.title,
                goal.current_streak,
                goal.completion_rate,
                goal.total_completed,
                if goal.archived { " (archived)" } else { "" }
            ));
        }
        if !long_term_goals.is_empty() {
            lines.push(format!("🎯 {} long-term goal(s)", long_term_goals.len()));
            for goal in &long_term_goals {
                lines.push(format!(
                    "• [{}] {} {} {}",
                    if goal.is_completed { "x" } else { " " },
                    goal.title,
                    goal.goal_type,
                    goal.year
                ));
            }
        }
        lines.join("\n")
    };

    Ok(ListGoalsResponse {
        goals,
        long_term_goals,
        message,
    })
}
