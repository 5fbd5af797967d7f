/// Tools for creating goals
///
/// This module implements the goal_create and long_term_goal_add MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use tracing::info;
use crate::domain::{Goal, GoalType, LongTermGoal};
use crate::storage::GoalStore;
use crate::tools::{date_or_today, ToolError};

/// Parameters for creating a new daily goal
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateGoalParams {
    /// Title of the goal (1-100 characters)
    pub title: String,
    /// Optional color tag, e.g. "#ff8800" or "blue"
    pub color: Option<String>,
    /// First day the goal can be logged (YYYY-MM-DD, defaults to today)
    pub start_date: Option<String>,
}

/// Response from creating a goal
#[derive(Debug, Serialize)]
pub struct CreateGoalResponse {
    pub goal: Goal,
    pub message: String,
}

/// Create a new daily goal
pub fn create_goal<S: GoalStore>(
    storage: &S,
    params: CreateGoalParams,
    today: NaiveDate,
) -> Result<CreateGoalResponse, ToolError> {
    let start_date = date_or_today(params.start_date.as_deref(), today)?;
    let color = params.color.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
    let goal = Goal::new(params.title, color, start_date)?;

    storage.create_goal(&goal)?;
    info!("Created goal '{}' ({})", goal.title, goal.id);

    Ok(CreateGoalResponse {
        message: format!(
            "✅ Created goal '{}' starting {}. Goal ID: {}",
            goal.title, goal.start_date, goal.id
        ),
        goal,
    })
}

/// Parameters for adding a long-term goal
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddLongTermGoalParams {
    /// Title of the objective
    pub title: String,
    /// One of "annual", "monthly", "weekly"
    #[serde(rename = "type")]
    pub goal_type: String,
    /// Calendar year of the objective
    pub year: i32,
    /// Month (1-12) for monthly and weekly objectives
    pub month: Option<u32>,
    /// ISO week (1-53) for weekly objectives
    pub week_number: Option<u32>,
    pub color: Option<String>,
}

/// Response from adding a long-term goal
#[derive(Debug, Serialize)]
pub struct AddLongTermGoalResponse {
    pub goal: LongTermGoal,
    pub message: String,
}

/// Add an annual, monthly or weekly objective
pub fn add_long_term_goal<S: GoalStore>(
    storage: &S,
    params: AddLongTermGoalParams,
) -> Result<AddLongTermGoalResponse, ToolError> {
    let goal_type: GoalType = params.goal_type.parse()?;
    let goal = LongTermGoal::new(
        params.title,
        goal_type,
        params.year,
        params.month,
        params.week_number,
        params.color,
    )?;

    storage.upsert_long_term_goal(&goal)?;
    info!("Added {} goal '{}' for {}", goal.goal_type, goal.title, goal.year);

    Ok(AddLongTermGoalResponse {
        message: format!("🎯 Added {} goal '{}' for {}", goal.goal_type, goal.title, goal.year),
        goal,
    })
}
