/// Tools for changing existing goals and settings
///
/// This module implements the goal_delete and monthly_target_set MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use tracing::info;
use crate::analytics::clamp_monthly_target;
use crate::domain::GoalId;
use crate::storage::GoalStore;
use crate::tools::{parse_goal_id, ToolError};

/// Parameters for deleting a goal
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteGoalParams {
    /// ID of the goal to delete
    pub goal_id: String,
}

/// What happened to the goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The goal had no history and is gone
    Deleted,
    /// The goal keeps its history but accrues no new days
    Archived { end_date: NaiveDate },
}

/// Response from deleting a goal
#[derive(Debug, Serialize)]
pub struct DeleteGoalResponse {
    pub goal_id: GoalId,
    pub outcome: DeleteOutcome,
    pub message: String,
}

/// Delete a goal, or archive it when it already has logs
///
/// A goal without any log is removed outright. Otherwise its `end_date` is
/// set to the day before `today` (never before `start_date`) so its history
/// stays in the statistics.
pub fn delete_goal<S: GoalStore>(
    storage: &S,
    params: DeleteGoalParams,
    today: NaiveDate,
) -> Result<DeleteGoalResponse, ToolError> {
    let goal_id = parse_goal_id(&params.goal_id)?;
    let mut goal = storage.get_goal(&goal_id)?;

    if storage.count_logs_for_goal(&goal_id)? == 0 {
        storage.delete_goal(&goal_id)?;
        info!("Deleted goal '{}' ({})", goal.title, goal.id);
        return Ok(DeleteGoalResponse {
            message: format!("🗑️ Deleted goal '{}'", goal.title),
            goal_id,
            outcome: DeleteOutcome::Deleted,
        });
    }

    let end_date = goal.archive(today);
    storage.archive_goal(&goal_id, end_date)?;
    info!("Archived goal '{}' ({}) with end date {}", goal.title, goal.id, end_date);

    Ok(DeleteGoalResponse {
        message: format!(
            "📦 Archived goal '{}': its history is kept, tracking ended on {}",
            goal.title, end_date
        ),
        goal_id,
        outcome: DeleteOutcome::Archived { end_date },
    })
}

/// Parameters for setting the monthly target
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetMonthlyTargetParams {
    /// Done days to aim for each month (1-31)
    pub target: u32,
}

/// Response from setting the monthly target
#[derive(Debug, Serialize)]
pub struct SetMonthlyTargetResponse {
    pub monthly_target: u32,
    pub message: String,
}

/// Persist a new monthly target, clamped into 1-31
pub fn set_monthly_target<S: GoalStore>(
    storage: &S,
    params: SetMonthlyTargetParams,
) -> Result<SetMonthlyTargetResponse, ToolError> {
    let target = clamp_monthly_target(params.target);
    storage.set_monthly_target(target)?;
    info!("Monthly target set to {}", target);

    Ok(SetMonthlyTargetResponse {
        monthly_target: target,
        message: format!("🎯 Monthly target set to {} days", target),
    })
}
