/// Long-term goals and category settings
///
/// Long-term goals are the annual, monthly and weekly objectives carried by
/// backups. Unlike daily goals they have no logs; a single `is_completed`
/// flag tracks them.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{DomainError, GoalType, LongTermGoalId};

/// An annual, monthly or weekly objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermGoal {
    pub id: LongTermGoalId,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub year: i32,
    /// Month of the objective (1-12), set for monthly and weekly goals
    #[serde(default)]
    pub month: Option<u32>,
    /// Week of the objective (1-53), set for weekly goals
    #[serde(default)]
    pub week_number: Option<u32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl LongTermGoal {
    /// Create a new long-term goal with validation
    pub fn new(
        title: String,
        goal_type: GoalType,
        year: i32,
        month: Option<u32>,
        week_number: Option<u32>,
        color: Option<String>,
    ) -> Result<Self, DomainError> {
        let goal = Self {
            id: LongTermGoalId::new(),
            title: title.trim().to_string(),
            is_completed: false,
            goal_type,
            year,
            month,
            week_number,
            color,
            created_at: Some(Utc::now()),
        };
        goal.validate()?;
        Ok(goal)
    }

    /// Check field ranges; also applied to records read from a backup
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::InvalidTitle(
                "Long-term goal title cannot be empty".to_string()
            ));
        }

        if self.title.chars().count() > 200 {
            return Err(DomainError::InvalidTitle(
                "Long-term goal title cannot be longer than 200 characters".to_string()
            ));
        }

        if !(1970..=9999).contains(&self.year) {
            return Err(DomainError::Validation {
                message: format!("Year {} is out of range", self.year),
            });
        }

        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(DomainError::Validation {
                    message: format!("Month must be between 1 and 12, got {}", month),
                });
            }
        }

        if let Some(week) = self.week_number {
            if !(1..=53).contains(&week) {
                return Err(DomainError::Validation {
                    message: format!("Week number must be between 1 and 53, got {}", week),
                });
            }
        }

        Ok(())
    }

    /// The natural key used when ids are lost between export and import
    pub fn natural_key(&self) -> (&str, GoalType, i32) {
        (self.title.as_str(), self.goal_type, self.year)
    }

    /// Whether every mutable field matches `other` (ids and timestamps ignored)
    pub fn same_content(&self, other: &LongTermGoal) -> bool {
        self.title == other.title
            && self.is_completed == other.is_completed
            && self.goal_type == other.goal_type
            && self.year == other.year
            && self.month == other.month
            && self.week_number == other.week_number
            && self.color == other.color
    }
}

/// User-defined labels for goal colors
///
/// The mapping itself is opaque to the core; it is only compared and restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySettings {
    #[serde(default)]
    pub mappings: serde_json::Value,
}

impl CategorySettings {
    pub fn new(mappings: serde_json::Value) -> Self {
        Self { mappings }
    }

    /// Whether two settings serialize to the same mapping
    pub fn same_mappings(&self, other: &CategorySettings) -> bool {
        self.mappings.to_string() == other.mappings.to_string()
    }
}
