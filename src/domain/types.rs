/// Core types and enums used throughout the domain layer
///
/// This module defines the identifier wrappers, the log status, the
/// long-term goal type and a couple of small numeric helpers shared by
/// the streak engine and the analytics layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Unique identifier for a daily goal
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass a goal ID where a long-term goal ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(pub Uuid);

impl GoalId {
    /// Generate a new random goal ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a goal ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for GoalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a long-term (annual/monthly/weekly) goal
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LongTermGoalId(pub Uuid);

impl LongTermGoalId {
    /// Generate a new random long-term goal ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a long-term goal ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for LongTermGoalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LongTermGoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Observation recorded for a goal on a given day
///
/// The absence of a log is the third state ("unmarked") and is modelled as
/// `Option<LogStatus>::None` rather than a variant here, so a stored log can
/// never be "unmarked".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    /// The goal was carried out that day
    Done,
    /// The goal was explicitly skipped that day
    Missed,
}

impl LogStatus {
    /// Database and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Done => "done",
            LogStatus::Missed => "missed",
        }
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "done" => Ok(LogStatus::Done),
            "missed" => Ok(LogStatus::Missed),
            other => Err(DomainError::InvalidStatus(format!(
                "'{}' is not a log status (expected 'done' or 'missed')",
                other
            ))),
        }
    }
}

/// Horizon of a long-term goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Annual,
    Monthly,
    Weekly,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Annual => "annual",
            GoalType::Monthly => "monthly",
            GoalType::Weekly => "weekly",
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "annual" => Ok(GoalType::Annual),
            "monthly" => Ok(GoalType::Monthly),
            "weekly" => Ok(GoalType::Weekly),
            other => Err(DomainError::Validation {
                message: format!(
                    "Invalid goal type '{}'. Valid options: annual, monthly, weekly",
                    other
                ),
            }),
        }
    }
}

/// Integer percentage of `part` over `whole`, rounded half up
///
/// Returns 0 for an empty denominator so callers never divide by zero.
pub fn rounded_percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}
