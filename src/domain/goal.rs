/// Goal entity and related functionality
///
/// This module defines the Goal struct that represents a daily habit the user
/// wants to track, together with its validity window and lifecycle rules.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use crate::domain::{DomainError, GoalId};

/// A daily goal (habit) with a validity window
///
/// Logs may only be recorded for days inside `[start_date, end_date]`.
/// An open `end_date` means the goal is still running; archiving a goal sets
/// `end_date` so its history is kept but no new days accrue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier for this goal
    pub id: GoalId,
    /// Display title (e.g., "Reading", "Morning Run")
    pub title: String,
    /// Optional categorical color tag used by the presentation layer
    pub color: Option<String>,
    /// First day the goal can be logged (inclusive)
    pub start_date: NaiveDate,
    /// Last day the goal can be logged (inclusive), None while open-ended
    pub end_date: Option<NaiveDate>,
    /// When this goal was created, used as a tie-breaker for ordering
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Create a new goal with validation
    pub fn new(
        title: String,
        color: Option<String>,
        start_date: NaiveDate,
    ) -> Result<Self, DomainError> {
        let title = Self::validate_title(&title)?;
        Self::validate_color(&color)?;

        Ok(Self {
            id: GoalId::new(),
            title,
            color,
            start_date,
            end_date: None,
            created_at: Utc::now(),
        })
    }

    /// Create a goal from existing data (used when loading from database)
    ///
    /// Field contents are trusted, but the validity window must not end
    /// before it starts.
    pub fn from_existing(
        id: GoalId,
        title: String,
        color: Option<String>,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if let Some(end) = end_date {
            if end < start_date {
                return Err(DomainError::Validation {
                    message: format!(
                        "goal {} ends on {} before it starts on {}",
                        id, end, start_date
                    ),
                });
            }
        }

        Ok(Self {
            id,
            title,
            color,
            start_date,
            end_date,
            created_at,
        })
    }

    /// Whether the goal can carry a log on `date`
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }

    /// Whether the goal has been archived before `as_of`
    pub fn is_archived(&self, as_of: NaiveDate) -> bool {
        self.end_date.map_or(false, |end| end < as_of)
    }

    /// The part of the validity window that has already happened
    ///
    /// Returns `[start_date, min(end_date, as_of)]`, or None when the goal
    /// starts after `as_of` (a future goal has a zero-length window).
    pub fn elapsed_window(&self, as_of: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let end = match self.end_date {
            Some(end_date) => end_date.min(as_of),
            None => as_of,
        };
        if self.start_date > end {
            None
        } else {
            Some((self.start_date, end))
        }
    }

    /// Archive the goal so no days after `as_of - 1` are tracked
    ///
    /// The end date never moves before `start_date`, so archiving a goal on
    /// its first day keeps a one-day window. Returns the applied end date.
    pub fn archive(&mut self, as_of: NaiveDate) -> NaiveDate {
        let yesterday = as_of - Duration::days(1);
        let end = yesterday.max(self.start_date);
        self.end_date = Some(end);
        end
    }

    /// Reject a date outside the validity window
    pub fn ensure_active_on(&self, date: NaiveDate) -> Result<(), DomainError> {
        if self.is_active_on(date) {
            Ok(())
        } else {
            Err(DomainError::OutsideValidityWindow {
                goal_id: self.id.to_string(),
                date,
            })
        }
    }

    // Validation helper methods

    /// Validate and trim a goal title
    fn validate_title(title: &str) -> Result<String, DomainError> {
        let trimmed = title.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidTitle(
                "Goal title cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidTitle(
                "Goal title cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(trimmed.to_string())
    }

    fn validate_color(color: &Option<String>) -> Result<(), DomainError> {
        if let Some(color) = color {
            if color.trim().is_empty() || color.len() > 64 {
                return Err(DomainError::Validation {
                    message: "Color must be between 1 and 64 characters".to_string()
                });
            }
        }
        Ok(())
    }
}
