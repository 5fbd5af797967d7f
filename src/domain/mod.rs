/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Goal, GoalLog, LongTermGoal) and the
/// per-goal streak engine. Nothing here does I/O, and every computation takes
/// an explicit as-of day. The clock is read only by `calendar::local_today`
/// and by the `new` constructors stamping `created_at`.

pub mod calendar;
pub mod goal;
pub mod log;
pub mod long_term;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use calendar::*;
pub use goal::*;
pub use log::*;
pub use long_term::*;
pub use streak::*;
pub use types::*;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid goal title: {0}")]
    InvalidTitle(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Cannot modify goal {goal_id} on {date}: outside its validity window")]
    OutsideValidityWindow { goal_id: String, date: NaiveDate },
}
