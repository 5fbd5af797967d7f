/// SQLite implementation of the goal storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving goals, logs, long-term goals and user settings. It
/// handles all SQL queries and row conversion.

use std::path::Path;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use chrono::NaiveDate;

use crate::domain::{
    CategorySettings, Goal, GoalId, GoalLog, GoalType, LogStatus, LongTermGoal, LongTermGoalId,
};
use crate::storage::{migrations, GoalStore, LongTermSnapshot, StorageError, StoreSnapshot};

/// Settings key holding the category mapping JSON
const CATEGORY_SETTINGS_KEY: &str = "category_mappings";

/// Settings key holding the monthly target
const MONTHLY_TARGET_KEY: &str = "monthly_target";

const GOAL_COLUMNS: &str = "id, title, color, start_date, end_date, created_at";

const LONG_TERM_GOAL_COLUMNS: &str =
    "id, title, is_completed, type, year, month, week_number, color, created_at";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the GoalStore trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Open a private in-memory database (tests and dry runs)
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        // Enable foreign key constraints so deleting a goal cascades to its logs
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    // Row conversion helpers

    fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<Goal> {
        let id_str: String = row.get(0)?;
        let id = GoalId::from_string(&id_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

        Goal::from_existing(
            id,
            row.get(1)?, // title
            row.get(2)?, // color
            row.get(3)?, // start_date
            row.get(4)?, // end_date
            row.get(5)?, // created_at
        )
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))
    }

    fn log_from_row(row: &Row<'_>) -> rusqlite::Result<GoalLog> {
        let id_str: String = row.get(0)?;
        let goal_id = GoalId::from_string(&id_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

        let status_str: String = row.get(2)?;
        let status = status_str
            .parse::<LogStatus>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

        Ok(GoalLog::new(goal_id, row.get(1)?, status))
    }

    fn long_term_goal_from_row(row: &Row<'_>) -> rusqlite::Result<LongTermGoal> {
        let id_str: String = row.get(0)?;
        let id = LongTermGoalId::from_string(&id_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

        let type_str: String = row.get(3)?;
        let goal_type = type_str
            .parse::<GoalType>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        Ok(LongTermGoal {
            id,
            title: row.get(1)?,
            is_completed: row.get(2)?,
            goal_type,
            year: row.get(4)?,
            month: row.get(5)?,
            week_number: row.get(6)?,
            color: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn query_goals(conn: &Connection) -> Result<Vec<Goal>, StorageError> {
        let sql = format!(
            "SELECT {} FROM goals ORDER BY start_date ASC, created_at ASC",
            GOAL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let goal_iter = stmt.query_map([], Self::goal_from_row)?;

        let mut goals = Vec::new();
        for goal in goal_iter {
            goals.push(goal?);
        }
        Ok(goals)
    }

    fn query_logs(conn: &Connection) -> Result<Vec<GoalLog>, StorageError> {
        let mut stmt = conn.prepare(
            "SELECT goal_id, date, status FROM goal_logs ORDER BY date ASC, goal_id ASC"
        )?;
        let log_iter = stmt.query_map([], Self::log_from_row)?;

        let mut logs = Vec::new();
        for log in log_iter {
            logs.push(log?);
        }
        Ok(logs)
    }

    fn write_long_term_goal(conn: &Connection, goal: &LongTermGoal) -> Result<(), StorageError> {
        conn.execute(
            "INSERT INTO long_term_goals (
                id, title, is_completed, type, year, month, week_number, color, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (id) DO UPDATE SET
                title = excluded.title,
                is_completed = excluded.is_completed,
                type = excluded.type,
                year = excluded.year,
                month = excluded.month,
                week_number = excluded.week_number,
                color = excluded.color,
                created_at = COALESCE(excluded.created_at, long_term_goals.created_at)",
            params![
                goal.id.to_string(),
                goal.title,
                goal.is_completed,
                goal.goal_type.as_str(),
                goal.year,
                goal.month,
                goal.week_number,
                goal.color,
                goal.created_at,
            ],
        )?;
        Ok(())
    }

    fn write_setting(conn: &Connection, key: &str, value: &str) -> Result<(), StorageError> {
        conn.execute(
            "INSERT INTO user_settings (key, value) VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn read_setting(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM user_settings WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl GoalStore for SqliteStorage {
    /// Create a new goal in the database
    fn create_goal(&self, goal: &Goal) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO goals (id, title, color, start_date, end_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                goal.id.to_string(),
                goal.title,
                goal.color,
                goal.start_date,
                goal.end_date,
                goal.created_at,
            ],
        )?;

        tracing::debug!("Created goal: {} ({})", goal.title, goal.id);
        Ok(())
    }

    /// Get a goal by its ID
    fn get_goal(&self, goal_id: &GoalId) -> Result<Goal, StorageError> {
        let sql = format!("SELECT {} FROM goals WHERE id = ?1", GOAL_COLUMNS);
        self.conn
            .query_row(&sql, params![goal_id.to_string()], Self::goal_from_row)
            .optional()?
            .ok_or_else(|| StorageError::GoalNotFound {
                goal_id: goal_id.to_string(),
            })
    }

    /// Update an existing goal
    fn update_goal(&self, goal: &Goal) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE goals SET
                title = ?2,
                color = ?3,
                start_date = ?4,
                end_date = ?5
             WHERE id = ?1",
            params![
                goal.id.to_string(),
                goal.title,
                goal.color,
                goal.start_date,
                goal.end_date,
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::GoalNotFound {
                goal_id: goal.id.to_string(),
            });
        }

        tracing::debug!("Updated goal: {} ({})", goal.title, goal.id);
        Ok(())
    }

    /// Archive a goal by closing its validity window
    fn archive_goal(&self, goal_id: &GoalId, end_date: NaiveDate) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE goals SET end_date = ?2 WHERE id = ?1",
            params![goal_id.to_string(), end_date],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::GoalNotFound {
                goal_id: goal_id.to_string(),
            });
        }

        tracing::debug!("Archived goal {} at {}", goal_id, end_date);
        Ok(())
    }

    /// Hard delete a goal together with its logs
    fn delete_goal(&self, goal_id: &GoalId) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM goal_logs WHERE goal_id = ?1",
            params![goal_id.to_string()],
        )?;
        let rows_affected = tx.execute(
            "DELETE FROM goals WHERE id = ?1",
            params![goal_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::GoalNotFound {
                goal_id: goal_id.to_string(),
            });
        }

        tx.commit()?;
        tracing::debug!("Deleted goal: {}", goal_id);
        Ok(())
    }

    fn list_goals(&self) -> Result<Vec<Goal>, StorageError> {
        Self::query_goals(&self.conn)
    }

    fn list_logs(&self) -> Result<Vec<GoalLog>, StorageError> {
        Self::query_logs(&self.conn)
    }

    fn count_logs_for_goal(&self, goal_id: &GoalId) -> Result<u32, StorageError> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM goal_logs WHERE goal_id = ?1",
            params![goal_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Insert or overwrite the log for a goal and day
    fn upsert_log(&self, log: &GoalLog) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO goal_logs (goal_id, date, status) VALUES (?1, ?2, ?3)
             ON CONFLICT (goal_id, date) DO UPDATE SET status = excluded.status",
            params![log.goal_id.to_string(), log.date, log.status.as_str()],
        )?;

        tracing::debug!("Upserted log {} for goal {} on {}", log.status, log.goal_id, log.date);
        Ok(())
    }

    fn delete_log(&self, goal_id: &GoalId, date: NaiveDate) -> Result<(), StorageError> {
        self.conn.execute(
            "DELETE FROM goal_logs WHERE goal_id = ?1 AND date = ?2",
            params![goal_id.to_string(), date],
        )?;

        tracing::debug!("Cleared log for goal {} on {}", goal_id, date);
        Ok(())
    }

    /// Read goals and logs inside one read transaction
    fn snapshot(&self) -> Result<StoreSnapshot, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let goals = Self::query_goals(&tx)?;
        let logs = Self::query_logs(&tx)?;
        tx.commit()?;

        Ok(StoreSnapshot { goals, logs })
    }

    fn list_long_term_goals(&self) -> Result<Vec<LongTermGoal>, StorageError> {
        let sql = format!(
            "SELECT {} FROM long_term_goals ORDER BY year ASC, created_at ASC, title ASC",
            LONG_TERM_GOAL_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let goal_iter = stmt.query_map([], Self::long_term_goal_from_row)?;

        let mut goals = Vec::new();
        for goal in goal_iter {
            goals.push(goal?);
        }
        Ok(goals)
    }

    fn get_long_term_goal(&self, goal_id: &LongTermGoalId) -> Result<LongTermGoal, StorageError> {
        let sql = format!(
            "SELECT {} FROM long_term_goals WHERE id = ?1",
            LONG_TERM_GOAL_COLUMNS
        );
        self.conn
            .query_row(&sql, params![goal_id.to_string()], Self::long_term_goal_from_row)
            .optional()?
            .ok_or_else(|| StorageError::LongTermGoalNotFound {
                goal_id: goal_id.to_string(),
            })
    }

    fn upsert_long_term_goal(&self, goal: &LongTermGoal) -> Result<(), StorageError> {
        Self::write_long_term_goal(&self.conn, goal)?;
        tracing::debug!("Upserted long-term goal: {} ({})", goal.title, goal.id);
        Ok(())
    }

    fn get_category_settings(&self) -> Result<Option<CategorySettings>, StorageError> {
        match self.read_setting(CATEGORY_SETTINGS_KEY)? {
            Some(json) => Ok(Some(CategorySettings::new(serde_json::from_str(&json)?))),
            None => Ok(None),
        }
    }

    /// Read long-term goals and settings inside one read transaction
    fn long_term_snapshot(&self) -> Result<LongTermSnapshot, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let goals = self.list_long_term_goals()?;
        let settings = self.get_category_settings()?;
        tx.commit()?;

        Ok(LongTermSnapshot { goals, settings })
    }

    /// Write every goal and the settings in a single transaction
    fn apply_backup(
        &self,
        goals: &[LongTermGoal],
        settings: Option<&CategorySettings>,
    ) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        for goal in goals {
            Self::write_long_term_goal(&tx, goal)?;
        }

        if let Some(settings) = settings {
            let json = serde_json::to_string(&settings.mappings)?;
            Self::write_setting(&tx, CATEGORY_SETTINGS_KEY, &json)?;
        }

        tx.commit()?;
        tracing::debug!(
            "Applied backup batch: {} goals, settings written: {}",
            goals.len(),
            settings.is_some()
        );
        Ok(())
    }

    fn get_monthly_target(&self) -> Result<Option<u32>, StorageError> {
        match self.read_setting(MONTHLY_TARGET_KEY)? {
            Some(value) => value
                .parse::<u32>()
                .map(Some)
                .map_err(|e| StorageError::CorruptRow {
                    table: "user_settings",
                    message: format!("monthly target '{}': {}", value, e),
                }),
            None => Ok(None),
        }
    }

    fn set_monthly_target(&self, target: u32) -> Result<(), StorageError> {
        Self::write_setting(&self.conn, MONTHLY_TARGET_KEY, &target.to_string())
    }
}
