/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// Each migration runs once; the applied version lives in `schema_version`.

use rusqlite::Connection;
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
pub const CURRENT_VERSION: i32 = 2;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist and
/// brings an older database up to `CURRENT_VERSION`.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    // Create version tracking table first
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version = get_current_version(conn)?;

    if current_version < CURRENT_VERSION {
        run_migrations(conn, current_version)?;
        set_version(conn, CURRENT_VERSION)?;
    }

    Ok(())
}

/// Get the current database schema version, 0 for a fresh database
pub fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    match conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
        row.get::<_, i32>(0)
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(StorageError::Migration(format!("Cannot read schema version: {}", e))),
    }
}

/// Set the database schema version
fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run database migrations from the current version to the latest
fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn)?;
    }

    if from_version < 2 {
        migration_v2(conn)?;
    }

    Ok(())
}

/// Migration to version 1: daily goals and their logs
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS goals (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            color TEXT,
            start_date TEXT NOT NULL,
            end_date TEXT,
            created_at TEXT NOT NULL,
            CHECK (end_date IS NULL OR end_date >= start_date)
        );

        CREATE TABLE IF NOT EXISTS goal_logs (
            goal_id TEXT NOT NULL,
            date TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('done', 'missed')),
            PRIMARY KEY (goal_id, date),
            FOREIGN KEY (goal_id) REFERENCES goals (id) ON DELETE CASCADE
        );

        -- Analytics read logs by day
        CREATE INDEX IF NOT EXISTS idx_goal_logs_date ON goal_logs (date);",
    )?;

    tracing::info!("Applied migration v1: Created goals and goal_logs tables");
    Ok(())
}

/// Migration to version 2: long-term goals and user settings
fn migration_v2(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS long_term_goals (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            is_completed BOOLEAN NOT NULL DEFAULT FALSE,
            type TEXT NOT NULL CHECK (type IN ('annual', 'monthly', 'weekly')),
            year INTEGER NOT NULL,
            month INTEGER,
            week_number INTEGER,
            color TEXT,
            created_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_long_term_goals_natural_key
            ON long_term_goals (title, type, year);

        CREATE TABLE IF NOT EXISTS user_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    tracing::info!("Applied migration v2: Created long_term_goals and user_settings tables");
    Ok(())
}
