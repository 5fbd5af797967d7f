/// Public library interface for the Goal Tracker MCP server
///
/// This module exports the server facade and the layers beneath it:
/// the pure domain and analytics engines, backup reconciliation, storage,
/// and the MCP tools.

use thiserror::Error;

pub mod analytics;
pub mod backup;
pub mod config;
pub mod domain;
pub mod mcp;
pub mod storage;
pub mod tools;

// Re-export the types most callers need
pub use analytics::{AnalyticsEngine, AnalyticsReport};
pub use backup::{BackupError, BackupSnapshot, ImportReport};
pub use config::{ConfigError, TrackerConfig};
pub use domain::*;
pub use storage::{GoalStore, LongTermSnapshot, SqliteStorage, StorageError, StoreSnapshot};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main goal tracker server that implements the MCP protocol
///
/// This server manages goal data through a SQLite database and provides
/// tools for tracking goals, computing statistics and handling backups.
pub struct GoalTrackerServer {
    storage: SqliteStorage,
    analytics: AnalyticsEngine,
    config: TrackerConfig,
}

impl GoalTrackerServer {
    /// Create a new goal tracker server from its configuration
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(config: TrackerConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing Goal Tracker server with database: {:?}", config.database_path);
        let storage = SqliteStorage::new(&config.database_path)?;
        Self::with_storage(storage, config)
    }

    /// Create a server around an already opened store
    ///
    /// A monthly target saved in the store wins over the configured one.
    pub fn with_storage(storage: SqliteStorage, config: TrackerConfig) -> Result<Self, ServerError> {
        let monthly_target = storage
            .get_monthly_target()?
            .unwrap_or(config.monthly_target);

        Ok(Self {
            storage,
            analytics: AnalyticsEngine::new(monthly_target),
            config,
        })
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let goals = self.storage.list_goals()?;
        tracing::info!("Server started successfully, found {} existing goals", goals.len());

        let mut mcp_server = mcp::McpServer::new(self)?;
        mcp_server.run().await
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Get a reference to the analytics engine (useful for testing)
    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }

    pub(crate) fn analytics_mut(&mut self) -> &mut AnalyticsEngine {
        &mut self.analytics
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}
