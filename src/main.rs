/// Main entry point for the Goal Tracker MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use goal_tracker_mcp::{GoalTrackerServer, TrackerConfig};

/// Command line arguments for the Goal Tracker MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Done days per month that count as reaching the monthly goal (1-31, default 20)
    #[arg(long)]
    monthly_target: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("goal_tracker_mcp={}", log_level))
        .with_writer(std::io::stderr) // stdout carries JSON-RPC frames
        .init();

    info!("Starting Goal Tracker MCP server");

    let config = TrackerConfig::resolve(args.database, args.monthly_target)?;
    info!("Using database at: {}", config.database_path.display());

    let server = GoalTrackerServer::new(config).await?;
    server.run().await?;

    info!("Goal Tracker MCP server shutdown complete");
    Ok(())
}
