/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads newline-delimited JSON-RPC requests
/// 2. Routes tool calls to the goal tracker tools
/// 3. Writes one JSON-RPC response per request
///
/// The server keeps an in-memory index of the logs so toggles are visible
/// immediately; it is reloaded from the store after bulk imports.

use chrono::Utc;
use jsonrpc_core::ErrorCode;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::domain::{local_today, LogsIndex};
use crate::mcp::protocol::*;
use crate::storage::GoalStore;
use crate::tools::{self, ToolError};
use crate::{GoalTrackerServer, ServerError};

/// MCP server that handles communication with the client
pub struct McpServer {
    /// The underlying goal tracker
    tracker: GoalTrackerServer,
    /// Logs as last read from the store plus every toggle since
    logs: LogsIndex,
    /// Whether the client has sent `notifications/initialized`
    initialized: bool,
}

fn tool<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schemars::schema_for!(P)).unwrap_or_default(),
    }
}

/// Every tool this server exposes, with the schema of its parameters
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool::<tools::CreateGoalParams>(
            "goal_create",
            "Create a new daily goal to track",
        ),
        tool::<tools::ToggleGoalParams>(
            "goal_toggle",
            "Cycle a goal's mark for a day: unmarked -> done -> missed -> unmarked",
        ),
        tool::<tools::ListGoalsParams>(
            "goal_list",
            "List goals with their current streak and 30-day completion rate, plus long-term goals",
        ),
        tool::<tools::DeleteGoalParams>(
            "goal_delete",
            "Delete a goal with no history, or archive a goal that already has logs",
        ),
        tool::<tools::GoalStatsParams>(
            "goal_stats",
            "Streaks, weekday patterns, period comparisons, critical days, badges and overall statistics",
        ),
        tool::<tools::AddLongTermGoalParams>(
            "long_term_goal_add",
            "Add an annual, monthly or weekly objective",
        ),
        tool::<tools::SetMonthlyTargetParams>(
            "monthly_target_set",
            "Set how many done days per month count as reaching the monthly goal",
        ),
        tool::<tools::ExportBackupParams>(
            "backup_export",
            "Export long-term goals and category settings as a version-1 JSON backup",
        ),
        tool::<tools::ImportBackupParams>(
            "backup_import",
            "Merge a JSON backup into the current data without creating duplicates",
        ),
        tool::<tools::ExportCsvParams>(
            "logs_export_csv",
            "Export every daily log as CSV (Date,Habit Name,Status,Value,Notes)",
        ),
        tool::<tools::ImportCsvParams>(
            "logs_import_csv",
            "Import daily logs from CSV, matching goals by title",
        ),
    ]
}

fn parse_args<P: DeserializeOwned>(arguments: Value) -> Result<P, ToolError> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidParams(e.to_string()))
}

fn render<T: Serialize>(message: &str, response: &T) -> Result<ToolCallResult, ToolError> {
    Ok(ToolCallResult::success(message.to_string(), serde_json::to_value(response)?))
}

impl McpServer {
    /// Create a new MCP server, loading the current logs
    pub fn new(tracker: GoalTrackerServer) -> Result<Self, ServerError> {
        let logs = tracker.storage().snapshot()?.index();
        Ok(Self {
            tracker,
            logs,
            initialized: false,
        })
    }

    /// Run the MCP server over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve newline-delimited JSON-RPC until the reader is exhausted
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();

            if reader.read_line(&mut line).await? == 0 {
                info!("MCP server shutting down (input closed)");
                break;
            }

            if let Some(response) = self.handle_line(&line) {
                let response_str = serde_json::to_string(&response)?;

                writer.write_all(response_str.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;

                debug!("Sent response: {}", response_str);
            }
        }

        Ok(())
    }

    /// Whether the client finished the initialization handshake
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns None for blank lines and notifications.
    pub fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    ErrorCode::ParseError,
                    format!("Invalid JSON: {}", e),
                ));
            }
        };

        let is_notification = request.id.is_none();
        let response = self.handle_request(request);
        if is_notification {
            None
        } else {
            Some(response)
        }
    }

    /// Handle a JSON-RPC request
    fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.unwrap_or(Value::Null);

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(id, Value::Null)
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params),
            other => JsonRpcResponse::error(
                id,
                ErrorCode::MethodNotFound,
                format!("Method '{}' not found", other),
            ),
        }
    }

    /// Handle MCP initialization request
    fn handle_initialize(&mut self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: "Goal Tracker MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, ErrorCode::InternalError, e.to_string()),
        }
    }

    /// Handle tools/call request
    fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::error(id, ErrorCode::InvalidParams, "Missing parameters".to_string());
        };
        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    ErrorCode::InvalidParams,
                    format!("Invalid parameters: {}", e),
                );
            }
        };

        info!("Calling tool {}", call.name);
        match self.call_tool(&call.name, call.arguments) {
            Ok(result) => match serde_json::to_value(result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(id, ErrorCode::InternalError, e.to_string()),
            },
            Err(e) => {
                warn!("Tool {} failed: {}", call.name, e);
                JsonRpcResponse::error(id, tool_error_code(&e), e.to_string())
            }
        }
    }

    /// Route a tool call to its implementation
    fn call_tool(&mut self, name: &str, arguments: Value) -> Result<ToolCallResult, ToolError> {
        let today = local_today();

        match name {
            "goal_create" => {
                let response = tools::create_goal(self.tracker.storage(), parse_args(arguments)?, today)?;
                render(&response.message, &response)
            }
            "goal_toggle" => {
                let response =
                    tools::toggle_goal(self.tracker.storage(), &mut self.logs, parse_args(arguments)?, today)?;
                render(&response.message, &response)
            }
            "goal_list" => {
                let response = tools::list_goals(self.tracker.storage(), parse_args(arguments)?, today)?;
                render(&response.message, &response)
            }
            "goal_delete" => {
                let response = tools::delete_goal(self.tracker.storage(), parse_args(arguments)?, today)?;
                render(&response.message, &response)
            }
            "goal_stats" => {
                let response = tools::goal_stats(
                    self.tracker.storage(),
                    self.tracker.analytics(),
                    parse_args(arguments)?,
                    today,
                )?;
                render(&response.message, &response)
            }
            "long_term_goal_add" => {
                let response = tools::add_long_term_goal(self.tracker.storage(), parse_args(arguments)?)?;
                render(&response.message, &response)
            }
            "monthly_target_set" => {
                let response = tools::set_monthly_target(self.tracker.storage(), parse_args(arguments)?)?;
                self.tracker.analytics_mut().set_monthly_target(response.monthly_target);
                render(&response.message, &response)
            }
            "backup_export" => {
                let response = tools::export_backup(self.tracker.storage(), parse_args(arguments)?, Utc::now())?;
                render(&response.message, &response)
            }
            "backup_import" => {
                let response = tools::import_backup(self.tracker.storage(), parse_args(arguments)?)?;
                render(&response.message, &response)
            }
            "logs_export_csv" => {
                let response = tools::export_logs_csv(self.tracker.storage(), parse_args(arguments)?)?;
                render(&response.message, &response)
            }
            "logs_import_csv" => {
                let response = tools::import_logs_csv(self.tracker.storage(), parse_args(arguments)?)?;
                self.logs = self.tracker.storage().snapshot()?.index();
                render(&response.message, &response)
            }
            other => Err(ToolError::InvalidParams(format!("Unknown tool: {}", other))),
        }
    }
}
