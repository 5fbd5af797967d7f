/// MCP (Model Context Protocol) message structures and JSON-RPC handling
///
/// This module defines the JSON-RPC message format that MCP clients use to
/// talk to the goal tracker, and maps tool failures onto error codes.

use jsonrpc_core::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::backup::BackupError;
use crate::storage::StorageError;
use crate::tools::ToolError;

/// MCP protocol version we support
pub const MCP_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 request message
///
/// A request without an `id` is a notification and gets no response.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    #[allow(dead_code)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    /// The method to call (e.g., "tools/call")
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response message
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error information
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn empty_arguments() -> Value {
    Value::Object(Map::new())
}

/// Parameters of a `tools/call` request
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call (e.g., "goal_toggle")
    pub name: String,
    /// Arguments to pass to the tool, an object
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

/// Result of a successful `tools/call`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    pub is_error: bool,
}

/// Content returned by a tool
#[derive(Debug, Serialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// A tool advertised by `tools/list`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool's parameter struct
    pub input_schema: Value,
}

/// MCP server capabilities
#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

/// Tools capability information
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: bool,
}

/// MCP initialization response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// Information about this server
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Application error codes, in the JSON-RPC server range -32000..-32099
pub mod error_codes {
    /// The named goal does not exist
    pub const GOAL_NOT_FOUND: i64 = -32001;
    /// Input failed domain validation
    pub const VALIDATION_ERROR: i64 = -32003;
    /// Database or storage operation failed
    pub const STORAGE_ERROR: i64 = -32004;
    /// A backup or CSV document could not be read
    pub const INVALID_BACKUP: i64 = -32005;
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Value, code: ErrorCode, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: code.code(),
                message,
                data: None,
            }),
        }
    }
}

impl ToolCallResult {
    /// A successful result: the human message, then the data as JSON
    pub fn success(message: String, data: Value) -> Self {
        Self {
            content: vec![
                ToolContent {
                    content_type: "text".to_string(),
                    text: message,
                },
                ToolContent {
                    content_type: "text".to_string(),
                    text: data.to_string(),
                },
            ],
            is_error: false,
        }
    }
}

/// Map a tool failure onto a JSON-RPC error code
pub fn tool_error_code(error: &ToolError) -> ErrorCode {
    match error {
        ToolError::InvalidParams(_) => ErrorCode::InvalidParams,
        ToolError::Domain(_) => ErrorCode::ServerError(error_codes::VALIDATION_ERROR),
        ToolError::Storage(StorageError::GoalNotFound { .. })
        | ToolError::Storage(StorageError::LongTermGoalNotFound { .. }) => {
            ErrorCode::ServerError(error_codes::GOAL_NOT_FOUND)
        }
        ToolError::Storage(StorageError::Serialization(_)) | ToolError::Json(_) => ErrorCode::InternalError,
        ToolError::Storage(_) => ErrorCode::ServerError(error_codes::STORAGE_ERROR),
        ToolError::Backup(BackupError::Json(_))
        | ToolError::Backup(BackupError::InvalidFormat(_))
        | ToolError::Backup(BackupError::UnsupportedVersion(_))
        | ToolError::Backup(BackupError::Csv { .. }) => ErrorCode::ServerError(error_codes::INVALID_BACKUP),
    }
}
