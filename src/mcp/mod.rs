/// MCP stdio transport
///
/// Newline-delimited JSON-RPC parsing, the tool catalogue and dispatch into
/// the goal tools.

pub mod protocol;
pub mod server;

pub use server::McpServer;
