//! MCP server: newline-delimited JSON-RPC 2.0 over stdio.
//!
//! Tools map onto [`crate::tools`]; each skill document is also exposed as a `skill://<id>` resource.
//! There is no session state beyond the open stream.

mod protocol;
mod stdio;

pub use protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallResult, INVALID_PARAMS,
    MCP_PROTOCOL_VERSION, METHOD_NOT_FOUND, PARSE_ERROR,
};
pub use stdio::{run_stdio, McpServer, RESOURCE_SCHEME, SERVER_NAME};
