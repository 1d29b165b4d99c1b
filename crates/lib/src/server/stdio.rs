//! MCP server over newline-delimited JSON-RPC on stdin/stdout.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::server::protocol::{
    InitializeParams, JsonRpcRequest, JsonRpcResponse, ReadResourceParams, Resource,
    ResourceContents, ToolCallParams, ToolCallResult, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, JSONRPC_VERSION, MCP_PROTOCOL_VERSION, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::skills::{Library, OVERVIEW_SLUG};
use crate::tools::{tool_definitions, SkillTools, ToolExecutor};

pub const SERVER_NAME: &str = "skilldex";

/// URI scheme for skill documents exposed as resources.
pub const RESOURCE_SCHEME: &str = "skill://";

const MARKDOWN_MIME: &str = "text/markdown";

const INSTRUCTIONS: &str = "Pattern guides organised as category/skill. Start with list_skills, \
read one with get_skill (id or search), use check_rules for a checklist and scaffold to render templates.";

/// Stateless request handler. Every request reads the library afresh.
#[derive(Debug, Clone)]
pub struct McpServer {
    tools: SkillTools,
}

fn parse_params<T: serde::de::DeserializeOwned>(params: &Value) -> Result<T, String> {
    let params = if params.is_null() { json!({}) } else { params.clone() };
    serde_json::from_value(params).map_err(|e| format!("invalid params: {}", e))
}

impl McpServer {
    pub fn new(library: Library) -> Self {
        Self {
            tools: SkillTools::new(library),
        }
    }

    fn library(&self) -> &Library {
        self.tools.library()
    }

    /// Handle one raw line. `None` when nothing should be written back (notifications,
    /// blank lines).
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                log::debug!("unparseable request: {}", e);
                return Some(JsonRpcResponse::err(
                    Value::Null,
                    PARSE_ERROR,
                    format!("parse error: {}", e),
                ));
            }
        };
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let req: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::err(
                    id,
                    INVALID_REQUEST,
                    format!("invalid request: {}", e),
                ));
            }
        };
        if req.jsonrpc != JSONRPC_VERSION {
            if req.is_notification() {
                return None;
            }
            return Some(JsonRpcResponse::err(
                id,
                INVALID_REQUEST,
                format!("unsupported jsonrpc version: {}", req.jsonrpc),
            ));
        }
        self.handle_request(req).await
    }

    /// Dispatch one request. Notifications are processed and never answered.
    pub async fn handle_request(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        log::debug!("request {} (id {:?})", req.method, req.id);
        let outcome = match req.method.as_str() {
            "initialize" => self.initialize(&req.params),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions() })),
            "tools/call" => self.call_tool(&req.params).await,
            "resources/list" => self.list_resources().await,
            "resources/read" => self.read_resource(&req.params).await,
            m if m.starts_with("notifications/") => {
                log::debug!("notification {}", m);
                return None;
            }
            other => Err((METHOD_NOT_FOUND, format!("method not found: {}", other))),
        };
        let id = req.id?;
        Some(match outcome {
            Ok(result) => JsonRpcResponse::ok(id, result),
            Err((code, message)) => JsonRpcResponse::err(id, code, message),
        })
    }

    fn initialize(&self, params: &Value) -> Result<Value, (i64, String)> {
        let params: InitializeParams = parse_params(params).map_err(|e| (INVALID_PARAMS, e))?;
        if let Some(client) = &params.client_info {
            log::info!(
                "client connected: {} {}",
                client.name,
                client.version.as_deref().unwrap_or("")
            );
        }
        if let Some(requested) = params.protocol_version.as_deref() {
            if requested != MCP_PROTOCOL_VERSION {
                log::debug!(
                    "client asked for protocol {}, offering {}",
                    requested,
                    MCP_PROTOCOL_VERSION
                );
            }
        }
        Ok(json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "listChanged": false, "subscribe": false }
            },
            "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
            "instructions": INSTRUCTIONS,
        }))
    }

    async fn call_tool(&self, params: &Value) -> Result<Value, (i64, String)> {
        let params: ToolCallParams = parse_params(params).map_err(|e| (INVALID_PARAMS, e))?;
        let tools = self.tools.clone();
        let name = params.name.clone();
        let outcome =
            tokio::task::spawn_blocking(move || tools.execute(&params.name, &params.arguments))
                .await
                .map_err(|e| (INTERNAL_ERROR, format!("tool {} failed: {}", name, e)))?;
        let result = match outcome {
            Ok(text) => ToolCallResult::text(text, false),
            Err(e) => {
                log::warn!("tool {} error: {}", name, e);
                ToolCallResult::text(e, true)
            }
        };
        serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, e.to_string()))
    }

    async fn list_resources(&self) -> Result<Value, (i64, String)> {
        let library = self.library().clone();
        let resources = tokio::task::spawn_blocking(move || {
            let mut out = Vec::new();
            for category in library.categories() {
                if category.has_overview {
                    out.push(Resource {
                        uri: format!("{}{}/{}", RESOURCE_SCHEME, category.name, OVERVIEW_SLUG),
                        name: format!("{} (Overview)", crate::skills::display_name(&category.name)),
                        description: Some(category.description.clone()).filter(|d| !d.is_empty()),
                        mime_type: MARKDOWN_MIME.to_string(),
                    });
                }
                for skill in &category.skills {
                    out.push(Resource {
                        uri: format!("{}{}", RESOURCE_SCHEME, skill.id),
                        name: skill.display_name.clone(),
                        description: None,
                        mime_type: MARKDOWN_MIME.to_string(),
                    });
                }
            }
            out
        })
        .await
        .map_err(|e| (INTERNAL_ERROR, format!("listing resources failed: {}", e)))?;
        Ok(json!({ "resources": resources }))
    }

    async fn read_resource(&self, params: &Value) -> Result<Value, (i64, String)> {
        let params: ReadResourceParams = parse_params(params).map_err(|e| (INVALID_PARAMS, e))?;
        let Some(id) = params.uri.strip_prefix(RESOURCE_SCHEME).map(str::to_string) else {
            return Err((INVALID_PARAMS, format!("unsupported resource uri: {}", params.uri)));
        };
        let library = self.library().clone();
        let doc = tokio::task::spawn_blocking(move || library.resolve(&id))
            .await
            .map_err(|e| (INTERNAL_ERROR, format!("reading resource failed: {}", e)))?
            .map_err(|e| (INVALID_PARAMS, format!("resource not found: {} ({})", params.uri, e)))?;
        let contents = ResourceContents {
            uri: format!("{}{}", RESOURCE_SCHEME, doc.id),
            mime_type: MARKDOWN_MIME.to_string(),
            text: doc.content,
        };
        Ok(json!({ "contents": [contents] }))
    }

    /// Read requests line by line until EOF, writing one response line per answered request.
    pub async fn serve<R, W>(&self, reader: R, writer: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await.context("reading request")? {
            let Some(response) = self.handle_line(&line).await else {
                continue;
            };
            let mut text = serde_json::to_string(&response).context("encoding response")?;
            text.push('\n');
            writer.write_all(text.as_bytes()).await.context("writing response")?;
            writer.flush().await.context("flushing response")?;
        }
        log::debug!("input closed");
        Ok(())
    }
}

/// Serve the library on stdin/stdout until EOF or Ctrl-C.
pub async fn run_stdio(library: Library) -> Result<()> {
    log::info!("serving skill library {:?} over stdio", library);
    let server = McpServer::new(library);
    let reader = BufReader::new(tokio::io::stdin());
    let mut writer = tokio::io::stdout();
    tokio::select! {
        res = server.serve(reader, &mut writer) => res,
        _ = tokio::signal::ctrl_c() => {
            log::info!("interrupted, shutting down");
            Ok(())
        }
    }
}
