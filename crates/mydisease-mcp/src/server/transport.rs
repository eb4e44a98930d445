//! JSON-RPC message handling and the HTTP transport.
//!
//! Both transports share [`handle_request`]; this module also owns the axum
//! router for streamable HTTP (`POST /mcp`) plus health and discovery routes.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::tools::{McpTool, ToolContext};

/// Protocol version answered when the client does not name one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported in `initialize` and discovery.
pub const SERVER_NAME: &str = "mydisease-mcp";

/// Usage hint sent to clients on `initialize`.
pub const SERVER_INSTRUCTIONS: &str = "Query MyDisease.info for disease annotations. \
    Use the batch tools to resolve up to 1000 genes, variants, phenotypes or disease ids per call; \
    every identifier comes back in input order tagged hit, not_found or error.";

/// JSON-RPC error codes.
pub mod codes {
    /// Invalid JSON.
    pub const PARSE_ERROR: i32 = -32700;
    /// Unknown method.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Missing or unknown tool name.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Tool execution failed.
    pub const TOOL_ERROR: i32 = -32000;
}

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    /// Notifications carry no id and expect no response.
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// JSON-RPC version constant.
    const VERSION: &'static str = "2.0";

    #[must_use]
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self { jsonrpc: Cow::Borrowed(Self::VERSION), result: Some(result), error: None, id }
    }

    #[must_use]
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(Self::VERSION),
            result: None,
            error: Some(JsonRpcError { code, message: message.into(), data: None }),
            id,
        }
    }
}

/// MCP tool info for tools/list response.
#[derive(Debug, Serialize)]
pub struct McpToolInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tools and their execution context, shared by every connection.
pub struct ServerState {
    pub tools: Vec<Box<dyn McpTool>>,
    pub ctx: ToolContext,
}

impl ServerState {
    fn tool(&self, name: &str) -> Option<&dyn McpTool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }
}

/// Handle one JSON-RPC message. Returns `None` for notifications.
pub async fn handle_request(state: &ServerState, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
    tracing::debug!(method = %req.method, "Handling request");

    if req.method.starts_with("notifications/") || req.method == "initialized" {
        return (!req.is_notification()).then(|| JsonRpcResponse::success(req.id, json!({})));
    }

    let response = match req.method.as_str() {
        "initialize" => JsonRpcResponse::success(req.id, handle_initialize(&req.params)),
        "tools/list" => JsonRpcResponse::success(req.id, handle_tools_list(&state.tools)),
        "tools/call" => handle_tools_call(req.id, &req.params, state).await,
        "ping" => JsonRpcResponse::success(req.id, json!({})),
        _ if req.is_notification() => return None,
        _ => JsonRpcResponse::error(
            req.id,
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Parse one raw message and handle it, answering parse failures with -32700.
pub async fn handle_message(state: &ServerState, raw: &str) -> Option<JsonRpcResponse> {
    match serde_json::from_str::<JsonRpcRequest>(raw) {
        Ok(req) => handle_request(state, req).await,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable JSON-RPC message");
            Some(JsonRpcResponse::error(None, codes::PARSE_ERROR, format!("Parse error: {e}")))
        }
    }
}

fn handle_initialize(params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    tracing::info!(protocol_version, "MCP initialize");

    json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        },
        "instructions": SERVER_INSTRUCTIONS
    })
}

fn handle_tools_list(tools: &[Box<dyn McpTool>]) -> Value {
    let tool_list: Vec<McpToolInfo> = tools
        .iter()
        .map(|t| McpToolInfo {
            name: t.name().to_string(),
            description: t.description().to_string(),
            input_schema: t.input_schema(),
        })
        .collect();

    json!({ "tools": tool_list })
}

async fn handle_tools_call(id: Option<Value>, params: &Value, state: &ServerState) -> JsonRpcResponse {
    let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::error(id, codes::INVALID_PARAMS, "Missing 'name' parameter");
    };

    let Some(tool) = state.tool(tool_name) else {
        return JsonRpcResponse::error(id, codes::INVALID_PARAMS, format!("Tool not found: {tool_name}"));
    };

    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    tracing::info!(tool = %tool_name, "Executing tool");

    match tool.execute(&state.ctx, arguments).await {
        Ok(text) => JsonRpcResponse::success(
            id,
            json!({
                "content": [{
                    "type": "text",
                    "text": text
                }]
            }),
        ),
        Err(e) => {
            tracing::error!(tool = %tool_name, error = %e, "Tool execution failed");
            JsonRpcResponse::error(id, codes::TOOL_ERROR, e.to_user_message())
        }
    }
}

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub server: Arc<ServerState>,
    /// Public base URL for discovery; derived from the `Host` header when unset.
    pub public_url: Option<String>,
}

/// Create the HTTP router for MCP.
pub fn create_router(server: Arc<ServerState>, public_url: Option<String>) -> Router {
    let state = Arc::new(HttpState { server, public_url });

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/.well-known/mcp.json", get(discovery))
        .route("/mcp", post(handle_mcp_post))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "tools": state.server.tools.len()
    }))
}

/// `GET /.well-known/mcp.json`
async fn discovery(State(state): State<Arc<HttpState>>, headers: HeaderMap) -> impl IntoResponse {
    let base_url = state
        .public_url
        .clone()
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(|host| format!("http://{host}"))
        })
        .unwrap_or_default();
    let base_url = base_url.trim_end_matches('/');

    Json(json!({
        "protocolVersion": DEFAULT_PROTOCOL_VERSION,
        "server": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "instructions": SERVER_INSTRUCTIONS
        },
        "capabilities": {
            "tools": {
                "listChanged": false,
                "count": state.server.tools.len()
            }
        },
        "transports": {
            "http": {
                "url": format!("{base_url}/mcp")
            }
        }
    }))
}

/// `POST /mcp` (streamable HTTP, JSON responses only).
async fn handle_mcp_post(State(state): State<Arc<HttpState>>, body: String) -> Response {
    match handle_message(&state.server, &body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
