//! JSON-RPC 2.0 wire types and method dispatch for the tool host protocol.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};
use whisper_tools::{ToolEnvelope, ToolRouter};

/// JSON-RPC protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";
/// Tool host protocol version announced when the client does not name one.
pub const PROTOCOL_VERSION: &str = "2024-11-05";
/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "whisper-mcp";

// ── Error code constants ────────────────────────────────────────────

/// Line is not valid JSON.
pub const PARSE_ERROR: i64 = -32700;
/// JSON is not a request object.
pub const INVALID_REQUEST: i64 = -32600;
/// Method is not served.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Parameters are missing or malformed.
pub const INVALID_PARAMS: i64 = -32602;
/// Response could not be produced.
pub const INTERNAL_ERROR: i64 = -32603;

// ── Wire types ──────────────────────────────────────────────────────

/// Incoming request or notification.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Protocol version; not enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    /// Request id. Absent on notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Method name (e.g. `tools/call`).
    pub method: String,
    /// Optional parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Outgoing response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Echoed request id (`null` when it could not be read).
    pub id: Value,
    /// Result payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

/// Error object inside an [`RpcResponse`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorBody {
    /// Numeric JSON-RPC error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcErrorBody {
    /// Error body without details.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl RpcResponse {
    /// Build a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response.
    pub fn error(id: Value, body: RpcErrorBody) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(body),
        }
    }
}

#[derive(Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

// ── Dispatch ────────────────────────────────────────────────────────

/// Serves `initialize`, `ping`, `tools/list` and `tools/call` over a router.
#[derive(Clone)]
pub struct RpcServer {
    router: ToolRouter,
}

impl RpcServer {
    /// Wrap a router.
    pub fn new(router: ToolRouter) -> Self {
        Self { router }
    }

    /// Handle one protocol line. Returns `None` for blank lines and
    /// notifications.
    pub async fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "unparseable request line");
                return Some(RpcResponse::error(
                    Value::Null,
                    RpcErrorBody::new(PARSE_ERROR, format!("parse error: {e}")),
                ));
            }
        };
        let request: RpcRequest = match serde_json::from_value(value.clone()) {
            Ok(request) => request,
            Err(e) => {
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                return Some(RpcResponse::error(
                    id,
                    RpcErrorBody::new(INVALID_REQUEST, format!("invalid request: {e}")),
                ));
            }
        };

        let Some(id) = request.id else {
            debug!(method = %request.method, "notification received");
            return None;
        };
        debug!(method = %request.method, %id, "request received");
        Some(match self.dispatch(&request.method, request.params).await {
            Ok(result) => RpcResponse::success(id, result),
            Err(body) => RpcResponse::error(id, body),
        })
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, RpcErrorBody> {
        match method {
            "initialize" => Ok(initialize_result(params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => {
                let tools = serde_json::to_value(self.router.definitions())
                    .map_err(|e| RpcErrorBody::new(INTERNAL_ERROR, e.to_string()))?;
                Ok(json!({ "tools": tools }))
            }
            "tools/call" => self.call_tool(params).await,
            other => Err(RpcErrorBody::new(
                METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            )),
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, RpcErrorBody> {
        let params = params.ok_or_else(|| RpcErrorBody::new(INVALID_PARAMS, "missing params"))?;
        let call: CallParams = serde_json::from_value(params)
            .map_err(|e| RpcErrorBody::new(INVALID_PARAMS, format!("invalid tools/call params: {e}")))?;
        let arguments = call.arguments.unwrap_or_else(|| json!({}));
        let envelope = self.router.invoke(&call.name, arguments).await;
        render_envelope(&envelope)
    }
}

fn initialize_result(params: Option<&Value>) -> Value {
    let protocol = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(PROTOCOL_VERSION);
    json!({
        "protocolVersion": protocol,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

/// Render a router envelope as a `tools/call` result.
///
/// The text part carries the pretty-printed payload on success, or
/// `<kind>: <message>` on error. The full envelope rides along as
/// `structuredContent`.
pub fn render_envelope(envelope: &ToolEnvelope) -> Result<Value, RpcErrorBody> {
    let internal = |e: serde_json::Error| RpcErrorBody::new(INTERNAL_ERROR, e.to_string());
    let text = match (&envelope.result, &envelope.error) {
        (_, Some(error)) => format!("{}: {}", error.kind.as_str(), error.message),
        (Some(result), None) => serde_json::to_string_pretty(result).map_err(internal)?,
        (None, None) => String::new(),
    };
    let structured = serde_json::to_value(envelope).map_err(internal)?;
    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "isError": envelope.is_error(),
        "structuredContent": structured,
    }))
}
