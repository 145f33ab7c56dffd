//! JSON-RPC 2.0 message types and MCP method dispatch shared by both
//! transports.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::resources;
use crate::tools::{McpTool, ToolContext};

/// Protocol version announced when the client sends none.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Invalid JSON was received.
pub const PARSE_ERROR: i32 = -32700;
/// The method does not exist.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameters.
pub const INVALID_PARAMS: i32 = -32602;
/// Tool rejected its arguments.
pub const TOOL_ERROR: i32 = -32000;

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    /// Requests without an id expect no response.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
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
        Self {
            jsonrpc: Cow::Borrowed(Self::VERSION),
            result: Some(result),
            error: None,
            id,
        }
    }

    #[must_use]
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(Self::VERSION),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
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

/// Registered tools plus the context they run in.
pub struct Dispatcher {
    tools: Vec<Box<dyn McpTool>>,
    ctx: ToolContext,
}

impl Dispatcher {
    #[must_use]
    pub fn new(tools: Vec<Box<dyn McpTool>>, ctx: ToolContext) -> Self {
        Self { tools, ctx }
    }

    /// Registered tools.
    #[must_use]
    pub fn tools(&self) -> &[Box<dyn McpTool>] {
        &self.tools
    }

    /// Tool execution context.
    #[must_use]
    pub const fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Handle one request. Returns `None` for notifications.
    pub async fn handle(&self, req: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %req.method, "Received request");

        let id = req.id.clone();
        let response = match req.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, initialize_result(&req.params)),
            "notifications/initialized" | "initialized" | "notifications/cancelled" => {
                JsonRpcResponse::success(id, json!({}))
            }
            "tools/list" => JsonRpcResponse::success(id, self.tools_list()),
            "tools/call" => self.tools_call(id, &req.params).await,
            "resources/list" => JsonRpcResponse::success(id, resources_list()),
            "resources/read" => resources_read(id, &req.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", req.method),
            ),
        };

        if req.is_notification() {
            None
        } else {
            Some(response)
        }
    }

    fn tools_list(&self) -> Value {
        let tool_list: Vec<McpToolInfo> = self
            .tools
            .iter()
            .map(|t| McpToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect();

        json!({ "tools": tool_list })
    }

    async fn tools_call(&self, id: Option<Value>, params: &Value) -> JsonRpcResponse {
        let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing 'name' parameter");
        };

        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => json!({}),
            Some(args) => args.clone(),
        };

        let Some(tool) = self.tools.iter().find(|t| t.name() == tool_name) else {
            let message = format!("Tool not found: {tool_name}");
            return JsonRpcResponse::error(id, INVALID_PARAMS, message);
        };

        tracing::info!(tool = %tool_name, "Executing tool");

        match tool.execute(&self.ctx, arguments).await {
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
                tracing::warn!(tool = %tool_name, error = %e, "Tool execution failed");
                let message = format!("Tool error: {}", e.to_user_message());
                JsonRpcResponse::error(id, TOOL_ERROR, message)
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.tools.len())
            .finish()
    }
}

fn initialize_result(params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    tracing::info!("MCP initialize: protocol version {}", protocol_version);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": {
                "listChanged": false
            },
            "resources": {
                "subscribe": false,
                "listChanged": false
            }
        },
        "serverInfo": {
            "name": "biomcp",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn resources_list() -> Value {
    json!({ "resources": resources::RESOURCES })
}

fn resources_read(id: Option<Value>, params: &Value) -> JsonRpcResponse {
    let Some(uri) = params.get("uri").and_then(Value::as_str) else {
        return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing 'uri' parameter");
    };

    match resources::find(uri) {
        Some(resource) => JsonRpcResponse::success(id, resource.contents()),
        None => JsonRpcResponse::error(id, INVALID_PARAMS, format!("Resource not found: {uri}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_serialization() {
        let ok = JsonRpcResponse::success(Some(json!(1)), json!({}));
        let ok = serde_json::to_value(ok).unwrap();
        assert_eq!(ok, json!({"jsonrpc": "2.0", "result": {}, "id": 1}));

        let err = JsonRpcResponse::error(None, METHOD_NOT_FOUND, "nope");
        let err = serde_json::to_value(err).unwrap();
        assert_eq!(
            err,
            json!({
                "jsonrpc": "2.0",
                "error": {"code": -32601, "message": "nope"},
                "id": null
            })
        );
    }

    #[test]
    fn test_initialize_result_echoes_version() {
        let result = initialize_result(&json!({"protocolVersion": "2025-03-26"}));
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "biomcp");
        assert_eq!(result["capabilities"]["resources"]["subscribe"], false);
        assert_eq!(
            initialize_result(&Value::Null)["protocolVersion"],
            DEFAULT_PROTOCOL_VERSION
        );
    }

    #[test]
    fn test_request_notification() {
        let req: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(req.is_notification());
        assert_eq!(req.params, Value::Null);
    }

    #[test]
    fn test_resources_read() {
        let ok = resources_read(Some(json!(1)), &json!({"uri": "biomcp://researcher.md"}));
        let result = ok.result.unwrap();
        let text = result["contents"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("# Biomedical Research Assistant"));

        let missing = resources_read(Some(json!(2)), &json!({}));
        assert_eq!(missing.error.unwrap().code, INVALID_PARAMS);

        let unknown = resources_read(Some(json!(3)), &json!({"uri": "biomcp://nope"}));
        assert_eq!(
            unknown.error.unwrap().message,
            "Resource not found: biomcp://nope"
        );
    }
}
