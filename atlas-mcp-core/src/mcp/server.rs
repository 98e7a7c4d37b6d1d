//! Per-session MCP server
//!
//! Dispatches JSON-RPC requests to the tool table. One instance is built per
//! session, over the process-wide service clients, with the tool set already
//! filtered through the access policy at construction time.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use super::protocol::*;
use crate::config::AppConfig;
use crate::envelope::{build_error, build_result};
use crate::policy;
use crate::services::Services;
use crate::tools::{ToolSpec, validate_args};

/// Service name advertised during the handshake and on the health endpoint
pub const SERVER_NAME: &str = "atlas-mcp";

/// MCP server state for one session
pub struct McpServer {
    server_info: ServerInfo,
    tools: Vec<&'static ToolSpec>,
    services: Arc<Services>,
    initialized: RwLock<bool>,
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("server_info", &self.server_info)
            .field("tool_count", &self.tools.len())
            .finish()
    }
}

impl McpServer {
    /// Build a server whose tool set is filtered through the access policy
    pub fn new(config: &AppConfig, services: Arc<Services>) -> Self {
        Self::with_tools(policy::enabled_tools(config), services)
    }

    /// Build a server over an explicit tool set
    pub fn with_tools(tools: Vec<&'static ToolSpec>, services: Arc<Services>) -> Self {
        Self {
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            tools,
            services,
            initialized: RwLock::new(false),
        }
    }

    /// Handle an incoming JSON-RPC request.
    ///
    /// Returns `None` for notifications, which expect no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            if request.method == "notifications/initialized" {
                tracing::debug!("client completed initialization");
            }
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params).await,
            "ping" => JsonRpcResponse::success(id, Value::Object(Default::default())),
            "tools/list" => self.handle_tools_list(id).await,
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(id, JsonRpcError::method_not_found()),
        };
        Some(response)
    }

    async fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing initialize params"),
                );
            }
        };

        tracing::debug!(client = %params.client_info.name, "initialize handshake");

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: self.server_info.clone(),
        };

        *self.initialized.write().await = true;

        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap_or(Value::Null))
    }

    async fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let tools: Vec<McpTool> = self
            .tools
            .iter()
            .map(|spec| McpTool {
                name: spec.name.to_string(),
                description: spec.description.to_string(),
                input_schema: spec.input_schema(),
            })
            .collect();

        let result = ToolsListResult { tools };
        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap_or(Value::Null))
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid tool call params: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing tool call params"),
                );
            }
        };

        let Some(spec) = self.tools.iter().copied().find(|t| t.name == params.name) else {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)),
            );
        };

        tracing::debug!(tool = spec.name, "tool call");

        // Tool-level failures (validation or remote errors) are normal
        // envelopes with is_error set, never transport failures.
        let result = match validate_args(spec, &params.arguments) {
            Err(e) => build_error(&e.to_string()),
            Ok(()) => match (spec.handler)(Arc::clone(&self.services), params.arguments).await {
                Ok(value) => build_result(value, spec.pii),
                Err(e) => build_error(&e.to_string()),
            },
        };

        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ArgKind, ArgSpec, ToolAccess, ToolGroup};
    use futures::future::BoxFuture;
    use serde_json::json;

    fn test_services() -> Arc<Services> {
        let config = AppConfig::default();
        Arc::new(Services::from_config(&config).expect("services should build"))
    }

    fn default_server() -> McpServer {
        McpServer::new(&AppConfig::default(), test_services())
    }

    fn echo_handler(
        _services: Arc<Services>,
        args: Value,
    ) -> BoxFuture<'static, crate::error::Result<Value>> {
        Box::pin(async move { Ok(json!({ "echo": args })) })
    }

    fn leaked_echo_tool(pii: bool) -> &'static ToolSpec {
        Box::leak(Box::new(ToolSpec {
            name: "echo",
            description: "Echoes back the input",
            group: ToolGroup::Jira,
            access: ToolAccess::Read,
            pii,
            args: &[ArgSpec {
                name: "message",
                kind: ArgKind::String,
                required: true,
                description: "Message to echo",
            }],
            handler: echo_handler,
        }))
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = default_server();
        let request = JsonRpcRequest::new(1i64, "initialize").with_params(json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0" }
        }));

        let response = server.handle_request(request).await.expect("response");
        assert!(response.error.is_none());
        let result = response.result.expect("result");
        assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_requires_params() {
        let server = default_server();
        let response = server
            .handle_request(JsonRpcRequest::new(1i64, "initialize"))
            .await
            .expect("response");
        assert_eq!(response.error.expect("error").code, -32602);
    }

    #[tokio::test]
    async fn test_tools_list_contains_full_table_by_default() {
        let server = default_server();
        let response = server
            .handle_request(JsonRpcRequest::new(1i64, "tools/list"))
            .await
            .expect("response");
        let result = response.result.expect("result");
        let tools = result["tools"].as_array().expect("tools array");
        assert_eq!(tools.len(), crate::tools::all_tools().len());
        assert!(
            tools
                .iter()
                .any(|t| t["name"] == "get_jira_issue" && t["inputSchema"]["type"] == "object")
        );
    }

    #[tokio::test]
    async fn test_tools_list_respects_read_only_policy() {
        let config = AppConfig {
            read_only_mode: true,
            ..AppConfig::default()
        };
        let server = McpServer::new(&config, test_services());
        let response = server
            .handle_request(JsonRpcRequest::new(1i64, "tools/list"))
            .await
            .expect("response");
        let result = response.result.expect("result");
        let tools = result["tools"].as_array().expect("tools array");
        assert!(!tools.is_empty());
        assert!(!tools.iter().any(|t| t["name"] == "jira_create_issue"));
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool() {
        let server = default_server();
        let request = JsonRpcRequest::new(1i64, "tools/call")
            .with_params(json!({ "name": "nope", "arguments": {} }));
        let response = server.handle_request(request).await.expect("response");
        let error = response.error.expect("error");
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("nope"));
    }

    #[tokio::test]
    async fn test_tools_call_validation_failure_is_tool_error() {
        let server = default_server();
        let request = JsonRpcRequest::new(1i64, "tools/call")
            .with_params(json!({ "name": "get_jira_issue", "arguments": {} }));
        let response = server.handle_request(request).await.expect("response");

        // Validation failures are tool-level: a success response carrying an
        // error envelope, not a JSON-RPC error.
        assert!(response.error.is_none());
        let result = response.result.expect("result");
        assert_eq!(result["isError"], true);
        assert!(
            result["content"][0]["text"]
                .as_str()
                .expect("text")
                .contains("issueKey")
        );
    }

    #[tokio::test]
    async fn test_tools_call_success_envelope() {
        let server = McpServer::with_tools(vec![leaked_echo_tool(false)], test_services());
        let request = JsonRpcRequest::new(1i64, "tools/call")
            .with_params(json!({ "name": "echo", "arguments": { "message": "hello" } }));
        let response = server.handle_request(request).await.expect("response");
        let result = response.result.expect("result");
        assert!(result.get("isError").is_none());
        assert!(
            result["content"][0]["text"]
                .as_str()
                .expect("text")
                .contains("hello")
        );
    }

    #[tokio::test]
    async fn test_ping() {
        let server = default_server();
        let response = server
            .handle_request(JsonRpcRequest::new(1i64, "ping"))
            .await
            .expect("response");
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_method_not_found() {
        let server = default_server();
        let response = server
            .handle_request(JsonRpcRequest::new(1i64, "nonexistent/method"))
            .await
            .expect("response");
        assert_eq!(response.error.expect("error").code, -32601);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = default_server();
        let response = server
            .handle_request(JsonRpcRequest::notification("notifications/initialized"))
            .await;
        assert!(response.is_none());
    }
}
