//! Streamable HTTP transport
//!
//! Session framing per the MCP streamable HTTP contract:
//! - `POST /mcp` reuses the session named by the `mcp-session-id` header, or
//!   creates one for an initialization request carrying no header; anything
//!   else is a protocol error rejected before any handler work.
//! - `GET /mcp` opens the session's server-to-client SSE stream.
//! - `DELETE /mcp` tears the session down.
//! - `GET /health` reports the currently enabled tool lists per group.
//!
//! Tool-level failures never fail the HTTP exchange; only protocol-level
//! errors produce 4xx/5xx responses.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::StreamExt;
use serde_json::json;
use tokio_stream::wrappers::BroadcastStream;

use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
use super::server::{McpServer, SERVER_NAME};
use crate::config::AppConfig;
use crate::error::Result;
use crate::policy;
use crate::services::Services;
use crate::session::{SessionEvent, SessionHandle, SessionRegistry};
use crate::tools::ToolGroup;

/// Header carrying the session identifier
pub const SESSION_ID_HEADER: &str = "mcp-session-id";

/// Shared state behind the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<Services>,
    pub registry: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, services: Arc<Services>) -> Self {
        Self {
            config,
            services,
            registry: Arc::new(SessionRegistry::new()),
        }
    }
}

/// Build the transport router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/mcp", get(get_mcp).post(post_mcp).delete(delete_mcp))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind and run the HTTP transport until a shutdown signal arrives
pub async fn serve(config: AppConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let services = Arc::new(Services::from_config(&config)?);
    let state = AppState::new(Arc::new(config), services);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("MCP Atlassian server running on http://{addr}");
    tracing::info!("Health check available at http://{addr}/health");
    tracing::info!("MCP endpoint available at http://{addr}/mcp");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutting down Atlassian MCP server");
}

async fn post_mcp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let request: JsonRpcRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(
                    RequestId::Null,
                    JsonRpcError::parse_error(),
                )),
            )
                .into_response();
        }
    };

    match session_header(&headers) {
        // Reuse an existing session.
        Some(session_id) => match state.registry.get(&session_id).await {
            Some(handle) => dispatch(handle.server(), request).await,
            None => bad_session(),
        },
        // No session header: only an initialization request may proceed.
        None if request.is_initialize() => initialize_session(&state, request).await,
        None => bad_session(),
    }
}

async fn get_mcp(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session_id) = session_header(&headers) else {
        return invalid_session();
    };
    let Some(handle) = state.registry.get(&session_id).await else {
        return invalid_session();
    };

    // Server-to-client stream; ends when the session closes.
    let stream = BroadcastStream::new(handle.subscribe())
        .take_while(|event| {
            std::future::ready(matches!(event, Ok(SessionEvent::Message(_))))
        })
        .filter_map(|event| {
            std::future::ready(match event {
                Ok(SessionEvent::Message(message)) => {
                    Some(Ok::<Event, Infallible>(Event::default().data(message)))
                }
                _ => None,
            })
        });

    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

async fn delete_mcp(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session_id) = session_header(&headers) else {
        return invalid_session();
    };
    match state.registry.remove(&session_id).await {
        Some(handle) => {
            handle.close().await;
            tracing::info!(session = %session_id, "MCP session closed");
            StatusCode::OK.into_response()
        }
        None => invalid_session(),
    }
}

async fn health(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "ok",
        "service": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "enabled_tools": {
            "confluence": policy::enabled_tool_names(&state.config, ToolGroup::Confluence),
            "jira": policy::enabled_tool_names(&state.config, ToolGroup::Jira),
        },
    }))
    .into_response()
}

/// Create a session for an initialization request and run the handshake.
///
/// The session is registered, and its identifier returned to the caller,
/// only after a successful handshake.
async fn initialize_session(state: &AppState, request: JsonRpcRequest) -> Response {
    let server = Arc::new(McpServer::new(&state.config, Arc::clone(&state.services)));
    let handle = Arc::new(SessionHandle::new(server));

    let Some(response) = handle.server().handle_request(request).await else {
        // An initialize notification is not a valid handshake.
        return (
            StatusCode::BAD_REQUEST,
            Json(JsonRpcResponse::error(
                RequestId::Null,
                JsonRpcError::invalid_request(),
            )),
        )
            .into_response();
    };

    if response.error.is_some() {
        return (StatusCode::OK, Json(response)).into_response();
    }

    handle.activate().await;
    if let Err(e) = state.registry.insert_if_absent(Arc::clone(&handle)).await {
        tracing::error!("Failed to register session: {e}");
        return internal_error();
    }
    tracing::info!(session = handle.id(), "New MCP session initialized");

    let mut http_response = (StatusCode::OK, Json(response)).into_response();
    if let Ok(value) = HeaderValue::from_str(handle.id()) {
        http_response.headers_mut().insert(SESSION_ID_HEADER, value);
    }
    http_response
}

async fn dispatch(server: &Arc<McpServer>, request: JsonRpcRequest) -> Response {
    match server.handle_request(request).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        // Notifications expect no response body.
        None => StatusCode::ACCEPTED.into_response(),
    }
}

fn session_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn bad_session() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(JsonRpcResponse::error(
            RequestId::Null,
            JsonRpcError::bad_session(),
        )),
    )
        .into_response()
}

fn invalid_session() -> Response {
    (StatusCode::BAD_REQUEST, "Invalid or missing session ID").into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(JsonRpcResponse::error(
            RequestId::Null,
            JsonRpcError::internal_error("Internal server error"),
        )),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header::CONTENT_TYPE};
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_router(config: AppConfig) -> Router {
        let services = Arc::new(Services::from_config(&config).expect("services should build"));
        router(AppState::new(Arc::new(config), services))
    }

    fn initialize_body() -> String {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": super::super::protocol::MCP_PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": { "name": "test-client", "version": "1.0" }
            }
        })
        .to_string()
    }

    fn post_request(body: String, session_id: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header(CONTENT_TYPE, "application/json");
        if let Some(id) = session_id {
            builder = builder.header(SESSION_ID_HEADER, id);
        }
        builder.body(Body::from(body)).expect("request builds")
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    async fn open_session(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(post_request(initialize_body(), None))
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(SESSION_ID_HEADER)
            .expect("session header present")
            .to_str()
            .expect("header is ascii")
            .to_string()
    }

    #[tokio::test]
    async fn test_initialize_creates_session() {
        let app = test_router(AppConfig::default());
        let response = app
            .clone()
            .oneshot(post_request(initialize_body(), None))
            .await
            .expect("request succeeds");

        assert_eq!(response.status(), StatusCode::OK);
        let session_id = response
            .headers()
            .get(SESSION_ID_HEADER)
            .expect("session header present")
            .to_str()
            .expect("header is ascii")
            .to_string();
        assert!(!session_id.is_empty());

        let body = body_json(response).await;
        assert_eq!(
            body["result"]["protocolVersion"],
            super::super::protocol::MCP_PROTOCOL_VERSION
        );
    }

    #[tokio::test]
    async fn test_session_reuse_routes_to_same_handler() {
        let app = test_router(AppConfig::default());
        let session_id = open_session(&app).await;

        let list = json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }).to_string();
        let response = app
            .clone()
            .oneshot(post_request(list, Some(&session_id)))
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let tools = body["result"]["tools"].as_array().expect("tools array");
        assert!(!tools.is_empty());
    }

    #[tokio::test]
    async fn test_request_without_session_rejected_before_any_tool() {
        let app = test_router(AppConfig::default());
        let call = json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/call",
            "params": { "name": "get_jira_issue", "arguments": { "issueKey": "PROJ-1" } }
        })
        .to_string();
        let response = app
            .clone()
            .oneshot(post_request(call, None))
            .await
            .expect("request succeeds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32000);
        assert_eq!(
            body["error"]["message"],
            "Bad Request: No valid session ID provided"
        );
    }

    #[tokio::test]
    async fn test_unknown_session_rejected() {
        let app = test_router(AppConfig::default());
        let list = json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }).to_string();
        let response = app
            .clone()
            .oneshot(post_request(list, Some("no-such-session")))
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_closes_session() {
        let app = test_router(AppConfig::default());
        let session_id = open_session(&app).await;

        let delete = Request::builder()
            .method("DELETE")
            .uri("/mcp")
            .header(SESSION_ID_HEADER, session_id.as_str())
            .body(Body::empty())
            .expect("request builds");
        let response = app.clone().oneshot(delete).await.expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);

        // The identifier is unknown afterwards.
        let list = json!({ "jsonrpc": "2.0", "id": 3, "method": "tools/list" }).to_string();
        let response = app
            .clone()
            .oneshot(post_request(list, Some(&session_id)))
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_notification_returns_accepted() {
        let app = test_router(AppConfig::default());
        let session_id = open_session(&app).await;

        let notification =
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string();
        let response = app
            .clone()
            .oneshot(post_request(notification, Some(&session_id)))
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_get_opens_event_stream_for_known_session() {
        let app = test_router(AppConfig::default());
        let session_id = open_session(&app).await;

        let request = Request::builder()
            .method("GET")
            .uri("/mcp")
            .header(SESSION_ID_HEADER, session_id.as_str())
            .body(Body::empty())
            .expect("request builds");
        let response = app.clone().oneshot(request).await.expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);

        // Assert on the head only; the stream stays open until close.
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .expect("content type")
            .to_str()
            .expect("header is ascii");
        assert!(content_type.starts_with("text/event-stream"));
    }

    #[tokio::test]
    async fn test_get_without_session_rejected() {
        let app = test_router(AppConfig::default());
        let request = Request::builder()
            .method("GET")
            .uri("/mcp")
            .body(Body::empty())
            .expect("request builds");
        let response = app.clone().oneshot(request).await.expect("request succeeds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        assert_eq!(&bytes[..], b"Invalid or missing session ID");
    }

    #[tokio::test]
    async fn test_health_reports_enabled_tools() {
        let app = test_router(AppConfig::default());
        let request = Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .expect("request builds");
        let response = app.clone().oneshot(request).await.expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], SERVER_NAME);
        assert!(!body["enabled_tools"]["jira"].as_array().expect("jira").is_empty());
        assert!(
            !body["enabled_tools"]["confluence"]
                .as_array()
                .expect("confluence")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_health_reflects_read_only_mode() {
        let config = AppConfig {
            read_only_mode: true,
            ..AppConfig::default()
        };
        let app = test_router(config);
        let request = Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .expect("request builds");
        let response = app.clone().oneshot(request).await.expect("request succeeds");
        let body = body_json(response).await;

        let jira = body["enabled_tools"]["jira"].as_array().expect("jira");
        assert!(jira.iter().any(|t| t == "get_jira_issue"));
        assert!(!jira.iter().any(|t| t == "jira_create_issue"));
    }

    #[tokio::test]
    async fn test_malformed_json_rpc_is_parse_error() {
        let app = test_router(AppConfig::default());
        let response = app
            .clone()
            .oneshot(post_request(json!({ "foo": 1 }).to_string(), None))
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32700);
    }
}
