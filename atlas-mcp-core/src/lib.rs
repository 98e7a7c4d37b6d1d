//! # atlas-mcp-core - Session-oriented MCP server for Jira and Confluence
//!
//! Exposes Jira issue/project and Confluence space/page/comment operations as
//! schema-declared MCP tools behind a streamable HTTP transport:
//!
//! - **Redaction engine**: ordered, structure-aware masking of sensitive
//!   content before any tool result leaves the process
//! - **Tool access policy**: read-only mode and explicit allow-list over a
//!   single declarative tool table
//! - **Response envelopes**: uniform success/error wrapping with
//!   depth-bounded serialization
//! - **Session registry**: concurrency-safe lifecycle management for the
//!   multiplexed HTTP transport
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use atlas_mcp_core::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     atlas_mcp_core::mcp::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod mcp;
pub mod policy;
pub mod redact;
pub mod services;
pub mod session;
pub mod tools;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{AppConfig, AuthMethod};
    pub use crate::envelope::{build_error, build_result, safe_stringify};
    pub use crate::error::{AtlasError, Result};
    pub use crate::mcp::{
        AppState, ContentBlock, JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer,
        McpTool, RequestId, SERVER_NAME, ServerInfo, ToolCallParams, ToolCallResult, router,
        serve,
    };
    pub use crate::policy::{enabled_tool_names, enabled_tools, is_tool_enabled};
    pub use crate::redact::{redact_text, redact_value};
    pub use crate::services::{ConfluenceService, JiraService, Services};
    pub use crate::session::{SessionEvent, SessionHandle, SessionRegistry, SessionState};
    pub use crate::tools::{
        ArgKind, ArgSpec, ToolAccess, ToolGroup, ToolSpec, all_tools, find_tool, validate_args,
    };
}
