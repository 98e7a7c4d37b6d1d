//! Model Context Protocol server
//!
//! JSON-RPC 2.0 over a streamable HTTP transport. Each session gets its own
//! [`server::McpServer`] bound to the shared service clients; the transport
//! resolves sessions through the [`crate::session::SessionRegistry`] before
//! any handler work happens.

pub mod http;
pub mod protocol;
pub mod server;

pub use http::{AppState, router, serve};
pub use protocol::*;
pub use server::{McpServer, SERVER_NAME};
