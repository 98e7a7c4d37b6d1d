//! Session registry for the multiplexed HTTP transport
//!
//! Each session binds a server-generated opaque identifier to a live
//! per-session MCP handler and an outbound event channel. The registry owns
//! every session for its lifetime and exposes exactly three operations:
//! insert-if-absent, get, and remove. No invariant spans more than one map
//! mutation, so a single read-write lock around the map suffices; operations
//! on different identifiers never block on each other's tool work.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use crate::error::{AtlasError, Result};
use crate::mcp::server::McpServer;

/// Lifecycle state of a session; `Closed` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Active,
    Closed,
}

/// Outbound event on a session's server-to-client channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A serialized server-initiated message
    Message(String),
    /// The session was torn down; streams terminate on receipt
    Closed,
}

/// A live session: identifier, bound handler, and event channel.
///
/// The identifier is generated server-side at construction and is immutable
/// for the life of the session.
pub struct SessionHandle {
    id: String,
    server: Arc<McpServer>,
    state: RwLock<SessionState>,
    events: broadcast::Sender<SessionEvent>,
    created_at: DateTime<Utc>,
}

impl SessionHandle {
    pub fn new(server: Arc<McpServer>) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            id: Uuid::new_v4().to_string(),
            server,
            state: RwLock::new(SessionState::Uninitialized),
            events,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn server(&self) -> &Arc<McpServer> {
        &self.server
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// Mark the session active after a successful handshake
    pub async fn activate(&self) {
        let mut state = self.state.write().await;
        if *state == SessionState::Uninitialized {
            *state = SessionState::Active;
        }
    }

    /// Transition to the terminal state and end any open event streams
    pub async fn close(&self) {
        *self.state.write().await = SessionState::Closed;
        let _ = self.events.send(SessionEvent::Closed);
    }

    /// Subscribe to server-initiated events for the GET stream
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// Process-wide map of live sessions
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session; at most one live session per identifier
    pub async fn insert_if_absent(&self, handle: Arc<SessionHandle>) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(handle.id()) {
            return Err(AtlasError::Session(format!(
                "session '{}' already registered",
                handle.id()
            )));
        }
        sessions.insert(handle.id().to_string(), handle);
        Ok(())
    }

    /// Resolve a live session by identifier
    pub async fn get(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Remove a session; subsequent lookups of the identifier fail
    pub async fn remove(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
