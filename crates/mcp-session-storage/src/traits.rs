//! Session Storage Trait and Implementations
//!
//! This module provides the core SessionStorage trait abstraction that enables
//! pluggable session backends for different deployment scenarios. Only the
//! in-memory backend ships today; the trait is deliberately backend-agnostic
//! so a persistent implementation (SQLite, Postgres, ...) can be added later
//! without touching dispatcher or transport code.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::SystemTime;
use uuid::Uuid;

use mcp_protocol::{ClientCapabilities, ServerCapabilities};

use crate::event_id;

/// Comprehensive session information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Unique session identifier (UUID v7 for temporal ordering)
    pub session_id: String,
    /// Client capabilities negotiated during initialization
    pub client_capabilities: Option<ClientCapabilities>,
    /// Server capabilities provided during initialization
    pub server_capabilities: Option<ServerCapabilities>,
    /// Session state key-value store
    pub state: HashMap<String, Value>,
    /// Session creation timestamp (Unix millis)
    pub created_at: u64,
    /// Last activity timestamp (Unix millis)
    pub last_activity: u64,
    /// Whether session has completed MCP initialization
    pub is_initialized: bool,
    /// Session metadata (connection info, user agent, etc.)
    pub metadata: HashMap<String, Value>,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionInfo {
    /// Create a new session with UUID v7 for temporal ordering
    pub fn new() -> Self {
        let now = chrono::Utc::now().timestamp_millis() as u64;
        Self {
            session_id: Uuid::now_v7().to_string(),
            client_capabilities: None,
            server_capabilities: None,
            state: HashMap::new(),
            created_at: now,
            last_activity: now,
            is_initialized: false,
            metadata: HashMap::new(),
        }
    }

    /// Create session with specific ID (for testing)
    pub fn with_id(session_id: String) -> Self {
        let now = chrono::Utc::now().timestamp_millis() as u64;
        Self {
            session_id,
            client_capabilities: None,
            server_capabilities: None,
            state: HashMap::new(),
            created_at: now,
            last_activity: now,
            is_initialized: false,
            metadata: HashMap::new(),
        }
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity = chrono::Utc::now().timestamp_millis() as u64;
    }

    /// Check if session is expired based on timeout
    pub fn is_expired(&self, timeout_minutes: u64) -> bool {
        let now = chrono::Utc::now().timestamp_millis() as u64;
        let timeout_millis = timeout_minutes * 60 * 1000;
        now - self.last_activity > timeout_millis
    }
}

/// A single buffered SSE event belonging to one stream within a session.
///
/// `id` is the composite `"<seq>#<streamId>"` form handed to clients as the
/// SSE `id:` field and accepted back as `Last-Event-ID`; `seq` is the raw
/// per-stream sequence used for buffer trimming and replay comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseEvent {
    /// Composite event ID (`"<seq>#<streamId>"`).
    pub id: String,
    /// Per-stream monotonic sequence number.
    pub seq: u64,
    /// Stream this event belongs to.
    pub stream_id: String,
    /// Event timestamp (Unix millis)
    pub timestamp: u64,
    /// Event type for client-side filtering
    pub event_type: String,
    /// Event data payload
    pub data: Value,
    /// Retry timeout in milliseconds (optional)
    pub retry: Option<u32>,
}

impl SseEvent {
    /// Format as SSE message for HTTP response.
    ///
    /// MCP Inspector and the official TypeScript SDK only process SSE events
    /// with no event name or "message". Custom event names are discarded.
    /// We use "message" for all JSON-RPC notifications to ensure compatibility.
    pub fn format(&self) -> String {
        let mut result = String::new();

        result.push_str(&format!("id: {}\n", self.id));

        if self.event_type == "ping" || self.event_type == "keepalive" {
            // Omit event line for keepalives (default event type)
        } else {
            result.push_str("event: message\n");
        }

        if let Ok(data_str) = serde_json::to_string(&self.data) {
            result.push_str(&format!("data: {}\n", data_str));
        } else {
            result.push_str("data: {}\n");
        }

        if let Some(retry) = self.retry {
            result.push_str(&format!("retry: {}\n", retry));
        }

        result.push('\n');
        result
    }
}

/// Core trait for session storage backends
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Error type for storage operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Get the backend name for logging and debugging
    fn backend_name(&self) -> &'static str;

    // ============================================================================
    // Session Management
    // ============================================================================

    /// Create a new session with automatically generated UUID v7
    ///
    /// **USE THIS METHOD** for:
    /// - Production code
    /// - Normal server operations
    /// - Tests that don't need specific session IDs
    async fn create_session(
        &self,
        capabilities: ServerCapabilities,
    ) -> Result<SessionInfo, Self::Error>;

    /// Create session with a specific session ID
    ///
    /// **ONLY USE THIS METHOD** for tests and migrations that need a
    /// predictable session ID; production code should use
    /// `create_session()` and let the backend assign one.
    async fn create_session_with_id(
        &self,
        session_id: String,
        capabilities: ServerCapabilities,
    ) -> Result<SessionInfo, Self::Error>;

    /// Returns whether a session with this ID currently exists.
    async fn has_session(&self, session_id: &str) -> Result<bool, Self::Error> {
        Ok(self.get_session(session_id).await?.is_some())
    }

    /// Get session by ID
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionInfo>, Self::Error>;

    /// Update entire session info
    async fn update_session(&self, session_info: SessionInfo) -> Result<(), Self::Error>;

    /// Update session state value
    async fn set_session_state(
        &self,
        session_id: &str,
        key: &str,
        value: Value,
    ) -> Result<(), Self::Error>;

    /// Get session state value
    async fn get_session_state(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<Value>, Self::Error>;

    /// Remove session state value
    async fn remove_session_state(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<Value>, Self::Error>;

    /// Delete session completely, including all buffered events
    async fn delete_session(&self, session_id: &str) -> Result<bool, Self::Error>;

    /// List all session IDs
    async fn list_sessions(&self) -> Result<Vec<String>, Self::Error>;

    // ============================================================================
    // Event Management (for SSE resumability)
    // ============================================================================

    /// Appends an event to `stream_id`'s buffer within `session_id`,
    /// allocating the next sequence number for that stream and FIFO-trimming
    /// the buffer to the backend's configured capacity.
    ///
    /// Returns `Ok(None)` if the session does not exist (the caller should
    /// treat this as "nothing to stream to"; it is not an error).
    async fn append_event(
        &self,
        session_id: &str,
        stream_id: &str,
        event_type: String,
        data: Value,
    ) -> Result<Option<SseEvent>, Self::Error>;

    /// Replays events for resumption from a `Last-Event-ID` header.
    ///
    /// Parses `last_event_id` into `(last_seq, stream_id)` and returns every
    /// buffered event on that stream with `seq > last_seq`, in order. An
    /// unparseable ID or an unknown/expired stream yields an empty result
    /// rather than an error — replay is best-effort.
    async fn replay(
        &self,
        session_id: &str,
        last_event_id: &str,
    ) -> Result<Vec<SseEvent>, Self::Error>;

    // ============================================================================
    // Cleanup and Maintenance
    // ============================================================================

    /// Remove expired sessions (returns list of removed session IDs)
    async fn expire_sessions(&self, older_than: SystemTime) -> Result<Vec<String>, Self::Error>;

    /// Get session count for monitoring
    async fn session_count(&self) -> Result<usize, Self::Error>;

    /// Get total buffered event count across all sessions and streams
    async fn event_count(&self) -> Result<usize, Self::Error>;

    /// Perform maintenance tasks (compaction, cleanup, etc.)
    async fn maintenance(&self) -> Result<(), Self::Error>;
}

/// Result type for session storage operations
pub type SessionResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Unified error type for all session storage backends
#[derive(Debug, thiserror::Error)]
pub enum SessionStorageError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Maximum sessions limit reached: {0}")]
    MaxSessionsReached(usize),

    #[error("Maximum events limit reached: {0}")]
    MaxEventsReached(usize),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid session data: {0}")]
    InvalidData(String),

    #[error("Generic storage error: {0}")]
    Generic(String),
}

impl From<serde_json::Error> for SessionStorageError {
    fn from(err: serde_json::Error) -> Self {
        SessionStorageError::SerializationError(err.to_string())
    }
}

impl From<crate::in_memory::InMemoryError> for SessionStorageError {
    fn from(err: crate::in_memory::InMemoryError) -> Self {
        match err {
            crate::in_memory::InMemoryError::SessionNotFound(id) => {
                SessionStorageError::SessionNotFound(id)
            }
            crate::in_memory::InMemoryError::MaxSessionsReached(limit) => {
                SessionStorageError::MaxSessionsReached(limit)
            }
            crate::in_memory::InMemoryError::SerializationError(e) => {
                SessionStorageError::SerializationError(e.to_string())
            }
        }
    }
}

/// Type alias for boxed session storage trait object with unified error type
pub type BoxedSessionStorage = dyn SessionStorage<Error = SessionStorageError>;

/// Convenience trait for creating session storage instances
pub trait SessionStorageBuilder {
    type Storage: SessionStorage;
    type Config;
    type Error: std::error::Error + Send + Sync + 'static;

    fn build(config: Self::Config) -> Result<Self::Storage, Self::Error>;
}

/// Re-exported so backends can build composite IDs without depending on the
/// codec module directly.
pub use event_id::{decode as decode_event_id, encode as encode_event_id};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_info_creation() {
        let session = SessionInfo::new();
        assert!(!session.session_id.is_empty());
        assert!(!session.is_initialized);
        assert!(session.state.is_empty());
    }

    #[test]
    fn test_session_expiration() {
        let mut session = SessionInfo::new();
        assert!(!session.is_expired(30)); // 30 minute timeout

        // Simulate old session
        session.last_activity = chrono::Utc::now().timestamp_millis() as u64 - (31 * 60 * 1000);
        assert!(session.is_expired(30));
    }

    #[test]
    fn test_sse_event_formatting() {
        let event = SseEvent {
            id: encode_event_id(123, "req-1"),
            seq: 123,
            stream_id: "req-1".to_string(),
            timestamp: 1234567890,
            event_type: "data".to_string(),
            data: serde_json::json!({"message": "test"}),
            retry: Some(1000),
        };

        let formatted = event.format();
        assert!(formatted.contains("id: 123#req-1"));
        assert!(formatted.contains("event: message"));
        assert!(formatted.contains("retry: 1000"));
        assert!(formatted.contains("data: {\"message\":\"test\"}"));
    }
}
