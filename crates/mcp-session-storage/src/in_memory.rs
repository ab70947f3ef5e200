//! In-Memory Session Storage Implementation
//!
//! This implementation stores all session data in memory using Arc<RwLock<>>
//! for thread safety. Suitable for:
//! - Development and testing
//! - Single-instance deployments with session persistence not required
//! - High-performance scenarios where sessions are short-lived

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use mcp_protocol::ServerCapabilities;

use crate::event_id;
use crate::{SessionInfo, SessionStorage, SessionStorageError, SseEvent};

/// Per-stream ring buffer: a monotonic sequence counter plus the
/// FIFO-trimmed buffer of events produced on that stream.
#[derive(Debug)]
struct StreamBuffer {
    next_seq: u64,
    events: VecDeque<SseEvent>,
}

impl Default for StreamBuffer {
    /// Sequence numbers are 1-based (`EventId` requires `seq >= 1`), so the
    /// first event allocated on a fresh stream must get `seq == 1`.
    fn default() -> Self {
        Self {
            next_seq: 1,
            events: VecDeque::new(),
        }
    }
}

/// All of a session's streams, keyed by stream ID.
#[derive(Debug, Default)]
struct SessionEvents {
    streams: HashMap<String, StreamBuffer>,
}

/// In-memory storage for sessions and events (SSE compliant)
#[derive(Debug, Clone)]
pub struct InMemorySessionStorage {
    sessions: Arc<RwLock<HashMap<String, SessionInfo>>>,
    events: Arc<RwLock<HashMap<String, SessionEvents>>>,
    config: InMemoryConfig,
}

/// Configuration for in-memory session storage
#[derive(Debug, Clone)]
pub struct InMemoryConfig {
    /// Maximum events buffered per stream before the oldest are dropped
    pub max_event_buffer_size: usize,
    /// Maximum sessions to keep (for memory management)
    pub max_sessions: usize,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            max_event_buffer_size: 1_000,
            max_sessions: 100_000,
        }
    }
}

/// Error type for in-memory storage operations
#[derive(Debug, thiserror::Error)]
pub enum InMemoryError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Maximum sessions limit reached: {0}")]
    MaxSessionsReached(usize),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl InMemorySessionStorage {
    /// Create new in-memory session storage with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryConfig::default())
    }

    /// Create new in-memory session storage with custom configuration
    pub fn with_config(config: InMemoryConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            events: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Get current statistics
    pub async fn stats(&self) -> InMemoryStats {
        let sessions = self.sessions.read().await;
        let events = self.events.read().await;

        let total_events = events
            .values()
            .flat_map(|s| s.streams.values())
            .map(|b| b.events.len())
            .sum();

        InMemoryStats {
            session_count: sessions.len(),
            total_event_count: total_events,
            max_event_buffer_size: self.config.max_event_buffer_size,
            max_sessions: self.config.max_sessions,
        }
    }
}

impl Default for InMemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for in-memory storage
#[derive(Debug, Clone)]
pub struct InMemoryStats {
    pub session_count: usize,
    pub total_event_count: usize,
    pub max_event_buffer_size: usize,
    pub max_sessions: usize,
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    type Error = SessionStorageError;

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }

    // ============================================================================
    // Session Management
    // ============================================================================

    async fn create_session(&self, capabilities: ServerCapabilities) -> Result<SessionInfo, Self::Error> {
        let mut sessions = self.sessions.write().await;

        if sessions.len() >= self.config.max_sessions {
            return Err(SessionStorageError::MaxSessionsReached(self.config.max_sessions));
        }

        let mut session = SessionInfo::new();
        session.server_capabilities = Some(capabilities);

        let session_id = session.session_id.clone();
        sessions.insert(session_id.clone(), session.clone());

        debug!("Created session: {}", session_id);
        Ok(session)
    }

    async fn create_session_with_id(&self, session_id: String, capabilities: ServerCapabilities) -> Result<SessionInfo, Self::Error> {
        let mut sessions = self.sessions.write().await;

        if sessions.len() >= self.config.max_sessions {
            return Err(SessionStorageError::MaxSessionsReached(self.config.max_sessions));
        }

        let mut session = SessionInfo::with_id(session_id.clone());
        session.server_capabilities = Some(capabilities);

        sessions.insert(session_id.clone(), session.clone());

        debug!("Created session with ID: {}", session_id);
        Ok(session)
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<SessionInfo>, Self::Error> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn update_session(&self, session_info: SessionInfo) -> Result<(), Self::Error> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_info.session_id.clone(), session_info);
        Ok(())
    }

    async fn set_session_state(&self, session_id: &str, key: &str, value: serde_json::Value) -> Result<(), Self::Error> {
        let mut sessions = self.sessions.write().await;

        if let Some(session) = sessions.get_mut(session_id) {
            session.state.insert(key.to_string(), value);
            session.touch();
            Ok(())
        } else {
            Err(SessionStorageError::SessionNotFound(session_id.to_string()))
        }
    }

    async fn get_session_state(&self, session_id: &str, key: &str) -> Result<Option<serde_json::Value>, Self::Error> {
        let sessions = self.sessions.read().await;

        if let Some(session) = sessions.get(session_id) {
            Ok(session.state.get(key).cloned())
        } else {
            Err(SessionStorageError::SessionNotFound(session_id.to_string()))
        }
    }

    async fn remove_session_state(&self, session_id: &str, key: &str) -> Result<Option<serde_json::Value>, Self::Error> {
        let mut sessions = self.sessions.write().await;

        if let Some(session) = sessions.get_mut(session_id) {
            let removed = session.state.remove(key);
            session.touch();
            Ok(removed)
        } else {
            Err(SessionStorageError::SessionNotFound(session_id.to_string()))
        }
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool, Self::Error> {
        let mut sessions = self.sessions.write().await;
        let mut events = self.events.write().await;

        let removed = sessions.remove(session_id).is_some();

        if removed {
            events.remove(session_id);
            debug!("Deleted session and all associated data: {}", session_id);
        }

        Ok(removed)
    }

    async fn list_sessions(&self) -> Result<Vec<String>, Self::Error> {
        let sessions = self.sessions.read().await;
        Ok(sessions.keys().cloned().collect())
    }

    // ============================================================================
    // Event Management
    // ============================================================================

    async fn append_event(
        &self,
        session_id: &str,
        stream_id: &str,
        event_type: String,
        data: serde_json::Value,
    ) -> Result<Option<SseEvent>, Self::Error> {
        // appendEvent is a no-op (returns None) for sessions that don't exist,
        // matching replay's best-effort semantics rather than erroring.
        if !self.sessions.read().await.contains_key(session_id) {
            return Ok(None);
        }

        let mut events = self.events.write().await;
        let session_events = events.entry(session_id.to_string()).or_default();
        let buffer = session_events.streams.entry(stream_id.to_string()).or_default();

        let seq = buffer.next_seq;
        buffer.next_seq += 1;

        let event = SseEvent {
            id: event_id::encode(seq, stream_id),
            seq,
            stream_id: stream_id.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis() as u64,
            event_type,
            data,
            retry: None,
        };

        buffer.events.push_back(event.clone());
        while buffer.events.len() > self.config.max_event_buffer_size {
            buffer.events.pop_front();
        }

        debug!("Appended event: session={}, stream={}, seq={}", session_id, stream_id, seq);
        Ok(Some(event))
    }

    async fn replay(&self, session_id: &str, last_event_id: &str) -> Result<Vec<SseEvent>, Self::Error> {
        let Some((last_seq, stream_id)) = event_id::decode(last_event_id) else {
            return Ok(Vec::new());
        };

        let events = self.events.read().await;
        let Some(session_events) = events.get(session_id) else {
            return Ok(Vec::new());
        };
        let Some(buffer) = session_events.streams.get(stream_id) else {
            return Ok(Vec::new());
        };

        Ok(buffer
            .events
            .iter()
            .filter(|event| event.seq > last_seq)
            .cloned()
            .collect())
    }

    // ============================================================================
    // Cleanup and Maintenance
    // ============================================================================

    async fn expire_sessions(&self, older_than: SystemTime) -> Result<Vec<String>, Self::Error> {
        let mut sessions = self.sessions.write().await;
        let mut events = self.events.write().await;

        let cutoff_millis = older_than
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let mut expired_sessions = Vec::new();

        sessions.retain(|session_id, session_info| {
            if session_info.last_activity < cutoff_millis {
                expired_sessions.push(session_id.clone());
                false
            } else {
                true
            }
        });

        for session_id in &expired_sessions {
            events.remove(session_id);
        }

        if !expired_sessions.is_empty() {
            info!("Expired {} sessions", expired_sessions.len());
        }

        Ok(expired_sessions)
    }

    async fn session_count(&self) -> Result<usize, Self::Error> {
        let sessions = self.sessions.read().await;
        Ok(sessions.len())
    }

    async fn event_count(&self) -> Result<usize, Self::Error> {
        let events = self.events.read().await;
        let total = events
            .values()
            .flat_map(|s| s.streams.values())
            .map(|b| b.events.len())
            .sum();
        Ok(total)
    }

    async fn maintenance(&self) -> Result<(), Self::Error> {
        // Buffers self-trim on append; nothing to sweep here.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_protocol::ServerCapabilities;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let storage = InMemorySessionStorage::new();

        let session = storage.create_session(ServerCapabilities::default()).await.unwrap();
        let session_id = session.session_id.clone();

        let retrieved = storage.get_session(&session_id).await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().session_id, session_id);

        let deleted = storage.delete_session(&session_id).await.unwrap();
        assert!(deleted);

        let not_found = storage.get_session(&session_id).await.unwrap();
        assert!(not_found.is_none());
    }

    #[tokio::test]
    async fn test_session_state() {
        let storage = InMemorySessionStorage::new();
        let session = storage.create_session(ServerCapabilities::default()).await.unwrap();
        let session_id = session.session_id.clone();

        let value = serde_json::json!({"test": "value"});
        storage.set_session_state(&session_id, "test_key", value.clone()).await.unwrap();

        let retrieved = storage.get_session_state(&session_id, "test_key").await.unwrap();
        assert_eq!(retrieved, Some(value));

        let removed = storage.remove_session_state(&session_id, "test_key").await.unwrap();
        assert_eq!(removed, Some(serde_json::json!({"test": "value"})));

        let not_found = storage.get_session_state(&session_id, "test_key").await.unwrap();
        assert_eq!(not_found, None);
    }

    #[tokio::test]
    async fn test_append_and_replay_single_stream() {
        let storage = InMemorySessionStorage::new();
        let session = storage.create_session(ServerCapabilities::default()).await.unwrap();
        let session_id = session.session_id.clone();

        let e1 = storage
            .append_event(&session_id, "req-1", "message".to_string(), serde_json::json!({"n": 1}))
            .await
            .unwrap()
            .unwrap();
        let e2 = storage
            .append_event(&session_id, "req-1", "message".to_string(), serde_json::json!({"n": 2}))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(e1.seq, 1);
        assert_eq!(e2.seq, 2);

        let replayed = storage.replay(&session_id, &e1.id).await.unwrap();
        assert_eq!(replayed.len(), 1);
        assert_eq!(replayed[0].id, e2.id);
    }

    #[tokio::test]
    async fn test_replay_is_scoped_to_originating_stream() {
        let storage = InMemorySessionStorage::new();
        let session = storage.create_session(ServerCapabilities::default()).await.unwrap();
        let session_id = session.session_id.clone();

        storage
            .append_event(&session_id, "req-a", "message".to_string(), serde_json::json!({"a": 1}))
            .await
            .unwrap();
        let b1 = storage
            .append_event(&session_id, "req-b", "message".to_string(), serde_json::json!({"b": 1}))
            .await
            .unwrap()
            .unwrap();
        let b2 = storage
            .append_event(&session_id, "req-b", "message".to_string(), serde_json::json!({"b": 2}))
            .await
            .unwrap()
            .unwrap();

        let replayed = storage.replay(&session_id, &b1.id).await.unwrap();
        assert_eq!(replayed.len(), 1);
        assert_eq!(replayed[0].id, b2.id);
    }

    #[tokio::test]
    async fn test_append_event_for_unknown_session_is_none() {
        let storage = InMemorySessionStorage::new();
        let result = storage
            .append_event("no-such-session", "req-1", "message".to_string(), serde_json::json!({}))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_replay_with_malformed_or_unknown_id_is_empty() {
        let storage = InMemorySessionStorage::new();
        let session = storage.create_session(ServerCapabilities::default()).await.unwrap();
        let session_id = session.session_id.clone();

        assert!(storage.replay(&session_id, "garbage").await.unwrap().is_empty());
        assert!(storage.replay(&session_id, "5#unknown-stream").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_event_buffer_fifo_trim() {
        let config = InMemoryConfig { max_event_buffer_size: 2, ..Default::default() };
        let storage = InMemorySessionStorage::with_config(config);
        let session = storage.create_session(ServerCapabilities::default()).await.unwrap();
        let session_id = session.session_id.clone();

        for n in 0..5 {
            storage
                .append_event(&session_id, "req-1", "message".to_string(), serde_json::json!({"n": n}))
                .await
                .unwrap();
        }

        // Sequence numbers are 1-based, so requesting everything after seq 1
        // still only returns what the FIFO trim left in the buffer.
        let replayed = storage.replay(&session_id, &event_id::encode(1, "req-1")).await.unwrap();
        // Only the last 2 events survive the FIFO trim (seq 4 and 5).
        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed[0].seq, 4);
        assert_eq!(replayed[1].seq, 5);
    }
}
