//! Enhanced Stream Manager with MCP 2025-06-18 Resumability
//!
//! This module provides proper SSE stream management with:
//! - Composite event IDs (`"<seq>#<streamId>"`) for resumability
//! - Last-Event-ID header support, replayed against the originating stream
//! - Per-session event targeting (not broadcast to all)
//! - Event persistence and replay via `SessionStorage`
//! - Proper HTTP status codes and headers

use bytes::Bytes;
use futures::{Stream, StreamExt};
use http_body_util::{BodyExt, StreamBody};
use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, error, info, warn};

use mcp_session_storage::SseEvent;

/// Connection ID for tracking individual SSE streams. Also doubles as the
/// stream ID handed to the session store, except for the session's
/// standalone GET stream which always uses [`SESSION_STREAM_ID`].
pub type ConnectionId = String;
pub type SessionConnections = HashMap<ConnectionId, mpsc::Sender<SseEvent>>;
pub type ConnectionsMap = Arc<RwLock<HashMap<String, SessionConnections>>>;

/// Stream ID used for notifications that aren't scoped to a single
/// in-flight request (tool/resource/prompt list-changed, log messages) and
/// delivered over the session's standalone GET stream.
pub const SESSION_STREAM_ID: &str = "session";

/// Enhanced stream manager with resumability support (MCP spec compliant)
pub struct StreamManager {
    /// Session storage backend for persistence
    storage: Arc<mcp_session_storage::BoxedSessionStorage>,
    /// Per-session connections for real-time events (MCP compliant - no broadcasting)
    connections: ConnectionsMap,
    /// Per-session notification subscriptions (what notifications each session wants)
    subscriptions: Arc<RwLock<HashMap<String, HashSet<String>>>>,
    /// Configuration
    config: StreamConfig,
    /// Unique instance ID for debugging
    instance_id: String,
}

/// Configuration for stream management
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Channel buffer size for real-time broadcasting
    pub channel_buffer_size: usize,
    /// Maximum events to replay on reconnection
    pub max_replay_events: usize,
    /// Keep-alive interval in seconds
    pub keepalive_interval_seconds: u64,
    /// CORS configuration
    pub cors_origin: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 1000,
            max_replay_events: 100,
            keepalive_interval_seconds: 30,
            cors_origin: "*".to_string(),
        }
    }
}

/// SSE stream wrapper that formats events properly (MCP compliant - one connection per stream)
pub struct SseStream {
    /// Underlying event stream
    stream: Option<Pin<Box<dyn Stream<Item = SseEvent> + Send>>>,
    /// Session metadata
    session_id: String,
    /// Connection identifier (for MCP spec compliance)
    connection_id: ConnectionId,
}

impl SseStream {
    /// Get the session ID this stream belongs to
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Get the connection ID for this stream
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// Get stream identifier for logging (session + connection)
    pub fn stream_identifier(&self) -> String {
        format!("{}:{}", self.session_id, self.connection_id)
    }
}

impl Drop for SseStream {
    fn drop(&mut self) {
        debug!(
            "DROP: SseStream - session={}, connection={}",
            self.session_id, self.connection_id
        );
        if self.stream.is_some() {
            debug!("Stream still present during drop - this indicates early cleanup");
        } else {
            debug!("Stream was properly extracted before drop");
        }
    }
}

/// Error type for stream management
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Stream not found: session={0}, stream={1}")]
    StreamNotFound(String, String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Connection error: {0}")]
    ConnectionError(String),
    #[error("No connections available for session: {0}")]
    NoConnections(String),
    #[error("Session {0} not subscribed to notification type: {1}")]
    NotSubscribed(String, String),
    #[error("Connection already open for session={0}, connection={1}")]
    Conflict(String, String),
}

impl StreamManager {
    /// Create new stream manager with session storage backend
    pub fn new(storage: Arc<mcp_session_storage::BoxedSessionStorage>) -> Self {
        Self::with_config(storage, StreamConfig::default())
    }

    /// Create stream manager with custom configuration
    pub fn with_config(
        storage: Arc<mcp_session_storage::BoxedSessionStorage>,
        config: StreamConfig,
    ) -> Self {
        use uuid::Uuid;
        let instance_id = Uuid::now_v7().to_string();
        debug!("Creating StreamManager instance: {}", instance_id);
        Self {
            storage,
            connections: Arc::new(RwLock::new(HashMap::new())),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            config,
            instance_id,
        }
    }

    /// Handle SSE connection request with proper resumability.
    ///
    /// `last_event_id`, if present, is the opaque `"<seq>#<streamId>"` value
    /// from the `Last-Event-ID` header; events are replayed from whichever
    /// stream it names, not necessarily this new connection's own stream.
    pub async fn handle_sse_connection(
        &self,
        session_id: String,
        connection_id: ConnectionId,
        last_event_id: Option<String>,
    ) -> Result<
        Response<http_body_util::combinators::UnsyncBoxBody<Bytes, hyper::Error>>,
        StreamError,
    > {
        info!(
            "handle_sse_connection called: session={}, connection={}, last_event_id={:?}",
            session_id, connection_id, last_event_id
        );

        if self
            .storage
            .get_session(&session_id)
            .await
            .map_err(|e| StreamError::StorageError(e.to_string()))?
            .is_none()
        {
            return Err(StreamError::SessionNotFound(session_id));
        }

        let sse_stream = self
            .create_sse_stream(session_id.clone(), connection_id.clone(), last_event_id)
            .await?;

        let response = self.stream_to_response(sse_stream).await;

        debug!(
            "Created SSE connection: session={}, connection={}",
            session_id, connection_id
        );

        Ok(response)
    }

    /// Create SSE stream with resumability support (MCP compliant - no broadcast).
    ///
    /// New connections register under `SESSION_STREAM_ID` — the standalone
    /// GET stream is one logical stream per session, not per connection.
    async fn create_sse_stream(
        &self,
        session_id: String,
        connection_id: ConnectionId,
        last_event_id: Option<String>,
    ) -> Result<SseStream, StreamError> {
        let (sender, mut receiver) = mpsc::channel(self.config.channel_buffer_size);

        self.register_connection(&session_id, connection_id.clone(), sender)
            .await?;

        let storage = self.storage.clone();
        let session_id_clone = session_id.clone();
        let connection_id_clone = connection_id.clone();
        let config = self.config.clone();

        let combined_stream = async_stream::stream! {
            if let Some(last_event_id) = last_event_id {
                debug!(
                    "Replaying events after {} for session={}, connection={}",
                    last_event_id, session_id_clone, connection_id_clone
                );
                match storage.replay(&session_id_clone, &last_event_id).await {
                    Ok(events) => {
                        debug!("Found {} stored events to replay", events.len());
                        for event in events.into_iter().take(config.max_replay_events) {
                            yield event;
                        }
                    }
                    Err(e) => {
                        error!("Failed to replay events: {}", e);
                    }
                }
            }

            let mut keepalive_interval = tokio::time::interval(
                tokio::time::Duration::from_secs(config.keepalive_interval_seconds)
            );

            loop {
                tokio::select! {
                    event = receiver.recv() => {
                        match event {
                            Some(event) => {
                                debug!("Received event for connection {}: {}", connection_id_clone, event.event_type);
                                yield event;
                            },
                            None => {
                                debug!("Connection channel closed for session={}, connection={}", session_id_clone, connection_id_clone);
                                break;
                            }
                        }
                    },

                    _ = keepalive_interval.tick() => {
                        let keepalive_event = SseEvent {
                            id: format!("0#{connection_id_clone}"),
                            seq: 0,
                            stream_id: connection_id_clone.clone(),
                            timestamp: chrono::Utc::now().timestamp_millis() as u64,
                            event_type: "ping".to_string(),
                            data: serde_json::json!({"type": "keepalive"}),
                            retry: None,
                        };
                        yield keepalive_event;
                    }
                }
            }

            debug!("Cleaning up connection: session={}, connection={}", session_id_clone, connection_id_clone);
        };

        Ok(SseStream {
            stream: Some(Box::pin(combined_stream)),
            session_id,
            connection_id,
        })
    }

    /// Register a new connection for a session (MCP compliant).
    ///
    /// Rejects with [`StreamError::Conflict`] if a writer is already
    /// registered under `connection_id` — one writer per key, the existing
    /// writer is left untouched.
    async fn register_connection(
        &self,
        session_id: &str,
        connection_id: ConnectionId,
        sender: mpsc::Sender<SseEvent>,
    ) -> Result<(), StreamError> {
        let mut connections = self.connections.write().await;

        let session_connections = connections
            .entry(session_id.to_string())
            .or_insert_with(HashMap::new);

        if session_connections.contains_key(&connection_id) {
            return Err(StreamError::Conflict(
                session_id.to_string(),
                connection_id,
            ));
        }

        session_connections.insert(connection_id.clone(), sender);

        debug!(
            "[{}] Registered connection: session={}, connection={}, total_connections={}",
            self.instance_id,
            session_id,
            connection_id,
            session_connections.len()
        );

        Ok(())
    }

    /// Register a streaming connection to receive events for a session (public API for POST streaming)
    pub async fn register_streaming_connection(
        &self,
        session_id: &str,
        connection_id: ConnectionId,
        sender: mpsc::Sender<SseEvent>,
    ) -> Result<(), StreamError> {
        if self
            .storage
            .get_session(session_id)
            .await
            .map_err(|e| StreamError::StorageError(e.to_string()))?
            .is_none()
        {
            return Err(StreamError::SessionNotFound(session_id.to_string()));
        }

        self.register_connection(session_id, connection_id, sender)
            .await
    }

    /// Remove a connection when it's closed
    pub async fn unregister_connection(&self, session_id: &str, connection_id: &ConnectionId) {
        let mut connections = self.connections.write().await;

        if let Some(session_connections) = connections.get_mut(session_id)
            && session_connections.remove(connection_id).is_some()
        {
            debug!(
                "Unregistered connection: session={}, connection={}",
                session_id, connection_id
            );

            if session_connections.is_empty() {
                connections.remove(session_id);
                debug!("Removed empty session: {}", session_id);
            }
        }
    }

    /// Close all SSE connections for a session (useful for session termination)
    pub async fn close_session_connections(&self, session_id: &str) -> usize {
        let mut connections = self.connections.write().await;

        let closed_count = if let Some(session_connections) = connections.remove(session_id) {
            let count = session_connections.len();
            debug!(
                "Closed {} SSE connections for session: {}",
                count, session_id
            );
            count
        } else {
            0
        };

        self.clear_subscriptions(session_id).await;
        closed_count
    }

    /// Convert SSE stream to HTTP response with proper headers
    async fn stream_to_response(
        &self,
        mut sse_stream: SseStream,
    ) -> Response<http_body_util::combinators::UnsyncBoxBody<Bytes, hyper::Error>> {
        let session_id = sse_stream.session_id().to_string();
        let stream_identifier = sse_stream.stream_identifier();

        debug!(
            "Converting SSE stream to HTTP response: {} (session_id={})",
            stream_identifier, session_id
        );

        let stream = sse_stream
            .stream
            .take()
            .expect("Stream should be present in SseStream");

        let formatted_stream = stream.map(|event| {
            let sse_formatted = event.format();
            debug!("Streaming SSE event: id={}, event_type={}", event.id, event.event_type);
            Ok(hyper::body::Frame::data(Bytes::from(sse_formatted)))
        });

        let body = StreamBody::new(formatted_stream).boxed_unsync();

        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, &self.config.cors_origin)
            .header("Connection", "keep-alive")
            .body(body)
            .unwrap()
    }

    /// Check if a session has any active SSE connections
    pub async fn has_connections(&self, session_id: &str) -> bool {
        let connections = self.connections.read().await;
        connections
            .get(session_id)
            .map(|session_connections| !session_connections.is_empty())
            .unwrap_or(false)
    }

    /// Send a session-scoped notification (list-changed, log message, ...) over
    /// the session's standalone stream.
    pub async fn broadcast_to_session(
        &self,
        session_id: &str,
        event_type: String,
        data: Value,
    ) -> Result<String, StreamError> {
        self.broadcast_to_session_with_options(session_id, event_type, data, true)
            .await
    }

    /// Send event to specific session with option to suppress when no connections exist
    pub async fn broadcast_to_session_with_options(
        &self,
        session_id: &str,
        event_type: String,
        data: Value,
        store_when_no_connections: bool,
    ) -> Result<String, StreamError> {
        let is_subscribed = self.is_subscribed(session_id, &event_type).await;
        if !is_subscribed {
            warn!(
                "Session {} not subscribed to notification type: {}",
                session_id, event_type
            );
            return Err(StreamError::NotSubscribed(
                session_id.to_string(),
                event_type,
            ));
        }

        if !store_when_no_connections && !self.has_connections(session_id).await {
            debug!(
                "Suppressing notification for session {} (no connections)",
                session_id
            );
            return Err(StreamError::NoConnections(session_id.to_string()));
        }

        let stored_event = self
            .storage
            .append_event(session_id, SESSION_STREAM_ID, event_type, data)
            .await
            .map_err(|e| StreamError::StorageError(e.to_string()))?
            .ok_or_else(|| StreamError::SessionNotFound(session_id.to_string()))?;

        let connections = self.connections.read().await;

        if let Some(session_connections) = connections.get(session_id) {
            if !session_connections.is_empty() {
                let (selected_connection_id, selected_sender) =
                    session_connections.iter().next().unwrap();

                if selected_sender.is_closed() {
                    debug!("Connection sender was closed, event stored for reconnection");
                } else {
                    match selected_sender.try_send(stored_event.clone()) {
                        Ok(()) => {
                            debug!(
                                "Sent notification: session={}, connection={}, event_id={}, method={}",
                                session_id,
                                selected_connection_id,
                                stored_event.id,
                                stored_event.event_type
                            );
                        }
                        Err(mpsc::error::TrySendError::Full(_)) => {
                            warn!(
                                "Connection buffer full: session={}, connection={}",
                                session_id, selected_connection_id
                            );
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => {
                            warn!(
                                "Connection closed during send: session={}, connection={}",
                                session_id, selected_connection_id
                            );
                        }
                    }
                }
            } else {
                debug!("No active connections for session: {} (event stored)", session_id);
            }
        } else {
            debug!("No connections registered for session: {} (event stored)", session_id);
        }

        Ok(stored_event.id)
    }

    /// Broadcast to all sessions (for server-wide notifications)
    pub async fn broadcast_to_all_sessions(
        &self,
        event_type: String,
        data: Value,
    ) -> Result<Vec<String>, StreamError> {
        let session_ids = self
            .storage
            .list_sessions()
            .await
            .map_err(|e| StreamError::StorageError(e.to_string()))?;

        let mut failed_sessions = Vec::new();

        for session_id in session_ids {
            if let Err(e) = self
                .broadcast_to_session(&session_id, event_type.clone(), data.clone())
                .await
            {
                error!("Failed to broadcast to session {}: {}", session_id, e);
                failed_sessions.push(session_id);
            }
        }

        Ok(failed_sessions)
    }

    /// Clean up closed connections
    pub async fn cleanup_connections(&self) -> usize {
        let mut connections = self.connections.write().await;
        let mut total_cleaned = 0;

        connections.retain(|_session_id, session_connections| {
            let initial_count = session_connections.len();

            session_connections.retain(|_connection_id, sender| !sender.is_closed());

            total_cleaned += initial_count - session_connections.len();
            !session_connections.is_empty()
        });

        if total_cleaned > 0 {
            debug!("Cleaned up {} inactive connections", total_cleaned);
        }

        total_cleaned
    }

    /// Create SSE stream for POST requests (MCP Streamable HTTP).
    ///
    /// Notifications emitted while the tool call was in flight land on the
    /// session's standalone stream (see [`SESSION_STREAM_ID`]); they're
    /// replayed ahead of the request's own result.
    pub async fn create_post_sse_stream(
        &self,
        session_id: String,
        response: mcp_jsonrpc::JsonRpcResponse,
    ) -> Result<
        hyper::Response<
            http_body_util::combinators::BoxBody<bytes::Bytes, std::convert::Infallible>,
        >,
        StreamError,
    > {
        if self
            .storage
            .get_session(&session_id)
            .await
            .map_err(|e| StreamError::StorageError(e.to_string()))?
            .is_none()
        {
            return Err(StreamError::SessionNotFound(session_id));
        }

        debug!("Creating POST SSE stream for session: {}", session_id);

        let response_json = serde_json::to_string(&response).map_err(|e| {
            StreamError::StorageError(format!("Failed to serialize response: {}", e))
        })?;

        // Notifications emitted during tool execution are processed
        // asynchronously; give them a moment to land before replaying.
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let mut sse_frames = Vec::new();

        if let Ok(events) = self
            .storage
            .replay(&session_id, &mcp_session_storage::encode_event_id(0, SESSION_STREAM_ID))
            .await
        {
            for event in events {
                if event.event_type != "ping" {
                    let notification_sse = format!(
                        "id: {}\nevent: {}\ndata: {}\n\n",
                        event.id, event.event_type, event.data
                    );
                    sse_frames.push(http_body::Frame::data(Bytes::from(notification_sse)));
                }
            }
        }

        let response_sse = format!("event: result\ndata: {}\n\n", response_json);
        sse_frames.push(http_body::Frame::data(Bytes::from(response_sse)));

        let stream = futures::stream::iter(
            sse_frames
                .into_iter()
                .map(Ok::<_, std::convert::Infallible>),
        );

        let body = StreamBody::new(stream);
        let boxed_body = http_body_util::combinators::BoxBody::new(body);

        debug!("POST SSE streaming response created: session={}", session_id);

        Ok(hyper::Response::builder()
            .status(hyper::StatusCode::OK)
            .header(hyper::header::CONTENT_TYPE, "text/event-stream")
            .header(hyper::header::CACHE_CONTROL, "no-cache")
            .header(
                hyper::header::ACCESS_CONTROL_ALLOW_ORIGIN,
                &self.config.cors_origin,
            )
            .header("Connection", "keep-alive")
            .header("X-Accel-Buffering", "no")
            .header("Mcp-Session-Id", &session_id)
            .body(boxed_body)
            .unwrap())
    }

    /// Subscribe a session to specific notification types
    pub async fn subscribe_to_notifications(
        &self,
        session_id: &str,
        notification_types: Vec<String>,
    ) {
        let mut subscriptions = self.subscriptions.write().await;
        let session_subscriptions = subscriptions
            .entry(session_id.to_string())
            .or_insert_with(HashSet::new);

        for notification_type in notification_types {
            session_subscriptions.insert(notification_type);
        }
    }

    /// Unsubscribe a session from specific notification types
    pub async fn unsubscribe_from_notifications(
        &self,
        session_id: &str,
        notification_types: Vec<String>,
    ) {
        let mut subscriptions = self.subscriptions.write().await;
        if let Some(session_subscriptions) = subscriptions.get_mut(session_id) {
            for notification_type in notification_types {
                session_subscriptions.remove(&notification_type);
            }

            if session_subscriptions.is_empty() {
                subscriptions.remove(session_id);
            }
        }
    }

    /// Check if a session is subscribed to a specific notification type
    pub async fn is_subscribed(&self, session_id: &str, notification_type: &str) -> bool {
        let subscriptions = self.subscriptions.read().await;
        subscriptions
            .get(session_id)
            .map(|session_subscriptions| session_subscriptions.contains(notification_type))
            .unwrap_or(true) // Default: allow all notifications if no explicit subscriptions
    }

    /// Get all subscriptions for a session
    pub async fn get_subscriptions(&self, session_id: &str) -> HashSet<String> {
        let subscriptions = self.subscriptions.read().await;
        subscriptions.get(session_id).cloned().unwrap_or_default()
    }

    /// Clear all subscriptions for a session (used during session cleanup)
    pub async fn clear_subscriptions(&self, session_id: &str) {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.remove(session_id);
    }

    /// Get the stream configuration (for testing and debugging)
    pub fn get_config(&self) -> &StreamConfig {
        &self.config
    }

    /// Get statistics about active streams
    pub async fn get_stats(&self) -> StreamStats {
        let connections = self.connections.read().await;
        let session_count = self.storage.session_count().await.unwrap_or(0);
        let event_count = self.storage.event_count().await.unwrap_or(0);

        let total_connections: usize = connections
            .values()
            .map(|session_connections| session_connections.len())
            .sum();

        StreamStats {
            active_broadcasters: total_connections,
            total_sessions: session_count,
            total_events: event_count,
            channel_buffer_size: self.config.channel_buffer_size,
        }
    }
}

impl Drop for StreamManager {
    fn drop(&mut self) {
        debug!("DROP: StreamManager instance {}", self.instance_id);
    }
}

/// Stream manager statistics
#[derive(Debug, Clone)]
pub struct StreamStats {
    pub active_broadcasters: usize,
    pub total_sessions: usize,
    pub total_events: usize,
    pub channel_buffer_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_protocol::ServerCapabilities;
    use mcp_session_storage::{InMemorySessionStorage, SessionStorage};

    #[tokio::test]
    async fn test_stream_manager_creation() {
        let storage = Arc::new(InMemorySessionStorage::new());
        let manager = StreamManager::new(storage);

        let stats = manager.get_stats().await;
        assert_eq!(stats.active_broadcasters, 0);
        assert_eq!(stats.total_sessions, 0);
    }

    #[tokio::test]
    async fn test_broadcast_to_session() {
        let storage = Arc::new(InMemorySessionStorage::new());
        let manager = StreamManager::new(storage.clone());

        let session = storage
            .create_session(ServerCapabilities::default())
            .await
            .unwrap();
        let session_id = session.session_id.clone();

        let event_id = manager
            .broadcast_to_session(
                &session_id,
                "test".to_string(),
                serde_json::json!({"message": "test"}),
            )
            .await
            .unwrap();

        assert!(event_id.ends_with(SESSION_STREAM_ID));

        let replayed = storage
            .replay(&session_id, &mcp_session_storage::encode_event_id(0, SESSION_STREAM_ID))
            .await
            .unwrap();
        assert_eq!(replayed.len(), 1);
        assert_eq!(replayed[0].id, event_id);
    }

    #[tokio::test]
    async fn test_broadcast_requires_subscription_opt_out() {
        let storage = Arc::new(InMemorySessionStorage::new());
        let manager = StreamManager::new(storage.clone());

        let session = storage
            .create_session(ServerCapabilities::default())
            .await
            .unwrap();
        let session_id = session.session_id.clone();

        manager
            .subscribe_to_notifications(&session_id, vec!["allowed".to_string()])
            .await;

        let result = manager
            .broadcast_to_session(&session_id, "blocked".to_string(), serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(StreamError::NotSubscribed(_, _))));
    }
}
