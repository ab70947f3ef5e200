//! Session management for MCP servers.
//!
//! A session is created the first time a client calls `initialize` over the
//! streamable HTTP transport and lives until it expires or the client closes
//! its stream. Each session carries negotiated capabilities, a small
//! key/value state bag tools can use to remember things across calls, and an
//! outbound channel that server-to-client notifications (and, via
//! [`crate::client_request`], server-to-client requests) are pushed onto for
//! delivery over the session's SSE stream.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use mcp_jsonrpc::notification::JsonRpcNotification;
use mcp_jsonrpc::request::RequestParams;
use mcp_protocol::{ClientCapabilities, Implementation, McpError, McpResult, McpVersion, ServerCapabilities};

use crate::client_request::ClientRequestRegistry;

/// A message queued for delivery to a session's stream. Currently always a
/// notification; server-to-client requests are tracked separately by
/// [`crate::client_request::ClientRequestRegistry`] and correlated by id.
pub type OutboundMessage = JsonRpcNotification;

fn notification_with_object_params(method: &str, other: HashMap<String, Value>) -> JsonRpcNotification {
    JsonRpcNotification::new(method.to_string(), Some(RequestParams::Object(other)))
}

/// Handed to tool/resource/prompt handlers so they can read and write
/// per-session state and push notifications without knowing anything about
/// the transport that will eventually deliver them.
#[derive(Clone)]
pub struct SessionContext {
    pub session_id: String,
    state: Arc<RwLock<HashMap<String, Value>>>,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    client_capabilities: Arc<RwLock<Option<ClientCapabilities>>>,
    client_requests: ClientRequestRegistry,
}

impl SessionContext {
    fn new(
        session_id: impl Into<String>,
        state: Arc<RwLock<HashMap<String, Value>>>,
        outbound: mpsc::UnboundedSender<OutboundMessage>,
        client_capabilities: Arc<RwLock<Option<ClientCapabilities>>>,
        client_requests: ClientRequestRegistry,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            state,
            outbound,
            client_capabilities,
            client_requests,
        }
    }

    /// Get a session state value by key.
    pub async fn get_state(&self, key: &str) -> Option<Value> {
        self.state.read().await.get(key).cloned()
    }

    /// Set a session state value by key.
    pub async fn set_state(&self, key: &str, value: Value) {
        self.state.write().await.insert(key.to_string(), value);
    }

    /// Remove a session state value by key, returning it if present.
    pub async fn remove_state(&self, key: &str) -> Option<Value> {
        self.state.write().await.remove(key)
    }

    /// Convenience accessor that deserializes the stored value into `T`.
    pub async fn get_typed_state<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_state(key)
            .await
            .and_then(|v| serde_json::from_value(v).ok())
    }

    /// Convenience setter that serializes `value` before storing it.
    pub async fn set_typed_state<T: serde::Serialize>(&self, key: &str, value: T) -> Result<(), String> {
        let json = serde_json::to_value(value).map_err(|e| format!("failed to serialize value: {e}"))?;
        self.set_state(key, json).await;
        Ok(())
    }

    /// Queue a notification for delivery on this session's stream. Drops it
    /// silently if the client has disconnected (the receiving half of the
    /// channel is gone) — there is nobody left to observe the failure.
    pub fn notify(&self, notification: JsonRpcNotification) {
        if self.outbound.send(notification).is_err() {
            debug!(session_id = %self.session_id, "dropped notification: no active stream");
        }
    }

    /// Sends a `notifications/progress` message.
    pub fn notify_progress(&self, progress_token: impl Into<String>, progress: u64, total: Option<u64>) {
        let mut other = HashMap::new();
        other.insert("progressToken".to_string(), serde_json::json!(progress_token.into()));
        other.insert("progress".to_string(), serde_json::json!(progress));
        if let Some(total) = total {
            other.insert("total".to_string(), serde_json::json!(total));
        }
        self.notify(notification_with_object_params("notifications/progress", other));
    }

    /// Sends a `notifications/message` logging notification.
    pub fn notify_log(&self, level: &str, data: impl Into<Value>) {
        let mut other = HashMap::new();
        other.insert("level".to_string(), serde_json::json!(level));
        other.insert("data".to_string(), data.into());
        self.notify(notification_with_object_params("notifications/message", other));
    }

    /// Sends `notifications/resources/listChanged`.
    pub fn notify_resources_changed(&self) {
        self.notify(JsonRpcNotification::new_no_params(
            "notifications/resources/listChanged".to_string(),
        ));
    }

    /// Sends `notifications/resources/updated` for a specific URI.
    pub fn notify_resource_updated(&self, uri: impl Into<String>) {
        let mut other = HashMap::new();
        other.insert("uri".to_string(), serde_json::json!(uri.into()));
        self.notify(notification_with_object_params("notifications/resources/updated", other));
    }

    /// Sends `notifications/tools/listChanged`.
    pub fn notify_tools_changed(&self) {
        self.notify(JsonRpcNotification::new_no_params(
            "notifications/tools/listChanged".to_string(),
        ));
    }

    /// Sends `notifications/prompts/listChanged`.
    pub fn notify_prompts_changed(&self) {
        self.notify(JsonRpcNotification::new_no_params(
            "notifications/prompts/listChanged".to_string(),
        ));
    }

    /// View of the capabilities the client declared in `initialize`, for
    /// checking whether it's worth sending a server-to-client request at all.
    pub fn client(&self) -> ClientView {
        ClientView {
            capabilities: self.client_capabilities.clone(),
        }
    }

    /// Sends `elicitation/create` to the client and waits for its answer.
    ///
    /// Returns an error if the client hasn't connected a stream, rejects the
    /// request, or doesn't answer within `timeout`. Callers that care whether
    /// the client can handle elicitation at all should check
    /// [`SessionContext::client`] first.
    pub async fn elicit(
        &self,
        message: impl Into<String>,
        requested_schema: mcp_protocol::elicitation::ElicitationSchema,
        timeout: Duration,
    ) -> McpResult<mcp_protocol::elicitation::ElicitResult> {
        let params = mcp_protocol::elicitation::ElicitCreateParams {
            message: message.into(),
            requested_schema,
            meta: None,
        };
        let value = self
            .client_requests
            .request(
                self,
                "elicitation/create",
                serde_json::to_value(params).map_err(McpError::SerializationError)?,
                timeout,
            )
            .await?;
        serde_json::from_value(value).map_err(McpError::SerializationError)
    }

    /// Sends `sampling/createMessage` to the client and waits for its answer.
    pub async fn sample(
        &self,
        params: mcp_protocol::sampling::CreateMessageParams,
        timeout: Duration,
    ) -> McpResult<mcp_protocol::sampling::CreateMessageResult> {
        let value = self
            .client_requests
            .request(
                self,
                "sampling/createMessage",
                serde_json::to_value(params).map_err(McpError::SerializationError)?,
                timeout,
            )
            .await?;
        serde_json::from_value(value).map_err(McpError::SerializationError)
    }
}

/// Read-only view of a session's declared client capabilities.
#[derive(Clone)]
pub struct ClientView {
    capabilities: Arc<RwLock<Option<ClientCapabilities>>>,
}

/// A capability a client may declare support for in `initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCapability {
    Roots,
    Sampling,
    Elicitation,
}

impl ClientView {
    /// Whether the client declared support for `capability` during
    /// `initialize`. `false` for a session that hasn't initialized yet.
    pub async fn supports(&self, capability: ClientCapability) -> bool {
        let Some(caps) = self.capabilities.read().await.clone() else {
            return false;
        };
        match capability {
            ClientCapability::Roots => caps.roots.is_some(),
            ClientCapability::Sampling => caps.sampling.is_some(),
            ClientCapability::Elicitation => caps.elicitation.is_some(),
        }
    }
}

/// Session management errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("session expired: {0}")]
    Expired(String),
    #[error("session not initialized: {0}")]
    NotInitialized(String),
}

/// Server-held record for one live session. Not exposed directly to
/// handlers — [`SessionContext`] is the narrow view they get instead.
struct SessionEntry {
    created: Instant,
    last_accessed: RwLock<Instant>,
    mcp_version: RwLock<McpVersion>,
    client_capabilities: Arc<RwLock<Option<ClientCapabilities>>>,
    server_capabilities: ServerCapabilities,
    client_info: RwLock<Option<Implementation>>,
    state: Arc<RwLock<HashMap<String, Value>>>,
    initialized: RwLock<bool>,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
}

/// Tracks every live session and the state associated with it. Hands out
/// [`SessionContext`] handles for request dispatch and owns expiry sweeping.
///
/// This is purely in-process, single-server state (see the crate's
/// `event_id`/session-store modules for the cross-request, resumable-stream
/// side of session tracking). A multi-process deployment needs a shared
/// backing store; that's out of scope here.
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<SessionEntry>>>,
    session_timeout: Duration,
    default_capabilities: ServerCapabilities,
    client_requests: ClientRequestRegistry,
}

impl SessionManager {
    pub fn new(default_capabilities: ServerCapabilities) -> Self {
        Self::with_timeout(default_capabilities, Duration::from_secs(30 * 60))
    }

    pub fn with_timeout(default_capabilities: ServerCapabilities, session_timeout: Duration) -> Self {
        Self::with_timeout_and_registry(default_capabilities, session_timeout, ClientRequestRegistry::new())
    }

    /// Like [`SessionManager::with_timeout`], but shares `client_requests`
    /// with whoever else needs to resolve server-to-client replies (e.g. the
    /// transport layer, via [`crate::server::McpServer::client_requests`]) —
    /// every [`SessionContext`] this manager hands out must see the same
    /// pending-request table, or `elicit()`/`sample()` calls would wait on a
    /// table a reply can never reach.
    pub fn with_timeout_and_registry(
        default_capabilities: ServerCapabilities,
        session_timeout: Duration,
        client_requests: ClientRequestRegistry,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            session_timeout,
            default_capabilities,
            client_requests,
        }
    }

    /// Creates a new session and returns a context bound to it plus the
    /// receiving half of its outbound-notification channel (the transport
    /// layer drains this into the session's SSE stream).
    pub async fn create_session(&self) -> (SessionContext, mpsc::UnboundedReceiver<OutboundMessage>) {
        let session_id = Uuid::now_v7().to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(RwLock::new(HashMap::new()));
        let client_capabilities = Arc::new(RwLock::new(None));

        let entry = Arc::new(SessionEntry {
            created: Instant::now(),
            last_accessed: RwLock::new(Instant::now()),
            mcp_version: RwLock::new(McpVersion::CURRENT),
            client_capabilities: client_capabilities.clone(),
            server_capabilities: self.default_capabilities.clone(),
            client_info: RwLock::new(None),
            state: state.clone(),
            initialized: RwLock::new(false),
            outbound: tx.clone(),
        });

        debug!(session_id = %session_id, "created session");
        self.sessions.write().await.insert(session_id.clone(), entry);

        (
            SessionContext::new(session_id, state, tx, client_capabilities, self.client_requests.clone()),
            rx,
        )
    }

    /// Look up a session by id, creating a fresh in-process entry under that
    /// exact id if none exists yet.
    ///
    /// Used to bridge a transport-assigned session id (e.g. from
    /// `mcp_jsonrpc::r#async::SessionContext`, minted and persisted by the
    /// HTTP layer's own storage) into this manager's typed state bag, without
    /// minting a second, disagreeing session id. The returned context's
    /// outbound channel has no reader attached — real SSE delivery for
    /// HTTP-dispatched sessions goes through the transport's own broadcaster,
    /// not through this manager, so `notify()` calls on it are harmless no-ops.
    pub async fn get_or_create(&self, session_id: &str) -> SessionContext {
        if let Some(ctx) = self.get(session_id).await {
            return ctx;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let state = Arc::new(RwLock::new(HashMap::new()));
        let client_capabilities = Arc::new(RwLock::new(None));

        let entry = Arc::new(SessionEntry {
            created: Instant::now(),
            last_accessed: RwLock::new(Instant::now()),
            mcp_version: RwLock::new(McpVersion::CURRENT),
            client_capabilities: client_capabilities.clone(),
            server_capabilities: self.default_capabilities.clone(),
            client_info: RwLock::new(None),
            state: state.clone(),
            initialized: RwLock::new(true),
            outbound: tx.clone(),
        });

        debug!(session_id, "adopted transport-assigned session");
        self.sessions.write().await.insert(session_id.to_string(), entry);

        SessionContext::new(
            session_id.to_string(),
            state,
            tx,
            client_capabilities,
            self.client_requests.clone(),
        )
    }

    /// Look up a session by id, touching its last-accessed time.
    pub async fn get(&self, session_id: &str) -> Option<SessionContext> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(session_id)?;
        *entry.last_accessed.write().await = Instant::now();
        Some(SessionContext::new(
            session_id.to_string(),
            entry.state.clone(),
            entry.outbound.clone(),
            entry.client_capabilities.clone(),
            self.client_requests.clone(),
        ))
    }

    /// Records the negotiated capabilities/version from `initialize`.
    pub async fn initialize(
        &self,
        session_id: &str,
        client_info: Implementation,
        client_capabilities: ClientCapabilities,
        mcp_version: McpVersion,
    ) -> Result<(), SessionError> {
        let sessions = self.sessions.read().await;
        let entry = sessions
            .get(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        *entry.client_info.write().await = Some(client_info);
        *entry.client_capabilities.write().await = Some(client_capabilities);
        *entry.mcp_version.write().await = mcp_version;
        *entry.initialized.write().await = true;
        *entry.last_accessed.write().await = Instant::now();
        Ok(())
    }

    pub async fn is_initialized(&self, session_id: &str) -> bool {
        let sessions = self.sessions.read().await;
        match sessions.get(session_id) {
            Some(entry) => *entry.initialized.read().await,
            None => false,
        }
    }

    pub async fn server_capabilities(&self, session_id: &str) -> Option<ServerCapabilities> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(|e| e.server_capabilities.clone())
    }

    pub async fn remove(&self, session_id: &str) {
        if self.sessions.write().await.remove(session_id).is_some() {
            debug!(session_id, "removed session");
        }
    }

    /// Drops every session whose last activity is older than the configured
    /// timeout. Intended to run periodically from a background task.
    pub async fn sweep_expired(&self) {
        let mut sessions = self.sessions.write().await;
        let timeout = self.session_timeout;
        let before = sessions.len();
        let mut expired = Vec::new();
        for (id, entry) in sessions.iter() {
            if entry.last_accessed.read().await.elapsed() > timeout {
                expired.push(id.clone());
            }
        }
        for id in &expired {
            sessions.remove(id);
        }
        if !expired.is_empty() {
            warn!(count = before - sessions.len(), "swept expired sessions");
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_protocol::ServerCapabilities;

    #[tokio::test]
    async fn create_and_fetch_session() {
        let manager = SessionManager::new(ServerCapabilities::default());
        let (ctx, _rx) = manager.create_session().await;

        let fetched = manager.get(&ctx.session_id).await;
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn state_round_trips() {
        let manager = SessionManager::new(ServerCapabilities::default());
        let (ctx, _rx) = manager.create_session().await;

        ctx.set_state("key", serde_json::json!("value")).await;
        assert_eq!(ctx.get_state("key").await, Some(serde_json::json!("value")));

        let removed = ctx.remove_state("key").await;
        assert_eq!(removed, Some(serde_json::json!("value")));
        assert_eq!(ctx.get_state("key").await, None);
    }

    #[tokio::test]
    async fn notify_delivers_to_receiver() {
        let manager = SessionManager::new(ServerCapabilities::default());
        let (ctx, mut rx) = manager.create_session().await;

        ctx.notify_tools_changed();
        let received = rx.recv().await.unwrap();
        assert_eq!(received.method, "notifications/tools/listChanged");
    }

    #[tokio::test]
    async fn notify_after_disconnect_is_silently_dropped() {
        let manager = SessionManager::new(ServerCapabilities::default());
        let (ctx, rx) = manager.create_session().await;
        drop(rx);

        ctx.notify_tools_changed();
    }

    #[tokio::test]
    async fn initialize_marks_session_ready() {
        let manager = SessionManager::new(ServerCapabilities::default());
        let (ctx, _rx) = manager.create_session().await;

        assert!(!manager.is_initialized(&ctx.session_id).await);
        manager
            .initialize(
                &ctx.session_id,
                Implementation::new("test-client", "1.0.0"),
                ClientCapabilities::default(),
                McpVersion::CURRENT,
            )
            .await
            .unwrap();
        assert!(manager.is_initialized(&ctx.session_id).await);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let manager = SessionManager::new(ServerCapabilities::default());
        assert!(manager.get("does-not-exist").await.is_none());
    }

    #[tokio::test]
    async fn client_supports_nothing_before_initialize() {
        let manager = SessionManager::new(ServerCapabilities::default());
        let (ctx, _rx) = manager.create_session().await;

        assert!(!ctx.client().supports(ClientCapability::Elicitation).await);
        assert!(!ctx.client().supports(ClientCapability::Sampling).await);
        assert!(!ctx.client().supports(ClientCapability::Roots).await);
    }

    #[tokio::test]
    async fn client_supports_reflects_negotiated_capabilities() {
        let manager = SessionManager::new(ServerCapabilities::default());
        let (ctx, _rx) = manager.create_session().await;

        manager
            .initialize(
                &ctx.session_id,
                Implementation::new("test-client", "1.0.0"),
                ClientCapabilities {
                    elicitation: Some(Default::default()),
                    ..ClientCapabilities::default()
                },
                McpVersion::CURRENT,
            )
            .await
            .unwrap();

        assert!(ctx.client().supports(ClientCapability::Elicitation).await);
        assert!(!ctx.client().supports(ClientCapability::Sampling).await);
    }

    #[tokio::test]
    async fn elicit_resolves_once_client_replies() {
        let manager = SessionManager::new(ServerCapabilities::default());
        let (ctx, mut rx) = manager.create_session().await;

        let ctx_clone = ctx.clone();
        let responder = tokio::spawn(async move {
            let notification = rx.recv().await.unwrap();
            assert_eq!(notification.method, "server/request");
            let request_id = notification
                .params
                .unwrap()
                .get("request")
                .unwrap()
                .get("id")
                .unwrap()
                .as_str()
                .unwrap()
                .to_string();
            ctx_clone
                .client_requests
                .resolve(
                    &request_id,
                    crate::client_request::ClientResponse::Result(
                        serde_json::json!({"action": "accept", "content": {"name": "Ada"}}),
                    ),
                )
                .await;
        });

        let schema = mcp_protocol::elicitation::ElicitationSchema {
            schema_type: "object".to_string(),
            properties: HashMap::new(),
            required: None,
        };
        let result = ctx
            .elicit("what's your name?", schema, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(matches!(result.action, mcp_protocol::elicitation::ElicitAction::Accept));
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn elicit_times_out_without_a_stream() {
        let manager = SessionManager::new(ServerCapabilities::default());
        let (ctx, rx) = manager.create_session().await;
        drop(rx);

        let schema = mcp_protocol::elicitation::ElicitationSchema {
            schema_type: "object".to_string(),
            properties: HashMap::new(),
            required: None,
        };
        let result = ctx.elicit("anyone there?", schema, Duration::from_millis(50)).await;
        assert!(result.is_err());
    }
}
