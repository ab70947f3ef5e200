//! Server-to-client request/response correlation for elicitation and sampling.
//!
//! Unlike `notifications/*`, `elicitation/create` and `sampling/createMessage`
//! are requests the *server* sends to the *client* and must wait for an
//! answer to. They still ride the session's SSE stream like any other
//! server-to-client message (`SessionContext::notify` is the only delivery
//! path out), wrapped in a `server/request` envelope so the client can tell
//! them apart from fire-and-forget notifications. The registry here assigns
//! each one a request id and parks a `oneshot` receiver until
//! [`ClientRequestRegistry::resolve`] is called with the matching id, which
//! the transport layer does when the client's answer arrives over its
//! regular POST endpoint.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{oneshot, Mutex};
use uuid::Uuid;

use mcp_jsonrpc::notification::JsonRpcNotification;
use mcp_jsonrpc::request::RequestParams;
use mcp_protocol::{McpError, McpResult};

use crate::session::SessionContext;

/// Outcome of a client's reply to a server-initiated request.
#[derive(Debug, Clone)]
pub enum ClientResponse {
    Result(Value),
    Error { code: i64, message: String },
}

struct PendingRequest {
    responder: oneshot::Sender<ClientResponse>,
}

/// Tracks in-flight server-to-client requests, keyed by request id.
#[derive(Clone, Default)]
pub struct ClientRequestRegistry {
    pending: Arc<Mutex<HashMap<String, PendingRequest>>>,
}

impl ClientRequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `method`/`params` to the client over `session`'s stream and wait
    /// up to `timeout` for a correlated reply.
    pub async fn request(
        &self,
        session: &SessionContext,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> McpResult<Value> {
        let request_id = Uuid::now_v7().to_string();
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .await
            .insert(request_id.clone(), PendingRequest { responder: tx });

        let envelope = serde_json::json!({
            "jsonrpc": "2.0",
            "id": request_id,
            "method": method,
            "params": params,
        });
        let mut wrapper = HashMap::new();
        wrapper.insert("request".to_string(), envelope);
        session.notify(JsonRpcNotification::new(
            "server/request".to_string(),
            Some(RequestParams::Object(wrapper)),
        ));

        let outcome = tokio::time::timeout(timeout, rx).await;
        self.pending.lock().await.remove(&request_id);

        match outcome {
            Err(_) => Err(McpError::transport(&format!(
                "client request '{method}' timed out after {timeout:?}"
            ))),
            Ok(Err(_)) => Err(McpError::transport(&format!(
                "client request '{method}' was dropped before completion"
            ))),
            Ok(Ok(ClientResponse::Result(value))) => Ok(value),
            Ok(Ok(ClientResponse::Error { code, message })) => Err(McpError::transport(&format!(
                "client rejected '{method}' request ({code}): {message}"
            ))),
        }
    }

    /// Resolve a pending request by id. Called by the transport layer when
    /// the client's answer arrives. Returns `false` if no request with that
    /// id is outstanding (already timed out, or unknown id).
    pub async fn resolve(&self, request_id: &str, response: ClientResponse) -> bool {
        if let Some(pending) = self.pending.lock().await.remove(request_id) {
            let _ = pending.responder.send(response);
            true
        } else {
            false
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionManager;
    use mcp_protocol::ServerCapabilities;

    #[tokio::test]
    async fn request_resolves_with_matching_response() {
        let manager = SessionManager::new(ServerCapabilities::default());
        let (ctx, mut rx) = manager.create_session().await;
        let registry = ClientRequestRegistry::new();

        let registry_clone = registry.clone();
        let responder = tokio::spawn(async move {
            let notification = rx.recv().await.unwrap();
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
            registry_clone
                .resolve(&request_id, ClientResponse::Result(serde_json::json!({"ok": true})))
                .await;
        });

        let result = registry
            .request(
                &ctx,
                "elicitation/create",
                serde_json::json!({"message": "hi"}),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert_eq!(result, serde_json::json!({"ok": true}));
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn request_times_out_without_response() {
        let manager = SessionManager::new(ServerCapabilities::default());
        let (ctx, _rx) = manager.create_session().await;
        let registry = ClientRequestRegistry::new();

        let result = registry
            .request(
                &ctx,
                "sampling/createMessage",
                serde_json::json!({}),
                Duration::from_millis(50),
            )
            .await;
        assert!(result.is_err());
        assert_eq!(registry.pending_count().await, 0);
    }
}
