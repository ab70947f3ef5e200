use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::JsonRpcErrorObject;
use crate::notification::JsonRpcNotification;
use crate::request::{JsonRpcRequest, RequestParams};
use crate::response::{JsonRpcError as JsonRpcErrorMessage, JsonRpcMessage, JsonRpcResponse};
use crate::types::RequestId;

/// Minimal session context threaded through JSON-RPC handlers.
///
/// Transport-agnostic: carries only what a handler needs to look up or
/// mutate session state and to push notifications back out, without
/// depending on any particular transport or storage crate.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub metadata: HashMap<String, Value>,
    pub broadcaster: Option<Arc<dyn std::any::Any + Send + Sync>>,
    pub timestamp: u64,
}

/// A JSON-RPC method handler.
///
/// Handlers return domain errors (`Self::Error`), never wire-level
/// `JsonRpcErrorObject`s directly — the dispatcher owns the conversion via
/// [`ToJsonRpcError`], so a handler never needs to know a numeric error code.
#[async_trait]
pub trait JsonRpcHandler: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn handle(
        &self,
        method: &str,
        params: Option<RequestParams>,
        session_context: Option<SessionContext>,
    ) -> Result<Value, Self::Error>;

    async fn handle_notification(
        &self,
        method: &str,
        params: Option<RequestParams>,
        session_context: Option<SessionContext>,
    ) -> Result<(), Self::Error> {
        let _ = (method, params, session_context);
        Ok(())
    }

    fn supported_methods(&self) -> Vec<String> {
        Vec::new()
    }

    /// Called when an incoming message is a client's reply to a request the
    /// application itself sent to the client (e.g. `elicitation/create`),
    /// rather than a request or notification. Mirrors `handle_notification`
    /// in that no response is ever sent back for it.
    async fn handle_client_response(&self, id: RequestId, result: Option<Value>, error: Option<JsonRpcErrorObject>) {
        let _ = (id, result, error);
    }
}

/// Trait for domain errors that can be converted to a JSON-RPC error object.
pub trait ToJsonRpcError: std::error::Error + Send + Sync + 'static {
    fn to_error_object(&self) -> crate::error::JsonRpcErrorObject;
}

/// Method-table dispatcher: routes a request by `method` name to whichever
/// registered [`JsonRpcHandler`] declared it, falling back to a default
/// handler (if one is set) when no method matches.
///
/// Generic over the handler error type `E` so a single dispatcher instance
/// only ever talks to handlers that agree on a domain error type; the
/// dispatcher itself converts `E` to a wire [`JsonRpcErrorObject`] via
/// [`ToJsonRpcError`] so callers never see a raw domain error.
pub struct JsonRpcDispatcher<E: ToJsonRpcError> {
    handlers: RwLock<HashMap<String, Arc<dyn JsonRpcHandler<Error = E>>>>,
    default_handler: RwLock<Option<Arc<dyn JsonRpcHandler<Error = E>>>>,
    /// The handler client replies (see [`JsonRpcMessage::Response`] in
    /// `dispatch`) are routed to. Set by whichever `register_methods` call
    /// registers the application's method table — there's normally exactly
    /// one such handler per dispatcher.
    response_handler: RwLock<Option<Arc<dyn JsonRpcHandler<Error = E>>>>,
}

impl<E: ToJsonRpcError> Default for JsonRpcDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ToJsonRpcError> JsonRpcDispatcher<E> {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            default_handler: RwLock::new(None),
            response_handler: RwLock::new(None),
        }
    }

    /// Register a handler for a fixed set of method names. Re-registering a
    /// method overwrites its previous handler.
    pub fn register_methods<H>(&self, methods: Vec<String>, handler: H)
    where
        H: JsonRpcHandler<Error = E> + 'static,
    {
        let handler: Arc<dyn JsonRpcHandler<Error = E>> = Arc::new(handler);
        *self.response_handler.write().expect("dispatcher response handler lock poisoned") = Some(Arc::clone(&handler));
        let mut table = self.handlers.write().expect("dispatcher handler table lock poisoned");
        for method in methods {
            table.insert(method, Arc::clone(&handler));
        }
    }

    /// Deliver a client's reply to the registered response handler, if any.
    pub async fn handle_client_response(&self, id: RequestId, result: Option<Value>, error: Option<JsonRpcErrorObject>) {
        let handler = self
            .response_handler
            .read()
            .expect("dispatcher response handler lock poisoned")
            .clone();
        if let Some(handler) = handler {
            handler.handle_client_response(id, result, error).await;
        }
    }

    /// Register a single handler for all its `supported_methods()`.
    pub fn register_handler<H>(&self, handler: H)
    where
        H: JsonRpcHandler<Error = E> + 'static,
    {
        let methods = handler.supported_methods();
        self.register_methods(methods, handler);
    }

    /// Set a catch-all handler invoked when no registered method matches.
    pub fn set_default_handler<H>(&self, handler: H)
    where
        H: JsonRpcHandler<Error = E> + 'static,
    {
        *self.default_handler.write().expect("dispatcher default handler lock poisoned") = Some(Arc::new(handler));
    }

    fn lookup(&self, method: &str) -> Option<Arc<dyn JsonRpcHandler<Error = E>>> {
        if let Some(handler) = self
            .handlers
            .read()
            .expect("dispatcher handler table lock poisoned")
            .get(method)
        {
            return Some(Arc::clone(handler));
        }
        self.default_handler
            .read()
            .expect("dispatcher default handler lock poisoned")
            .clone()
    }

    /// Dispatch a request with no session context.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcMessage {
        self.handle_request_with_context_opt(request, None).await
    }

    /// Dispatch a request with a session context attached.
    pub async fn handle_request_with_context(
        &self,
        request: JsonRpcRequest,
        session_context: SessionContext,
    ) -> JsonRpcMessage {
        self.handle_request_with_context_opt(request, Some(session_context)).await
    }

    async fn handle_request_with_context_opt(
        &self,
        request: JsonRpcRequest,
        session_context: Option<SessionContext>,
    ) -> JsonRpcMessage {
        let JsonRpcRequest { id, method, params, .. } = request;

        let Some(handler) = self.lookup(&method) else {
            return JsonRpcMessage::Error(JsonRpcErrorMessage::method_not_found(id, &method));
        };

        match handler.handle(&method, params, session_context).await {
            Ok(value) => JsonRpcMessage::Response(JsonRpcResponse::success(id, value)),
            Err(err) => {
                let mut error_object = err.to_error_object();
                error_object.message = format!("{}: {}", method, error_object.message);
                JsonRpcMessage::Error(JsonRpcErrorMessage::new(Some(id), error_object))
            }
        }
    }

    /// Dispatch a notification with no session context. Errors are returned
    /// to the caller to log; per JSON-RPC 2.0 a notification never produces
    /// a response on the wire regardless of outcome.
    pub async fn handle_notification(&self, notification: JsonRpcNotification) -> Result<(), E> {
        self.handle_notification_with_context(notification, None).await
    }

    /// Dispatch a notification with an optional session context attached.
    pub async fn handle_notification_with_context(
        &self,
        notification: JsonRpcNotification,
        session_context: Option<SessionContext>,
    ) -> Result<(), E> {
        let JsonRpcNotification { method, params, .. } = notification;

        let Some(handler) = self.lookup(&method) else {
            return Ok(());
        };

        handler.handle_notification(&method, params, session_context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JsonRpcErrorObject;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("boom: {0}")]
    struct TestError(String);

    impl ToJsonRpcError for TestError {
        fn to_error_object(&self) -> JsonRpcErrorObject {
            JsonRpcErrorObject::internal_error(Some(self.0.clone()))
        }
    }

    struct Echo;

    #[async_trait]
    impl JsonRpcHandler for Echo {
        type Error = TestError;

        async fn handle(
            &self,
            method: &str,
            params: Option<RequestParams>,
            _session_context: Option<SessionContext>,
        ) -> Result<Value, Self::Error> {
            if method == "fail" {
                return Err(TestError("requested failure".into()));
            }
            Ok(params.map(|p| p.to_value()).unwrap_or(Value::Null))
        }
    }

    #[tokio::test]
    async fn handler_returns_domain_error_not_wire_error() {
        let echo = Echo;
        let err = echo.handle("fail", None, None).await.unwrap_err();
        assert_eq!(err.to_error_object().code, -32603);
    }

    fn request(method: &str) -> JsonRpcRequest {
        JsonRpcRequest::new_no_params(crate::types::RequestId::Number(1), method.to_string())
    }

    #[tokio::test]
    async fn dispatches_registered_method() {
        let dispatcher: JsonRpcDispatcher<TestError> = JsonRpcDispatcher::new();
        dispatcher.register_methods(vec!["echo".to_string()], Echo);

        match dispatcher.handle_request(request("echo")).await {
            JsonRpcMessage::Response(resp) => assert_eq!(resp.id, crate::types::RequestId::Number(1)),
            JsonRpcMessage::Error(err) => panic!("unexpected error: {err:?}"),
        }
    }

    #[tokio::test]
    async fn unregistered_method_without_default_handler_is_method_not_found() {
        let dispatcher: JsonRpcDispatcher<TestError> = JsonRpcDispatcher::new();

        match dispatcher.handle_request(request("missing")).await {
            JsonRpcMessage::Error(err) => assert_eq!(err.error.code, -32601),
            JsonRpcMessage::Response(resp) => panic!("unexpected response: {resp:?}"),
        }
    }

    #[tokio::test]
    async fn falls_back_to_default_handler() {
        let dispatcher: JsonRpcDispatcher<TestError> = JsonRpcDispatcher::new();
        dispatcher.set_default_handler(Echo);

        match dispatcher.handle_request(request("anything")).await {
            JsonRpcMessage::Response(_) => {}
            JsonRpcMessage::Error(err) => panic!("unexpected error: {err:?}"),
        }
    }

    #[tokio::test]
    async fn handler_error_becomes_wire_error() {
        let dispatcher: JsonRpcDispatcher<TestError> = JsonRpcDispatcher::new();
        dispatcher.register_methods(vec!["fail".to_string()], Echo);

        match dispatcher.handle_request(request("fail")).await {
            JsonRpcMessage::Error(err) => assert_eq!(err.error.code, -32603),
            JsonRpcMessage::Response(resp) => panic!("unexpected response: {resp:?}"),
        }
    }

    #[tokio::test]
    async fn unregistered_notification_is_silently_ignored() {
        let dispatcher: JsonRpcDispatcher<TestError> = JsonRpcDispatcher::new();
        let notification = JsonRpcNotification::new_no_params("noop".to_string());
        dispatcher.handle_notification(notification).await.unwrap();
    }
}
