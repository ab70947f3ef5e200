//! Method-table dispatch fused with the middleware before/after chain.
//!
//! [`McpDispatcher`] wraps [`mcp_jsonrpc::r#async::JsonRpcDispatcher`] (method
//! lookup, domain-error-to-wire-error shaping) and runs the registered
//! [`DispatchMiddleware`] chain around every call. Middleware lives inside the
//! dispatcher rather than as an HTTP-layer add-on so the same chain applies
//! regardless of which transport a request arrived over.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use mcp_http_transport::middleware::{DispatcherResult, MiddlewareStack};
pub use mcp_http_transport::middleware::McpMiddleware as DispatchMiddleware;
pub use mcp_http_transport::middleware::RequestContext as DispatchContext;
use mcp_jsonrpc::error::{JsonRpcError as JsonRpcErrorMessage, JsonRpcErrorObject};
use mcp_jsonrpc::r#async::{JsonRpcDispatcher as InnerDispatcher, JsonRpcHandler};
use mcp_jsonrpc::request::{JsonRpcRequest, RequestParams};
use mcp_jsonrpc::response::{JsonRpcMessage, ResponseResult};
use mcp_protocol::McpError;
use mcp_session_storage::SessionView;

use crate::middleware::error_codes;
use crate::middleware::MiddlewareError;

fn value_to_request_params(value: Value) -> RequestParams {
    match value {
        Value::Array(items) => RequestParams::Array(items),
        Value::Object(map) => RequestParams::Object(map.into_iter().collect::<HashMap<_, _>>()),
        other => RequestParams::Array(vec![other]),
    }
}

fn middleware_error_to_wire(
    id: Option<mcp_jsonrpc::types::RequestId>,
    err: &MiddlewareError,
) -> JsonRpcErrorMessage {
    let (code, message) = match err {
        MiddlewareError::Unauthenticated(msg) => (error_codes::UNAUTHENTICATED, msg.clone()),
        MiddlewareError::Unauthorized(msg) => (error_codes::UNAUTHORIZED, msg.clone()),
        MiddlewareError::RateLimitExceeded { message, .. } => {
            (error_codes::RATE_LIMIT_EXCEEDED, message.clone())
        }
        MiddlewareError::InvalidRequest(msg) => (error_codes::INVALID_REQUEST, msg.clone()),
        MiddlewareError::Internal(msg) => (error_codes::INTERNAL_ERROR, msg.clone()),
        MiddlewareError::Custom { message, .. } => (error_codes::INTERNAL_ERROR, message.clone()),
    };
    JsonRpcErrorMessage::new(
        id,
        JsonRpcErrorObject {
            code,
            message,
            data: None,
        },
    )
}

/// Method-table dispatcher with an attached middleware chain.
///
/// Registration (`register_methods`/`register_handler`/`set_default_handler`)
/// delegates straight to the inner [`mcp_jsonrpc`] dispatcher. Dispatch
/// (`handle_request`/`handle_notification`) runs the middleware chain's
/// `before_dispatch` hooks, then the method table, then `after_dispatch`.
pub struct McpDispatcher {
    inner: InnerDispatcher<McpError>,
    middleware: MiddlewareStack,
}

impl Default for McpDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl McpDispatcher {
    pub fn new() -> Self {
        Self {
            inner: InnerDispatcher::new(),
            middleware: MiddlewareStack::new(),
        }
    }

    pub fn register_methods<H>(&self, methods: Vec<String>, handler: H)
    where
        H: JsonRpcHandler<Error = McpError> + 'static,
    {
        self.inner.register_methods(methods, handler);
    }

    pub fn register_handler<H>(&self, handler: H)
    where
        H: JsonRpcHandler<Error = McpError> + 'static,
    {
        self.inner.register_handler(handler);
    }

    pub fn set_default_handler<H>(&self, handler: H)
    where
        H: JsonRpcHandler<Error = McpError> + 'static,
    {
        self.inner.set_default_handler(handler);
    }

    /// Append a middleware layer. Layers run in registration order on
    /// `before_dispatch` and reverse order on `after_dispatch`.
    pub fn add_middleware(&mut self, middleware: Arc<dyn DispatchMiddleware>) {
        self.middleware.push(middleware);
    }

    /// Dispatch a single request through the middleware chain and method table.
    ///
    /// `session` feeds the middleware chain's auth/rate-limit lookups;
    /// `session_context` is the thin transport session handed straight
    /// through to whichever [`JsonRpcHandler`] ends up serving the method.
    /// They describe the same session but serve different layers, so both
    /// are accepted independently rather than one being derived from the
    /// other.
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        session: Option<&dyn SessionView>,
        session_context: Option<mcp_jsonrpc::r#async::SessionContext>,
    ) -> JsonRpcMessage {
        let params_value = request.params.as_ref().map(|p| p.to_value());
        let mut ctx = DispatchContext::new(&request.method, params_value);

        if let Err(err) = self.middleware.execute_before(&mut ctx, session).await {
            return JsonRpcMessage::Error(middleware_error_to_wire(Some(request.id), &err));
        }

        let effective_request = JsonRpcRequest {
            params: ctx.params().cloned().map(value_to_request_params),
            ..request
        };

        let response = match session_context {
            Some(session_context) => {
                self.inner
                    .handle_request_with_context(effective_request, session_context)
                    .await
            }
            None => self.inner.handle_request(effective_request).await,
        };

        let mut result = match &response {
            JsonRpcMessage::Response(resp) => match resp.result.as_value() {
                Some(value) => DispatcherResult::Success(value.clone()),
                None => DispatcherResult::Success(Value::Null),
            },
            JsonRpcMessage::Error(err) => DispatcherResult::Error(err.error.message.clone()),
        };

        if let Err(err) = self.middleware.execute_after(&ctx, &mut result).await {
            return JsonRpcMessage::Error(middleware_error_to_wire(response.id().cloned(), &err));
        }

        match result {
            DispatcherResult::Success(value) if response.is_error() => {
                // A middleware turned an error into success in `after_dispatch`.
                let id = response.id().cloned().unwrap_or(mcp_jsonrpc::types::RequestId::Null);
                JsonRpcMessage::success(id, ResponseResult::Success(value))
            }
            DispatcherResult::Success(_) => response,
            DispatcherResult::Error(message) => {
                let id = response.id().cloned();
                JsonRpcMessage::Error(JsonRpcErrorMessage::new(
                    id,
                    JsonRpcErrorObject::internal_error(Some(message)),
                ))
            }
        }
    }

    /// Dispatch a single notification (no response expected either way).
    pub async fn handle_notification(
        &self,
        notification: mcp_jsonrpc::notification::JsonRpcNotification,
    ) -> Result<(), McpError> {
        self.inner.handle_notification(notification).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mcp_jsonrpc::types::RequestId;

    struct Echo;

    #[async_trait]
    impl JsonRpcHandler for Echo {
        type Error = McpError;

        async fn handle(
            &self,
            _method: &str,
            params: Option<RequestParams>,
            _session_context: Option<mcp_jsonrpc::r#async::SessionContext>,
        ) -> Result<Value, McpError> {
            Ok(params.map(|p| p.to_value()).unwrap_or(Value::Null))
        }

        fn supported_methods(&self) -> Vec<String> {
            vec!["echo".to_string()]
        }
    }

    fn request(method: &str, params: Option<RequestParams>) -> JsonRpcRequest {
        JsonRpcRequest::new(RequestId::Number(1), method.to_string(), params)
    }

    #[tokio::test]
    async fn dispatches_through_empty_middleware_chain() {
        let dispatcher = McpDispatcher::new();
        dispatcher.register_handler(Echo);

        let params = RequestParams::Object(
            [("hello".to_string(), serde_json::json!("world"))].into_iter().collect(),
        );
        let response = dispatcher.handle_request(request("echo", Some(params)), None, None).await;

        let JsonRpcMessage::Response(resp) = response else {
            panic!("expected success response");
        };
        assert_eq!(resp.result.as_value().unwrap()["hello"], serde_json::json!("world"));
    }

    #[tokio::test]
    async fn unregistered_method_is_method_not_found() {
        let dispatcher = McpDispatcher::new();
        let response = dispatcher.handle_request(request("nope", None), None, None).await;

        let JsonRpcMessage::Error(err) = response else {
            panic!("expected error response");
        };
        assert_eq!(err.error.code, -32601);
    }
}
