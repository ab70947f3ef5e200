//! Incoming-message parsing and result shaping for transports.
//!
//! [`crate::response::JsonRpcMessage`] models an *outgoing* wire message
//! (a response or an error). Transports need a matching type for what comes
//! *in* over the wire, where a message is either a request (has an `id`) or a
//! notification (has none) — that's [`JsonRpcMessage`] here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JsonRpcError;
use crate::notification::JsonRpcNotification;
use crate::request::JsonRpcRequest;
use crate::response::{JsonRpcError as JsonRpcErrorMessage, JsonRpcResponse};

/// A parsed incoming JSON-RPC 2.0 message: either a request (carries an `id`
/// and expects a response) or a notification (no `id`, fire-and-forget).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
    /// A JSON-RPC batch: a top-level JSON array of requests/notifications.
    /// Transports decide per protocol version whether to honor this or
    /// reject it outright (see `2025-06-18`'s "Batch requests are not
    /// supported").
    Batch(Vec<JsonRpcMessage>),
    /// A client's reply to a server-initiated request (`elicitation/create`,
    /// `sampling/createMessage`): has an `id` but no `method`. Distinct from
    /// [`JsonRpcMessage::Request`], which always carries a `method`.
    Response(IncomingResponse),
}

/// The two shapes a client's reply to a server-initiated request can take.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncomingResponse {
    Result(JsonRpcResponse),
    Error(JsonRpcError),
}

/// What a transport should do after dispatching a parsed message.
#[derive(Debug, Clone)]
pub enum JsonRpcMessageResult {
    /// A request was handled; send this response body.
    Response(JsonRpcResponse),
    /// A request failed; send this error body.
    Error(JsonRpcErrorMessage),
    /// A notification was handled; nothing is sent back (e.g. HTTP 202).
    NoResponse,
}

/// Parse a raw request body into a [`JsonRpcMessage`].
///
/// A message with an `id` field (even `null`) is a request; a message with
/// no `id` field at all is a notification. `serde(untagged)` alone can't
/// make that distinction reliably (missing vs. null), so this inspects the
/// raw JSON first.
pub fn parse_json_rpc_message(body: &str) -> Result<JsonRpcMessage, JsonRpcError> {
    let value: Value = serde_json::from_str(body).map_err(|_| JsonRpcError::parse_error())?;
    parse_json_rpc_value(value)
}

/// Parse an already-decoded JSON value into a [`JsonRpcMessage`].
///
/// A top-level array is a JSON-RPC batch; each element is parsed
/// recursively (a batch element is itself a request or notification, never
/// a nested batch).
fn parse_json_rpc_value(value: Value) -> Result<JsonRpcMessage, JsonRpcError> {
    if let Value::Array(items) = value {
        if items.is_empty() {
            return Err(JsonRpcError::invalid_request(None));
        }
        let messages = items
            .into_iter()
            .map(parse_json_rpc_value)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(JsonRpcMessage::Batch(messages));
    }

    let has_id = value.get("id").is_some();
    let has_method = value.get("method").is_some();

    if has_method {
        if has_id {
            let request: JsonRpcRequest =
                serde_json::from_value(value).map_err(|_| JsonRpcError::invalid_request(None))?;
            Ok(JsonRpcMessage::Request(request))
        } else {
            let notification: JsonRpcNotification =
                serde_json::from_value(value).map_err(|_| JsonRpcError::invalid_request(None))?;
            Ok(JsonRpcMessage::Notification(notification))
        }
    } else if has_id {
        if value.get("error").is_some() {
            let error: JsonRpcError =
                serde_json::from_value(value).map_err(|_| JsonRpcError::invalid_request(None))?;
            Ok(JsonRpcMessage::Response(IncomingResponse::Error(error)))
        } else {
            let response: JsonRpcResponse =
                serde_json::from_value(value).map_err(|_| JsonRpcError::invalid_request(None))?;
            Ok(JsonRpcMessage::Response(IncomingResponse::Result(response)))
        }
    } else {
        Err(JsonRpcError::invalid_request(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestId;

    #[test]
    fn parses_request_with_numeric_id() {
        let body = r#"{"jsonrpc":"2.0","id":1,"method":"ping","params":null}"#;
        match parse_json_rpc_message(body).unwrap() {
            JsonRpcMessage::Request(req) => {
                assert_eq!(req.method, "ping");
            }
            other => panic!("expected a request, got {other:?}"),
        }
    }

    #[test]
    fn parses_request_with_null_id() {
        let body = r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#;
        match parse_json_rpc_message(body).unwrap() {
            JsonRpcMessage::Request(_) => {}
            other => panic!("null id is still a request, not a notification, got {other:?}"),
        }
    }

    #[test]
    fn parses_notification_without_id() {
        let body = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        match parse_json_rpc_message(body).unwrap() {
            JsonRpcMessage::Notification(n) => {
                assert_eq!(n.method, "notifications/initialized");
            }
            other => panic!("expected a notification, got {other:?}"),
        }
    }

    #[test]
    fn parses_batch_of_requests_and_notifications() {
        let body = r#"[
            {"jsonrpc":"2.0","id":1,"method":"ping"},
            {"jsonrpc":"2.0","method":"notifications/initialized"}
        ]"#;
        match parse_json_rpc_message(body).unwrap() {
            JsonRpcMessage::Batch(messages) => {
                assert_eq!(messages.len(), 2);
                assert!(matches!(messages[0], JsonRpcMessage::Request(_)));
                assert!(matches!(messages[1], JsonRpcMessage::Notification(_)));
            }
            other => panic!("expected a batch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_batch() {
        let err = parse_json_rpc_message("[]").unwrap_err();
        assert_eq!(err.error.code, -32600);
    }

    #[test]
    fn parses_client_result_reply() {
        let body = r#"{"jsonrpc":"2.0","id":"req-1","result":{"action":"accept"}}"#;
        match parse_json_rpc_message(body).unwrap() {
            JsonRpcMessage::Response(IncomingResponse::Result(resp)) => {
                assert_eq!(resp.id, RequestId::String("req-1".to_string()));
            }
            other => panic!("expected a result reply, got {other:?}"),
        }
    }

    #[test]
    fn parses_client_error_reply() {
        let body = r#"{"jsonrpc":"2.0","id":"req-1","error":{"code":-32000,"message":"declined"}}"#;
        match parse_json_rpc_message(body).unwrap() {
            JsonRpcMessage::Response(IncomingResponse::Error(err)) => {
                assert_eq!(err.error.code, -32000);
            }
            other => panic!("expected an error reply, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_json_rpc_message("{not json").unwrap_err();
        assert_eq!(err.error.code, -32700);
    }

    #[test]
    fn rejects_missing_method() {
        let err = parse_json_rpc_message(r#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert_eq!(err.error.code, -32600);
    }
}
