//! Thin MCP-facing re-export of the transport-agnostic JSON-RPC message types,
//! plus [`ResultWithMeta`] for results that need a `_meta` field bolted on
//! without redefining every result struct.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub use mcp_jsonrpc::error::JsonRpcError;
pub use mcp_jsonrpc::notification::JsonRpcNotification;
pub use mcp_jsonrpc::request::{JsonRpcRequest, RequestParams};
pub use mcp_jsonrpc::response::{JsonRpcMessage, JsonRpcResponse};

/// Wraps any serializable result type with an optional `_meta` sibling field,
/// for handlers whose result type doesn't already carry one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultWithMeta<T> {
    #[serde(flatten)]
    pub result: T,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl<T> ResultWithMeta<T> {
    pub fn new(result: T) -> Self {
        Self { result, meta: None }
    }

    pub fn with_meta(mut self, meta: HashMap<String, Value>) -> Self {
        self.meta = Some(meta);
        self
    }
}
