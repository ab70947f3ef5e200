//! Cross-cutting accessor traits shared by every request/response/notification
//! payload type in this crate.
//!
//! These are the traits the dispatcher programs against instead of matching on
//! concrete types: a handler only needs `HasMethod`/`HasParams` to route a
//! request, and `RpcResult` to turn a typed result back into a wire value.

use serde_json::Value;
use std::collections::HashMap;

use crate::meta::ProgressToken;

/// Marker for a request/notification's `params` payload.
///
/// Object-safe so it can be handed around as `&dyn Params`; the concrete
/// shape is still available via `serde_json::to_value`.
pub trait Params: std::fmt::Debug {}

/// A payload that carries an optional `_meta` field.
pub trait HasMetaParam {
    fn meta(&self) -> Option<&HashMap<String, Value>>;
}

/// A payload that carries an optional `progressToken` inside `_meta`.
pub trait HasProgressTokenParam {
    fn progress_token(&self) -> Option<&ProgressToken> {
        None
    }
}

/// A request body exposing its JSON-RPC method name.
pub trait HasMethod {
    fn method(&self) -> &str;
}

/// A request body exposing its params as a type-erased [`Params`].
pub trait HasParams {
    fn params(&self) -> Option<&dyn Params>;
}

/// Arbitrary extra data carried by a non-standard result (used when a result
/// type doesn't map cleanly onto a single serializable field).
pub trait HasDataParam {
    fn data_param(&self) -> Option<&Value> {
        None
    }
}

/// A result body's primary data, flattened into a map so the dispatcher can
/// merge it with protocol-level fields before serializing the JSON-RPC
/// response.
pub trait HasData {
    fn data(&self) -> HashMap<String, Value>;
}

/// A result body's optional `_meta` field.
pub trait HasMeta {
    fn meta(&self) -> Option<HashMap<String, Value>>;
}

/// Marker composing [`HasData`] and [`HasMeta`]: any type implementing both
/// is usable as the `result` of a JSON-RPC response.
pub trait RpcResult: HasData + HasMeta {}

/// Marker for a full JSON-RPC request type (method + params).
pub trait JsonRpcRequestTrait: HasMethod + HasParams {}

/// Marker for a full JSON-RPC notification type (method, no params required).
pub trait JsonRpcNotificationTrait: HasMethod {}

/// Marker for a full JSON-RPC response/result type.
pub trait JsonRpcResponseTrait: RpcResult {}
