use serde::{Deserialize, Serialize};
use std::fmt;

/// The `"jsonrpc"` version tag. JSON-RPC 2.0 is the only version this crate speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsonRpcVersion {
    #[serde(rename = "2.0")]
    V2_0,
}

impl Default for JsonRpcVersion {
    fn default() -> Self {
        JsonRpcVersion::V2_0
    }
}

impl fmt::Display for JsonRpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("2.0")
    }
}

/// A JSON-RPC request/response identifier.
///
/// Per the JSON-RPC 2.0 spec an id may be a number, a string, or `null`.
/// `null` is a valid id on the wire (used by some clients for fire-and-forget
/// requests that still want a correlated response) and is distinct from the
/// complete *absence* of an `id` field, which is what makes a message a
/// notification rather than a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    Null,
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Null => write!(f, "null"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_serializes_as_2_0() {
        assert_eq!(serde_json::to_string(&JsonRpcVersion::V2_0).unwrap(), "\"2.0\"");
    }

    #[test]
    fn request_id_round_trips_each_variant() {
        for id in [RequestId::Number(7), RequestId::String("abc".into()), RequestId::Null] {
            let json = serde_json::to_string(&id).unwrap();
            let parsed: RequestId = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, id);
        }
    }
}
