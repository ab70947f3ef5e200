//! Helper for turning a raw JSON-RPC `params` value into a typed MCP params struct.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::McpError;

/// Deserializes `params` (an object or array, per JSON-RPC 2.0) into `T`,
/// mapping a missing value or a shape mismatch onto [`McpError::InvalidParameters`].
pub fn extract_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, McpError> {
    let value = params.unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| McpError::InvalidParameters(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Args {
        name: String,
    }

    #[test]
    fn extracts_valid_object_params() {
        let args: Args = extract_params(Some(json!({"name": "tool"}))).unwrap();
        assert_eq!(args.name, "tool");
    }

    #[test]
    fn missing_required_field_is_invalid_parameters() {
        let err = extract_params::<Args>(Some(json!({}))).unwrap_err();
        assert!(matches!(err, McpError::InvalidParameters(_)));
    }
}
