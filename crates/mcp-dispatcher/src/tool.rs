//! High-level trait for implementing MCP tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;
use mcp_protocol::{CallToolResult, McpResult, tools::Tool};

use crate::schema::Validator;
use crate::session::SessionContext;

/// A pluggable tool handler. Implementors describe themselves via [`Tool::tool`]
/// and execute via [`McpTool::call`]; the dispatcher never needs more than that.
#[async_trait]
pub trait McpTool: Send + Sync {
    /// The tool's `tools/list` descriptor.
    fn tool(&self) -> Tool;

    /// Execute the tool with full session support.
    async fn call(&self, args: Value, session: Option<SessionContext>) -> McpResult<CallToolResult>;
}

/// Converts an [`McpTool`] trait object to its protocol [`Tool`] descriptor.
pub fn tool_to_descriptor(tool: &dyn McpTool) -> Tool {
    tool.tool()
}

/// A registered tool plus the schema validators compiled from its
/// descriptor at registration time.
///
/// Compiling once here — rather than per-call — is why `Validator` exists
/// at all (see [`crate::schema`]); a malformed schema is a registration-time
/// programmer error, so it's logged and the tool is registered without that
/// validator rather than failing registration outright.
#[derive(Clone)]
pub struct ToolEntry {
    pub tool: Arc<dyn McpTool>,
    pub input_validator: Option<Arc<Validator>>,
    pub output_validator: Option<Arc<Validator>>,
}

impl ToolEntry {
    pub fn new(tool: Arc<dyn McpTool>) -> Self {
        let descriptor = tool.tool();
        let input_validator = match Validator::compile(&descriptor.input_schema) {
            Ok(v) => Some(Arc::new(v)),
            Err(err) => {
                warn!(tool = %descriptor.name, error = %err, "failed to compile tool input schema");
                None
            }
        };
        let output_validator = descriptor.output_schema.as_ref().and_then(|schema| {
            match Validator::compile(schema) {
                Ok(v) => Some(Arc::new(v)),
                Err(err) => {
                    warn!(tool = %descriptor.name, error = %err, "failed to compile tool output schema");
                    None
                }
            }
        });

        Self {
            tool,
            input_validator,
            output_validator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use mcp_protocol::schema::JsonSchema;
    use mcp_protocol::tools::{ToolResult, ToolSchema};

    struct TestTool {
        input_schema: ToolSchema,
    }

    impl TestTool {
        fn new() -> Self {
            let input_schema = ToolSchema::object()
                .with_property("message", JsonSchema::string())
                .with_required(vec!["message".to_string()]);
            Self { input_schema }
        }
    }

    #[async_trait]
    impl McpTool for TestTool {
        fn tool(&self) -> Tool {
            Tool::new("test", self.input_schema.clone()).with_description("A test tool")
        }

        async fn call(&self, args: Value, _session: Option<SessionContext>) -> McpResult<CallToolResult> {
            let message = args
                .get("message")
                .and_then(|v| v.as_str())
                .ok_or_else(|| mcp_protocol::McpError::missing_param("message"))?;

            Ok(CallToolResult::success(vec![ToolResult::text(format!("Test: {}", message))]))
        }
    }

    #[test]
    fn test_tool_descriptor() {
        let tool = TestTool::new();
        let descriptor = tool_to_descriptor(&tool);
        assert_eq!(descriptor.name, "test");
        assert_eq!(descriptor.description, Some("A test tool".to_string()));
        assert!(descriptor.input_schema.properties.contains_key("message"));
    }

    #[tokio::test]
    async fn test_tool_call() {
        let tool = TestTool::new();
        let args = serde_json::json!({"message": "hello"});

        let result = tool.call(args, None).await.unwrap();
        assert!(!result.content.is_empty());

        let ToolResult::Text { text, .. } = &result.content[0] else {
            panic!("Expected text result, got: {:?}", result.content[0]);
        };
        assert_eq!(text, "Test: hello");
    }

    #[tokio::test]
    async fn test_tool_call_error() {
        let tool = TestTool::new();
        let args = serde_json::json!({"wrong": "parameter"});

        let result = tool.call(args, None).await;
        let Err(mcp_protocol::McpError::MissingParameter(param)) = result else {
            panic!("Expected MissingParameter error");
        };
        assert_eq!(param, "message");
    }
}
