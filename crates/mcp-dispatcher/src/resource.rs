//! High-level trait for implementing MCP resources.

use async_trait::async_trait;
use serde_json::Value;
use mcp_protocol::{McpResult, resources::{Resource, ResourceContent}};

use crate::SessionContext;

/// A pluggable resource handler. Implementors describe themselves via
/// [`McpResource::resource`] and serve content via [`McpResource::read`].
#[async_trait]
pub trait McpResource: Send + Sync {
    /// The resource's `resources/list` descriptor.
    fn resource(&self) -> Resource;

    /// Read the resource content. `params` carries read-specific parameters
    /// (query filters, range selectors); `session` gives access to
    /// session-scoped state for personalized content.
    async fn read(&self, params: Option<Value>, session: Option<&SessionContext>) -> McpResult<Vec<ResourceContent>>;

    /// Subscribe to resource-change notifications. Resources without live
    /// updates leave this at its default, which reports unsupported.
    async fn subscribe(&self, _params: Option<Value>) -> McpResult<()> {
        Err(mcp_protocol::McpError::tool_execution(
            "Resource does not support subscriptions",
        ))
    }

    /// Unsubscribe from resource-change notifications.
    async fn unsubscribe(&self, _params: Option<Value>) -> McpResult<()> {
        Err(mcp_protocol::McpError::tool_execution(
            "Resource does not support subscriptions",
        ))
    }
}

/// Converts an [`McpResource`] trait object to its protocol [`Resource`] descriptor.
pub fn resource_to_descriptor(resource: &dyn McpResource) -> Resource {
    resource.resource()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestResource {
        uri: String,
        name: String,
        content: String,
    }

    #[async_trait]
    impl McpResource for TestResource {
        fn resource(&self) -> Resource {
            Resource::new(&self.uri, &self.name)
                .with_description("A test resource")
                .with_mime_type("text/plain")
        }

        async fn read(&self, _params: Option<Value>, _session: Option<&SessionContext>) -> McpResult<Vec<ResourceContent>> {
            Ok(vec![ResourceContent::text(&self.uri, &self.content)])
        }
    }

    #[test]
    fn test_resource_descriptor() {
        let resource = TestResource {
            uri: "test://example".to_string(),
            name: "Test Resource".to_string(),
            content: "Test content".to_string(),
        };

        let descriptor = resource_to_descriptor(&resource);
        assert_eq!(descriptor.uri, "test://example");
        assert_eq!(descriptor.name, "Test Resource");
        assert_eq!(descriptor.description, Some("A test resource".to_string()));
        assert_eq!(descriptor.mime_type, Some("text/plain".to_string()));
    }

    #[tokio::test]
    async fn test_resource_read() {
        let resource = TestResource {
            uri: "test://example".to_string(),
            name: "Test Resource".to_string(),
            content: "Hello, world!".to_string(),
        };

        let result = resource.read(None, None).await.unwrap();
        assert_eq!(result.len(), 1);

        let ResourceContent::Text(text_content) = &result[0] else {
            panic!("Expected text content, got: {:?}", result[0]);
        };
        assert_eq!(text_content.text, "Hello, world!");
    }

    #[tokio::test]
    async fn test_resource_subscribe_default() {
        let resource = TestResource {
            uri: "test://example".to_string(),
            name: "Test Resource".to_string(),
            content: "Test content".to_string(),
        };

        let result = resource.subscribe(None).await;
        let Err(mcp_protocol::McpError::ToolExecutionError(message)) = result else {
            panic!("Expected ToolExecutionError, got: {:?}", result);
        };
        assert!(message.contains("subscriptions"));
    }
}
