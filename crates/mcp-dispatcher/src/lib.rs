//! # MCP Server Framework
//!
//! A high-level framework for building Model Context Protocol (MCP) servers in Rust.
//! This crate provides the method dispatch, middleware, session tracking, and
//! handler traits (`McpTool`, `McpResource`, `McpPrompt`, `McpRoot`, ...) that sit
//! between `mcp-protocol`'s wire types and `mcp-http-transport`'s HTTP/SSE layer.
//!
//! [`McpServer`] is the thing an application actually builds day to day: register
//! handler implementations on [`McpServerBuilder`], then hand the built server to
//! `mcp_http_transport` as a regular JSON-RPC handler. [`McpDispatcher`] is
//! available separately for applications that want to compose their own method
//! table (with the same middleware chain) instead of using the all-in-one server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mcp_dispatcher::{McpServer, McpTool, SessionContext};
//! use mcp_protocol::{CallToolResult, tools::{Tool, ToolResult, ToolSchema}};
//! use serde_json::Value;
//! use async_trait::async_trait;
//!
//! struct EchoTool;
//!
//! #[async_trait]
//! impl McpTool for EchoTool {
//!     fn tool(&self) -> Tool {
//!         let schema = ToolSchema::object()
//!             .with_property("text", mcp_protocol::schema::JsonSchema::string())
//!             .with_required(vec!["text".to_string()]);
//!         Tool::new("echo", schema)
//!     }
//!
//!     async fn call(&self, args: Value, _session: Option<SessionContext>) -> mcp_dispatcher::McpResult<CallToolResult> {
//!         let text = args.get("text").and_then(|v| v.as_str()).unwrap_or("").to_string();
//!         Ok(CallToolResult::success(vec![ToolResult::text(text)]))
//!     }
//! }
//!
//! let server = McpServer::builder("echo-server", "1.0.0").tool(EchoTool).build();
//! let _ = server;
//! ```

pub mod cancellation;
pub mod client_request;
pub mod completion;
pub mod dispatch;
pub mod elicitation;
pub mod logging;
pub mod middleware;
pub mod prelude;
pub mod prompt;
pub mod resource;
pub mod roots;
pub mod sampling;
pub mod schema;
pub mod server;
pub mod session;
pub mod tool;
pub mod uri_template;

/// Re-export session storage from the separate crate (breaks circular dependency).
pub use mcp_session_storage as session_storage;

// Re-export main types
pub use cancellation::CancellationHandle;
pub use client_request::{ClientRequestRegistry, ClientResponse};
pub use completion::McpCompletion;
pub use dispatch::{DispatchContext, DispatchMiddleware, McpDispatcher};
pub use elicitation::McpElicitation;
pub use logging::McpLogger;
pub use prompt::McpPrompt;
pub use resource::McpResource;
pub use roots::McpRoot;
pub use sampling::McpSampling;
pub use schema::Validator as SchemaValidator;
pub use server::{McpServer, McpServerBuilder};
pub use session::{ClientCapability, ClientView, SessionContext, SessionManager};
pub use tool::McpTool;
pub use uri_template::{UriTemplate, UriTemplateRegistry, VariableValidator};

// Re-export foundational types
pub use mcp_jsonrpc::{JsonRpcDispatcher, JsonRpcHandler};
pub use mcp_protocol::*;

// Explicitly re-export error types for convenience
pub use mcp_protocol::{McpError, McpResult as ProtocolMcpResult};

pub use mcp_http_transport;

/// Result type for framework operations that can fail outside the MCP error
/// domain (transport setup, IO), as opposed to [`McpResult`] for request handling.
pub type Result<T> = std::result::Result<T, McpFrameworkError>;

/// Result type for tool/resource/prompt operations - uses structured MCP errors.
pub type McpResult<T> = mcp_protocol::McpResult<T>;

/// Framework-level errors, distinct from the protocol-level [`McpError`] that
/// request handlers return.
#[derive(Debug, thiserror::Error)]
pub enum McpFrameworkError {
    #[error("JSON-RPC error: {0}")]
    JsonRpc(#[from] mcp_jsonrpc::JsonRpcError),

    #[error("MCP protocol error: {0}")]
    Mcp(#[from] mcp_protocol::McpError),

    #[error("HTTP transport error: {0}")]
    Http(#[from] mcp_http_transport::HttpMcpError),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
