//! Middleware system for MCP servers
//!
//! Re-exports middleware types from the HTTP transport layer. The
//! before/after chain itself lives in `mcp-http-transport::middleware`;
//! [`crate::dispatch`] runs it around the method-table dispatch.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mcp_dispatcher::prelude::*;
//! use mcp_dispatcher::middleware::{McpMiddleware, RequestContext, SessionInjection, MiddlewareError};
//! use mcp_session_storage::SessionView;
//! use async_trait::async_trait;
//!
//! // Define custom middleware
//! struct LoggingMiddleware;
//!
//! #[async_trait]
//! impl McpMiddleware for LoggingMiddleware {
//!     async fn before_dispatch(
//!         &self,
//!         ctx: &mut RequestContext<'_>,
//!         _session: Option<&dyn SessionView>,
//!         _injection: &mut SessionInjection,
//!     ) -> Result<(), MiddlewareError> {
//!         println!("Request: {}", ctx.method());
//!         Ok(())
//!     }
//! }
//! ```

pub use mcp_http_transport::middleware::*;
