//! Built-in middleware implementations
//!
//! This module provides production-ready middleware for common use cases:
//!
//! - **Logging**: Request/response logging with duration tracking
//! - **Authentication**: API key and token validation
//! - **Rate Limiting**: Token bucket rate limiting per session
//!
//! # Examples
//!
//! ```rust,ignore
//! use mcp_dispatcher::prelude::*;
//! use mcp_dispatcher::middleware::builtins::LoggingMiddleware;
//!
//! let server = McpServer::builder()
//!     .name("my-server")
//!     .middleware(LoggingMiddleware::new())
//!     .build()?;
//! ```

// Built-in middleware will be implemented in Phase 4
// For now, this module serves as a placeholder
