//! # JSON-RPC Server Prelude
//!
//! This module provides convenient re-exports of the most commonly used types
//! from the JSON-RPC server library.
//!
//! ```rust
//! use mcp_jsonrpc::prelude::*;
//! ```

// Core JSON-RPC types
pub use crate::error::{JsonRpcError, JsonRpcErrorCode};
pub use crate::notification::JsonRpcNotification;
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::response::{JsonRpcMessage, JsonRpcResponse, ResponseResult};
pub use crate::types::{JsonRpcVersion, RequestId};

#[cfg(feature = "async")]
pub use crate::r#async::{JsonRpcHandler, SessionContext, ToJsonRpcError};

// Standard error codes
pub use crate::error_codes::*;