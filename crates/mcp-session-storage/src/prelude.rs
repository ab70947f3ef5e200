//! # Session Storage Prelude
//!
//! This module provides convenient re-exports of the most commonly used types
//! from the session storage library.
//!
//! ```rust
//! use mcp_session_storage::prelude::*;
//! ```

// Core trait and types
pub use crate::traits::{
    BoxedSessionStorage, SessionInfo, SessionStorage, SessionStorageBuilder, SessionStorageError,
    SseEvent,
};

pub use crate::session_view::SessionView;

// In-memory implementation (always available)
pub use crate::in_memory::{InMemoryConfig, InMemoryError, InMemorySessionStorage, InMemoryStats};

// Convenience functions
pub use crate::{create_default_storage, create_memory_storage, StorageResult};
