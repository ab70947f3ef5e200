//! # Session Storage Abstractions and Implementations
//!
//! **Pluggable session storage backends for MCP servers across deployment scenarios.**
//!
//! Provides the core `SessionStorage` trait with an in-memory implementation
//! suitable for single-instance deployments. The trait is backend-agnostic so
//! a persistent implementation can be added later without touching dispatcher
//! or transport code.

// Resumable SSE event ID codec ("<seq>#<streamId>").
mod event_id;

// Core trait and types
mod traits;
/// Core session storage traits and types for pluggable backend implementations
pub use traits::*;

// Implementations
pub mod in_memory;
pub mod prelude;

// Minimal session view for middleware that shouldn't depend on the full
// SessionStorage trait.
mod session_view;
pub use session_view::SessionView;

/// In-memory session storage implementation for development and production
/// single-instance deployments
pub use in_memory::{InMemoryConfig, InMemoryError, InMemorySessionStorage, InMemoryStats};

/// Convenience type alias for session storage results
pub type StorageResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Create a default in-memory session storage instance for development and testing
pub fn create_default_storage() -> InMemorySessionStorage {
    InMemorySessionStorage::new()
}

/// Create an in-memory session storage with custom configuration and cleanup settings
pub fn create_memory_storage(config: InMemoryConfig) -> InMemorySessionStorage {
    InMemorySessionStorage::with_config(config)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use mcp_protocol::ServerCapabilities;

    #[tokio::test]
    async fn test_storage_trait_compliance() {
        let storage = create_default_storage();

        let session = storage
            .create_session(ServerCapabilities::default())
            .await
            .unwrap();
        let session_id = session.session_id.clone();

        assert!(storage.get_session(&session_id).await.unwrap().is_some());
        assert_eq!(storage.session_count().await.unwrap(), 1);

        storage
            .set_session_state(&session_id, "test", serde_json::json!("value"))
            .await
            .unwrap();
        let value = storage
            .get_session_state(&session_id, "test")
            .await
            .unwrap();
        assert_eq!(value, Some(serde_json::json!("value")));

        let appended = storage
            .append_event(&session_id, "req-1", "message".to_string(), serde_json::json!({"data": "test"}))
            .await
            .unwrap();
        assert!(appended.is_some());

        let deleted = storage.delete_session(&session_id).await.unwrap();
        assert!(deleted);
        assert_eq!(storage.session_count().await.unwrap(), 0);
    }
}
