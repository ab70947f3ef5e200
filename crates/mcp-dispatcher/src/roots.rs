//! High-level trait for implementing MCP roots functionality.

use async_trait::async_trait;
use std::path::PathBuf;
use mcp_protocol::{
    McpResult,
    roots::{ListRootsRequest, ListRootsResult, Root, RootsListChangedNotification},
};

/// File information for root directory listings.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: String,
    pub is_directory: bool,
    pub size: Option<u64>,
    pub modified: Option<u64>,
    pub mime_type: Option<String>,
}

/// Access level for files and directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    None,
    Read,
    Write,
    Full,
}

/// A pluggable root-directory handler. Implementors describe themselves via
/// [`McpRoot::root`] and expose file access via [`McpRoot::list_files`]/[`McpRoot::check_access`].
#[async_trait]
pub trait McpRoot: Send + Sync {
    /// The root's `roots/list` descriptor.
    fn root(&self) -> Root;

    /// Handle a `roots/list` request. Default wraps [`Self::root`] into a
    /// single-entry result; override for handlers aggregating multiple roots.
    async fn list_roots(&self, _request: ListRootsRequest) -> McpResult<ListRootsResult> {
        Ok(ListRootsResult::new(vec![self.root()]))
    }

    /// List files and directories within the specified path.
    async fn list_files(&self, path: &str) -> McpResult<Vec<FileInfo>>;

    /// Determine the client's access level for the specified path.
    async fn check_access(&self, path: &str) -> McpResult<AccessLevel>;

    /// Whether this handler manages the given path.
    fn can_handle(&self, path: &str) -> bool {
        path.starts_with(&self.root().uri.replace("file://", ""))
    }

    /// Priority for request routing when multiple handlers could manage the
    /// same path. Higher runs first.
    fn priority(&self) -> u32 {
        0
    }

    /// Validates that `path` stays within the root directory.
    async fn validate_path(&self, path: &str) -> McpResult<()> {
        let root_path = self.root().uri.replace("file://", "");
        let canonical_path = PathBuf::from(path);
        let canonical_root = PathBuf::from(&root_path);

        if !canonical_path.starts_with(&canonical_root) {
            return Err(mcp_protocol::McpError::validation(
                "Path is outside root directory",
            ));
        }

        Ok(())
    }

    /// Starts watching the root directory for changes. No-op by default.
    async fn start_watching(&self) -> McpResult<()> {
        Ok(())
    }

    /// Stops watching the root directory for changes. No-op by default.
    async fn stop_watching(&self) -> McpResult<()> {
        Ok(())
    }

    /// Builds a `notifications/roots/listChanged` notification for this root.
    async fn notify_roots_changed(&self) -> McpResult<RootsListChangedNotification> {
        Ok(RootsListChangedNotification::new())
    }

    /// Retrieves metadata for a specific file or directory under the root.
    async fn get_file_info(&self, path: &str) -> McpResult<Option<FileInfo>> {
        use std::fs;
        use std::time::UNIX_EPOCH;

        let full_path = self.root().uri.replace("file://", "") + "/" + path;

        match fs::metadata(&full_path) {
            Ok(metadata) => {
                let modified = metadata
                    .modified()
                    .ok()
                    .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                    .map(|duration| duration.as_secs());

                let info = FileInfo {
                    path: path.to_string(),
                    is_directory: metadata.is_dir(),
                    size: if metadata.is_file() { Some(metadata.len()) } else { None },
                    modified,
                    mime_type: if metadata.is_file() {
                        match path.split('.').next_back() {
                            Some("txt") => Some("text/plain".to_string()),
                            Some("json") => Some("application/json".to_string()),
                            Some("html") => Some("text/html".to_string()),
                            Some("md") => Some("text/markdown".to_string()),
                            _ => Some("application/octet-stream".to_string()),
                        }
                    } else {
                        None
                    },
                };
                Ok(Some(info))
            }
            Err(_) => Ok(None),
        }
    }
}

/// Builds a `roots/list` request targeting a particular root (convenience
/// for dispatch code that needs one).
pub fn root_to_list_request(_root: &dyn McpRoot) -> ListRootsRequest {
    ListRootsRequest::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRoot {
        uri: String,
        name: Option<String>,
        read_only: bool,
    }

    #[async_trait]
    impl McpRoot for TestRoot {
        fn root(&self) -> Root {
            let mut root = Root::new(&self.uri);
            if let Some(ref name) = self.name {
                root = root.with_name(name.clone());
            }
            root
        }

        async fn list_files(&self, path: &str) -> McpResult<Vec<FileInfo>> {
            if path.is_empty() || path == "/" {
                Ok(vec![
                    FileInfo {
                        path: "README.md".to_string(),
                        is_directory: false,
                        size: Some(1024),
                        modified: Some(1640995200),
                        mime_type: Some("text/markdown".to_string()),
                    },
                    FileInfo {
                        path: "src".to_string(),
                        is_directory: true,
                        size: None,
                        modified: Some(1640995200),
                        mime_type: None,
                    },
                ])
            } else {
                Ok(vec![])
            }
        }

        async fn check_access(&self, _path: &str) -> McpResult<AccessLevel> {
            if self.read_only {
                Ok(AccessLevel::Read)
            } else {
                Ok(AccessLevel::Full)
            }
        }
    }

    #[test]
    fn test_root_descriptor() {
        let root = TestRoot {
            uri: "file:///home/user/project".to_string(),
            name: Some("Test Project".to_string()),
            read_only: false,
        };

        let descriptor = root.root();
        assert_eq!(descriptor.uri, "file:///home/user/project");
        assert_eq!(descriptor.name.as_deref(), Some("Test Project"));
    }

    #[tokio::test]
    async fn test_root_validation() {
        let root = TestRoot {
            uri: "file:///home/user".to_string(),
            name: None,
            read_only: true,
        };

        let valid_result = root.validate_path("/home/user/project/file.txt").await;
        assert!(valid_result.is_ok());
    }

    #[tokio::test]
    async fn test_file_listing() {
        let root = TestRoot {
            uri: "file:///test".to_string(),
            name: Some("Test Root".to_string()),
            read_only: false,
        };

        let files = root.list_files("").await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "README.md");
        assert!(!files[0].is_directory);
        assert_eq!(files[1].path, "src");
        assert!(files[1].is_directory);
    }

    #[tokio::test]
    async fn test_access_levels() {
        let read_only_root = TestRoot {
            uri: "file:///readonly".to_string(),
            name: None,
            read_only: true,
        };

        let full_access_root = TestRoot {
            uri: "file:///writable".to_string(),
            name: None,
            read_only: false,
        };

        assert_eq!(read_only_root.check_access("test").await.unwrap(), AccessLevel::Read);
        assert_eq!(full_access_root.check_access("test").await.unwrap(), AccessLevel::Full);
    }

    #[tokio::test]
    async fn test_roots_changed_notification() {
        let root = TestRoot {
            uri: "file:///test".to_string(),
            name: None,
            read_only: false,
        };

        let notification = root.notify_roots_changed().await.unwrap();
        assert_eq!(notification.method, "notifications/roots/listChanged");
    }

    #[tokio::test]
    async fn test_list_roots_default() {
        let root = TestRoot {
            uri: "file:///test".to_string(),
            name: None,
            read_only: false,
        };

        let result = root.list_roots(ListRootsRequest::new()).await.unwrap();
        assert_eq!(result.roots.len(), 1);
        assert_eq!(result.roots[0].uri, "file:///test");
    }
}
