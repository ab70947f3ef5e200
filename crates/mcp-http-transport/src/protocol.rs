//! MCP Protocol Version Detection and Features
//!
//! This module handles MCP protocol version detection from HTTP headers
//! and provides feature flags for different protocol versions.

/// Supported MCP protocol versions and features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpProtocolVersion {
    /// Original protocol without streamable HTTP (introduced 2024-11-05)
    V2024_11_05,
    /// Protocol including streamable HTTP (introduced 2025-03-26)
    V2025_03_26,
    /// Protocol with structured _meta, cursor, progressToken, and elicitation (introduced 2025-06-18)
    V2025_06_18,
    /// Protocol with tasks, icons, URL elicitation, and sampling tools (introduced 2025-11-25)
    V2025_11_25,
}

impl McpProtocolVersion {
    /// Parses a version string like "2024-11-05", "2025-03-26", "2025-06-18", or "2025-11-25".
    pub fn parse_version(s: &str) -> Option<Self> {
        match s {
            "2024-11-05" => Some(McpProtocolVersion::V2024_11_05),
            "2025-03-26" => Some(McpProtocolVersion::V2025_03_26),
            "2025-06-18" => Some(McpProtocolVersion::V2025_06_18),
            "2025-11-25" => Some(McpProtocolVersion::V2025_11_25),
            _ => None,
        }
    }

    /// Converts this version to its string representation.
    pub fn to_string(&self) -> &'static str {
        match self {
            McpProtocolVersion::V2024_11_05 => "2024-11-05",
            McpProtocolVersion::V2025_03_26 => "2025-03-26",
            McpProtocolVersion::V2025_06_18 => "2025-06-18",
            McpProtocolVersion::V2025_11_25 => "2025-11-25",
        }
    }

    /// Returns whether this version supports streamable HTTP (SSE).
    pub fn supports_streamable_http(&self) -> bool {
        matches!(
            self,
            McpProtocolVersion::V2025_03_26
                | McpProtocolVersion::V2025_06_18
                | McpProtocolVersion::V2025_11_25
        )
    }

    /// Returns whether this version supports `_meta` fields in requests, responses, and notifications.
    pub fn supports_meta_fields(&self) -> bool {
        matches!(
            self,
            McpProtocolVersion::V2025_06_18 | McpProtocolVersion::V2025_11_25
        )
    }

    /// Returns whether this version supports the use of `progressToken` and `cursor` in `_meta`.
    pub fn supports_progress_and_cursor(&self) -> bool {
        matches!(
            self,
            McpProtocolVersion::V2025_06_18 | McpProtocolVersion::V2025_11_25
        )
    }

    /// Returns whether this version supports structured user elicitation via JSON Schema.
    pub fn supports_elicitation(&self) -> bool {
        matches!(
            self,
            McpProtocolVersion::V2025_06_18 | McpProtocolVersion::V2025_11_25
        )
    }

    /// Returns whether this version supports the task system (experimental).
    pub fn supports_tasks(&self) -> bool {
        matches!(self, McpProtocolVersion::V2025_11_25)
    }

    /// Returns whether this version supports icons.
    pub fn supports_icons(&self) -> bool {
        matches!(self, McpProtocolVersion::V2025_11_25)
    }

    /// Get a list of supported features for this protocol version
    pub fn supported_features(&self) -> Vec<&'static str> {
        let mut features = vec![];
        if self.supports_streamable_http() {
            features.push("streamable-http");
        }
        if self.supports_meta_fields() {
            features.push("_meta-fields");
        }
        if self.supports_progress_and_cursor() {
            features.push("progress-token");
            features.push("cursor");
        }
        if self.supports_elicitation() {
            features.push("elicitation");
        }
        if self.supports_tasks() {
            features.push("tasks");
        }
        if self.supports_icons() {
            features.push("icons");
        }
        features
    }

    /// The latest protocol version this server implements.
    pub const LATEST: McpProtocolVersion = McpProtocolVersion::V2025_11_25;
}

impl Default for McpProtocolVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl std::fmt::Display for McpProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string())
    }
}

/// Extract MCP protocol version from HTTP request headers
pub fn extract_protocol_version(headers: &hyper::HeaderMap) -> McpProtocolVersion {
    headers
        .get("MCP-Protocol-Version")
        .and_then(|h| h.to_str().ok())
        .and_then(McpProtocolVersion::parse_version)
        .unwrap_or(McpProtocolVersion::LATEST)
}

/// Extract MCP session ID from HTTP request headers
pub fn extract_session_id(headers: &hyper::HeaderMap) -> Option<String> {
    headers
        .get("Mcp-Session-Id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

/// Extract Last-Event-ID from HTTP request headers for SSE resumability.
///
/// The value is the opaque composite event ID (`"<seq>#<streamId>"`) handed
/// out by the session store; it's passed through uninterpreted here and
/// decoded by whichever stream ends up replaying it.
pub fn extract_last_event_id(headers: &hyper::HeaderMap) -> Option<String> {
    headers
        .get("Last-Event-ID")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}
