//! Shared `_meta`/pagination/annotation types used across every MCP message.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A generic `_meta` bag attached to requests, results and notifications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta(pub HashMap<String, Value>);

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn progress_token(&self) -> Option<ProgressToken> {
        self.0.get("progressToken").and_then(|v| match v {
            Value::String(s) => Some(ProgressToken::String(s.clone())),
            Value::Number(n) => n.as_i64().map(ProgressToken::Number),
            _ => None,
        })
    }
}

/// Opaque token a client attaches to a request to correlate `notifications/progress`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressToken {
    String(String),
    Number(i64),
}

/// Opaque pagination cursor. Treated as an opaque string by this crate — the
/// handler that produced the page is the only party that can interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(pub String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Annotations any content block or resource may carry: intended audience,
/// display priority, and last-modified timestamp, plus a free-form title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Intended audience, as lowercase role names ("user", "assistant").
    /// Kept as plain strings rather than a shared `Role` enum since prompts
    /// and sampling each define their own `Role` with slightly different
    /// variants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_audience(mut self, audience: Vec<String>) -> Self {
        self.audience = Some(audience);
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }
}

/// Helper for result types that always carry `prompts`/`resources`/`tools`
/// plus an optional `nextCursor`.
pub trait PaginatedResponse {
    fn next_cursor(&self) -> Option<&Cursor>;
    fn has_more(&self) -> bool {
        self.next_cursor().is_some()
    }
}

/// Helper for result types reporting incremental progress alongside their data.
pub trait ProgressResponse {
    fn progress(&self) -> f64;
    fn total(&self) -> Option<f64> {
        None
    }
}

/// A value with an attached `_meta` bag, used where the wire type flattens
/// `_meta` next to its primary payload rather than nesting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithMeta<T> {
    #[serde(flatten)]
    pub value: T,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl<T> WithMeta<T> {
    pub fn new(value: T) -> Self {
        Self { value, meta: None }
    }

    pub fn with_meta(mut self, meta: HashMap<String, Value>) -> Self {
        self.meta = Some(meta);
        self
    }
}
