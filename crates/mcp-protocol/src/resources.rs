//! `resources/list`, `resources/read`, and subscription wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::content::ResourceContents;
use crate::meta::{Annotations, Cursor};
use crate::traits::{HasData, HasMeta, HasMetaParam, HasMethod, HasParams, Params, RpcResult};

pub type ResourceContent = ResourceContents;

/// A resource descriptor as returned by `resources/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub uri: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl Resource {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            title: None,
            description: None,
            mime_type: None,
            size: None,
            annotations: None,
            meta: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = Some(annotations);
        self
    }
}

/// A registered URI-template resource (distinct from a concrete [`Resource`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    #[serde(rename = "uriTemplate")]
    pub uri_template: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResourcesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl Params for ListResourcesParams {}
impl HasMetaParam for ListResourcesParams {
    fn meta(&self) -> Option<&HashMap<String, Value>> {
        self.meta.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResourcesRequest {
    pub method: String,
    #[serde(default)]
    pub params: ListResourcesParams,
}

impl ListResourcesRequest {
    pub fn new() -> Self {
        Self {
            method: "resources/list".to_string(),
            params: ListResourcesParams::default(),
        }
    }
}

impl Default for ListResourcesRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl HasMethod for ListResourcesRequest {
    fn method(&self) -> &str {
        &self.method
    }
}
impl HasParams for ListResourcesRequest {
    fn params(&self) -> Option<&dyn Params> {
        Some(&self.params)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResourcesResult {
    pub resources: Vec<Resource>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl ListResourcesResult {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self {
            resources,
            next_cursor: None,
            meta: None,
        }
    }
}

impl HasData for ListResourcesResult {
    fn data(&self) -> HashMap<String, Value> {
        let mut data = HashMap::new();
        data.insert("resources".to_string(), serde_json::to_value(&self.resources).unwrap_or(Value::Null));
        if let Some(ref c) = self.next_cursor {
            data.insert("nextCursor".to_string(), Value::String(c.as_str().to_string()));
        }
        data
    }
}
impl HasMeta for ListResourcesResult {
    fn meta(&self) -> Option<HashMap<String, Value>> {
        self.meta.clone()
    }
}
impl RpcResult for ListResourcesResult {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResourceParams {
    pub uri: String,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl Params for ReadResourceParams {}
impl HasMetaParam for ReadResourceParams {
    fn meta(&self) -> Option<&HashMap<String, Value>> {
        self.meta.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResourceRequest {
    pub method: String,
    pub params: ReadResourceParams,
}

impl ReadResourceRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            method: "resources/read".to_string(),
            params: ReadResourceParams { uri: uri.into(), meta: None },
        }
    }
}

impl HasMethod for ReadResourceRequest {
    fn method(&self) -> &str {
        &self.method
    }
}
impl HasParams for ReadResourceRequest {
    fn params(&self) -> Option<&dyn Params> {
        Some(&self.params)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContents>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl ReadResourceResult {
    pub fn new(contents: Vec<ResourceContents>) -> Self {
        Self { contents, meta: None }
    }
}

impl HasData for ReadResourceResult {
    fn data(&self) -> HashMap<String, Value> {
        let mut data = HashMap::new();
        data.insert("contents".to_string(), serde_json::to_value(&self.contents).unwrap_or(Value::Null));
        data
    }
}
impl HasMeta for ReadResourceResult {
    fn meta(&self) -> Option<HashMap<String, Value>> {
        self.meta.clone()
    }
}
impl RpcResult for ReadResourceResult {}

/// A client's active subscription to resource-update notifications for one URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceSubscription {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeParams {
    pub uri: String,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl Params for SubscribeParams {}
impl HasMetaParam for SubscribeParams {
    fn meta(&self) -> Option<&HashMap<String, Value>> {
        self.meta.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub method: String,
    pub params: SubscribeParams,
}

impl SubscribeRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            method: "resources/subscribe".to_string(),
            params: SubscribeParams { uri: uri.into(), meta: None },
        }
    }
}

impl HasMethod for SubscribeRequest {
    fn method(&self) -> &str {
        &self.method
    }
}
impl HasParams for SubscribeRequest {
    fn params(&self) -> Option<&dyn Params> {
        Some(&self.params)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsubscribeRequest {
    pub method: String,
    pub params: SubscribeParams,
}

impl UnsubscribeRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            method: "resources/unsubscribe".to_string(),
            params: SubscribeParams { uri: uri.into(), meta: None },
        }
    }
}

impl HasMethod for UnsubscribeRequest {
    fn method(&self) -> &str {
        &self.method
    }
}
impl HasParams for UnsubscribeRequest {
    fn params(&self) -> Option<&dyn Params> {
        Some(&self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_round_trips_through_json() {
        let resource = Resource::new("file:///a.txt", "a.txt").with_mime_type("text/plain");
        let json = serde_json::to_string(&resource).unwrap();
        let parsed: Resource = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.uri, "file:///a.txt");
        assert_eq!(parsed.mime_type.as_deref(), Some("text/plain"));
    }
}
