//! The `ping` liveness check — smallest possible MCP request/response pair.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::traits::{HasData, HasMeta, HasMetaParam, HasMethod, HasParams, Params, RpcResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyParams {
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl Params for EmptyParams {}

impl HasMetaParam for EmptyParams {
    fn meta(&self) -> Option<&HashMap<String, Value>> {
        self.meta.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingRequest {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<EmptyParams>,
}

impl PingRequest {
    pub fn new() -> Self {
        Self {
            method: "ping".to_string(),
            params: None,
        }
    }
}

impl Default for PingRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl HasMethod for PingRequest {
    fn method(&self) -> &str {
        &self.method
    }
}

impl HasParams for PingRequest {
    fn params(&self) -> Option<&dyn Params> {
        self.params.as_ref().map(|p| p as &dyn Params)
    }
}

/// Result with no meaningful payload — `ping` and a handful of other methods
/// (`notifications/initialized` acks, `roots/list` when empty) reply with
/// just `{}` plus an optional `_meta`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyResult {
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl EmptyResult {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HasData for EmptyResult {
    fn data(&self) -> HashMap<String, Value> {
        HashMap::new()
    }
}

impl HasMeta for EmptyResult {
    fn meta(&self) -> Option<HashMap<String, Value>> {
        self.meta.clone()
    }
}

impl RpcResult for EmptyResult {}
