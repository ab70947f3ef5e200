//! `tools/list` and `tools/call` wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::content::ContentBlock;
use crate::meta::Cursor;
use crate::schema::JsonSchema;
use crate::traits::{HasData, HasMeta, HasMetaParam, HasMethod, HasParams, Params, RpcResult};

/// A tool's declared input/output shape. Mirrors a JSON Schema object node
/// closely enough to serialize directly as one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, JsonSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl ToolSchema {
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: HashMap::new(),
            required: None,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, schema: JsonSchema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn with_required(mut self, required: Vec<String>) -> Self {
        self.required = Some(required);
        self
    }
}

/// Behavioural hints a tool author can declare so hosts can render or gate
/// calls appropriately (MCP `ToolAnnotations`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_world_hint: Option<bool>,
}

/// A tool descriptor as returned by `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: ToolSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<ToolSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl Tool {
    pub fn new(name: impl Into<String>, input_schema: ToolSchema) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            input_schema,
            output_schema: None,
            annotations: None,
            meta: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_output_schema(mut self, schema: ToolSchema) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn with_annotations(mut self, annotations: ToolAnnotations) -> Self {
        self.annotations = Some(annotations);
        self
    }
}

/// Content returned by a tool call — reuses [`ContentBlock`], since the wire
/// shape (`{"type": "text", "text": ...}` etc.) is identical.
pub type ToolResult = ContentBlock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListToolsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl Params for ListToolsParams {}
impl HasMetaParam for ListToolsParams {
    fn meta(&self) -> Option<&HashMap<String, Value>> {
        self.meta.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsRequest {
    pub method: String,
    #[serde(default)]
    pub params: ListToolsParams,
}

impl ListToolsRequest {
    pub fn new() -> Self {
        Self {
            method: "tools/list".to_string(),
            params: ListToolsParams::default(),
        }
    }
}

impl Default for ListToolsRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl HasMethod for ListToolsRequest {
    fn method(&self) -> &str {
        &self.method
    }
}
impl HasParams for ListToolsRequest {
    fn params(&self) -> Option<&dyn Params> {
        Some(&self.params)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<Tool>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl ListToolsResult {
    pub fn new(tools: Vec<Tool>) -> Self {
        Self {
            tools,
            next_cursor: None,
            meta: None,
        }
    }

    pub fn with_next_cursor(mut self, cursor: Cursor) -> Self {
        self.next_cursor = Some(cursor);
        self
    }
}

impl HasData for ListToolsResult {
    fn data(&self) -> HashMap<String, Value> {
        let mut data = HashMap::new();
        data.insert("tools".to_string(), serde_json::to_value(&self.tools).unwrap_or(Value::Null));
        if let Some(ref c) = self.next_cursor {
            data.insert("nextCursor".to_string(), Value::String(c.as_str().to_string()));
        }
        data
    }
}
impl HasMeta for ListToolsResult {
    fn meta(&self) -> Option<HashMap<String, Value>> {
        self.meta.clone()
    }
}
impl RpcResult for ListToolsResult {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<HashMap<String, Value>>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl Params for CallToolParams {}
impl HasMetaParam for CallToolParams {
    fn meta(&self) -> Option<&HashMap<String, Value>> {
        self.meta.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolRequest {
    pub method: String,
    pub params: CallToolParams,
}

impl CallToolRequest {
    pub fn new(name: impl Into<String>, arguments: Option<HashMap<String, Value>>) -> Self {
        Self {
            method: "tools/call".to_string(),
            params: CallToolParams {
                name: name.into(),
                arguments,
                meta: None,
            },
        }
    }
}

impl HasMethod for CallToolRequest {
    fn method(&self) -> &str {
        &self.method
    }
}
impl HasParams for CallToolRequest {
    fn params(&self) -> Option<&dyn Params> {
        Some(&self.params)
    }
}

/// Result of `tools/call`. `structured_content` carries the typed result when
/// the tool declares an `output_schema`; `content` is always populated so
/// clients without structured-output support still get something to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<ToolResult>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl CallToolResult {
    pub fn success(content: Vec<ToolResult>) -> Self {
        Self {
            content,
            is_error: false,
            structured_content: None,
            meta: None,
        }
    }

    pub fn error(content: Vec<ToolResult>) -> Self {
        Self {
            content,
            is_error: true,
            structured_content: None,
            meta: None,
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::success(vec![ToolResult::text(text)])
    }

    /// Serializes `result` both as the human-readable text content and,
    /// when an output schema is declared, as `structured_content`.
    pub fn from_result_with_schema<T: Serialize>(
        result: &T,
        output_schema: Option<&ToolSchema>,
    ) -> crate::McpResult<Self> {
        let value = serde_json::to_value(result)?;
        let mut out = Self::success(vec![ToolResult::text(value.to_string())]);
        if output_schema.is_some() {
            out.structured_content = Some(value);
        }
        Ok(out)
    }

    pub fn with_structured_content(mut self, value: Value) -> Self {
        self.structured_content = Some(value);
        self
    }
}

impl HasData for CallToolResult {
    fn data(&self) -> HashMap<String, Value> {
        let mut data = HashMap::new();
        data.insert("content".to_string(), serde_json::to_value(&self.content).unwrap_or(Value::Null));
        data.insert("isError".to_string(), Value::Bool(self.is_error));
        if let Some(ref sc) = self.structured_content {
            data.insert("structuredContent".to_string(), sc.clone());
        }
        data
    }
}
impl HasMeta for CallToolResult {
    fn meta(&self) -> Option<HashMap<String, Value>> {
        self.meta.clone()
    }
}
impl RpcResult for CallToolResult {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_tool_result_from_text_is_not_error() {
        let result = CallToolResult::from_text("hi");
        assert!(!result.is_error);
        assert_eq!(result.content.len(), 1);
    }

    #[test]
    fn tool_schema_serializes_required_array() {
        let schema = ToolSchema::object()
            .with_property("name", JsonSchema::string())
            .with_required(vec!["name".to_string()]);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["required"], serde_json::json!(["name"]));
    }
}
