//! Input-schema validation for tool calls, resource reads, and prompt
//! arguments.
//!
//! Tool/resource/prompt descriptors carry a JSON Schema (`ToolSchema` /
//! [`mcp_protocol::schema::JsonSchema`]); this module compiles that schema
//! once per descriptor and validates call arguments against it before a
//! handler ever sees them, turning schema violations into a single
//! consistently-shaped `McpError::InvalidParameters` instead of ad-hoc
//! `args.get(...)` checks scattered through every handler.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use mcp_protocol::elicitation::{BooleanSchema, ElicitationSchema, EnumSchema, NumberSchema, PrimitiveSchemaDefinition, StringSchema};
use mcp_protocol::schema::JsonSchema;
use mcp_protocol::tools::ToolSchema;
use mcp_protocol::{McpError, McpResult};

/// A compiled JSON Schema ready to validate instances against.
///
/// Wraps `jsonschema::Validator`; construction is the expensive part
/// (schema compilation), so callers should build one per tool/resource/prompt
/// at registration time and reuse it across calls.
pub struct Validator {
    compiled: jsonschema::Validator,
}

impl Validator {
    /// Compile a schema (anything serializable to a JSON Schema document —
    /// `ToolSchema`, `mcp_protocol::schema::JsonSchema`, or a raw `Value`).
    pub fn compile(schema: &impl serde::Serialize) -> McpResult<Self> {
        let schema_value = serde_json::to_value(schema)
            .map_err(|e| McpError::validation(&format!("invalid schema: {e}")))?;
        let compiled = jsonschema::validator_for(&schema_value)
            .map_err(|e| McpError::validation(&format!("could not compile schema: {e}")))?;
        Ok(Self { compiled })
    }

    /// Validate `instance`, collecting every violation rather than stopping
    /// at the first one (useful for surfacing all bad fields in one error).
    pub fn validate(&self, instance: &Value) -> McpResult<()> {
        let errors: Vec<String> = self
            .compiled
            .iter_errors(instance)
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(McpError::InvalidParameters(errors.join("; ")))
        }
    }

    /// Cheaper yes/no check when the caller doesn't need error detail.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.compiled.is_valid(instance)
    }
}

/// Reduces a tool/resource schema down to elicitation's restricted subset:
/// top-level string/number/integer/boolean/enum properties only, no nested
/// objects or arrays. Properties that don't fit are dropped (and logged),
/// along with any `required` entry naming a dropped property — elicitation
/// has no way to ask for an object or array value from the user.
pub fn project_to_elicitation_schema(schema: &ToolSchema) -> ElicitationSchema {
    let mut properties = HashMap::new();

    for (name, property) in &schema.properties {
        let projected = match property {
            JsonSchema::String { description, enum_values: Some(values), .. } => {
                PrimitiveSchemaDefinition::Enum(EnumSchema {
                    schema_type: "string".to_string(),
                    title: None,
                    description: description.clone(),
                    enum_values: values.clone(),
                    enum_names: None,
                })
            }
            JsonSchema::String { description, min_length, max_length, .. } => {
                PrimitiveSchemaDefinition::String(StringSchema {
                    schema_type: "string".to_string(),
                    title: None,
                    description: description.clone(),
                    min_length: min_length.map(|n| n as usize),
                    max_length: max_length.map(|n| n as usize),
                    format: None,
                })
            }
            JsonSchema::Number { description, minimum, maximum } => {
                PrimitiveSchemaDefinition::Number(NumberSchema {
                    schema_type: "number".to_string(),
                    title: None,
                    description: description.clone(),
                    minimum: *minimum,
                    maximum: *maximum,
                })
            }
            JsonSchema::Integer { description, minimum, maximum } => {
                PrimitiveSchemaDefinition::Number(NumberSchema {
                    schema_type: "integer".to_string(),
                    title: None,
                    description: description.clone(),
                    minimum: minimum.map(|n| n as f64),
                    maximum: maximum.map(|n| n as f64),
                })
            }
            JsonSchema::Boolean { description } => {
                PrimitiveSchemaDefinition::Boolean(BooleanSchema {
                    schema_type: "boolean".to_string(),
                    title: None,
                    description: description.clone(),
                    default: None,
                })
            }
            JsonSchema::Array { .. } | JsonSchema::Object { .. } => {
                warn!(property = %name, "dropping non-primitive property from elicitation schema");
                continue;
            }
        };
        properties.insert(name.clone(), projected);
    }

    let required = schema
        .required
        .as_ref()
        .map(|names| names.iter().filter(|name| properties.contains_key(*name)).cloned().collect())
        .filter(|names: &Vec<String>| !names.is_empty());

    ElicitationSchema {
        schema_type: "object".to_string(),
        properties,
        required,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_instance() {
        let schema = ToolSchema::object()
            .with_property("name", JsonSchema::string())
            .with_required(vec!["name".to_string()]);
        let validator = Validator::compile(&schema).unwrap();

        assert!(validator.validate(&serde_json::json!({"name": "ok"})).is_ok());
    }

    #[test]
    fn rejects_missing_required_property() {
        let schema = ToolSchema::object()
            .with_property("name", JsonSchema::string())
            .with_required(vec!["name".to_string()]);
        let validator = Validator::compile(&schema).unwrap();

        let result = validator.validate(&serde_json::json!({}));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_wrong_type() {
        let schema = ToolSchema::object()
            .with_property("count", JsonSchema::integer())
            .with_required(vec!["count".to_string()]);
        let validator = Validator::compile(&schema).unwrap();

        let result = validator.validate(&serde_json::json!({"count": "not a number"}));
        assert!(result.is_err());
        assert!(!validator.is_valid(&serde_json::json!({"count": "not a number"})));
    }

    #[test]
    fn projection_keeps_primitive_properties() {
        let schema = ToolSchema::object()
            .with_property("name", JsonSchema::string())
            .with_property("age", JsonSchema::integer())
            .with_required(vec!["name".to_string()]);

        let projected = project_to_elicitation_schema(&schema);

        assert_eq!(projected.schema_type, "object");
        assert!(matches!(
            projected.properties.get("name"),
            Some(PrimitiveSchemaDefinition::String(_))
        ));
        assert!(matches!(
            projected.properties.get("age"),
            Some(PrimitiveSchemaDefinition::Number(_))
        ));
        assert_eq!(projected.required, Some(vec!["name".to_string()]));
    }

    #[test]
    fn projection_drops_nested_properties_and_their_required_entries() {
        let schema = ToolSchema::object()
            .with_property("name", JsonSchema::string())
            .with_property("tags", JsonSchema::array(JsonSchema::string()))
            .with_required(vec!["name".to_string(), "tags".to_string()]);

        let projected = project_to_elicitation_schema(&schema);

        assert!(!projected.properties.contains_key("tags"));
        assert_eq!(projected.required, Some(vec!["name".to_string()]));
    }

    #[test]
    fn projection_yields_no_required_list_when_everything_is_dropped() {
        let schema = ToolSchema::object()
            .with_property("payload", JsonSchema::object())
            .with_required(vec!["payload".to_string()]);

        let projected = project_to_elicitation_schema(&schema);

        assert!(projected.properties.is_empty());
        assert_eq!(projected.required, None);
    }
}
