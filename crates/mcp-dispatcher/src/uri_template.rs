//! URI Template System for Dynamic Resources
//!
//! This module provides an RFC 6570 subset matcher for dynamic MCP resources:
//! path variables `{name}` and, at most once per template, a query-variable
//! expansion `{?a,b,c}`. A path like `file:///user/{user_id}.json{?verbose}`
//! matches both `file:///user/alice.json` and
//! `file:///user/alice.json?verbose=true`, since query variables are optional.

use std::collections::HashMap;
use regex::Regex;

use crate::McpResult;
use mcp_protocol::McpError;

/// A compiled URI template with validation rules
#[derive(Debug, Clone)]
pub struct UriTemplate {
    /// Original template pattern
    pattern: String,
    /// Compiled regex for matching and extracting variables
    regex: Regex,
    /// Path variable names in order of appearance
    variables: Vec<String>,
    /// Names declared in a trailing `{?a,b,c}` expansion, if any
    query_variables: Vec<String>,
    /// Validation rules for each variable (path or query)
    validators: HashMap<String, VariableValidator>,
    /// MIME type mapping based on file extension
    mime_type: Option<String>,
}

/// Validation rules for template variables
#[derive(Debug, Clone)]
pub struct VariableValidator {
    /// Regex pattern for valid values
    pattern: Regex,
    /// Human-readable description of valid format
    description: String,
    /// Maximum length
    max_length: usize,
}

impl VariableValidator {
    /// Create validator for user IDs (alphanumeric, underscore, hyphen)
    pub fn user_id() -> Self {
        Self {
            pattern: Regex::new(r"^[A-Za-z0-9_-]{1,128}$").unwrap(),
            description: "alphanumeric characters, underscore, and hyphen (1-128 chars)".to_string(),
            max_length: 128,
        }
    }

    /// Create validator for image formats
    pub fn image_format() -> Self {
        Self {
            pattern: Regex::new(r"^(png|jpg|jpeg|webp|svg)$").unwrap(),
            description: "valid image format: png, jpg, jpeg, webp, svg".to_string(),
            max_length: 8,
        }
    }

    /// Create validator for document formats
    pub fn document_format() -> Self {
        Self {
            pattern: Regex::new(r"^(pdf|txt|md|json|xml|html)$").unwrap(),
            description: "valid document format: pdf, txt, md, json, xml, html".to_string(),
            max_length: 8,
        }
    }

    /// Create custom validator
    pub fn custom(pattern: &str, description: String, max_length: usize) -> McpResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| McpError::tool_execution(&format!("Invalid regex pattern: {}", e)))?;

        Ok(Self {
            pattern: regex,
            description,
            max_length,
        })
    }

    /// Validate a variable value
    pub fn validate(&self, value: &str) -> Result<(), String> {
        if value.len() > self.max_length {
            return Err(format!(
                "Value too long: {} characters (max {})",
                value.len(),
                self.max_length
            ));
        }

        if !self.pattern.is_match(value) {
            return Err(format!("Invalid format. Expected: {}", self.description));
        }

        Ok(())
    }
}

fn query_expansion_regex() -> Regex {
    Regex::new(r"\{\?([^}]+)\}").unwrap()
}

impl UriTemplate {
    /// Create a new URI template with automatic MIME type detection
    pub fn new(pattern: &str) -> McpResult<Self> {
        let mime_type = Self::detect_mime_type(&query_expansion_regex().replace(pattern, ""));
        let mut template = Self {
            pattern: pattern.to_string(),
            regex: Regex::new("").unwrap(), // Placeholder
            variables: Vec::new(),
            query_variables: Vec::new(),
            validators: HashMap::new(),
            mime_type,
        };

        template.compile()?;
        Ok(template)
    }

    /// Create template with explicit MIME type
    pub fn with_mime_type(pattern: &str, mime_type: &str) -> McpResult<Self> {
        let mut template = Self::new(pattern)?;
        template.mime_type = Some(mime_type.to_string());
        Ok(template)
    }

    /// Add validation rule for a variable (path or query)
    pub fn with_validator(mut self, variable: &str, validator: VariableValidator) -> Self {
        self.validators.insert(variable.to_string(), validator);
        self
    }

    /// Compile the template pattern into a regex. A leading `{?a,b,c}` query
    /// expansion is parsed out first (at most one per template, RFC 6570
    /// doesn't compose multiple operators in one expression here); the
    /// remaining path is compiled the same way as before.
    fn compile(&mut self) -> McpResult<()> {
        let query_regex = query_expansion_regex();
        let path_pattern = if let Some(captures) = query_regex.captures(&self.pattern) {
            self.query_variables = captures[1]
                .split(',')
                .map(|name| name.trim().to_string())
                .collect();
            query_regex.replace(&self.pattern, "").to_string()
        } else {
            self.pattern.clone()
        };

        let var_regex = Regex::new(r"\{([^}]+)\}").unwrap();
        let mut regex_pattern = regex::escape(&path_pattern);

        for captures in var_regex.captures_iter(&path_pattern) {
            let var_name = captures.get(1).unwrap().as_str();
            self.variables.push(var_name.to_string());

            let escaped_var = regex::escape(&format!("{{{}}}", var_name));
            regex_pattern = regex_pattern.replace(&escaped_var, "([^/?]+)");
        }

        regex_pattern = if self.query_variables.is_empty() {
            format!("^{}$", regex_pattern)
        } else {
            // The whole query string is optional, and its contents are
            // validated/extracted separately in `extract`, not by this regex.
            format!("^{}(?:\\?.*)?$", regex_pattern)
        };

        self.regex = Regex::new(&regex_pattern)
            .map_err(|e| McpError::tool_execution(&format!("Failed to compile template: {}", e)))?;

        Ok(())
    }

    /// Detect MIME type from file extension in pattern
    fn detect_mime_type(pattern: &str) -> Option<String> {
        if let Some(ext_start) = pattern.rfind('.') {
            let ext = &pattern[ext_start + 1..];
            // Remove any template variables from extension
            let ext = ext.split('}').next().unwrap_or(ext);

            match ext {
                "json" => Some("application/json".to_string()),
                "txt" => Some("text/plain".to_string()),
                "md" => Some("text/markdown".to_string()),
                "html" => Some("text/html".to_string()),
                "xml" => Some("application/xml".to_string()),
                "pdf" => Some("application/pdf".to_string()),
                "png" => Some("image/png".to_string()),
                "jpg" | "jpeg" => Some("image/jpeg".to_string()),
                "webp" => Some("image/webp".to_string()),
                "svg" => Some("image/svg+xml".to_string()),
                _ => None,
            }
        } else {
            None
        }
    }

    /// Resolve template with variables to create actual URI. Path variables
    /// are all required; declared query variables are included only when
    /// present in `variables` (RFC 6570 query expansion is inherently
    /// optional-per-variable).
    pub fn resolve(&self, variables: &HashMap<String, String>) -> McpResult<String> {
        let mut result = query_expansion_regex().replace(&self.pattern, "").to_string();

        for var_name in &self.variables {
            let value = variables
                .get(var_name)
                .ok_or_else(|| McpError::missing_param(var_name))?;

            if let Some(validator) = self.validators.get(var_name) {
                validator
                    .validate(value)
                    .map_err(|e| McpError::invalid_param_type(var_name, &validator.description, &e))?;
            }

            result = result.replace(&format!("{{{}}}", var_name), value);
        }

        if !self.query_variables.is_empty() {
            let mut pairs = Vec::new();
            for var_name in &self.query_variables {
                let Some(value) = variables.get(var_name) else {
                    continue;
                };
                if let Some(validator) = self.validators.get(var_name) {
                    validator
                        .validate(value)
                        .map_err(|e| McpError::invalid_param_type(var_name, &validator.description, &e))?;
                }
                pairs.push(format!("{var_name}={value}"));
            }
            if !pairs.is_empty() {
                result.push('?');
                result.push_str(&pairs.join("&"));
            }
        }

        Ok(result)
    }

    /// Extract variables from a URI that matches this template. Path
    /// variables must all be present; query variables are taken from
    /// whichever of the declared names actually appear in the query string.
    pub fn extract(&self, uri: &str) -> McpResult<HashMap<String, String>> {
        let captures = self
            .regex
            .captures(uri)
            .ok_or_else(|| McpError::invalid_param_type("uri", "URI matching template", uri))?;

        let mut variables = HashMap::new();

        for (i, var_name) in self.variables.iter().enumerate() {
            if let Some(value) = captures.get(i + 1) {
                let value = value.as_str().to_string();

                if let Some(validator) = self.validators.get(var_name) {
                    validator
                        .validate(&value)
                        .map_err(|e| McpError::invalid_param_type(var_name, &validator.description, &e))?;
                }

                variables.insert(var_name.clone(), value);
            }
        }

        if !self.query_variables.is_empty() {
            if let Some((_, query)) = uri.split_once('?') {
                for pair in query.split('&') {
                    let Some((key, value)) = pair.split_once('=') else {
                        continue;
                    };
                    if !self.query_variables.iter().any(|name| name == key) {
                        continue;
                    }
                    if let Some(validator) = self.validators.get(key) {
                        validator
                            .validate(value)
                            .map_err(|e| McpError::invalid_param_type(key, &validator.description, &e))?;
                    }
                    variables.insert(key.to_string(), value.to_string());
                }
            }
        }

        Ok(variables)
    }

    /// Check if a URI matches this template
    pub fn matches(&self, uri: &str) -> bool {
        self.regex.is_match(uri)
    }

    /// Get the MIME type for this template
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Get the original pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Get path variable names
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Get declared query variable names (from `{?a,b,c}`), if any
    pub fn query_variables(&self) -> &[String] {
        &self.query_variables
    }
}

/// Registry for managing URI templates. Resources are matched in
/// registration order — first match wins, mirroring static-URI lookup.
#[derive(Debug, Default)]
pub struct UriTemplateRegistry {
    templates: Vec<UriTemplate>,
}

impl UriTemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a URI template
    pub fn register(&mut self, template: UriTemplate) {
        self.templates.push(template);
    }

    /// Find template that matches the given URI
    pub fn find_matching(&self, uri: &str) -> Option<&UriTemplate> {
        self.templates.iter().find(|t| t.matches(uri))
    }

    /// Get all registered templates
    pub fn templates(&self) -> &[UriTemplate] {
        &self.templates
    }

    /// Resolve a template pattern with variables
    pub fn resolve_pattern(&self, pattern: &str, variables: &HashMap<String, String>) -> McpResult<String> {
        let template = self
            .templates
            .iter()
            .find(|t| t.pattern() == pattern)
            .ok_or_else(|| McpError::invalid_param_type("pattern", "registered template pattern", pattern))?;

        template.resolve(variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_validator() {
        let validator = VariableValidator::user_id();

        assert!(validator.validate("user123").is_ok());
        assert!(validator.validate("user_id").is_ok());
        assert!(validator.validate("user-name").is_ok());
        assert!(validator.validate("ABC123").is_ok());

        assert!(validator.validate("user@example.com").is_err());
        assert!(validator.validate("user with spaces").is_err());
        assert!(validator.validate("").is_err());
        assert!(validator.validate(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_image_format_validator() {
        let validator = VariableValidator::image_format();

        assert!(validator.validate("png").is_ok());
        assert!(validator.validate("jpg").is_ok());
        assert!(validator.validate("jpeg").is_ok());
        assert!(validator.validate("webp").is_ok());
        assert!(validator.validate("svg").is_ok());

        assert!(validator.validate("gif").is_err());
        assert!(validator.validate("PNG").is_err());
        assert!(validator.validate("pdf").is_err());
    }

    #[test]
    fn test_uri_template_creation() {
        let template = UriTemplate::new("file:///user/{user_id}.json").unwrap();
        assert_eq!(template.pattern(), "file:///user/{user_id}.json");
        assert_eq!(template.variables(), &["user_id"]);
        assert_eq!(template.mime_type(), Some("application/json"));
    }

    #[test]
    fn test_uri_template_resolution() {
        let template = UriTemplate::new("file:///user/{user_id}.json")
            .unwrap()
            .with_validator("user_id", VariableValidator::user_id());

        let mut vars = HashMap::new();
        vars.insert("user_id".to_string(), "alice123".to_string());

        let resolved = template.resolve(&vars).unwrap();
        assert_eq!(resolved, "file:///user/alice123.json");
    }

    #[test]
    fn test_uri_template_extraction() {
        let template = UriTemplate::new("file:///user/{user_id}.json")
            .unwrap()
            .with_validator("user_id", VariableValidator::user_id());

        let vars = template.extract("file:///user/alice123.json").unwrap();
        assert_eq!(vars.get("user_id"), Some(&"alice123".to_string()));
    }

    #[test]
    fn test_uri_template_validation_failure() {
        let template = UriTemplate::new("file:///user/{user_id}.json")
            .unwrap()
            .with_validator("user_id", VariableValidator::user_id());

        let result = template.extract("file:///user/invalid@user.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_multiple_variables() {
        let template = UriTemplate::new("file:///user/{user_id}/avatar.{format}")
            .unwrap()
            .with_validator("user_id", VariableValidator::user_id())
            .with_validator("format", VariableValidator::image_format());

        let vars = template.extract("file:///user/alice123/avatar.png").unwrap();
        assert_eq!(vars.get("user_id"), Some(&"alice123".to_string()));
        assert_eq!(vars.get("format"), Some(&"png".to_string()));
    }

    #[test]
    fn test_query_expansion_is_optional() {
        let template = UriTemplate::new("file:///search/{topic}{?limit,verbose}").unwrap();
        assert_eq!(template.query_variables(), &["limit", "verbose"]);

        assert!(template.matches("file:///search/rust"));
        assert!(template.matches("file:///search/rust?limit=10"));
        assert!(template.matches("file:///search/rust?limit=10&verbose=true"));
        assert!(!template.matches("file:///search/rust/extra"));
    }

    #[test]
    fn test_query_expansion_extracts_only_present_vars() {
        let template = UriTemplate::new("file:///search/{topic}{?limit,verbose}").unwrap();

        let vars = template.extract("file:///search/rust?limit=10").unwrap();
        assert_eq!(vars.get("topic"), Some(&"rust".to_string()));
        assert_eq!(vars.get("limit"), Some(&"10".to_string()));
        assert_eq!(vars.get("verbose"), None);

        let vars = template.extract("file:///search/rust").unwrap();
        assert_eq!(vars.get("topic"), Some(&"rust".to_string()));
        assert_eq!(vars.get("limit"), None);
    }

    #[test]
    fn test_query_expansion_ignores_undeclared_params() {
        let template = UriTemplate::new("file:///search/{topic}{?limit}").unwrap();
        let vars = template.extract("file:///search/rust?limit=5&bogus=1").unwrap();
        assert_eq!(vars.get("limit"), Some(&"5".to_string()));
        assert_eq!(vars.get("bogus"), None);
    }

    #[test]
    fn test_query_expansion_resolve_includes_only_supplied() {
        let template = UriTemplate::new("file:///search/{topic}{?limit,verbose}").unwrap();
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), "rust".to_string());
        vars.insert("limit".to_string(), "10".to_string());

        let resolved = template.resolve(&vars).unwrap();
        assert_eq!(resolved, "file:///search/rust?limit=10");
    }

    #[test]
    fn test_registry() {
        let mut registry = UriTemplateRegistry::new();

        let template1 = UriTemplate::new("file:///user/{user_id}.json").unwrap();
        let template2 = UriTemplate::new("file:///user/{user_id}/avatar.{format}").unwrap();

        registry.register(template1);
        registry.register(template2);

        let found = registry.find_matching("file:///user/alice123.json");
        assert!(found.is_some());
        assert_eq!(found.unwrap().pattern(), "file:///user/{user_id}.json");
    }

    #[test]
    fn test_mime_type_detection() {
        assert_eq!(UriTemplate::detect_mime_type("file.json"), Some("application/json".to_string()));
        assert_eq!(UriTemplate::detect_mime_type("file.pdf"), Some("application/pdf".to_string()));
        assert_eq!(UriTemplate::detect_mime_type("file.png"), Some("image/png".to_string()));
        assert_eq!(UriTemplate::detect_mime_type("file.txt"), Some("text/plain".to_string()));
        assert_eq!(UriTemplate::detect_mime_type("file.unknown"), None);
        assert_eq!(UriTemplate::detect_mime_type("file"), None);
    }
}
