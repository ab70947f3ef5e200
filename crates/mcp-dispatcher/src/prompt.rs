//! High-level trait for implementing MCP prompts.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use mcp_protocol::{
    McpResult,
    prompts::{GetPromptResult, Prompt, PromptMessage},
};

/// A pluggable prompt handler. Implementors describe themselves via
/// [`McpPrompt::prompt`] and render via [`McpPrompt::render`].
#[async_trait]
pub trait McpPrompt: Send + Sync {
    /// The prompt's `prompts/list` descriptor.
    fn prompt(&self) -> Prompt;

    /// Render the prompt with the given arguments into the final message
    /// sequence. The default substitutes nothing and returns a placeholder;
    /// real prompts override this.
    async fn render(&self, _args: Option<HashMap<String, Value>>) -> McpResult<Vec<PromptMessage>> {
        let descriptor = self.prompt();
        let message = format!(
            "Prompt: {} - {}",
            descriptor.name,
            descriptor.description.as_deref().unwrap_or("Generated prompt")
        );
        Ok(vec![PromptMessage::text(message)])
    }

    /// Whether this handler can satisfy `args`, checking required arguments
    /// declared on the descriptor.
    fn can_handle(&self, args: &HashMap<String, Value>) -> bool {
        if let Some(prompt_args) = self.prompt().arguments {
            for arg in prompt_args {
                if arg.required.unwrap_or(false) && !args.contains_key(&arg.name) {
                    return false;
                }
            }
        }
        true
    }

    /// Priority for request routing when multiple handlers could serve the
    /// same name. Higher runs first.
    fn priority(&self) -> u32 {
        0
    }

    /// Validates arguments beyond the required/optional check in [`Self::can_handle`].
    async fn validate_args(&self, _args: &HashMap<String, Value>) -> McpResult<()> {
        Ok(())
    }

    /// Post-processes rendered messages before they're returned.
    async fn transform_messages(&self, messages: Vec<PromptMessage>) -> McpResult<Vec<PromptMessage>> {
        Ok(messages)
    }

    /// Renders and wraps the result into a complete `prompts/get` response.
    async fn get_response(&self, args: Option<HashMap<String, Value>>) -> McpResult<GetPromptResult> {
        if let Some(ref args) = args {
            self.validate_args(args).await?;
        }

        let messages = self.render(args).await?;
        let final_messages = self.transform_messages(messages).await?;

        let mut response = GetPromptResult::new(final_messages);
        if let Some(description) = self.prompt().description {
            response = response.with_description(description);
        }

        Ok(response)
    }
}

/// Converts an [`McpPrompt`] trait object to its protocol [`Prompt`] descriptor.
pub fn prompt_to_descriptor(prompt: &dyn McpPrompt) -> Prompt {
    prompt.prompt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use mcp_protocol::prompts::{ContentBlock, PromptArgument};

    struct TestPrompt {
        name: String,
        description: String,
        arguments: Vec<PromptArgument>,
        template: String,
    }

    impl TestPrompt {
        fn render_messages(&self, args: Option<&HashMap<String, Value>>) -> Vec<PromptMessage> {
            let mut template = self.template.clone();
            if let Some(args) = args {
                for (key, value) in args {
                    let placeholder = format!("{{{}}}", key);
                    let value_str = match value {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        _ => value.to_string(),
                    };
                    template = template.replace(&placeholder, &value_str);
                }
            }
            vec![PromptMessage::user_text(template)]
        }
    }

    #[async_trait]
    impl McpPrompt for TestPrompt {
        fn prompt(&self) -> Prompt {
            Prompt::new(&self.name)
                .with_description(&self.description)
                .with_arguments(self.arguments.clone())
        }

        async fn render(&self, args: Option<HashMap<String, Value>>) -> McpResult<Vec<PromptMessage>> {
            Ok(self.render_messages(args.as_ref()))
        }
    }

    #[test]
    fn test_prompt_descriptor() {
        let prompt = TestPrompt {
            name: "essay_prompt".to_string(),
            description: "Generate an essay prompt".to_string(),
            arguments: vec![PromptArgument::new("topic").with_description("The essay topic").required()],
            template: "Write an essay about {topic}.".to_string(),
        };

        let descriptor = prompt_to_descriptor(&prompt);
        assert_eq!(descriptor.name, "essay_prompt");
        assert_eq!(descriptor.description, Some("Generate an essay prompt".to_string()));
        assert!(descriptor.arguments.is_some());
    }

    #[tokio::test]
    async fn test_prompt_rendering() {
        let prompt = TestPrompt {
            name: "essay_prompt".to_string(),
            description: "Essay writing prompt".to_string(),
            arguments: vec![PromptArgument::new("topic").required()],
            template: "Write an essay about {topic}.".to_string(),
        };

        let mut args = HashMap::new();
        args.insert("topic".to_string(), json!("artificial intelligence"));

        let messages = prompt.render(Some(args)).await.unwrap();
        assert_eq!(messages.len(), 1);

        let ContentBlock::Text { text, .. } = &messages[0].content else {
            panic!("Expected text message");
        };
        assert!(text.contains("artificial intelligence"));
    }

    #[tokio::test]
    async fn test_argument_validation() {
        let prompt = TestPrompt {
            name: "essay_prompt".to_string(),
            description: "Essay writing prompt".to_string(),
            arguments: vec![PromptArgument::new("topic").required()],
            template: "Write an essay about {topic}.".to_string(),
        };

        let valid_args = HashMap::from([("topic".to_string(), json!("AI"))]);
        assert!(prompt.can_handle(&valid_args));

        let invalid_args = HashMap::new();
        assert!(!prompt.can_handle(&invalid_args));
    }

    #[tokio::test]
    async fn test_get_response() {
        let prompt = TestPrompt {
            name: "greeting".to_string(),
            description: "A greeting prompt".to_string(),
            arguments: vec![],
            template: "Hello, world!".to_string(),
        };

        let response = prompt.get_response(None).await.unwrap();
        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.description, Some("A greeting prompt".to_string()));

        let ContentBlock::Text { text, .. } = &response.messages[0].content else {
            panic!("Expected text message");
        };
        assert_eq!(text, "Hello, world!");
    }
}
