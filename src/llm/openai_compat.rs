//! OpenAI-compatible provider
//!
//! Uses the async-openai client against any endpoint speaking the OpenAI chat
//! completions protocol (`OpenAI` itself, Groq, Mistral, `OpenRouter`, ...).

use super::{LlmError, LlmProvider};
use crate::config::AI_CHAT_TEMPERATURE;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse,
    },
    Client,
};
use async_trait::async_trait;

/// Provider for OpenAI-compatible chat completion APIs
pub struct OpenAiCompatProvider {
    client: Client<OpenAIConfig>,
}

impl OpenAiCompatProvider {
    /// Create a new provider for the given API key and base URL
    #[must_use]
    pub fn new(api_key: String, api_base: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        Self {
            client: Client::with_config(config),
        }
    }
}

/// Build the `[system, user]` message pair for a single-turn request
///
/// # Errors
///
/// Returns `LlmError::Unknown` if message building fails.
fn build_messages(
    system_prompt: &str,
    user_message: &str,
) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
    Ok(vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| LlmError::Unknown(e.to_string()))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| LlmError::Unknown(e.to_string()))?
            .into(),
    ])
}

/// Extract the text of the first choice
///
/// # Errors
///
/// Returns `LlmError::ApiError` if the response has no text content.
fn extract_response(response: &CreateChatCompletionResponse) -> Result<String, LlmError> {
    response
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| LlmError::ApiError("Empty response".to_string()))
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_message: &str,
        model_id: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let messages = build_messages(system_prompt, user_message)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model_id)
            .messages(messages)
            .max_tokens(max_tokens)
            .temperature(AI_CHAT_TEMPERATURE)
            .build()
            .map_err(|e| LlmError::Unknown(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| match e {
                async_openai::error::OpenAIError::Reqwest(inner) => {
                    LlmError::NetworkError(inner.to_string())
                }
                other => LlmError::ApiError(other.to_string()),
            })?;

        extract_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_orders_system_first() -> Result<(), LlmError> {
        let messages = build_messages("be nice", "hi")?;
        assert_eq!(messages.len(), 2);
        assert!(matches!(
            messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
        Ok(())
    }
}
