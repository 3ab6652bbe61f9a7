//! Completion service client
//!
//! Single-turn access to an OpenAI-compatible chat completion API used by the
//! support relay. The provider sits behind [`LlmProvider`] so the dispatcher
//! can be tested without network access.

mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use crate::config::Settings;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

/// Errors that can occur during a completion request
#[derive(Debug, Error)]
pub enum LlmError {
    /// Error returned by the provider's API
    #[error("API error: {0}")]
    ApiError(String),
    /// Error during network communication
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The provider did not answer within the configured time
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    /// No provider configured (missing API key)
    #[error("Missing client/API key: {0}")]
    MissingConfig(String),
    /// Any other unexpected error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Interface for completion providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a single-turn chat completion
    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_message: &str,
        model_id: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError>;
}

/// Client used by the dispatcher to answer support questions
pub struct LlmClient {
    provider: Option<Arc<dyn LlmProvider>>,
    /// Model identifier sent to the provider
    pub model_id: String,
    /// Output token limit per answer
    pub max_tokens: u32,
    /// Fixed system prompt for every support request
    pub system_prompt: String,
    /// Upper bound for a single request
    pub timeout: Duration,
}

impl LlmClient {
    /// Create a client from settings. Without an API key the client is
    /// created disabled and [`LlmClient::is_available`] returns false.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let provider = settings
            .ai_api_key
            .as_ref()
            .filter(|_| settings.ai_enabled())
            .map(|key| {
                Arc::new(OpenAiCompatProvider::new(
                    key.clone(),
                    settings.ai_api_base.clone(),
                )) as Arc<dyn LlmProvider>
            });

        Self {
            provider,
            model_id: settings.ai_model.clone(),
            max_tokens: settings.ai_max_tokens,
            system_prompt: settings.support_system_prompt(),
            timeout: Duration::from_secs(settings.ai_timeout_secs),
        }
    }

    /// Create a client without any provider
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            provider: None,
            model_id: crate::config::DEFAULT_AI_MODEL.to_string(),
            max_tokens: crate::config::DEFAULT_AI_MAX_TOKENS,
            system_prompt: crate::config::SUPPORT_SYSTEM_PROMPT.to_string(),
            timeout: Duration::from_secs(crate::config::DEFAULT_AI_TIMEOUT_SECS),
        }
    }

    /// Replace the provider (used for custom backends and tests)
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Override the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns true if a provider is configured
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Ask the provider a single question with the support system prompt.
    ///
    /// The call is bounded by `self.timeout`; exceeding it yields
    /// [`LlmError::Timeout`].
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingConfig` if no provider is configured, or any
    /// error from the provider.
    #[instrument(skip(self, user_message), fields(model = %self.model_id))]
    pub async fn ask(&self, user_message: &str) -> Result<String, LlmError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| LlmError::MissingConfig("ai_api_key".to_string()))?;

        debug!("Sending support request to LLM");
        trace!(user_message = user_message, "Full LLM Request");

        let start = Instant::now();
        let result = tokio::time::timeout(
            self.timeout,
            provider.chat_completion(
                &self.system_prompt,
                user_message,
                &self.model_id,
                self.max_tokens,
            ),
        )
        .await
        .unwrap_or_else(|_| Err(LlmError::Timeout(self.timeout.as_secs())));
        let duration = start.elapsed();

        match &result {
            Ok(resp) => {
                debug!(
                    duration_ms = duration.as_millis(),
                    "Received success response from LLM"
                );
                trace!(response = %resp, "Full LLM Response");
            }
            Err(e) => {
                warn!(
                    duration_ms = duration.as_millis(),
                    error = %e,
                    "Received error response from LLM"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    #[tokio::test]
    async fn test_disabled_client_reports_missing_config() {
        let client = LlmClient::disabled();
        assert!(!client.is_available());
        let result = client.ask("hello").await;
        assert!(matches!(result, Err(LlmError::MissingConfig(_))));
    }

    #[tokio::test]
    async fn test_ask_passes_system_prompt_and_model() {
        let mut mock = MockLlmProvider::new();
        mock.expect_chat_completion()
            .with(
                eq(crate::config::SUPPORT_SYSTEM_PROMPT),
                eq("how do I reach you?"),
                eq(crate::config::DEFAULT_AI_MODEL),
                eq(crate::config::DEFAULT_AI_MAX_TOKENS),
            )
            .times(1)
            .returning(|_, _, _, _| Ok("Write to the email in the menu.".to_string()));

        let client = LlmClient::disabled().with_provider(Arc::new(mock));
        assert!(client.is_available());

        let answer = client.ask("how do I reach you?").await;
        assert_eq!(answer.ok().as_deref(), Some("Write to the email in the menu."));
    }

    struct SlowProvider;

    #[async_trait::async_trait]
    impl LlmProvider for SlowProvider {
        async fn chat_completion(
            &self,
            _system_prompt: &str,
            _user_message: &str,
            _model_id: &str,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ask_times_out() {
        let client = LlmClient::disabled()
            .with_provider(Arc::new(SlowProvider))
            .with_timeout(Duration::from_secs(5));

        let result = client.ask("anyone there?").await;
        assert!(matches!(result, Err(LlmError::Timeout(5))));
    }
}
