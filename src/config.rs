//! Configuration and settings management
//!
//! Loads settings from environment variables and defines bot constants.

use crate::links::{LinkRegistry, LinksError};
use crate::menu::view::Language;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible API base
pub const DEFAULT_AI_API_BASE: &str = "https://api.openai.com/v1";
/// Default support model
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";
/// Default output token limit for a support answer
pub const DEFAULT_AI_MAX_TOKENS: u32 = 1024;
/// Default completion request timeout in seconds
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;
/// Sampling temperature for support answers
pub const AI_CHAT_TEMPERATURE: f32 = 0.7;

/// System prompt sent with every support question
pub const SUPPORT_SYSTEM_PROMPT: &str = "You are the support assistant of the Kaydarap Telegram bot. \
Answer the user's question briefly and politely, in the language the user writes in. \
If the question is about contacting Kaydarap, point the user to the social links in the bot menu.";

// Telegram API retry configuration
/// Maximum attempts for a Telegram API call
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;
/// Initial backoff between Telegram API attempts
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Upper bound for the Telegram API backoff
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;

/// Telegram limit is 4096 characters, we keep a small margin
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token (`TELEGRAM_TOKEN`, falling back to `BOT_TOKEN`)
    #[serde(default)]
    pub telegram_token: String,

    /// API key of the completion service (`AI_API_KEY`, falling back to
    /// `OPENAI_API_KEY`); AI support is disabled without it
    #[serde(default)]
    pub ai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_ai_api_base")]
    pub ai_api_base: String,
    /// Model used for support answers
    #[serde(default = "default_ai_model")]
    pub ai_model: String,
    /// Output token limit per support answer
    #[serde(default = "default_ai_max_tokens")]
    pub ai_max_tokens: u32,
    /// Timeout for a single completion request
    #[serde(default = "default_ai_timeout_secs")]
    pub ai_timeout_secs: u64,

    /// Override for the support system prompt
    #[serde(default)]
    pub support_system_prompt: Option<String>,

    /// JSON overrides for the link registry
    #[serde(default)]
    pub social_links: Option<String>,

    /// Language of the menu texts (`en` or `fa`)
    #[serde(default)]
    pub bot_language: Language,
}

fn default_ai_api_base() -> String {
    DEFAULT_AI_API_BASE.to_string()
}

fn default_ai_model() -> String {
    DEFAULT_AI_MODEL.to_string()
}

const fn default_ai_max_tokens() -> u32 {
    DEFAULT_AI_MAX_TOKENS
}

const fn default_ai_timeout_secs() -> u64 {
    DEFAULT_AI_TIMEOUT_SECS
}

impl Settings {
    /// Create new settings by loading from the environment
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use links_menu_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the bot token is missing or blank, or if a
    /// value cannot be parsed.
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            // Eg.. `APP__AI_MODEL=gpt-4o ./target/app` would set the `ai_model` key
            .add_source(Environment::with_prefix("APP").separator("__"))
            // UPPER_SNAKE_CASE variables map to snake_case keys; empty ones count as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        let mut settings: Self = s.try_deserialize()?;
        settings.apply_fallback_names(|name| std::env::var(name).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Fill unset values from their alternative variable names.
    ///
    /// The primary name wins when both are set.
    fn apply_fallback_names<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.telegram_token.trim().is_empty() {
            if let Some(token) = non_empty("BOT_TOKEN") {
                self.telegram_token = token;
            }
        }
        if self.ai_api_key.is_none() {
            self.ai_api_key = non_empty("OPENAI_API_KEY");
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram_token.trim().is_empty() {
            return Err(ConfigError::Message(
                "telegram_token must not be blank".to_string(),
            ));
        }
        if self.ai_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "ai_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns true if the completion service is configured
    #[must_use]
    pub fn ai_enabled(&self) -> bool {
        self.ai_api_key
            .as_ref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// System prompt for support requests (override or built-in)
    #[must_use]
    pub fn support_system_prompt(&self) -> String {
        self.support_system_prompt
            .as_ref()
            .filter(|p| !p.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| SUPPORT_SYSTEM_PROMPT.to_string())
    }

    /// Build the link registry: built-in entries with `social_links` applied on top
    ///
    /// # Errors
    ///
    /// Returns `LinksError` if the overrides are invalid.
    pub fn link_registry(&self) -> Result<LinkRegistry, LinksError> {
        let registry = LinkRegistry::builtin();
        match self.social_links.as_deref() {
            Some(json) if !json.trim().is_empty() => registry.with_json_overrides(json),
            _ => Ok(registry),
        }
    }
}
