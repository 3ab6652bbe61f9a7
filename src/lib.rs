#![deny(missing_docs)]
//! Links menu bot
//!
//! A Telegram bot that shows a fixed menu of social-media links and can
//! switch individual users into an AI support mode, where their text
//! messages are relayed to an OpenAI-compatible chat completion service.

/// Telegram bot implementation
pub mod bot;
/// Configuration management
pub mod config;
/// Social link categories and the link registry
pub mod links;
/// LLM providers and client
pub mod llm;
/// Logging with secret redaction
pub mod logging;
/// Menu state machine, independent of the chat transport
pub mod menu;
pub mod utils;
