/// Command, button and text handlers
pub mod handlers;
/// Conversion of menu keyboards into Telegram inline markup
pub mod markup;
/// Resilient messaging with automatic retry for Telegram API operations
pub mod resilient;
/// Telegram runtime entrypoint
pub mod runner;
