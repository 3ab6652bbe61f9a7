//! Telegram runtime: dependency wiring, handler tree and polling loop.

use super::handlers::{self, Command};
use crate::config::Settings;
use crate::llm::LlmClient;
use crate::menu::{AiModeStore, ModeDispatcher};
use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Build the dispatcher from settings and run long polling until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the link registry overrides are invalid.
pub async fn run_bot(settings: Arc<Settings>) -> Result<()> {
    let registry = settings
        .link_registry()
        .context("Failed to build the social links registry")?;
    info!("Link registry ready with {} categories.", registry.len());

    let llm = LlmClient::new(&settings);
    if llm.is_available() {
        info!("AI support enabled (model: {}).", llm.model_id);
    } else {
        warn!("AI support disabled: no API key configured.");
    }

    let dispatcher = Arc::new(
        ModeDispatcher::new(
            Arc::new(registry),
            Arc::new(llm),
            Arc::new(AiModeStore::new()),
        )
        .with_language(settings.bot_language),
    );

    let bot = Bot::new(settings.telegram_token.clone());
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {e}");
    }

    info!("Bot is running...");

    Dispatcher::builder(bot, setup_handler())
        .dependencies(dptree::deps![dispatcher])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped.");
    Ok(())
}

/// Handler tree: button presses, then commands, then plain text.
#[must_use]
pub fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(on_callback))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(on_command),
                )
                .branch(dptree::filter(|msg: Message| msg.text().is_some()).endpoint(on_text)),
        )
}

async fn on_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dispatcher: Arc<ModeDispatcher>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_command(bot, msg, cmd, dispatcher).await {
        error!("Command error: {e}");
    }
    respond(())
}

async fn on_text(
    bot: Bot,
    msg: Message,
    dispatcher: Arc<ModeDispatcher>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_text(bot, msg, dispatcher).await {
        error!("Text handler error: {e}");
    }
    respond(())
}

async fn on_callback(
    bot: Bot,
    q: CallbackQuery,
    dispatcher: Arc<ModeDispatcher>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_callback(bot, q, dispatcher).await {
        error!("Callback handler error: {e}");
    }
    respond(())
}
