use super::markup::inline_markup;
use super::resilient::{edit_message_resilient, send_message_resilient, EditOutcome};
use crate::config::TELEGRAM_MESSAGE_LIMIT;
use crate::menu::{Event, InboundEvent, ModeDispatcher, OutgoingText, Reply, ReplySink, UserId};
use crate::utils::split_message;
use anyhow::Result;
use std::sync::Arc;
use teloxide::types::{CallbackQuery, ChatAction, ChatId, MessageId, ParseMode};
use teloxide::{prelude::*, utils::command::BotCommands, RequestError};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the welcome message and the main menu
    #[command(description = "Start the bot.")]
    Start,
    /// Show the main menu again
    #[command(description = "Show the links menu.")]
    Menu,
}

/// Get the sender of a message, if the message has one.
///
/// Channel posts and anonymous admins carry no sender.
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> Option<UserId> {
    msg.from.as_ref().map(|u| UserId(u.id.0.cast_signed()))
}

/// Delivers dispatcher replies to one chat.
///
/// Edits target `source`, the message that carried the pressed button. When
/// there is none, or Telegram refuses the edit, the content is sent as a new
/// message.
pub struct TelegramSink {
    bot: Bot,
    chat_id: ChatId,
    source: Option<MessageId>,
    first_error: Mutex<Option<RequestError>>,
}

impl TelegramSink {
    /// Create a sink for `chat_id`
    #[must_use]
    pub fn new(bot: Bot, chat_id: ChatId, source: Option<MessageId>) -> Self {
        Self {
            bot,
            chat_id,
            source,
            first_error: Mutex::new(None),
        }
    }

    /// Consume the sink, returning the first delivery error if any.
    ///
    /// # Errors
    ///
    /// Returns the first Telegram API error hit while delivering.
    pub fn finish(self) -> Result<(), RequestError> {
        self.first_error.into_inner().map_or(Ok(()), Err)
    }

    async fn send(&self, out: &OutgoingText) -> Result<(), RequestError> {
        let markup = out.keyboard.as_ref().map(inline_markup);

        if out.html {
            send_message_resilient(
                &self.bot,
                self.chat_id,
                &out.text,
                Some(ParseMode::Html),
                markup,
            )
            .await?;
            return Ok(());
        }

        // Relayed answers may exceed the message limit; the keyboard goes on the last part.
        let parts: Vec<String> = split_message(&out.text, TELEGRAM_MESSAGE_LIMIT)
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect();
        let last = parts.len().saturating_sub(1);
        for (i, part) in parts.iter().enumerate() {
            let part_markup = if i == last { markup.clone() } else { None };
            send_message_resilient(&self.bot, self.chat_id, part, None, part_markup).await?;
        }
        Ok(())
    }

    async fn edit(&self, out: &OutgoingText) -> Result<(), RequestError> {
        let Some(msg_id) = self.source else {
            return self.send(out).await;
        };

        let outcome = edit_message_resilient(
            &self.bot,
            self.chat_id,
            msg_id,
            &out.text,
            out.html.then_some(ParseMode::Html),
            out.keyboard.as_ref().map(inline_markup),
        )
        .await?;

        match outcome {
            EditOutcome::Edited | EditOutcome::NotModified => Ok(()),
            EditOutcome::Unavailable => {
                debug!(
                    "Message {} in chat {} can't be edited, sending a new one",
                    msg_id.0, self.chat_id
                );
                self.send(out).await
            }
        }
    }
}

#[async_trait::async_trait]
impl ReplySink for TelegramSink {
    async fn push(&self, reply: Reply) {
        let result = match reply {
            Reply::Typing => {
                if let Err(e) = self
                    .bot
                    .send_chat_action(self.chat_id, ChatAction::Typing)
                    .await
                {
                    debug!("Typing indicator failed for chat {}: {e}", self.chat_id);
                }
                return;
            }
            Reply::Send(out) => self.send(&out).await,
            Reply::Edit(out) => self.edit(&out).await,
        };

        if let Err(e) = result {
            warn!("Failed to deliver reply to chat {}: {e}", self.chat_id);
            let mut slot = self.first_error.lock().await;
            if slot.is_none() {
                *slot = Some(e);
            }
        }
    }
}

/// Handle `/start` and `/menu`.
///
/// # Errors
///
/// Returns an error if the reply could not be delivered.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dispatcher: Arc<ModeDispatcher>,
) -> Result<()> {
    let Some(user) = get_user_id_safe(&msg) else {
        debug!("Ignoring command without a sender in chat {}", msg.chat.id);
        return Ok(());
    };

    let event = match cmd {
        Command::Start => Event::Start,
        Command::Menu => Event::Menu,
    };

    let sink = TelegramSink::new(bot, msg.chat.id, None);
    dispatcher.dispatch(InboundEvent::new(user, event), &sink).await;
    sink.finish()?;
    Ok(())
}

/// Handle a plain text message.
///
/// # Errors
///
/// Returns an error if the reply could not be delivered.
pub async fn handle_text(bot: Bot, msg: Message, dispatcher: Arc<ModeDispatcher>) -> Result<()> {
    let (Some(user), Some(text)) = (get_user_id_safe(&msg), msg.text()) else {
        return Ok(());
    };

    let sink = TelegramSink::new(bot, msg.chat.id, None);
    dispatcher.dispatch(InboundEvent::text(user, text), &sink).await;
    sink.finish()?;
    Ok(())
}

/// Handle an inline button press.
///
/// The query is answered first so the client stops its loading spinner,
/// whatever happens next.
///
/// # Errors
///
/// Returns an error if the reply could not be delivered.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dispatcher: Arc<ModeDispatcher>,
) -> Result<()> {
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!("Failed to answer callback query: {e}");
    }

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(message) = q.message.as_ref() else {
        debug!("Callback '{data}' has no message attached, ignoring");
        return Ok(());
    };

    let user = UserId(q.from.id.0.cast_signed());
    let sink = TelegramSink::new(bot, message.chat().id, Some(message.id()));
    dispatcher
        .dispatch(InboundEvent::button(user, data), &sink)
        .await;
    sink.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse_lowercase() {
        assert_eq!(Command::parse("/start", "links_bot").ok(), Some(Command::Start));
        assert_eq!(Command::parse("/menu", "links_bot").ok(), Some(Command::Menu));
        assert!(Command::parse("/clear", "links_bot").is_err());
    }

    #[test]
    fn test_command_list_is_registered() {
        let commands = Command::bot_commands();
        let names: Vec<_> = commands
            .iter()
            .map(|c| c.command.trim_start_matches('/'))
            .collect();
        assert_eq!(names, vec!["start", "menu"]);
    }
}
