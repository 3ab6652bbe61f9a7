//! Resilient messaging utilities with automatic retry for Telegram API operations.
//!
//! Transient failures (network, I/O, flood control) are retried with
//! exponential backoff and jitter. API errors such as a rejected markup are
//! returned immediately.

use crate::config::{
    TELEGRAM_API_INITIAL_BACKOFF_MS, TELEGRAM_API_MAX_BACKOFF_MS, TELEGRAM_API_MAX_RETRIES,
};
use std::future::Future;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, Message, MessageId, ParseMode};
use teloxide::{ApiError, RequestError};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, warn};

/// Returns true for errors worth another attempt
#[must_use]
pub fn is_transient(error: &RequestError) -> bool {
    matches!(
        error,
        RequestError::Network(_) | RequestError::Io(_) | RequestError::RetryAfter(_)
    )
}

/// Retry a Telegram API operation with exponential backoff.
///
/// At most [`TELEGRAM_API_MAX_RETRIES`] attempts are made. A flood-control
/// answer waits the server-requested delay before the next attempt.
///
/// # Errors
///
/// Returns the last error once the attempts are exhausted, or the first
/// non-transient error.
pub async fn retry_telegram_operation<F, Fut, T>(mut operation: F) -> Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RequestError>>,
{
    let retry_strategy = ExponentialBackoff::from_millis(TELEGRAM_API_INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(TELEGRAM_API_MAX_BACKOFF_MS))
        .map(jitter) // Add jitter to prevent thundering herd
        .take(TELEGRAM_API_MAX_RETRIES.saturating_sub(1));

    let mut attempt = 0usize;
    let action = || {
        attempt += 1;
        let is_last = attempt >= TELEGRAM_API_MAX_RETRIES;
        let fut = operation();
        async move {
            match fut.await {
                Err(RequestError::RetryAfter(wait)) if !is_last => {
                    warn!("Telegram flood control, waiting {}s", wait.seconds());
                    tokio::time::sleep(wait.duration()).await;
                    Err(RequestError::RetryAfter(wait))
                }
                other => other,
            }
        }
    };

    RetryIf::spawn(retry_strategy, action, is_transient)
        .await
        .map_err(|e| {
            warn!("Telegram API operation failed: {e}");
            e
        })
}

/// Send a message with automatic retry on network failures.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn send_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    parse_mode: Option<ParseMode>,
    markup: Option<InlineKeyboardMarkup>,
) -> Result<Message, RequestError> {
    retry_telegram_operation(|| async {
        let mut req = bot.send_message(chat_id, text.to_string());
        if let Some(pm) = parse_mode {
            req = req.parse_mode(pm);
        }
        if let Some(m) = markup.clone() {
            req = req.reply_markup(m);
        }
        req.await
    })
    .await
}

/// Outcome of [`edit_message_resilient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The message now shows the new content
    Edited,
    /// The message already had this content
    NotModified,
    /// The message cannot be edited any more (deleted, too old, inaccessible)
    Unavailable,
}

/// Edit a message with retry, mapping the expected API refusals to an
/// [`EditOutcome`] instead of an error.
///
/// # Errors
///
/// Returns an error for failures other than "not modified" and
/// "message unavailable".
pub async fn edit_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    msg_id: MessageId,
    text: &str,
    parse_mode: Option<ParseMode>,
    markup: Option<InlineKeyboardMarkup>,
) -> Result<EditOutcome, RequestError> {
    let result = retry_telegram_operation(|| async {
        let mut req = bot.edit_message_text(chat_id, msg_id, text.to_string());
        if let Some(pm) = parse_mode {
            req = req.parse_mode(pm);
        }
        if let Some(m) = markup.clone() {
            req = req.reply_markup(m);
        }
        req.await
    })
    .await;

    match result {
        Ok(_) => Ok(EditOutcome::Edited),
        Err(RequestError::Api(ApiError::MessageNotModified)) => {
            debug!("Message update skipped: not modified");
            Ok(EditOutcome::NotModified)
        }
        Err(RequestError::Api(
            ApiError::MessageToEditNotFound | ApiError::MessageCantBeEdited,
        )) => Ok(EditOutcome::Unavailable),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use teloxide::types::Seconds;

    #[test]
    fn test_api_errors_are_not_transient() {
        assert!(!is_transient(&RequestError::Api(ApiError::MessageNotModified)));
        assert!(!is_transient(&RequestError::Api(ApiError::BotBlocked)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_error_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<(), RequestError> = retry_telegram_operation(|| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(RequestError::Api(ApiError::BotBlocked))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = retry_telegram_operation(|| {
            let counter = counter.clone();
            async move {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                if attempt == 0 {
                    Err(RequestError::RetryAfter(Seconds::from_seconds(1)))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.ok(), Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flood_control_is_capped_and_waited() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let started = tokio::time::Instant::now();

        let result: Result<(), RequestError> = retry_telegram_operation(|| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(RequestError::RetryAfter(Seconds::from_seconds(5)))
            }
        })
        .await;

        assert!(matches!(result, Err(RequestError::RetryAfter(_))));
        assert_eq!(calls.load(Ordering::SeqCst), TELEGRAM_API_MAX_RETRIES);
        assert!(started.elapsed() >= Duration::from_secs(10));
    }
}
