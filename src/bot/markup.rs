//! Inline markup rendering
//!
//! Turns transport-neutral [`Keyboard`]s into Telegram inline keyboards.

use crate::menu::view::{Button, ButtonKind, Keyboard};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::warn;

/// Convert a keyboard into inline markup.
///
/// Buttons with an unparsable URL are dropped, and so are rows left empty.
///
/// # Examples
///
/// ```
/// use links_menu_bot::bot::markup::inline_markup;
/// use links_menu_bot::menu::view::{main_menu_keyboard, Language};
///
/// let markup = inline_markup(&main_menu_keyboard(Language::En));
/// assert_eq!(markup.inline_keyboard.len(), 4);
/// ```
#[must_use]
pub fn inline_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .rows
        .iter()
        .map(|row| row.iter().filter_map(inline_button).collect::<Vec<_>>())
        .filter(|row| !row.is_empty())
        .collect();
    InlineKeyboardMarkup::new(rows)
}

fn inline_button(button: &Button) -> Option<InlineKeyboardButton> {
    match &button.kind {
        ButtonKind::Callback(data) => Some(InlineKeyboardButton::callback(
            button.label.clone(),
            data.clone(),
        )),
        ButtonKind::Url(raw) => match reqwest::Url::parse(raw) {
            Ok(url) => Some(InlineKeyboardButton::url(button.label.clone(), url)),
            Err(e) => {
                warn!("Skipping link button '{}' with invalid url {raw}: {e}", button.label);
                None
            }
        },
    }
}
