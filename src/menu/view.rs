//! Menu UI components
//!
//! Transport-neutral keyboards and the texts shown to the user. The Telegram
//! layer turns [`Keyboard`] into inline markup.

use super::event::{social_callback, CALLBACK_BACK_TO_MENU, CALLBACK_SUPPORT_AI};
use crate::links::{Category, LinkEntry};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Keyboard model
// ─────────────────────────────────────────────────────────────────────────────

/// What pressing a button does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonKind {
    /// Sends callback data back to the bot
    Callback(String),
    /// Opens a URL on the client
    Url(String),
}

/// A single inline button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Visible label
    pub label: String,
    /// Button behavior
    pub kind: ButtonKind,
}

impl Button {
    /// Callback button
    #[must_use]
    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Callback(data.into()),
        }
    }

    /// URL button
    #[must_use]
    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Url(url.into()),
        }
    }
}

/// Rows of inline buttons
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    /// Button rows, top to bottom
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// Create a keyboard from rows
    #[must_use]
    pub const fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    /// All buttons in reading order
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outbound replies
// ─────────────────────────────────────────────────────────────────────────────

/// Text with an optional keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingText {
    /// Message body
    pub text: String,
    /// Whether `text` is Telegram HTML
    pub html: bool,
    /// Inline keyboard attached to the message
    pub keyboard: Option<Keyboard>,
}

impl OutgoingText {
    /// Plain text, sent as-is
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: false,
            keyboard: None,
        }
    }

    /// HTML-formatted text
    #[must_use]
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: true,
            keyboard: None,
        }
    }

    /// Attach a keyboard
    #[must_use]
    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Action the transport has to perform for an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Send a new message to the chat
    Send(OutgoingText),
    /// Replace the message that carried the pressed button
    Edit(OutgoingText),
    /// Show the typing indicator
    Typing,
}

// ─────────────────────────────────────────────────────────────────────────────
// Texts
// ─────────────────────────────────────────────────────────────────────────────

/// Language of the menu texts and button labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Persian
    Fa,
}

impl Language {
    /// Reply to `/start`
    #[must_use]
    pub const fn welcome_message(self) -> &'static str {
        match self {
            Self::En => "Hi 👋\nWelcome to the Kaydarap bot!\nPick one of the social networks below 👇",
            Self::Fa => "سلام 👋\nبه ربات Kaydarap خوش اومدی!\nیکی از شبکه‌های اجتماعی زیر رو انتخاب کن 👇",
        }
    }

    /// Prompt above the main menu
    #[must_use]
    pub const fn menu_prompt(self) -> &'static str {
        match self {
            Self::En => "Pick one of the social networks below 👇",
            Self::Fa => "یکی از شبکه‌های اجتماعی زیر رو انتخاب کن 👇",
        }
    }

    /// Category has no registered accounts
    #[must_use]
    pub const fn category_unavailable(self) -> &'static str {
        match self {
            Self::En => "No account has been registered for this network yet.",
            Self::Fa => "برای این شبکه هنوز اکانتی ثبت نشده.",
        }
    }

    /// Confirmation after entering AI support mode
    #[must_use]
    pub const fn ai_enabled(self) -> &'static str {
        match self {
            Self::En => "🤖 AI support is on.\nSend your question as a message and I will answer it.\nUse /menu to go back.",
            Self::Fa => "🤖 پشتیبانی هوش مصنوعی فعال شد.\nسوالت رو بفرست تا جواب بدم.\nبرای برگشت /menu رو بزن.",
        }
    }

    /// AI support is not configured
    #[must_use]
    pub const fn ai_unavailable(self) -> &'static str {
        match self {
            Self::En => "🚫 AI support is currently unavailable.",
            Self::Fa => "🚫 پشتیبانی هوش مصنوعی در حال حاضر در دسترس نیست.",
        }
    }

    /// Completion request failed
    #[must_use]
    pub const fn ai_error(self) -> &'static str {
        match self {
            Self::En => "😔 Sorry, I could not get an answer right now. Please try again later.",
            Self::Fa => "😔 متاسفانه الان نتونستم جواب بگیرم. لطفا بعدا دوباره امتحان کن.",
        }
    }

    /// Label of the back-to-menu button
    #[must_use]
    pub const fn back_to_menu_label(self) -> &'static str {
        match self {
            Self::En => "🔙 Back to menu",
            Self::Fa => "🔙 برگشت به منو",
        }
    }

    /// Label of the AI support button
    #[must_use]
    pub const fn ai_support_label(self) -> &'static str {
        match self {
            Self::En => "🤖 AI support",
            Self::Fa => "🤖 پشتیبانی هوش مصنوعی",
        }
    }

    /// Platform name as shown to the user
    #[must_use]
    pub const fn category_title(self, category: Category) -> &'static str {
        match self {
            Self::En => category.title(),
            Self::Fa => match category {
                Category::Instagram => "اینستاگرام",
                Category::TikTok => "تیک‌تاک",
                Category::Telegram => "تلگرام",
                Category::Discord => "دیسکورد",
                Category::WhatsApp => "واتساپ",
                Category::Email => "ایمیل",
            },
        }
    }

    /// Main menu button label of a category
    #[must_use]
    pub fn category_label(self, category: Category) -> String {
        let icon = match category {
            Category::Instagram => "📸",
            Category::TikTok => "🎵",
            Category::Telegram => "💬",
            Category::Discord => "🎮",
            Category::WhatsApp => "📱",
            Category::Email => "✉️",
        };
        format!("{icon} {}", self.category_title(category))
    }

    /// Title of a category submenu (HTML)
    #[must_use]
    pub fn submenu_title(self, category: Category) -> String {
        let title = html_escape::encode_text(self.category_title(category));
        match self {
            Self::En => format!("📱 <b>{title} accounts:</b>"),
            Self::Fa => format!("📱 <b>اکانت‌های {title}:</b>"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "fa" | "persian" | "farsi" => Ok(Self::Fa),
            other => Err(format!("Unsupported language: {other}")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Keyboards
// ─────────────────────────────────────────────────────────────────────────────

/// Back-to-menu button
#[must_use]
pub fn back_to_menu_button(lang: Language) -> Button {
    Button::callback(lang.back_to_menu_label(), CALLBACK_BACK_TO_MENU)
}

/// Main menu: two categories per row, then the AI support button
///
/// # Examples
///
/// ```
/// use links_menu_bot::menu::view::{main_menu_keyboard, Language};
/// let keyboard = main_menu_keyboard(Language::Fa);
/// assert_eq!(keyboard.rows.len(), 4);
/// ```
#[must_use]
pub fn main_menu_keyboard(lang: Language) -> Keyboard {
    let mut rows: Vec<Vec<Button>> = Category::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|c| Button::callback(lang.category_label(*c), social_callback(*c)))
                .collect()
        })
        .collect();
    rows.push(vec![Button::callback(
        lang.ai_support_label(),
        CALLBACK_SUPPORT_AI,
    )]);
    Keyboard::new(rows)
}

/// Submenu keyboard: one URL button per link, then back-to-menu
#[must_use]
pub fn links_keyboard(lang: Language, entries: &[LinkEntry]) -> Keyboard {
    let mut rows: Vec<Vec<Button>> = entries
        .iter()
        .filter(|e| e.is_button_link())
        .map(|e| vec![Button::url(e.name.clone(), e.url.clone())])
        .collect();
    rows.push(vec![back_to_menu_button(lang)]);
    Keyboard::new(rows)
}

/// Keyboard shown while in AI support mode
#[must_use]
pub fn ai_mode_keyboard(lang: Language) -> Keyboard {
    Keyboard::new(vec![vec![back_to_menu_button(lang)]])
}

/// Submenu text: title plus any links that cannot be URL buttons
#[must_use]
pub fn submenu_text(lang: Language, category: Category, entries: &[LinkEntry]) -> String {
    let mut text = lang.submenu_title(category);
    for entry in entries.iter().filter(|e| !e.is_button_link()) {
        let target = entry.url.strip_prefix("mailto:").unwrap_or(&entry.url);
        text.push_str(&format!(
            "\n• {}: {}",
            html_escape::encode_text(&entry.name),
            html_escape::encode_text(target)
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_lists_all_categories_and_support() {
        let keyboard = main_menu_keyboard(Language::En);
        let callbacks: Vec<&ButtonKind> = keyboard.buttons().map(|b| &b.kind).collect();
        assert_eq!(callbacks.len(), Category::ALL.len() + 1);
        assert_eq!(
            callbacks[0],
            &ButtonKind::Callback("social_instagram".to_string())
        );
        assert_eq!(
            callbacks.last().copied(),
            Some(&ButtonKind::Callback("support_ai".to_string()))
        );
        assert!(keyboard.rows.iter().all(|row| row.len() <= 2));
    }

    #[test]
    fn test_persian_menu_keeps_callbacks() {
        let en = main_menu_keyboard(Language::En);
        let fa = main_menu_keyboard(Language::Fa);
        let kinds = |k: &Keyboard| k.buttons().map(|b| b.kind.clone()).collect::<Vec<_>>();
        assert_eq!(kinds(&en), kinds(&fa));
        assert_eq!(fa.rows[0][0].label, "📸 اینستاگرام");
        assert_eq!(back_to_menu_button(Language::Fa).label, "🔙 برگشت به منو");
    }

    #[test]
    fn test_links_keyboard_ends_with_back() {
        let entries = [
            LinkEntry::new("One", "https://one.example"),
            LinkEntry::new("Two", "https://two.example"),
        ];
        let keyboard = links_keyboard(Language::En, &entries);
        assert_eq!(keyboard.rows.len(), 3);
        assert_eq!(
            keyboard.rows[1][0],
            Button::url("Two", "https://two.example")
        );
        assert_eq!(keyboard.rows[2][0], back_to_menu_button(Language::En));
    }

    #[test]
    fn test_mailto_is_listed_in_text() {
        let entries = [LinkEntry::new("Email", "mailto:Kaydarap@gmail.com")];
        let keyboard = links_keyboard(Language::En, &entries);
        assert_eq!(keyboard.rows, vec![vec![back_to_menu_button(Language::En)]]);

        let text = submenu_text(Language::En, Category::Email, &entries);
        assert!(text.starts_with("📱 <b>Email accounts:</b>"));
        assert!(text.contains("• Email: Kaydarap@gmail.com"));
    }

    #[test]
    fn test_persian_submenu_title() {
        let text = submenu_text(Language::Fa, Category::TikTok, &[]);
        assert_eq!(text, "📱 <b>اکانت‌های تیک‌تاک:</b>");
    }

    #[test]
    fn test_submenu_text_escapes_names() {
        let entries = [LinkEntry::new("<me>", "mailto:a&b@example.com")];
        let text = submenu_text(Language::En, Category::Email, &entries);
        assert!(text.contains("&lt;me&gt;: a&amp;b@example.com"));
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("FA".parse::<Language>(), Ok(Language::Fa));
        assert_eq!("english".parse::<Language>(), Ok(Language::En));
        assert!("de".parse::<Language>().is_err());
    }
}
