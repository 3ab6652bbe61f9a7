//! Inbound events and button actions

use super::state::UserId;
use crate::links::Category;

/// Callback data for the AI support button
pub const CALLBACK_SUPPORT_AI: &str = "support_ai";
/// Callback data for the back-to-menu button
pub const CALLBACK_BACK_TO_MENU: &str = "back_to_menu";

/// Callback data of the main menu button for a category
#[must_use]
pub const fn social_callback(category: Category) -> &'static str {
    match category {
        Category::Instagram => "social_instagram",
        Category::TikTok => "social_tiktok",
        Category::Telegram => "social_telegram",
        Category::Discord => "social_discord",
        Category::WhatsApp => "social_whatsapp",
        Category::Email => "social_email",
    }
}

/// Action behind an inline button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Open the submenu of a social platform
    Social(Category),
    /// Switch to AI support mode
    SupportAi,
    /// Return to the main menu
    BackToMenu,
    /// Payload this bot never produced
    Unknown(String),
}

impl MenuAction {
    /// Parse callback data. Anything outside the known set becomes
    /// [`MenuAction::Unknown`].
    #[must_use]
    pub fn parse(payload: &str) -> Self {
        match payload {
            CALLBACK_SUPPORT_AI => Self::SupportAi,
            CALLBACK_BACK_TO_MENU => Self::BackToMenu,
            other => Category::ALL
                .into_iter()
                .find(|c| social_callback(*c) == other)
                .map_or_else(|| Self::Unknown(other.to_string()), Self::Social),
        }
    }

    /// Callback data for this action
    #[must_use]
    pub fn payload(&self) -> &str {
        match self {
            Self::Social(category) => social_callback(*category),
            Self::SupportAi => CALLBACK_SUPPORT_AI,
            Self::BackToMenu => CALLBACK_BACK_TO_MENU,
            Self::Unknown(raw) => raw,
        }
    }
}

/// Kind of inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `/start` command
    Start,
    /// `/menu` command
    Menu,
    /// Inline button press
    Button(MenuAction),
    /// Free-text message
    Text(String),
}

/// An event tagged with the user that caused it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Sender
    pub user: UserId,
    /// What happened
    pub event: Event,
}

impl InboundEvent {
    /// Create a new inbound event
    #[must_use]
    pub const fn new(user: UserId, event: Event) -> Self {
        Self { user, event }
    }

    /// Button press with raw callback data
    #[must_use]
    pub fn button(user: UserId, payload: &str) -> Self {
        Self::new(user, Event::Button(MenuAction::parse(payload)))
    }

    /// Free-text message
    #[must_use]
    pub fn text(user: UserId, body: impl Into<String>) -> Self {
        Self::new(user, Event::Text(body.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_payloads() {
        assert_eq!(MenuAction::parse("support_ai"), MenuAction::SupportAi);
        assert_eq!(MenuAction::parse("back_to_menu"), MenuAction::BackToMenu);
        assert_eq!(
            MenuAction::parse("social_instagram"),
            MenuAction::Social(Category::Instagram)
        );
        assert_eq!(
            MenuAction::parse("social_email"),
            MenuAction::Social(Category::Email)
        );
    }

    #[test]
    fn test_parse_unknown_payloads() {
        for raw in ["", "social_", "social_myspace", "SOCIAL_TIKTOK", "retry"] {
            assert_eq!(MenuAction::parse(raw), MenuAction::Unknown(raw.to_string()));
        }
    }

    #[test]
    fn test_payload_matches_parse() {
        for category in Category::ALL {
            let action = MenuAction::Social(category);
            assert_eq!(MenuAction::parse(action.payload()), action);
        }
        assert_eq!(MenuAction::SupportAi.payload(), CALLBACK_SUPPORT_AI);
    }
}
