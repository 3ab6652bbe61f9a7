//! Social link registry
//!
//! Static mapping from a social platform category to the accounts shown in
//! its submenu. Built once at startup and read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building a registry from configuration
#[derive(Debug, Error)]
pub enum LinksError {
    /// The configuration is not valid JSON of the expected shape
    #[error("Invalid links JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// The configuration names a category this bot does not know
    #[error("Unknown link category: {0}")]
    UnknownCategory(String),
    /// An entry has an empty name or URL
    #[error("Empty name or url in category {0}")]
    EmptyEntry(String),
}

/// A single account link rendered as one submenu row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Button label
    pub name: String,
    /// Target URL
    pub url: String,
}

impl LinkEntry {
    /// Create a new link entry
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Returns true if Telegram accepts this URL on an inline URL button.
    ///
    /// Only `http`, `https` and `tg` links are allowed there; anything else
    /// (for example `mailto:`) has to be shown as text.
    #[must_use]
    pub fn is_button_link(&self) -> bool {
        let lower = self.url.to_ascii_lowercase();
        lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with("tg://")
    }
}

/// Social platforms that have a submenu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Instagram
    Instagram,
    /// `TikTok`
    TikTok,
    /// Telegram
    Telegram,
    /// Discord
    Discord,
    /// `WhatsApp`
    WhatsApp,
    /// E-mail
    Email,
}

impl Category {
    /// All categories in main menu order
    pub const ALL: [Self; 6] = [
        Self::Instagram,
        Self::TikTok,
        Self::Telegram,
        Self::Discord,
        Self::WhatsApp,
        Self::Email,
    ];

    /// Stable key used in button payloads and configuration
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::TikTok => "tiktok",
            Self::Telegram => "telegram",
            Self::Discord => "discord",
            Self::WhatsApp => "whatsapp",
            Self::Email => "email",
        }
    }

    /// Human-readable platform name
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::TikTok => "TikTok",
            Self::Telegram => "Telegram",
            Self::Discord => "Discord",
            Self::WhatsApp => "WhatsApp",
            Self::Email => "Email",
        }
    }

}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = LinksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| LinksError::UnknownCategory(s.to_string()))
    }
}

/// Read-only mapping from category to its ordered link entries
#[derive(Debug, Clone, Default)]
pub struct LinkRegistry {
    entries: HashMap<Category, Vec<LinkEntry>>,
}

impl LinkRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the accounts the bot ships with
    #[must_use]
    pub fn builtin() -> Self {
        Self::new()
            .with(
                Category::Instagram,
                vec![LinkEntry::new(
                    "Instagram @Kaydarap",
                    "https://instagram.com/Kaydarap",
                )],
            )
            .with(
                Category::TikTok,
                vec![LinkEntry::new(
                    "TikTok @Kaydarap",
                    "https://www.tiktok.com/@Kaydarap",
                )],
            )
            .with(
                Category::Telegram,
                vec![LinkEntry::new("Telegram @Kaydarap", "https://t.me/Kaydarap")],
            )
            .with(
                Category::Discord,
                vec![LinkEntry::new(
                    "Discord",
                    "https://discord.gg/YOUR_INVITE_CODE",
                )],
            )
            .with(
                Category::WhatsApp,
                vec![LinkEntry::new("WhatsApp", "https://wa.me/16025662108")],
            )
            .with(
                Category::Email,
                vec![LinkEntry::new("Email", "mailto:Kaydarap@gmail.com")],
            )
    }

    /// Builder-style insert, replacing any previous entries of the category
    #[must_use]
    pub fn with(mut self, category: Category, entries: Vec<LinkEntry>) -> Self {
        self.entries.insert(category, entries);
        self
    }

    /// Overlay categories from a JSON object of the form
    /// `{"instagram": [{"name": "...", "url": "..."}]}` on top of `self`.
    ///
    /// # Errors
    ///
    /// Returns `LinksError` if the JSON is malformed, names an unknown
    /// category, or contains an entry with an empty name or URL.
    pub fn with_json_overrides(mut self, json: &str) -> Result<Self, LinksError> {
        let raw: HashMap<String, Vec<LinkEntry>> = serde_json::from_str(json)?;
        for (key, entries) in raw {
            let category: Category = key.parse()?;
            if entries
                .iter()
                .any(|e| e.name.trim().is_empty() || e.url.trim().is_empty())
            {
                return Err(LinksError::EmptyEntry(key));
            }
            self.entries.insert(category, entries);
        }
        Ok(self)
    }

    /// Entries for a category, or `None` when nothing is registered for it
    #[must_use]
    pub fn lookup(&self, category: Category) -> Option<&[LinkEntry]> {
        self.entries
            .get(&category)
            .map(Vec::as_slice)
            .filter(|entries| !entries.is_empty())
    }

    /// Number of categories with at least one entry
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().filter(|e| !e.is_empty()).count()
    }

    /// Returns true if no category has entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
