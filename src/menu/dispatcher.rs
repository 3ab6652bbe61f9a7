//! Mode dispatcher
//!
//! Routes each inbound event according to the sender's mode. The decision
//! itself is the pure [`transition`] function; [`ModeDispatcher`] applies it
//! to the shared [`AiModeStore`], renders menus from the [`LinkRegistry`] and
//! performs the completion call for relayed text.

use super::event::{Event, InboundEvent, MenuAction};
use super::state::{AiModeStore, Mode, UserId};
use super::view::{
    ai_mode_keyboard, links_keyboard, main_menu_keyboard, submenu_text, Language, OutgoingText,
    Reply,
};
use crate::links::{Category, LinkRegistry};
use crate::llm::LlmClient;
use crate::utils::truncate_str;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Receiver of the replies produced for an event
#[async_trait::async_trait]
pub trait ReplySink: Send + Sync {
    /// Deliver one reply. Delivery failures are the sink's concern.
    async fn push(&self, reply: Reply);
}

#[async_trait::async_trait]
impl ReplySink for Mutex<Vec<Reply>> {
    async fn push(&self, reply: Reply) {
        self.lock().await.push(reply);
    }
}

/// What the dispatcher has to do after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the welcome text with the main menu
    Welcome,
    /// Show the main menu, replacing the current message if `edit`
    MainMenu {
        /// Edit the message that carried the pressed button
        edit: bool,
    },
    /// Show the submenu of a category
    Submenu(Category),
    /// Confirm that AI support mode is on
    AiEnabled,
    /// Tell the user AI support is not configured
    AiUnavailable,
    /// Forward the text to the completion service
    Relay(String),
    /// Nothing to do
    Ignore,
}

impl Effect {
    /// Short name for logs; never includes user text
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::MainMenu { .. } => "main_menu",
            Self::Submenu(_) => "submenu",
            Self::AiEnabled => "ai_enabled",
            Self::AiUnavailable => "ai_unavailable",
            Self::Relay(_) => "relay",
            Self::Ignore => "ignore",
        }
    }
}

/// Result of [`transition`]: the next mode and the effect to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Mode after the event
    pub next: Mode,
    /// Effect to perform
    pub effect: Effect,
}

impl Transition {
    const fn new(next: Mode, effect: Effect) -> Self {
        Self { next, effect }
    }
}

/// Compute the next mode and effect for an event.
///
/// # Examples
///
/// ```
/// use links_menu_bot::menu::{transition, Effect, Event, Mode};
///
/// let t = transition(Mode::AiRelay, &Event::Start, true);
/// assert_eq!(t.next, Mode::Menu);
/// assert_eq!(t.effect, Effect::Welcome);
/// ```
#[must_use]
pub fn transition(mode: Mode, event: &Event, ai_available: bool) -> Transition {
    match event {
        Event::Start => Transition::new(Mode::Menu, Effect::Welcome),
        Event::Menu => Transition::new(Mode::Menu, Effect::MainMenu { edit: false }),
        Event::Button(action) => match action {
            MenuAction::BackToMenu => Transition::new(Mode::Menu, Effect::MainMenu { edit: true }),
            MenuAction::Social(category) => Transition::new(mode, Effect::Submenu(*category)),
            MenuAction::SupportAi if ai_available => {
                Transition::new(Mode::AiRelay, Effect::AiEnabled)
            }
            MenuAction::SupportAi => Transition::new(mode, Effect::AiUnavailable),
            MenuAction::Unknown(_) => Transition::new(mode, Effect::Ignore),
        },
        Event::Text(body) => match mode {
            Mode::AiRelay if !body.trim().is_empty() => {
                Transition::new(Mode::AiRelay, Effect::Relay(body.clone()))
            }
            _ => Transition::new(mode, Effect::Ignore),
        },
    }
}

/// Transport-agnostic event router with injected state and services
pub struct ModeDispatcher {
    registry: Arc<LinkRegistry>,
    llm: Arc<LlmClient>,
    store: Arc<AiModeStore>,
    language: Language,
}

impl ModeDispatcher {
    /// Create a dispatcher with English texts
    #[must_use]
    pub fn new(registry: Arc<LinkRegistry>, llm: Arc<LlmClient>, store: Arc<AiModeStore>) -> Self {
        Self {
            registry,
            llm,
            store,
            language: Language::default(),
        }
    }

    /// Use `language` for every text and button label
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Shared mode store
    #[must_use]
    pub fn store(&self) -> &Arc<AiModeStore> {
        &self.store
    }

    /// Current mode of a user
    pub async fn mode(&self, user: UserId) -> Mode {
        self.store.mode(user).await
    }

    /// Handle one event and return the replies to deliver, in order.
    ///
    /// Never fails: completion errors are logged and turned into an apology.
    pub async fn handle(&self, inbound: InboundEvent) -> Vec<Reply> {
        let collected = Mutex::new(Vec::new());
        self.dispatch(inbound, &collected).await;
        collected.into_inner()
    }

    /// Handle one event, pushing each reply to `sink` as soon as it is known.
    ///
    /// The typing indicator for relayed text reaches the sink before the
    /// completion call starts.
    pub async fn dispatch<S: ReplySink + ?Sized>(&self, inbound: InboundEvent, sink: &S) {
        let ai_available = self.llm.is_available();
        let InboundEvent { user, event } = inbound;

        let step = self
            .store
            .update(user, |mode| {
                let step = transition(mode, &event, ai_available);
                (step.next, step)
            })
            .await;

        debug!(user = %user, effect = step.effect.kind(), "Dispatching event");
        self.render(user, step.effect, sink).await;
    }

    async fn render<S: ReplySink + ?Sized>(&self, user: UserId, effect: Effect, sink: &S) {
        let lang = self.language;
        match effect {
            Effect::Welcome => {
                info!("User {user} started the bot.");
                sink.push(Reply::Send(
                    OutgoingText::plain(lang.welcome_message()).with_keyboard(main_menu_keyboard(lang)),
                ))
                .await;
            }
            Effect::MainMenu { edit } => {
                let menu =
                    OutgoingText::plain(lang.menu_prompt()).with_keyboard(main_menu_keyboard(lang));
                let reply = if edit { Reply::Edit(menu) } else { Reply::Send(menu) };
                sink.push(reply).await;
            }
            Effect::Submenu(category) => sink.push(Reply::Edit(self.submenu(category))).await,
            Effect::AiEnabled => {
                info!("User {user} entered AI support mode.");
                sink.push(Reply::Edit(
                    OutgoingText::plain(lang.ai_enabled()).with_keyboard(ai_mode_keyboard(lang)),
                ))
                .await;
            }
            Effect::AiUnavailable => {
                info!("User {user} requested AI support, but it is not configured.");
                sink.push(Reply::Edit(
                    OutgoingText::plain(lang.ai_unavailable())
                        .with_keyboard(main_menu_keyboard(lang)),
                ))
                .await;
            }
            Effect::Relay(text) => {
                sink.push(Reply::Typing).await;
                sink.push(Reply::Send(self.relay(user, &text).await)).await;
            }
            Effect::Ignore => {}
        }
    }

    fn submenu(&self, category: Category) -> OutgoingText {
        let lang = self.language;
        match self.registry.lookup(category) {
            Some(entries) => OutgoingText::html(submenu_text(lang, category, entries))
                .with_keyboard(links_keyboard(lang, entries)),
            None => {
                debug!("No links registered for category {category}");
                OutgoingText::plain(lang.category_unavailable())
                    .with_keyboard(main_menu_keyboard(lang))
            }
        }
    }

    async fn relay(&self, user: UserId, text: &str) -> OutgoingText {
        info!(
            "Relaying message from user {user} to AI support. Text: '{}'",
            truncate_str(text, 100)
        );
        match self.llm.ask(text).await {
            Ok(answer) => OutgoingText::plain(answer),
            Err(e) => {
                warn!("AI support request for user {user} failed: {e}");
                OutgoingText::plain(self.language.ai_error())
            }
        }
    }
}
