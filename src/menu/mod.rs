//! Menu state machine.
//!
//! Each user is either browsing the links menu or in AI support mode. Inbound
//! events (commands, button presses, text) are routed by [`transition`] and
//! rendered by [`ModeDispatcher`] into [`Reply`] actions that a transport
//! delivers.
//!
//! ```
//! use links_menu_bot::menu::{transition, Effect, Event, MenuAction, Mode};
//!
//! let t = transition(Mode::Menu, &Event::Button(MenuAction::SupportAi), true);
//! assert_eq!(t.next, Mode::AiRelay);
//! assert_eq!(t.effect, Effect::AiEnabled);
//!
//! let t = transition(Mode::Menu, &Event::Text("hello".into()), true);
//! assert_eq!(t.effect, Effect::Ignore);
//! ```

/// Event routing
pub mod dispatcher;
/// Inbound events and callback payloads
pub mod event;
/// Per-user mode store
pub mod state;
/// Texts, keyboards and reply actions
pub mod view;

pub use dispatcher::{transition, Effect, ModeDispatcher, ReplySink, Transition};
pub use event::{Event, InboundEvent, MenuAction};
pub use state::{AiModeStore, Mode, UserId};
pub use view::{Language, OutgoingText, Reply};
