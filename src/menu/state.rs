//! Per-user mode tracking
//!
//! Transport-agnostic: works with any client that can identify a user by an
//! integer id.

use std::collections::HashSet;
use std::fmt;
use tokio::sync::RwLock;
use tracing::debug;

/// Opaque identifier of a chat participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Conversation mode of a single user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Menu navigation, free text is ignored
    #[default]
    Menu,
    /// Free text is relayed to the completion service
    AiRelay,
}

/// Set of users currently in [`Mode::AiRelay`].
///
/// Every operation takes the lock exactly once, so a mode change and a
/// concurrent read for the same user never interleave half-way.
#[derive(Debug, Default)]
pub struct AiModeStore {
    users: RwLock<HashSet<UserId>>,
}

impl AiModeStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode of a user
    pub async fn mode(&self, user: UserId) -> Mode {
        if self.users.read().await.contains(&user) {
            Mode::AiRelay
        } else {
            Mode::Menu
        }
    }

    /// Put a user into relay mode. Returns true if the mode changed.
    #[cfg(test)]
    pub async fn enter(&self, user: UserId) -> bool {
        self.users.write().await.insert(user)
    }

    /// Return a user to menu mode. Returns true if the mode changed.
    #[cfg(test)]
    pub async fn leave(&self, user: UserId) -> bool {
        self.users.write().await.remove(&user)
    }

    /// Read the mode of `user`, compute the next one with `f` and store it,
    /// all under a single write lock.
    pub async fn update<F, R>(&self, user: UserId, f: F) -> R
    where
        F: FnOnce(Mode) -> (Mode, R),
    {
        let mut users = self.users.write().await;
        let current = if users.contains(&user) {
            Mode::AiRelay
        } else {
            Mode::Menu
        };

        let (next, result) = f(current);
        if next != current {
            debug!(user = %user, from = ?current, to = ?next, "Mode changed");
        }
        match next {
            Mode::AiRelay => users.insert(user),
            Mode::Menu => users.remove(&user),
        };
        result
    }

    /// Number of users in relay mode
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns true if nobody is in relay mode
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_new_users_start_in_menu() {
        let store = AiModeStore::new();
        assert_eq!(store.mode(UserId(1)).await, Mode::Menu);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_enter_and_leave() {
        let store = AiModeStore::new();
        assert!(store.enter(UserId(7)).await);
        assert!(!store.enter(UserId(7)).await);
        assert_eq!(store.mode(UserId(7)).await, Mode::AiRelay);

        assert!(store.leave(UserId(7)).await);
        assert!(!store.leave(UserId(7)).await);
        assert_eq!(store.mode(UserId(7)).await, Mode::Menu);
    }

    #[tokio::test]
    async fn test_update_applies_next_mode() {
        let store = AiModeStore::new();
        let seen = store
            .update(UserId(3), |mode| (Mode::AiRelay, mode))
            .await;
        assert_eq!(seen, Mode::Menu);
        assert_eq!(store.mode(UserId(3)).await, Mode::AiRelay);

        let seen = store.update(UserId(3), |mode| (Mode::Menu, mode)).await;
        assert_eq!(seen, Mode::AiRelay);
        assert_eq!(store.mode(UserId(3)).await, Mode::Menu);
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let store = Arc::new(AiModeStore::new());
        let mut handles = Vec::new();
        for id in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.enter(UserId(id)).await;
                if id % 2 == 0 {
                    store.leave(UserId(id)).await;
                }
            }));
        }
        for handle in handles {
            assert!(handle.await.is_ok());
        }

        assert_eq!(store.len().await, 25);
        assert_eq!(store.mode(UserId(1)).await, Mode::AiRelay);
        assert_eq!(store.mode(UserId(2)).await, Mode::Menu);
    }
}
