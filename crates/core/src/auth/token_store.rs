use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::settings::DEFAULT_TOKEN_KEY;
use crate::notify::{Subscribers, Subscription};
use crate::storage::traits::KeyValueStore;

/// Holds the bearer token in memory and mirrors it to a key-value slot so
/// other components (or other windows sharing the store) can read it.
pub struct TokenStore {
    token: RwLock<Option<String>>,
    mirror: Arc<dyn KeyValueStore>,
    key: String,
    subscribers: Subscribers,
}

impl TokenStore {
    /// Mirror under the default `bearer_token` key.
    pub fn new(mirror: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(mirror, DEFAULT_TOKEN_KEY)
    }

    pub fn with_key(mirror: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(None),
            mirror,
            key: key.into(),
            subscribers: Subscribers::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// In-memory token, falling back to (and caching) the mirrored value.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        if let Some(token) = self.token.read().clone() {
            return Some(token);
        }
        let mirrored = self.read_mirror();
        if mirrored.is_some() {
            *self.token.write() = mirrored.clone();
        }
        mirrored
    }

    /// Store or clear the token. `None` removes the mirror entry.
    /// Observers are notified when the value actually changes.
    pub fn set(&self, token: Option<&str>) -> Result<(), CoreError> {
        match token {
            Some(t) => self.mirror.set(&self.key, t)?,
            None => self.mirror.remove(&self.key)?,
        }

        let changed = {
            let mut slot = self.token.write();
            let changed = slot.as_deref() != token;
            *slot = token.map(str::to_string);
            changed
        };

        if changed {
            debug!(present = token.is_some(), "access token updated");
            self.subscribers.notify();
        }
        Ok(())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    /// Entry point for a storage-change signal from another writer of the
    /// mirror. If `key` is ours, re-read the mirror and notify observers when
    /// the token differs. Returns whether anything changed.
    pub fn handle_storage_change(&self, key: &str) -> bool {
        if key != self.key {
            return false;
        }
        let mirrored = self.read_mirror();
        let changed = {
            let mut slot = self.token.write();
            let changed = *slot != mirrored;
            *slot = mirrored;
            changed
        };
        if changed {
            debug!("access token changed by another writer");
            self.subscribers.notify();
        }
        changed
    }

    /// Observe token changes (login, logout, external change).
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    fn read_mirror(&self) -> Option<String> {
        match self.mirror.get(&self.key) {
            Ok(value) => value.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read token mirror");
                None
            }
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print the token itself
        f.debug_struct("TokenStore")
            .field("key", &self.key)
            .field("present", &self.token.read().is_some())
            .finish()
    }
}
