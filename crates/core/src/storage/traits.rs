use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::trade::Trade;

/// Persistence collaborator of the ledger: the whole record set is read
/// once and rewritten on every mutation. Last write wins.
///
/// Implement this to back the journal with something other than the
/// bundled key-value slot or encrypted file.
pub trait TradeStorage: Send {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// Read every stored trade. An empty or missing store yields an empty list.
    fn load(&self) -> Result<Vec<Trade>, CoreError>;

    /// Replace the stored set with `trades`.
    fn save(&mut self, trades: &[Trade]) -> Result<(), CoreError>;
}

/// String key → string value store, the shape of browser local storage.
///
/// Methods take `&self` so one store can be shared (via `Arc`) between the
/// trade slot and the token mirror.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Arc<K> {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        (**self).remove(key)
    }
}
