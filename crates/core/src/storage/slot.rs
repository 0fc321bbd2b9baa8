use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::journal::{JournalRef, StoredJournal};
use crate::models::settings::DEFAULT_STORAGE_KEY;
use crate::models::trade::Trade;

use super::traits::{KeyValueStore, TradeStorage};

/// Keeps the whole trade list as one JSON document in a single key-value slot.
///
/// Writes `{"version":1,"trades":[...]}`. Reads that envelope or a bare
/// JSON array of trades.
pub struct SlotTradeStorage<K: KeyValueStore> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> SlotTradeStorage<K> {
    /// Use the default `forex-trades` slot.
    pub fn new(store: K) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &K {
        &self.store
    }
}

impl<K: KeyValueStore> TradeStorage for SlotTradeStorage<K> {
    fn name(&self) -> &str {
        "key-value slot"
    }

    fn load(&self) -> Result<Vec<Trade>, CoreError> {
        let Some(raw) = self.store.get(&self.key)? else {
            debug!(key = %self.key, "journal slot empty");
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let stored = StoredJournal::from_json(&raw).map_err(|e| {
            CoreError::Deserialization(format!("Failed to parse journal slot '{}': {e}", self.key))
        })?;
        let trades = stored.into_trades()?;
        info!(key = %self.key, count = trades.len(), "journal loaded");
        Ok(trades)
    }

    fn save(&mut self, trades: &[Trade]) -> Result<(), CoreError> {
        let json = serde_json::to_string(&JournalRef::new(trades))
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize journal: {e}")))?;
        self.store.set(&self.key, &json)?;
        debug!(key = %self.key, count = trades.len(), bytes = json.len(), "journal saved");
        Ok(())
    }
}
