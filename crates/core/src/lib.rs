pub mod auth;
pub mod errors;
pub mod models;
pub mod notify;
pub mod services;
pub mod storage;

use chrono::Utc;
use models::{
    query::{TradeFilter, TradeQuery},
    stats::{MonthlyPnl, PairPerformance, TradeStats},
    trade::{NewTrade, Trade, TradeUpdate},
};
use notify::{Subscribers, Subscription};
use services::{
    query_service::QueryService, stats_service::StatsService,
    validation_service::ValidationService,
};
use storage::traits::TradeStorage;
use tracing::{debug, info, warn};

use errors::CoreError;

/// Main entry point for the trade journal core.
///
/// Owns the authoritative trade list, keeps pnl derived, persists the full
/// list after every mutation and tells observers about it. Construct one per
/// UI tree / session and pass it around; there is no global instance.
#[must_use]
pub struct TradeLedger {
    trades: Vec<Trade>,
    storage: Box<dyn TradeStorage>,
    subscribers: Subscribers,
    query_service: QueryService,
    stats_service: StatsService,
    validation_service: ValidationService,
}

impl std::fmt::Debug for TradeLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeLedger")
            .field("trades", &self.trades.len())
            .field("storage", &self.storage.name())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl TradeLedger {
    /// Load the journal from `storage` and build a ledger around it.
    pub fn open(storage: Box<dyn TradeStorage>) -> Result<Self, CoreError> {
        let mut trades = storage.load()?;
        // pnl is derived; never trust a stored value
        for trade in &mut trades {
            trade.refresh_pnl();
        }
        info!(storage = storage.name(), count = trades.len(), "ledger opened");

        Ok(Self {
            trades,
            storage,
            subscribers: Subscribers::new(),
            query_service: QueryService::new(),
            stats_service: StatsService::new(),
            validation_service: ValidationService::new(),
        })
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Record a new trade. Assigns id and timestamps, computes pnl, persists, notifies.
    /// No field validation is done here; see [`add_validated`](Self::add_validated).
    pub fn add(&mut self, new_trade: NewTrade) -> Result<Trade, CoreError> {
        let trade = Trade::create(new_trade, Utc::now());

        self.trades.push(trade.clone());
        if let Err(e) = self.persist() {
            self.trades.pop();
            return Err(e);
        }

        debug!(id = %trade.id, pair = %trade.currency_pair, pnl = ?trade.pnl, "trade added");
        self.subscribers.notify();
        Ok(trade)
    }

    /// Like [`add`](Self::add), but rejects invalid input with `ValidationError`
    /// before anything is stored.
    pub fn add_validated(&mut self, new_trade: NewTrade) -> Result<Trade, CoreError> {
        self.validation_service.validate_new_trade(&new_trade)?;
        self.add(new_trade)
    }

    /// Merge `update` into the trade with `id`. Returns `Ok(None)` if no such trade.
    ///
    /// `id` and `created_at` are preserved, `updated_at` refreshed. pnl is
    /// recomputed only when entry/exit price, size or direction was part of the update.
    pub fn update(&mut self, id: &str, update: TradeUpdate) -> Result<Option<Trade>, CoreError> {
        self.update_inner(id, update, false)
    }

    /// Like [`update`](Self::update), but validates the merged trade first.
    pub fn update_validated(&mut self, id: &str, update: TradeUpdate) -> Result<Option<Trade>, CoreError> {
        self.update_inner(id, update, true)
    }

    /// Remove a trade. Returns whether one was removed; a miss neither
    /// persists nor notifies.
    pub fn delete(&mut self, id: &str) -> Result<bool, CoreError> {
        let Some(idx) = self.trades.iter().position(|t| t.id == id) else {
            return Ok(false);
        };

        let removed = self.trades.remove(idx);
        if let Err(e) = self.persist() {
            self.trades.insert(idx, removed);
            return Err(e);
        }

        debug!(id, "trade deleted");
        self.subscribers.notify();
        Ok(true)
    }

    /// Re-read the journal from storage, replacing the in-memory list, and notify.
    pub fn reload(&mut self) -> Result<(), CoreError> {
        let mut trades = self.storage.load()?;
        for trade in &mut trades {
            trade.refresh_pnl();
        }
        self.trades = trades;
        info!(count = self.trades.len(), "ledger reloaded");
        self.subscribers.notify();
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Trades matching `filter` (all trades if `None`), newest first.
    #[must_use]
    pub fn get_trades(&self, filter: Option<&TradeFilter>) -> Vec<&Trade> {
        self.query_service.filter(&self.trades, filter)
    }

    #[must_use]
    pub fn get_trade(&self, id: &str) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id == id)
    }

    /// Dashboard listing: filter, free-text search, and sort by any field.
    #[must_use]
    pub fn query(&self, query: &TradeQuery) -> Vec<&Trade> {
        self.query_service.run(&self.trades, query)
    }

    /// Distinct currency pairs in the journal, alphabetically.
    #[must_use]
    pub fn get_currency_pairs(&self) -> Vec<String> {
        self.query_service.currency_pairs(&self.trades)
    }

    #[must_use]
    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    // ── Analytics ───────────────────────────────────────────────────

    /// Aggregate statistics over closed trades that have a pnl.
    #[must_use]
    pub fn get_stats(&self) -> TradeStats {
        self.stats_service.compute(&self.trades)
    }

    #[must_use]
    pub fn monthly_pnl(&self) -> Vec<MonthlyPnl> {
        self.stats_service.monthly_pnl(&self.trades)
    }

    #[must_use]
    pub fn pair_performance(&self) -> Vec<PairPerformance> {
        self.stats_service.pair_performance(&self.trades)
    }

    /// Most recently created closed trades, at most `limit`.
    #[must_use]
    pub fn recent_closed_trades(&self, limit: usize) -> Vec<&Trade> {
        self.get_trades(None)
            .into_iter()
            .filter(|t| t.is_closed())
            .take(limit)
            .collect()
    }

    // ── Observers ───────────────────────────────────────────────────

    /// Register a callback run after every successful add/update/delete/reload.
    ///
    /// Callbacks run synchronously inside the mutating call, while the ledger
    /// is still mutably borrowed. If the ledger sits behind a lock, a callback
    /// must not take that lock to re-query; record that a change happened and
    /// read the ledger once the mutator has returned.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all trades as a pretty-printed JSON array.
    pub fn export_trades_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.trades)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize trades to JSON: {e}")))
    }

    /// Export all trades as CSV, oldest first.
    /// Columns: id, currency_pair, direction, entry_price, exit_price, position_size,
    /// stop_loss, take_profit, entry_date, exit_date, status, pnl, notes
    #[must_use]
    pub fn export_trades_to_csv(&self) -> String {
        let mut csv = String::from(
            "id,currency_pair,direction,entry_price,exit_price,position_size,stop_loss,take_profit,entry_date,exit_date,status,pnl,notes\n",
        );
        let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();

        for t in &self.trades {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
                csv_field(&t.id),
                csv_field(&t.currency_pair),
                t.direction,
                t.entry_price,
                opt(t.exit_price),
                t.position_size,
                opt(t.stop_loss),
                opt(t.take_profit),
                t.entry_date,
                t.exit_date.map(|d| d.to_string()).unwrap_or_default(),
                t.status,
                opt(t.pnl),
                csv_field(&t.notes),
            ));
        }
        csv
    }

    /// Import trades from a JSON array of new-trade records (no ids or timestamps).
    /// Every record is validated first; if any fails, nothing is imported.
    /// Returns the number of trades added.
    pub fn import_trades_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let incoming: Vec<NewTrade> = serde_json::from_str(json)?;
        for (idx, new_trade) in incoming.iter().enumerate() {
            self.validation_service
                .validate_new_trade(new_trade)
                .map_err(|e| CoreError::ValidationError(format!("record {idx}: {e}")))?;
        }

        let count = incoming.len();
        if count == 0 {
            return Ok(0);
        }

        let now = Utc::now();
        let before = self.trades.len();
        self.trades
            .extend(incoming.into_iter().map(|n| Trade::create(n, now)));
        if let Err(e) = self.persist() {
            self.trades.truncate(before);
            return Err(e);
        }

        info!(count, "trades imported");
        self.subscribers.notify();
        Ok(count)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn update_inner(
        &mut self,
        id: &str,
        update: TradeUpdate,
        validate: bool,
    ) -> Result<Option<Trade>, CoreError> {
        let Some(idx) = self.trades.iter().position(|t| t.id == id) else {
            debug!(id, "update for unknown trade");
            return Ok(None);
        };

        let mut updated = self.trades[idx].clone();
        update.apply_to(&mut updated, Utc::now());
        if validate {
            self.validation_service.validate_trade(&updated)?;
        }

        let previous = std::mem::replace(&mut self.trades[idx], updated.clone());
        if let Err(e) = self.persist() {
            self.trades[idx] = previous;
            return Err(e);
        }

        debug!(id, pnl = ?updated.pnl, "trade updated");
        self.subscribers.notify();
        Ok(Some(updated))
    }

    fn persist(&mut self) -> Result<(), CoreError> {
        self.storage.save(&self.trades).map_err(|e| {
            warn!(storage = self.storage.name(), error = %e, "failed to persist journal");
            e
        })
    }
}

/// Quote a CSV field if it contains a comma, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
