use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::services::pnl_service;

/// Side of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Bought the base currency, profits when price rises
    Long,
    /// Sold the base currency, profits when price falls
    Short,
}

impl Direction {
    /// `+1.0` for long, `-1.0` for short.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Lifecycle state of a trade as entered by the user.
///
/// Not tied to whether an exit price is set: a closed trade may lack an
/// exit price (and therefore pnl), and an open trade may carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeStatus::Open => write!(f, "open"),
            TradeStatus::Closed => write!(f, "closed"),
        }
    }
}

/// A single logged forex position.
///
/// `pnl` is derived from entry/exit price, size and direction. It is
/// recomputed by the ledger and never set directly by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    /// Unique identifier, assigned at creation
    pub id: String,

    /// Currency pair, free-form (e.g. "EUR/USD")
    pub currency_pair: String,

    pub direction: Direction,

    pub entry_price: f64,

    #[serde(default)]
    pub exit_price: Option<f64>,

    /// Size in standard lots
    pub position_size: f64,

    #[serde(default)]
    pub stop_loss: Option<f64>,

    #[serde(default)]
    pub take_profit: Option<f64>,

    pub entry_date: NaiveDate,

    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub exit_date: Option<NaiveDate>,

    pub status: TradeStatus,

    #[serde(default)]
    pub notes: String,

    /// Opaque image references (URLs / handles), in display order
    #[serde(default)]
    pub images: Vec<String>,

    /// Profit/loss in pips-equivalent units
    #[serde(default)]
    pub pnl: Option<f64>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Trade {
    /// Materialize a new trade: fresh id, `created_at == updated_at == now`, pnl computed.
    pub fn create(new: NewTrade, now: DateTime<Utc>) -> Self {
        let mut trade = Self {
            id: Uuid::new_v4().to_string(),
            currency_pair: new.currency_pair,
            direction: new.direction,
            entry_price: new.entry_price,
            exit_price: new.exit_price,
            position_size: new.position_size,
            stop_loss: new.stop_loss,
            take_profit: new.take_profit,
            entry_date: new.entry_date,
            exit_date: new.exit_date,
            status: new.status,
            notes: new.notes,
            images: new.images,
            pnl: None,
            created_at: now,
            updated_at: now,
        };
        trade.refresh_pnl();
        trade
    }

    /// Recompute the derived pnl from the current price fields.
    pub fn refresh_pnl(&mut self) {
        self.pnl = pnl_service::calculate_pnl(
            self.direction,
            Some(self.entry_price),
            self.exit_price,
            Some(self.position_size),
        );
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status == TradeStatus::Closed
    }

    /// Closed and carrying a pnl, i.e. counted by the statistics.
    #[must_use]
    pub fn is_realized(&self) -> bool {
        self.is_closed() && self.pnl.is_some()
    }
}

/// Input for `TradeLedger::add`: a trade without id, timestamps or pnl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    pub currency_pair: String,
    pub direction: Direction,
    pub entry_price: f64,
    #[serde(default)]
    pub exit_price: Option<f64>,
    pub position_size: f64,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
    pub entry_date: NaiveDate,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub exit_date: Option<NaiveDate>,
    pub status: TradeStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewTrade {
    /// An open position with no exit, stops, notes or images.
    pub fn new(
        currency_pair: impl Into<String>,
        direction: Direction,
        entry_price: f64,
        position_size: f64,
        entry_date: NaiveDate,
    ) -> Self {
        Self {
            currency_pair: currency_pair.into(),
            direction,
            entry_price,
            exit_price: None,
            position_size,
            stop_loss: None,
            take_profit: None,
            entry_date,
            exit_date: None,
            status: TradeStatus::Open,
            notes: String::new(),
            images: Vec::new(),
        }
    }

    /// Set the exit price and date and mark the trade closed.
    pub fn closed_at(mut self, exit_price: f64, exit_date: NaiveDate) -> Self {
        self.exit_price = Some(exit_price);
        self.exit_date = Some(exit_date);
        self.status = TradeStatus::Closed;
        self
    }

    pub fn with_status(mut self, status: TradeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_exit_price(mut self, exit_price: f64) -> Self {
        self.exit_price = Some(exit_price);
        self
    }

    pub fn with_stops(mut self, stop_loss: Option<f64>, take_profit: Option<f64>) -> Self {
        self.stop_loss = stop_loss;
        self.take_profit = take_profit;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

/// Partial update for an existing trade.
///
/// `None` leaves a field untouched. Optional trade fields use a nested
/// option so they can be cleared: `Some(None)` removes the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeUpdate {
    pub currency_pair: Option<String>,
    pub direction: Option<Direction>,
    pub entry_price: Option<f64>,
    pub exit_price: Option<Option<f64>>,
    pub position_size: Option<f64>,
    pub stop_loss: Option<Option<f64>>,
    pub take_profit: Option<Option<f64>>,
    pub entry_date: Option<NaiveDate>,
    pub exit_date: Option<Option<NaiveDate>>,
    pub status: Option<TradeStatus>,
    pub notes: Option<String>,
    pub images: Option<Vec<String>>,
}

impl TradeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn currency_pair(mut self, pair: impl Into<String>) -> Self {
        self.currency_pair = Some(pair.into());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn entry_price(mut self, price: f64) -> Self {
        self.entry_price = Some(price);
        self
    }

    pub fn exit_price(mut self, price: Option<f64>) -> Self {
        self.exit_price = Some(price);
        self
    }

    pub fn position_size(mut self, size: f64) -> Self {
        self.position_size = Some(size);
        self
    }

    pub fn stop_loss(mut self, price: Option<f64>) -> Self {
        self.stop_loss = Some(price);
        self
    }

    pub fn take_profit(mut self, price: Option<f64>) -> Self {
        self.take_profit = Some(price);
        self
    }

    pub fn entry_date(mut self, date: NaiveDate) -> Self {
        self.entry_date = Some(date);
        self
    }

    pub fn exit_date(mut self, date: Option<NaiveDate>) -> Self {
        self.exit_date = Some(date);
        self
    }

    pub fn status(mut self, status: TradeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }

    /// Whether this update carries any of the fields pnl is derived from.
    #[must_use]
    pub fn touches_pnl_inputs(&self) -> bool {
        self.entry_price.is_some()
            || self.exit_price.is_some()
            || self.position_size.is_some()
            || self.direction.is_some()
    }

    /// Merge into `trade`, refresh `updated_at` and, when a pnl input was
    /// part of the update, recompute pnl. `id` and `created_at` are untouched.
    pub fn apply_to(self, trade: &mut Trade, now: DateTime<Utc>) {
        let recompute = self.touches_pnl_inputs();

        if let Some(v) = self.currency_pair {
            trade.currency_pair = v;
        }
        if let Some(v) = self.direction {
            trade.direction = v;
        }
        if let Some(v) = self.entry_price {
            trade.entry_price = v;
        }
        if let Some(v) = self.exit_price {
            trade.exit_price = v;
        }
        if let Some(v) = self.position_size {
            trade.position_size = v;
        }
        if let Some(v) = self.stop_loss {
            trade.stop_loss = v;
        }
        if let Some(v) = self.take_profit {
            trade.take_profit = v;
        }
        if let Some(v) = self.entry_date {
            trade.entry_date = v;
        }
        if let Some(v) = self.exit_date {
            trade.exit_date = v;
        }
        if let Some(v) = self.status {
            trade.status = v;
        }
        if let Some(v) = self.notes {
            trade.notes = v;
        }
        if let Some(v) = self.images {
            trade.images = v;
        }

        trade.updated_at = now;
        if recompute {
            trade.refresh_pnl();
        }
    }
}

/// Optional date that also accepts `""`: a date input that was filled in
/// and then cleared is stored as an empty string rather than omitted.
fn empty_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid date '{raw}': {e}"))),
        None => Ok(None),
    }
}
