use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::trade::TradeStatus;

/// Field filter for trade listings. Every supplied field must match
/// (AND semantics); `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeFilter {
    pub status: Option<TradeStatus>,
    /// Exact currency pair match
    pub currency_pair: Option<String>,
    /// Inclusive lower bound on entry date
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on entry date
    pub date_to: Option<NaiveDate>,
}

impl TradeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: TradeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn currency_pair(mut self, pair: impl Into<String>) -> Self {
        self.currency_pair = Some(pair.into());
        self
    }

    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }
}

/// Trade field a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    EntryDate,
    ExitDate,
    CurrencyPair,
    Direction,
    Status,
    EntryPrice,
    ExitPrice,
    PositionSize,
    Pnl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Flip direction, as a column header toggle does.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl TradeSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Select `field`: toggles direction if it is already the sort field,
    /// otherwise switches to it descending.
    #[must_use]
    pub fn select(self, field: SortField) -> Self {
        if field == self.field {
            Self::new(field, self.direction.toggled())
        } else {
            Self::new(field, SortDirection::Desc)
        }
    }
}

impl Default for TradeSort {
    /// Newest first.
    fn default() -> Self {
        Self::new(SortField::CreatedAt, SortDirection::Desc)
    }
}

/// Full dashboard query: field filter, free-text search, ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeQuery {
    #[serde(default)]
    pub filter: TradeFilter,
    /// Case-insensitive substring over currency pair and notes
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: TradeSort,
}

impl TradeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: TradeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn sort(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort = TradeSort::new(field, direction);
        self
    }
}
