use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::query::{SortDirection, SortField, TradeFilter, TradeQuery, TradeSort};
use crate::models::trade::Trade;

/// Filter / search / sort pipeline over a trade list.
///
/// Non-destructive: returns borrowed views, the input slice is never reordered.
pub struct QueryService;

impl QueryService {
    pub fn new() -> Self {
        Self
    }

    /// Trades matching every supplied filter field, newest `created_at` first.
    pub fn filter<'a>(&self, trades: &'a [Trade], filter: Option<&TradeFilter>) -> Vec<&'a Trade> {
        let mut result: Vec<&Trade> = trades
            .iter()
            .filter(|t| filter.map_or(true, |f| Self::matches_filter(t, f)))
            .collect();
        Self::sort(&mut result, TradeSort::default());
        result
    }

    /// Run a full dashboard query: filter, then search, then sort.
    pub fn run<'a>(&self, trades: &'a [Trade], query: &TradeQuery) -> Vec<&'a Trade> {
        let needle = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut result: Vec<&Trade> = trades
            .iter()
            .filter(|t| Self::matches_filter(t, &query.filter))
            .filter(|t| needle.as_deref().map_or(true, |n| Self::matches_search(t, n)))
            .collect();
        Self::sort(&mut result, query.sort);
        result
    }

    /// Distinct currency pairs, alphabetically.
    pub fn currency_pairs(&self, trades: &[Trade]) -> Vec<String> {
        let mut pairs: Vec<String> = trades.iter().map(|t| t.currency_pair.clone()).collect();
        pairs.sort();
        pairs.dedup();
        pairs
    }

    pub fn matches_filter(trade: &Trade, filter: &TradeFilter) -> bool {
        if let Some(status) = filter.status {
            if trade.status != status {
                return false;
            }
        }
        if let Some(pair) = &filter.currency_pair {
            if &trade.currency_pair != pair {
                return false;
            }
        }
        if let Some(from) = filter.date_from {
            if trade.entry_date < from {
                return false;
            }
        }
        if let Some(to) = filter.date_to {
            if trade.entry_date > to {
                return false;
            }
        }
        true
    }

    /// `needle` must already be lowercased.
    fn matches_search(trade: &Trade, needle: &str) -> bool {
        trade.currency_pair.to_lowercase().contains(needle)
            || trade.notes.to_lowercase().contains(needle)
    }

    /// Stable sort. Trades lacking the sort field go last in either direction.
    fn sort(trades: &mut [&Trade], sort: TradeSort) {
        trades.sort_by(|a, b| {
            match (SortKey::of(a, sort.field), SortKey::of(b, sort.field)) {
                (Some(ka), Some(kb)) => {
                    let ord = ka.compare(&kb);
                    match sort.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                }
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (None, None) => Ordering::Equal,
            }
        });
    }
}

impl Default for QueryService {
    fn default() -> Self {
        Self::new()
    }
}

/// Comparable projection of one trade field.
enum SortKey<'a> {
    Time(DateTime<Utc>),
    Date(NaiveDate),
    Text(&'a str),
    Owned(String),
    Number(f64),
}

impl<'a> SortKey<'a> {
    fn of(trade: &'a Trade, field: SortField) -> Option<Self> {
        match field {
            SortField::CreatedAt => Some(SortKey::Time(trade.created_at)),
            SortField::UpdatedAt => Some(SortKey::Time(trade.updated_at)),
            SortField::EntryDate => Some(SortKey::Date(trade.entry_date)),
            SortField::ExitDate => trade.exit_date.map(SortKey::Date),
            SortField::CurrencyPair => Some(SortKey::Text(&trade.currency_pair)),
            SortField::Direction => Some(SortKey::Owned(trade.direction.to_string())),
            SortField::Status => Some(SortKey::Owned(trade.status.to_string())),
            SortField::EntryPrice => Some(SortKey::Number(trade.entry_price)),
            SortField::ExitPrice => trade.exit_price.map(SortKey::Number),
            SortField::PositionSize => Some(SortKey::Number(trade.position_size)),
            SortField::Pnl => trade.pnl.map(SortKey::Number),
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            SortKey::Text(s) => Some(s),
            SortKey::Owned(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            _ => match (self.as_text(), other.as_text()) {
                (Some(a), Some(b)) => a.cmp(b),
                _ => Ordering::Equal,
            },
        }
    }
}
