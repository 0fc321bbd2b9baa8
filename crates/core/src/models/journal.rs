use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::trade::Trade;

/// Current version of the persisted journal layout.
pub const JOURNAL_VERSION: u16 = 1;

/// Everything that gets written to the storage slot: the full trade list
/// plus a schema version so the layout can evolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    pub version: u16,
    pub trades: Vec<Trade>,
}

impl Journal {
    pub fn new(trades: Vec<Trade>) -> Self {
        Self {
            version: JOURNAL_VERSION,
            trades,
        }
    }

    /// Unwrap into the trade list, rejecting versions this build can't read.
    pub fn into_trades(self) -> Result<Vec<Trade>, CoreError> {
        if self.version == 0 || self.version > JOURNAL_VERSION {
            return Err(CoreError::UnsupportedVersion(self.version));
        }
        Ok(self.trades)
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Accepted slot contents: the versioned envelope, or the bare trade
/// array written by journals that predate versioning.
pub(crate) enum StoredJournal {
    Versioned(Journal),
    Legacy(Vec<Trade>),
}

/// Borrowing twin of [`Journal`] so saving doesn't clone the trade list.
#[derive(Serialize)]
pub(crate) struct JournalRef<'a> {
    pub version: u16,
    pub trades: &'a [Trade],
}

impl<'a> JournalRef<'a> {
    pub fn new(trades: &'a [Trade]) -> Self {
        Self {
            version: JOURNAL_VERSION,
            trades,
        }
    }
}

impl StoredJournal {
    /// Parse slot JSON. The layout is chosen from the top-level value, so a
    /// bad field is reported as itself rather than as a layout mismatch.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        if value.is_array() {
            serde_json::from_value(value).map(StoredJournal::Legacy)
        } else {
            serde_json::from_value(value).map(StoredJournal::Versioned)
        }
    }

    pub fn into_trades(self) -> Result<Vec<Trade>, CoreError> {
        match self {
            StoredJournal::Versioned(journal) => journal.into_trades(),
            StoredJournal::Legacy(trades) => Ok(trades),
        }
    }
}
