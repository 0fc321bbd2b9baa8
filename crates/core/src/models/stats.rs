use serde::{Deserialize, Serialize};

/// Aggregate performance over closed trades that carry a pnl.
///
/// A derived snapshot: computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStats {
    /// Closed trades with a pnl
    pub total_trades: usize,

    /// Trades with pnl > 0
    pub winning_trades: usize,

    /// Trades with pnl < 0 (break-even trades count in neither bucket)
    pub losing_trades: usize,

    /// winning_trades / total_trades × 100, or 0 with no trades
    pub win_rate: f64,

    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,

    /// Mean pnl of winners, 0 with no winners
    pub average_win: f64,

    /// Mean absolute pnl of losers, 0 with no losers
    pub average_loss: f64,

    /// Gross wins / gross losses. `f64::INFINITY` when there are wins but
    /// no losses, 0 when both are zero. JSON has no infinity, so a
    /// non-finite value is written as the string `"Infinity"`.
    #[serde(with = "non_finite")]
    pub profit_factor: f64,

    pub largest_win: f64,

    /// Most negative pnl (kept signed), 0 with no losers
    pub largest_loss: f64,
}

impl Default for TradeStats {
    fn default() -> Self {
        Self {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: 0.0,
            total_pnl: 0.0,
            average_win: 0.0,
            average_loss: 0.0,
            profit_factor: 0.0,
            largest_win: 0.0,
            largest_loss: 0.0,
        }
    }
}

/// f64 that keeps infinities and NaN through JSON as `"Infinity"`,
/// `"-Infinity"` and `"NaN"`. Finite values stay plain numbers.
mod non_finite {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_str("-Infinity")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(D::Error::custom(format!("invalid number '{other}'"))),
            },
        }
    }
}

/// Realized pnl summed over one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPnl {
    /// `YYYY-MM`
    pub month: String,
    pub pnl: f64,
}

/// Realized performance of a single currency pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairPerformance {
    pub pair: String,
    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,
    pub trades: usize,
    pub wins: usize,
    pub win_rate: f64,
}
