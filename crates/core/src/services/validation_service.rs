use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::trade::{NewTrade, Trade};

/// Optional input checks for trades coming from forms or imports.
///
/// The ledger itself accepts anything; callers opt in through
/// `TradeLedger::add_validated` / `update_validated`.
pub struct ValidationService;

/// The fields that are checked, borrowed from either a `NewTrade` or a `Trade`.
struct Fields<'a> {
    currency_pair: &'a str,
    entry_price: f64,
    exit_price: Option<f64>,
    position_size: f64,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
    entry_date: NaiveDate,
    exit_date: Option<NaiveDate>,
}

impl ValidationService {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_new_trade(&self, trade: &NewTrade) -> Result<(), CoreError> {
        Self::check(&Fields {
            currency_pair: &trade.currency_pair,
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            position_size: trade.position_size,
            stop_loss: trade.stop_loss,
            take_profit: trade.take_profit,
            entry_date: trade.entry_date,
            exit_date: trade.exit_date,
        })
    }

    pub fn validate_trade(&self, trade: &Trade) -> Result<(), CoreError> {
        Self::check(&Fields {
            currency_pair: &trade.currency_pair,
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            position_size: trade.position_size,
            stop_loss: trade.stop_loss,
            take_profit: trade.take_profit,
            entry_date: trade.entry_date,
            exit_date: trade.exit_date,
        })
    }

    /// Rules:
    /// - Currency pair must be non-empty
    /// - Entry price and position size must be finite and positive
    /// - Exit price, stop loss and take profit, when set, must be finite and positive
    /// - Exit date can't precede entry date
    fn check(fields: &Fields<'_>) -> Result<(), CoreError> {
        if fields.currency_pair.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Currency pair is required".into(),
            ));
        }

        Self::positive("Entry price", fields.entry_price)?;
        Self::positive("Position size", fields.position_size)?;

        for (name, value) in [
            ("Exit price", fields.exit_price),
            ("Stop loss", fields.stop_loss),
            ("Take profit", fields.take_profit),
        ] {
            if let Some(v) = value {
                Self::positive(name, v)?;
            }
        }

        if let Some(exit_date) = fields.exit_date {
            if exit_date < fields.entry_date {
                return Err(CoreError::ValidationError(format!(
                    "Exit date {exit_date} is before entry date {}",
                    fields.entry_date
                )));
            }
        }

        Ok(())
    }

    fn positive(name: &str, value: f64) -> Result<(), CoreError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "{name} must be a positive number, got {value}"
            )));
        }
        Ok(())
    }
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::new()
    }
}
