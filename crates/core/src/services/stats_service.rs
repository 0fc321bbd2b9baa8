use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::models::stats::{MonthlyPnl, PairPerformance, TradeStats};
use crate::models::trade::Trade;

/// Computes aggregate statistics over a trade list.
///
/// Only realized trades count: status closed AND pnl present. Open trades
/// and closed trades without an exit price contribute nothing.
pub struct StatsService;

impl StatsService {
    pub fn new() -> Self {
        Self
    }

    /// Win/loss counts, win rate, totals, averages, profit factor and extremes.
    pub fn compute(&self, trades: &[Trade]) -> TradeStats {
        let pnls: Vec<f64> = realized_pnls(trades).collect();
        if pnls.is_empty() {
            return TradeStats::default();
        }

        let wins: Vec<f64> = pnls.iter().copied().filter(|p| *p > 0.0).collect();
        let losses: Vec<f64> = pnls.iter().copied().filter(|p| *p < 0.0).collect();

        let total_pnl: f64 = pnls.iter().sum();
        let total_wins: f64 = wins.iter().sum();
        let total_losses: f64 = losses.iter().sum::<f64>().abs();

        let average_win = if wins.is_empty() {
            0.0
        } else {
            total_wins / wins.len() as f64
        };
        let average_loss = if losses.is_empty() {
            0.0
        } else {
            total_losses / losses.len() as f64
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let largest_win = wins.iter().copied().fold(None, |acc: Option<f64>, p| {
            Some(acc.map_or(p, |a| a.max(p)))
        });
        let largest_loss = losses.iter().copied().fold(None, |acc: Option<f64>, p| {
            Some(acc.map_or(p, |a| a.min(p)))
        });

        TradeStats {
            total_trades: pnls.len(),
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            win_rate: wins.len() as f64 / pnls.len() as f64 * 100.0,
            total_pnl,
            average_win,
            average_loss,
            profit_factor,
            largest_win: largest_win.unwrap_or(0.0),
            largest_loss: largest_loss.unwrap_or(0.0),
        }
    }

    /// Realized pnl per calendar month (exit date, else entry date), oldest month first.
    pub fn monthly_pnl(&self, trades: &[Trade]) -> Vec<MonthlyPnl> {
        let mut months: BTreeMap<String, f64> = BTreeMap::new();

        for trade in trades.iter().filter(|t| t.is_realized()) {
            let date = trade.exit_date.unwrap_or(trade.entry_date);
            let key = date.format("%Y-%m").to_string();
            *months.entry(key).or_insert(0.0) += trade.pnl.unwrap_or(0.0);
        }

        months
            .into_iter()
            .map(|(month, pnl)| MonthlyPnl { month, pnl })
            .collect()
    }

    /// Realized performance per currency pair, best total pnl first.
    pub fn pair_performance(&self, trades: &[Trade]) -> Vec<PairPerformance> {
        let mut pairs: HashMap<&str, (f64, usize, usize)> = HashMap::new();

        for trade in trades.iter().filter(|t| t.is_realized()) {
            let pnl = trade.pnl.unwrap_or(0.0);
            let entry = pairs.entry(trade.currency_pair.as_str()).or_insert((0.0, 0, 0));
            entry.0 += pnl;
            entry.1 += 1;
            if pnl > 0.0 {
                entry.2 += 1;
            }
        }

        let mut result: Vec<PairPerformance> = pairs
            .into_iter()
            .map(|(pair, (total_pnl, count, wins))| PairPerformance {
                pair: pair.to_string(),
                total_pnl,
                trades: count,
                wins,
                win_rate: if count > 0 {
                    wins as f64 / count as f64 * 100.0
                } else {
                    0.0
                },
            })
            .collect();

        // Ties broken by pair name so the order is deterministic
        result.sort_by(|a, b| {
            b.total_pnl
                .partial_cmp(&a.total_pnl)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.pair.cmp(&b.pair))
        });
        result
    }
}

impl Default for StatsService {
    fn default() -> Self {
        Self::new()
    }
}

fn realized_pnls(trades: &[Trade]) -> impl Iterator<Item = f64> + '_ {
    trades
        .iter()
        .filter(|t| t.is_closed())
        .filter_map(|t| t.pnl)
}
