//! Pool-size strategy selection
//!
//! A fixed two-band table. Selection is pure and total: every `f64` input,
//! including negative, zero and NaN, maps to exactly one band.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pool size (SOL) separating the two bands
pub const SMALL_POOL_THRESHOLD_SOL: f64 = 100.0;

/// Trading strategy bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Pools under 100 SOL
    SmallPool,
    /// Pools of 100 SOL and more
    LargePool,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::SmallPool => "small_pool",
            Strategy::LargePool => "large_pool",
        }
    }

    /// Parameter bundle for this band
    pub fn params(&self) -> StrategyParams {
        match self {
            Strategy::SmallPool => StrategyParams {
                buy_amount_sol: 0.2,
                buy_slippage: 0.40,
                sell_slippage: 0.40,
                take_profit: 0.10,
                stop_loss: 0.08,
                hold: Duration::from_secs(60),
                price_check_interval: Duration::from_millis(500),
            },
            Strategy::LargePool => StrategyParams {
                buy_amount_sol: 0.5,
                buy_slippage: 0.40,
                sell_slippage: 0.40,
                take_profit: 0.17,
                stop_loss: 0.10,
                hold: Duration::from_secs(150),
                price_check_interval: Duration::from_millis(500),
            },
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-cycle trade parameters
///
/// `take_profit`, `stop_loss` and `price_check_interval` are carried for
/// reporting; the cycle exits on the enforced hold only.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub buy_amount_sol: f64,
    /// Slippage tolerance as a fraction (0.4 = 40%)
    pub buy_slippage: f64,
    pub sell_slippage: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    /// Enforced wait between buy and sell
    pub hold: Duration,
    pub price_check_interval: Duration,
}

/// Select the strategy band for a pool size in SOL
pub fn select(pool_size: f64) -> (Strategy, StrategyParams) {
    // NaN compares false and falls through to the large band
    let strategy = if pool_size < SMALL_POOL_THRESHOLD_SOL {
        Strategy::SmallPool
    } else {
        Strategy::LargePool
    };
    (strategy, strategy.params())
}
