//! Trade execution
//!
//! The trade cycle talks to execution only through [`Executor`]. Submission
//! retries live inside the executor; the cycle sees either a transaction id,
//! an absent id (the leg failed and is not logged), or a fault raised before
//! anything was sent.

pub mod pumpportal_api;

use async_trait::async_trait;

use crate::error::Result;
use crate::pump::BondingCurve;

pub use pumpportal_api::{PumpPortalExecutor, TradeAction};

/// Buy/sell execution and curve reads for one venue
#[async_trait]
pub trait Executor: Send + Sync {
    /// Current bonding-curve state for a token
    async fn curve_state(&self, mint: &str) -> Result<BondingCurve>;

    /// Spend `amount_sol` on `mint`. `Ok(None)` means the buy did not land.
    ///
    /// `Err` is reserved for checks that fail before anything is sent
    /// (bad mint, unquotable curve); submission failures are `Ok(None)`.
    async fn buy(
        &self,
        mint: &str,
        curve: &BondingCurve,
        amount_sol: f64,
        slippage: f64,
    ) -> Result<Option<String>>;

    /// Sell the whole position in `mint`. `Ok(None)` means the sell did not land.
    async fn sell(&self, mint: &str, curve: &BondingCurve, slippage: f64)
        -> Result<Option<String>>;
}
