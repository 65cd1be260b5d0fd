//! Trade cycle state machine
//!
//! ```text
//! Idle -> AwaitingEvent -> Filtering -> Buying -> Holding -> Selling -> AwaitingEvent
//!                              |            |                              |
//!                              +- reject -> AwaitingEvent     single-shot: Terminated
//!                                           |
//!                                           +- buy-only -> AwaitingEvent | Terminated
//! ```
//!
//! Cycles run strictly one after another on a borrowed connection. Faults
//! inside a cycle are reported and contained; only transport faults end the
//! session.

use tracing::{debug, error, info, warn};

use super::{RunMode, TradeOptions};
use crate::config::FilterConfig;
use crate::error::Result;
use crate::filter::{evaluate, FilterReason, FilterResult};
use crate::pump::price::format_price;
use crate::pump::BondingCurve;
use crate::strategy::{select, StrategyParams};
use crate::stream::{Connection, CreationEvent};
use crate::trade_log::TradeLogger;
use crate::trading::{Executor, TradeAction};

/// Trade cycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    AwaitingEvent,
    Filtering,
    Buying,
    Holding,
    Selling,
    Terminated,
}

/// Why a session handed control back to the driver
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    /// Single-shot run finished its cycle
    Terminated,
    /// The connection closed or failed
    Disconnected(String),
}

/// Per-run counters, kept across reconnects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequencerStats {
    /// Admitted cycles that ran to the end
    pub cycles_completed: u64,
    pub rejected: u64,
    pub faulted: u64,
    pub buys_logged: u64,
    pub sells_logged: u64,
}

/// How an admitted or rejected event ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    Rejected,
    Completed,
    /// `submitted` is true once the executor has accepted a buy for sending
    Faulted { submitted: bool },
}

pub struct TradeSequencer<E: Executor> {
    executor: E,
    filters: FilterConfig,
    logger: TradeLogger,
    options: TradeOptions,
    lamports_per_sol: u64,
    state: CycleState,
    stats: SequencerStats,
}

impl<E: Executor> TradeSequencer<E> {
    pub fn new(
        executor: E,
        filters: FilterConfig,
        logger: TradeLogger,
        options: TradeOptions,
        lamports_per_sol: u64,
    ) -> Self {
        Self {
            executor,
            filters,
            logger,
            options,
            lamports_per_sol,
            state: CycleState::Idle,
            stats: SequencerStats::default(),
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn stats(&self) -> SequencerStats {
        self.stats
    }

    pub fn options(&self) -> &TradeOptions {
        &self.options
    }

    /// Back to `Idle` for a fresh connection
    pub fn reset(&mut self) {
        self.transition(CycleState::Idle);
    }

    fn transition(&mut self, next: CycleState) {
        if self.state != next {
            debug!("Cycle state: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    /// Run cycles on `connection` until the session ends
    pub async fn run_session(&mut self, connection: &mut dyn Connection) -> SessionEnd {
        loop {
            self.transition(CycleState::AwaitingEvent);
            info!("Waiting for a new token creation...");

            let event = match connection.next_event().await {
                Ok(Some(event)) => event,
                Ok(None) => return SessionEnd::Disconnected("stream closed".to_string()),
                Err(e) if e.is_transport() => return SessionEnd::Disconnected(e.to_string()),
                Err(e) => {
                    // Nothing was admitted; treat like a rejection
                    error!("Failed to read creation event: {}", e);
                    self.stats.faulted += 1;
                    continue;
                }
            };

            info!(
                "New token created: {} ({}) mint={} pool={:?} SOL",
                event.name, event.symbol, event.mint, event.pool_size
            );

            match self.run_cycle(&event).await {
                CycleOutcome::Rejected => {
                    self.stats.rejected += 1;
                    continue;
                }
                CycleOutcome::Completed => self.stats.cycles_completed += 1,
                CycleOutcome::Faulted { submitted } => {
                    self.stats.faulted += 1;
                    if !submitted {
                        continue;
                    }
                }
            }

            if self.options.mode == RunMode::Once {
                self.transition(CycleState::Terminated);
                return SessionEnd::Terminated;
            }
        }
    }

    async fn run_cycle(&mut self, event: &CreationEvent) -> CycleOutcome {
        let mut submitted = false;
        match self.drive_cycle(event, &mut submitted).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Trade cycle for {} failed: {}", event.mint, e);
                CycleOutcome::Faulted { submitted }
            }
        }
    }

    async fn drive_cycle(
        &mut self,
        event: &CreationEvent,
        submitted: &mut bool,
    ) -> Result<CycleOutcome> {
        self.transition(CycleState::Filtering);
        if let Some(reason) = self.admission(event) {
            info!("Skipping {}: {}", event.mint, reason);
            return Ok(CycleOutcome::Rejected);
        }

        let (strategy, params) = select(event.pool_size_or_zero());
        info!(
            "Selected strategy {} for {}: buy {} SOL, hold {}s, TP {:.0}% / SL {:.0}%",
            strategy,
            event.mint,
            params.buy_amount_sol,
            params.hold.as_secs(),
            params.take_profit * 100.0,
            params.stop_loss * 100.0
        );

        self.transition(CycleState::Buying);
        let curve = self.executor.curve_state(&event.mint).await?;
        let buy_price = curve.price_in_sol(self.lamports_per_sol)?;
        self.buy_leg(event, &curve, &params, buy_price, submitted)
            .await?;

        if self.options.buy_only {
            info!("Marry mode enabled, keeping {}", event.mint);
            return Ok(CycleOutcome::Completed);
        }

        self.transition(CycleState::Holding);
        info!(
            "Holding {} for {} seconds before selling",
            event.mint,
            params.hold.as_secs()
        );
        tokio::time::sleep(params.hold).await;

        self.transition(CycleState::Selling);
        let curve = match self.executor.curve_state(&event.mint).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!("Curve refresh for {} failed, using buy-time state: {}", event.mint, e);
                curve
            }
        };
        let sell_price = curve.price_in_sol(self.lamports_per_sol).unwrap_or(buy_price);
        self.sell_leg(event, &curve, &params, sell_price).await?;

        Ok(CycleOutcome::Completed)
    }

    /// First reason the event may not be traded, if any
    fn admission(&self, event: &CreationEvent) -> Option<FilterReason> {
        if let FilterResult::Filtered(reason) = evaluate(event, &self.filters) {
            return Some(reason);
        }
        self.options
            .matcher
            .mismatch(event)
            .map(FilterReason::NotMatched)
    }

    async fn buy_leg(
        &mut self,
        event: &CreationEvent,
        curve: &BondingCurve,
        params: &StrategyParams,
        price: f64,
        submitted: &mut bool,
    ) -> Result<()> {
        info!(
            "Buying {:.6} SOL of {} at {} SOL with {:.1}% slippage",
            params.buy_amount_sol,
            event.mint,
            format_price(price),
            params.buy_slippage * 100.0
        );

        // An error here means nothing reached the venue
        let signature = self
            .executor
            .buy(&event.mint, curve, params.buy_amount_sol, params.buy_slippage)
            .await?;
        *submitted = true;

        match signature {
            Some(signature) => {
                info!("Buy transaction successful: {}", signature);
                self.logger
                    .append(TradeAction::Buy, &event.mint, price, Some(&signature))
                    .await;
                self.stats.buys_logged += 1;
            }
            None => warn!("Buy transaction for {} failed", event.mint),
        }
        Ok(())
    }

    async fn sell_leg(
        &mut self,
        event: &CreationEvent,
        curve: &BondingCurve,
        params: &StrategyParams,
        price: f64,
    ) -> Result<()> {
        info!(
            "Selling {} at {} SOL with {:.1}% slippage",
            event.mint,
            format_price(price),
            params.sell_slippage * 100.0
        );

        let signature = self
            .executor
            .sell(&event.mint, curve, params.sell_slippage)
            .await?;

        match signature {
            Some(signature) => {
                info!("Sell transaction successful: {}", signature);
                self.logger
                    .append(TradeAction::Sell, &event.mint, price, Some(&signature))
                    .await;
                self.stats.sells_logged += 1;
            }
            None => warn!("Sell transaction for {} failed or nothing to sell", event.mint),
        }
        Ok(())
    }
}
