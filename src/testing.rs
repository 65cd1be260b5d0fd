//! Recording mocks of the transport and executor traits for engine tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::pump::BondingCurve;
use crate::stream::{Connection, CreationEvent, KeepAlive, Transport};
use crate::trading::Executor;

/// A valid base58 mint for executor calls
pub const TEST_MINT: &str = "DYw8jCTfwHNRJhhmFcbXvVDTqWMEVFBX6ZKUmG5CNSKK";

/// Creation event that passes the default filter except for pool size
pub fn creation_event(mint: &str, pool_size: f64) -> CreationEvent {
    CreationEvent::new(mint, "Test Token", "TEST", "creator111")
        .with_pool_size(pool_size)
        .with_dev_hold(0.05)
        .with_freezable(false)
        .with_lp_burned(false)
        .with_lp_bundle(false)
}

pub fn test_curve() -> BondingCurve {
    BondingCurve::new_for_test(
        30_000_000_000,
        1_073_000_000_000_000,
        0,
        793_100_000_000_000,
        1_000_000_000_000_000,
        false,
    )
}

/// What a scripted connection yields
#[derive(Debug, Clone)]
pub enum ScriptItem {
    Event(CreationEvent),
    /// Non-transport fault from `next_event`
    Fault(String),
}

/// What happens once a connection's script runs out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AfterScript {
    Close,
    Pend,
}

#[derive(Debug, Clone)]
pub struct SessionScript {
    pub items: Vec<ScriptItem>,
    pub after: AfterScript,
}

impl SessionScript {
    pub fn events(events: Vec<CreationEvent>, after: AfterScript) -> Self {
        Self {
            items: events.into_iter().map(ScriptItem::Event).collect(),
            after,
        }
    }
}

#[derive(Debug, Default)]
struct TransportState {
    scripts: VecDeque<SessionScript>,
    connect_times: Vec<Instant>,
    closes: usize,
}

/// Transport that hands out one scripted connection per `connect`.
/// Fails to connect once the scripts are used up.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<TransportState>>,
    pings: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new(scripts: Vec<SessionScript>) -> Self {
        let transport = Self::default();
        transport.state.lock().unwrap().scripts = scripts.into();
        transport
    }

    pub fn connect_times(&self) -> Vec<Instant> {
        self.state.lock().unwrap().connect_times.clone()
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self) -> Result<Box<dyn Connection>> {
        let mut state = self.state.lock().unwrap();
        state.connect_times.push(Instant::now());
        let script = state
            .scripts
            .pop_front()
            .ok_or_else(|| Error::StreamConnection("connection refused".to_string()))?;

        Ok(Box::new(MockConnection {
            items: script.items.into(),
            after: script.after,
            transport: self.state.clone(),
            pinger: Arc::new(MockPinger::new(self.pings.clone(), None)),
        }))
    }
}

pub struct MockConnection {
    items: VecDeque<ScriptItem>,
    after: AfterScript,
    transport: Arc<Mutex<TransportState>>,
    pinger: Arc<MockPinger>,
}

#[async_trait]
impl Connection for MockConnection {
    async fn next_event(&mut self) -> Result<Option<CreationEvent>> {
        match self.items.pop_front() {
            Some(ScriptItem::Event(event)) => Ok(Some(event)),
            Some(ScriptItem::Fault(msg)) => Err(Error::StreamDecode(msg)),
            None => match self.after {
                AfterScript::Close => Ok(None),
                AfterScript::Pend => std::future::pending().await,
            },
        }
    }

    fn keepalive(&self) -> Arc<dyn KeepAlive> {
        self.pinger.clone()
    }

    async fn close(&mut self) -> Result<()> {
        self.transport.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Counts pings; fails every ping after `succeed` successful ones
#[derive(Debug)]
pub struct MockPinger {
    attempts: Arc<AtomicUsize>,
    succeed: Option<usize>,
}

impl MockPinger {
    pub fn new(attempts: Arc<AtomicUsize>, succeed: Option<usize>) -> Self {
        Self { attempts, succeed }
    }
}

#[async_trait]
impl KeepAlive for MockPinger {
    async fn ping(&self) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        match self.succeed {
            Some(limit) if attempt > limit => Err(Error::StreamClosed("ping failed".into())),
            _ => Ok(()),
        }
    }
}

/// One recorded executor call
#[derive(Debug, Clone, PartialEq)]
pub enum ExecCall {
    CurveState { mint: String },
    Buy { mint: String, amount_sol: f64, slippage: f64 },
    Sell { mint: String, slippage: f64 },
}

/// Executor that records calls with their (virtual) time
#[derive(Debug, Clone)]
pub struct MockExecutor {
    calls: Arc<Mutex<Vec<(Instant, ExecCall)>>>,
    buy_signature: Option<String>,
    sell_signature: Option<String>,
    /// Curve reads that succeed before every later read fails
    curve_reads_ok: Option<usize>,
    /// Mint the executor refuses to quote, failing before anything is sent
    unquotable_mint: Option<String>,
    fail_sell: bool,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self {
            calls: Arc::default(),
            buy_signature: Some("buy-sig".to_string()),
            sell_signature: Some("sell-sig".to_string()),
            curve_reads_ok: None,
            unquotable_mint: None,
            fail_sell: false,
        }
    }
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buy_signature(mut self, signature: Option<&str>) -> Self {
        self.buy_signature = signature.map(str::to_string);
        self
    }

    pub fn with_sell_signature(mut self, signature: Option<&str>) -> Self {
        self.sell_signature = signature.map(str::to_string);
        self
    }

    pub fn with_failing_curve(mut self) -> Self {
        self.curve_reads_ok = Some(0);
        self
    }

    pub fn with_curve_failing_after(mut self, reads: usize) -> Self {
        self.curve_reads_ok = Some(reads);
        self
    }

    pub fn with_unquotable_mint(mut self, mint: &str) -> Self {
        self.unquotable_mint = Some(mint.to_string());
        self
    }

    pub fn with_failing_sell(mut self) -> Self {
        self.fail_sell = true;
        self
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, ExecCall)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn buys(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ExecCall::Buy { .. }))
            .count()
    }

    pub fn sells(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ExecCall::Sell { .. }))
            .count()
    }

    fn curve_reads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ExecCall::CurveState { .. }))
            .count()
    }

    fn record(&self, call: ExecCall) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }
}

#[async_trait]
impl Executor for MockExecutor {
    async fn curve_state(&self, mint: &str) -> Result<BondingCurve> {
        let earlier = self.curve_reads();
        self.record(ExecCall::CurveState {
            mint: mint.to_string(),
        });
        if self.curve_reads_ok.is_some_and(|ok| earlier >= ok) {
            return Err(Error::BondingCurveNotFound(mint.to_string()));
        }
        Ok(test_curve())
    }

    async fn buy(
        &self,
        mint: &str,
        _curve: &BondingCurve,
        amount_sol: f64,
        slippage: f64,
    ) -> Result<Option<String>> {
        self.record(ExecCall::Buy {
            mint: mint.to_string(),
            amount_sol,
            slippage,
        });
        if self.unquotable_mint.as_deref() == Some(mint) {
            return Err(Error::PriceOverflow);
        }
        Ok(self.buy_signature.clone())
    }

    async fn sell(
        &self,
        mint: &str,
        _curve: &BondingCurve,
        slippage: f64,
    ) -> Result<Option<String>> {
        self.record(ExecCall::Sell {
            mint: mint.to_string(),
            slippage,
        });
        if self.fail_sell {
            return Err(Error::TransactionSend("sell rejected".to_string()));
        }
        Ok(self.sell_signature.clone())
    }
}
