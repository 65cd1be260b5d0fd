//! CLI command implementations

use anyhow::{Context, Result};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::{SessionDriver, TradeOptions, TradeSequencer};
use crate::stream::{PumpPortalTransport, Transport};
use crate::trade_log::{read_records, TradeLogSummary, TradeLogger};
use crate::trading::PumpPortalExecutor;
use crate::wallet::balance::fetch_balances;
use crate::wallet::{BalanceReport, Credentials};

/// Run the trader
pub async fn run(config: &Config, options: TradeOptions) -> Result<()> {
    info!(
        "Starting trader: mode={:?} marry={} matcher={}",
        options.mode,
        options.buy_only,
        if options.matcher.is_active() { "on" } else { "off" }
    );

    let credentials =
        Credentials::from_env(&config.wallet).context("Trade API key is not available")?;

    check_balances(config).await?;

    let executor = PumpPortalExecutor::new(config, credentials.api_key)?;
    let transport = PumpPortalTransport::new(config.endpoints.stream.clone());
    let sequencer = TradeSequencer::new(
        executor,
        config.filters.clone(),
        TradeLogger::new(&config.logging.trade_log),
        options,
        config.venue.lamports_per_sol,
    );

    let mut driver = SessionDriver::new(transport, sequencer, config.session.clone());
    let stats = driver.run().await?;

    info!(
        "Done: {} completed, {} rejected, {} faulted ({} buys, {} sells logged)",
        stats.cycles_completed, stats.rejected, stats.faulted, stats.buys_logged, stats.sells_logged
    );
    Ok(())
}

/// Enforce the configured wallet balance requirements, if a wallet is set
async fn check_balances(config: &Config) -> Result<()> {
    let Some(address) = &config.wallet.address else {
        warn!("wallet.address not set, skipping balance check");
        return Ok(());
    };

    let wallet = Pubkey::from_str(address)
        .with_context(|| format!("Invalid wallet address {}", address))?;
    let rpc = RpcClient::new_with_timeout(
        config.endpoints.rpc.clone(),
        Duration::from_millis(config.endpoints.timeout_ms),
    );

    let (sol, wsol) = fetch_balances(&rpc, &wallet, config.venue.lamports_per_sol)
        .await
        .context("Failed to fetch wallet balances")?;

    BalanceReport::evaluate(sol, wsol, &config.balance).enforce(&config.balance)?;
    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Summarise the trade log, optionally refreshing until interrupted
pub async fn stats(config: &Config, watch: bool) -> Result<()> {
    let path = Path::new(&config.logging.trade_log);

    if !watch {
        print_summary(path).await?;
        return Ok(());
    }

    let interval = Duration::from_secs(config.logging.analysis_interval_secs);
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        print_summary(path).await?;
    }
}

async fn print_summary(path: &Path) -> Result<()> {
    let records = read_records(path)
        .await
        .with_context(|| format!("Failed to read trade log {}", path.display()))?;

    println!("\n=== TRADES ({}) ===\n", path.display());
    if records.is_empty() {
        println!("No trades recorded.");
        return Ok(());
    }

    print!("{}", TradeLogSummary::from_records(&records));
    Ok(())
}

/// Check system health
pub async fn health(config: &Config) -> Result<()> {
    println!("\n=== SYSTEM HEALTH CHECK ===\n");

    let mut all_healthy = true;

    print!("RPC Endpoint... ");
    match check_rpc(config).await {
        Ok(latency) => println!("OK ({}ms)", latency),
        Err(e) => {
            println!("FAILED: {}", e);
            all_healthy = false;
        }
    }

    print!("PumpPortal WebSocket... ");
    match check_stream(config).await {
        Ok(latency) => println!("OK ({}ms)", latency),
        Err(e) => {
            println!("FAILED: {}", e);
            all_healthy = false;
        }
    }

    print!("PumpPortal Trading API key... ");
    match Credentials::from_env(&config.wallet) {
        Ok(_) => println!("OK (from ${})", config.wallet.api_key_env),
        Err(e) => {
            println!("MISSING: {}", e);
            all_healthy = false;
        }
    }

    println!();
    if all_healthy {
        println!("All systems healthy!");
    } else {
        println!("Some systems are unhealthy. Check the errors above.");
    }

    Ok(())
}

async fn check_rpc(config: &Config) -> Result<u64> {
    let client = RpcClient::new_with_timeout(
        config.endpoints.rpc.clone(),
        Duration::from_millis(config.endpoints.timeout_ms),
    );

    let start = Instant::now();
    client.get_slot().await?;
    Ok(start.elapsed().as_millis() as u64)
}

async fn check_stream(config: &Config) -> Result<u64> {
    let transport = PumpPortalTransport::new(config.endpoints.stream.clone());
    let timeout = Duration::from_secs(5);

    let start = Instant::now();
    let mut connection = tokio::time::timeout(timeout, transport.connect())
        .await
        .map_err(|_| anyhow::anyhow!("Connection timed out after {}s", timeout.as_secs()))??;
    let latency = start.elapsed().as_millis() as u64;

    connection.close().await?;
    Ok(latency)
}
