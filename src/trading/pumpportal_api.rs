//! PumpPortal Lightning trade API executor
//!
//! PumpPortal signs and submits trades for the wallet bound to the API key.
//! Curve state is read directly from the bonding-curve account over RPC.
//!
//! API Documentation: https://pumpportal.fun/trading-api/

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::Executor;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pump::price::{
    calculate_buy_impact, calculate_min_tokens_with_slippage, slippage_to_pct, sol_to_lamports,
};
use crate::pump::{derive_bonding_curve, BondingCurve};
use crate::wallet::Secret;

/// Sell amount meaning "the whole position"
const SELL_ALL: &str = "100%";

/// Trade action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "buy"),
            TradeAction::Sell => write!(f, "sell"),
        }
    }
}

/// Trade request for the Lightning API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub action: TradeAction,
    /// Token mint address
    pub mint: String,
    /// SOL for buys, a percentage of the position for sells
    pub amount: String,
    /// "true" if amount is in SOL
    pub denominated_in_sol: String,
    /// Slippage percentage (e.g., 40 for 40%)
    pub slippage: u32,
    /// Priority fee in SOL
    pub priority_fee: f64,
    pub pool: String,
}

impl TradeRequest {
    fn buy(mint: &str, amount_sol: f64, slippage: f64, priority_fee: f64) -> Self {
        Self {
            action: TradeAction::Buy,
            mint: mint.to_string(),
            amount: amount_sol.to_string(),
            denominated_in_sol: "true".to_string(),
            slippage: slippage_to_pct(slippage),
            priority_fee,
            pool: "pump".to_string(),
        }
    }

    fn sell_all(mint: &str, slippage: f64, priority_fee: f64) -> Self {
        Self {
            action: TradeAction::Sell,
            mint: mint.to_string(),
            amount: SELL_ALL.to_string(),
            denominated_in_sol: "false".to_string(),
            slippage: slippage_to_pct(slippage),
            priority_fee,
            pool: "pump".to_string(),
        }
    }
}

/// Trade response from the Lightning API
#[derive(Debug, Clone, Deserialize)]
pub struct TradeResponse {
    /// Transaction signature (if successful)
    pub signature: Option<String>,
    pub error: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl TradeResponse {
    /// Signature, or the error the API reported
    pub fn into_signature(self) -> Result<String> {
        if let Some(error) = self.error {
            return Err(Error::TransactionSend(error));
        }

        if let Some(errors) = self.errors {
            if !errors.is_empty() {
                return Err(Error::TransactionSend(errors.join(", ")));
            }
        }

        self.signature
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::TransactionSend("No signature in response".to_string()))
    }
}

/// Executor backed by the PumpPortal Lightning API and a Solana RPC node
pub struct PumpPortalExecutor {
    client: Client,
    rpc: RpcClient,
    trade_api: String,
    api_key: Secret,
    program_id: Pubkey,
    lamports_per_sol: u64,
    priority_fee: f64,
    max_retries: u32,
}

impl PumpPortalExecutor {
    pub fn new(config: &Config, api_key: Secret) -> Result<Self> {
        let timeout = Duration::from_millis(config.endpoints.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let rpc = RpcClient::new_with_timeout_and_commitment(
            config.endpoints.rpc.clone(),
            timeout,
            CommitmentConfig::confirmed(),
        );

        Ok(Self {
            client,
            rpc,
            trade_api: config.endpoints.trade_api.clone(),
            api_key,
            program_id: config.venue.program_id()?,
            lamports_per_sol: config.venue.lamports_per_sol,
            priority_fee: config.tips.priority_fee_sol(),
            max_retries: config.trading.max_retries,
        })
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(200),
            max_interval: Duration::from_millis(800),
            max_elapsed_time: Some(Duration::from_secs(10)),
            ..Default::default()
        }
    }

    /// Single submission attempt
    async fn send_trade_internal(&self, request: &TradeRequest) -> Result<String> {
        // The key travels in the query string; strip URLs from errors so it
        // never reaches the log.
        let response = self
            .client
            .post(&self.trade_api)
            .query(&[("api-key", self.api_key.expose())])
            .json(request)
            .send()
            .await
            .map_err(|e| Error::TransactionSend(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        let trade_response: TradeResponse = response.json().await.map_err(|e| {
            Error::Deserialization(format!(
                "Failed to parse response (HTTP {}): {}",
                status,
                e.without_url()
            ))
        })?;

        trade_response.into_signature()
    }

    /// Submit with bounded retries. Exhausted retries yield `None`.
    async fn send_trade(&self, request: &TradeRequest) -> Option<String> {
        let attempts = AtomicU32::new(0);
        let max_retries = self.max_retries;

        let result = retry(self.backoff(), || async {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            match self.send_trade_internal(request).await {
                Ok(signature) => Ok(signature),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    warn!(
                        "{} attempt {}/{} failed for {}: {}",
                        request.action, attempt, max_retries, request.mint, e
                    );
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await;

        match result {
            Ok(signature) => Some(signature),
            Err(e) => {
                warn!(
                    "{} for {} failed after {} attempt(s): {}",
                    request.action,
                    request.mint,
                    attempts.load(Ordering::Relaxed),
                    e
                );
                None
            }
        }
    }

    async fn fetch_curve(&self, mint: &Pubkey) -> Result<BondingCurve> {
        let (curve_address, _) = derive_bonding_curve(mint, &self.program_id);
        let account = self
            .rpc
            .get_account_with_commitment(&curve_address, self.rpc.commitment())
            .await?
            .value
            .ok_or_else(|| Error::BondingCurveNotFound(mint.to_string()))?;

        BondingCurve::try_from_account_data(&account.data)
    }
}

fn parse_mint(mint: &str) -> Result<Pubkey> {
    Pubkey::from_str(mint)
        .map_err(|e| Error::StreamDecode(format!("Invalid mint '{}': {}", mint, e)))
}

#[async_trait]
impl Executor for PumpPortalExecutor {
    async fn curve_state(&self, mint: &str) -> Result<BondingCurve> {
        let mint = parse_mint(mint)?;
        let attempts = AtomicU32::new(0);
        let max_retries = self.max_retries;

        // A fresh curve account can lag the creation event on the RPC node
        retry(self.backoff(), || async {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            match self.fetch_curve(&mint).await {
                Ok(curve) => Ok(curve),
                Err(e @ (Error::Rpc(_) | Error::BondingCurveNotFound(_)))
                    if attempt < max_retries =>
                {
                    debug!("Curve read {}/{} for {}: {}", attempt, max_retries, mint, e);
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await
    }

    async fn buy(
        &self,
        mint: &str,
        curve: &BondingCurve,
        amount_sol: f64,
        slippage: f64,
    ) -> Result<Option<String>> {
        parse_mint(mint)?;

        let lamports = sol_to_lamports(amount_sol, self.lamports_per_sol);
        let (expected_tokens, impact) = calculate_buy_impact(curve, lamports)?;
        debug!(
            "Buy quote for {}: ~{} tokens (min {}), impact {:.2}%",
            mint,
            expected_tokens,
            calculate_min_tokens_with_slippage(expected_tokens, slippage),
            impact
        );

        let request = TradeRequest::buy(mint, amount_sol, slippage, self.priority_fee);
        info!(
            "Executing buy: {} SOL for token {} (slippage {}%)",
            amount_sol, mint, request.slippage
        );

        Ok(self.send_trade(&request).await)
    }

    async fn sell(
        &self,
        mint: &str,
        curve: &BondingCurve,
        slippage: f64,
    ) -> Result<Option<String>> {
        parse_mint(mint)?;

        if curve.complete {
            // Migrated pools still route through PumpPortal; note it for the operator
            info!("Bonding curve for {} is complete", mint);
        }

        let request = TradeRequest::sell_all(mint, slippage, self.priority_fee);
        info!(
            "Executing sell: {} of token {} (slippage {}%)",
            SELL_ALL, mint, request.slippage
        );

        Ok(self.send_trade(&request).await)
    }
}
