//! Startup wallet balance requirements

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use crate::config::BalanceRequirements;
use crate::error::{Error, Result};

/// Observed balances compared with the configured requirements
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReport {
    pub sol: f64,
    pub wsol: f64,
    pub sol_ok: bool,
    pub wsol_ok: bool,
}

impl BalanceReport {
    pub fn evaluate(sol: f64, wsol: f64, requirements: &BalanceRequirements) -> Self {
        Self {
            sol,
            wsol,
            sol_ok: sol >= requirements.min_sol,
            wsol_ok: wsol >= requirements.min_wsol,
        }
    }

    /// SOL is needed for fees, so a shortfall stops the run.
    /// A wrapped-SOL shortfall only warns.
    pub fn enforce(&self, requirements: &BalanceRequirements) -> Result<()> {
        if !self.wsol_ok {
            warn!(
                "Wrapped SOL balance {:.4} below requirement {:.4}",
                self.wsol, requirements.min_wsol
            );
        }

        if !self.sol_ok {
            return Err(Error::InsufficientBalance {
                available: self.sol,
                required: requirements.min_sol,
            });
        }

        info!("Wallet balance OK: {:.4} SOL, {:.4} WSOL", self.sol, self.wsol);
        Ok(())
    }
}

/// Fetch SOL and wrapped-SOL balances for `wallet`
pub async fn fetch_balances(
    rpc: &RpcClient,
    wallet: &Pubkey,
    lamports_per_sol: u64,
) -> Result<(f64, f64)> {
    let lamports = rpc.get_balance(wallet).await?;
    let sol = lamports as f64 / lamports_per_sol as f64;

    let wsol_account = spl_associated_token_account::get_associated_token_address(
        wallet,
        &spl_token::native_mint::id(),
    );

    // No wrapped-SOL account yet reads as zero
    let wsol = match rpc.get_token_account_balance(&wsol_account).await {
        Ok(amount) => amount.ui_amount.unwrap_or(0.0),
        Err(e) => {
            warn!("Could not read wrapped SOL account {}: {}", wsol_account, e);
            0.0
        }
    };

    Ok((sol, wsol))
}
