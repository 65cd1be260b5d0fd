//! Pump.fun account structures
//!
//! # WARNING: These structures may change without notice
//! Pump.fun has modified their account layouts in the past.
//! If deserialization fails, these structures may need updating.

use borsh::{BorshDeserialize, BorshSerialize};

use super::program::ACCOUNT_DISCRIMINATORS;
use super::price::DEFAULT_TOKEN_DECIMALS;
use crate::error::{Error, Result};

/// BondingCurve account - the curve state a trade is priced against
///
/// This account holds:
/// - Virtual reserves used for price calculation
/// - Real reserves (actual SOL and tokens held)
/// - Whether the bonding curve has completed (migrated off the curve)
#[derive(Debug, Clone, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct BondingCurve {
    /// Account discriminator (first 8 bytes)
    _discriminator: [u8; 8],

    /// Virtual SOL reserves for price calculation
    pub virtual_sol_reserves: u64,

    /// Virtual token reserves for price calculation
    pub virtual_token_reserves: u64,

    /// Real SOL reserves (actual SOL held in bonding curve)
    pub real_sol_reserves: u64,

    /// Real token reserves (actual tokens held in bonding curve)
    pub real_token_reserves: u64,

    /// Total supply of the token
    pub token_total_supply: u64,

    /// Whether the bonding curve is complete
    pub complete: bool,
}

impl BondingCurve {
    /// Create a new BondingCurve for testing
    #[cfg(test)]
    pub fn new_for_test(
        virtual_sol_reserves: u64,
        virtual_token_reserves: u64,
        real_sol_reserves: u64,
        real_token_reserves: u64,
        token_total_supply: u64,
        complete: bool,
    ) -> Self {
        Self {
            _discriminator: ACCOUNT_DISCRIMINATORS::BONDING_CURVE,
            virtual_sol_reserves,
            virtual_token_reserves,
            real_sol_reserves,
            real_token_reserves,
            token_total_supply,
            complete,
        }
    }

    /// Deserialize from account data
    ///
    /// Trailing bytes are ignored: newer program versions append fields
    /// after `complete`.
    pub fn try_from_account_data(data: &[u8]) -> Result<Self> {
        if data.len() < 8 {
            return Err(Error::BondingCurveDecode(
                "Account data too short".to_string(),
            ));
        }

        let discriminator: [u8; 8] = data[..8]
            .try_into()
            .map_err(|_| Error::BondingCurveDecode("Invalid discriminator".to_string()))?;

        if discriminator != ACCOUNT_DISCRIMINATORS::BONDING_CURVE {
            return Err(Error::BondingCurveDecode(format!(
                "Wrong discriminator: expected {:?}, got {:?}",
                ACCOUNT_DISCRIMINATORS::BONDING_CURVE,
                discriminator
            )));
        }

        let mut cursor = data;
        <Self as BorshDeserialize>::deserialize(&mut cursor)
            .map_err(|e| Error::BondingCurveDecode(format!("Borsh decode failed: {}", e)))
    }

    /// Spot price in lamports per raw token unit
    /// price = virtual_sol_reserves / virtual_token_reserves
    pub fn get_price(&self) -> Result<f64> {
        if self.virtual_token_reserves == 0 {
            return Err(Error::PriceOverflow);
        }

        Ok(self.virtual_sol_reserves as f64 / self.virtual_token_reserves as f64)
    }

    /// Spot price in SOL per whole token
    pub fn price_in_sol(&self, lamports_per_sol: u64) -> Result<f64> {
        let token_unit = 10f64.powi(DEFAULT_TOKEN_DECIMALS as i32);
        Ok(self.get_price()? * token_unit / lamports_per_sol as f64)
    }

    /// Calculate how many tokens you get for a given SOL amount
    /// Uses constant product formula: x * y = k
    pub fn calculate_buy_tokens(&self, sol_amount: u64) -> Result<u64> {
        if self.virtual_sol_reserves == 0 || self.virtual_token_reserves == 0 {
            return Err(Error::PriceOverflow);
        }

        let new_sol_reserves = self
            .virtual_sol_reserves
            .checked_add(sol_amount)
            .ok_or(Error::PriceOverflow)?;

        let k = (self.virtual_sol_reserves as u128)
            .checked_mul(self.virtual_token_reserves as u128)
            .ok_or(Error::PriceOverflow)?;

        let new_token_reserves = k
            .checked_div(new_sol_reserves as u128)
            .ok_or(Error::PriceOverflow)?;

        let tokens_out = (self.virtual_token_reserves as u128)
            .checked_sub(new_token_reserves)
            .ok_or(Error::PriceOverflow)?;

        Ok(tokens_out as u64)
    }
}
