//! Price and amount conversions around the bonding curve

use super::accounts::BondingCurve;
use crate::error::Result;

/// Token decimals - pump.fun uses 6 decimals (not Solana's standard 9)
pub const DEFAULT_TOKEN_DECIMALS: u8 = 6;

/// Expected tokens and price impact for spending `sol_amount` lamports
/// Returns (tokens_received, price_impact_percent)
pub fn calculate_buy_impact(curve: &BondingCurve, sol_amount: u64) -> Result<(u64, f64)> {
    let tokens = curve.calculate_buy_tokens(sol_amount)?;

    let effective_price = sol_amount as f64 / tokens as f64;
    let spot_price = curve.get_price()?;

    // Price impact = (effective_price - spot_price) / spot_price * 100
    let price_impact = ((effective_price - spot_price) / spot_price) * 100.0;

    Ok((tokens, price_impact))
}

/// Calculate minimum tokens to receive for a buy with slippage
///
/// `slippage` is a fraction: 0.4 accepts 40% fewer tokens.
pub fn calculate_min_tokens_with_slippage(expected_tokens: u64, slippage: f64) -> u64 {
    let factor = (1.0 - slippage).clamp(0.0, 1.0);
    (expected_tokens as f64 * factor) as u64
}

/// Slippage fraction as a whole percentage, as the trade API expects
pub fn slippage_to_pct(slippage: f64) -> u32 {
    (slippage * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Convert SOL to lamports
pub fn sol_to_lamports(sol: f64, lamports_per_sol: u64) -> u64 {
    (sol * lamports_per_sol as f64) as u64
}

/// Format price for display
pub fn format_price(price: f64) -> String {
    if price < 0.000001 {
        format!("{:.12}", price)
    } else if price < 0.001 {
        format!("{:.8}", price)
    } else if price < 1.0 {
        format!("{:.6}", price)
    } else {
        format!("{:.4}", price)
    }
}
