//! Pump.fun program constants and address derivation
//!
//! The program id itself is configuration (`venue.program`); only layout
//! constants live here.

use solana_sdk::pubkey::Pubkey;

/// Seed prefix of the bonding curve PDA
pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";

/// Account discriminators (first 8 bytes of account data)
/// Used to identify account types when parsing
#[allow(non_snake_case)]
pub mod ACCOUNT_DISCRIMINATORS {
    /// BondingCurve account discriminator
    pub const BONDING_CURVE: [u8; 8] = [23, 183, 248, 55, 96, 216, 172, 96];
}

/// Derive the bonding curve PDA for a mint
pub fn derive_bonding_curve(mint: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[BONDING_CURVE_SEED, mint.as_ref()], program_id)
}
