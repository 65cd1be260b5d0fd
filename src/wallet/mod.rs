//! Wallet concerns: runtime credentials and startup balance checks

pub mod balance;
pub mod credentials;

pub use balance::BalanceReport;
pub use credentials::{Credentials, Secret};
