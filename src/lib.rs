//! Pump.fun launch trader library
//!
//! Event-driven trade cycle: creation event -> admission filter -> strategy
//! -> buy -> hold -> sell, over a persistent PumpPortal stream.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod pump;
pub mod strategy;
pub mod stream;
pub mod trade_log;
pub mod trading;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
