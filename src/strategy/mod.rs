//! Strategy selection by pool size

pub mod selector;

pub use selector::{select, Strategy, StrategyParams, SMALL_POOL_THRESHOLD_SOL};
