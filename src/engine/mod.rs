//! Trading engine: trade cycle state machine and connection sessions

pub mod keepalive;
pub mod sequencer;
pub mod session;

pub use sequencer::{CycleState, SequencerStats, SessionEnd, TradeSequencer};
pub use session::SessionDriver;

use crate::filter::TokenMatcher;

/// Single-shot or continuous ("yolo") operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// One admitted cycle, then exit
    #[default]
    Once,
    /// Trade until the process is stopped, reconnecting on drops
    Continuous,
}

/// Operator-selected mode flags for a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeOptions {
    pub mode: RunMode,
    /// Marry mode: buy and keep, never sell
    pub buy_only: bool,
    pub matcher: TokenMatcher,
}

impl TradeOptions {
    pub fn once() -> Self {
        Self::default()
    }

    pub fn continuous() -> Self {
        Self {
            mode: RunMode::Continuous,
            ..Self::default()
        }
    }

    /// Options from the `--yolo`, `--marry`, `--match` and `--bro` flags.
    /// Every combination is valid.
    pub fn from_flags(yolo: bool, marry: bool, match_string: Option<&str>, bro: Option<&str>) -> Self {
        Self {
            mode: if yolo { RunMode::Continuous } else { RunMode::Once },
            buy_only: marry,
            matcher: TokenMatcher::new(match_string, bro),
        }
    }
}
