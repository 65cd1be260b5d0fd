//! Append-only JSON-lines trade log
//!
//! One record per completed trade leg. Writing never fails observably: storage
//! errors go to the operator log and the cycle carries on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::Result;
use crate::trading::TradeAction;

/// One line of the trade log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLogRecord {
    pub timestamp: DateTime<Utc>,
    pub action: TradeAction,
    pub token_address: String,
    /// Curve spot price in SOL per token at the time of the leg
    pub price: f64,
    pub tx_hash: Option<String>,
}

impl TradeLogRecord {
    pub fn new(
        action: TradeAction,
        token_address: impl Into<String>,
        price: f64,
        tx_hash: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            token_address: token_address.into(),
            price,
            tx_hash,
        }
    }
}

/// Writer for the trade log file
#[derive(Debug, Clone)]
pub struct TradeLogger {
    path: PathBuf,
}

impl TradeLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one record. Errors are reported and swallowed.
    pub async fn append(
        &self,
        action: TradeAction,
        token_address: &str,
        price: f64,
        tx_hash: Option<&str>,
    ) {
        let record = TradeLogRecord::new(action, token_address, price, tx_hash.map(str::to_string));
        if let Err(e) = self.write_record(&record).await {
            warn!(
                "Failed to write {} record for {} to {}: {}",
                action,
                token_address,
                self.path.display(),
                e
            );
        }
    }

    async fn write_record(&self, record: &TradeLogRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!("Trade log: {}", line.trim_end());
        Ok(())
    }
}

/// Read every record in a trade log. Unparseable lines are skipped.
pub async fn read_records(path: &Path) -> Result<Vec<TradeLogRecord>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TradeLogRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping trade log line {}: {}", idx + 1, e),
        }
    }
    Ok(records)
}

/// Aggregate view of a trade log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeLogSummary {
    pub buys: usize,
    pub sells: usize,
    /// Legs recorded without a transaction hash
    pub failed_legs: usize,
    pub distinct_tokens: usize,
    /// Tokens bought but not yet sold
    pub open_positions: usize,
    /// Completed buy-then-sell pairs
    pub round_trips: usize,
    /// Mean of sell price / buy price over round trips
    pub avg_exit_ratio: Option<f64>,
    pub first_trade: Option<DateTime<Utc>>,
    pub last_trade: Option<DateTime<Utc>>,
}

impl TradeLogSummary {
    pub fn from_records(records: &[TradeLogRecord]) -> Self {
        let mut summary = Self::default();
        let mut tokens = HashSet::new();
        // Last unmatched buy price per token
        let mut open: HashMap<&str, f64> = HashMap::new();
        let mut ratios = Vec::new();

        for record in records {
            tokens.insert(record.token_address.as_str());
            if record.tx_hash.is_none() {
                summary.failed_legs += 1;
            }

            summary.first_trade = Some(match summary.first_trade {
                Some(t) if t <= record.timestamp => t,
                _ => record.timestamp,
            });
            summary.last_trade = Some(match summary.last_trade {
                Some(t) if t >= record.timestamp => t,
                _ => record.timestamp,
            });

            match record.action {
                TradeAction::Buy => {
                    summary.buys += 1;
                    open.insert(record.token_address.as_str(), record.price);
                }
                TradeAction::Sell => {
                    summary.sells += 1;
                    if let Some(buy_price) = open.remove(record.token_address.as_str()) {
                        summary.round_trips += 1;
                        if buy_price > 0.0 && record.price.is_finite() {
                            ratios.push(record.price / buy_price);
                        }
                    }
                }
            }
        }

        summary.distinct_tokens = tokens.len();
        summary.open_positions = open.len();
        if !ratios.is_empty() {
            summary.avg_exit_ratio = Some(ratios.iter().sum::<f64>() / ratios.len() as f64);
        }
        summary
    }
}

impl std::fmt::Display for TradeLogSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Trade log summary:")?;
        writeln!(f, "  buys:            {}", self.buys)?;
        writeln!(f, "  sells:           {}", self.sells)?;
        writeln!(f, "  failed legs:     {}", self.failed_legs)?;
        writeln!(f, "  distinct tokens: {}", self.distinct_tokens)?;
        writeln!(f, "  open positions:  {}", self.open_positions)?;
        writeln!(f, "  round trips:     {}", self.round_trips)?;
        match self.avg_exit_ratio {
            Some(ratio) => writeln!(
                f,
                "  avg exit:        {:.3}x ({:+.1}%)",
                ratio,
                (ratio - 1.0) * 100.0
            )?,
            None => writeln!(f, "  avg exit:        n/a")?,
        }
        if let (Some(first), Some(last)) = (self.first_trade, self.last_trade) {
            writeln!(f, "  period:          {} .. {}", first.to_rfc3339(), last.to_rfc3339())?;
        }
        Ok(())
    }
}
