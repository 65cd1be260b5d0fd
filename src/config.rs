//! Configuration loading and validation
//!
//! The configuration is built once at startup and never mutated afterwards.
//! Components receive the section they need by reference. Secrets are not part
//! of this structure: see [`crate::wallet::credentials`].

use anyhow::{Context, Result};
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub venue: VenueConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub tips: TipConfig,
    #[serde(default)]
    pub balance: BalanceRequirements,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Pump.fun program address and unit size
///
/// WARNING: pump.fun has changed its program in the past. Override in the
/// config file rather than patching the default.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    #[serde(default = "default_program")]
    pub program: String,
    /// Base-asset unit size (lamports per SOL)
    #[serde(default = "default_lamports_per_sol")]
    pub lamports_per_sol: u64,
}

impl VenueConfig {
    /// Parsed program id
    pub fn program_id(&self) -> crate::Result<Pubkey> {
        parse_pubkey("venue.program", &self.program)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_rpc_endpoint")]
    pub rpc: String,
    /// Streaming endpoint for creation events
    #[serde(default = "default_stream_endpoint")]
    pub stream: String,
    /// Trade submission endpoint
    #[serde(default = "default_trade_api")]
    pub trade_api: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    /// Submission attempts per trade leg; amounts and slippage come from the
    /// strategy table
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Jito tip settings, sent as the trade priority fee
#[derive(Debug, Clone, Deserialize)]
pub struct TipConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_tip_amount_sol")]
    pub amount_sol: f64,
}

impl TipConfig {
    /// Priority fee to attach to each trade (SOL)
    pub fn priority_fee_sol(&self) -> f64 {
        if self.enabled {
            self.amount_sol
        } else {
            0.0
        }
    }
}

/// Wallet balance requirements checked before trading
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceRequirements {
    /// SOL kept for fees
    #[serde(default = "default_min_sol")]
    pub min_sol: f64,
    /// Wrapped SOL available for buys
    #[serde(default = "default_min_wsol")]
    pub min_wsol: f64,
}

/// Admission filter configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FilterConfig {
    #[serde(default = "default_true")]
    pub check_freezable: bool,
    #[serde(default)]
    pub check_lp_burned: bool,
    #[serde(default = "default_true")]
    pub skip_lp_bundles: bool,
    /// Minimum pool size in SOL; smaller pools are rejected
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: f64,
    /// Maximum developer-held supply fraction (0.1 = 10%)
    #[serde(default = "default_max_dev_hold")]
    pub max_dev_hold: f64,
    #[serde(default)]
    pub socials_required: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Trading wallet address, used for the startup balance check
    #[serde(default)]
    pub address: Option<String>,
    /// Name of the environment variable holding the trade API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Streaming session policy
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Fixed wait before reconnecting after a drop
    #[serde(default = "default_reconnect_backoff_secs")]
    pub reconnect_backoff_secs: u64,
    /// Keep-alive ping interval
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

impl SessionConfig {
    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_secs(self.reconnect_backoff_secs)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Append-only JSON-lines trade log
    #[serde(default = "default_trade_log")]
    pub trade_log: String,
    /// Operator log file (mirrors stdout)
    #[serde(default = "default_operator_log")]
    pub operator_log: String,
    /// Refresh interval for `stats --watch`
    #[serde(default = "default_analysis_interval_secs")]
    pub analysis_interval_secs: u64,
}

// Default value functions
fn default_program() -> String {
    "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P".into()
}

fn default_lamports_per_sol() -> u64 {
    1_000_000_000
}

fn default_rpc_endpoint() -> String {
    std::env::var("RPC_ENDPOINT").unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".into())
}

fn default_stream_endpoint() -> String {
    "wss://pumpportal.fun/api/data".into()
}

fn default_trade_api() -> String {
    "https://pumpportal.fun/api/trade".into()
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_max_retries() -> u32 {
    3
}

fn default_tip_amount_sol() -> f64 {
    0.006
}

fn default_min_sol() -> f64 {
    1.0
}

fn default_min_wsol() -> f64 {
    0.5
}

fn default_min_pool_size() -> f64 {
    90.0
}

fn default_max_dev_hold() -> f64 {
    0.1
}

fn default_api_key_env() -> String {
    "PUMPPORTAL_API_KEY".into()
}

fn default_reconnect_backoff_secs() -> u64 {
    5
}

fn default_ping_interval_secs() -> u64 {
    20
}

fn default_trade_log() -> String {
    "trades/trades.log".into()
}

fn default_operator_log() -> String {
    "trader.log".into()
}

fn default_analysis_interval_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            lamports_per_sol: default_lamports_per_sol(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            rpc: default_rpc_endpoint(),
            stream: default_stream_endpoint(),
            trade_api: default_trade_api(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

impl Default for TipConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            amount_sol: default_tip_amount_sol(),
        }
    }
}

impl Default for BalanceRequirements {
    fn default() -> Self {
        Self {
            min_sol: default_min_sol(),
            min_wsol: default_min_wsol(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            check_freezable: true,
            check_lp_burned: false,
            skip_lp_bundles: true,
            min_pool_size: default_min_pool_size(),
            max_dev_hold: default_max_dev_hold(),
            socials_required: false,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            address: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconnect_backoff_secs: default_reconnect_backoff_secs(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            trade_log: default_trade_log(),
            operator_log: default_operator_log(),
            analysis_interval_secs: default_analysis_interval_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            venue: VenueConfig::default(),
            endpoints: EndpointConfig::default(),
            trading: TradingConfig::default(),
            tips: TipConfig::default(),
            balance: BalanceRequirements::default(),
            filters: FilterConfig::default(),
            wallet: WalletConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix TRADER_)
            .add_source(
                config::Environment::with_prefix("TRADER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        self.venue.program_id()?;

        if let Some(address) = &self.wallet.address {
            parse_pubkey("wallet.address", address)?;
        }

        if self.venue.lamports_per_sol == 0 {
            anyhow::bail!("venue.lamports_per_sol must be positive");
        }

        if self.trading.max_retries == 0 {
            anyhow::bail!("trading.max_retries must be at least 1");
        }

        if self.tips.amount_sol < 0.0 {
            anyhow::bail!("tips.amount_sol cannot be negative");
        }

        if self.filters.min_pool_size < 0.0 {
            anyhow::bail!("filters.min_pool_size cannot be negative");
        }

        if self.filters.max_dev_hold < 0.0 || self.filters.max_dev_hold > 1.0 {
            anyhow::bail!("filters.max_dev_hold must be a fraction between 0 and 1");
        }

        if self.session.ping_interval_secs == 0 {
            anyhow::bail!("session.ping_interval_secs must be positive");
        }

        if self.logging.analysis_interval_secs == 0 {
            anyhow::bail!("logging.analysis_interval_secs must be positive");
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Venue:
    program: {}
  Endpoints:
    rpc: {}
    stream: {}
    trade_api: {}
  Trading:
    max_retries: {}
  Tips:
    enabled: {}
    amount: {} SOL
  Balance requirements:
    sol: {} / wsol: {}
  Filters:
    check_freezable: {}
    check_lp_burned: {}
    skip_lp_bundles: {}
    min_pool_size: {} SOL
    max_dev_hold: {:.1}%
    socials_required: {}
  Wallet:
    address: {}
    api key env: {}
  Session:
    reconnect_backoff: {}s
    ping_interval: {}s
  Logging:
    trade_log: {}
    operator_log: {}
"#,
            self.venue.program,
            mask_url(&self.endpoints.rpc),
            mask_url(&self.endpoints.stream),
            mask_url(&self.endpoints.trade_api),
            self.trading.max_retries,
            self.tips.enabled,
            self.tips.amount_sol,
            self.balance.min_sol,
            self.balance.min_wsol,
            self.filters.check_freezable,
            self.filters.check_lp_burned,
            self.filters.skip_lp_bundles,
            self.filters.min_pool_size,
            self.filters.max_dev_hold * 100.0,
            self.filters.socials_required,
            self.wallet.address.as_deref().unwrap_or("(not set)"),
            self.wallet.api_key_env,
            self.session.reconnect_backoff_secs,
            self.session.ping_interval_secs,
            self.logging.trade_log,
            self.logging.operator_log,
        )
    }
}

fn parse_pubkey(name: &str, value: &str) -> crate::Result<Pubkey> {
    Pubkey::from_str(value)
        .map_err(|e| crate::Error::Config(format!("Invalid {} '{}': {}", name, value, e)))
}

/// Mask URL for display (hide API keys in paths and query params)
fn mask_url(url: &str) -> String {
    let base = match url.find('?') {
        Some(idx) => format!("{}?***", &url[..idx]),
        None => url.to_string(),
    };

    // Node providers embed the token as the last path segment
    match base.find("://") {
        Some(scheme_end) => {
            let rest = &base[scheme_end + 3..];
            match rest.find('/') {
                Some(slash) if rest.len() > slash + 1 && !rest[slash + 1..].starts_with('?') => {
                    let host_end = scheme_end + 3 + slash;
                    let tail = &base[host_end + 1..];
                    if tail.len() >= 24 && tail.chars().all(|c| c.is_ascii_alphanumeric()) {
                        format!("{}/***", &base[..host_end])
                    } else {
                        base
                    }
                }
                _ => base,
            }
        }
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.filters.check_freezable);
        assert!(!config.filters.check_lp_burned);
        assert_eq!(config.filters.min_pool_size, 90.0);
        assert_eq!(config.session.reconnect_backoff(), Duration::from_secs(5));
        assert_eq!(config.session.ping_interval(), Duration::from_secs(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_program_id_parses() {
        let config = Config::default();
        assert_eq!(
            config.venue.program_id().unwrap().to_string(),
            "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P"
        );
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.filters.max_dev_hold = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.trading.max_retries = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.venue.program = "not-a-key".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_masked_display_hides_endpoint_tokens() {
        let mut config = Config::default();
        config.endpoints.rpc =
            "https://node.example.pro/58ea202484eebe007cc86f844f8ee50749d63d1e".to_string();
        let shown = config.masked_display();
        assert!(!shown.contains("58ea202484eebe007cc86f844f8ee50749d63d1e"));
        assert!(shown.contains("PUMPPORTAL_API_KEY"));
    }

    #[test]
    fn test_rejects_bad_wallet_address() {
        let mut config = Config::default();
        config.wallet.address = Some("not-a-key".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_priority_fee_follows_tip_toggle() {
        let mut tips = TipConfig::default();
        assert_eq!(tips.priority_fee_sol(), 0.006);
        tips.enabled = false;
        assert_eq!(tips.priority_fee_sol(), 0.0);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[filters]\nmin_pool_size = 30.0\nsocials_required = true\n\n[session]\nping_interval_secs = 10\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.filters.min_pool_size, 30.0);
        assert!(config.filters.socials_required);
        // Untouched fields keep their defaults
        assert!(config.filters.check_freezable);
        assert_eq!(config.session.ping_interval_secs, 10);
        assert_eq!(config.session.reconnect_backoff_secs, 5);
    }

    #[test]
    fn test_mask_url() {
        assert_eq!(
            mask_url("https://api.example.com?key=secret"),
            "https://api.example.com?***"
        );
        assert_eq!(
            mask_url("wss://node.example.pro/58ea202484eebe007cc86f844f8ee50749d63d1e"),
            "wss://node.example.pro/***"
        );
        assert_eq!(
            mask_url("wss://pumpportal.fun/api/data"),
            "wss://pumpportal.fun/api/data"
        );
    }
}
