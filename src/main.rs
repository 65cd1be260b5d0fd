//! Pump.fun launch trader
//!
//! Watches for new token creations, filters them, buys, holds and sells.
//!
//! # WARNING
//! - This program trades with real money. Only use funds you can afford to lose.
//! - Most pump.fun tokens go to zero.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::error;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use pumpfun_trader::cli::commands;
use pumpfun_trader::config::{Config, LoggingConfig};
use pumpfun_trader::engine::TradeOptions;

/// Pump.fun launch trader
#[derive(Parser)]
#[command(name = "trader")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Keep trading after each cycle and reconnect when the stream drops
    #[arg(long)]
    yolo: bool,

    /// Only trade tokens whose name or symbol contains this string
    #[arg(long = "match", value_name = "STRING")]
    match_string: Option<String>,

    /// Only trade tokens created by this address
    #[arg(long, value_name = "ADDRESS")]
    bro: Option<String>,

    /// Buy and hold; never sell
    #[arg(long)]
    marry: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration (secrets masked)
    Config,

    /// Summarise the trade log
    Stats {
        /// Refresh continuously
        #[arg(long)]
        watch: bool,
    },

    /// Check RPC and stream reachability
    Health,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(&cli.config);

    let operator_log = match &config {
        Ok(cfg) => cfg.logging.operator_log.clone(),
        Err(_) => LoggingConfig::default().operator_log,
    };
    init_tracing(&operator_log)?;

    let config = match config {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        None => {
            let options = TradeOptions::from_flags(
                cli.yolo,
                cli.marry,
                cli.match_string.as_deref(),
                cli.bro.as_deref(),
            );
            commands::run(&config, options).await
        }
        Some(Commands::Config) => commands::show_config(&config),
        Some(Commands::Stats { watch }) => commands::stats(&config, watch).await,
        Some(Commands::Health) => commands::health(&config).await,
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Log to stdout and mirror to the operator log file
fn init_tracing(operator_log: &str) -> Result<()> {
    let path = Path::new(operator_log);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid operator log path: {}", operator_log))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer alive for the program duration
    Box::leak(Box::new(guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("pumpfun_trader=info".parse()?),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Ok(())
}
