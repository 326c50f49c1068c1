//! PolymarketAgent - Main Entry Point
//!
//! Runs buy and sell cycles of the LLM trading agent against Polymarket.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use polymarket_agent::config::load_config;
use polymarket_agent::{
    CycleRecord, CycleStatus, DecisionOrchestrator, JsonFileAuditSink, OpenAiOracle,
    PolymarketClient,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Log orders instead of posting them to the exchange
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one buy cycle
    Buy {
        /// Event tag to search (random configured tag when omitted)
        #[arg(long)]
        tag: Option<String>,

        /// Let the oracle choose an event before choosing a market
        #[arg(long)]
        via_event: bool,
    },
    /// Review every held position and sell where warranted
    Sell,
    /// Sell batch followed by one buy cycle
    Run {
        #[arg(long)]
        tag: Option<String>,

        #[arg(long)]
        via_event: bool,
    },
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install subscriber: {}", e))
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install subscriber: {}", e))
    }
}

fn summarize(records: &[CycleRecord]) {
    let count = |status: CycleStatus| records.iter().filter(|r| r.status == Some(status)).count();
    info!(
        cycles = records.len(),
        success = count(CycleStatus::Success),
        hold = count(CycleStatus::Hold),
        failed = count(CycleStatus::Failed),
        "Done"
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let mut config = load_config(Some(&args.config)).context("loading configuration")?;
    if args.dry_run {
        config.settings.dry_run = true;
    }

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.settings.log_level.clone());
    init_logging(&level, args.log_json)?;

    info!("Starting PolymarketAgent");
    info!("Configuration file: {}", args.config);
    if config.settings.dry_run {
        warn!("Dry run: orders will not be posted");
    }

    let timeout = Duration::from_secs(config.settings.request_timeout_seconds);
    let client = PolymarketClient::new(config.polymarket.clone(), timeout)?;
    let account = client.account();
    let gateway = client.order_gateway(config.settings.dry_run)?;
    let oracle = OpenAiOracle::new(config.openai.clone(), timeout)?;
    let audit = JsonFileAuditSink::new(&config.settings.audit_dir);

    let orchestrator = DecisionOrchestrator::new(
        Box::new(client),
        Box::new(oracle),
        gateway,
        Box::new(audit),
        config.trading.clone(),
    );

    let records = match args.command {
        Command::Buy { tag, via_event } => vec![orchestrator.run_buy_cycle(tag, via_event).await],
        Command::Sell => orchestrator.run_sell_batch(&account?).await?,
        Command::Run { tag, via_event } => orchestrator.run(&account?, tag, via_event).await,
    };

    summarize(&records);
    Ok(())
}
