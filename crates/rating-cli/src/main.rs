//! rate: score a single security from live Yahoo Finance data.
//!
//! Usage:
//!   rate AAPL
//!   rate NSE:TCS --buy 7.5 --hold 5
//!   rate NIFTYBEES --json
//!   rate --samples

mod render;

use clap::Parser;
use rating_core::{RatingConfig, Thresholds};
use rating_orchestrator::RatingOrchestrator;
use std::path::PathBuf;
use std::sync::Arc;
use yahoo_client::YahooClient;

#[derive(Parser, Debug)]
#[command(name = "rate")]
#[command(about = "Rate a stock, ETF or mutual fund on a 0-10 scale")]
struct Args {
    /// Instrument code: AAPL, NSE:INFY, NIFTYBEES, VFIAX, INF109K01ZB3
    #[arg(required_unless_present = "samples")]
    code: Option<String>,

    /// Buy threshold (overrides BUY_THRESHOLD)
    #[arg(long)]
    buy: Option<f64>,

    /// Hold threshold (overrides HOLD_THRESHOLD)
    #[arg(long)]
    hold: Option<f64>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// List sample codes and exit
    #[arg(long)]
    samples: bool,

    /// Reference tables JSON replacing the built-in medians
    #[arg(long, env = "REFERENCE_TABLES_PATH")]
    tables: Option<PathBuf>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rate=info,rating_orchestrator=info,yahoo_client=warn".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    if args.samples {
        print!("{}", render::samples());
        return Ok(());
    }
    let Some(code) = args.code else {
        anyhow::bail!("an instrument code is required");
    };

    let mut config = RatingConfig::from_env()?;
    if args.tables.is_some() {
        config.reference_tables_path = args.tables;
    }
    let thresholds = Thresholds::new(
        args.buy.unwrap_or(config.thresholds.buy),
        args.hold.unwrap_or(config.thresholds.hold),
    )?;

    let provider = Arc::new(YahooClient::new(&config));
    let orchestrator = RatingOrchestrator::from_config(&config, provider)?;

    let report = orchestrator.rate(&code, &thresholds).await?;

    if args.json {
        println!("{}", render::json(&report)?);
    } else {
        print!("{}", render::text(&report));
    }

    Ok(())
}
