use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;
use zonewatch::application::agents::ZoneScanner;
use zonewatch::application::indicators::IndicatorLibrary;
use zonewatch::application::monitoring::PriceMonitor;
use zonewatch::application::zones::{EnhancedZoneAnalyzer, ZoneAnalyzer, ZoneDetector};
use zonewatch::config::{Config, LogFormat};
use zonewatch::infrastructure::{CsvMarketDataSource, InMemoryZoneStore, TracingAlertSink};

#[derive(Parser)]
#[command(author, version, about = "Supply/demand zone scanner", long_about = None)]
struct Cli {
    /// Directory holding <SYMBOL>.csv files (overrides DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Comma separated symbols (overrides SYMBOLS)
    #[arg(long, global = true, value_delimiter = ',')]
    symbols: Option<Vec<String>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one detection batch and print every analysis as a JSON line
    Scan {
        /// Also run one monitoring pass after the scan
        #[arg(long)]
        monitor: bool,
    },
    /// Scan and monitor periodically until Ctrl-C
    Watch,
}

fn init_tracing(format: LogFormat) {
    let filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }
}

fn build_scanner(config: &Config) -> Result<ZoneScanner> {
    let detector =
        ZoneDetector::new(config.detector.clone()).context("Invalid detector config")?;
    let analyzer = EnhancedZoneAnalyzer::new(
        ZoneAnalyzer::new(config.analyzer.clone()).context("Invalid analyzer config")?,
        IndicatorLibrary::new(config.indicators.clone()).context("Invalid indicator config")?,
    );
    let monitor = PriceMonitor::new(config.monitor.clone()).context("Invalid monitor config")?;

    let scanner = ZoneScanner::new(
        Arc::new(CsvMarketDataSource::new(&config.data_dir)),
        Arc::new(InMemoryZoneStore::new()),
        Arc::new(TracingAlertSink::new()),
        detector,
        analyzer,
        monitor,
        config.scanner.clone(),
    )
    .context("Invalid scanner config")?;
    Ok(scanner)
}

async fn scan_once(scanner: &ZoneScanner, symbols: &[String], monitor: bool) -> Result<()> {
    // Never flipped: a one-shot scan runs to completion.
    let (_cancel_tx, cancel_rx) = watch::channel(false);

    for result in scanner.scan_batch(symbols, &cancel_rx).await {
        let Ok(analyses) = result.outcome else {
            continue;
        };
        for analysis in &analyses {
            let line = serde_json::to_string(analysis).context("Failed to serialize analysis")?;
            println!("{}", line);
        }
    }

    if monitor {
        for symbol in symbols {
            if let Err(e) = scanner.monitor_symbol(symbol).await {
                error!("Monitoring {} failed: {}", symbol, e);
            }
        }
    }
    Ok(())
}

async fn watch_until_ctrl_c(scanner: ZoneScanner) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scanner = Arc::new(scanner);

    let worker = {
        let scanner = scanner.clone();
        tokio::spawn(async move { scanner.run(shutdown_rx).await })
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Shutdown requested, finishing current cycle...");
    shutdown_tx
        .send(true)
        .context("Scanner loop already exited")?;

    worker.await.context("Scanner task panicked")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load config")?;
    init_tracing(config.log_format);

    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(symbols) = cli.symbols {
        config.scanner.symbols = symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }

    info!(
        "Zonewatch starting: {} symbols from {}",
        config.scanner.symbols.len(),
        config.data_dir.display()
    );

    let scanner = build_scanner(&config)?;

    match cli.command {
        Commands::Scan { monitor } => {
            let symbols = config.scanner.symbols.clone();
            scan_once(&scanner, &symbols, monitor).await
        }
        Commands::Watch => watch_until_ctrl_c(scanner).await,
    }
}
