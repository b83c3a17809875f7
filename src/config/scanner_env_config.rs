//! Scanner configuration from environment variables.

use super::parse_env;
use crate::application::agents::ScannerConfig;
use crate::application::market_data::FetchPolicy;
use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ScannerEnvConfig {
    pub scanner: ScannerConfig,
    pub data_dir: PathBuf,
}

impl ScannerEnvConfig {
    /// Validation happens in `Config::from_env`, once the alert reset
    /// interval from the monitor loader has been merged in.
    pub fn from_env() -> Result<Self> {
        let d = ScannerConfig::default();

        let symbols = match env::var("SYMBOLS") {
            Ok(raw) => parse_symbols(&raw),
            Err(_) => d.symbols.clone(),
        };

        let fetch_policy = FetchPolicy::new(
            Duration::from_millis(parse_env(
                "FETCH_TIMEOUT_MS",
                d.fetch_policy.timeout.as_millis() as u64,
            )?),
            parse_env("FETCH_MAX_RETRIES", d.fetch_policy.max_retries)?,
            Duration::from_millis(parse_env(
                "FETCH_RETRY_BACKOFF_MS",
                d.fetch_policy.retry_backoff.as_millis() as u64,
            )?),
        );

        let scanner = ScannerConfig {
            symbols,
            history_bars: parse_env("HISTORY_BARS", d.history_bars)?,
            concurrency: parse_env("SCAN_CONCURRENCY", d.concurrency)?,
            scan_interval: Duration::from_secs(parse_env(
                "SCAN_INTERVAL_SECS",
                d.scan_interval.as_secs(),
            )?),
            alert_reset_interval: d.alert_reset_interval,
            near_price_distance_pct: parse_env(
                "NEAR_PRICE_DISTANCE_PCT",
                d.near_price_distance_pct,
            )?,
            fetch_policy,
        };

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        Ok(Self { scanner, data_dir })
    }
}

/// Comma separated, trimmed, upper-cased, empties dropped.
fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
