//! CSV-backed market data
//!
//! Reads `<data_dir>/<SYMBOL>.csv` with a `timestamp,open,high,low,close,volume`
//! header. Timestamps may be epoch milliseconds, RFC 3339 or `YYYY-MM-DD`.
//! The current price is the last close in the file.

use crate::domain::market::Bar;
use crate::domain::ports::MarketDataSource;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct BarRecord {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return Some(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

fn read_bars(path: &Path) -> Result<Vec<Bar>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut bars = Vec::new();
    for (line, result) in reader.deserialize::<BarRecord>().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("CsvMarketData: skipping row {} of {}: {}", line + 1, path.display(), e);
                continue;
            }
        };
        let Some(timestamp) = parse_timestamp(&record.timestamp) else {
            warn!(
                "CsvMarketData: skipping row {} of {}: bad timestamp {:?}",
                line + 1,
                path.display(),
                record.timestamp
            );
            continue;
        };
        let bar = Bar::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        );
        if !bar.is_well_formed() {
            warn!(
                "CsvMarketData: skipping row {} of {}: malformed bar (high {}, low {}, volume {})",
                line + 1,
                path.display(),
                bar.high,
                bar.low,
                bar.volume
            );
            continue;
        }
        bars.push(bar);
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

#[derive(Debug, Clone)]
pub struct CsvMarketDataSource {
    data_dir: PathBuf,
}

impl CsvMarketDataSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }

    async fn load(&self, symbol: &str) -> Result<Vec<Bar>> {
        let path = self.path_for(symbol);
        let bars = tokio::task::spawn_blocking(move || read_bars(&path))
            .await
            .map_err(|e| anyhow!("CSV reader task failed: {}", e))??;
        debug!("CsvMarketData: loaded {} bars for {}", bars.len(), symbol);
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataSource for CsvMarketDataSource {
    async fn get_history(&self, symbol: &str, lookback: usize) -> Result<Vec<Bar>> {
        let bars = self.load(symbol).await?;
        let start = bars.len().saturating_sub(lookback);
        Ok(bars[start..].to_vec())
    }

    async fn get_current_price(&self, symbol: &str) -> Result<Option<f64>> {
        Ok(self.load(symbol).await?.last().map(|b| b.close))
    }
}
