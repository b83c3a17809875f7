//! Configuration module
//!
//! Loads the engine configuration from environment variables, split by
//! concern into sub-loaders:
//! - `detector_env_config`: zone detection thresholds
//! - `analyzer_env_config`: status, strength and recommendation tunables
//! - `indicator_env_config`: RSI, MACD, EMA, ATR, volume profile and SMC
//! - `monitor_env_config`: alert distances and price cache TTL
//! - `scanner_env_config`: symbols, data directory, fetch and batch settings
//! - `observability_config`: log output format
//!
//! Every sub-loader validates what it loads, so `Config::from_env` either
//! returns a usable configuration or fails naming the offending variable.

mod analyzer_env_config;
mod detector_env_config;
mod indicator_env_config;
mod monitor_env_config;
mod observability_config;
mod scanner_env_config;

pub use analyzer_env_config::AnalyzerEnvConfig;
pub use detector_env_config::DetectorEnvConfig;
pub use indicator_env_config::IndicatorEnvConfig;
pub use monitor_env_config::MonitorEnvConfig;
pub use observability_config::{LogFormat, ObservabilityEnvConfig};
pub use scanner_env_config::ScannerEnvConfig;

use crate::application::agents::ScannerConfig;
use crate::domain::config::{AnalyzerConfig, DetectorConfig, IndicatorConfig, MonitorConfig};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Complete engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub detector: DetectorConfig,
    pub analyzer: AnalyzerConfig,
    pub indicators: IndicatorConfig,
    pub monitor: MonitorConfig,
    pub scanner: ScannerConfig,
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to the component defaults.
    pub fn from_env() -> Result<Self> {
        let detector = DetectorEnvConfig::from_env().context("Failed to load detector config")?;
        let analyzer = AnalyzerEnvConfig::from_env().context("Failed to load analyzer config")?;
        let indicators =
            IndicatorEnvConfig::from_env().context("Failed to load indicator config")?;
        let monitor = MonitorEnvConfig::from_env().context("Failed to load monitor config")?;
        let scanner = ScannerEnvConfig::from_env().context("Failed to load scanner config")?;
        let observability = ObservabilityEnvConfig::from_env();

        let mut scanner_config = scanner.scanner;
        scanner_config.alert_reset_interval = monitor.alert_reset_interval;
        scanner_config
            .validate()
            .context("Invalid scanner config")?;

        Ok(Self {
            detector: detector.detector,
            analyzer: analyzer.analyzer,
            indicators: indicators.indicators,
            monitor: monitor.monitor,
            scanner: scanner_config,
            data_dir: scanner.data_dir,
            log_format: observability.log_format,
        })
    }
}

/// Read `key` and parse it, falling back to `default` when it is unset.
pub(crate) fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {}", key)),
        Err(_) => Ok(default),
    }
}
