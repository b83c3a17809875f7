use crate::application::market_data::FetchPolicy;
use crate::domain::config::{ensure_non_zero, ensure_positive};
use crate::domain::errors::ConfigError;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ScannerConfig {
    pub symbols: Vec<String>,
    /// Bars requested per history fetch; must cover the detector lookback
    /// and the slowest indicator (EMA 200)
    pub history_bars: usize,
    /// Symbols scanned at the same time
    pub concurrency: usize,
    pub scan_interval: Duration,
    pub alert_reset_interval: Duration,
    /// Zones whose nearer edge lies within this distance (percent) are monitored
    pub near_price_distance_pct: f64,
    pub fetch_policy: FetchPolicy,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["AAPL".to_string(), "MSFT".to_string(), "NVDA".to_string()],
            history_bars: 250,
            concurrency: 4,
            scan_interval: Duration::from_secs(300),
            alert_reset_interval: Duration::from_secs(3600),
            near_price_distance_pct: 10.0,
            fetch_policy: FetchPolicy::default(),
        }
    }
}

impl ScannerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_zero("history_bars", self.history_bars)?;
        ensure_non_zero("concurrency", self.concurrency)?;
        ensure_positive("scan_interval_secs", self.scan_interval.as_secs_f64())?;
        ensure_positive(
            "alert_reset_interval_secs",
            self.alert_reset_interval.as_secs_f64(),
        )?;
        ensure_positive("near_price_distance_pct", self.near_price_distance_pct)?;
        ensure_positive("fetch_timeout_ms", self.fetch_policy.timeout.as_secs_f64())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ScannerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = ScannerConfig {
            concurrency: 0,
            ..ScannerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { ref field, .. }) if field == "concurrency"
        ));
    }

    #[test]
    fn test_zero_fetch_timeout_rejected() {
        let mut config = ScannerConfig::default();
        config.fetch_policy.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
