//! Price monitor configuration from environment variables.
//!
//! `ALERT_RESET_INTERVAL_SECS` is loaded here because it governs alert
//! dedup, although the scanner loop is what applies it.

use super::parse_env;
use crate::domain::config::MonitorConfig;
use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MonitorEnvConfig {
    pub monitor: MonitorConfig,
    pub alert_reset_interval: Duration,
}

impl MonitorEnvConfig {
    pub fn from_env() -> Result<Self> {
        let d = MonitorConfig::default();
        let monitor = MonitorConfig {
            alert_distance_pct: parse_env("ALERT_DISTANCE_PCT", d.alert_distance_pct)?,
            break_distance_pct: parse_env("BREAK_DISTANCE_PCT", d.break_distance_pct)?,
            break_height_fraction: parse_env("BREAK_HEIGHT_FRACTION", d.break_height_fraction)?,
            price_cache_ttl: Duration::from_secs(parse_env(
                "PRICE_CACHE_TTL_SECS",
                d.price_cache_ttl.as_secs(),
            )?),
        };
        monitor.validate().context("Invalid monitor config")?;

        let alert_reset_interval =
            Duration::from_secs(parse_env("ALERT_RESET_INTERVAL_SECS", 3600u64)?);

        Ok(Self {
            monitor,
            alert_reset_interval,
        })
    }
}
