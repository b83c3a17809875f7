use super::{ensure_below, ensure_positive};
use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Price monitor thresholds and cache lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Distance (percent) on the approach side that raises an "entering" alert
    pub alert_distance_pct: f64,
    /// Distance (percent) on the invalidating side that breaks a zone outright
    pub break_distance_pct: f64,
    /// Fraction of zone height beyond the edge that also counts as a break
    pub break_height_fraction: f64,
    pub price_cache_ttl: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alert_distance_pct: 2.0,
            break_distance_pct: 5.0,
            break_height_fraction: 0.5,
            price_cache_ttl: Duration::from_secs(30),
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("alert_distance_pct", self.alert_distance_pct)?;
        ensure_positive("break_distance_pct", self.break_distance_pct)?;
        ensure_below(
            "alert_distance_pct",
            self.alert_distance_pct,
            "break_distance_pct",
            self.break_distance_pct,
        )?;
        ensure_positive("break_height_fraction", self.break_height_fraction)?;
        ensure_positive(
            "price_cache_ttl_secs",
            self.price_cache_ttl.as_secs_f64(),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MonitorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_alert_distance_rejected() {
        let config = MonitorConfig {
            alert_distance_pct: -2.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = MonitorConfig {
            price_cache_ttl: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
