//! Zone detector configuration from environment variables.

use super::parse_env;
use crate::domain::config::DetectorConfig;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct DetectorEnvConfig {
    pub detector: DetectorConfig,
}

impl DetectorEnvConfig {
    pub fn from_env() -> Result<Self> {
        let d = DetectorConfig::default();
        let detector = DetectorConfig {
            lookback_periods: parse_env("ZONE_LOOKBACK_PERIODS", d.lookback_periods)?,
            swing_strength: parse_env("ZONE_SWING_STRENGTH", d.swing_strength)?,
            min_zone_size_pct: parse_env("ZONE_MIN_SIZE_PCT", d.min_zone_size_pct)?,
            max_zone_size_pct: parse_env("ZONE_MAX_SIZE_PCT", d.max_zone_size_pct)?,
            min_volume_ratio: parse_env("ZONE_MIN_VOLUME_RATIO", d.min_volume_ratio)?,
            consolidation_threshold_pct: parse_env(
                "ZONE_CONSOLIDATION_THRESHOLD_PCT",
                d.consolidation_threshold_pct,
            )?,
            consolidation_search_bars: parse_env(
                "ZONE_CONSOLIDATION_SEARCH_BARS",
                d.consolidation_search_bars,
            )?,
            min_consolidation_bars: parse_env(
                "ZONE_MIN_CONSOLIDATION_BARS",
                d.min_consolidation_bars,
            )?,
            consolidation_fallback_bars: parse_env(
                "ZONE_CONSOLIDATION_FALLBACK_BARS",
                d.consolidation_fallback_bars,
            )?,
            departure_bars: parse_env("ZONE_DEPARTURE_BARS", d.departure_bars)?,
            min_impulse_multiplier: parse_env(
                "ZONE_MIN_IMPULSE_MULTIPLIER",
                d.min_impulse_multiplier,
            )?,
        };
        detector.validate().context("Invalid detector config")?;
        Ok(Self { detector })
    }
}
