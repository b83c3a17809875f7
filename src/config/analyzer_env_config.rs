//! Zone analyzer configuration from environment variables.

use super::parse_env;
use crate::domain::config::AnalyzerConfig;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AnalyzerEnvConfig {
    pub analyzer: AnalyzerConfig,
}

impl AnalyzerEnvConfig {
    pub fn from_env() -> Result<Self> {
        let d = AnalyzerConfig::default();
        let analyzer = AnalyzerConfig {
            near_zone_pct: parse_env("NEAR_ZONE_PCT", d.near_zone_pct)?,
            watch_zone_pct: parse_env("WATCH_ZONE_PCT", d.watch_zone_pct)?,
            strong_zone_score: parse_env("STRONG_ZONE_SCORE", d.strong_zone_score)?,
            min_actionable_score: parse_env("MIN_ACTIONABLE_SCORE", d.min_actionable_score)?,
            break_height_fraction: parse_env("BREAK_HEIGHT_FRACTION", d.break_height_fraction)?,
            stop_buffer_pct: parse_env("STOP_BUFFER_PCT", d.stop_buffer_pct)?,
            target_extension_pct: parse_env("TARGET_EXTENSION_PCT", d.target_extension_pct)?,
            failed_test_penalty: parse_env("FAILED_TEST_PENALTY", d.failed_test_penalty)?,
            max_age_days: parse_env("ZONE_MAX_AGE_DAYS", d.max_age_days)?,
        };
        analyzer.validate().context("Invalid analyzer config")?;
        Ok(Self { analyzer })
    }
}
