use super::{ensure_below, ensure_non_zero, ensure_positive, ensure_range};
use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Thresholds for zone scoring, state classification and recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Distance (percent) within which a zone is actionable
    pub near_zone_pct: f64,
    /// Distance (percent) within which a zone is worth preparing for;
    /// risk/reward is only computed inside this band
    pub watch_zone_pct: f64,
    /// Strength at or above which an actionable zone gets HIGH priority
    pub strong_zone_score: f64,
    /// Strength below which a zone is only ever watched
    pub min_actionable_score: f64,
    /// Fraction of the zone height price must close beyond to break it
    pub break_height_fraction: f64,
    /// Stop placement beyond the far edge (percent)
    pub stop_buffer_pct: f64,
    /// Target placement beyond the entry edge (percent)
    pub target_extension_pct: f64,
    /// Points removed per failed prior test
    pub failed_test_penalty: f64,
    /// Zones older than this are retired
    pub max_age_days: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            near_zone_pct: 2.0,
            watch_zone_pct: 5.0,
            strong_zone_score: 75.0,
            min_actionable_score: 50.0,
            break_height_fraction: 0.5,
            stop_buffer_pct: 2.0,
            target_extension_pct: 5.0,
            failed_test_penalty: 15.0,
            max_age_days: 180,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("near_zone_pct", self.near_zone_pct)?;
        ensure_positive("watch_zone_pct", self.watch_zone_pct)?;
        ensure_below(
            "near_zone_pct",
            self.near_zone_pct,
            "watch_zone_pct",
            self.watch_zone_pct,
        )?;
        ensure_range("strong_zone_score", self.strong_zone_score, 0.0, 100.0)?;
        ensure_range("min_actionable_score", self.min_actionable_score, 0.0, 100.0)?;
        ensure_positive("break_height_fraction", self.break_height_fraction)?;
        ensure_range("stop_buffer_pct", self.stop_buffer_pct, 0.0, 100.0)?;
        ensure_positive("target_extension_pct", self.target_extension_pct)?;
        ensure_range("failed_test_penalty", self.failed_test_penalty, 0.0, 100.0)?;
        ensure_non_zero("max_age_days", self.max_age_days as usize)?;
        Ok(())
    }
}
