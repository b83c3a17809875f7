//! Zone Detection Configuration Value Object
//!
//! Encapsulates the swing search, consolidation and impulse thresholds used
//! by `ZoneDetector`.

use super::{ensure_below, ensure_non_zero, ensure_positive, ensure_range};
use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// # Invariants
///
/// - `lookback_periods`, `swing_strength`, `departure_bars` > 0
/// - `0 < min_zone_size_pct < max_zone_size_pct`
/// - `min_consolidation_bars <= consolidation_search_bars`
/// - `min_volume_ratio`, `consolidation_threshold_pct` > 0
/// - `min_impulse_multiplier >= 0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Bars required (and scanned) per detection run
    pub lookback_periods: usize,
    /// Minimum separation between two swing points of the same side
    pub swing_strength: usize,
    /// Smallest accepted zone height, percent of the zone bottom
    pub min_zone_size_pct: f64,
    /// Largest accepted zone height, percent of the zone bottom
    pub max_zone_size_pct: f64,
    /// departure volume / approach volume floor
    pub min_volume_ratio: f64,
    /// Range / mean close ceiling for a window to count as consolidation (percent)
    pub consolidation_threshold_pct: f64,
    /// How far back from a swing point the consolidation search goes
    pub consolidation_search_bars: usize,
    pub min_consolidation_bars: usize,
    /// Window width used when no window is tight enough
    pub consolidation_fallback_bars: usize,
    /// Bars after the swing summed into the departure volume
    pub departure_bars: usize,
    /// Impulse must be at least this multiple of the zone size
    pub min_impulse_multiplier: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            lookback_periods: 100,
            swing_strength: 5,
            min_zone_size_pct: 0.3,
            max_zone_size_pct: 10.0,
            min_volume_ratio: 1.2,
            consolidation_threshold_pct: 5.0,
            consolidation_search_bars: 10,
            min_consolidation_bars: 3,
            consolidation_fallback_bars: 5,
            departure_bars: 10,
            min_impulse_multiplier: 1.0,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_zero("lookback_periods", self.lookback_periods)?;
        ensure_non_zero("swing_strength", self.swing_strength)?;
        ensure_positive("min_zone_size_pct", self.min_zone_size_pct)?;
        ensure_positive("max_zone_size_pct", self.max_zone_size_pct)?;
        ensure_below(
            "min_zone_size_pct",
            self.min_zone_size_pct,
            "max_zone_size_pct",
            self.max_zone_size_pct,
        )?;
        ensure_positive("min_volume_ratio", self.min_volume_ratio)?;
        ensure_range(
            "consolidation_threshold_pct",
            self.consolidation_threshold_pct,
            f64::MIN_POSITIVE,
            100.0,
        )?;
        ensure_non_zero("min_consolidation_bars", self.min_consolidation_bars)?;
        ensure_non_zero("consolidation_search_bars", self.consolidation_search_bars)?;
        ensure_range(
            "min_consolidation_bars",
            self.min_consolidation_bars as f64,
            1.0,
            self.consolidation_search_bars as f64,
        )?;
        ensure_non_zero("consolidation_fallback_bars", self.consolidation_fallback_bars)?;
        ensure_non_zero("departure_bars", self.departure_bars)?;
        ensure_range(
            "min_impulse_multiplier",
            self.min_impulse_multiplier,
            0.0,
            f64::MAX,
        )?;
        Ok(())
    }
}
