//! Zone Detector
//!
//! Finds supply/demand zones in a bar series:
//! 1. Swing lows (demand) and swing highs (supply) in the lookback window
//! 2. The tightest consolidation ending at each swing becomes the zone band
//! 3. The move away from the band must carry more volume than the base and
//!    travel at least one zone height
//! 4. Overlapping zones of the same side collapse to the strongest one

use crate::application::indicators::swings::{SwingPoint, swing_highs, swing_lows};
use crate::domain::config::DetectorConfig;
use crate::domain::errors::ConfigError;
use crate::domain::market::Bar;
use crate::domain::zones::{Zone, ZoneType};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ZoneDetector {
    config: DetectorConfig,
}

impl ZoneDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect zones over the last `lookback_periods` bars.
    ///
    /// Fewer bars than the lookback yields no zones. Output is ordered by
    /// strength, strongest first, and contains no two overlapping zones of
    /// the same type.
    pub fn detect_zones(&self, bars: &[Bar], symbol: &str) -> Vec<Zone> {
        let lookback = self.config.lookback_periods;
        if bars.len() < lookback {
            debug!(
                "ZoneDetector: {} has {} bars, need {}. Skipping.",
                symbol,
                bars.len(),
                lookback
            );
            return Vec::new();
        }

        let offset = bars.len() - lookback;
        let window = &bars[offset..];

        let mut candidates: Vec<Zone> = Vec::new();
        for swing in swing_lows(window, self.config.swing_strength) {
            if let Some(zone) = self.build_zone(window, offset, &swing, ZoneType::Demand, symbol) {
                candidates.push(zone);
            }
        }
        for swing in swing_highs(window, self.config.swing_strength) {
            if let Some(zone) = self.build_zone(window, offset, &swing, ZoneType::Supply, symbol) {
                candidates.push(zone);
            }
        }

        let found = candidates.len();
        let zones = dedup_overlapping(candidates);

        info!(
            "ZoneDetector: {} -> {} zones ({} candidates before overlap removal)",
            symbol,
            zones.len(),
            found
        );
        zones
    }

    /// Run detection over several pre-fetched series on the rayon pool.
    /// Results keep the input order.
    pub fn detect_zones_parallel(&self, series: &[(String, Vec<Bar>)]) -> Vec<(String, Vec<Zone>)> {
        series
            .par_iter()
            .map(|(symbol, bars)| (symbol.clone(), self.detect_zones(bars, symbol)))
            .collect()
    }

    fn build_zone(
        &self,
        window: &[Bar],
        offset: usize,
        swing: &SwingPoint,
        zone_type: ZoneType,
        symbol: &str,
    ) -> Option<Zone> {
        let idx = swing.index;
        // Interior swings only: enough history for a base, at least one bar after
        if idx < 2 || idx + 1 >= window.len() {
            return None;
        }

        let (start, end) = self.consolidation_window(window, idx);
        let base = &window[start..=end];

        let zone_bottom = base.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let zone_top = base.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        if !(zone_bottom > 0.0 && zone_bottom < zone_top) {
            return None;
        }

        let size_pct = (zone_top - zone_bottom) / zone_bottom * 100.0;
        if size_pct < self.config.min_zone_size_pct || size_pct > self.config.max_zone_size_pct {
            return None;
        }

        let approach_volume: f64 = base.iter().map(|b| b.volume).sum();
        let departure_end = (idx + self.config.departure_bars).min(window.len() - 1);
        let departure = &window[idx + 1..=departure_end];
        let departure_volume: f64 = departure.iter().map(|b| b.volume).sum();

        if approach_volume <= 0.0 || departure_volume / approach_volume < self.config.min_volume_ratio {
            return None;
        }
        let volume_ratio = departure_volume / approach_volume;

        let impulse_pct = match zone_type {
            ZoneType::Demand => {
                let best = departure.iter().map(|b| b.close).fold(f64::NEG_INFINITY, f64::max);
                (best - zone_top) / zone_top * 100.0
            }
            ZoneType::Supply => {
                let best = departure.iter().map(|b| b.close).fold(f64::INFINITY, f64::min);
                (zone_bottom - best) / zone_bottom * 100.0
            }
        };
        if impulse_pct < self.config.min_impulse_multiplier * size_pct {
            return None;
        }

        let strength = initial_strength(volume_ratio, impulse_pct);

        Zone::new(
            symbol,
            zone_type,
            zone_top,
            zone_bottom,
            window[idx].timestamp,
            offset + idx,
            approach_volume,
            departure_volume,
            impulse_pct,
            strength,
        )
    }

    /// Smallest tight window ending at the swing bar, searching back at most
    /// `consolidation_search_bars`. Falls back to the last
    /// `consolidation_fallback_bars` bars. Inclusive bounds.
    fn consolidation_window(&self, window: &[Bar], idx: usize) -> (usize, usize) {
        let max_width = self.config.consolidation_search_bars.min(idx + 1);

        for width in self.config.min_consolidation_bars..=max_width {
            let start = idx + 1 - width;
            if is_consolidation(&window[start..=idx], self.config.consolidation_threshold_pct) {
                return (start, idx);
            }
        }

        let fallback = self.config.consolidation_fallback_bars.clamp(1, idx + 1);
        (idx + 1 - fallback, idx)
    }
}

fn is_consolidation(bars: &[Bar], threshold_pct: f64) -> bool {
    let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let mean_close = bars.iter().map(|b| b.close).sum::<f64>() / bars.len() as f64;

    mean_close > 0.0 && (high - low) / mean_close * 100.0 < threshold_pct
}

/// volume_ratio x 20 + impulse_pct x 5 + 30, clamped to [0, 100]
pub fn initial_strength(volume_ratio: f64, impulse_pct: f64) -> f64 {
    (volume_ratio * 20.0 + impulse_pct * 5.0 + 30.0).clamp(0.0, 100.0)
}

/// Keep the strongest zone of each overlapping same-type group.
fn dedup_overlapping(mut candidates: Vec<Zone>) -> Vec<Zone> {
    candidates.sort_by(|a, b| {
        b.strength_score
            .partial_cmp(&a.strength_score)
            .unwrap_or(Ordering::Equal)
            .then(a.formation_index.cmp(&b.formation_index))
    });

    let mut kept: Vec<Zone> = Vec::with_capacity(candidates.len());
    for zone in candidates {
        let clashes = kept.iter().any(|k| {
            k.zone_type == zone.zone_type && k.overlaps(zone.zone_bottom, zone.zone_top)
        });
        if !clashes {
            kept.push(zone);
        }
    }
    kept
}
