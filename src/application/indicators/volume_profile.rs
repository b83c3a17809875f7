//! Volume Profile - distribution of volume by price bucket
//!
//! Buckets span `[lowest low, highest high]` of the series. Each bar spreads
//! its volume evenly over every bucket its range touches. From the buckets we
//! derive the Point of Control, the Value Area and the high/low volume nodes.

use crate::domain::market::Bar;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    pub price_low: f64,
    pub price_high: f64,
    pub bin_size: f64,
    /// Volume per bucket, lowest price first
    pub bins: Vec<f64>,
    pub total_volume: f64,
    pub poc_index: usize,
    /// Center price of the highest-volume bucket
    pub point_of_control: f64,
    pub value_area_high: f64,
    pub value_area_low: f64,
    /// Bucket center prices at least `hvn_std_devs` above the mean bucket volume
    pub high_volume_nodes: Vec<f64>,
    /// Bucket center prices at least `lvn_std_devs` below the mean bucket volume
    pub low_volume_nodes: Vec<f64>,
}

impl VolumeProfile {
    pub fn bin_bounds(&self, index: usize) -> (f64, f64) {
        let lower = self.price_low + self.bin_size * index as f64;
        (lower, lower + self.bin_size)
    }

    pub fn bin_center(&self, index: usize) -> f64 {
        let (lower, upper) = self.bin_bounds(index);
        (lower + upper) / 2.0
    }

    pub fn value_area_contains(&self, price: f64) -> bool {
        price >= self.value_area_low && price <= self.value_area_high
    }

    fn bin_index(&self, price: f64) -> usize {
        if self.bin_size <= 0.0 {
            return 0;
        }
        let raw = ((price - self.price_low) / self.bin_size).floor();
        (raw.max(0.0) as usize).min(self.bins.len() - 1)
    }
}

/// Build a profile over `bars`. `None` for an empty series or zero volume.
pub fn build_volume_profile(
    bars: &[Bar],
    price_bins: usize,
    value_area_pct: f64,
    hvn_std_devs: f64,
    lvn_std_devs: f64,
) -> Option<VolumeProfile> {
    if bars.is_empty() || price_bins == 0 {
        return None;
    }

    let price_low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let price_high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let total_volume: f64 = bars.iter().map(|b| b.volume).sum();
    if !price_low.is_finite() || !price_high.is_finite() || total_volume <= 0.0 {
        return None;
    }

    // A flat series collapses into a single bucket
    let (bin_count, bin_size) = if price_high > price_low {
        (price_bins, (price_high - price_low) / price_bins as f64)
    } else {
        (1, 0.0)
    };

    let mut profile = VolumeProfile {
        price_low,
        price_high,
        bin_size,
        bins: vec![0.0; bin_count],
        total_volume,
        poc_index: 0,
        point_of_control: price_low,
        value_area_high: price_high,
        value_area_low: price_low,
        high_volume_nodes: Vec::new(),
        low_volume_nodes: Vec::new(),
    };

    for bar in bars {
        // An inverted bar (high below low) still covers the buckets between its extremes
        let (a, b) = (profile.bin_index(bar.low), profile.bin_index(bar.high));
        let (first, last) = (a.min(b), a.max(b));
        let share = bar.volume / (last - first + 1) as f64;
        for bucket in &mut profile.bins[first..=last] {
            *bucket += share;
        }
    }

    profile.poc_index = profile
        .bins
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 { (i, v) } else { best }
        })
        .0;
    profile.point_of_control = profile.bin_center(profile.poc_index);

    let (va_low_idx, va_high_idx) =
        value_area_bounds(&profile.bins, profile.poc_index, total_volume * value_area_pct / 100.0);
    profile.value_area_low = profile.bin_bounds(va_low_idx).0;
    profile.value_area_high = profile.bin_bounds(va_high_idx).1;

    let data = Data::new(profile.bins.clone());
    let mean = data.mean().unwrap_or(0.0);
    let std_dev = data.std_dev().unwrap_or(0.0);
    if std_dev > 0.0 {
        let hvn_floor = mean + hvn_std_devs * std_dev;
        let lvn_ceiling = mean - lvn_std_devs * std_dev;
        for (i, &volume) in profile.bins.iter().enumerate() {
            if volume >= hvn_floor {
                profile.high_volume_nodes.push(profile.bin_center(i));
            } else if volume <= lvn_ceiling {
                profile.low_volume_nodes.push(profile.bin_center(i));
            }
        }
    }

    Some(profile)
}

/// Grow the value area out of the POC, one bucket at a time toward the
/// heavier neighbor (upward on ties), until `target` volume is covered.
/// Returns inclusive bucket indices (low, high).
fn value_area_bounds(bins: &[f64], poc: usize, target: f64) -> (usize, usize) {
    let (mut low, mut high) = (poc, poc);
    let mut covered = bins[poc];

    while covered < target && (low > 0 || high + 1 < bins.len()) {
        let above = if high + 1 < bins.len() { bins[high + 1] } else { -1.0 };
        let below = if low > 0 { bins[low - 1] } else { -1.0 };

        if above >= below {
            high += 1;
            covered += above;
        } else {
            low -= 1;
            covered += below;
        }
    }

    (low, high)
}
