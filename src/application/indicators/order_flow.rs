use super::MarketBias;
use crate::domain::market::Bar;
use serde::{Deserialize, Serialize};

/// Cumulative Volume Delta - running sum of signed bar volume
///
/// A bar closing above its open counts its full volume as buying, below as
/// selling; dojis count as zero. The trend compares the CVD change across
/// the trailing window with the volume traded in that window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeVolumeDelta {
    /// CVD after each bar
    pub series: Vec<f64>,
    pub value: f64,
    /// CVD change across the trailing window
    pub window_change: f64,
    pub window_volume: f64,
    pub trend: MarketBias,
}

pub fn volume_delta(bar: &Bar) -> f64 {
    if bar.close > bar.open {
        bar.volume
    } else if bar.close < bar.open {
        -bar.volume
    } else {
        0.0
    }
}

/// Build the CVD series and classify its trend over the last `window` bars.
///
/// `neutral_band_pct` is the share of window volume (percent) the change must
/// exceed to count as a trend.
pub fn cumulative_volume_delta(
    bars: &[Bar],
    window: usize,
    neutral_band_pct: f64,
) -> CumulativeVolumeDelta {
    let mut running = 0.0;
    let series: Vec<f64> = bars
        .iter()
        .map(|bar| {
            running += volume_delta(bar);
            running
        })
        .collect();

    let value = series.last().copied().unwrap_or(0.0);
    let start = series.len().saturating_sub(window);
    let baseline = if start == 0 { 0.0 } else { series[start - 1] };
    let window_change = value - baseline;
    let window_volume: f64 = bars[start..].iter().map(|b| b.volume).sum();

    let band = window_volume * neutral_band_pct / 100.0;
    let trend = if window_change > band {
        MarketBias::Bullish
    } else if window_change < -band {
        MarketBias::Bearish
    } else {
        MarketBias::Neutral
    };

    CumulativeVolumeDelta {
        series,
        value,
        window_change,
        window_volume,
        trend,
    }
}
