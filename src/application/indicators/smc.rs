//! Smart Money Concepts (SMC) primitives
//!
//! Institutional footprints read off the bar series:
//! 1. Order Blocks (OB): last opposite-colored candle before a candle that
//!    closes through it.
//! 2. Fair Value Gaps (FVG): three-candle imbalances, tracked until filled.
//! 3. Market Structure: Break of Structure (BOS) and Change of Character (CHoCH).
//! 4. Liquidity Pools: clusters of equal highs/lows, tracked until swept.

use super::MarketBias;
use super::swings::{SwingKind, SwingPoint, swing_highs, swing_lows};
use crate::domain::market::Bar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBlock {
    pub index: usize,
    pub bias: MarketBias,
    pub top: f64,
    pub bottom: f64,
    /// 0..100, from the breaking candle's relative volume and follow-through
    pub strength: f64,
    /// A later candle traded through the block's far edge
    pub mitigated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairValueGap {
    /// Index of the middle (impulse) candle
    pub index: usize,
    pub bias: MarketBias,
    pub top: f64,
    pub bottom: f64,
    /// A later candle re-entered at least half of the gap
    pub filled: bool,
}

impl FairValueGap {
    pub fn size(&self) -> f64 {
        self.top - self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureBreakKind {
    /// Break in the direction of the prevailing trend
    BreakOfStructure,
    /// Break against the prevailing trend; flips it
    ChangeOfCharacter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureBreak {
    /// Bar whose close broke the level
    pub index: usize,
    pub kind: StructureBreakKind,
    pub direction: MarketBias,
    /// The swing level that was broken
    pub level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStructure {
    pub breaks: Vec<StructureBreak>,
    pub trend: MarketBias,
}

impl MarketStructure {
    pub fn last_break(&self) -> Option<&StructureBreak> {
        self.breaks.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquiditySide {
    /// Resting above equal highs
    BuySide,
    /// Resting below equal lows
    SellSide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityPool {
    pub side: LiquiditySide,
    /// Mean of the clustered swing prices
    pub level: f64,
    /// Highest (buy side) or lowest (sell side) clustered price
    pub extreme: f64,
    pub touches: usize,
    pub last_index: usize,
    pub swept: bool,
}

fn mean_volume(bars: &[Bar]) -> f64 {
    if bars.is_empty() {
        return 0.0;
    }
    bars.iter().map(|b| b.volume).sum::<f64>() / bars.len() as f64
}

/// Detect order blocks.
///
/// Bullish: a bearish candle immediately followed by a candle that closes
/// above its high. Bearish mirrors. Strength combines the breaking candle's
/// volume relative to the series mean and how far it closed beyond the block.
pub fn detect_order_blocks(bars: &[Bar]) -> Vec<OrderBlock> {
    let avg_volume = mean_volume(bars);
    let mut blocks = Vec::new();

    for i in 0..bars.len().saturating_sub(1) {
        let candle = &bars[i];
        let breaker = &bars[i + 1];

        let bias = if candle.is_bearish() && breaker.close > candle.high {
            MarketBias::Bullish
        } else if candle.is_bullish() && breaker.close < candle.low {
            MarketBias::Bearish
        } else {
            continue;
        };

        let relative_volume = if avg_volume > 0.0 {
            breaker.volume / avg_volume
        } else {
            0.0
        };
        let impulse_pct = match bias {
            MarketBias::Bullish => (breaker.close - candle.high) / candle.high * 100.0,
            _ => (candle.low - breaker.close) / candle.low * 100.0,
        };
        let strength = (relative_volume * 40.0 + impulse_pct * 10.0).clamp(0.0, 100.0);

        let later = &bars[i + 2..];
        let mitigated = match bias {
            MarketBias::Bullish => later.iter().any(|b| b.low < candle.low),
            _ => later.iter().any(|b| b.high > candle.high),
        };

        blocks.push(OrderBlock {
            index: i,
            bias,
            top: candle.high,
            bottom: candle.low,
            strength,
            mitigated,
        });
    }

    blocks
}

/// Detect fair value gaps.
///
/// Bullish: low of candle 3 above the high of candle 1. Filled once a later
/// candle trades down through the gap midpoint. Bearish mirrors.
pub fn detect_fair_value_gaps(bars: &[Bar], min_size_pct: f64) -> Vec<FairValueGap> {
    let mut gaps = Vec::new();

    for i in 0..bars.len().saturating_sub(2) {
        let first = &bars[i];
        let third = &bars[i + 2];

        let (bias, top, bottom) = if third.low > first.high {
            (MarketBias::Bullish, third.low, first.high)
        } else if third.high < first.low {
            (MarketBias::Bearish, first.low, third.high)
        } else {
            continue;
        };

        if bottom <= 0.0 || (top - bottom) / bottom * 100.0 < min_size_pct {
            continue;
        }

        let midpoint = (top + bottom) / 2.0;
        let later = &bars[i + 3..];
        let filled = match bias {
            MarketBias::Bullish => later.iter().any(|b| b.low <= midpoint),
            _ => later.iter().any(|b| b.high >= midpoint),
        };

        gaps.push(FairValueGap {
            index: i + 1,
            bias,
            top,
            bottom,
            filled,
        });
    }

    gaps
}

/// Walk the bars in order, breaking confirmed swing levels on closes.
///
/// A swing only becomes usable `swing_strength` bars after it prints, and
/// each level breaks at most once. From a neutral start the first break is a
/// BOS that sets the trend.
pub fn analyze_market_structure(bars: &[Bar], swing_strength: usize) -> MarketStructure {
    let highs = swing_highs(bars, swing_strength);
    let lows = swing_lows(bars, swing_strength);

    let mut trend = MarketBias::Neutral;
    let mut breaks = Vec::new();
    let mut active_high: Option<SwingPoint> = None;
    let mut active_low: Option<SwingPoint> = None;
    let (mut next_high, mut next_low) = (0, 0);

    for (index, bar) in bars.iter().enumerate() {
        while next_high < highs.len() && highs[next_high].index + swing_strength <= index {
            active_high = Some(highs[next_high]);
            next_high += 1;
        }
        while next_low < lows.len() && lows[next_low].index + swing_strength <= index {
            active_low = Some(lows[next_low]);
            next_low += 1;
        }

        if let Some(high) = active_high {
            if bar.close > high.price {
                let kind = if trend == MarketBias::Bearish {
                    StructureBreakKind::ChangeOfCharacter
                } else {
                    StructureBreakKind::BreakOfStructure
                };
                breaks.push(StructureBreak {
                    index,
                    kind,
                    direction: MarketBias::Bullish,
                    level: high.price,
                });
                trend = MarketBias::Bullish;
                active_high = None;
            }
        }

        if let Some(low) = active_low {
            if bar.close < low.price {
                let kind = if trend == MarketBias::Bullish {
                    StructureBreakKind::ChangeOfCharacter
                } else {
                    StructureBreakKind::BreakOfStructure
                };
                breaks.push(StructureBreak {
                    index,
                    kind,
                    direction: MarketBias::Bearish,
                    level: low.price,
                });
                trend = MarketBias::Bearish;
                active_low = None;
            }
        }
    }

    MarketStructure { breaks, trend }
}

/// Cluster equal highs / equal lows into liquidity pools.
///
/// Swings are grouped in price order while within `tolerance_pct` of the
/// group's first price; groups of two or more become pools. A pool is swept
/// once any bar after its last swing trades beyond its extreme.
pub fn detect_liquidity_pools(
    bars: &[Bar],
    swing_strength: usize,
    tolerance_pct: f64,
) -> Vec<LiquidityPool> {
    let mut pools = cluster_pools(bars, &swing_highs(bars, swing_strength), tolerance_pct);
    pools.extend(cluster_pools(
        bars,
        &swing_lows(bars, swing_strength),
        tolerance_pct,
    ));
    pools
}

fn cluster_pools(bars: &[Bar], swings: &[SwingPoint], tolerance_pct: f64) -> Vec<LiquidityPool> {
    let Some(first) = swings.first() else {
        return Vec::new();
    };
    let side = match first.kind {
        SwingKind::High => LiquiditySide::BuySide,
        SwingKind::Low => LiquiditySide::SellSide,
    };

    let mut sorted: Vec<SwingPoint> = swings.to_vec();
    sorted.sort_by(|a, b| a.price.total_cmp(&b.price));

    let mut clusters: Vec<Vec<SwingPoint>> = Vec::new();
    for swing in sorted {
        match clusters.last_mut() {
            Some(cluster) if (swing.price - cluster[0].price).abs() / cluster[0].price * 100.0 <= tolerance_pct => {
                cluster.push(swing);
            }
            _ => clusters.push(vec![swing]),
        }
    }

    clusters
        .into_iter()
        .filter(|cluster| cluster.len() >= 2)
        .map(|cluster| {
            let level = cluster.iter().map(|s| s.price).sum::<f64>() / cluster.len() as f64;
            let last_index = cluster.iter().map(|s| s.index).max().unwrap_or(0);
            let later = bars.get(last_index + 1..).unwrap_or(&[]);
            let (extreme, swept) = match side {
                LiquiditySide::BuySide => {
                    let extreme = cluster.iter().map(|s| s.price).fold(f64::NEG_INFINITY, f64::max);
                    (extreme, later.iter().any(|b| b.high > extreme))
                }
                LiquiditySide::SellSide => {
                    let extreme = cluster.iter().map(|s| s.price).fold(f64::INFINITY, f64::min);
                    (extreme, later.iter().any(|b| b.low < extreme))
                }
            };

            LiquidityPool {
                side,
                level,
                extreme,
                touches: cluster.len(),
                last_index,
                swept,
            }
        })
        .collect()
}
