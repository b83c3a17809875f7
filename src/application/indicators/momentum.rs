//! Momentum and volatility readings: RSI, MACD, EMA alignment, ATR levels.
//!
//! All series are streamed through the `ta` indicators, one pass per call.
//! A reading is `None` until the series is long enough for the indicator to
//! have settled.

use super::MarketBias;
use crate::domain::market::Bar;
use crate::domain::zones::TradeDirection;
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::{
    AverageTrueRange, ExponentialMovingAverage, MovingAverageConvergenceDivergence,
    RelativeStrengthIndex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiCondition {
    Oversold,
    Neutral,
    Overbought,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: f64,
    pub condition: RsiCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacdState {
    BullishCrossover,
    BearishCrossover,
    Bullish,
    Bearish,
    Neutral,
}

impl MacdState {
    pub fn bias(&self) -> MarketBias {
        match self {
            MacdState::BullishCrossover | MacdState::Bullish => MarketBias::Bullish,
            MacdState::BearishCrossover | MacdState::Bearish => MarketBias::Bearish,
            MacdState::Neutral => MarketBias::Neutral,
        }
    }

    pub fn is_crossover(&self) -> bool {
        matches!(self, MacdState::BullishCrossover | MacdState::BearishCrossover)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub previous_histogram: f64,
    pub state: MacdState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmaAlignment {
    /// price > fast > mid > slow
    BullishAligned,
    /// price < fast < mid < slow
    BearishAligned,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaReading {
    pub price: f64,
    pub ema_fast: Option<f64>,
    pub ema_mid: Option<f64>,
    pub ema_slow: Option<f64>,
    pub alignment: EmaAlignment,
}

impl EmaReading {
    /// Direction of the fast EMA against the mid EMA, when both exist.
    pub fn short_term_bias(&self) -> MarketBias {
        match (self.ema_fast, self.ema_mid) {
            (Some(fast), Some(mid)) if fast > mid => MarketBias::Bullish,
            (Some(fast), Some(mid)) if fast < mid => MarketBias::Bearish,
            _ => MarketBias::Neutral,
        }
    }
}

/// ATR-derived stop and targets around an entry price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtrLevels {
    pub atr: f64,
    pub entry: f64,
    pub stop_loss: f64,
    /// 1:2 reward-to-risk
    pub target_1: f64,
    /// 1:3 reward-to-risk
    pub target_2: f64,
}

pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    let Ok(mut rsi) = RelativeStrengthIndex::new(period) else {
        return Vec::new();
    };
    closes.iter().map(|&c| rsi.next(c)).collect()
}

pub fn ema_series(closes: &[f64], period: usize) -> Vec<f64> {
    let Ok(mut ema) = ExponentialMovingAverage::new(period) else {
        return Vec::new();
    };
    closes.iter().map(|&c| ema.next(c)).collect()
}

pub fn atr_series(bars: &[Bar], period: usize) -> Vec<f64> {
    let Ok(mut atr) = AverageTrueRange::new(period) else {
        return Vec::new();
    };
    bars.iter().map(|bar| atr.next(bar)).collect()
}

pub fn rsi(bars: &[Bar], period: usize, oversold: f64, overbought: f64) -> Option<RsiReading> {
    if bars.len() <= period {
        return None;
    }
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let value = *rsi_series(&closes, period).last()?;

    let condition = if value < oversold {
        RsiCondition::Oversold
    } else if value > overbought {
        RsiCondition::Overbought
    } else {
        RsiCondition::Neutral
    };

    Some(RsiReading { value, condition })
}

/// MACD with a histogram crossover check on the last bar.
pub fn macd(bars: &[Bar], fast: usize, slow: usize, signal: usize) -> Option<MacdReading> {
    if bars.len() < slow + signal {
        return None;
    }
    let mut indicator = MovingAverageConvergenceDivergence::new(fast, slow, signal).ok()?;

    let mut previous_histogram = 0.0;
    let mut last = None;
    for bar in bars {
        let output = indicator.next(bar.close);
        if let Some((_, _, hist)) = last {
            previous_histogram = hist;
        }
        last = Some((output.macd, output.signal, output.histogram));
    }
    let (macd, signal, histogram) = last?;

    let state = if previous_histogram <= 0.0 && histogram > 0.0 {
        MacdState::BullishCrossover
    } else if previous_histogram >= 0.0 && histogram < 0.0 {
        MacdState::BearishCrossover
    } else if histogram > 0.0 {
        MacdState::Bullish
    } else if histogram < 0.0 {
        MacdState::Bearish
    } else {
        MacdState::Neutral
    };

    Some(MacdReading {
        macd,
        signal,
        histogram,
        previous_histogram,
        state,
    })
}

/// Fast/mid/slow EMA stack. Alignment is only judged when all three exist.
pub fn ema_alignment(bars: &[Bar], fast: usize, mid: usize, slow: usize) -> Option<EmaReading> {
    let price = bars.last()?.close;
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let settled = |period: usize| -> Option<f64> {
        if closes.len() < period {
            return None;
        }
        ema_series(&closes, period).last().copied()
    };

    let ema_fast = settled(fast);
    let ema_mid = settled(mid);
    let ema_slow = settled(slow);

    let alignment = match (ema_fast, ema_mid, ema_slow) {
        (Some(f), Some(m), Some(s)) if price > f && f > m && m > s => EmaAlignment::BullishAligned,
        (Some(f), Some(m), Some(s)) if price < f && f < m && m < s => EmaAlignment::BearishAligned,
        _ => EmaAlignment::Mixed,
    };

    Some(EmaReading {
        price,
        ema_fast,
        ema_mid,
        ema_slow,
        alignment,
    })
}

/// Latest ATR, once `period` true ranges past the first bar are available.
pub fn atr(bars: &[Bar], period: usize) -> Option<f64> {
    if bars.len() <= period {
        return None;
    }
    atr_series(bars, period).last().copied()
}

/// Stop at `multiplier` ATRs against the trade, targets at 2R and 3R.
pub fn atr_levels(atr: f64, entry: f64, direction: TradeDirection, multiplier: f64) -> AtrLevels {
    let risk = atr * multiplier;
    let (stop_loss, target_1, target_2) = match direction {
        TradeDirection::Long => (entry - risk, entry + 2.0 * risk, entry + 3.0 * risk),
        TradeDirection::Short => (entry + risk, entry - 2.0 * risk, entry - 3.0 * risk),
    };

    AtrLevels {
        atr,
        entry,
        stop_loss,
        target_1,
        target_2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(start: f64, step: f64, count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let close = start + step * i as f64;
                Bar::new(i as i64, close - step / 2.0, close + 1.0, close - 1.0, close, 1000.0)
            })
            .collect()
    }

    #[test]
    fn test_rsi_extremes() {
        let rising = trend(100.0, 1.0, 40);
        let reading = rsi(&rising, 14, 30.0, 70.0).unwrap();
        assert!(reading.value > 70.0);
        assert_eq!(reading.condition, RsiCondition::Overbought);

        let falling = trend(200.0, -1.0, 40);
        let reading = rsi(&falling, 14, 30.0, 70.0).unwrap();
        assert!(reading.value < 30.0);
        assert_eq!(reading.condition, RsiCondition::Oversold);
    }

    #[test]
    fn test_rsi_needs_period_plus_one() {
        assert!(rsi(&trend(100.0, 1.0, 14), 14, 30.0, 70.0).is_none());
        assert!(rsi(&trend(100.0, 1.0, 15), 14, 30.0, 70.0).is_some());
    }

    #[test]
    fn test_macd_bullish_in_uptrend() {
        let bars = trend(100.0, 0.5, 60);
        let reading = macd(&bars, 12, 26, 9).unwrap();
        assert!(reading.macd > 0.0);
        assert_eq!(reading.state.bias(), MarketBias::Bullish);
    }

    #[test]
    fn test_macd_crossover_after_reversal() {
        // Long decline, then a sharp rally: histogram turns positive at some point
        let mut bars = trend(150.0, -0.5, 60);
        let last = bars.last().unwrap().close;
        let mut saw_crossover = false;
        for i in 0..30 {
            let close = last + 2.0 * (i + 1) as f64;
            bars.push(Bar::new(100 + i, close - 1.0, close + 1.0, close - 1.5, close, 1000.0));
            if let Some(reading) = macd(&bars, 12, 26, 9) {
                if reading.state == MacdState::BullishCrossover {
                    saw_crossover = true;
                    assert!(reading.previous_histogram <= 0.0 && reading.histogram > 0.0);
                    break;
                }
            }
        }
        assert!(saw_crossover);
    }

    #[test]
    fn test_ema_alignment() {
        let up = trend(100.0, 1.0, 250);
        let reading = ema_alignment(&up, 20, 50, 200).unwrap();
        assert_eq!(reading.alignment, EmaAlignment::BullishAligned);
        assert_eq!(reading.short_term_bias(), MarketBias::Bullish);

        let down = trend(400.0, -1.0, 250);
        let reading = ema_alignment(&down, 20, 50, 200).unwrap();
        assert_eq!(reading.alignment, EmaAlignment::BearishAligned);
    }

    #[test]
    fn test_ema_alignment_needs_slow_ema() {
        let up = trend(100.0, 1.0, 120);
        let reading = ema_alignment(&up, 20, 50, 200).unwrap();
        assert!(reading.ema_slow.is_none());
        assert_eq!(reading.alignment, EmaAlignment::Mixed);
        assert_eq!(reading.short_term_bias(), MarketBias::Bullish);
    }

    #[test]
    fn test_atr_levels_long_and_short() {
        let long = atr_levels(2.0, 100.0, TradeDirection::Long, 1.5);
        assert_eq!(long.stop_loss, 97.0);
        assert_eq!(long.target_1, 106.0);
        assert_eq!(long.target_2, 109.0);

        let short = atr_levels(2.0, 100.0, TradeDirection::Short, 1.5);
        assert_eq!(short.stop_loss, 103.0);
        assert_eq!(short.target_1, 94.0);
        assert_eq!(short.target_2, 91.0);
    }

    #[test]
    fn test_atr_constant_range() {
        // Every bar spans exactly 2.0 with no gaps: ATR converges to 2.0
        let bars = trend(100.0, 0.0, 30);
        let value = atr(&bars, 14).unwrap();
        assert!((value - 2.0).abs() < 1e-9);
    }
}
