use serde::{Deserialize, Serialize};

/// One OHLCV bar. Series are ordered by `timestamp` (epoch milliseconds) and
/// never modified once ingested.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Finite prices, `high >= low` and non-negative volume.
    pub fn is_well_formed(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
            && self.high >= self.low
            && self.volume >= 0.0
    }
}

// Lets bars feed `ta` indicators (ATR needs High + Low + Close) directly.
impl ta::Open for Bar {
    fn open(&self) -> f64 {
        self.open
    }
}

impl ta::High for Bar {
    fn high(&self) -> f64 {
        self.high
    }
}

impl ta::Low for Bar {
    fn low(&self) -> f64 {
        self.low
    }
}

impl ta::Close for Bar {
    fn close(&self) -> f64 {
        self.close
    }
}

impl ta::Volume for Bar {
    fn volume(&self) -> f64 {
        self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_direction() {
        let up = Bar::new(0, 100.0, 105.0, 99.0, 104.0, 1000.0);
        let down = Bar::new(0, 104.0, 105.0, 99.0, 100.0, 1000.0);
        let doji = Bar::new(0, 100.0, 101.0, 99.0, 100.0, 1000.0);

        assert!(up.is_bullish() && !up.is_bearish());
        assert!(down.is_bearish() && !down.is_bullish());
        assert!(!doji.is_bullish() && !doji.is_bearish());
        assert_eq!(up.range(), 6.0);
    }

    #[test]
    fn test_malformed_bars_detected() {
        assert!(Bar::new(0, 100.0, 105.0, 99.0, 104.0, 1000.0).is_well_formed());
        assert!(!Bar::new(0, 100.0, 99.0, 104.0, 100.0, 1000.0).is_well_formed());
        assert!(!Bar::new(0, 100.0, f64::NAN, 99.0, 100.0, 1000.0).is_well_formed());
        assert!(!Bar::new(0, 100.0, 105.0, 99.0, 100.0, -1.0).is_well_formed());
    }
}
