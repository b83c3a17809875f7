use crate::domain::market::Bar;
use crate::domain::ports::MarketDataSource;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Programmable market data for tests and dry runs.
///
/// Unknown symbols fail. `fail_next` makes the next N calls for a symbol fail
/// to simulate a flaky upstream.
#[derive(Default)]
pub struct MockMarketDataSource {
    bars: Mutex<HashMap<String, Vec<Bar>>>,
    prices: Mutex<HashMap<String, f64>>,
    failures: Mutex<HashMap<String, usize>>,
    calls: AtomicUsize,
}

impl MockMarketDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bars(&self, symbol: &str, bars: Vec<Bar>) {
        match self.bars.lock() {
            Ok(mut guard) => guard.insert(symbol.to_string(), bars),
            Err(poisoned) => poisoned.into_inner().insert(symbol.to_string(), bars),
        };
    }

    pub fn set_price(&self, symbol: &str, price: f64) {
        match self.prices.lock() {
            Ok(mut guard) => guard.insert(symbol.to_string(), price),
            Err(poisoned) => poisoned.into_inner().insert(symbol.to_string(), price),
        };
    }

    pub fn fail_next(&self, symbol: &str, count: usize) {
        match self.failures.lock() {
            Ok(mut guard) => guard.insert(symbol.to_string(), count),
            Err(poisoned) => poisoned.into_inner().insert(symbol.to_string(), count),
        };
    }

    /// Total calls received, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn consume_failure(&self, symbol: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut failures = match self.failures.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match failures.get_mut(symbol) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(anyhow!("Simulated upstream failure for {}", symbol))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl MarketDataSource for MockMarketDataSource {
    async fn get_history(&self, symbol: &str, lookback: usize) -> Result<Vec<Bar>> {
        self.consume_failure(symbol)?;
        let bars = match self.bars.lock() {
            Ok(guard) => guard.get(symbol).cloned(),
            Err(poisoned) => poisoned.into_inner().get(symbol).cloned(),
        };
        let bars = bars.ok_or_else(|| anyhow!("No history for {}", symbol))?;
        let start = bars.len().saturating_sub(lookback);
        Ok(bars[start..].to_vec())
    }

    async fn get_current_price(&self, symbol: &str) -> Result<Option<f64>> {
        self.consume_failure(symbol)?;
        let price = match self.prices.lock() {
            Ok(guard) => guard.get(symbol).copied(),
            Err(poisoned) => poisoned.into_inner().get(symbol).copied(),
        };
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_respects_lookback() {
        let mock = MockMarketDataSource::new();
        let bars: Vec<Bar> = (0..10)
            .map(|i| Bar::new(i, 1.0, 2.0, 0.5, 1.5 + i as f64, 100.0))
            .collect();
        mock.set_bars("AAPL", bars);

        let history = mock.get_history("AAPL", 3).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].timestamp, 7);
        assert!(mock.get_history("MSFT", 3).await.is_err());
    }

    #[tokio::test]
    async fn test_programmed_failures() {
        let mock = MockMarketDataSource::new();
        mock.set_price("AAPL", 100.0);
        mock.fail_next("AAPL", 2);

        assert!(mock.get_current_price("AAPL").await.is_err());
        assert!(mock.get_current_price("AAPL").await.is_err());
        assert_eq!(mock.get_current_price("AAPL").await.unwrap(), Some(100.0));
        assert_eq!(mock.call_count(), 3);
    }
}
