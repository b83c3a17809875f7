use crate::domain::errors::MarketDataError;
use crate::domain::market::Bar;
use crate::domain::ports::MarketDataSource;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Timeout and bounded retries around every external fetch.
///
/// Backoff is linear: attempt `n` waits `n * retry_backoff` before retrying.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_retries: 2,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

impl FetchPolicy {
    pub fn new(timeout: Duration, max_retries: u32, retry_backoff: Duration) -> Self {
        Self {
            timeout,
            max_retries,
            retry_backoff,
        }
    }

    /// Run `op` until it succeeds, giving up after `max_retries + 1` attempts.
    pub async fn run<T, F, Fut>(&self, symbol: &str, mut op: F) -> Result<T, MarketDataError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let attempts = self.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => {
                    last_error = format!("{:#}", e);
                }
                Err(_) => {
                    last_error = MarketDataError::Timeout {
                        symbol: symbol.to_string(),
                        duration_ms: self.timeout.as_millis() as u64,
                    }
                    .to_string();
                }
            }

            warn!(
                "FetchPolicy: {} attempt {}/{} failed: {}",
                symbol, attempt, attempts, last_error
            );

            if attempt < attempts {
                tokio::time::sleep(self.retry_backoff * attempt).await;
            }
        }

        Err(MarketDataError::RetriesExhausted {
            symbol: symbol.to_string(),
            attempts,
            last_error,
        })
    }

    pub async fn fetch_history(
        &self,
        source: &dyn MarketDataSource,
        symbol: &str,
        lookback: usize,
    ) -> Result<Vec<Bar>, MarketDataError> {
        self.run(symbol, || source.get_history(symbol, lookback)).await
    }

    /// A source answering "no quote" is not retried.
    pub async fn fetch_price(
        &self,
        source: &dyn MarketDataSource,
        symbol: &str,
    ) -> Result<f64, MarketDataError> {
        self.run(symbol, || source.get_current_price(symbol))
            .await?
            .ok_or_else(|| MarketDataError::NoPrice {
                symbol: symbol.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_retries: u32) -> FetchPolicy {
        FetchPolicy::new(Duration::from_millis(100), max_retries, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = policy(2)
            .run("AAPL", move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(anyhow!("connection reset"))
                    } else {
                        Ok(42.0)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42.0);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_bounded_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<f64, _> = policy(1)
            .run("AAPL", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(anyhow!("503 Service Unavailable")) }
            })
            .await;

        match result {
            Err(MarketDataError::RetriesExhausted {
                attempts,
                last_error,
                ..
            }) => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("503"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_fetch_times_out() {
        let result: Result<f64, _> = policy(0)
            .run("AAPL", || async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(1.0)
            })
            .await;

        match result {
            Err(MarketDataError::RetriesExhausted { last_error, .. }) => {
                assert!(last_error.contains("timed out"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
