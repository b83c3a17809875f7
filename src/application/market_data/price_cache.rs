use crate::domain::errors::MarketDataError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    price: f64,
    fetched_at: Instant,
}

type Slot = Arc<Mutex<Option<CachedPrice>>>;

/// Current-price cache with a TTL, sharded per symbol.
///
/// Each symbol owns an async mutex held across the fetch, so concurrent misses
/// for one symbol trigger a single fetch while other symbols proceed.
pub struct PriceCache {
    ttl: Duration,
    slots: RwLock<HashMap<String, Slot>>,
}

impl std::fmt::Debug for PriceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceCache")
            .field("ttl", &self.ttl)
            .field("slots", &"<RwLock>")
            .finish()
    }
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: RwLock::new(HashMap::new()),
        }
    }

    fn slot(&self, symbol: &str) -> Slot {
        let existing = match self.slots.read() {
            Ok(guard) => guard.get(symbol).cloned(),
            Err(poisoned) => poisoned.into_inner().get(symbol).cloned(),
        };
        if let Some(slot) = existing {
            return slot;
        }

        let mut guard = match self.slots.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::error!("PriceCache: Lock poisoned during write, recovering");
                poisoned.into_inner()
            }
        };
        guard
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }

    /// Cached price if still fresh, otherwise the result of `fetch`.
    /// Failed fetches are not cached.
    pub async fn get_or_fetch<F, Fut>(&self, symbol: &str, fetch: F) -> Result<f64, MarketDataError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<f64, MarketDataError>>,
    {
        let slot = self.slot(symbol);
        let mut entry = slot.lock().await;

        if let Some(cached) = *entry {
            if cached.fetched_at.elapsed() < self.ttl {
                return Ok(cached.price);
            }
        }

        let price = fetch().await?;
        *entry = Some(CachedPrice {
            price,
            fetched_at: Instant::now(),
        });
        tracing::debug!("PriceCache: refreshed {} at {:.4}", symbol, price);
        Ok(price)
    }

    /// Drop a symbol's cached price so the next read fetches.
    pub async fn invalidate(&self, symbol: &str) {
        *self.slot(symbol).lock().await = None;
    }
}
