//! Port interfaces to the collaborators the engine does not own:
//! market data, zone persistence and alert delivery.

use crate::domain::market::Bar;
use crate::domain::zones::{TestResult, Zone, ZoneEvent};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Most recent `lookback` bars for `symbol`, oldest first.
    async fn get_history(&self, symbol: &str, lookback: usize) -> Result<Vec<Bar>>;

    /// Latest traded price, `None` when the source has no quote.
    async fn get_current_price(&self, symbol: &str) -> Result<Option<f64>>;
}

#[async_trait]
pub trait ZoneStore: Send + Sync {
    /// Insert or replace a zone (last writer wins per id). Returns the zone id.
    async fn save_zone(&self, zone: &Zone) -> Result<String>;

    /// Active zones of `symbol` whose nearer edge lies within `distance_pct`
    /// percent of `price` (zones containing the price included).
    async fn get_zones_near_price(
        &self,
        symbol: &str,
        price: f64,
        distance_pct: f64,
    ) -> Result<Vec<Zone>>;

    async fn mark_zone_broken(&self, zone_id: &str) -> Result<()>;

    async fn get_zone_test_history(&self, zone_id: &str) -> Result<Vec<TestResult>>;

    async fn record_zone_test(&self, test: TestResult) -> Result<()>;
}

/// Outbound alert delivery. Fire-and-forget: callers log failures and move on.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn emit(&self, event: &ZoneEvent) -> Result<()>;
}
