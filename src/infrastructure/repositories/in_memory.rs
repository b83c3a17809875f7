//! In-Memory Zone Store
//!
//! Thread-safe, in-memory implementation of the `ZoneStore` port.
//!
//! # Features
//!
//! - **Thread-safe**: `Arc<RwLock>` around the zone map and test history
//! - **Last writer wins**: saving a zone replaces any zone with the same id
//! - **Monotonic breaks**: a saved zone never un-breaks a stored broken one
//!
//! Data is lost on restart. A relational backend would map `Zone` and
//! `TestResult` one-to-one onto rows.

use crate::domain::ports::ZoneStore;
use crate::domain::zones::{TestResult, Zone, ZoneStatus};
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct InMemoryZoneStore {
    zones: Arc<RwLock<HashMap<String, Zone>>>,
    tests: Arc<RwLock<HashMap<String, Vec<TestResult>>>>,
}

impl InMemoryZoneStore {
    pub fn new() -> Self {
        Self {
            zones: Arc::new(RwLock::new(HashMap::new())),
            tests: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get_zone(&self, zone_id: &str) -> Option<Zone> {
        self.zones.read().await.get(zone_id).cloned()
    }

    /// All stored zones for a symbol, active or not, strongest first.
    pub async fn zones_for_symbol(&self, symbol: &str) -> Vec<Zone> {
        let mut zones: Vec<Zone> = self
            .zones
            .read()
            .await
            .values()
            .filter(|z| z.symbol == symbol)
            .cloned()
            .collect();
        zones.sort_by(|a, b| b.strength_score.total_cmp(&a.strength_score));
        zones
    }

    pub async fn zone_count(&self) -> usize {
        self.zones.read().await.len()
    }
}

impl Default for InMemoryZoneStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ZoneStore for InMemoryZoneStore {
    async fn save_zone(&self, zone: &Zone) -> Result<String> {
        let mut zones = self.zones.write().await;

        let mut zone = zone.clone();
        if let Some(stored) = zones.get(&zone.id) {
            if stored.status == ZoneStatus::Broken {
                zone.mark_broken();
            }
        }

        let id = zone.id.clone();
        zones.insert(id.clone(), zone);
        Ok(id)
    }

    async fn get_zones_near_price(
        &self,
        symbol: &str,
        price: f64,
        distance_pct: f64,
    ) -> Result<Vec<Zone>> {
        let zones = self.zones.read().await;
        let mut near: Vec<Zone> = zones
            .values()
            .filter(|z| z.symbol == symbol && z.is_active)
            .filter(|z| z.distance_pct(price).abs() <= distance_pct)
            .cloned()
            .collect();
        near.sort_by(|a, b| {
            a.distance_pct(price)
                .abs()
                .total_cmp(&b.distance_pct(price).abs())
        });
        Ok(near)
    }

    async fn mark_zone_broken(&self, zone_id: &str) -> Result<()> {
        let mut zones = self.zones.write().await;
        match zones.get_mut(zone_id) {
            Some(zone) => {
                zone.mark_broken();
                Ok(())
            }
            None => bail!("Zone {} not found", zone_id),
        }
    }

    async fn get_zone_test_history(&self, zone_id: &str) -> Result<Vec<TestResult>> {
        Ok(self
            .tests
            .read()
            .await
            .get(zone_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn record_zone_test(&self, test: TestResult) -> Result<()> {
        self.tests
            .write()
            .await
            .entry(test.zone_id.clone())
            .or_default()
            .push(test);
        Ok(())
    }
}
