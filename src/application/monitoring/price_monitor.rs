//! Price Monitor
//!
//! Turns (price, zones) snapshots into zone events. Each (zone, event type)
//! pair fires once until `reset_alert_tracking` clears the dedup set.
//!
//! Rules for a DEMAND zone (SUPPLY mirrors):
//! - inside the band: PRICE_AT_DEMAND (HIGH), counts as a test
//! - above, within `alert_distance_pct`: PRICE_ENTERING_DEMAND (MEDIUM)
//! - previously inside, now above: ZONE_BOUNCE (MEDIUM)
//! - below, beyond `break_distance_pct` or the invalidation level, or already
//!   broken: ZONE_BREAK (LOW) and the zone is marked broken

use crate::domain::config::MonitorConfig;
use crate::domain::errors::ConfigError;
use crate::domain::zones::{
    PricePosition, Priority, Zone, ZoneEvent, ZoneEventType, ZoneStatus, ZoneType,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::{debug, info};

/// Last known position per zone. Zones not checked since the previous
/// alert reset are dropped at the next one.
#[derive(Debug, Default)]
struct PositionTracker {
    positions: HashMap<String, PricePosition>,
    seen: HashSet<String>,
}

impl PositionTracker {
    fn swap(&mut self, zone_id: &str, position: PricePosition) -> Option<PricePosition> {
        self.seen.insert(zone_id.to_string());
        self.positions.insert(zone_id.to_string(), position)
    }

    fn forget(&mut self, zone_id: &str) {
        self.positions.remove(zone_id);
        self.seen.remove(zone_id);
    }

    fn prune_unseen(&mut self) -> usize {
        let before = self.positions.len();
        let seen = &self.seen;
        self.positions.retain(|id, _| seen.contains(id));
        self.seen.clear();
        before - self.positions.len()
    }
}

pub struct PriceMonitor {
    config: MonitorConfig,
    sent: Mutex<HashSet<(String, ZoneEventType)>>,
    last_positions: Mutex<PositionTracker>,
}

impl std::fmt::Debug for PriceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceMonitor")
            .field("config", &self.config)
            .field("sent", &"<Mutex>")
            .finish()
    }
}

impl PriceMonitor {
    pub fn new(config: MonitorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            sent: Mutex::new(HashSet::new()),
            last_positions: Mutex::new(PositionTracker::default()),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Evaluate `current_price` against every zone, mutating zones that get
    /// tested or broken. Retired zones are skipped; broken ones can still
    /// report their break.
    pub fn check(&self, zones: &mut [Zone], current_price: f64, now_ms: i64) -> Vec<ZoneEvent> {
        let mut events = Vec::new();

        for zone in zones.iter_mut() {
            if !zone.is_active && zone.status != ZoneStatus::Broken {
                self.forget_position(&zone.id);
                continue;
            }

            let position = zone.position_of(current_price);
            let distance_pct = zone.distance_pct(current_price);
            let previous = self.swap_position(&zone.id, position);

            if self.is_break(zone, position, distance_pct, current_price) {
                if self.mark_sent(&zone.id, ZoneEventType::ZoneBreak) {
                    info!(
                        "PriceMonitor: {} {} zone [{:.2}-{:.2}] broken at {:.2}",
                        zone.symbol, zone.zone_type, zone.zone_bottom, zone.zone_top, current_price
                    );
                    events.push(ZoneEvent::new(
                        zone,
                        ZoneEventType::ZoneBreak,
                        current_price,
                        distance_pct,
                        Priority::Low,
                        now_ms,
                    ));
                }
                zone.mark_broken();
                self.forget_position(&zone.id);
                continue;
            }

            if zone.status == ZoneStatus::Broken {
                continue;
            }

            let approach_side = match zone.zone_type {
                ZoneType::Demand => PricePosition::Above,
                ZoneType::Supply => PricePosition::Below,
            };

            if position == PricePosition::Inside {
                let event_type = ZoneEventType::at(zone.zone_type);
                if self.mark_sent(&zone.id, event_type) {
                    zone.record_test();
                    events.push(ZoneEvent::new(
                        zone,
                        event_type,
                        current_price,
                        distance_pct,
                        Priority::High,
                        now_ms,
                    ));
                }
            } else if position == approach_side {
                if previous == Some(PricePosition::Inside)
                    && self.mark_sent(&zone.id, ZoneEventType::ZoneBounce)
                {
                    events.push(ZoneEvent::new(
                        zone,
                        ZoneEventType::ZoneBounce,
                        current_price,
                        distance_pct,
                        Priority::Medium,
                        now_ms,
                    ));
                }

                let event_type = ZoneEventType::entering(zone.zone_type);
                if distance_pct.abs() <= self.config.alert_distance_pct
                    && self.mark_sent(&zone.id, event_type)
                {
                    events.push(ZoneEvent::new(
                        zone,
                        event_type,
                        current_price,
                        distance_pct,
                        Priority::Medium,
                        now_ms,
                    ));
                }
            }
        }

        if !events.is_empty() {
            debug!("PriceMonitor: {} events at {:.2}", events.len(), current_price);
        }
        events
    }

    /// Forget which alerts were sent. Last known positions survive only for
    /// zones checked since the previous reset.
    pub fn reset_alert_tracking(&self) {
        let mut sent = match self.sent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("PriceMonitor: Lock poisoned during reset, recovering");
                poisoned.into_inner()
            }
        };
        let cleared = sent.len();
        sent.clear();
        drop(sent);

        let pruned = self.with_positions(PositionTracker::prune_unseen);
        info!(
            "PriceMonitor: alert tracking reset ({} entries cleared, {} stale positions pruned)",
            cleared, pruned
        );
    }

    fn is_break(
        &self,
        zone: &Zone,
        position: PricePosition,
        distance_pct: f64,
        current_price: f64,
    ) -> bool {
        let invalidating_side = match zone.zone_type {
            ZoneType::Demand => PricePosition::Below,
            ZoneType::Supply => PricePosition::Above,
        };
        if position != invalidating_side {
            return false;
        }

        zone.status == ZoneStatus::Broken
            || distance_pct.abs() > self.config.break_distance_pct
            || zone.is_invalidated_by(current_price, self.config.break_height_fraction)
    }

    /// True the first time a (zone, event) pair is seen since the last reset.
    fn mark_sent(&self, zone_id: &str, event_type: ZoneEventType) -> bool {
        let key = (zone_id.to_string(), event_type);
        match self.sent.lock() {
            Ok(mut guard) => guard.insert(key),
            Err(poisoned) => {
                tracing::error!("PriceMonitor: Lock poisoned during write, recovering");
                poisoned.into_inner().insert(key)
            }
        }
    }

    fn with_positions<R>(&self, f: impl FnOnce(&mut PositionTracker) -> R) -> R {
        match self.last_positions.lock() {
            Ok(mut guard) => f(&mut *guard),
            Err(poisoned) => f(&mut *poisoned.into_inner()),
        }
    }

    fn swap_position(&self, zone_id: &str, position: PricePosition) -> Option<PricePosition> {
        self.with_positions(|tracker| tracker.swap(zone_id, position))
    }

    fn forget_position(&self, zone_id: &str) {
        self.with_positions(|tracker| tracker.forget(zone_id));
    }

    #[cfg(test)]
    fn tracked_positions(&self) -> usize {
        self.with_positions(|tracker| tracker.positions.len())
    }
}
