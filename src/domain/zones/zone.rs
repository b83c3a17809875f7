use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Side of the market a zone is expected to attract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneType {
    Demand,
    Supply,
}

impl ZoneType {
    pub fn is_demand(&self) -> bool {
        matches!(self, ZoneType::Demand)
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneType::Demand => write!(f, "DEMAND"),
            ZoneType::Supply => write!(f, "SUPPLY"),
        }
    }
}

/// Lifecycle state of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneStatus {
    /// Never revisited since formation
    Fresh,
    /// Revisited once or twice
    Tested,
    /// Revisited three times or more
    Weak,
    /// Price closed through the zone; terminal
    Broken,
}

impl ZoneStatus {
    /// Status implied by the number of revisits, ignoring breaks.
    pub fn from_test_count(test_count: u32) -> Self {
        match test_count {
            0 => ZoneStatus::Fresh,
            1 | 2 => ZoneStatus::Tested,
            _ => ZoneStatus::Weak,
        }
    }
}

impl fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneStatus::Fresh => write!(f, "FRESH"),
            ZoneStatus::Tested => write!(f, "TESTED"),
            ZoneStatus::Weak => write!(f, "WEAK"),
            ZoneStatus::Broken => write!(f, "BROKEN"),
        }
    }
}

/// Where a price sits relative to a zone's [bottom, top] band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricePosition {
    Above,
    Inside,
    Below,
}

/// A supply or demand price band.
///
/// # Invariants
///
/// - `zone_bottom < zone_top`
/// - `zone_midpoint == (zone_top + zone_bottom) / 2`
/// - `strength_score` in `[0, 100]`
/// - once `status == Broken`, the zone is inactive and stays broken
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Zone {
    pub id: String,
    pub symbol: String,
    pub zone_type: ZoneType,
    pub zone_top: f64,
    pub zone_bottom: f64,
    pub zone_midpoint: f64,
    /// Timestamp (epoch ms) of the swing bar the zone formed on
    pub formed_at: i64,
    /// Index of the swing bar in the series handed to the detector
    pub formation_index: usize,
    pub approach_volume: f64,
    pub departure_volume: f64,
    pub volume_ratio: f64,
    /// Move of the departure leg beyond the zone edge, in percent
    pub impulse_pct: f64,
    pub strength_score: f64,
    pub status: ZoneStatus,
    pub test_count: u32,
    pub is_active: bool,
}

impl Zone {
    /// Build a fresh zone. Returns `None` when the bounds are not a valid band.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: &str,
        zone_type: ZoneType,
        zone_top: f64,
        zone_bottom: f64,
        formed_at: i64,
        formation_index: usize,
        approach_volume: f64,
        departure_volume: f64,
        impulse_pct: f64,
        strength_score: f64,
    ) -> Option<Self> {
        if !(zone_bottom < zone_top) || !zone_bottom.is_finite() || !zone_top.is_finite() {
            return None;
        }

        let volume_ratio = if approach_volume > 0.0 {
            departure_volume / approach_volume
        } else {
            0.0
        };

        Some(Self {
            id: Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            zone_type,
            zone_top,
            zone_bottom,
            zone_midpoint: (zone_top + zone_bottom) / 2.0,
            formed_at,
            formation_index,
            approach_volume,
            departure_volume,
            volume_ratio,
            impulse_pct,
            strength_score: strength_score.clamp(0.0, 100.0),
            status: ZoneStatus::Fresh,
            test_count: 0,
            is_active: true,
        })
    }

    pub fn height(&self) -> f64 {
        self.zone_top - self.zone_bottom
    }

    /// Zone height as a percentage of its bottom edge
    pub fn size_pct(&self) -> f64 {
        if self.zone_bottom > 0.0 {
            self.height() / self.zone_bottom * 100.0
        } else {
            0.0
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.zone_bottom && price <= self.zone_top
    }

    /// True when both closed ranges share at least one price.
    pub fn overlaps(&self, bottom: f64, top: f64) -> bool {
        self.zone_bottom <= top && bottom <= self.zone_top
    }

    pub fn position_of(&self, price: f64) -> PricePosition {
        if price > self.zone_top {
            PricePosition::Above
        } else if price < self.zone_bottom {
            PricePosition::Below
        } else {
            PricePosition::Inside
        }
    }

    /// Signed percentage distance from `price` to the nearer breached edge.
    /// Positive above the zone, negative below, zero inside.
    pub fn distance_pct(&self, price: f64) -> f64 {
        match self.position_of(price) {
            PricePosition::Above => (price - self.zone_top) / self.zone_top * 100.0,
            PricePosition::Below => (price - self.zone_bottom) / self.zone_bottom * 100.0,
            PricePosition::Inside => 0.0,
        }
    }

    /// Price level past which the zone is invalidated: half a zone height
    /// beyond the edge on the losing side.
    pub fn invalidation_level(&self, break_height_fraction: f64) -> f64 {
        match self.zone_type {
            ZoneType::Demand => self.zone_bottom - self.height() * break_height_fraction,
            ZoneType::Supply => self.zone_top + self.height() * break_height_fraction,
        }
    }

    pub fn is_invalidated_by(&self, price: f64, break_height_fraction: f64) -> bool {
        let level = self.invalidation_level(break_height_fraction);
        match self.zone_type {
            ZoneType::Demand => price <= level,
            ZoneType::Supply => price >= level,
        }
    }

    /// Terminal transition. Idempotent.
    pub fn mark_broken(&mut self) {
        self.status = ZoneStatus::Broken;
        self.is_active = false;
    }

    /// Count a revisit and re-derive the status, unless already broken.
    pub fn record_test(&mut self) {
        self.test_count += 1;
        if self.status != ZoneStatus::Broken {
            self.status = ZoneStatus::from_test_count(self.test_count);
        }
    }
}

/// Outcome of one revisit of a zone, as kept by the zone store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub zone_id: String,
    pub tested_at: i64,
    pub price: f64,
    /// Whether the zone held (price reacted) or failed on this visit
    pub held: bool,
}
