use super::zone::{Zone, ZoneType};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneEventType {
    PriceEnteringDemand,
    PriceAtDemand,
    PriceEnteringSupply,
    PriceAtSupply,
    ZoneBounce,
    ZoneBreak,
}

impl ZoneEventType {
    pub fn entering(zone_type: ZoneType) -> Self {
        match zone_type {
            ZoneType::Demand => ZoneEventType::PriceEnteringDemand,
            ZoneType::Supply => ZoneEventType::PriceEnteringSupply,
        }
    }

    pub fn at(zone_type: ZoneType) -> Self {
        match zone_type {
            ZoneType::Demand => ZoneEventType::PriceAtDemand,
            ZoneType::Supply => ZoneEventType::PriceAtSupply,
        }
    }

    pub fn is_touch(&self) -> bool {
        matches!(
            self,
            ZoneEventType::PriceAtDemand | ZoneEventType::PriceAtSupply
        )
    }
}

impl fmt::Display for ZoneEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ZoneEventType::PriceEnteringDemand => "PRICE_ENTERING_DEMAND",
            ZoneEventType::PriceAtDemand => "PRICE_AT_DEMAND",
            ZoneEventType::PriceEnteringSupply => "PRICE_ENTERING_SUPPLY",
            ZoneEventType::PriceAtSupply => "PRICE_AT_SUPPLY",
            ZoneEventType::ZoneBounce => "ZONE_BOUNCE",
            ZoneEventType::ZoneBreak => "ZONE_BREAK",
        };
        write!(f, "{}", label)
    }
}

/// Urgency attached to events and recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "LOW"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::High => write!(f, "HIGH"),
        }
    }
}

/// A price/zone transition, flat enough to be a table row or a message payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneEvent {
    pub zone_id: String,
    pub symbol: String,
    pub event_type: ZoneEventType,
    pub zone_type: ZoneType,
    pub zone_top: f64,
    pub zone_bottom: f64,
    pub current_price: f64,
    pub distance_pct: f64,
    pub priority: Priority,
    pub timestamp: i64,
}

impl ZoneEvent {
    pub fn new(
        zone: &Zone,
        event_type: ZoneEventType,
        current_price: f64,
        distance_pct: f64,
        priority: Priority,
        timestamp: i64,
    ) -> Self {
        Self {
            zone_id: zone.id.clone(),
            symbol: zone.symbol.clone(),
            event_type,
            zone_type: zone.zone_type,
            zone_top: zone.zone_top,
            zone_bottom: zone.zone_bottom,
            current_price,
            distance_pct,
            priority,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_by_side() {
        assert_eq!(
            ZoneEventType::entering(ZoneType::Supply),
            ZoneEventType::PriceEnteringSupply
        );
        assert_eq!(ZoneEventType::at(ZoneType::Demand), ZoneEventType::PriceAtDemand);
        assert!(ZoneEventType::PriceAtSupply.is_touch());
        assert!(!ZoneEventType::ZoneBreak.is_touch());
    }

    #[test]
    fn test_display_matches_serde() {
        let json = serde_json::to_string(&ZoneEventType::ZoneBounce).unwrap();
        assert_eq!(json, format!("\"{}\"", ZoneEventType::ZoneBounce));
        assert!(Priority::High > Priority::Medium);
    }
}
