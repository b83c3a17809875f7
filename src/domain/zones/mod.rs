// Zone domain: the zone record, its events and analysis outputs
pub mod analysis;
pub mod events;
pub mod zone;

pub use analysis::{
    Confirmation, EnhancedZoneAnalysis, Recommendation, RecommendationAction, RiskReward,
    SetupQuality, TradeDirection, TradingPlan, ZoneAnalysis,
};
pub use events::{Priority, ZoneEvent, ZoneEventType};
pub use zone::{PricePosition, TestResult, Zone, ZoneStatus, ZoneType};
