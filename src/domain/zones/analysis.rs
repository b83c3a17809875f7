//! Analysis outputs attached to a zone: recommendation, risk/reward,
//! confirmations, setup quality and trading plan.

use super::events::Priority;
use super::zone::{Zone, ZoneType};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationAction {
    Buy,
    Sell,
    Prepare,
    Watch,
    Avoid,
}

impl fmt::Display for RecommendationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationAction::Buy => write!(f, "BUY"),
            RecommendationAction::Sell => write!(f, "SELL"),
            RecommendationAction::Prepare => write!(f, "PREPARE"),
            RecommendationAction::Watch => write!(f, "WATCH"),
            RecommendationAction::Avoid => write!(f, "AVOID"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskReward {
    pub entry: f64,
    pub stop_loss: f64,
    pub target: f64,
    /// reward / risk; `None` when the stop is not on the losing side of entry
    pub ratio: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub action: RecommendationAction,
    pub priority: Priority,
    pub reason: String,
    pub distance_pct: f64,
    pub risk_reward: Option<RiskReward>,
}

/// Result of `ZoneAnalyzer::analyze_zone`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneAnalysis {
    pub zone: Zone,
    pub recommendation: Recommendation,
}

/// One confirmation check evaluated against the indicator bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Confirmation {
    pub indicator_name: String,
    pub confirmed: bool,
    pub bonus_points: u32,
    pub detail: String,
}

impl Confirmation {
    pub fn confirmed(indicator_name: &str, bonus_points: u32, detail: impl Into<String>) -> Self {
        Self {
            indicator_name: indicator_name.to_string(),
            confirmed: true,
            bonus_points,
            detail: detail.into(),
        }
    }

    pub fn rejected(indicator_name: &str, detail: impl Into<String>) -> Self {
        Self {
            indicator_name: indicator_name.to_string(),
            confirmed: false,
            bonus_points: 0,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetupQuality {
    Poor,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

impl SetupQuality {
    /// Tier from (enhanced score, confirmation count). Higher tiers need both.
    pub fn classify(score: f64, confirmation_count: usize) -> Self {
        if score >= 91.0 && confirmation_count >= 7 {
            SetupQuality::Excellent
        } else if score >= 81.0 && confirmation_count >= 5 {
            SetupQuality::VeryGood
        } else if score >= 71.0 && confirmation_count >= 3 {
            SetupQuality::Good
        } else if score >= 60.0 {
            SetupQuality::Fair
        } else {
            SetupQuality::Poor
        }
    }
}

impl fmt::Display for SetupQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupQuality::Poor => write!(f, "POOR"),
            SetupQuality::Fair => write!(f, "FAIR"),
            SetupQuality::Good => write!(f, "GOOD"),
            SetupQuality::VeryGood => write!(f, "VERY_GOOD"),
            SetupQuality::Excellent => write!(f, "EXCELLENT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeDirection {
    Long,
    Short,
}

impl From<ZoneType> for TradeDirection {
    fn from(zone_type: ZoneType) -> Self {
        match zone_type {
            ZoneType::Demand => TradeDirection::Long,
            ZoneType::Supply => TradeDirection::Short,
        }
    }
}

/// Advisory plan for trading a zone. Never sent to a broker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradingPlan {
    pub direction: TradeDirection,
    /// (bottom, top)
    pub entry_zone: (f64, f64),
    pub optimal_entry: f64,
    pub stop_loss: f64,
    pub target_1: f64,
    pub target_2: f64,
    pub risk_reward_1: f64,
    pub risk_reward_2: f64,
    pub atr: f64,
}

/// Result of `EnhancedZoneAnalyzer::analyze_zone_complete`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnhancedZoneAnalysis {
    pub zone: Zone,
    pub recommendation: Recommendation,
    pub base_score: f64,
    pub enhanced_score: f64,
    pub confirmations: Vec<Confirmation>,
    pub confirmation_count: usize,
    pub setup_quality: SetupQuality,
    pub trading_plan: Option<TradingPlan>,
}

impl EnhancedZoneAnalysis {
    pub fn confirmed(&self) -> impl Iterator<Item = &Confirmation> {
        self.confirmations.iter().filter(|c| c.confirmed)
    }
}
