//! Zone Analyzer
//!
//! Re-scores a zone against the current price and its test history, classifies
//! its lifecycle state and derives a trade recommendation with risk/reward.

use crate::domain::config::AnalyzerConfig;
use crate::domain::errors::ConfigError;
use crate::domain::zones::{
    PricePosition, Priority, Recommendation, RecommendationAction, RiskReward, TestResult, Zone,
    ZoneAnalysis, ZoneStatus, ZoneType,
};
use chrono::Utc;
use tracing::debug;

const MS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone)]
pub struct ZoneAnalyzer {
    config: AnalyzerConfig,
}

impl ZoneAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze against the wall clock.
    pub fn analyze_zone(
        &self,
        zone: &Zone,
        current_price: f64,
        test_history: Option<&[TestResult]>,
    ) -> ZoneAnalysis {
        self.analyze_zone_at(zone, current_price, test_history, Utc::now().timestamp_millis())
    }

    /// Analyze as of `now_ms` (epoch milliseconds). Pure given its inputs.
    pub fn analyze_zone_at(
        &self,
        zone: &Zone,
        current_price: f64,
        test_history: Option<&[TestResult]>,
        now_ms: i64,
    ) -> ZoneAnalysis {
        let history = test_history.unwrap_or(&[]);
        let mut zone = zone.clone();

        zone.test_count = zone.test_count.max(history.len() as u32);
        let failed_tests = history.iter().filter(|t| !t.held).count();
        let age_days = zone_age_days(&zone, now_ms);

        zone.strength_score = self.strength_score(&zone, age_days, failed_tests);
        zone.status = self.classify_status(&zone, current_price);
        if zone.status == ZoneStatus::Broken {
            zone.is_active = false;
        }
        if age_days > self.config.max_age_days as f64 {
            zone.is_active = false;
        }

        let recommendation = self.recommend(&zone, current_price);

        debug!(
            "ZoneAnalyzer: {} {} [{:.2}-{:.2}] @ {:.2} -> {} {} (strength {:.1}, {})",
            zone.symbol,
            zone.zone_type,
            zone.zone_bottom,
            zone.zone_top,
            current_price,
            recommendation.action,
            recommendation.priority,
            zone.strength_score,
            zone.status
        );

        ZoneAnalysis {
            zone,
            recommendation,
        }
    }

    /// Additive score, clamped to [0, 100]:
    /// volume (max 30) + freshness (30) + age (2..15) + tightness (2..15)
    /// + impulse (max 20) - penalty per failed test.
    pub fn strength_score(&self, zone: &Zone, age_days: f64, failed_tests: usize) -> f64 {
        let volume = (zone.volume_ratio * 10.0).min(30.0);

        let freshness = if zone.test_count == 0 { 30.0 } else { 0.0 };

        let age = if age_days <= 7.0 {
            15.0
        } else if age_days <= 30.0 {
            10.0
        } else if age_days <= 90.0 {
            5.0
        } else {
            2.0
        };

        let size_pct = zone.size_pct();
        let tightness = if size_pct < 1.0 {
            15.0
        } else if size_pct < 2.0 {
            10.0
        } else if size_pct < 3.0 {
            5.0
        } else {
            2.0
        };

        // How many zone heights the departure travelled
        let impulse_ratio = if size_pct > 0.0 {
            zone.impulse_pct / size_pct
        } else {
            0.0
        };
        let impulse = (impulse_ratio * 5.0).clamp(0.0, 20.0);

        let penalty = failed_tests as f64 * self.config.failed_test_penalty;

        (volume + freshness + age + tightness + impulse - penalty).clamp(0.0, 100.0)
    }

    /// BROKEN is terminal; otherwise the revisit count decides.
    pub fn classify_status(&self, zone: &Zone, current_price: f64) -> ZoneStatus {
        if zone.status == ZoneStatus::Broken
            || zone.is_invalidated_by(current_price, self.config.break_height_fraction)
        {
            ZoneStatus::Broken
        } else {
            ZoneStatus::from_test_count(zone.test_count)
        }
    }

    /// Entry at the near edge, stop beyond the far edge, target beyond the entry.
    pub fn risk_reward(&self, zone: &Zone) -> RiskReward {
        let stop_buffer = self.config.stop_buffer_pct / 100.0;
        let extension = self.config.target_extension_pct / 100.0;

        let (entry, stop_loss, target) = match zone.zone_type {
            ZoneType::Demand => (
                zone.zone_top,
                zone.zone_bottom * (1.0 - stop_buffer),
                zone.zone_top * (1.0 + extension),
            ),
            ZoneType::Supply => (
                zone.zone_bottom,
                zone.zone_top * (1.0 + stop_buffer),
                zone.zone_bottom * (1.0 - extension),
            ),
        };

        let (risk, reward) = match zone.zone_type {
            ZoneType::Demand => (entry - stop_loss, target - entry),
            ZoneType::Supply => (stop_loss - entry, entry - target),
        };

        RiskReward {
            entry,
            stop_loss,
            target,
            ratio: (risk > 0.0).then(|| reward / risk),
        }
    }

    fn recommend(&self, zone: &Zone, current_price: f64) -> Recommendation {
        let distance_pct = zone.distance_pct(current_price);
        let abs_distance = distance_pct.abs();
        let position = zone.position_of(current_price);

        let risk_reward = (zone.status != ZoneStatus::Broken
            && abs_distance <= self.config.watch_zone_pct)
            .then(|| self.risk_reward(zone));

        let make = |action, priority, reason: String| Recommendation {
            action,
            priority,
            reason,
            distance_pct,
            risk_reward: risk_reward.clone(),
        };

        if zone.status == ZoneStatus::Broken {
            return make(
                RecommendationAction::Avoid,
                Priority::Low,
                format!("{} zone broken", zone.zone_type),
            );
        }

        if zone.strength_score < self.config.min_actionable_score {
            return make(
                RecommendationAction::Watch,
                Priority::Low,
                format!("Weak zone (strength {:.1})", zone.strength_score),
            );
        }

        if abs_distance <= self.config.near_zone_pct {
            let action = match zone.zone_type {
                ZoneType::Demand => RecommendationAction::Buy,
                ZoneType::Supply => RecommendationAction::Sell,
            };
            let priority = if zone.strength_score >= self.config.strong_zone_score
                || zone.status == ZoneStatus::Fresh
            {
                Priority::High
            } else {
                Priority::Medium
            };
            return make(
                action,
                priority,
                format!(
                    "Price at {} zone ({:.2}%), strength {:.1}, {}",
                    zone.zone_type, distance_pct, zone.strength_score, zone.status
                ),
            );
        }

        if abs_distance <= self.config.watch_zone_pct {
            let approaching = matches!(
                (zone.zone_type, position),
                (ZoneType::Demand, PricePosition::Above) | (ZoneType::Supply, PricePosition::Below)
            );
            return if approaching {
                make(
                    RecommendationAction::Prepare,
                    Priority::Medium,
                    format!("Approaching {} zone ({:.2}%)", zone.zone_type, distance_pct),
                )
            } else {
                make(
                    RecommendationAction::Watch,
                    Priority::Medium,
                    format!("Beyond {} zone ({:.2}%)", zone.zone_type, distance_pct),
                )
            };
        }

        make(
            RecommendationAction::Watch,
            Priority::Low,
            format!("Too far from zone ({:.2}%)", distance_pct),
        )
    }
}

fn zone_age_days(zone: &Zone, now_ms: i64) -> f64 {
    ((now_ms - zone.formed_at) as f64 / MS_PER_DAY).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;

    fn analyzer() -> ZoneAnalyzer {
        ZoneAnalyzer::new(AnalyzerConfig::default()).unwrap()
    }

    fn demand_zone() -> Zone {
        // 178-180, departure volume 3x, rally to 190
        Zone::new("AAPL", ZoneType::Demand, 180.0, 178.0, 0, 12, 3000.0, 9000.0, 5.56, 100.0).unwrap()
    }

    fn supply_zone() -> Zone {
        Zone::new("AAPL", ZoneType::Supply, 202.0, 200.0, 0, 12, 3000.0, 9000.0, 5.0, 100.0).unwrap()
    }

    #[test]
    fn test_inside_fresh_demand_is_buy_high() {
        let analysis = analyzer().analyze_zone_at(&demand_zone(), 179.0, None, DAY_MS);

        assert_eq!(analysis.zone.status, ZoneStatus::Fresh);
        assert_eq!(analysis.recommendation.action, RecommendationAction::Buy);
        assert_eq!(analysis.recommendation.priority, Priority::High);
        assert_eq!(analysis.recommendation.distance_pct, 0.0);

        let rr = analysis.recommendation.risk_reward.unwrap();
        assert_eq!(rr.entry, 180.0);
        assert!((rr.stop_loss - 174.44).abs() < 1e-9);
        assert!((rr.target - 189.0).abs() < 1e-9);
        assert!((rr.ratio.unwrap() - 9.0 / 5.56).abs() < 1e-9);
    }

    #[test]
    fn test_strength_components() {
        let zone = demand_zone();
        // volume 30 + fresh 30 + age 15 + tightness 10 (1.12%) + impulse 20
        assert_eq!(analyzer().strength_score(&zone, 1.0, 0), 100.0);

        let mut tested = zone.clone();
        tested.test_count = 2;
        // volume 30 + age 2 + tightness 10 + impulse 20 - 2 failures x 15
        assert_eq!(analyzer().strength_score(&tested, 200.0, 2), 32.0);
    }

    #[test]
    fn test_broken_when_closed_half_height_below() {
        let analysis = analyzer().analyze_zone_at(&demand_zone(), 170.0, None, DAY_MS);

        assert_eq!(analysis.zone.status, ZoneStatus::Broken);
        assert!(!analysis.zone.is_active);
        assert_eq!(analysis.recommendation.action, RecommendationAction::Avoid);
        assert_eq!(analysis.recommendation.priority, Priority::Low);
        assert!(analysis.recommendation.risk_reward.is_none());
    }

    #[test]
    fn test_small_dip_below_is_not_a_break() {
        // 177.5 is within half a zone height (1.0) of the bottom
        let analysis = analyzer().analyze_zone_at(&demand_zone(), 177.5, None, DAY_MS);
        assert_ne!(analysis.zone.status, ZoneStatus::Broken);
        assert_eq!(analysis.recommendation.action, RecommendationAction::Buy);
    }

    #[test]
    fn test_broken_is_terminal() {
        let analyzer = analyzer();
        let broken = analyzer.analyze_zone_at(&demand_zone(), 170.0, None, DAY_MS).zone;

        let later = analyzer.analyze_zone_at(&broken, 179.0, None, 2 * DAY_MS);
        assert_eq!(later.zone.status, ZoneStatus::Broken);
        assert_eq!(later.recommendation.action, RecommendationAction::Avoid);
    }

    #[test]
    fn test_distance_bands_for_demand() {
        let analyzer = analyzer();
        let zone = demand_zone();

        // 3% above: approach side
        let prepare = analyzer.analyze_zone_at(&zone, 185.4, None, DAY_MS);
        assert_eq!(prepare.recommendation.action, RecommendationAction::Prepare);
        assert_eq!(prepare.recommendation.priority, Priority::Medium);
        assert!(prepare.recommendation.distance_pct > 0.0);
        assert!(prepare.recommendation.risk_reward.is_some());

        // 10% above: too far
        let far = analyzer.analyze_zone_at(&zone, 198.0, None, DAY_MS);
        assert_eq!(far.recommendation.action, RecommendationAction::Watch);
        assert_eq!(far.recommendation.priority, Priority::Low);
        assert!(far.recommendation.risk_reward.is_none());
    }

    #[test]
    fn test_supply_sides_mirror() {
        let analyzer = analyzer();
        let zone = supply_zone();

        let sell = analyzer.analyze_zone_at(&zone, 201.0, None, DAY_MS);
        assert_eq!(sell.recommendation.action, RecommendationAction::Sell);
        let rr = sell.recommendation.risk_reward.unwrap();
        assert_eq!(rr.entry, 200.0);
        assert!((rr.stop_loss - 206.04).abs() < 1e-9);
        assert!((rr.target - 190.0).abs() < 1e-9);

        // 3% below a supply zone is the approach side
        let prepare = analyzer.analyze_zone_at(&zone, 194.0, None, DAY_MS);
        assert_eq!(prepare.recommendation.action, RecommendationAction::Prepare);
        assert!(prepare.recommendation.distance_pct < 0.0);

        // Invalidation level is 203 (top + half a height)
        let broken = analyzer.analyze_zone_at(&zone, 205.03, None, DAY_MS);
        assert_eq!(broken.zone.status, ZoneStatus::Broken);
    }

    #[test]
    fn test_weak_zone_forced_to_watch_low() {
        let mut zone = demand_zone();
        zone.volume_ratio = 0.5;
        zone.impulse_pct = 0.0;
        zone.test_count = 3;

        let history: Vec<TestResult> = (0..3)
            .map(|i| TestResult {
                zone_id: zone.id.clone(),
                tested_at: i,
                price: 179.0,
                held: i == 0,
            })
            .collect();

        let analysis = analyzer().analyze_zone_at(&zone, 179.0, Some(history.as_slice()), 100 * DAY_MS);
        assert_eq!(analysis.zone.status, ZoneStatus::Weak);
        assert!(analysis.zone.strength_score < 50.0);
        assert_eq!(analysis.recommendation.action, RecommendationAction::Watch);
        assert_eq!(analysis.recommendation.priority, Priority::Low);
    }

    #[test]
    fn test_test_history_drives_status() {
        let zone = demand_zone();
        let history = vec![TestResult {
            zone_id: zone.id.clone(),
            tested_at: DAY_MS,
            price: 179.5,
            held: true,
        }];

        let analysis = analyzer().analyze_zone_at(&zone, 185.0, Some(history.as_slice()), 2 * DAY_MS);
        assert_eq!(analysis.zone.test_count, 1);
        assert_eq!(analysis.zone.status, ZoneStatus::Tested);
    }

    #[test]
    fn test_old_zone_retired_without_status_change() {
        let analysis = analyzer().analyze_zone_at(&demand_zone(), 185.0, None, 200 * DAY_MS);
        assert!(!analysis.zone.is_active);
        assert_eq!(analysis.zone.status, ZoneStatus::Fresh);
    }
}
