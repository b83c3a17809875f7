//! Enhanced Zone Analyzer
//!
//! Runs the base analysis, then grades the zone against ten independent
//! indicator confirmations. Each confirmed check adds a fixed bonus on top of
//! the base strength. The total picks the setup quality tier, and ATR sizes
//! an advisory trading plan.

use super::analyzer::ZoneAnalyzer;
use crate::application::indicators::momentum::{EmaAlignment, MacdState};
use crate::application::indicators::smc::{LiquiditySide, StructureBreakKind};
use crate::application::indicators::{IndicatorBundle, IndicatorLibrary, MarketBias};
use crate::domain::market::Bar;
use crate::domain::zones::{
    Confirmation, EnhancedZoneAnalysis, SetupQuality, TestResult, TradeDirection, TradingPlan,
    Zone, ZoneType,
};
use chrono::Utc;
use tracing::info;

const ORDER_BLOCK_BONUS: u32 = 15;
const FAIR_VALUE_GAP_BONUS: u32 = 10;
const POC_INSIDE_BONUS: u32 = 15;
const POC_NEAR_BONUS: u32 = 10;
const HVN_BONUS: u32 = 10;
const STRONG_BONUS: u32 = 10;
const MILD_BONUS: u32 = 5;
const LIQUIDITY_BONUS: u32 = 10;
const CVD_BONUS: u32 = 10;

/// POC within this distance (percent) of a zone edge still counts as near
const POC_NEAR_PCT: f64 = 2.0;
/// RSI this far inside the neutral band still earns the mild bonus
const RSI_MILD_MARGIN: f64 = 10.0;

pub struct EnhancedZoneAnalyzer {
    analyzer: ZoneAnalyzer,
    library: IndicatorLibrary,
}

impl EnhancedZoneAnalyzer {
    pub fn new(analyzer: ZoneAnalyzer, library: IndicatorLibrary) -> Self {
        Self { analyzer, library }
    }

    pub fn analyzer(&self) -> &ZoneAnalyzer {
        &self.analyzer
    }

    pub fn analyze_zone_complete(
        &self,
        zone: &Zone,
        bars: &[Bar],
        current_price: f64,
        test_history: Option<&[TestResult]>,
    ) -> EnhancedZoneAnalysis {
        self.analyze_zone_complete_at(
            zone,
            bars,
            current_price,
            test_history,
            Utc::now().timestamp_millis(),
        )
    }

    pub fn analyze_zone_complete_at(
        &self,
        zone: &Zone,
        bars: &[Bar],
        current_price: f64,
        test_history: Option<&[TestResult]>,
        now_ms: i64,
    ) -> EnhancedZoneAnalysis {
        let base = self
            .analyzer
            .analyze_zone_at(zone, current_price, test_history, now_ms);
        let bundle = self.library.compute_bundle(bars);

        let confirmations = self.confirmations(&base.zone, &bundle, current_price);
        let confirmation_count = confirmations.iter().filter(|c| c.confirmed).count();
        let bonus: u32 = confirmations.iter().map(|c| c.bonus_points).sum();

        let base_score = base.zone.strength_score;
        let enhanced_score = (base_score + bonus as f64).min(100.0);
        let setup_quality = SetupQuality::classify(enhanced_score, confirmation_count);

        let trading_plan = bundle
            .atr
            .map(|atr| self.trading_plan(&base.zone, atr, current_price));

        info!(
            "EnhancedZoneAnalyzer: {} {} [{:.2}-{:.2}] score {:.1} -> {:.1}, {}/10 confirmations, {}",
            base.zone.symbol,
            base.zone.zone_type,
            base.zone.zone_bottom,
            base.zone.zone_top,
            base_score,
            enhanced_score,
            confirmation_count,
            setup_quality
        );

        EnhancedZoneAnalysis {
            zone: base.zone,
            recommendation: base.recommendation,
            base_score,
            enhanced_score,
            confirmations,
            confirmation_count,
            setup_quality,
            trading_plan,
        }
    }

    /// The ten checks, always in the same order.
    pub fn confirmations(
        &self,
        zone: &Zone,
        bundle: &IndicatorBundle,
        current_price: f64,
    ) -> Vec<Confirmation> {
        let bias = zone_bias(zone.zone_type);
        vec![
            check_order_block(zone, bundle, bias),
            check_fair_value_gap(zone, bundle, bias),
            check_volume_poc(zone, bundle),
            check_high_volume_node(zone, bundle),
            self.check_rsi(zone, bundle),
            check_macd(bundle, bias),
            check_ema(bundle, bias),
            check_liquidity(zone, bundle, current_price),
            check_cvd(bundle, bias),
            check_market_structure(bundle, bias),
        ]
    }

    fn check_rsi(&self, zone: &Zone, bundle: &IndicatorBundle) -> Confirmation {
        let Some(reading) = bundle.rsi else {
            return Confirmation::rejected("rsi", "not enough bars");
        };
        let config = self.library.config();
        let value = reading.value;

        let points = match zone.zone_type {
            ZoneType::Demand if value < config.rsi_oversold => STRONG_BONUS,
            ZoneType::Demand if value < config.rsi_oversold + RSI_MILD_MARGIN => MILD_BONUS,
            ZoneType::Supply if value > config.rsi_overbought => STRONG_BONUS,
            ZoneType::Supply if value > config.rsi_overbought - RSI_MILD_MARGIN => MILD_BONUS,
            _ => 0,
        };

        if points > 0 {
            Confirmation::confirmed("rsi", points, format!("RSI {:.1}", value))
        } else {
            Confirmation::rejected("rsi", format!("RSI {:.1} does not favor the zone", value))
        }
    }

    fn trading_plan(&self, zone: &Zone, atr: f64, current_price: f64) -> TradingPlan {
        let direction = TradeDirection::from(zone.zone_type);
        let levels = self.library.atr_levels(atr, current_price, direction);

        let risk = (levels.entry - levels.stop_loss).abs();
        let ratio = |target: f64| {
            if risk > 0.0 {
                (target - levels.entry).abs() / risk
            } else {
                0.0
            }
        };

        TradingPlan {
            direction,
            entry_zone: (zone.zone_bottom, zone.zone_top),
            optimal_entry: zone.zone_midpoint,
            stop_loss: levels.stop_loss,
            target_1: levels.target_1,
            target_2: levels.target_2,
            risk_reward_1: ratio(levels.target_1),
            risk_reward_2: ratio(levels.target_2),
            atr,
        }
    }
}

fn zone_bias(zone_type: ZoneType) -> MarketBias {
    match zone_type {
        ZoneType::Demand => MarketBias::Bullish,
        ZoneType::Supply => MarketBias::Bearish,
    }
}

fn check_order_block(zone: &Zone, bundle: &IndicatorBundle, bias: MarketBias) -> Confirmation {
    let block = bundle
        .order_blocks
        .iter()
        .filter(|ob| ob.bias == bias && !ob.mitigated && zone.overlaps(ob.bottom, ob.top))
        .max_by(|a, b| a.strength.total_cmp(&b.strength));

    match block {
        Some(ob) => Confirmation::confirmed(
            "order_block",
            ORDER_BLOCK_BONUS,
            format!(
                "Unmitigated OB {:.2}-{:.2} (strength {:.0})",
                ob.bottom, ob.top, ob.strength
            ),
        ),
        None => Confirmation::rejected("order_block", "No unmitigated order block in zone"),
    }
}

fn check_fair_value_gap(zone: &Zone, bundle: &IndicatorBundle, bias: MarketBias) -> Confirmation {
    let reach = zone.height();
    let gap = bundle.fair_value_gaps.iter().find(|g| {
        g.bias == bias
            && !g.filled
            && g.bottom <= zone.zone_top + reach
            && g.top >= zone.zone_bottom - reach
    });

    match gap {
        Some(g) => Confirmation::confirmed(
            "fair_value_gap",
            FAIR_VALUE_GAP_BONUS,
            format!("Unfilled FVG {:.2}-{:.2}", g.bottom, g.top),
        ),
        None => Confirmation::rejected("fair_value_gap", "No unfilled gap near zone"),
    }
}

fn check_volume_poc(zone: &Zone, bundle: &IndicatorBundle) -> Confirmation {
    let Some(profile) = &bundle.volume_profile else {
        return Confirmation::rejected("volume_poc", "No volume profile");
    };
    let poc = profile.point_of_control;

    if zone.contains(poc) {
        Confirmation::confirmed("volume_poc", POC_INSIDE_BONUS, format!("POC {:.2} inside zone", poc))
    } else if zone.distance_pct(poc).abs() <= POC_NEAR_PCT {
        Confirmation::confirmed("volume_poc", POC_NEAR_BONUS, format!("POC {:.2} near zone", poc))
    } else {
        Confirmation::rejected("volume_poc", format!("POC {:.2} away from zone", poc))
    }
}

fn check_high_volume_node(zone: &Zone, bundle: &IndicatorBundle) -> Confirmation {
    let node = bundle
        .volume_profile
        .as_ref()
        .and_then(|p| p.high_volume_nodes.iter().find(|&&price| zone.contains(price)));

    match node {
        Some(price) => Confirmation::confirmed(
            "high_volume_node",
            HVN_BONUS,
            format!("HVN at {:.2}", price),
        ),
        None => Confirmation::rejected("high_volume_node", "No HVN inside zone"),
    }
}

fn check_macd(bundle: &IndicatorBundle, bias: MarketBias) -> Confirmation {
    let Some(reading) = bundle.macd else {
        return Confirmation::rejected("macd", "not enough bars");
    };

    let points = match (reading.state, bias) {
        (MacdState::BullishCrossover, MarketBias::Bullish)
        | (MacdState::BearishCrossover, MarketBias::Bearish) => STRONG_BONUS,
        (state, bias) if state.bias() == bias => MILD_BONUS,
        _ => 0,
    };

    if points > 0 {
        Confirmation::confirmed(
            "macd",
            points,
            format!("{:?} (hist {:.3})", reading.state, reading.histogram),
        )
    } else {
        Confirmation::rejected("macd", format!("{:?}", reading.state))
    }
}

fn check_ema(bundle: &IndicatorBundle, bias: MarketBias) -> Confirmation {
    let Some(reading) = bundle.ema else {
        return Confirmation::rejected("ema", "No EMA reading");
    };

    let aligned = matches!(
        (reading.alignment, bias),
        (EmaAlignment::BullishAligned, MarketBias::Bullish)
            | (EmaAlignment::BearishAligned, MarketBias::Bearish)
    );

    if aligned {
        Confirmation::confirmed("ema", STRONG_BONUS, format!("{:?}", reading.alignment))
    } else if reading.short_term_bias() == bias {
        Confirmation::confirmed("ema", MILD_BONUS, "EMA fast/mid agree")
    } else {
        Confirmation::rejected("ema", format!("{:?}", reading.alignment))
    }
}

/// Demand wants resting buy-side liquidity above price as a target; supply
/// wants sell-side liquidity below.
fn check_liquidity(zone: &Zone, bundle: &IndicatorBundle, current_price: f64) -> Confirmation {
    let pool = bundle.liquidity_pools.iter().find(|p| {
        !p.swept
            && match zone.zone_type {
                ZoneType::Demand => p.side == LiquiditySide::BuySide && p.level > current_price,
                ZoneType::Supply => p.side == LiquiditySide::SellSide && p.level < current_price,
            }
    });

    match pool {
        Some(p) => Confirmation::confirmed(
            "liquidity",
            LIQUIDITY_BONUS,
            format!("{:?} pool at {:.2} ({} touches)", p.side, p.level, p.touches),
        ),
        None => Confirmation::rejected("liquidity", "No unswept target liquidity"),
    }
}

fn check_cvd(bundle: &IndicatorBundle, bias: MarketBias) -> Confirmation {
    if bundle.cvd.trend == bias {
        Confirmation::confirmed(
            "cvd",
            CVD_BONUS,
            format!("CVD {:?} ({:+.0})", bundle.cvd.trend, bundle.cvd.window_change),
        )
    } else {
        Confirmation::rejected("cvd", format!("CVD {:?}", bundle.cvd.trend))
    }
}

fn check_market_structure(bundle: &IndicatorBundle, bias: MarketBias) -> Confirmation {
    let structure = &bundle.market_structure;

    match structure.last_break() {
        Some(b) if b.kind == StructureBreakKind::ChangeOfCharacter && b.direction == bias => {
            Confirmation::confirmed(
                "market_structure",
                STRONG_BONUS,
                format!("CHoCH {:?} through {:.2}", b.direction, b.level),
            )
        }
        _ if structure.trend == bias => Confirmation::confirmed(
            "market_structure",
            MILD_BONUS,
            format!("Trend {:?}", structure.trend),
        ),
        _ => Confirmation::rejected("market_structure", format!("Trend {:?}", structure.trend)),
    }
}
