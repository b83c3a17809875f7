use super::momentum::{self, AtrLevels, EmaReading, MacdReading, RsiReading};
use super::order_flow::{CumulativeVolumeDelta, cumulative_volume_delta};
use super::smc::{
    FairValueGap, LiquidityPool, MarketStructure, OrderBlock, analyze_market_structure,
    detect_fair_value_gaps, detect_liquidity_pools, detect_order_blocks,
};
use super::volume_profile::{VolumeProfile, build_volume_profile};
use crate::domain::config::IndicatorConfig;
use crate::domain::errors::ConfigError;
use crate::domain::market::Bar;
use crate::domain::zones::TradeDirection;
use serde::{Deserialize, Serialize};
use ta::indicators::MovingAverageConvergenceDivergence;
use tracing::debug;

/// Everything the confirmation layer reads, computed in one pass over a series.
/// Transient: built per analysis call and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBundle {
    pub last_price: Option<f64>,
    pub order_blocks: Vec<OrderBlock>,
    pub fair_value_gaps: Vec<FairValueGap>,
    pub market_structure: MarketStructure,
    pub liquidity_pools: Vec<LiquidityPool>,
    pub volume_profile: Option<VolumeProfile>,
    pub rsi: Option<RsiReading>,
    pub macd: Option<MacdReading>,
    pub ema: Option<EmaReading>,
    pub atr: Option<f64>,
    pub cvd: CumulativeVolumeDelta,
}

/// Configured front door to the indicator functions.
#[derive(Debug, Clone)]
pub struct IndicatorLibrary {
    config: IndicatorConfig,
}

impl IndicatorLibrary {
    pub fn new(config: IndicatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        // Let `ta` reject combinations our own checks do not cover
        MovingAverageConvergenceDivergence::new(
            config.macd_fast_period,
            config.macd_slow_period,
            config.macd_signal_period,
        )
        .map_err(|e| ConfigError::Indicator {
            reason: format!("MACD: {:?}", e),
        })?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn compute_bundle(&self, bars: &[Bar]) -> IndicatorBundle {
        let c = &self.config;

        let bundle = IndicatorBundle {
            last_price: bars.last().map(|b| b.close),
            order_blocks: detect_order_blocks(bars),
            fair_value_gaps: detect_fair_value_gaps(bars, c.min_fvg_size_pct),
            market_structure: analyze_market_structure(bars, c.structure_swing_strength),
            liquidity_pools: detect_liquidity_pools(
                bars,
                c.structure_swing_strength,
                c.liquidity_tolerance_pct,
            ),
            volume_profile: build_volume_profile(
                bars,
                c.volume_profile_bins,
                c.value_area_pct,
                c.hvn_std_devs,
                c.lvn_std_devs,
            ),
            rsi: momentum::rsi(bars, c.rsi_period, c.rsi_oversold, c.rsi_overbought),
            macd: momentum::macd(
                bars,
                c.macd_fast_period,
                c.macd_slow_period,
                c.macd_signal_period,
            ),
            ema: momentum::ema_alignment(
                bars,
                c.ema_fast_period,
                c.ema_mid_period,
                c.ema_slow_period,
            ),
            atr: momentum::atr(bars, c.atr_period),
            cvd: cumulative_volume_delta(bars, c.cvd_trend_window, c.cvd_neutral_band_pct),
        };

        debug!(
            "IndicatorLibrary: {} bars -> {} OBs, {} FVGs, {} structure breaks, {} pools",
            bars.len(),
            bundle.order_blocks.len(),
            bundle.fair_value_gaps.len(),
            bundle.market_structure.breaks.len(),
            bundle.liquidity_pools.len()
        );

        bundle
    }

    /// ATR stop and 2R/3R targets using the configured stop multiplier.
    pub fn atr_levels(&self, atr: f64, entry: f64, direction: TradeDirection) -> AtrLevels {
        momentum::atr_levels(atr, entry, direction, self.config.atr_stop_multiplier)
    }
}
