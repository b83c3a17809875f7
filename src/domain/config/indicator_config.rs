use super::{ensure_below, ensure_non_zero, ensure_positive, ensure_range};
use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Periods and thresholds for the indicator library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    // Momentum
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub ema_fast_period: usize,
    pub ema_mid_period: usize,
    pub ema_slow_period: usize,

    // Volatility
    pub atr_period: usize,
    pub atr_stop_multiplier: f64,

    // Order flow
    pub cvd_trend_window: usize,
    /// CVD change smaller than this share of window volume is neutral (percent)
    pub cvd_neutral_band_pct: f64,

    // Volume profile
    pub volume_profile_bins: usize,
    pub value_area_pct: f64,
    pub hvn_std_devs: f64,
    pub lvn_std_devs: f64,

    // Smart money concepts
    pub structure_swing_strength: usize,
    pub liquidity_tolerance_pct: f64,
    /// Gaps smaller than this (percent of price) are ignored
    pub min_fvg_size_pct: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            ema_fast_period: 20,
            ema_mid_period: 50,
            ema_slow_period: 200,
            atr_period: 14,
            atr_stop_multiplier: 1.5,
            cvd_trend_window: 20,
            cvd_neutral_band_pct: 5.0,
            volume_profile_bins: 50,
            value_area_pct: 70.0,
            hvn_std_devs: 1.5,
            lvn_std_devs: 0.5,
            structure_swing_strength: 3,
            liquidity_tolerance_pct: 2.0,
            min_fvg_size_pct: 0.05,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_zero("rsi_period", self.rsi_period)?;
        ensure_range("rsi_oversold", self.rsi_oversold, 0.0, 100.0)?;
        ensure_range("rsi_overbought", self.rsi_overbought, 0.0, 100.0)?;
        ensure_below(
            "rsi_oversold",
            self.rsi_oversold,
            "rsi_overbought",
            self.rsi_overbought,
        )?;
        ensure_non_zero("macd_fast_period", self.macd_fast_period)?;
        ensure_non_zero("macd_signal_period", self.macd_signal_period)?;
        ensure_below(
            "macd_fast_period",
            self.macd_fast_period as f64,
            "macd_slow_period",
            self.macd_slow_period as f64,
        )?;
        ensure_non_zero("ema_fast_period", self.ema_fast_period)?;
        ensure_below(
            "ema_fast_period",
            self.ema_fast_period as f64,
            "ema_mid_period",
            self.ema_mid_period as f64,
        )?;
        ensure_below(
            "ema_mid_period",
            self.ema_mid_period as f64,
            "ema_slow_period",
            self.ema_slow_period as f64,
        )?;
        ensure_non_zero("atr_period", self.atr_period)?;
        ensure_positive("atr_stop_multiplier", self.atr_stop_multiplier)?;
        ensure_non_zero("cvd_trend_window", self.cvd_trend_window)?;
        ensure_range("cvd_neutral_band_pct", self.cvd_neutral_band_pct, 0.0, 100.0)?;
        ensure_non_zero("volume_profile_bins", self.volume_profile_bins)?;
        ensure_range("value_area_pct", self.value_area_pct, 1.0, 100.0)?;
        ensure_positive("hvn_std_devs", self.hvn_std_devs)?;
        ensure_range("lvn_std_devs", self.lvn_std_devs, 0.0, f64::MAX)?;
        ensure_non_zero("structure_swing_strength", self.structure_swing_strength)?;
        ensure_positive("liquidity_tolerance_pct", self.liquidity_tolerance_pct)?;
        ensure_range("min_fvg_size_pct", self.min_fvg_size_pct, 0.0, 100.0)?;
        Ok(())
    }
}
