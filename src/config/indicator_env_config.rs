//! Indicator configuration from environment variables.

use super::parse_env;
use crate::domain::config::IndicatorConfig;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct IndicatorEnvConfig {
    pub indicators: IndicatorConfig,
}

impl IndicatorEnvConfig {
    pub fn from_env() -> Result<Self> {
        let d = IndicatorConfig::default();
        let indicators = IndicatorConfig {
            rsi_period: parse_env("RSI_PERIOD", d.rsi_period)?,
            rsi_oversold: parse_env("RSI_OVERSOLD", d.rsi_oversold)?,
            rsi_overbought: parse_env("RSI_OVERBOUGHT", d.rsi_overbought)?,
            macd_fast_period: parse_env("MACD_FAST_PERIOD", d.macd_fast_period)?,
            macd_slow_period: parse_env("MACD_SLOW_PERIOD", d.macd_slow_period)?,
            macd_signal_period: parse_env("MACD_SIGNAL_PERIOD", d.macd_signal_period)?,
            ema_fast_period: parse_env("EMA_FAST_PERIOD", d.ema_fast_period)?,
            ema_mid_period: parse_env("EMA_MID_PERIOD", d.ema_mid_period)?,
            ema_slow_period: parse_env("EMA_SLOW_PERIOD", d.ema_slow_period)?,
            atr_period: parse_env("ATR_PERIOD", d.atr_period)?,
            atr_stop_multiplier: parse_env("ATR_STOP_MULTIPLIER", d.atr_stop_multiplier)?,
            cvd_trend_window: parse_env("CVD_TREND_WINDOW", d.cvd_trend_window)?,
            cvd_neutral_band_pct: parse_env("CVD_NEUTRAL_BAND_PCT", d.cvd_neutral_band_pct)?,
            volume_profile_bins: parse_env("VOLUME_PROFILE_BINS", d.volume_profile_bins)?,
            value_area_pct: parse_env("VALUE_AREA_PCT", d.value_area_pct)?,
            hvn_std_devs: parse_env("HVN_STD_DEVS", d.hvn_std_devs)?,
            lvn_std_devs: parse_env("LVN_STD_DEVS", d.lvn_std_devs)?,
            structure_swing_strength: parse_env(
                "STRUCTURE_SWING_STRENGTH",
                d.structure_swing_strength,
            )?,
            liquidity_tolerance_pct: parse_env(
                "LIQUIDITY_TOLERANCE_PCT",
                d.liquidity_tolerance_pct,
            )?,
            min_fvg_size_pct: parse_env("MIN_FVG_SIZE_PCT", d.min_fvg_size_pct)?,
        };
        indicators.validate().context("Invalid indicator config")?;
        Ok(Self { indicators })
    }
}
