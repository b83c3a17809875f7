//! Configuration domain module
//!
//! Validated value objects holding the tunables of each engine component.
//! Every component validates its config in `new`, so invalid thresholds fail
//! at construction time instead of producing odd zones later.

pub mod analyzer_config;
pub mod detector_config;
pub mod indicator_config;
pub mod monitor_config;

pub use analyzer_config::AnalyzerConfig;
pub use detector_config::DetectorConfig;
pub use indicator_config::IndicatorConfig;
pub use monitor_config::MonitorConfig;

use crate::domain::errors::ConfigError;

pub(crate) fn ensure_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::non_positive(field, value))
    }
}

pub(crate) fn ensure_non_zero(field: &str, value: usize) -> Result<(), ConfigError> {
    ensure_positive(field, value as f64)
}

pub(crate) fn ensure_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(field, value, min, max))
    }
}

pub(crate) fn ensure_below(
    lower_field: &str,
    lower: f64,
    upper_field: &str,
    upper: f64,
) -> Result<(), ConfigError> {
    if lower < upper {
        Ok(())
    } else {
        Err(ConfigError::InvalidOrder {
            lower_field: lower_field.to_string(),
            lower,
            upper_field: upper_field.to_string(),
            upper,
        })
    }
}
