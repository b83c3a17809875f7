use thiserror::Error;

/// Errors raised while validating component configuration.
///
/// Every component constructor validates its config and fails fast with one
/// of these, so a misconfigured engine never reaches a scan.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value: {field} = {value}. Must be positive")]
    NonPositive { field: String, value: f64 },

    #[error("Invalid value: {field} = {value}. Must be between {min} and {max}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid ordering: {lower_field} ({lower}) must be below {upper_field} ({upper})")]
    InvalidOrder {
        lower_field: String,
        lower: f64,
        upper_field: String,
        upper: f64,
    },

    #[error("Indicator setup failed: {reason}")]
    Indicator { reason: String },
}

impl ConfigError {
    pub fn non_positive(field: &str, value: f64) -> Self {
        ConfigError::NonPositive {
            field: field.to_string(),
            value,
        }
    }

    pub fn out_of_range(field: &str, value: f64, min: f64, max: f64) -> Self {
        ConfigError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        }
    }
}

/// Errors related to market data retrieval
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Fetch for {symbol} timed out after {duration_ms}ms")]
    Timeout { symbol: String, duration_ms: u64 },

    #[error("Market data unavailable for {symbol}: {reason}")]
    Unavailable { symbol: String, reason: String },

    #[error("No current price for {symbol}")]
    NoPrice { symbol: String },

    #[error("Giving up on {symbol} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        symbol: String,
        attempts: u32,
        last_error: String,
    },
}

/// Failure of one symbol inside a batch scan. Never fatal to the batch.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error("Zone store failure for {symbol}: {reason}")]
    Store { symbol: String, reason: String },

    #[error("Scan cancelled before {symbol}")]
    Cancelled { symbol: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_formatting() {
        let error = ConfigError::out_of_range("alert_distance_pct", 150.0, 0.0, 100.0);

        let msg = error.to_string();
        assert!(msg.contains("alert_distance_pct"));
        assert!(msg.contains("150"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn test_market_data_error_formatting() {
        let error = MarketDataError::RetriesExhausted {
            symbol: "AAPL".to_string(),
            attempts: 3,
            last_error: "connection reset".to_string(),
        };

        let msg = error.to_string();
        assert!(msg.contains("AAPL"));
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_scan_error_wraps_market_data() {
        let error: ScanError = MarketDataError::NoPrice {
            symbol: "MSFT".to_string(),
        }
        .into();

        assert_eq!(error.to_string(), "No current price for MSFT");
    }
}
