use crate::config::{Config, LogFormat};
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::time::Duration;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

fn set(key: &str, value: &str) {
    // SAFETY: every test touching the environment holds ENV_LOCK
    unsafe { env::set_var(key, value) }
}

fn clear(keys: &[&str]) {
    for key in keys {
        // SAFETY: every test touching the environment holds ENV_LOCK
        unsafe { env::remove_var(key) }
    }
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap_or_else(|p| p.into_inner());
    clear(&["SYMBOLS", "ZONE_LOOKBACK_PERIODS", "RSI_PERIOD", "LOG_FORMAT"]);

    let config = Config::from_env().unwrap();
    assert_eq!(config.detector.lookback_periods, 100);
    assert_eq!(config.indicators.rsi_period, 14);
    assert_eq!(config.monitor.alert_distance_pct, 2.0);
    assert_eq!(config.scanner.symbols.len(), 3);
    assert_eq!(config.log_format, LogFormat::Pretty);
}

#[test]
fn test_config_overrides() {
    let _guard = get_env_lock().lock().unwrap_or_else(|p| p.into_inner());
    set("SYMBOLS", "tsla, amd");
    set("ZONE_LOOKBACK_PERIODS", "60");
    set("ALERT_RESET_INTERVAL_SECS", "120");
    set("FETCH_TIMEOUT_MS", "1500");
    set("DATA_DIR", "/tmp/bars");
    set("LOG_FORMAT", "json");

    let config = Config::from_env().unwrap();
    assert_eq!(config.scanner.symbols, vec!["TSLA".to_string(), "AMD".to_string()]);
    assert_eq!(config.detector.lookback_periods, 60);
    assert_eq!(config.scanner.alert_reset_interval, Duration::from_secs(120));
    assert_eq!(config.scanner.fetch_policy.timeout, Duration::from_millis(1500));
    assert_eq!(config.data_dir.to_str(), Some("/tmp/bars"));
    assert_eq!(config.log_format, LogFormat::Json);

    clear(&[
        "SYMBOLS",
        "ZONE_LOOKBACK_PERIODS",
        "ALERT_RESET_INTERVAL_SECS",
        "FETCH_TIMEOUT_MS",
        "DATA_DIR",
        "LOG_FORMAT",
    ]);
}

#[test]
fn test_unparseable_value_names_variable() {
    let _guard = get_env_lock().lock().unwrap_or_else(|p| p.into_inner());
    set("RSI_PERIOD", "fourteen");

    let err = Config::from_env().unwrap_err();
    assert!(format!("{:#}", err).contains("RSI_PERIOD"));

    clear(&["RSI_PERIOD"]);
}

#[test]
fn test_invalid_threshold_fails_fast() {
    let _guard = get_env_lock().lock().unwrap_or_else(|p| p.into_inner());
    set("ALERT_DISTANCE_PCT", "-1.0");

    let err = Config::from_env().unwrap_err();
    assert!(format!("{:#}", err).contains("alert_distance_pct"));

    clear(&["ALERT_DISTANCE_PCT"]);
}

#[test]
fn test_zero_concurrency_rejected() {
    let _guard = get_env_lock().lock().unwrap_or_else(|p| p.into_inner());
    set("SCAN_CONCURRENCY", "0");

    assert!(Config::from_env().is_err());

    clear(&["SCAN_CONCURRENCY"]);
}
