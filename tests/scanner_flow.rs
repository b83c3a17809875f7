//! Scanner driven through the real adapters: mock and CSV market data,
//! the in-memory store and a channel alert sink.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use zonewatch::application::agents::{ScannerConfig, ZoneScanner};
use zonewatch::application::indicators::IndicatorLibrary;
use zonewatch::application::market_data::FetchPolicy;
use zonewatch::application::monitoring::PriceMonitor;
use zonewatch::application::zones::{EnhancedZoneAnalyzer, ZoneAnalyzer, ZoneDetector};
use zonewatch::domain::config::{
    AnalyzerConfig, DetectorConfig, IndicatorConfig, MonitorConfig,
};
use zonewatch::domain::errors::{MarketDataError, ScanError};
use zonewatch::domain::market::Bar;
use zonewatch::domain::ports::{MarketDataSource, ZoneStore};
use zonewatch::domain::zones::{ZoneEvent, ZoneEventType, ZoneStatus, ZoneType};
use zonewatch::infrastructure::{
    ChannelAlertSink, CsvMarketDataSource, InMemoryZoneStore, MockMarketDataSource,
};

const DAY_MS: i64 = 86_400_000;

/// Base at 178-180 then a rally, ending yesterday.
fn recent_bars() -> Vec<Bar> {
    let start = Utc::now().timestamp_millis() - 26 * DAY_MS;
    let mut bars = Vec::new();
    let mut push = |o: f64, h: f64, l: f64, c: f64, v: f64| {
        let ts = start + bars.len() as i64 * DAY_MS;
        bars.push(Bar::new(ts, o, h, l, c, v));
    };
    for i in 0..10 {
        let close = 195.0 - i as f64 * 1.5;
        push(close + 0.5, close + 1.0, close - 1.0, close, 1000.0);
    }
    for _ in 0..5 {
        push(179.0, 180.0, 178.0, 179.0, 1000.0);
    }
    for close in [182.0, 185.0, 188.0, 190.0] {
        push(close - 2.0, close + 0.5, close - 2.5, close, 3000.0);
    }
    for _ in 0..6 {
        push(189.0, 190.5, 188.5, 189.5, 1000.0);
    }
    bars
}

fn build_scanner(
    source: Arc<dyn MarketDataSource>,
    store: Arc<InMemoryZoneStore>,
    symbols: &[&str],
) -> (ZoneScanner, mpsc::UnboundedReceiver<ZoneEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let detector = ZoneDetector::new(DetectorConfig {
        lookback_periods: 25,
        swing_strength: 3,
        ..DetectorConfig::default()
    })
    .unwrap();
    let analyzer = EnhancedZoneAnalyzer::new(
        ZoneAnalyzer::new(AnalyzerConfig::default()).unwrap(),
        IndicatorLibrary::new(IndicatorConfig::default()).unwrap(),
    );
    let monitor = PriceMonitor::new(MonitorConfig {
        price_cache_ttl: Duration::from_millis(1),
        ..MonitorConfig::default()
    })
    .unwrap();
    let config = ScannerConfig {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        history_bars: 25,
        concurrency: 2,
        fetch_policy: FetchPolicy::new(Duration::from_secs(1), 1, Duration::from_millis(1)),
        ..ScannerConfig::default()
    };

    let scanner = ZoneScanner::new(
        source,
        store,
        Arc::new(ChannelAlertSink::new(tx)),
        detector,
        analyzer,
        monitor,
        config,
    )
    .unwrap();
    (scanner, rx)
}

#[tokio::test]
async fn test_failing_symbol_does_not_abort_batch() {
    let source = Arc::new(MockMarketDataSource::new());
    source.set_bars("AAPL", recent_bars());
    source.set_price("AAPL", 189.5);
    source.set_bars("MSFT", recent_bars());
    source.set_price("MSFT", 189.5);
    source.fail_next("MSFT", 10);
    let store = Arc::new(InMemoryZoneStore::new());
    let (scanner, _rx) = build_scanner(source, store.clone(), &["AAPL", "MSFT", "NOPE"]);

    let symbols: Vec<String> = ["AAPL", "MSFT", "NOPE"].iter().map(|s| s.to_string()).collect();
    let (_tx, cancel) = watch::channel(false);
    let results = scanner.scan_batch(&symbols, &cancel).await;

    assert_eq!(results.len(), 3);
    for result in &results {
        match result.symbol.as_str() {
            "AAPL" => assert_eq!(result.outcome.as_ref().unwrap().len(), 1),
            "MSFT" => assert!(matches!(
                result.outcome,
                Err(ScanError::MarketData(MarketDataError::RetriesExhausted { .. }))
            )),
            "NOPE" => assert!(result.outcome.is_err()),
            other => panic!("unexpected symbol {}", other),
        }
    }

    assert_eq!(store.zones_for_symbol("AAPL").await.len(), 1);
    assert!(store.zones_for_symbol("MSFT").await.is_empty());
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let source = Arc::new(MockMarketDataSource::new());
    source.set_bars("AAPL", recent_bars());
    source.set_price("AAPL", 189.5);
    source.fail_next("AAPL", 1);
    let store = Arc::new(InMemoryZoneStore::new());
    let (scanner, _rx) = build_scanner(source.clone(), store, &["AAPL"]);

    let analyses = scanner.scan_symbol("AAPL").await.unwrap();
    assert_eq!(analyses.len(), 1);
    // One failed history call, one good one, one price call
    assert_eq!(source.call_count(), 3);
}

#[tokio::test]
async fn test_scan_then_monitor_through_break() {
    let source = Arc::new(MockMarketDataSource::new());
    source.set_bars("AAPL", recent_bars());
    source.set_price("AAPL", 189.5);
    let store = Arc::new(InMemoryZoneStore::new());
    let (scanner, mut rx) = build_scanner(source.clone(), store.clone(), &["AAPL"]);

    let analyses = scanner.scan_symbol("AAPL").await.unwrap();
    let zone = &analyses[0].zone;
    assert_eq!(zone.zone_type, ZoneType::Demand);
    let zone_id = zone.id.clone();

    source.set_price("AAPL", 179.0);
    tokio::time::sleep(Duration::from_millis(5)).await;
    let touch = scanner.monitor_symbol("AAPL").await.unwrap();
    assert!(touch.iter().any(|e| e.event_type == ZoneEventType::PriceAtDemand));

    source.set_price("AAPL", 170.0);
    tokio::time::sleep(Duration::from_millis(5)).await;
    let broken = scanner.monitor_symbol("AAPL").await.unwrap();
    assert_eq!(
        broken
            .iter()
            .filter(|e| e.event_type == ZoneEventType::ZoneBreak)
            .count(),
        1
    );

    let stored = store.get_zone(&zone_id).await.unwrap();
    assert_eq!(stored.status, ZoneStatus::Broken);
    assert!(!stored.is_active);

    // Broken zones are no longer served to the monitor
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(scanner.monitor_symbol("AAPL").await.unwrap().is_empty());
    assert!(
        store
            .get_zones_near_price("AAPL", 170.0, 10.0)
            .await
            .unwrap()
            .is_empty()
    );

    let mut delivered = Vec::new();
    while let Ok(event) = rx.try_recv() {
        delivered.push(event.event_type);
    }
    assert!(delivered.contains(&ZoneEventType::PriceAtDemand));
    assert_eq!(
        delivered
            .iter()
            .filter(|t| **t == ZoneEventType::ZoneBreak)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_scan_from_csv_files() {
    let dir = std::env::temp_dir().join(format!("zonewatch-flow-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();

    let mut csv = String::from("timestamp,open,high,low,close,volume\n");
    for bar in recent_bars() {
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp, bar.open, bar.high, bar.low, bar.close, bar.volume
        ));
    }
    std::fs::write(dir.join("AAPL.csv"), csv).unwrap();

    let store = Arc::new(InMemoryZoneStore::new());
    let (scanner, _rx) = build_scanner(
        Arc::new(CsvMarketDataSource::new(&dir)),
        store.clone(),
        &["AAPL"],
    );

    let analyses = scanner.scan_symbol("AAPL").await.unwrap();
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0].zone.zone_bottom, 178.0);
    assert_eq!(store.zone_count().await, 1);

    std::fs::remove_dir_all(dir).ok();
}
