//! Invariants that hold for any input series, checked over a handful of
//! deterministic synthetic markets.

use zonewatch::application::indicators::IndicatorLibrary;
use zonewatch::application::monitoring::PriceMonitor;
use zonewatch::application::zones::{EnhancedZoneAnalyzer, ZoneAnalyzer, ZoneDetector};
use zonewatch::domain::config::{
    AnalyzerConfig, DetectorConfig, IndicatorConfig, MonitorConfig,
};
use zonewatch::domain::market::Bar;
use std::collections::HashSet;
use zonewatch::domain::zones::{TestResult, Zone, ZoneStatus, ZoneType};

const DAY_MS: i64 = 86_400_000;

/// Oscillating market with a drift and periodic volume bursts.
fn wave_series(len: usize, phase: f64, drift: f64) -> Vec<Bar> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            let close = 100.0
                + drift * t
                + 8.0 * (t * 0.21 + phase).sin()
                + 3.0 * (t * 0.047 + 2.0 * phase).sin();
            let open = close - 0.6 * (t * 0.5 + phase).cos();
            let high = close.max(open) + 0.4 + 0.3 * (t * 0.9).sin().abs();
            let low = close.min(open) - 0.4 - 0.3 * (t * 1.3).cos().abs();
            let burst = if i % 17 < 3 { 3.5 } else { 1.0 };
            let volume = (1000.0 + 600.0 * (t * 0.37 + phase).sin().abs()) * burst;
            Bar::new(i as i64 * DAY_MS, open, high, low, close, volume)
        })
        .collect()
}

/// Decline into a 178-180 base, then a heavy-volume rally to 190.
fn base_and_rally() -> Vec<Bar> {
    let mut bars = Vec::new();
    let mut push = |o: f64, h: f64, l: f64, c: f64, v: f64| {
        let ts = bars.len() as i64 * DAY_MS;
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

fn markets() -> Vec<(String, Vec<Bar>)> {
    vec![
        ("WAVE".to_string(), wave_series(250, 0.0, 0.0)),
        ("UP".to_string(), wave_series(250, 1.3, 0.08)),
        ("DOWN".to_string(), wave_series(250, 2.1, -0.06)),
        ("BASE".to_string(), base_and_rally()),
    ]
}

fn detector() -> ZoneDetector {
    ZoneDetector::new(DetectorConfig {
        lookback_periods: 25,
        swing_strength: 3,
        ..DetectorConfig::default()
    })
    .unwrap()
}

fn enhanced() -> EnhancedZoneAnalyzer {
    EnhancedZoneAnalyzer::new(
        ZoneAnalyzer::new(AnalyzerConfig::default()).unwrap(),
        IndicatorLibrary::new(IndicatorConfig::default()).unwrap(),
    )
}

fn signature(zone: &Zone) -> (ZoneType, usize, u64, u64) {
    (
        zone.zone_type,
        zone.formation_index,
        zone.zone_bottom.to_bits(),
        zone.zone_top.to_bits(),
    )
}

#[test]
fn test_zone_bounds_and_scores() {
    let detector = detector();
    let config = detector.config().clone();
    let mut total = 0;

    for (symbol, bars) in markets() {
        for zone in detector.detect_zones(&bars, &symbol) {
            total += 1;
            assert!(zone.zone_bottom < zone.zone_top, "{}: inverted zone", symbol);
            assert!((0.0..=100.0).contains(&zone.strength_score));
            assert!(zone.size_pct() >= config.min_zone_size_pct);
            assert!(zone.size_pct() <= config.max_zone_size_pct);
            assert!(zone.volume_ratio >= config.min_volume_ratio);
            assert_eq!(zone.status, ZoneStatus::Fresh);
        }
    }
    assert!(total > 0, "synthetic markets should produce zones");
}

#[test]
fn test_no_overlapping_zones_of_same_type() {
    let detector = detector();
    for (symbol, bars) in markets() {
        let zones = detector.detect_zones(&bars, &symbol);
        for (i, a) in zones.iter().enumerate() {
            for b in zones.iter().skip(i + 1) {
                if a.zone_type == b.zone_type {
                    assert!(
                        !a.overlaps(b.zone_bottom, b.zone_top),
                        "{}: [{}, {}] overlaps [{}, {}]",
                        symbol,
                        a.zone_bottom,
                        a.zone_top,
                        b.zone_bottom,
                        b.zone_top
                    );
                }
            }
        }
    }
}

#[test]
fn test_detection_is_deterministic_and_parallel_matches_sequential() {
    let detector = detector();
    let series = markets();

    let parallel = detector.detect_zones_parallel(&series);
    assert_eq!(parallel.len(), series.len());

    for ((symbol, bars), (par_symbol, par_zones)) in series.iter().zip(parallel.iter()) {
        assert_eq!(symbol, par_symbol);
        let first: Vec<_> = detector.detect_zones(bars, symbol).iter().map(signature).collect();
        let second: Vec<_> = detector.detect_zones(bars, symbol).iter().map(signature).collect();
        let par: Vec<_> = par_zones.iter().map(signature).collect();
        assert_eq!(first, second);
        assert_eq!(first, par);
    }
}

#[test]
fn test_complete_analysis_is_idempotent() {
    let detector = detector();
    let analyzer = enhanced();

    for (symbol, bars) in markets() {
        let now_ms = bars.last().unwrap().timestamp + DAY_MS;
        let price = bars.last().unwrap().close;
        for zone in detector.detect_zones(&bars, &symbol) {
            let a = analyzer.analyze_zone_complete_at(&zone, &bars, price, None, now_ms);
            let b = analyzer.analyze_zone_complete_at(&zone, &bars, price, None, now_ms);
            assert_eq!(a.enhanced_score, b.enhanced_score);
            assert_eq!(a.confirmations, b.confirmations);
            assert_eq!(a.recommendation, b.recommendation);
            assert!((0.0..=100.0).contains(&a.enhanced_score));
        }
    }
}

#[test]
fn test_broken_zone_never_recovers() {
    let analyzer = ZoneAnalyzer::new(AnalyzerConfig::default()).unwrap();
    let mut zone =
        Zone::new("AAPL", ZoneType::Supply, 120.0, 118.0, 0, 0, 1000.0, 2500.0, 4.0, 70.0).unwrap();
    zone.mark_broken();

    for price in [90.0, 110.0, 118.5, 119.0, 121.0, 150.0] {
        let history: Vec<TestResult> = Vec::new();
        let analysis = analyzer.analyze_zone_at(&zone, price, Some(history.as_slice()), DAY_MS);
        assert_eq!(analysis.zone.status, ZoneStatus::Broken, "price {}", price);
        assert!(!analysis.zone.is_active);
        zone = analysis.zone;
    }
}

#[test]
fn test_monitor_emits_each_event_once_until_reset() {
    let monitor = PriceMonitor::new(MonitorConfig::default()).unwrap();
    let mut zones = vec![
        Zone::new("AAPL", ZoneType::Demand, 180.0, 178.0, 0, 0, 1000.0, 3000.0, 5.0, 80.0).unwrap(),
        Zone::new("AAPL", ZoneType::Supply, 181.0, 179.5, 0, 1, 1000.0, 3000.0, 5.0, 80.0).unwrap(),
    ];

    let first = monitor.check(&mut zones, 179.8, DAY_MS);
    assert!(!first.is_empty());
    assert!(monitor.check(&mut zones, 179.8, 2 * DAY_MS).is_empty());

    monitor.reset_alert_tracking();
    let again = monitor.check(&mut zones, 179.8, 3 * DAY_MS);
    let keys: HashSet<_> = again.iter().map(|e| (e.zone_id.clone(), e.event_type)).collect();
    assert_eq!(keys.len(), again.len());
    assert_eq!(again.len(), first.len());
}
