use super::scanner_config::ScannerConfig;
use crate::application::market_data::PriceCache;
use crate::application::monitoring::PriceMonitor;
use crate::application::zones::{EnhancedZoneAnalyzer, ZoneDetector};
use crate::domain::errors::{ConfigError, MarketDataError, ScanError};
use crate::domain::ports::{AlertSink, MarketDataSource, ZoneStore};
use crate::domain::zones::{EnhancedZoneAnalysis, TestResult, Zone, ZoneEvent, ZoneStatus};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{error, info, warn};

/// Per-symbol outcome of a batch. A failed symbol never fails the batch.
#[derive(Debug)]
pub struct SymbolScanResult {
    pub symbol: String,
    pub outcome: Result<Vec<EnhancedZoneAnalysis>, ScanError>,
}

/// Drives the engine against the outside world: fetches history and prices,
/// detects and grades zones, persists them, and turns price moves into alerts.
pub struct ZoneScanner {
    market_data: Arc<dyn MarketDataSource>,
    store: Arc<dyn ZoneStore>,
    alerts: Arc<dyn AlertSink>,
    detector: ZoneDetector,
    analyzer: EnhancedZoneAnalyzer,
    monitor: PriceMonitor,
    price_cache: PriceCache,
    config: ScannerConfig,
}

impl ZoneScanner {
    pub fn new(
        market_data: Arc<dyn MarketDataSource>,
        store: Arc<dyn ZoneStore>,
        alerts: Arc<dyn AlertSink>,
        detector: ZoneDetector,
        analyzer: EnhancedZoneAnalyzer,
        monitor: PriceMonitor,
        config: ScannerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let price_cache = PriceCache::new(monitor.config().price_cache_ttl);
        Ok(Self {
            market_data,
            store,
            alerts,
            detector,
            analyzer,
            monitor,
            price_cache,
            config,
        })
    }

    pub fn monitor(&self) -> &PriceMonitor {
        &self.monitor
    }

    async fn current_price(&self, symbol: &str) -> Result<f64, ScanError> {
        let source = self.market_data.as_ref();
        let policy = &self.config.fetch_policy;
        let price = self
            .price_cache
            .get_or_fetch(symbol, || policy.fetch_price(source, symbol))
            .await?;
        Ok(price)
    }

    /// History -> detect -> grade -> save. Zones already stored for the same
    /// formation keep their id and lifecycle.
    pub async fn scan_symbol(&self, symbol: &str) -> Result<Vec<EnhancedZoneAnalysis>, ScanError> {
        let bars = self
            .config
            .fetch_policy
            .fetch_history(self.market_data.as_ref(), symbol, self.config.history_bars)
            .await?;
        let price = match self.current_price(symbol).await {
            Ok(price) => price,
            Err(ScanError::MarketData(MarketDataError::NoPrice { .. })) if !bars.is_empty() => {
                let close = bars[bars.len() - 1].close;
                warn!(
                    "ZoneScanner: no quote for {}, using last close {:.2}",
                    symbol, close
                );
                close
            }
            Err(e) => return Err(e),
        };

        let detected = self.detector.detect_zones(&bars, symbol);
        let existing = self
            .store
            .get_zones_near_price(symbol, price, f64::MAX)
            .await
            .map_err(|e| store_error(symbol, e))?;

        let mut analyses = Vec::with_capacity(detected.len());
        for candidate in detected {
            let zone = existing
                .iter()
                .find(|z| z.zone_type == candidate.zone_type && z.formed_at == candidate.formed_at)
                .cloned()
                .unwrap_or(candidate);

            let history = self
                .store
                .get_zone_test_history(&zone.id)
                .await
                .map_err(|e| store_error(symbol, e))?;
            let analysis = self
                .analyzer
                .analyze_zone_complete(&zone, &bars, price, Some(history.as_slice()));

            if analysis.zone.is_active {
                self.store
                    .save_zone(&analysis.zone)
                    .await
                    .map_err(|e| store_error(symbol, e))?;
            }
            analyses.push(analysis);
        }

        info!(
            "ZoneScanner: {} scanned ({} bars, price {:.2}) -> {} zones",
            symbol,
            bars.len(),
            price,
            analyses.len()
        );
        Ok(analyses)
    }

    /// Price -> nearby zones -> re-analyze -> monitor -> persist -> alert.
    pub async fn monitor_symbol(&self, symbol: &str) -> Result<Vec<ZoneEvent>, ScanError> {
        let price = self.current_price(symbol).await?;
        let now_ms = Utc::now().timestamp_millis();

        let nearby = self
            .store
            .get_zones_near_price(symbol, price, self.config.near_price_distance_pct)
            .await
            .map_err(|e| store_error(symbol, e))?;

        let mut zones: Vec<Zone> = Vec::with_capacity(nearby.len());
        for zone in nearby {
            let history = self
                .store
                .get_zone_test_history(&zone.id)
                .await
                .map_err(|e| store_error(symbol, e))?;
            let analysis = self
                .analyzer
                .analyzer()
                .analyze_zone_at(&zone, price, Some(history.as_slice()), now_ms);
            zones.push(analysis.zone);
        }

        let events = self.monitor.check(&mut zones, price, now_ms);

        for event in events.iter().filter(|e| e.event_type.is_touch()) {
            self.store
                .record_zone_test(TestResult {
                    zone_id: event.zone_id.clone(),
                    tested_at: now_ms,
                    price,
                    held: true,
                })
                .await
                .map_err(|e| store_error(symbol, e))?;
        }

        for zone in &zones {
            let persisted = if zone.status == ZoneStatus::Broken {
                self.store.mark_zone_broken(&zone.id).await
            } else {
                self.store.save_zone(zone).await.map(|_| ())
            };
            persisted.map_err(|e| store_error(symbol, e))?;
        }

        for event in &events {
            if let Err(e) = self.alerts.emit(event).await {
                warn!(
                    "ZoneScanner: failed to deliver {} for {}: {}",
                    event.event_type, event.symbol, e
                );
            }
        }

        Ok(events)
    }

    /// Scan `symbols` with bounded concurrency. The cancel flag is checked
    /// before each symbol starts; symbols already running finish normally.
    pub async fn scan_batch(
        &self,
        symbols: &[String],
        cancel: &watch::Receiver<bool>,
    ) -> Vec<SymbolScanResult> {
        let results: Vec<SymbolScanResult> = stream::iter(symbols.iter().cloned())
            .map(|symbol| async move {
                let outcome = if *cancel.borrow() {
                    Err(ScanError::Cancelled {
                        symbol: symbol.clone(),
                    })
                } else {
                    self.scan_symbol(&symbol).await
                };
                SymbolScanResult { symbol, outcome }
            })
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        let failed: Vec<&SymbolScanResult> = results.iter().filter(|r| r.outcome.is_err()).collect();
        for result in &failed {
            if let Err(e) = &result.outcome {
                error!("ZoneScanner: {} skipped this cycle: {}", result.symbol, e);
            }
        }
        info!(
            "ZoneScanner: batch done, {}/{} symbols ok",
            results.len() - failed.len(),
            results.len()
        );

        results
    }

    /// Periodic scan + monitor loop until `shutdown` flips to true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "ZoneScanner started. {} symbols, interval {:?}",
            self.config.symbols.len(),
            self.config.scan_interval
        );

        let mut interval = time::interval(self.config.scan_interval);
        let mut last_reset = Instant::now();

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            self.scan_batch(&self.config.symbols, &shutdown).await;

            for symbol in &self.config.symbols {
                if *shutdown.borrow() {
                    break;
                }
                match self.monitor_symbol(symbol).await {
                    Ok(events) if !events.is_empty() => {
                        info!("ZoneScanner: {} -> {} events", symbol, events.len());
                    }
                    Ok(_) => {}
                    Err(e) => warn!("ZoneScanner: monitoring {} failed: {}", symbol, e),
                }
            }

            if last_reset.elapsed() >= self.config.alert_reset_interval {
                self.monitor.reset_alert_tracking();
                last_reset = Instant::now();
            }

            if *shutdown.borrow() {
                break;
            }
        }

        info!("ZoneScanner stopped.");
    }
}

fn store_error(symbol: &str, e: anyhow::Error) -> ScanError {
    ScanError::Store {
        symbol: symbol.to_string(),
        reason: format!("{:#}", e),
    }
}
