use crate::domain::ports::AlertSink;
use crate::domain::zones::{Priority, ZoneEvent};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Logs every event as structured fields plus its JSON payload.
#[derive(Debug, Default, Clone)]
pub struct TracingAlertSink;

impl TracingAlertSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertSink for TracingAlertSink {
    async fn emit(&self, event: &ZoneEvent) -> Result<()> {
        let payload = serde_json::to_string(event).context("Failed to serialize zone event")?;

        match event.priority {
            Priority::High => warn!(
                symbol = %event.symbol,
                event_type = %event.event_type,
                priority = %event.priority,
                price = event.current_price,
                distance_pct = event.distance_pct,
                "ZONE ALERT {}",
                payload
            ),
            _ => info!(
                symbol = %event.symbol,
                event_type = %event.event_type,
                priority = %event.priority,
                price = event.current_price,
                distance_pct = event.distance_pct,
                "Zone alert {}",
                payload
            ),
        }
        Ok(())
    }
}

/// Forwards events into an unbounded channel for downstream consumers.
#[derive(Debug, Clone)]
pub struct ChannelAlertSink {
    tx: UnboundedSender<ZoneEvent>,
}

impl ChannelAlertSink {
    pub fn new(tx: UnboundedSender<ZoneEvent>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl AlertSink for ChannelAlertSink {
    async fn emit(&self, event: &ZoneEvent) -> Result<()> {
        self.tx
            .send(event.clone())
            .context("Alert channel closed")?;
        Ok(())
    }
}
