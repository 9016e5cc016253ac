//! The poll loop and device connection monitor.
//!
//! A fixed tick interval drives the dispatcher while the device is
//! connected; presence probes run on their own throttled cadence so the
//! cost of device enumeration stays bounded. Cancellation is cooperative
//! and checked between ticks only, so an in-flight transfer completes.

use std::time::Instant;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::bridge::api::ApiClient;
use crate::bridge::handlers::process_tick;
use crate::bridge::slots::SlotStore;
use crate::config::BridgeConfig;

/// Tracks the device connection state across probes.
#[derive(Debug)]
struct ConnectionState {
    connected: bool,
    last_probe: Option<Instant>,
}

impl ConnectionState {
    fn new() -> Self {
        Self {
            connected: false,
            last_probe: None,
        }
    }

    /// Whether a fresh presence probe is due.
    fn probe_due(&self, interval: std::time::Duration) -> bool {
        self.last_probe.is_none_or(|at| at.elapsed() >= interval)
    }

    /// Records a probe result, logging each transition exactly once.
    fn record(&mut self, present: bool, device: &str) {
        self.last_probe = Some(Instant::now());

        if present && !self.connected {
            tracing::info!("✅ {} connected - monitoring for requests", device);
            self.connected = true;
        } else if !present && self.connected {
            tracing::warn!("⚠️ {} disconnected - waiting for reconnection", device);
            self.connected = false;
        }
    }
}

/// Runs the poll loop until the cancellation token fires.
pub async fn run(
    store: SlotStore,
    api: ApiClient,
    config: &BridgeConfig,
    shutdown: CancellationToken,
) {
    let mut tick = tokio::time::interval(config.tick_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut state = ConnectionState::new();

    tracing::info!(
        "🚀 Poll loop started (tick {:?}, presence probe {:?})",
        config.tick_interval,
        config.presence_interval
    );

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Shutdown requested, stopping poll loop");
                break;
            }
            _ = tick.tick() => {}
        }

        if state.probe_due(config.presence_interval) {
            let present = store.presence().await;
            state.record(present, &config.device_name);
        }

        if state.connected {
            process_tick(&store, &api).await;
        }
    }
}
