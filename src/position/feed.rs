use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{error::SensorError, models::PositionSample};

use super::{loop_worker::relay_loop, FeedOptions, PositionSensor, WatchId};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Returned by [`PositionFeed::start`]; pass it back to stop that subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle(WatchId);

struct ActiveWatch {
    handle: SubscriptionHandle,
    cancel_token: CancellationToken,
    worker: JoinHandle<()>,
}

/// Wraps a [`PositionSensor`] and relays its readings to one subscriber at a
/// time. Dropping the feed stops the subscription.
pub struct PositionFeed {
    sensor: Arc<dyn PositionSensor>,
    options: FeedOptions,
    active: Option<ActiveWatch>,
}

impl PositionFeed {
    pub fn new(sensor: Arc<dyn PositionSensor>, options: FeedOptions) -> Self {
        Self {
            sensor,
            options,
            active: None,
        }
    }

    pub fn options(&self) -> FeedOptions {
        self.options
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Starts watching the sensor. Must be called from within a tokio runtime.
    pub fn start<S, E>(&mut self, on_sample: S, on_error: E) -> Result<SubscriptionHandle>
    where
        S: Fn(PositionSample) + Send + Sync + 'static,
        E: Fn(SensorError) + Send + Sync + 'static,
    {
        if self.active.is_some() {
            bail!("position feed already active");
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let watch_id = self.sensor.watch(&self.options, tx)?;
        let handle = SubscriptionHandle(watch_id);

        let cancel_token = CancellationToken::new();
        let worker = tokio::spawn(relay_loop(
            rx,
            Box::new(on_sample),
            Box::new(on_error),
            cancel_token.clone(),
        ));

        log_info!(
            "position feed started (watch {}, high_accuracy={}, timeout={}ms, max_age={}ms)",
            watch_id.0,
            self.options.high_accuracy,
            self.options.timeout_ms,
            self.options.max_sample_age_ms
        );

        self.active = Some(ActiveWatch {
            handle,
            cancel_token,
            worker,
        });
        Ok(handle)
    }

    /// Unsubscribes `handle`. Stopping a handle that is not running is a no-op;
    /// returns whether anything was actually stopped.
    pub fn stop(&mut self, handle: SubscriptionHandle) -> bool {
        match &self.active {
            Some(active) if active.handle == handle => {}
            _ => return false,
        }
        self.stop_active()
    }

    /// Stops whatever subscription is running, if any.
    pub fn stop_active(&mut self) -> bool {
        self.take_active().is_some()
    }

    /// Stops the running subscription and waits for its relay task to exit.
    pub async fn shutdown(&mut self) -> Result<()> {
        match self.take_active() {
            Some(active) => active
                .worker
                .await
                .context("position relay task failed to join"),
            None => Ok(()),
        }
    }

    fn take_active(&mut self) -> Option<ActiveWatch> {
        let active = self.active.take()?;
        let SubscriptionHandle(watch_id) = active.handle;

        active.cancel_token.cancel();
        self.sensor.clear_watch(watch_id);
        log_info!("position feed stopped (watch {})", watch_id.0);
        Some(active)
    }
}

impl Drop for PositionFeed {
    fn drop(&mut self) {
        self.stop_active();
    }
}
