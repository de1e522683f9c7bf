use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{error::SensorError, models::PositionSample};

use super::SensorEvent;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

pub(super) type SampleCallback = Box<dyn Fn(PositionSample) + Send + Sync>;
pub(super) type ErrorCallback = Box<dyn Fn(SensorError) + Send + Sync>;

/// Forwards sensor events to the subscriber until cancelled. Samples that do
/// not advance the timestamp are dropped; errors never end the loop.
pub(super) async fn relay_loop(
    mut events: mpsc::UnboundedReceiver<SensorEvent>,
    on_sample: SampleCallback,
    on_error: ErrorCallback,
    cancel_token: CancellationToken,
) {
    let mut last_timestamp: Option<DateTime<Utc>> = None;

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("position relay shutting down");
                break;
            }
            event = events.recv() => match event {
                Some(SensorEvent::Sample(sample)) => {
                    if last_timestamp.is_some_and(|last| sample.timestamp <= last) {
                        log_debug!(
                            "dropping out-of-order sample at {} (last {:?})",
                            sample.timestamp,
                            last_timestamp
                        );
                        continue;
                    }
                    last_timestamp = Some(sample.timestamp);
                    on_sample(sample);
                }
                Some(SensorEvent::Error(err)) => {
                    log_warn!("position sensor reported: {err}");
                    on_error(err);
                }
                None => {
                    log_info!("position sensor closed its channel");
                    break;
                }
            }
        }
    }
}
