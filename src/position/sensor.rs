use std::sync::Mutex;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{error::SensorError, models::PositionSample};

use super::FeedOptions;

#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    Sample(PositionSample),
    Error(SensorError),
}

pub type SensorSink = mpsc::UnboundedSender<SensorEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchId(pub u64);

/// A continuous position source. `watch` starts delivering events into `sink`
/// until `clear_watch` is called with the returned id.
pub trait PositionSensor: Send + Sync {
    fn watch(&self, options: &FeedOptions, sink: SensorSink) -> Result<WatchId>;
    fn clear_watch(&self, id: WatchId);
}

/// Instructions for whoever drives the physical sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SensorCommand {
    Watch { id: WatchId, options: FeedOptions },
    ClearWatch { id: WatchId },
}

type Announcer = Box<dyn Fn(SensorCommand) + Send + Sync>;

struct ChannelState {
    next_id: u64,
    active: Option<(WatchId, SensorSink)>,
    options: FeedOptions,
}

/// Sensor fed from outside the process: readings are pushed in through
/// [`ChannelSensor::push`], and start/stop requests go out through the
/// announcer so the producer knows which options to use.
pub struct ChannelSensor {
    state: Mutex<ChannelState>,
    announcer: Option<Announcer>,
}

impl ChannelSensor {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState {
                next_id: 1,
                active: None,
                options: FeedOptions::default(),
            }),
            announcer: None,
        }
    }

    pub fn with_announcer(announcer: impl Fn(SensorCommand) + Send + Sync + 'static) -> Self {
        Self {
            announcer: Some(Box::new(announcer)),
            ..Self::new()
        }
    }

    /// Delivers an event to the active watch. Returns `false` when nothing is
    /// watching, in which case the event is discarded.
    pub fn push(&self, event: SensorEvent) -> bool {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match &state.active {
            Some((_, sink)) => sink.send(event).is_ok(),
            None => false,
        }
    }

    pub fn is_watching(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .active
            .is_some()
    }

    /// The watch a late-starting producer should pick up, if one is active.
    pub fn current_watch(&self) -> Option<SensorCommand> {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.active.as_ref().map(|(id, _)| SensorCommand::Watch {
            id: *id,
            options: state.options,
        })
    }

    fn announce(&self, command: SensorCommand) {
        if let Some(announcer) = &self.announcer {
            announcer(command);
        }
    }
}

impl Default for ChannelSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionSensor for ChannelSensor {
    fn watch(&self, options: &FeedOptions, sink: SensorSink) -> Result<WatchId> {
        let id = {
            let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if state.active.is_some() {
                bail!("sensor already has an active watch");
            }
            let id = WatchId(state.next_id);
            state.next_id += 1;
            state.active = Some((id, sink));
            state.options = *options;
            id
        };

        self.announce(SensorCommand::Watch {
            id,
            options: *options,
        });
        Ok(id)
    }

    fn clear_watch(&self, id: WatchId) {
        let cleared = {
            let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            match state.active {
                Some((active_id, _)) if active_id == id => {
                    state.active = None;
                    true
                }
                _ => false,
            }
        };

        if cleared {
            self.announce(SensorCommand::ClearWatch { id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn push_without_watch_is_discarded() {
        let sensor = ChannelSensor::new();
        assert!(!sensor.push(SensorEvent::Error(SensorError::Timeout)));
    }

    #[test]
    fn watch_announces_options_and_clear_announces_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sensor = ChannelSensor::with_announcer(move |cmd| sink_seen.lock().unwrap().push(cmd));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = sensor.watch(&FeedOptions::default(), tx).unwrap();
        assert!(sensor.push(SensorEvent::Error(SensorError::Timeout)));
        assert_eq!(rx.try_recv().unwrap(), SensorEvent::Error(SensorError::Timeout));

        assert_eq!(
            sensor.current_watch(),
            Some(SensorCommand::Watch {
                id,
                options: FeedOptions::default()
            })
        );

        sensor.clear_watch(id);
        sensor.clear_watch(id);
        assert!(!sensor.is_watching());
        assert_eq!(sensor.current_watch(), None);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                SensorCommand::Watch {
                    id,
                    options: FeedOptions::default()
                },
                SensorCommand::ClearWatch { id },
            ]
        );
    }

    #[test]
    fn second_watch_is_refused() {
        let sensor = ChannelSensor::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        sensor.watch(&FeedOptions::default(), tx.clone()).unwrap();
        assert!(sensor.watch(&FeedOptions::default(), tx).is_err());
    }
}
