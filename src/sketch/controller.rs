use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use tokio::sync::Mutex as AsyncMutex;

use crate::{
    drawing::{GeometryAccumulator, ModeController},
    error::{SensorError, SketchError, SketchResult},
    export::{self, ExportArtifact, FileExporter, CSV_MIME},
    map::{MapInteractionBridge, MapSurface},
    models::{Coordinate, DrawingMode, GeometryKind, Metadata, PositionSample},
    position::{PositionFeed, PositionSensor, SubscriptionHandle},
    settings::SketchSettings,
};

use super::{SketchEvents, SketchSnapshot};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Everything a single event may touch. Handlers lock it, finish their work,
/// and release it, so clicks and samples never interleave.
struct SketchState {
    modes: ModeController,
    geometry: GeometryAccumulator,
    bridge: MapInteractionBridge,
    tracking: bool,
    last_position: Option<PositionSample>,
    last_sensor_error: Option<SensorError>,
}

impl SketchState {
    fn snapshot(&self) -> SketchSnapshot {
        let mode = self.modes.active_mode();
        SketchSnapshot {
            mode,
            session_id: self.modes.session_id().map(str::to_owned),
            location: self.geometry.vertices(GeometryKind::Location).first().copied(),
            polygon: self.geometry.vertices(GeometryKind::Polygon).to_vec(),
            route: self.geometry.vertices(GeometryKind::Route).to_vec(),
            savable: mode
                .kind()
                .is_some_and(|kind| self.geometry.is_savable(kind)),
            tracking: self.tracking,
            last_position: self.last_position.clone(),
            last_sensor_error: self.last_sensor_error.clone(),
        }
    }
}

struct Tracking {
    feed: PositionFeed,
    handle: Option<SubscriptionHandle>,
}

#[derive(Clone)]
pub struct SketchController {
    state: Arc<Mutex<SketchState>>,
    tracking: Arc<AsyncMutex<Tracking>>,
    events: Arc<dyn SketchEvents>,
    exporter: Arc<dyn FileExporter>,
}

impl SketchController {
    /// Builds the controller idle, with the default location drawn and the
    /// map centered on it. Tracking is not started.
    pub fn new(
        surface: Box<dyn MapSurface>,
        sensor: Arc<dyn PositionSensor>,
        exporter: Arc<dyn FileExporter>,
        events: Arc<dyn SketchEvents>,
        settings: &SketchSettings,
    ) -> SketchResult<Self> {
        let mut geometry = GeometryAccumulator::new();
        let modes = ModeController::new(&mut geometry, settings.default_center);
        let mut bridge = MapInteractionBridge::new(surface, settings.zoom);
        bridge.bootstrap(&geometry, settings.default_center)?;

        Ok(Self {
            state: Arc::new(Mutex::new(SketchState {
                modes,
                geometry,
                bridge,
                tracking: false,
                last_position: None,
                last_sensor_error: None,
            })),
            tracking: Arc::new(AsyncMutex::new(Tracking {
                feed: PositionFeed::new(sensor, settings.feed),
                handle: None,
            })),
            events,
            exporter,
        })
    }

    pub fn snapshot(&self) -> SketchSnapshot {
        self.lock_state().snapshot()
    }

    pub fn active_mode(&self) -> DrawingMode {
        self.lock_state().modes.active_mode()
    }

    /// Enters `mode`, discarding any in-progress geometry and its overlays.
    pub fn start_drawing(&self, mode: DrawingMode) -> SketchResult<SketchSnapshot> {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        state
            .bridge
            .enter_mode(&mut state.modes, &mut state.geometry, mode)?;
        log_info!("drawing mode is now {}", mode);
        Ok(self.publish(state))
    }

    pub fn reset_to_idle(&self) -> SketchResult<SketchSnapshot> {
        self.start_drawing(DrawingMode::Idle)
    }

    /// Appends a vertex for `mode`, surfacing `WrongModeAppend` when `mode` is
    /// not the active one.
    pub fn append_vertex(&self, mode: DrawingMode, coord: Coordinate) -> SketchResult<GeometryKind> {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        let kind = state
            .bridge
            .handle_click(&state.modes, &mut state.geometry, mode, coord)?;
        self.publish(state);
        Ok(kind)
    }

    /// Handles a click from the map. `expected_mode` is the mode the sender
    /// believed active; a mismatch means a stale handler and the click is
    /// dropped. Clicks while idle are ignored.
    pub fn map_clicked(
        &self,
        coord: Coordinate,
        expected_mode: Option<DrawingMode>,
    ) -> SketchResult<SketchSnapshot> {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        let active = state.modes.active_mode();
        if active == DrawingMode::Idle && expected_mode.is_none() {
            log_debug!("ignoring click at {:?} while idle", coord);
            return Ok(state.snapshot());
        }

        let mode = expected_mode.unwrap_or(active);
        match state
            .bridge
            .handle_click(&state.modes, &mut state.geometry, mode, coord)
        {
            Ok(_) => Ok(self.publish(state)),
            Err(err @ SketchError::WrongModeAppend { .. }) => {
                log_warn!("dropping stale click: {err}");
                Ok(state.snapshot())
            }
            Err(err) => Err(err),
        }
    }

    /// Recenters on the most recent fix regardless of mode. Returns `false`
    /// when not tracking or no fix has arrived yet.
    pub fn show_current_location(&self) -> SketchResult<bool> {
        let mut state = self.lock_state();
        if !state.tracking {
            return Ok(false);
        }
        let Some(coord) = state.last_position.as_ref().map(|sample| sample.coordinate) else {
            return Ok(false);
        };
        state.bridge.show_location(coord)?;
        Ok(true)
    }

    /// Subscribes to the position feed. Returns `false` if already tracking.
    pub async fn start_tracking(&self) -> Result<bool> {
        let mut tracking = self.tracking.lock().await;
        if tracking.handle.is_some() {
            return Ok(false);
        }

        self.lock_state().tracking = true;

        let sample_state = Arc::downgrade(&self.state);
        let sample_events = self.events.clone();
        let error_state = Arc::downgrade(&self.state);
        let error_events = self.events.clone();

        let started = tracking.feed.start(
            move |sample| {
                if let Some(state) = sample_state.upgrade() {
                    apply_sample(&state, sample_events.as_ref(), sample);
                }
            },
            move |err| {
                if let Some(state) = error_state.upgrade() {
                    apply_sensor_error(&state, error_events.as_ref(), err);
                }
            },
        );

        match started {
            Ok(handle) => {
                tracking.handle = Some(handle);
                let state = self.lock_state();
                self.publish(&state);
                Ok(true)
            }
            Err(err) => {
                self.lock_state().tracking = false;
                Err(err)
            }
        }
    }

    /// Unsubscribes from the feed and removes the live marker. Calling it
    /// when not tracking does nothing.
    pub async fn stop_tracking(&self) -> SketchResult<bool> {
        let stopped = {
            let mut tracking = self.tracking.lock().await;
            match tracking.handle.take() {
                Some(handle) => tracking.feed.stop(handle),
                None => false,
            }
        };

        let mut state = self.lock_state();
        state.tracking = false;
        state.last_position = None;
        if stopped {
            state.bridge.remove_live_marker()?;
            self.publish(&state);
        }
        Ok(stopped)
    }

    /// Exports the active mode's geometry, then clears it and returns to idle.
    /// On any failure the geometry stays so the user can keep drawing or retry.
    pub fn save(&self, metadata: Metadata) -> SketchResult<ExportArtifact> {
        let mut guard = self.lock_state();
        let state = &mut *guard;

        let kind = state
            .modes
            .active_mode()
            .kind()
            .ok_or(SketchError::NoActiveDrawing)?;
        let geometry = state.geometry.savable(kind)?;
        let artifact = export::serialize(&geometry, &metadata);

        let path = self
            .exporter
            .export(artifact.csv_line.as_bytes(), CSV_MIME, &artifact.filename)
            .map_err(|err| {
                log_error!("export of {} failed: {err:#}", artifact.filename);
                SketchError::ExportFailure(format!("{err:#}"))
            })?;
        log_info!("exported {} to {}", kind, path.display());

        state.geometry.clear(kind);
        state
            .bridge
            .enter_mode(&mut state.modes, &mut state.geometry, DrawingMode::Idle)?;

        self.events.exported(&artifact);
        self.publish(state);
        Ok(artifact)
    }

    /// Stops tracking and clears the map. Safe to call more than once.
    pub async fn shutdown(&self) -> Result<()> {
        {
            let mut tracking = self.tracking.lock().await;
            tracking.handle = None;
            tracking.feed.shutdown().await?;
        }

        let mut state = self.lock_state();
        state.tracking = false;
        state.last_position = None;
        state.bridge.teardown()?;
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, SketchState> {
        lock(&self.state)
    }

    fn publish(&self, state: &SketchState) -> SketchSnapshot {
        let snapshot = state.snapshot();
        self.events.state_changed(&snapshot);
        snapshot
    }
}

fn lock(state: &Mutex<SketchState>) -> MutexGuard<'_, SketchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn apply_sample(state: &Mutex<SketchState>, events: &dyn SketchEvents, sample: PositionSample) {
    let mut state = lock(state);
    if !state.tracking {
        log_debug!("discarding sample received after tracking stopped");
        return;
    }

    let active = state.modes.active_mode();
    if let Err(err) = state.bridge.handle_position(active, &sample) {
        log_warn!("failed to follow position: {err}");
    }
    state.last_position = Some(sample);
    state.last_sensor_error = None;
    events.state_changed(&state.snapshot());
}

fn apply_sensor_error(state: &Mutex<SketchState>, events: &dyn SketchEvents, err: SensorError) {
    let mut state = lock(state);
    if !state.tracking {
        log_debug!("discarding sensor error received after tracking stopped: {err}");
        return;
    }
    events.sensor_notice(&err);
    state.last_sensor_error = Some(err);
    events.state_changed(&state.snapshot());
}
