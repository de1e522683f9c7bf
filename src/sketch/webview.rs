use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{anyhow, Result};
use serde::Serialize;
use tauri::{AppHandle, Emitter};

use crate::{
    error::SensorError,
    export::ExportArtifact,
    map::{MapSurface, Overlay, OverlayId},
    models::Coordinate,
    position::SensorCommand,
};

use super::{SketchEvents, SketchSnapshot};

/// What the webview map should currently show. Kept so a freshly loaded page
/// can catch up on overlays drawn before it started listening.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapScene {
    pub overlays: BTreeMap<OverlayId, Overlay>,
    pub view: Option<(Coordinate, u8)>,
    pub listening: bool,
    #[serde(skip)]
    next_id: u64,
}

#[derive(Serialize, Clone)]
#[serde(tag = "op", rename_all = "camelCase")]
enum MapCommand<'a> {
    Add { id: OverlayId, overlay: &'a Overlay },
    Update { id: OverlayId, coordinates: &'a [Coordinate] },
    Remove { id: OverlayId },
    SetView { center: Coordinate, zoom: u8 },
    ClickListening { enabled: bool },
}

/// Leaflet map in the webview, driven through `map-command` events.
pub struct WebviewSurface {
    app_handle: AppHandle,
    scene: Arc<Mutex<MapScene>>,
}

impl WebviewSurface {
    pub fn new(app_handle: AppHandle) -> Self {
        Self {
            app_handle,
            scene: Arc::new(Mutex::new(MapScene::default())),
        }
    }

    pub fn scene(&self) -> Arc<Mutex<MapScene>> {
        self.scene.clone()
    }

    fn send(&self, command: MapCommand<'_>) -> Result<()> {
        self.app_handle
            .emit("map-command", command)
            .map_err(|err| anyhow!("failed to emit map-command: {err}"))
    }

    fn with_scene<T>(&self, f: impl FnOnce(&mut MapScene) -> T) -> T {
        let mut scene = self.scene.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut scene)
    }
}

impl MapSurface for WebviewSurface {
    fn add_overlay(&mut self, overlay: Overlay) -> Result<OverlayId> {
        let id = self.with_scene(|scene| {
            scene.next_id += 1;
            OverlayId(scene.next_id)
        });
        self.send(MapCommand::Add {
            id,
            overlay: &overlay,
        })?;
        self.with_scene(|scene| scene.overlays.insert(id, overlay));
        Ok(id)
    }

    fn update_overlay(&mut self, id: OverlayId, coordinates: &[Coordinate]) -> Result<()> {
        self.send(MapCommand::Update { id, coordinates })?;
        self.with_scene(|scene| match scene.overlays.get_mut(&id) {
            Some(overlay) => {
                overlay.coordinates = coordinates.to_vec();
                Ok(())
            }
            None => Err(anyhow!("unknown overlay {}", id.0)),
        })
    }

    fn remove_overlay(&mut self, id: OverlayId) -> Result<()> {
        self.send(MapCommand::Remove { id })?;
        self.with_scene(|scene| scene.overlays.remove(&id));
        Ok(())
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) -> Result<()> {
        self.send(MapCommand::SetView { center, zoom })?;
        self.with_scene(|scene| scene.view = Some((center, zoom)));
        Ok(())
    }

    fn set_click_listening(&mut self, enabled: bool) -> Result<()> {
        self.send(MapCommand::ClickListening { enabled })?;
        self.with_scene(|scene| scene.listening = enabled);
        Ok(())
    }
}

pub struct WebviewEvents {
    app_handle: AppHandle,
}

impl WebviewEvents {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl SketchEvents for WebviewEvents {
    fn state_changed(&self, snapshot: &SketchSnapshot) {
        let _ = self.app_handle.emit("sketch-state-changed", snapshot.clone());
    }

    fn sensor_notice(&self, error: &SensorError) {
        #[derive(Serialize, Clone)]
        struct SensorNoticeEvent {
            error: SensorError,
            message: String,
        }

        let _ = self.app_handle.emit(
            "sensor-notice",
            SensorNoticeEvent {
                error: error.clone(),
                message: error.to_string(),
            },
        );
    }

    fn exported(&self, artifact: &ExportArtifact) {
        let _ = self.app_handle.emit("sketch-exported", artifact.clone());
    }
}

/// Forwards watch requests to the webview, which owns `navigator.geolocation`.
pub fn announce_sensor_command(app_handle: &AppHandle, command: SensorCommand) {
    let _ = app_handle.emit("position-watch", command);
}
