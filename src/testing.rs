//! In-memory stand-ins for the map, event sink and file exporter.

use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, bail, Result};

use crate::{
    error::SensorError,
    export::{ExportArtifact, FileExporter},
    map::{MapSurface, Overlay, OverlayId},
    models::Coordinate,
    sketch::{SketchEvents, SketchSnapshot},
};

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub live: BTreeMap<OverlayId, Overlay>,
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub view: Option<(Coordinate, u8)>,
    pub listening: bool,
    next_id: u64,
}

pub struct RecordingSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(SurfaceLog::default())),
        }
    }

    pub fn log(&self) -> Arc<Mutex<SurfaceLog>> {
        self.log.clone()
    }
}

impl MapSurface for RecordingSurface {
    fn add_overlay(&mut self, overlay: Overlay) -> Result<OverlayId> {
        let mut log = self.log.lock().unwrap();
        log.next_id += 1;
        let id = OverlayId(log.next_id);
        log.live.insert(id, overlay);
        log.added += 1;
        Ok(id)
    }

    fn update_overlay(&mut self, id: OverlayId, coordinates: &[Coordinate]) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        let overlay = log
            .live
            .get_mut(&id)
            .ok_or_else(|| anyhow!("update of unknown overlay {id:?}"))?;
        overlay.coordinates = coordinates.to_vec();
        log.updated += 1;
        Ok(())
    }

    fn remove_overlay(&mut self, id: OverlayId) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        if log.live.remove(&id).is_none() {
            bail!("removal of unknown overlay {id:?}");
        }
        log.removed += 1;
        Ok(())
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) -> Result<()> {
        self.log.lock().unwrap().view = Some((center, zoom));
        Ok(())
    }

    fn set_click_listening(&mut self, enabled: bool) -> Result<()> {
        self.log.lock().unwrap().listening = enabled;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingEvents {
    pub snapshots: Mutex<Vec<SketchSnapshot>>,
    pub notices: Mutex<Vec<SensorError>>,
    pub exports: Mutex<Vec<ExportArtifact>>,
}

impl SketchEvents for RecordingEvents {
    fn state_changed(&self, snapshot: &SketchSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }

    fn sensor_notice(&self, error: &SensorError) {
        self.notices.lock().unwrap().push(error.clone());
    }

    fn exported(&self, artifact: &ExportArtifact) {
        self.exports.lock().unwrap().push(artifact.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub mime: String,
    pub contents: String,
}

#[derive(Default)]
pub struct MemoryExporter {
    pub files: Mutex<Vec<ExportedFile>>,
}

impl FileExporter for MemoryExporter {
    fn export(&self, bytes: &[u8], mime: &str, filename: &str) -> Result<PathBuf> {
        self.files.lock().unwrap().push(ExportedFile {
            filename: filename.to_string(),
            mime: mime.to_string(),
            contents: String::from_utf8(bytes.to_vec())?,
        });
        Ok(PathBuf::from(filename))
    }
}

pub struct FailingExporter;

impl FileExporter for FailingExporter {
    fn export(&self, _bytes: &[u8], _mime: &str, _filename: &str) -> Result<PathBuf> {
        bail!("download mechanism unavailable")
    }
}
