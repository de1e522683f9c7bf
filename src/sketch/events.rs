use serde::Serialize;

use crate::{
    error::SensorError,
    export::ExportArtifact,
    models::{Coordinate, DrawingMode, PositionSample},
};

/// Everything the UI needs to render controls and status.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SketchSnapshot {
    pub mode: DrawingMode,
    pub session_id: Option<String>,
    pub location: Option<Coordinate>,
    pub polygon: Vec<Coordinate>,
    pub route: Vec<Coordinate>,
    /// Whether the active mode's geometry meets its save threshold.
    pub savable: bool,
    pub tracking: bool,
    pub last_position: Option<PositionSample>,
    pub last_sensor_error: Option<SensorError>,
}

/// Outbound notifications. Called with the sketch state locked, so calls
/// arrive in the same order the events were processed.
pub trait SketchEvents: Send + Sync {
    fn state_changed(&self, snapshot: &SketchSnapshot);
    fn sensor_notice(&self, error: &SensorError);
    fn exported(&self, artifact: &ExportArtifact);
}
