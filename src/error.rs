//! Error taxonomy for the drawing core.

use serde::{Deserialize, Serialize};

use crate::models::{DrawingMode, GeometryKind};

/// Errors raised by drawing, saving and rendering.
#[derive(Debug, thiserror::Error)]
pub enum SketchError {
    /// Save attempted below the kind's minimum vertex count. Nothing is cleared.
    #[error("{}", insufficient_message(*kind, *required, *have))]
    InsufficientVertices {
        kind: GeometryKind,
        required: usize,
        have: usize,
    },

    /// An append targeted a mode that is not active, usually a stale handler
    /// still firing after a mode switch.
    #[error("cannot append a {requested} vertex while {active} mode is active")]
    WrongModeAppend {
        requested: DrawingMode,
        active: DrawingMode,
    },

    /// Save requested with no drawing mode active.
    #[error("start drawing a location, polygon or route before saving")]
    NoActiveDrawing,

    /// The file could not be written. Geometry is kept so the user can retry.
    #[error("export failed: {0}")]
    ExportFailure(String),

    /// The map surface refused an overlay or view update.
    #[error("map surface update failed: {0}")]
    Surface(#[source] anyhow::Error),
}

fn insufficient_message(kind: GeometryKind, required: usize, have: usize) -> String {
    match kind {
        GeometryKind::Location => "place a point on the map before saving a location".to_string(),
        GeometryKind::Polygon => {
            format!("need at least {required} points for a polygon (have {have})")
        }
        GeometryKind::Route => format!("need at least {required} points for a route (have {have})"),
    }
}

pub type SketchResult<T> = Result<T, SketchError>;

/// Non-fatal sensor failure. The feed keeps running after one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum SensorError {
    #[error("location permission was denied")]
    PermissionDenied,

    #[error("current position is unavailable")]
    PositionUnavailable,

    #[error("timed out waiting for a position fix")]
    Timeout,

    #[error("position sensor error: {0}")]
    Other(String),
}

impl SensorError {
    /// Maps a browser `GeolocationPositionError` code (1 denied, 2 unavailable,
    /// 3 timeout) onto the taxonomy, keeping the raw message for anything else.
    pub fn from_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            1 => SensorError::PermissionDenied,
            2 => SensorError::PositionUnavailable,
            3 => SensorError::Timeout,
            _ => SensorError::Other(message.into()),
        }
    }
}
