use crate::{
    error::{SketchError, SketchResult},
    models::{Coordinate, DrawingMode, Geometry, GeometryKind},
};

use super::ModeController;

/// Owns the in-progress vertices for every geometry kind. Appends are gated on
/// the mode read from the controller at call time.
#[derive(Debug, Clone, Default)]
pub struct GeometryAccumulator {
    location: Option<Coordinate>,
    polygon: Vec<Coordinate>,
    route: Vec<Coordinate>,
}

impl GeometryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a clicked vertex for `mode`. Location keeps only the latest click;
    /// polygon and route push to the end.
    ///
    /// Returns `WrongModeAppend` when `mode` is not the active mode, leaving
    /// every sequence untouched.
    pub fn append(
        &mut self,
        modes: &ModeController,
        mode: DrawingMode,
        coord: Coordinate,
    ) -> SketchResult<GeometryKind> {
        let active = modes.active_mode();
        let kind = match (mode == active, mode.kind()) {
            (true, Some(kind)) => kind,
            _ => {
                return Err(SketchError::WrongModeAppend {
                    requested: mode,
                    active,
                })
            }
        };

        match kind {
            GeometryKind::Location => self.location = Some(coord),
            GeometryKind::Polygon => self.polygon.push(coord),
            GeometryKind::Route => self.route.push(coord),
        }
        Ok(kind)
    }

    /// Live view of the vertices for `kind`, in click order.
    pub fn vertices(&self, kind: GeometryKind) -> &[Coordinate] {
        match kind {
            GeometryKind::Location => self.location.as_slice(),
            GeometryKind::Polygon => &self.polygon,
            GeometryKind::Route => &self.route,
        }
    }

    /// Snapshot of the in-progress geometry. `None` only for a location with
    /// no point yet; polygons and routes are returned even when incomplete.
    pub fn current(&self, kind: GeometryKind) -> Option<Geometry> {
        match kind {
            GeometryKind::Location => self.location.map(Geometry::Point),
            GeometryKind::Polygon => Some(Geometry::Polygon(self.polygon.clone())),
            GeometryKind::Route => Some(Geometry::Route(self.route.clone())),
        }
    }

    pub fn is_savable(&self, kind: GeometryKind) -> bool {
        self.vertices(kind).len() >= kind.min_vertices()
    }

    /// The geometry for `kind` if it meets the save threshold, otherwise the
    /// kind-specific `InsufficientVertices` error.
    pub fn savable(&self, kind: GeometryKind) -> SketchResult<Geometry> {
        match self.current(kind) {
            Some(geometry) if geometry.is_complete() => Ok(geometry),
            _ => Err(SketchError::InsufficientVertices {
                kind,
                required: kind.min_vertices(),
                have: self.vertices(kind).len(),
            }),
        }
    }

    pub fn clear(&mut self, kind: GeometryKind) {
        match kind {
            GeometryKind::Location => self.location = None,
            GeometryKind::Polygon => self.polygon.clear(),
            GeometryKind::Route => self.route.clear(),
        }
    }

    pub fn reset_all(&mut self) {
        for kind in GeometryKind::ALL {
            self.clear(kind);
        }
    }

    pub(crate) fn seed_location(&mut self, coord: Coordinate) {
        self.location = Some(coord);
    }
}
