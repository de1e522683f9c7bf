use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DrawingMode {
    Idle,
    Location,
    Polygon,
    Route,
}

impl Default for DrawingMode {
    fn default() -> Self {
        DrawingMode::Idle
    }
}

impl DrawingMode {
    /// The geometry this mode accumulates, `None` while idle.
    pub fn kind(self) -> Option<GeometryKind> {
        match self {
            DrawingMode::Idle => None,
            DrawingMode::Location => Some(GeometryKind::Location),
            DrawingMode::Polygon => Some(GeometryKind::Polygon),
            DrawingMode::Route => Some(GeometryKind::Route),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrawingMode::Idle => "idle",
            DrawingMode::Location => "location",
            DrawingMode::Polygon => "polygon",
            DrawingMode::Route => "route",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum GeometryKind {
    Location,
    Polygon,
    Route,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 3] = [
        GeometryKind::Location,
        GeometryKind::Polygon,
        GeometryKind::Route,
    ];

    /// Fewest vertices a geometry of this kind needs before it can be saved.
    pub fn min_vertices(self) -> usize {
        match self {
            GeometryKind::Location => 1,
            GeometryKind::Polygon => 3,
            GeometryKind::Route => 2,
        }
    }

    /// Prefix used for export file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Location => "location",
            GeometryKind::Polygon => "polygon",
            GeometryKind::Route => "route",
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for DrawingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
