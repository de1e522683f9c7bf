use serde::{Deserialize, Serialize};

use super::{Coordinate, GeometryKind};

/// A drawn shape. Vertex order is click order: it fixes polygon winding and
/// route direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "coordinates", rename_all = "camelCase")]
pub enum Geometry {
    Point(Coordinate),
    Polygon(Vec<Coordinate>),
    Route(Vec<Coordinate>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Location,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::Route(_) => GeometryKind::Route,
        }
    }

    pub fn vertices(&self) -> &[Coordinate] {
        match self {
            Geometry::Point(coord) => std::slice::from_ref(coord),
            Geometry::Polygon(vertices) | Geometry::Route(vertices) => vertices,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.vertices().len() >= self.kind().min_vertices()
    }
}

/// User-entered fields attached at save time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub region: String,
    pub description: String,
}

impl Metadata {
    pub fn new(region: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            description: description.into(),
        }
    }
}
