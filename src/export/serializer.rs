//! WKT and CSV encoding for a finished drawing.
//!
//! Coordinates are written `lon lat` with Rust's shortest round-trip float
//! formatting, so `139.0` prints as `139`. Polygon rings are written exactly as
//! clicked and are not closed by repeating the first vertex; parsers that
//! demand closed rings will reject them.

use serde::Serialize;

use crate::models::{Coordinate, Geometry, Metadata};

pub const CSV_MIME: &str = "text/csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    pub wkt: String,
    pub csv_line: String,
    pub filename: String,
}

pub fn serialize(geometry: &Geometry, metadata: &Metadata) -> ExportArtifact {
    let wkt = to_wkt(geometry);
    // Region and description are written raw; commas or quotes in them
    // produce extra columns.
    let csv_line = format!("\"{}\",{},{}", wkt, metadata.region, metadata.description);
    let filename = format!("{}_{}.csv", geometry.kind().as_str(), metadata.region);

    ExportArtifact {
        wkt,
        csv_line,
        filename,
    }
}

pub fn to_wkt(geometry: &Geometry) -> String {
    match geometry {
        Geometry::Point(coord) => format!("POINT ({})", position(coord)),
        Geometry::Polygon(vertices) => format!("POLYGON (({}))", position_list(vertices)),
        Geometry::Route(vertices) => format!("LINESTRING ({})", position_list(vertices)),
    }
}

fn position(coord: &Coordinate) -> String {
    format!("{} {}", coord.longitude, coord.latitude)
}

fn position_list(vertices: &[Coordinate]) -> String {
    vertices.iter().map(position).collect::<Vec<_>>().join(", ")
}
