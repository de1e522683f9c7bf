use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::{Coordinate, GeometryKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayShape {
    Marker,
    Polygon,
    Polyline,
}

impl OverlayShape {
    pub fn for_kind(kind: GeometryKind) -> Self {
        match kind {
            GeometryKind::Location => OverlayShape::Marker,
            GeometryKind::Polygon => OverlayShape::Polygon,
            GeometryKind::Route => OverlayShape::Polyline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub shape: OverlayShape,
    pub coordinates: Vec<Coordinate>,
    /// Popup text shown on the overlay, markers only.
    pub label: Option<String>,
}

/// The drawable map. Tiles belong to the map itself; only overlays, the view
/// and click delivery are controlled from here.
pub trait MapSurface: Send {
    fn add_overlay(&mut self, overlay: Overlay) -> Result<OverlayId>;
    fn update_overlay(&mut self, id: OverlayId, coordinates: &[Coordinate]) -> Result<()>;
    fn remove_overlay(&mut self, id: OverlayId) -> Result<()>;
    fn set_view(&mut self, center: Coordinate, zoom: u8) -> Result<()>;
    fn set_click_listening(&mut self, enabled: bool) -> Result<()>;
}

/// Holds at most one overlay on the surface. The first draw adds it, later
/// draws update it in place, so a long session never stacks duplicate shapes.
#[derive(Debug, Clone)]
pub struct OverlaySlot {
    shape: OverlayShape,
    label: Option<String>,
    id: Option<OverlayId>,
}

impl OverlaySlot {
    pub fn new(shape: OverlayShape) -> Self {
        Self {
            shape,
            label: None,
            id: None,
        }
    }

    pub fn labelled(shape: OverlayShape, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new(shape)
        }
    }

    pub fn id(&self) -> Option<OverlayId> {
        self.id
    }

    /// Shows `coordinates`, removing the overlay when there is nothing to show.
    pub fn draw(&mut self, surface: &mut dyn MapSurface, coordinates: &[Coordinate]) -> Result<()> {
        if coordinates.is_empty() {
            return self.clear(surface);
        }

        match self.id {
            Some(id) => surface.update_overlay(id, coordinates),
            None => {
                let id = surface.add_overlay(Overlay {
                    shape: self.shape,
                    coordinates: coordinates.to_vec(),
                    label: self.label.clone(),
                })?;
                self.id = Some(id);
                Ok(())
            }
        }
    }

    pub fn clear(&mut self, surface: &mut dyn MapSurface) -> Result<()> {
        if let Some(id) = self.id.take() {
            surface.remove_overlay(id)?;
        }
        Ok(())
    }
}
