use crate::{
    drawing::{GeometryAccumulator, ModeController},
    error::{SketchError, SketchResult},
    models::{Coordinate, DrawingMode, GeometryKind, PositionSample},
};

use super::{MapSurface, OverlayShape, OverlaySlot};

/// Popup text on the marker shown before any interaction.
pub const BOOTSTRAP_LABEL: &str = "Here!";

/// The only code that touches map overlays. Geometry is read from the
/// accumulator passed in on every call; the bridge keeps none of its own.
pub struct MapInteractionBridge {
    surface: Box<dyn MapSurface>,
    zoom: u8,
    location: OverlaySlot,
    polygon: OverlaySlot,
    route: OverlaySlot,
    live_marker: OverlaySlot,
}

impl MapInteractionBridge {
    pub fn new(surface: Box<dyn MapSurface>, zoom: u8) -> Self {
        Self {
            surface,
            zoom,
            location: OverlaySlot::new(OverlayShape::Marker),
            polygon: OverlaySlot::new(OverlayShape::Polygon),
            route: OverlaySlot::new(OverlayShape::Polyline),
            live_marker: OverlaySlot::new(OverlayShape::Marker),
        }
    }

    /// Centers the map, draws the seeded location marker and starts listening
    /// for clicks.
    pub fn bootstrap(&mut self, geometry: &GeometryAccumulator, center: Coordinate) -> SketchResult<()> {
        self.location = OverlaySlot::labelled(OverlayShape::Marker, BOOTSTRAP_LABEL);
        self.surface.set_view(center, self.zoom).map_err(SketchError::Surface)?;
        self.redraw(geometry, GeometryKind::Location)?;
        self.surface
            .set_click_listening(true)
            .map_err(SketchError::Surface)
    }

    /// Removes drawing overlays, then switches mode. The live marker stays.
    pub fn enter_mode(
        &mut self,
        modes: &mut ModeController,
        geometry: &mut GeometryAccumulator,
        mode: DrawingMode,
    ) -> SketchResult<()> {
        self.clear_drawing_overlays()?;
        modes.enter(geometry, mode);
        Ok(())
    }

    /// Appends `coord` for `mode` and redraws that kind's overlay.
    pub fn handle_click(
        &mut self,
        modes: &ModeController,
        geometry: &mut GeometryAccumulator,
        mode: DrawingMode,
        coord: Coordinate,
    ) -> SketchResult<GeometryKind> {
        let kind = geometry.append(modes, mode, coord)?;
        self.redraw(geometry, kind)?;
        Ok(kind)
    }

    /// Moves the live marker to the sample. The view follows only while idle so
    /// an in-progress drawing is never scrolled away. Returns whether the view
    /// was recentered.
    pub fn handle_position(&mut self, active: DrawingMode, sample: &PositionSample) -> SketchResult<bool> {
        self.live_marker
            .draw(self.surface.as_mut(), &[sample.coordinate])
            .map_err(SketchError::Surface)?;

        if active != DrawingMode::Idle {
            return Ok(false);
        }
        self.surface
            .set_view(sample.coordinate, self.zoom)
            .map_err(SketchError::Surface)?;
        Ok(true)
    }

    /// Explicit "show current location": recenters regardless of mode.
    pub fn show_location(&mut self, coord: Coordinate) -> SketchResult<()> {
        self.live_marker
            .draw(self.surface.as_mut(), &[coord])
            .map_err(SketchError::Surface)?;
        self.surface.set_view(coord, self.zoom).map_err(SketchError::Surface)
    }

    pub fn remove_live_marker(&mut self) -> SketchResult<()> {
        self.live_marker
            .clear(self.surface.as_mut())
            .map_err(SketchError::Surface)
    }

    pub fn redraw(&mut self, geometry: &GeometryAccumulator, kind: GeometryKind) -> SketchResult<()> {
        let vertices = geometry.vertices(kind);
        let slot = match kind {
            GeometryKind::Location => &mut self.location,
            GeometryKind::Polygon => &mut self.polygon,
            GeometryKind::Route => &mut self.route,
        };
        slot.draw(self.surface.as_mut(), vertices)
            .map_err(SketchError::Surface)
    }

    pub fn clear_drawing_overlays(&mut self) -> SketchResult<()> {
        for slot in [&mut self.location, &mut self.polygon, &mut self.route] {
            slot.clear(self.surface.as_mut()).map_err(SketchError::Surface)?;
        }
        self.location = OverlaySlot::new(OverlayShape::Marker);
        Ok(())
    }

    /// Removes every overlay and stops click delivery.
    pub fn teardown(&mut self) -> SketchResult<()> {
        self.clear_drawing_overlays()?;
        self.remove_live_marker()?;
        self.surface
            .set_click_listening(false)
            .map_err(SketchError::Surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSurface;
    use chrono::Utc;

    const TOKYO: Coordinate = Coordinate::new(35.6895, 139.6917);

    fn setup() -> (
        MapInteractionBridge,
        ModeController,
        GeometryAccumulator,
        std::sync::Arc<std::sync::Mutex<crate::testing::SurfaceLog>>,
    ) {
        let surface = RecordingSurface::new();
        let log = surface.log();
        let mut bridge = MapInteractionBridge::new(Box::new(surface), 15);
        let mut geometry = GeometryAccumulator::new();
        let modes = ModeController::new(&mut geometry, TOKYO);
        bridge.bootstrap(&geometry, TOKYO).unwrap();
        (bridge, modes, geometry, log)
    }

    #[test]
    fn bootstrap_shows_labelled_marker_and_listens() {
        let (_bridge, _modes, _geometry, log) = setup();
        let log = log.lock().unwrap();

        assert_eq!(log.view, Some((TOKYO, 15)));
        assert!(log.listening);
        let marker = log.live.values().next().unwrap();
        assert_eq!(marker.shape, OverlayShape::Marker);
        assert_eq!(marker.label.as_deref(), Some(BOOTSTRAP_LABEL));
        assert_eq!(marker.coordinates, vec![TOKYO]);
    }

    #[test]
    fn polygon_clicks_reuse_one_overlay() {
        let (mut bridge, mut modes, mut geometry, log) = setup();
        bridge
            .enter_mode(&mut modes, &mut geometry, DrawingMode::Polygon)
            .unwrap();
        let added_before = log.lock().unwrap().added;

        for i in 0..5 {
            bridge
                .handle_click(
                    &modes,
                    &mut geometry,
                    DrawingMode::Polygon,
                    Coordinate::new(i as f64, i as f64),
                )
                .unwrap();
            let log = log.lock().unwrap();
            let polygon = log
                .live
                .values()
                .find(|o| o.shape == OverlayShape::Polygon)
                .unwrap();
            assert_eq!(polygon.coordinates.len(), i + 1);
        }

        let log = log.lock().unwrap();
        assert_eq!(log.added - added_before, 1);
        assert_eq!(log.live.len(), 1);
    }

    #[test]
    fn mode_switch_keeps_live_marker_only() {
        let (mut bridge, mut modes, mut geometry, log) = setup();
        let sample = PositionSample::at(Coordinate::new(35.0, 139.0), Utc::now());
        bridge.handle_position(modes.active_mode(), &sample).unwrap();

        bridge
            .enter_mode(&mut modes, &mut geometry, DrawingMode::Route)
            .unwrap();
        bridge
            .handle_click(&modes, &mut geometry, DrawingMode::Route, TOKYO)
            .unwrap();
        bridge
            .enter_mode(&mut modes, &mut geometry, DrawingMode::Location)
            .unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.live.len(), 1);
        let live = log.live.values().next().unwrap();
        assert_eq!(live.coordinates, vec![Coordinate::new(35.0, 139.0)]);
        assert_eq!(live.label, None);
    }

    #[test]
    fn position_recenters_only_while_idle() {
        let (mut bridge, mut modes, mut geometry, log) = setup();
        let first = PositionSample::at(Coordinate::new(35.0, 139.0), Utc::now());
        assert!(bridge.handle_position(modes.active_mode(), &first).unwrap());

        bridge
            .enter_mode(&mut modes, &mut geometry, DrawingMode::Polygon)
            .unwrap();
        let second = PositionSample::at(Coordinate::new(36.0, 140.0), Utc::now());
        assert!(!bridge.handle_position(modes.active_mode(), &second).unwrap());

        let log = log.lock().unwrap();
        assert_eq!(log.view, Some((Coordinate::new(35.0, 139.0), 15)));

        bridge_live_marker_at(&log, Coordinate::new(36.0, 140.0));
    }

    #[test]
    fn show_location_recenters_mid_drawing() {
        let (mut bridge, mut modes, mut geometry, log) = setup();
        bridge
            .enter_mode(&mut modes, &mut geometry, DrawingMode::Route)
            .unwrap();
        let here = Coordinate::new(34.0, 135.0);
        bridge.show_location(here).unwrap();

        assert_eq!(log.lock().unwrap().view, Some((here, 15)));
    }

    #[test]
    fn wrong_mode_click_draws_nothing() {
        let (mut bridge, mut modes, mut geometry, log) = setup();
        bridge
            .enter_mode(&mut modes, &mut geometry, DrawingMode::Route)
            .unwrap();
        let added = log.lock().unwrap().added;

        let err = bridge
            .handle_click(&modes, &mut geometry, DrawingMode::Polygon, TOKYO)
            .unwrap_err();
        assert!(matches!(err, SketchError::WrongModeAppend { .. }));
        assert_eq!(log.lock().unwrap().added, added);
    }

    #[test]
    fn teardown_clears_everything() {
        let (mut bridge, modes, _geometry, log) = setup();
        let sample = PositionSample::at(TOKYO, Utc::now());
        bridge.handle_position(modes.active_mode(), &sample).unwrap();

        bridge.teardown().unwrap();
        let log = log.lock().unwrap();
        assert!(log.live.is_empty());
        assert!(!log.listening);
    }

    fn bridge_live_marker_at(log: &crate::testing::SurfaceLog, coord: Coordinate) {
        assert!(log
            .live
            .values()
            .any(|o| o.shape == OverlayShape::Marker && o.coordinates == vec![coord]));
    }
}
