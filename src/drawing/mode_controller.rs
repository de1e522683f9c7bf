use uuid::Uuid;

use crate::models::{Coordinate, DrawingMode};

use super::GeometryAccumulator;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Single-tag drawing state. Only one mode can be active, and every transition
/// wipes whatever geometry the accumulator was holding.
#[derive(Debug, Clone)]
pub struct ModeController {
    mode: DrawingMode,
    session_id: Option<String>,
}

impl ModeController {
    /// Starts idle, seeding `accumulator` with a location point at
    /// `default_location` so the map has a marker before any interaction.
    pub fn new(accumulator: &mut GeometryAccumulator, default_location: Coordinate) -> Self {
        accumulator.reset_all();
        accumulator.seed_location(default_location);
        Self {
            mode: DrawingMode::Idle,
            session_id: None,
        }
    }

    pub fn active_mode(&self) -> DrawingMode {
        self.mode
    }

    /// Identifier of the current drawing session, `None` while idle.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Resets all geometry and activates `mode`. Re-entering the active mode
    /// also starts over.
    pub fn enter(&mut self, accumulator: &mut GeometryAccumulator, mode: DrawingMode) {
        accumulator.reset_all();
        let previous = self.mode;
        self.mode = mode;
        self.session_id = match mode {
            DrawingMode::Idle => None,
            _ => Some(Uuid::new_v4().to_string()),
        };
        log_debug!("drawing mode {} -> {}", previous, mode);
    }

    pub fn reset_to_idle(&mut self, accumulator: &mut GeometryAccumulator) {
        self.enter(accumulator, DrawingMode::Idle);
    }
}
