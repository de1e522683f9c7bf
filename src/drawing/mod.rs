pub mod accumulator;
pub mod mode_controller;

pub use accumulator::GeometryAccumulator;
pub use mode_controller::ModeController;
