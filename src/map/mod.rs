pub mod bridge;
pub mod surface;

pub use bridge::{MapInteractionBridge, BOOTSTRAP_LABEL};
pub use surface::{MapSurface, Overlay, OverlayId, OverlayShape, OverlaySlot};
