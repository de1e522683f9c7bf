#[cfg(feature = "desktop")]
pub mod commands;
pub mod controller;
pub mod events;
#[cfg(feature = "desktop")]
pub mod webview;

pub use controller::SketchController;
pub use events::{SketchEvents, SketchSnapshot};
