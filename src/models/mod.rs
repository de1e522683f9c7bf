pub mod coordinate;
pub mod geometry;
pub mod mode;

pub use coordinate::{Coordinate, PositionSample};
pub use geometry::{Geometry, Metadata};
pub use mode::{DrawingMode, GeometryKind};
