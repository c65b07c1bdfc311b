pub mod bsp;
pub mod camera;
pub mod cells;
pub mod distance;
pub mod geometry;
pub mod rooms;
pub mod segments;

pub use bsp::{BspBuilder, BspError, BspNode, BspTree, NodeId};
pub use camera::Camera;
pub use cells::{CellFlags, CellGrid, Dir, GridError};
pub use distance::{DistanceError, DistanceField};
pub use geometry::{Aabb, Placement, SplitLine};
pub use rooms::Room;
pub use segments::{MAP_UNIT, WallSegment, extract_segments, wall_color};
