pub mod clip_range;
pub mod engine;
pub mod explored;
pub mod pipeline;
pub mod projection;
pub mod types;

pub use clip_range::{ClipRange, RangeSet};
pub use engine::Engine;
pub use explored::Explored;
pub use pipeline::{build_quads, painted_spans};
pub use types::{FrameStats, Screen, WALL_HEIGHT};
