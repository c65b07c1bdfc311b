//! Procedural mazes with a first-person, BSP-occluded view.
//!
//! The data flows leaf-to-root through the modules:
//!
//! ```text
//! world::cells ─► generator (carve, rooms, exit) ─► world::distance
//!      ─► world::segments ─► world::bsp ─► engine (visible wall spans)
//! ```
//!
//! Generation produces an owned, immutable [`generator::Maze`]; the renderer
//! and the navigation surface in [`sim`] only borrow it.

pub mod engine;
pub mod generator;
pub mod renderer;
pub mod sim;
pub mod world;
