//! Maze generation: rooms, carving, exit and start, walls, BSP.
//!
//! [`build`] runs the whole pipeline on the calling thread; [`worker`]
//! runs it on a dedicated thread and hands the finished [`Maze`] over in
//! one piece.

mod backtrack;
mod prim;
pub mod worker;

use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng};
use thiserror::Error;

use crate::world::{
    BspBuilder, BspError, BspTree, CellGrid, Dir, DistanceError, DistanceField, GridError, Room,
    WallSegment, extract_segments,
};

pub use backtrack::Backtrack;
pub use prim::Prim;
pub use worker::{BuildEvent, BuildHandle};

/// Carvers consult the progress callback every this many steps.
pub const CARVE_POLL_INTERVAL: u64 = 1024;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("maze must be at least 2x2, got {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    #[error("generation cancelled")]
    Cancelled,

    #[error("generation worker panicked")]
    WorkerPanicked,

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Distance(#[from] DistanceError),

    #[error(transparent)]
    Bsp(BspError),
}

impl From<BspError> for BuildError {
    fn from(e: BspError) -> Self {
        match e {
            BspError::Cancelled => BuildError::Cancelled,
            e => BuildError::Bsp(e),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Algorithm {
    /// Depth-first carve with backtracking.
    #[default]
    Backtrack,
    /// Randomized Prim's algorithm.
    Prim,
}

/// Everything a generation run needs.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub width: i32,
    pub height: i32,
    pub rooms: u32,
    pub algorithm: Algorithm,
    /// Rough number of partition iterations, only used to scale progress.
    pub expected_partition_iterations: u32,
    /// `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            width: 12,
            height: 12,
            rooms: 2,
            algorithm: Algorithm::Backtrack,
            expected_partition_iterations: 600,
            seed: None,
        }
    }
}

/// A finished maze. Immutable once published.
#[derive(Clone, Debug)]
pub struct Maze {
    pub grid: CellGrid,
    /// Distances to the exit.
    pub dists: DistanceField,
    /// Walls as extracted, before BSP splitting.
    pub segments: Vec<WallSegment>,
    pub bsp: BspTree,
    pub rooms: Vec<Room>,
    pub start: (i32, i32),
    pub exit: (i32, i32),
    /// Side of the exit cell that opens to the outside.
    pub exit_dir: Dir,
    pub color_seed: u8,
}

impl Maze {
    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }
}

/// Monotonic percentage reporter around a caller's callback.
pub struct Progress<'a> {
    last: u8,
    callback: &'a mut dyn FnMut(u8) -> bool,
}

impl<'a> Progress<'a> {
    pub fn new(callback: &'a mut dyn FnMut(u8) -> bool) -> Self {
        Self { last: 0, callback }
    }

    /// Forward `pct`, never going backwards. Returns the callback's verdict.
    pub fn update(&mut self, pct: u8) -> bool {
        self.last = self.last.max(pct.min(100));
        (self.callback)(self.last)
    }

    /// Re-send the current percentage; `Err(Cancelled)` if the caller says stop.
    pub fn poll(&mut self) -> Result<(), BuildError> {
        if self.update(self.last) {
            Ok(())
        } else {
            Err(BuildError::Cancelled)
        }
    }

    pub fn last(&self) -> u8 {
        self.last
    }
}

/// A spanning-tree carving strategy.
///
/// Carvers start from a grid with rooms stamped in and leave every cell
/// visited.
pub trait Carver {
    fn carve<R: Rng + ?Sized>(
        &self,
        grid: &mut CellGrid,
        rng: &mut R,
        progress: &mut Progress<'_>,
    ) -> Result<(), BuildError>;
}

/// Run the whole pipeline on the current thread.
///
/// `on_progress` gets monotonic percentages and may return `false` to cancel.
pub fn build(req: &GenerationRequest, mut on_progress: impl FnMut(u8) -> bool) -> Result<Maze, BuildError> {
    let (w, h) = (req.width, req.height);
    if w < 2 || h < 2 {
        return Err(BuildError::InvalidSize { width: w, height: h });
    }
    let mut progress = Progress::new(&mut on_progress);
    let mut rng = match req.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    /*----- 1. grid and rooms -----*/
    let mut grid = CellGrid::filled(w, h);
    let rooms = grid.place_rooms(req.rooms, &mut rng);
    progress.poll()?;

    /*----- 2. carve -----*/
    match req.algorithm {
        Algorithm::Backtrack => Backtrack.carve(&mut grid, &mut rng, &mut progress)?,
        Algorithm::Prim => Prim.carve(&mut grid, &mut rng, &mut progress)?,
    }

    /*----- 3. exit and start -----*/
    let probe = DistanceField::compute(&grid, w / 2, h / 2)?;
    let exit = probe.farthest_rim_cell();
    let dists = DistanceField::compute(&grid, exit.0, exit.1)?;
    let start = dists.farthest_cell();
    let exit_dir = rim_side(&grid, exit);
    grid.open_exit(exit.0, exit.1, exit_dir);
    info!(
        "{}x{} maze: {} rooms, exit {:?} {:?}, start {:?} at distance {}",
        w,
        h,
        rooms.len(),
        exit,
        exit_dir,
        start,
        dists.get(start.0, start.1)
    );
    progress.poll()?;

    /*----- 4. walls and BSP -----*/
    let color_seed: u8 = rng.random();
    let segments = extract_segments(&grid, &dists, color_seed);
    let mut forward = |pct: u8| progress.update(pct);
    let bsp = BspBuilder::new(req.expected_partition_iterations, &mut forward).build(segments.clone())?;
    info!(
        "{} wall segments, {} after splitting, {} bsp nodes",
        segments.len(),
        bsp.segs().len(),
        bsp.node_count()
    );
    progress.update(100);

    Ok(Maze {
        grid,
        dists,
        segments,
        bsp,
        rooms,
        start,
        exit,
        exit_dir,
        color_seed,
    })
}

/// Outer edge of a rim cell, preferring left, right, top, bottom.
fn rim_side(grid: &CellGrid, (x, y): (i32, i32)) -> Dir {
    if x == 0 {
        Dir::Left
    } else if x == grid.width() - 1 {
        Dir::Right
    } else if y == 0 {
        Dir::Up
    } else {
        Dir::Down
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
