use log::{debug, warn};
use rand::Rng;
use smallvec::SmallVec;

use crate::generator::{BuildError, CARVE_POLL_INTERVAL, Carver, Progress};
use crate::world::{CellGrid, Dir};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Status {
    Outside,
    Frontier,
    InMaze,
}

/// Randomized Prim's algorithm.
///
/// Grows the maze from a random top-row cell. Each round a random frontier
/// cell joins through one random in-maze neighbour. Neither the frontier
/// nor the joining edge ever crosses a border.
pub struct Prim;

struct State {
    width: i32,
    status: Vec<Status>,
    frontier: Vec<(i32, i32)>,
}

impl State {
    fn at(&self, x: i32, y: i32) -> Status {
        self.status[(y * self.width + x) as usize]
    }

    fn set(&mut self, x: i32, y: i32, s: Status) {
        self.status[(y * self.width + x) as usize] = s;
    }

    /// Join `(x, y)` to the maze and queue its fresh neighbours.
    fn absorb(&mut self, grid: &mut CellGrid, x: i32, y: i32) {
        grid.mark_visited(x, y);
        self.set(x, y, Status::InMaze);
        for dir in Dir::ALL {
            if !grid.can_go(x, y, dir) {
                continue;
            }
            let (dx, dy) = dir.delta();
            let (nx, ny) = (x + dx, y + dy);
            if self.at(nx, ny) == Status::Outside {
                self.set(nx, ny, Status::Frontier);
                self.frontier.push((nx, ny));
            }
        }
    }
}

impl Carver for Prim {
    fn carve<R: Rng + ?Sized>(
        &self,
        grid: &mut CellGrid,
        rng: &mut R,
        progress: &mut Progress<'_>,
    ) -> Result<(), BuildError> {
        let (w, h) = (grid.width(), grid.height());
        let mut st = State {
            width: w,
            status: vec![Status::Outside; (w * h) as usize],
            frontier: Vec::new(),
        };
        st.absorb(grid, rng.random_range(0..w), 0);

        let mut steps = 0u64;
        while !st.frontier.is_empty() {
            steps += 1;
            if steps % CARVE_POLL_INTERVAL == 0 {
                progress.poll()?;
            }

            let (x, y) = st.frontier.swap_remove(rng.random_range(0..st.frontier.len()));
            let joins: SmallVec<[Dir; 4]> = Dir::ALL
                .into_iter()
                .filter(|&dir| {
                    let (dx, dy) = dir.delta();
                    !grid.has_border(x, y, dir)
                        && grid.contains(x + dx, y + dy)
                        && st.at(x + dx, y + dy) == Status::InMaze
                })
                .collect();
            if joins.is_empty() {
                warn!("frontier cell ({x}, {y}) has no maze neighbour");
                continue;
            }
            grid.delete_wall(x, y, joins[rng.random_range(0..joins.len())]);
            st.absorb(grid, x, y);
        }

        debug!("prim carve finished after {steps} steps");
        Ok(())
    }
}
