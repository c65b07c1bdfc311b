use log::debug;
use rand::Rng;

use crate::generator::{BuildError, CARVE_POLL_INTERVAL, Carver, Progress};
use crate::world::{CellGrid, Dir};

/// Depth-first carve.
///
/// Walks from a random cell on the top row, scanning the four directions
/// from a random starting one. A dead end sends the walker back the way it
/// entered the cell; the carve ends when the first cell is a dead end.
pub struct Backtrack;

impl Carver for Backtrack {
    fn carve<R: Rng + ?Sized>(
        &self,
        grid: &mut CellGrid,
        rng: &mut R,
        progress: &mut Progress<'_>,
    ) -> Result<(), BuildError> {
        let w = grid.width();
        // direction each cell was entered through
        let mut entered = vec![Dir::Right; (w * grid.height()) as usize];

        let (first_x, mut x, mut y) = {
            let x = rng.random_range(0..w);
            (x, x, 0)
        };
        let mut dir = 0usize;
        let mut scan_from = dir;
        grid.mark_visited(x, y);

        let mut steps = 0u64;
        loop {
            steps += 1;
            if steps % CARVE_POLL_INTERVAL == 0 {
                progress.poll()?;
            }

            let d = Dir::from_index(dir);
            if grid.can_go(x, y, d) {
                grid.delete_wall(x, y, d);
                let (dx, dy) = d.delta();
                x += dx;
                y += dy;
                grid.mark_visited(x, y);
                entered[(y * w + x) as usize] = d;
                dir = rng.random_range(0..4);
                scan_from = dir;
                continue;
            }

            dir = (dir + 1) & 3;
            if dir != scan_from {
                continue;
            }
            /*----- dead end -----*/
            if x == first_x && y == 0 {
                break;
            }
            let (dx, dy) = entered[(y * w + x) as usize].delta();
            x -= dx;
            y -= dy;
            dir = rng.random_range(0..4);
            scan_from = dir;
        }

        debug!("backtrack carve finished after {steps} steps");
        Ok(())
    }
}
