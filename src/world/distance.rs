use std::collections::VecDeque;

use thiserror::Error;

use crate::world::cells::{CellGrid, Dir, GridError};

/// Value carried by cells the flood has not reached yet.
pub const UNREACHED: u32 = u32::MAX;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistanceError {
    #[error("cell ({x}, {y}) is not connected to ({from_x}, {from_y})")]
    Unreachable { x: i32, y: i32, from_x: i32, from_y: i32 },
}

/// Shortest-path step counts through open walls, measured from one cell.
///
/// The source cell holds `1`, its open neighbours `2`, and so on. A fully
/// carved maze is a tree plus rooms, so every cell gets a finite value.
#[derive(Clone, Debug)]
pub struct DistanceField {
    width: i32,
    height: i32,
    origin: (i32, i32),
    dists: Vec<u32>,
}

impl DistanceField {
    /// Breadth-first flood from `(x, y)`.
    ///
    /// Fails if any cell stays unreached; the grid is then not a connected maze.
    pub fn compute(grid: &CellGrid, x: i32, y: i32) -> Result<Self, DistanceError> {
        let (w, h) = (grid.width(), grid.height());
        let mut field = Self {
            width: w,
            height: h,
            origin: (x, y),
            dists: vec![UNREACHED; (w * h) as usize],
        };

        let mut queue = VecDeque::with_capacity((w * h) as usize);
        field.set(x, y, 1);
        queue.push_back((x, y));
        while let Some((cx, cy)) = queue.pop_front() {
            let next = field.get(cx, cy) + 1;
            for (_, nx, ny) in grid.open_neighbours(cx, cy) {
                if field.get(nx, ny) == UNREACHED {
                    field.set(nx, ny, next);
                    queue.push_back((nx, ny));
                }
            }
        }

        if let Some(i) = field.dists.iter().position(|&d| d == UNREACHED) {
            return Err(DistanceError::Unreachable {
                x: i as i32 % w,
                y: i as i32 / w,
                from_x: x,
                from_y: y,
            });
        }
        Ok(field)
    }

    #[inline]
    fn idx(&self, x: i32, y: i32) -> usize {
        assert!(self.contains(x, y), "({x}, {y}) outside distance field");
        (y * self.width + x) as usize
    }

    #[inline]
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    #[inline]
    fn set(&mut self, x: i32, y: i32, d: u32) {
        let i = self.idx(x, y);
        self.dists[i] = d;
    }

    /// Distance of an in-bounds cell. Panics outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u32 {
        self.dists[self.idx(x, y)]
    }

    pub fn try_get(&self, x: i32, y: i32) -> Result<u32, GridError> {
        if self.contains(x, y) {
            Ok(self.get(x, y))
        } else {
            Err(GridError::OutOfBounds { x, y })
        }
    }

    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    pub fn max_distance(&self) -> u32 {
        self.dists.iter().copied().max().unwrap_or(0)
    }

    /// Cell with the largest distance, scanning column by column; ties keep
    /// the first one found.
    pub fn farthest_cell(&self) -> (i32, i32) {
        let mut best = (0, 0);
        let mut best_d = 0;
        for x in 0..self.width {
            for y in 0..self.height {
                let d = self.get(x, y);
                if d > best_d {
                    best_d = d;
                    best = (x, y);
                }
            }
        }
        best
    }

    /// Rim cell with the largest distance. Top and bottom rows are scanned
    /// first, then the left and right columns; ties keep the first one found.
    pub fn farthest_rim_cell(&self) -> (i32, i32) {
        let (w, h) = (self.width, self.height);
        let mut best = (0, 0);
        let mut best_d = 0;
        let mut consider = |x: i32, y: i32| {
            let d = self.get(x, y);
            if d > best_d {
                best_d = d;
                best = (x, y);
            }
        };
        for x in 0..w {
            consider(x, 0);
            consider(x, h - 1);
        }
        for y in 0..h {
            consider(0, y);
            consider(w - 1, y);
        }
        best
    }

    /// One step along the solution from `(x, y)`.
    ///
    /// Returns the first direction, in `Dir::ALL` order, that leads through an
    /// open wall to a closer cell. At the origin this is the open side that
    /// leaves the grid, if the origin has one.
    pub fn downhill(&self, grid: &CellGrid, x: i32, y: i32) -> Option<Dir> {
        let here = self.get(x, y);
        Dir::ALL.into_iter().find(|&dir| {
            if grid.has_wall(x, y, dir) {
                return false;
            }
            let (dx, dy) = dir.delta();
            let (nx, ny) = (x + dx, y + dy);
            if grid.contains(nx, ny) {
                self.get(nx, ny) < here
            } else {
                here == 1
            }
        })
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
