//! What the viewer has seen so far.
//!
//! The overlay is one cell wider and taller than the maze and records only
//! top and left walls: the bottom wall of `(x, y)` is the top wall of
//! `(x, y + 1)`, the right wall of `(x, y)` the left wall of `(x + 1, y)`.
//! Only the renderer writes it.

use crate::world::{CellFlags, Dir, MAP_UNIT, WallSegment};

#[derive(Clone, Debug)]
pub struct Explored {
    width: i32,
    height: i32,
    cells: Vec<CellFlags>,
    seen_segs: Vec<bool>,
}

impl Explored {
    /// Blank overlay for a `width × height` maze with `seg_count` BSP segments.
    pub fn new(width: i32, height: i32, seg_count: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![CellFlags::empty(); ((width + 1) * (height + 1)) as usize],
            seen_segs: vec![false; seg_count],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(CellFlags::empty());
        self.seen_segs.fill(false);
    }

    #[inline]
    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x <= self.width && y <= self.height)
            .then(|| (y * (self.width + 1) + x) as usize)
    }

    #[inline]
    pub fn is_seg_seen(&self, id: usize) -> bool {
        self.seen_segs.get(id).copied().unwrap_or(false)
    }

    pub fn seen_seg_count(&self) -> usize {
        self.seen_segs.iter().filter(|&&s| s).count()
    }

    /// Has the wall on side `dir` of cell `(x, y)` been on screen?
    pub fn has_seen_wall(&self, x: i32, y: i32, dir: Dir) -> bool {
        let (x, y, bit) = match dir {
            Dir::Up => (x, y, CellFlags::WALL_TOP),
            Dir::Left => (x, y, CellFlags::WALL_LEFT),
            Dir::Down => (x, y + 1, CellFlags::WALL_TOP),
            Dir::Right => (x + 1, y, CellFlags::WALL_LEFT),
        };
        self.idx(x, y).is_some_and(|i| self.cells[i].contains(bit))
    }

    /// Record segment `id` as seen and flag every cell edge it covers.
    ///
    /// Returns `false` if it had been seen before; the overlay is then untouched.
    pub fn mark_segment(&mut self, id: usize, seg: &WallSegment) -> bool {
        match self.seen_segs.get_mut(id) {
            Some(seen) if !*seen => *seen = true,
            _ => return false,
        }

        let sdx = seg.delta.x / MAP_UNIT;
        let sdy = seg.delta.y / MAP_UNIT;
        // a segment running backwards starts one cell early
        let mut sx = seg.start.x / MAP_UNIT - (sdx < 0) as i32;
        let mut sy = seg.start.y / MAP_UNIT - (sdy < 0) as i32;
        let bit = if sdx != 0 { CellFlags::WALL_TOP } else { CellFlags::WALL_LEFT };

        for _ in 0..(sdx + sdy).abs() {
            if let Some(i) = self.idx(sx, sy) {
                self.cells[i].insert(bit);
            }
            sx += sdx.signum();
            sy += sdy.signum();
        }
        true
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
