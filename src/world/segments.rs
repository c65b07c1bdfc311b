use glam::IVec2;
use log::debug;

use crate::world::cells::{CellGrid, Dir};
use crate::world::distance::DistanceField;

/// World units per grid cell.
pub const MAP_UNIT: i32 = 128;

/// One maximal run of wall, in world units.
///
/// Segments are oriented so that the open side of the wall lies to the
/// right of `start → start + delta` when `y` grows downwards; the
/// renderer drops the back face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallSegment {
    pub start: IVec2,
    pub delta: IVec2,
    /// Exit distance of the cell the run started in.
    pub dist: u32,
    /// `0x00RRGGBB`.
    pub color: u32,
    /// Already used as a splitter, or lying on the maze rim.
    pub partitioned: bool,
}

impl WallSegment {
    pub fn new(x: i32, y: i32, dx: i32, dy: i32, dist: u32, color_seed: u8) -> Self {
        Self {
            start: IVec2::new(x, y),
            delta: IVec2::new(dx, dy),
            dist,
            color: wall_color(dist, dx != 0, color_seed),
            partitioned: false,
        }
    }

    #[inline]
    pub fn end(&self) -> IVec2 {
        self.start + self.delta
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.delta.x != 0
    }

    /// Length in world units; segments are axis-aligned.
    #[inline]
    pub fn length(&self) -> i32 {
        self.delta.x.abs() + self.delta.y.abs()
    }

    /// Orientation code: `±1` horizontal, `±2` vertical, positive when the
    /// segment runs towards negative coordinates.
    #[inline]
    pub fn dir(&self) -> i32 {
        dir_code(self.delta)
    }

    /// Sub-segment between two points on this one, keeping every label.
    pub(crate) fn piece(&self, from: IVec2, to: IVec2) -> Self {
        Self {
            start: from,
            delta: to - from,
            ..*self
        }
    }

    fn on_rim(&self, width: i32, height: i32) -> bool {
        let IVec2 { x, y } = self.start;
        ((x == 0 || x == width * MAP_UNIT) && self.delta.x == 0)
            || ((y == 0 || y == height * MAP_UNIT) && self.delta.y == 0)
    }
}

pub(crate) fn dir_code(delta: IVec2) -> i32 {
    if delta.x != 0 {
        if delta.x < 0 { 1 } else { -1 }
    } else if delta.y < 0 {
        2
    } else {
        -2
    }
}

/// Wall colour for a segment `dist` steps from the exit.
///
/// Distance buckets of four share a shade; every eight buckets the hue
/// family changes, offset by the per-maze `seed`. Horizontal walls are one
/// shade brighter than vertical ones.
pub fn wall_color(dist: u32, horizontal: bool, seed: u8) -> u32 {
    let d = dist / 4;
    let shade = d & 7;
    let family = ((d >> 3) ^ seed as u32) % 6;
    let v = ((shade + 2 + horizontal as u32) * 70) / 8 + 80;
    let lo = 20;
    let (r, g, b) = match family {
        0 => (v, lo, lo),
        1 => (lo, v, lo),
        2 => (lo, lo, v),
        3 => (v, v, lo),
        4 => (lo, v, v),
        _ => (v, lo, v),
    };
    (r << 16) | (g << 8) | b
}

/// Coalesce the walls of `grid` into segments.
///
/// Rows are scanned for top and bottom walls, columns for left and right
/// walls. A horizontal run stops at a cell with a left wall, a vertical run
/// at a cell with a top wall, so corners always split runs.
pub fn extract_segments(grid: &CellGrid, dists: &DistanceField, color_seed: u8) -> Vec<WallSegment> {
    let (w, h) = (grid.width(), grid.height());
    let mu = MAP_UNIT;
    let mut segs = Vec::new();

    let run_end = |mut i: i32, limit: i32, wall: &dyn Fn(i32) -> bool, corner: &dyn Fn(i32) -> bool| {
        i += 1;
        while i < limit && wall(i) && !corner(i) {
            i += 1;
        }
        i
    };

    for y in 0..h {
        /*----- top walls, right to left -----*/
        let mut x = 0;
        while x < w {
            if !grid.has_wall(x, y, Dir::Up) {
                x += 1;
                continue;
            }
            let sx = x;
            x = run_end(
                x,
                w,
                &|i| grid.has_wall(i, y, Dir::Up),
                &|i| grid.has_wall(i, y, Dir::Left),
            );
            segs.push(WallSegment::new(x * mu, y * mu, (sx - x) * mu, 0, dists.get(sx, y), color_seed));
        }

        /*----- bottom walls, left to right -----*/
        let mut x = 0;
        while x < w {
            if !grid.has_wall(x, y, Dir::Down) {
                x += 1;
                continue;
            }
            let sx = x;
            x = run_end(
                x,
                w,
                &|i| grid.has_wall(i, y, Dir::Down),
                &|i| grid.has_wall(i, y, Dir::Left),
            );
            segs.push(WallSegment::new(sx * mu, (y + 1) * mu, (x - sx) * mu, 0, dists.get(sx, y), color_seed));
        }
    }

    for x in 0..w {
        /*----- left walls, top to bottom -----*/
        let mut y = 0;
        while y < h {
            if !grid.has_wall(x, y, Dir::Left) {
                y += 1;
                continue;
            }
            let sy = y;
            y = run_end(
                y,
                h,
                &|i| grid.has_wall(x, i, Dir::Left),
                &|i| grid.has_wall(x, i, Dir::Up),
            );
            segs.push(WallSegment::new(x * mu, sy * mu, 0, (y - sy) * mu, dists.get(x, sy), color_seed));
        }

        /*----- right walls, bottom to top -----*/
        let mut y = 0;
        while y < h {
            if !grid.has_wall(x, y, Dir::Right) {
                y += 1;
                continue;
            }
            let sy = y;
            y = run_end(
                y,
                h,
                &|i| grid.has_wall(x, i, Dir::Right),
                &|i| grid.has_wall(x, i, Dir::Up),
            );
            segs.push(WallSegment::new((x + 1) * mu, y * mu, 0, (sy - y) * mu, dists.get(x, sy), color_seed));
        }
    }

    for seg in &mut segs {
        seg.partitioned = seg.on_rim(w, h);
    }
    debug!("extracted {} wall segments", segs.len());
    segs
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn open_box(w: i32, h: i32) -> CellGrid {
        let mut grid = CellGrid::filled(w, h);
        for y in 0..h {
            for x in 0..w {
                if x + 1 < w {
                    grid.delete_wall(x, y, Dir::Right);
                }
                if y + 1 < h {
                    grid.delete_wall(x, y, Dir::Down);
                }
            }
        }
        grid
    }

    #[test]
    fn color_formula_is_stable() {
        // d = 0: shade 0, family = seed % 6, vertical
        assert_eq!(wall_color(0, false, 0), (97 << 16) | (20 << 8) | 20);
        // horizontal adds one shade
        assert_eq!(wall_color(0, true, 1), (20 << 16) | (106 << 8) | 20);
        // d = 9: shade 1, family = (1 ^ 0) % 6
        assert_eq!(wall_color(36, false, 0), (20 << 16) | (106 << 8) | 20);
        // family 5 lights red and blue
        assert_eq!(wall_color(0, false, 5), (97 << 16) | (20 << 8) | 97);
        assert_eq!(wall_color(0, false, 6), wall_color(0, false, 0));
    }

    #[test]
    fn open_box_yields_four_rim_walls() {
        let grid = open_box(2, 2);
        let dists = DistanceField::compute(&grid, 0, 0).unwrap();
        let segs = extract_segments(&grid, &dists, 0);
        let mu = MAP_UNIT;

        let summary: Vec<_> = segs.iter().map(|s| (s.start, s.delta)).collect();
        assert_eq!(
            summary,
            vec![
                (IVec2::new(2 * mu, 0), IVec2::new(-2 * mu, 0)),
                (IVec2::new(0, 2 * mu), IVec2::new(2 * mu, 0)),
                (IVec2::new(0, 0), IVec2::new(0, 2 * mu)),
                (IVec2::new(2 * mu, 2 * mu), IVec2::new(0, -2 * mu)),
            ]
        );
        assert!(segs.iter().all(|s| s.partitioned));
        assert_eq!(segs.iter().map(|s| s.dir()).collect::<Vec<_>>(), vec![1, -1, -2, 2]);
    }

    #[test]
    fn corners_split_runs() {
        // 3x2, wall kept between (1,0) and (2,0) and below (1,0)
        let mut grid = CellGrid::filled(3, 2);
        grid.delete_wall(0, 0, Dir::Right);
        grid.delete_wall(0, 0, Dir::Down);
        grid.delete_wall(0, 1, Dir::Right);
        grid.delete_wall(1, 1, Dir::Right);
        grid.delete_wall(2, 1, Dir::Up);
        let dists = DistanceField::compute(&grid, 0, 0).unwrap();

        let segs = extract_segments(&grid, &dists, 0);
        let tops: Vec<_> = segs.iter().filter(|s| s.start.y == 0 && s.is_horizontal()).collect();
        assert_eq!(tops.len(), 2);
        assert_eq!(tops[0].length(), 2 * MAP_UNIT);
        assert_eq!(tops[1].length(), MAP_UNIT);

        let inner: Vec<_> = segs.iter().filter(|s| !s.partitioned).collect();
        assert_eq!(inner.len(), 4);
        assert!(
            inner
                .iter()
                .filter(|s| !s.is_horizontal())
                .all(|s| s.start.x == 2 * MAP_UNIT)
        );
    }

    #[test]
    fn labels_come_from_the_run_start() {
        let grid = open_box(3, 1);
        let dists = DistanceField::compute(&grid, 0, 0).unwrap();
        let segs = extract_segments(&grid, &dists, 3);
        let bottom = segs.iter().find(|s| s.start.y == MAP_UNIT).unwrap();
        assert_eq!(bottom.dist, 1);
        let right = segs
            .iter()
            .find(|s| !s.is_horizontal() && s.start.x == 3 * MAP_UNIT)
            .unwrap();
        assert_eq!(right.dist, 3);
        assert_eq!(right.color, wall_color(3, false, 3));
    }
}
