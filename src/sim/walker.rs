use glam::IVec2;
use log::{debug, info};

use crate::{
    sim::NavError,
    world::{
        Camera, CellGrid, Dir, DistanceField, MAP_UNIT,
        camera::{FRACBITS, fixed_dir},
    },
};

/// World units covered by one animation step of a walk.
pub const STEP_SIZE: i32 = MAP_UNIT / 4;
/// The eye sits this far behind the cell centre, along the heading.
pub const VIEW_OFFSET: i32 = MAP_UNIT / 8;
/// Animation steps per walk or quarter turn.
pub const ANIM_STEPS: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Motion {
    Walk { dir: i32 },
    Rotate { dir: i32, from: i32 },
}

/// A viewer moving through the maze one cell at a time.
///
/// Heading is an angle in degrees, always a multiple of 90 once a motion
/// has finished: 0 faces `+x`, 90 faces `+y`. `walk(1)` goes forward,
/// `walk(-1)` backward; `rotate(1)` turns to the next higher angle.
/// Motions can run at once ([`Walker::walk`], [`Walker::rotate`]) or be
/// started and advanced with [`Walker::tick`] to animate the view.
#[derive(Clone, Debug)]
pub struct Walker {
    x: i32,
    y: i32,
    angle: i32,
    view_angle: i32,
    walk_step: i32,
    motion: Option<(Motion, i32)>,
    finished: bool,
}

impl Walker {
    /// Stands in cell `(x, y)` facing `+x`.
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            angle: 0,
            view_angle: 0,
            walk_step: 0,
            motion: None,
            finished: false,
        }
    }

    #[inline]
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Settled heading in degrees.
    #[inline]
    pub fn angle(&self) -> i32 {
        self.angle
    }

    #[inline]
    pub fn heading(&self) -> Dir {
        Dir::from_index((self.angle / 90) as usize)
    }

    /// Heading as a unit grid step.
    #[inline]
    pub fn direction(&self) -> (i32, i32) {
        self.heading().delta()
    }

    /// `true` once the walker has stepped out through the exit.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    /// Grid direction of a walk by `dir`: ahead for `1`, behind for `-1`.
    fn towards(&self, dir: i32) -> Dir {
        let a = (self.angle / 90) as usize;
        if dir < 0 {
            Dir::from_index(a + 2)
        } else {
            Dir::from_index(a)
        }
    }

    /// Is there no wall between the walker and the cell in direction `dir`?
    ///
    /// Always `false` once outside the grid.
    pub fn check_move(&self, grid: &CellGrid, dir: i32) -> bool {
        let to = self.towards(dir);
        grid.try_cell(self.x, self.y)
            .is_ok_and(|c| !c.contains(to.wall()))
    }

    /// Is the edge on side `side` of the current cell open?
    pub fn is_open(&self, grid: &CellGrid, side: Dir) -> bool {
        grid.try_cell(self.x, self.y)
            .is_ok_and(|c| !c.contains(side.wall()))
    }

    /*──────────────────────────── animation ────────────────────────────*/

    /// Begin a one-cell walk. Any motion in flight is completed first.
    pub fn start_walk(&mut self, grid: &CellGrid, dir: i32) -> Result<(), NavError> {
        self.settle(grid);
        if !self.check_move(grid, dir) {
            return Err(NavError::HitObstacle);
        }
        self.motion = Some((Motion::Walk { dir: dir.signum() }, 0));
        Ok(())
    }

    /// Begin a turn by `dir` quarter turns. Any motion in flight is completed first.
    pub fn start_rotate(&mut self, grid: &CellGrid, dir: i32) {
        self.settle(grid);
        self.motion = Some((
            Motion::Rotate {
                dir,
                from: self.angle,
            },
            0,
        ));
    }

    /// Advance the current motion by one step. Returns `true` when it just finished.
    pub fn tick(&mut self, grid: &CellGrid) -> bool {
        let Some((motion, done)) = self.motion else {
            return false;
        };
        let done = done + 1;
        match motion {
            Motion::Walk { dir } => self.walk_step += dir,
            Motion::Rotate { dir, from } => {
                self.view_angle = (from + dir * 90 * done / ANIM_STEPS).rem_euclid(360);
            }
        }
        if done < ANIM_STEPS {
            self.motion = Some((motion, done));
            return false;
        }
        self.motion = None;
        self.finish(motion, grid);
        true
    }

    fn finish(&mut self, motion: Motion, grid: &CellGrid) {
        match motion {
            Motion::Walk { dir } => {
                let (dx, dy) = self.direction();
                self.x += dir * dx;
                self.y += dir * dy;
                self.walk_step = 0;
                if grid.is_end_position(self.x, self.y) {
                    info!("walker left the maze at ({}, {})", self.x, self.y);
                    self.finished = true;
                }
            }
            Motion::Rotate { dir, from } => {
                self.angle = (from + 90 * dir).rem_euclid(360);
                self.view_angle = self.angle;
            }
        }
        debug!("walker at ({}, {}) facing {}", self.x, self.y, self.angle);
    }

    fn settle(&mut self, grid: &CellGrid) {
        while self.motion.is_some() {
            self.tick(grid);
        }
    }

    /*──────────────────────────── immediate ────────────────────────────*/

    pub fn walk(&mut self, grid: &CellGrid, dir: i32) -> Result<(), NavError> {
        self.start_walk(grid, dir)?;
        self.settle(grid);
        Ok(())
    }

    pub fn rotate(&mut self, grid: &CellGrid, dir: i32) {
        self.start_rotate(grid, dir);
        self.settle(grid);
    }

    /// Turn the shortest way round to face `target`.
    pub fn rotate_to(&mut self, grid: &CellGrid, target: Dir) {
        let a = self.heading().index();
        let n = target.index();
        if n == a {
            return;
        }
        if n == (a + 2) & 3 {
            self.rotate(grid, 2);
        } else if n == (a + 1) & 3 {
            self.rotate(grid, 1);
        } else {
            self.rotate(grid, -1);
        }
    }

    /// Take one step along the solution: face the closer neighbour and walk there.
    pub fn solve_step(&mut self, grid: &CellGrid, dists: &DistanceField) -> Result<(), NavError> {
        if self.finished {
            return Ok(());
        }
        self.settle(grid);
        let dir = dists
            .downhill(grid, self.x, self.y)
            .ok_or(NavError::NoMove)?;
        self.rotate_to(grid, dir);
        self.walk(grid, 1)
    }

    /*────────────────────────────── view ───────────────────────────────*/

    /// Eye position and direction for the renderer, including any motion in flight.
    pub fn camera(&self) -> Camera {
        let dir = fixed_dir(self.view_angle);
        let off = (STEP_SIZE * self.walk_step - VIEW_OFFSET) as i64;
        let centre = IVec2::new(
            self.x * MAP_UNIT + MAP_UNIT / 2,
            self.y * MAP_UNIT + MAP_UNIT / 2,
        );
        let shift = IVec2::new(
            ((dir.x as i64 * off) >> FRACBITS) as i32,
            ((dir.y as i64 * off) >> FRACBITS) as i32,
        );
        Camera::with_dir(centre + shift, self.view_angle, dir)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Algorithm, GenerationRequest, build};

    /// 3×1 corridor, only the wall between (0,0) and (1,0) removed.
    fn corridor() -> CellGrid {
        let mut g = CellGrid::filled(3, 1);
        g.delete_wall(0, 0, Dir::Right);
        g
    }

    #[test]
    fn walk_respects_walls() {
        let g = corridor();
        let mut w = Walker::new(0, 0);
        assert!(w.check_move(&g, 1));
        assert!(!w.check_move(&g, -1));
        assert_eq!(w.walk(&g, -1), Err(NavError::HitObstacle));

        w.walk(&g, 1).unwrap();
        assert_eq!(w.position(), (1, 0));
        assert_eq!(w.walk(&g, 1), Err(NavError::HitObstacle));
        assert!(w.check_move(&g, -1));
        w.walk(&g, -1).unwrap();
        assert_eq!(w.position(), (0, 0));
        assert!(!w.is_finished());
    }

    #[test]
    fn rotation_wraps_in_quarter_turns() {
        let g = corridor();
        let mut w = Walker::new(0, 0);
        w.rotate(&g, 1);
        assert_eq!((w.angle(), w.heading()), (90, Dir::Down));
        w.rotate(&g, -1);
        w.rotate(&g, -1);
        assert_eq!((w.angle(), w.heading()), (270, Dir::Up));
        assert_eq!(w.direction(), (0, -1));

        w.rotate_to(&g, Dir::Down);
        assert_eq!(w.angle(), 90);
        w.rotate_to(&g, Dir::Right);
        assert_eq!(w.angle(), 0);
    }

    #[test]
    fn walk_animation_moves_the_eye() {
        let g = corridor();
        let mut w = Walker::new(0, 0);
        let rest = w.camera();
        assert_eq!(rest.pos(), IVec2::new(MAP_UNIT / 2 - VIEW_OFFSET, MAP_UNIT / 2));
        assert_eq!(rest.dir(), IVec2::new(1 << FRACBITS, 0));

        w.start_walk(&g, 1).unwrap();
        for i in 1..ANIM_STEPS {
            assert!(!w.tick(&g));
            assert_eq!(w.camera().pos().x, rest.pos().x + i * STEP_SIZE);
            assert_eq!(w.position(), (0, 0));
        }
        assert!(w.tick(&g));
        assert_eq!(w.position(), (1, 0));
        assert_eq!(w.camera().pos().x, rest.pos().x + MAP_UNIT);
        assert!(!w.tick(&g));
    }

    #[test]
    fn turn_animation_sweeps_the_view() {
        let g = corridor();
        let mut w = Walker::new(0, 0);
        w.start_rotate(&g, 1);
        w.tick(&g);
        assert_eq!(w.camera().angle(), 22);
        assert_eq!(w.angle(), 0);
        w.tick(&g);
        assert_eq!(w.camera().angle(), 45);

        // a new motion completes the pending one first
        assert_eq!(w.start_walk(&g, 1), Err(NavError::HitObstacle));
        assert_eq!(w.angle(), 90);
        assert!(!w.is_moving());
    }

    #[test]
    fn leaving_through_the_exit_finishes() {
        let mut g = corridor();
        g.open_exit(0, 0, Dir::Left);
        let mut w = Walker::new(0, 0);
        w.walk(&g, -1).unwrap();
        assert_eq!(w.position(), (-1, 0));
        assert!(w.is_finished());
        assert!(!w.check_move(&g, 1));
    }

    #[test]
    fn solving_takes_exactly_the_distance() {
        for (seed, algorithm) in [(1, Algorithm::Backtrack), (2, Algorithm::Prim)] {
            let req = GenerationRequest {
                width: 10,
                height: 7,
                rooms: 1,
                algorithm,
                seed: Some(seed),
                ..GenerationRequest::default()
            };
            let maze = build(&req, |_| true).unwrap();
            let (sx, sy) = maze.start;
            let mut w = Walker::new(sx, sy);
            let mut steps = 0;
            while !w.is_finished() {
                w.solve_step(&maze.grid, &maze.dists).unwrap();
                steps += 1;
                assert!(steps <= maze.dists.max_distance());
            }
            assert_eq!(steps, maze.dists.get(sx, sy));
        }
    }

    #[test]
    fn sealed_origin_has_no_move() {
        let mut g = CellGrid::filled(2, 2);
        g.delete_wall(0, 0, Dir::Right);
        g.delete_wall(0, 0, Dir::Down);
        g.delete_wall(1, 0, Dir::Down);
        let dists = DistanceField::compute(&g, 0, 0).unwrap();
        let mut w = Walker::new(0, 0);
        assert_eq!(w.solve_step(&g, &dists), Err(NavError::NoMove));

        let mut w = Walker::new(1, 1);
        w.solve_step(&g, &dists).unwrap();
        assert_ne!(w.position(), (1, 1));
    }
}
