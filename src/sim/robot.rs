use log::{debug, warn};

use crate::{
    generator::Maze,
    sim::{NavError, Walker},
    world::Dir,
};

pub const FULL_BATTERY: i32 = 10_000;
pub const ROTATE_COST: i32 = 2;
pub const MOVE_COST: i32 = 3;
pub const SENSE_COST: i32 = 1;

/// Mounting position of a distance sensor, relative to the heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sensor {
    Front,
    Left,
    Back,
    Right,
}

impl Sensor {
    pub const ALL: [Sensor; 4] = [Sensor::Front, Sensor::Left, Sensor::Back, Sensor::Right];

    /// Quarter turns from the heading to the side this sensor looks at.
    fn quarter_turns(self) -> usize {
        match self {
            Sensor::Front => 0,
            Sensor::Left => 1,
            Sensor::Back => 2,
            Sensor::Right => 3,
        }
    }
}

/// A [`Walker`] with a battery and four one-cell distance sensors.
///
/// Every action is paid for up front; once the battery drops to zero the
/// robot stops and refuses further work with [`NavError::Stopped`].
pub struct BasicRobot<'m> {
    maze: &'m Maze,
    walker: Walker,
    battery: i32,
    sensors: [bool; 4],
    stopped: bool,
}

impl<'m> BasicRobot<'m> {
    /// Robot at the maze's start cell, facing `+x`, with all four sensors.
    pub fn new(maze: &'m Maze) -> Self {
        let (x, y) = maze.start;
        Self {
            maze,
            walker: Walker::new(x, y),
            battery: FULL_BATTERY,
            sensors: [true; 4],
            stopped: false,
        }
    }

    /// Same robot with only the listed sensors fitted.
    pub fn with_sensors(maze: &'m Maze, sensors: &[Sensor]) -> Self {
        let mut robot = Self::new(maze);
        robot.sensors = [false; 4];
        for s in sensors {
            robot.sensors[s.quarter_turns()] = true;
        }
        robot
    }

    pub fn walker(&self) -> &Walker {
        &self.walker
    }

    pub fn position(&self) -> (i32, i32) {
        self.walker.position()
    }

    pub fn direction(&self) -> (i32, i32) {
        self.walker.direction()
    }

    pub fn battery(&self) -> i32 {
        self.battery
    }

    pub fn has_stopped(&self) -> bool {
        self.stopped
    }

    pub fn has_sensor(&self, s: Sensor) -> bool {
        self.sensors[s.quarter_turns()]
    }

    pub fn energy_for_full_rotation(&self) -> i32 {
        4 * ROTATE_COST
    }

    pub fn energy_for_step(&self) -> i32 {
        MOVE_COST
    }

    fn ensure_running(&self) -> Result<(), NavError> {
        if self.stopped {
            Err(NavError::Stopped)
        } else {
            Ok(())
        }
    }

    fn charge(&mut self, cost: i32) {
        self.battery -= cost;
        if self.battery <= 0 {
            warn!("robot battery empty at {:?}", self.position());
            self.stopped = true;
        }
    }

    fn side(&self, s: Sensor) -> Dir {
        Dir::from_index(self.walker.heading().index() + s.quarter_turns())
    }

    /*───────────────────────────── motion ──────────────────────────────*/

    /// Turn on the spot by `degrees`, which must be a multiple of 90.
    pub fn rotate(&mut self, degrees: i32) -> Result<(), NavError> {
        self.ensure_running()?;
        if degrees % 90 != 0 {
            return Err(NavError::UnsupportedRotation(degrees));
        }
        self.walker.rotate(&self.maze.grid, degrees / 90);
        self.charge(ROTATE_COST);
        Ok(())
    }

    /// Move `distance` cells forward or backward, stopping at the first wall.
    pub fn move_by(&mut self, distance: u32, forward: bool) -> Result<(), NavError> {
        let dir = if forward { 1 } else { -1 };
        for _ in 0..distance {
            self.ensure_running()?;
            self.walker.walk(&self.maze.grid, dir)?;
            self.charge(self.energy_for_step());
            if self.walker.is_finished() {
                break;
            }
        }
        Ok(())
    }

    /// Follow the solution for one cell.
    pub fn solve_step(&mut self) -> Result<(), NavError> {
        self.ensure_running()?;
        let before = self.walker.angle();
        self.walker.solve_step(&self.maze.grid, &self.maze.dists)?;
        let turns = (self.walker.angle() - before).rem_euclid(360) / 90;
        self.charge(ROTATE_COST * turns.min(4 - turns) + self.energy_for_step());
        Ok(())
    }

    /*───────────────────────────── sensing ─────────────────────────────*/

    /// `1` if the edge on sensor `s`'s side is open, `0` if a wall is there.
    pub fn distance_to_obstacle(&mut self, s: Sensor) -> Result<i32, NavError> {
        if !self.has_sensor(s) {
            return Err(NavError::MissingSensor(s));
        }
        self.ensure_running()?;
        let open = self.walker.is_open(&self.maze.grid, self.side(s));
        self.charge(SENSE_COST);
        debug!("sensor {s:?}: {}", open as i32);
        Ok(open as i32)
    }

    /// Does sensor `s` look straight out of the maze?
    pub fn can_see_goal(&self, s: Sensor) -> Result<bool, NavError> {
        if !self.has_sensor(s) {
            return Err(NavError::MissingSensor(s));
        }
        self.ensure_running()?;
        let side = self.side(s);
        let (x, y) = self.position();
        let (dx, dy) = side.delta();
        Ok(self.walker.is_open(&self.maze.grid, side) && self.maze.grid.is_end_position(x + dx, y + dy))
    }

    /// Standing next to the exit, as far as the fitted sensors can tell.
    pub fn is_at_goal(&self) -> bool {
        Sensor::ALL
            .into_iter()
            .filter(|&s| self.has_sensor(s))
            .any(|s| self.can_see_goal(s).unwrap_or(false))
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Algorithm, GenerationRequest, build};

    fn maze() -> Maze {
        let req = GenerationRequest {
            width: 9,
            height: 9,
            rooms: 0,
            algorithm: Algorithm::Backtrack,
            seed: Some(17),
            ..GenerationRequest::default()
        };
        build(&req, |_| true).unwrap()
    }

    #[test]
    fn rotation_costs_and_validation() {
        let m = maze();
        let mut r = BasicRobot::new(&m);
        assert_eq!(r.rotate(45), Err(NavError::UnsupportedRotation(45)));
        assert_eq!(r.battery(), FULL_BATTERY);

        r.rotate(90).unwrap();
        assert_eq!(r.direction(), (0, 1));
        r.rotate(-180).unwrap();
        assert_eq!(r.direction(), (0, -1));
        assert_eq!(r.battery(), FULL_BATTERY - 2 * ROTATE_COST);
        assert_eq!(r.energy_for_full_rotation(), 8);
    }

    #[test]
    fn sensors_match_the_walls() {
        let m = maze();
        let mut r = BasicRobot::new(&m);
        let (x, y) = r.position();
        // facing +x: front right, left +y, back -x, right -y
        let expect = [
            (Sensor::Front, Dir::Right),
            (Sensor::Left, Dir::Down),
            (Sensor::Back, Dir::Left),
            (Sensor::Right, Dir::Up),
        ];
        for (s, d) in expect {
            let open = !m.grid.has_wall(x, y, d);
            assert_eq!(r.distance_to_obstacle(s), Ok(open as i32), "{s:?}");
        }
        assert_eq!(r.battery(), FULL_BATTERY - 4 * SENSE_COST);
    }

    #[test]
    fn missing_sensor_is_reported() {
        let m = maze();
        let mut r = BasicRobot::with_sensors(&m, &[Sensor::Front, Sensor::Back]);
        assert_eq!(
            r.distance_to_obstacle(Sensor::Left),
            Err(NavError::MissingSensor(Sensor::Left))
        );
        assert!(r.distance_to_obstacle(Sensor::Front).is_ok());
        assert!(matches!(r.can_see_goal(Sensor::Right), Err(NavError::MissingSensor(_))));
    }

    #[test]
    fn blocked_move_is_free() {
        let m = maze();
        let mut r = BasicRobot::new(&m);
        // the start cell of a roomless maze is a dead end
        for _ in 0..4 {
            if r.distance_to_obstacle(Sensor::Front) == Ok(0) {
                break;
            }
            r.rotate(90).unwrap();
        }
        let charge = r.battery();
        assert_eq!(r.move_by(1, true), Err(NavError::HitObstacle));
        assert_eq!(r.battery(), charge);
    }

    #[test]
    fn each_cell_moved_costs_one_step() {
        let m = maze();
        let mut r = BasicRobot::new(&m);
        // face the single opening of the dead-end start cell
        while r.distance_to_obstacle(Sensor::Front) != Ok(1) {
            r.rotate(90).unwrap();
        }
        let start = r.position();
        let (dx, dy) = r.direction();
        let charge = r.battery();

        r.move_by(1, true).unwrap();
        assert_eq!(r.position(), (start.0 + dx, start.1 + dy));
        r.move_by(1, false).unwrap();
        assert_eq!(r.position(), start);
        assert_eq!(r.battery(), charge - 2 * r.energy_for_step());
        assert_eq!(r.energy_for_step(), MOVE_COST);
    }

    #[test]
    fn solving_reaches_the_goal() {
        let m = maze();
        let mut r = BasicRobot::new(&m);
        while !r.walker().is_finished() {
            if r.walker().position() == m.exit {
                assert!(r.is_at_goal());
            }
            r.solve_step().unwrap();
        }
        assert!(r.battery() < FULL_BATTERY);
        assert!(!r.has_stopped());
    }

    #[test]
    fn empty_battery_stops_the_robot() {
        let m = maze();
        let mut r = BasicRobot::new(&m);
        let mut turns = 0;
        while !r.has_stopped() {
            r.rotate(90).unwrap();
            turns += 1;
        }
        assert_eq!(turns, FULL_BATTERY / ROTATE_COST);
        assert_eq!(r.rotate(90), Err(NavError::Stopped));
        assert_eq!(r.move_by(1, true), Err(NavError::Stopped));
        assert_eq!(r.distance_to_obstacle(Sensor::Front), Err(NavError::Stopped));
    }
}
