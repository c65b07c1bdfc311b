//! Navigation surface over a published maze: a [`Walker`] that moves cell
//! by cell with a short animation, and a [`BasicRobot`] that drives one
//! through sensors and a battery.

mod robot;
mod walker;

use thiserror::Error;

pub use robot::{BasicRobot, FULL_BATTERY, MOVE_COST, ROTATE_COST, SENSE_COST, Sensor};
pub use walker::{ANIM_STEPS, STEP_SIZE, VIEW_OFFSET, Walker};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavError {
    #[error("wall in the way")]
    HitObstacle,

    #[error("rotation by {0} degrees is not a multiple of 90")]
    UnsupportedRotation(i32),

    #[error("robot has no {0:?} sensor")]
    MissingSensor(Sensor),

    #[error("robot has stopped")]
    Stopped,

    #[error("no move leads closer to the exit")]
    NoMove,
}
