//! Core types shared by every module: points, poses, angles, teams and the
//! monotonic clock.

mod angle;
pub mod clock;
mod point;
mod team;

pub use angle::{
    field_to_robot_perspective, robot_to_field_perspective, trim_angle, trim_angle_90,
};
pub use point::{Point2, Pose};
pub use team::{MAX_ROBOT_ID, RobotId, Team, other_team};
