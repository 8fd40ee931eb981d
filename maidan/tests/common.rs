//! Shared scenario builders for integration tests.

#![allow(dead_code)]

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use maidan::world::Waypoint;
use maidan::{Point2, Pose, RobotId, Team, WorldModel};

/// World with the given robots seen at `t = 0`.
pub fn world_with(robots: &[(Team, RobotId, Pose)]) -> WorldModel {
    let mut world = WorldModel::default();
    for &(team, id, pose) in robots {
        world.push_robot(team, id, 0.0, pose);
    }
    world
}

/// Blue robot 0 at the origin, ringed by eight touching yellow robots.
pub fn surrounded_world() -> WorldModel {
    let mut world = world_with(&[(Team::Blue, 0, Pose::new(0.0, 0.0, 0.0))]);
    let ring = 2.0 * world.constants().robot.radius;
    for k in 0..8u8 {
        let a = k as f64 * FRAC_PI_4;
        world.push_robot(Team::Yellow, k, 0.0, Pose::new(ring * a.cos(), ring * a.sin(), 0.0));
    }
    world
}

/// One-metre square starting east of the origin, heading kept at +y.
pub fn square_waypoints() -> Vec<Waypoint> {
    [(1000.0, 0.0), (1000.0, 1000.0), (0.0, 1000.0), (0.0, 0.0)]
        .iter()
        .map(|&(x, y)| Waypoint::new(Pose::new(x, y, FRAC_PI_2)))
        .collect()
}

/// Ball samples `(t, x)` along +x.
pub fn ball_along_x(world: &mut WorldModel, samples: &[(f64, f64)]) {
    for &(t, x) in samples {
        world.push_ball(t, Point2::new(x, 0.0));
    }
}
