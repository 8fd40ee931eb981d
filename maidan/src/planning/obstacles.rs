//! Occupancy checks against other robots.

use crate::core::{Point2, RobotId, Team};
use crate::world::WorldModel;

/// The robot a check is made for; it never blocks itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mover {
    pub team: Team,
    pub id: RobotId,
}

impl Mover {
    pub fn new(team: Team, id: RobotId) -> Self {
        Self { team, id }
    }
}

/// True when a robot centered at `pos` would clear every other robot by
/// at least `buffer` mm.
pub fn is_position_open(world: &WorldModel, pos: Point2, mover: Mover, buffer: f64) -> bool {
    let min_dist = 2.0 * world.constants().robot.radius + buffer;
    world
        .all_robots()
        .filter(|&(team, id, _)| !(team == mover.team && id == mover.id))
        .all(|(_, _, pose)| pos.distance(&pose.xy()) >= min_dist)
}

fn is_step_ok(world: &WorldModel, pos: Point2, mover: Mover, check_legal: bool) -> bool {
    is_position_open(world, pos, mover, 0.0)
        && (!check_legal || world.is_pos_legal(pos, mover.team, mover.id))
}

/// Whether driving straight from `start` to `goal` would hit a robot (or,
/// with `check_legal`, cross an illegal position).
///
/// The goal is tested first, then points every robot radius along the
/// segment. `start` itself is never tested.
pub fn is_path_blocked(
    world: &WorldModel,
    start: Point2,
    goal: Point2,
    mover: Mover,
    check_legal: bool,
) -> bool {
    if !is_step_ok(world, goal, mover, check_legal) {
        return true;
    }

    let delta = goal - start;
    let length = delta.norm();
    let Some(dir) = delta.unit() else {
        return false;
    };
    let step = world.constants().robot.radius;
    let mut travelled = step;
    while travelled < length {
        if !is_step_ok(world, start + dir * travelled, mover, check_legal) {
            return true;
        }
        travelled += step;
    }
    false
}

/// Whether a waypoint chain driven from `start` is blocked anywhere.
pub fn is_chain_blocked(
    world: &WorldModel,
    start: Point2,
    chain: &[Point2],
    mover: Mover,
    check_legal: bool,
) -> bool {
    let mut from = start;
    for &to in chain {
        if is_path_blocked(world, from, to, mover, check_legal) {
            return true;
        }
        from = to;
    }
    false
}
