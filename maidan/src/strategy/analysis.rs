//! Read-only situation analysis used by roles and plays.

use std::f64::consts::PI;

use crate::core::{Point2, RobotId, Team, trim_angle};
use crate::physics::predict_ball;
use crate::world::WorldModel;

/// Trajectory sampling step (s).
const INTERCEPT_STEP: f64 = 0.05;

/// Earliest and latest points of the ball's future path that robot `id`
/// can reach in time at its maximum speed.
///
/// After the ball stops it is assumed to stay put, so a stationary ball is
/// always eventually reachable.
pub fn intercept_range(world: &WorldModel, team: Team, id: RobotId) -> Option<(Point2, Point2)> {
    let pose = world.robot_pose(team, id)?;
    let ball = world.ball_pos()?;
    let constants = world.constants();
    let velocity = world.ball_velocity();
    let decel = constants.ball.deceleration;
    let speed = constants.robot.max_speed;
    let horizon = constants.planner.shot_horizon;

    let mut earliest = None;
    let mut latest = None;
    let steps = (horizon / INTERCEPT_STEP).ceil() as usize;
    for k in 0..=steps {
        let t = k as f64 * INTERCEPT_STEP;
        let (p, v) = predict_ball(ball, velocity, t, decel);
        if !world.is_in_field(p) {
            break;
        }
        if pose.xy().distance(&p) <= speed * t {
            if earliest.is_none() {
                earliest = Some(p);
            }
            latest = Some(p);
        }
        if v.is_zero() && earliest.is_some() {
            break;
        }
    }
    earliest.zip(latest)
}

/// Score a supporting position for robot `id` (higher is better).
///
/// Weighs passing distance from the ball, distance to the attacked goal,
/// clearance from opponents and how far off-center the shot would be.
pub fn rate_attacker_pos(world: &WorldModel, team: Team, pos: Point2, id: RobotId) -> f64 {
    const PASS_WEIGHT: f64 = 0.3;
    const GOAL_WEIGHT: f64 = 1.0;
    const OPPONENT_WEIGHT: f64 = 1.5;
    const ANGLE_WEIGHT: f64 = 800.0;
    const OPPONENT_RANGE: f64 = 1000.0;

    if !world.is_pos_legal(pos, team, id) {
        return f64::NEG_INFINITY;
    }

    let goal = world.get_attack_goal(team);
    let pass_distance = world.ball_pos().map_or(0.0, |b| b.distance(&pos));
    let goal_distance = goal.distance(&pos);
    let opponent_clearance = world
        .robots(team.other())
        .map(|(_, pose)| pose.xy().distance(&pos))
        .fold(OPPONENT_RANGE, f64::min);
    let toward = if goal.x < 0.0 { PI } else { 0.0 };
    let off_center = (goal - pos)
        .angle()
        .map_or(0.0, |a| trim_angle(a - toward).abs());

    -PASS_WEIGHT * pass_distance - GOAL_WEIGHT * goal_distance
        + OPPONENT_WEIGHT * opponent_clearance
        - ANGLE_WEIGHT * off_center
}

/// Best-rated position on a coarse grid over the attacking half.
pub fn best_support_position(world: &WorldModel, team: Team, id: RobotId, avoid: &[Point2]) -> Option<Point2> {
    const GRID: f64 = 500.0;
    const SPACING: f64 = 600.0;

    let attack_sign = -world.defense_side_sign(team);
    let half_x = world.constants().half_x();
    let half_y = world.constants().half_y();

    let mut best: Option<(f64, Point2)> = None;
    let mut x = GRID;
    while x < half_x {
        let mut y = -half_y + GRID;
        while y < half_y {
            let pos = Point2::new(attack_sign * x, y);
            if avoid.iter().all(|a| a.distance(&pos) >= SPACING) {
                let score = rate_attacker_pos(world, team, pos, id);
                if score.is_finite() && best.is_none_or(|(s, _)| score > s) {
                    best = Some((score, pos));
                }
            }
            y += GRID;
        }
        x += GRID;
    }
    best.map(|(_, p)| p)
}
