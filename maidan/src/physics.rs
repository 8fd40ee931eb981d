//! Ball and robot physics over world state
//!
//! Overlaps return the translation to apply to the *first* argument to
//! separate it from the second. Ball motion follows constant rolling
//! friction: the ball decelerates at `ball.deceleration` along its
//! direction of travel until it stops.

use crate::config::Constants;
use crate::core::{Point2, Pose, RobotId, Team, trim_angle};
use crate::world::WorldModel;

/// Minimum translation that moves `p1` out of a circle of radius `r_sum`
/// around `p2`. Zero when already separated.
pub fn overlap(p1: Point2, p2: Point2, r_sum: f64) -> Point2 {
    let d = p1 - p2;
    let dist = d.norm();
    if dist >= r_sum {
        return Point2::ZERO;
    }
    match d.unit() {
        Some(u) => u * (r_sum - dist),
        // Coincident centers: push along +x
        None => Point2::new(r_sum, 0.0),
    }
}

/// Robot-robot overlap (translation for `a`).
pub fn robot_overlap(a: Pose, b: Pose, constants: &Constants) -> Point2 {
    overlap(a.xy(), b.xy(), 2.0 * constants.robot.radius)
}

/// Ball against a circular robot body (translation for the ball).
pub fn ball_overlap(ball: Point2, robot: Point2, constants: &Constants) -> Point2 {
    overlap(ball, robot, constants.robot.radius + constants.ball.radius)
}

/// Ball against a robot with a flat dribbler face (translation for the
/// ball).
///
/// Inside the front sector the ball is pushed along the heading until it
/// rests on the face; elsewhere the body is a circle.
pub fn robot_ball_overlap(robot: Pose, ball: Point2, constants: &Constants) -> Point2 {
    let circular = ball_overlap(ball, robot.xy(), constants);
    if circular.is_zero() {
        return Point2::ZERO;
    }

    let rel = ball - robot.xy();
    let in_front = rel
        .angle()
        .is_none_or(|a| trim_angle(a - robot.w).abs() <= constants.robot.front_angle());
    if !in_front {
        return circular;
    }

    let heading = robot.heading();
    let limit = constants.dribbler_offset();
    let projected = rel.dot(&heading);
    if projected >= limit {
        Point2::ZERO
    } else {
        heading * (limit - projected)
    }
}

/// Ideal ball center when held by the dribbler.
pub fn dribbler_center(pose: Pose, constants: &Constants) -> Point2 {
    pose.xy() + pose.heading() * constants.dribbler_offset()
}

/// Closed-form ball motion under friction.
///
/// Returns position and velocity after `dt`, never past the stopping time.
pub fn predict_ball(pos: Point2, velocity: Point2, dt: f64, deceleration: f64) -> (Point2, Point2) {
    let speed = velocity.norm();
    let Some(dir) = velocity.unit() else {
        return (pos, Point2::ZERO);
    };
    let t_stop = if deceleration > 0.0 {
        speed / deceleration
    } else {
        f64::INFINITY
    };
    let t = dt.clamp(0.0, t_stop);
    let travelled = speed * t - 0.5 * deceleration * t * t;
    let remaining = (speed - deceleration * t).max(0.0);
    (pos + dir * travelled, dir * remaining)
}

impl WorldModel {
    /// Ideal ball center for a robot's dribbler.
    pub fn dribbler_pos(&self, team: Team, id: RobotId) -> Option<Point2> {
        self.robot_pose(team, id)
            .map(|pose| dribbler_center(pose, self.constants()))
    }

    /// Current ball velocity (mm/s), zero when it cannot be estimated.
    ///
    /// Uses the newest sample and the newest sample at least
    /// `min_time_interval` older. The average velocity over that window is
    /// the velocity at its midpoint; friction is subtracted for the half
    /// window since then.
    pub fn ball_velocity(&self) -> Point2 {
        let Some(newest) = self.ball_positions.latest() else {
            return Point2::ZERO;
        };
        let min_dt = self.constants().ball.min_time_interval;
        let Some(older) = self.ball_positions.older_than_newest_by(min_dt) else {
            return Point2::ZERO;
        };

        let dt = newest.t - older.t;
        if dt <= 0.0 {
            return Point2::ZERO;
        }
        let v_mid = (newest.value - older.value) * (1.0 / dt);
        let Some(dir) = v_mid.unit() else {
            return Point2::ZERO;
        };

        let decel = self.constants().ball.deceleration;
        // Scaling the unit vector by a non-negative speed keeps each axis sign
        let speed = (v_mid.norm() - decel * dt / 2.0).max(0.0);
        dir * speed
    }

    /// Ball position `dt` seconds from the newest sample.
    pub fn predict_ball_pos(&self, dt: f64) -> Option<Point2> {
        let pos = self.ball_pos()?;
        let decel = self.constants().ball.deceleration;
        Some(predict_ball(pos, self.ball_velocity(), dt, decel).0)
    }

    /// Seconds until the ball stops rolling.
    pub fn ball_stop_time(&self) -> f64 {
        let decel = self.constants().ball.deceleration;
        if decel <= 0.0 {
            return f64::INFINITY;
        }
        self.ball_velocity().norm() / decel
    }

    /// True when the ball has sat in the robot's dribbler for every sample
    /// of the hold window.
    pub fn ball_in_dribbler(&self, team: Team, id: RobotId) -> bool {
        let constants = self.constants();
        let ball = &constants.ball;
        let max_center_dist = constants.robot.radius + ball.dribble_center_margin;

        let mut seen = false;
        for sample in self.ball_positions.within(ball.dribble_hold_time) {
            let Some(pose) = self.robot_pose_at(team, id, sample.t) else {
                return false;
            };
            let in_zone = sample.value.distance(&dribbler_center(pose, constants))
                <= ball.dribble_zone_radius;
            let near_center = sample.value.distance(&pose.xy()) <= max_center_dist;
            if !(in_zone && near_center) {
                return false;
            }
            seen = true;
        }
        seen
    }

    /// Where the ball will cross `team`'s goal line, if it is heading into
    /// the goal.
    ///
    /// The current velocity is extrapolated in a straight line over the
    /// shot horizon, without friction.
    pub fn is_shot_coming(&self, team: Team) -> Option<Point2> {
        let constants = self.constants();
        let planner = &constants.planner;
        let start = self.ball_pos()?;
        let velocity = self.ball_velocity();
        let goal_x = self.get_defense_goal(team).x;

        // Must be rolling towards our goal line
        if velocity.x * (goal_x - start.x) <= 0.0 {
            return None;
        }

        let end = start + velocity * planner.shot_horizon;
        let run = end.x - start.x;
        if run.abs() < f64::EPSILON {
            return None;
        }
        let s = (goal_x - start.x) / run;
        if s > 1.0 && (end.x - goal_x).abs() > planner.shot_goal_line_tolerance {
            return None;
        }

        let y = start.y + s * (end.y - start.y);
        if y.abs() <= constants.field.goal_width / 2.0 + planner.shot_lateral_buffer {
            Some(Point2::new(goal_x, y))
        } else {
            None
        }
    }
}
