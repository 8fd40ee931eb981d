//! Per-robot motion commands and waypoint-to-velocity derivation.

use crate::config::Constants;
use crate::core::{
    Point2, Pose, field_to_robot_perspective, robot_to_field_perspective, trim_angle,
};

/// A target pose, optionally with per-leg speed bounds (mm/s).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub pose: Pose,
    /// Floor on linear speed while farther than the arrival threshold
    pub min_speed: Option<f64>,
    /// Ceiling on linear speed, never above the command's speed limit
    pub max_speed: Option<f64>,
}

impl Waypoint {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            min_speed: None,
            max_speed: None,
        }
    }

    pub fn with_speeds(pose: Pose, min_speed: Option<f64>, max_speed: Option<f64>) -> Self {
        Self {
            pose,
            min_speed,
            max_speed,
        }
    }
}

impl From<Pose> for Waypoint {
    fn from(pose: Pose) -> Self {
        Waypoint::new(pose)
    }
}

/// Robot-local velocity: x right, y forward (mm/s), w CCW (rad/s).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
    pub w: f64,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity {
        x: 0.0,
        y: 0.0,
        w: 0.0,
    };

    #[inline]
    pub fn linear(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Everything the radio sends for one robot.
#[derive(Clone, Debug, PartialEq)]
pub struct Commands {
    /// Front is the current goal
    pub waypoints: Vec<Waypoint>,
    /// Regenerated by [`Commands::derive_speeds`] each tick
    pub derived_xyw: Velocity,
    pub is_dribbling: bool,
    pub is_charging: bool,
    pub is_kicking: bool,
    /// Linear speed ceiling (mm/s)
    pub speed_limit: f64,
}

impl Commands {
    pub fn new(speed_limit: f64) -> Self {
        Self {
            waypoints: Vec::new(),
            derived_xyw: Velocity::ZERO,
            is_dribbling: false,
            is_charging: false,
            is_kicking: false,
            speed_limit,
        }
    }

    pub fn set_waypoints(&mut self, waypoints: Vec<Waypoint>) {
        self.waypoints = waypoints;
    }

    /// Replace the path with a single goal.
    pub fn set_goal(&mut self, goal: Pose) {
        self.waypoints.clear();
        self.waypoints.push(Waypoint::new(goal));
    }

    #[inline]
    pub fn goal(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    /// Final destination of the path.
    #[inline]
    pub fn destination(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    /// Halt: drop the path, zero the velocity, clear every flag.
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.derived_xyw = Velocity::ZERO;
        self.is_dribbling = false;
        self.is_charging = false;
        self.is_kicking = false;
    }

    /// Drop waypoints within `threshold` of `pose` from the front, keeping
    /// the last one. Returns how many were dropped.
    pub fn consume_reached(&mut self, pose: Pose, threshold: f64) -> usize {
        let mut dropped = 0;
        while self.waypoints.len() > 1 && pose.distance(&self.waypoints[0].pose) < threshold {
            self.waypoints.remove(0);
            dropped += 1;
        }
        dropped
    }

    /// Turn the waypoint chain into a robot-local velocity for `pose`.
    ///
    /// Reached waypoints (within the distance threshold, heading ignored)
    /// are consumed from the front while more than one remains.
    pub fn derive_speeds(&mut self, pose: Pose, constants: &Constants) -> Velocity {
        let control = &constants.control;
        let threshold = control.distance_threshold;

        self.consume_reached(pose, threshold);

        let Some(goal) = self.waypoints.first().copied() else {
            self.derived_xyw = Velocity::ZERO;
            return self.derived_xyw;
        };

        let delta = goal.pose.xy() - pose.xy();
        let distance = delta.norm();
        let local = field_to_robot_perspective(pose.w, delta);

        let limit = goal
            .max_speed
            .map_or(self.speed_limit, |m| m.min(self.speed_limit))
            .max(0.0);
        let mut linear = (distance * control.speed_scale).clamp(0.0, limit);
        if distance > threshold {
            if let Some(min) = goal.min_speed {
                linear = linear.max(min.min(limit));
            }
        }

        let v = local.unit().map_or(Point2::ZERO, |u| u * linear);
        let max_w = constants.robot.max_w;
        let w = (trim_angle(goal.pose.w - pose.w) * control.rotation_speed_scale)
            .clamp(-max_w, max_w);

        self.derived_xyw = Velocity { x: v.x, y: v.y, w };
        self.derived_xyw
    }

    /// Integrate the derived velocity over `dt` starting at `pose`.
    ///
    /// The local velocity is rotated into the field frame at the mid-step
    /// heading.
    pub fn predict_pos(&self, pose: Pose, dt: f64) -> Pose {
        let v = self.derived_xyw;
        let mid_w = pose.w + v.w * dt / 2.0;
        let field_v = robot_to_field_perspective(mid_w, v.linear());
        Pose::new(
            pose.x + field_v.x * dt,
            pose.y + field_v.y * dt,
            pose.w + v.w * dt,
        )
    }
}

/// True when `current` is within `distance` and `angle` of `goal`.
pub fn close_enough(current: Pose, goal: Pose, distance: f64, angle: f64) -> bool {
    let delta = goal.xy() - current.xy();
    delta.norm() <= distance && trim_angle(goal.w - current.w).abs() <= angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn commands() -> Commands {
        Commands::new(Constants::default().robot.max_speed)
    }

    #[test]
    fn test_no_waypoints_zero() {
        let mut c = commands();
        c.derived_xyw = Velocity {
            x: 1.0,
            y: 2.0,
            w: 3.0,
        };
        let v = c.derive_speeds(Pose::default(), &Constants::default());
        assert_eq!(v, Velocity::ZERO);
        assert_eq!(c.derived_xyw, Velocity::ZERO);
    }

    #[test]
    fn test_forward_motion_is_local_y() {
        let constants = Constants::default();
        let mut c = commands();
        c.set_goal(Pose::new(0.0, 100.0, FRAC_PI_2));
        let v = c.derive_speeds(Pose::new(0.0, 0.0, FRAC_PI_2), &constants);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v.y, 150.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v.w, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_speed_limit_and_leg_bounds() {
        let constants = Constants::default();
        let mut c = commands();
        c.set_goal(Pose::new(5000.0, 0.0, 0.0));
        let v = c.derive_speeds(Pose::new(0.0, 0.0, 0.0), &constants);
        assert_abs_diff_eq!(v.linear().norm(), 600.0, epsilon = 1e-9);

        c.speed_limit = 450.0;
        let v = c.derive_speeds(Pose::new(0.0, 0.0, 0.0), &constants);
        assert_abs_diff_eq!(v.linear().norm(), 450.0, epsilon = 1e-9);

        c.set_waypoints(vec![Waypoint::with_speeds(
            Pose::new(5000.0, 0.0, 0.0),
            None,
            Some(200.0),
        )]);
        let v = c.derive_speeds(Pose::new(0.0, 0.0, 0.0), &constants);
        assert_abs_diff_eq!(v.linear().norm(), 200.0, epsilon = 1e-9);

        c.set_waypoints(vec![Waypoint::with_speeds(
            Pose::new(100.0, 0.0, 0.0),
            Some(300.0),
            None,
        )]);
        let v = c.derive_speeds(Pose::new(0.0, 0.0, 0.0), &constants);
        assert_abs_diff_eq!(v.linear().norm(), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotation_clamped() {
        let constants = Constants::default();
        let mut c = commands();
        c.set_goal(Pose::new(0.0, 0.0, 3.0));
        let v = c.derive_speeds(Pose::new(0.0, 0.0, 0.0), &constants);
        assert_abs_diff_eq!(v.w, constants.robot.max_w, epsilon = 1e-9);

        c.set_goal(Pose::new(0.0, 0.0, -0.1));
        let v = c.derive_speeds(Pose::new(0.0, 0.0, 0.0), &constants);
        assert_abs_diff_eq!(v.w, -0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_last_waypoint_never_popped() {
        let constants = Constants::default();
        let mut c = commands();
        c.set_waypoints(vec![
            Waypoint::new(Pose::new(10.0, 0.0, 0.0)),
            Waypoint::new(Pose::new(20.0, 0.0, 0.0)),
        ]);
        c.derive_speeds(Pose::new(15.0, 0.0, 0.0), &constants);
        assert_eq!(c.waypoints.len(), 1);
        assert_eq!(c.goal().unwrap().pose.x, 20.0);
    }

    #[test]
    fn test_waypoints_set_get() {
        let mut c = commands();
        let path = vec![
            Waypoint::new(Pose::new(1.0, 2.0, 0.3)),
            Waypoint::with_speeds(Pose::new(4.0, 5.0, -0.3), Some(10.0), Some(100.0)),
        ];
        c.set_waypoints(path.clone());
        assert_eq!(c.waypoints, path);
    }

    #[test]
    fn test_predict_pos_straight() {
        let mut c = commands();
        c.derived_xyw = Velocity {
            x: 0.0,
            y: 100.0,
            w: 0.0,
        };
        let p = c.predict_pos(Pose::new(0.0, 0.0, 0.0), 2.0);
        assert_abs_diff_eq!(p.x, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clear_keeps_speed_limit() {
        let mut c = commands();
        c.speed_limit = 450.0;
        c.is_kicking = true;
        c.set_goal(Pose::new(1.0, 1.0, 0.0));
        c.clear();
        assert!(c.waypoints.is_empty());
        assert!(!c.is_kicking);
        assert_eq!(c.speed_limit, 450.0);
    }

    #[test]
    fn test_close_enough_uses_goal_minus_current() {
        let goal = Pose::new(100.0, 0.0, 0.0);
        assert!(close_enough(Pose::new(60.0, 0.0, 0.05), goal, 50.0, 0.1));
        assert!(!close_enough(Pose::new(40.0, 0.0, 0.0), goal, 50.0, 0.1));
        assert!(!close_enough(Pose::new(100.0, 0.0, 0.5), goal, 50.0, 0.1));
    }
}
