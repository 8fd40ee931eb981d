//! One-step actions. Each returns `true` once its goal is met.

use super::planner::Planner;
use crate::core::{Point2, Pose, RobotId, trim_angle};
use crate::world::{Waypoint, WorldModel, close_enough};

/// Linear speed while turning around the ball (mm/s).
const PIVOT_SPEED: f64 = 300.0;

impl Planner {
    /// Head straight for `goal` without path planning.
    pub fn move_straight(&mut self, world: &mut WorldModel, id: RobotId, goal: Pose) -> bool {
        world.commands_mut(self.team(), id).set_goal(goal);
        self.is_at(world, id, goal)
    }

    /// Head for `goal` around obstacles.
    pub fn move_to(&mut self, world: &mut WorldModel, id: RobotId, goal: Pose, now: f64) -> bool {
        self.plan_path(world, id, goal, now);
        self.is_at(world, id, goal)
    }

    /// Whether the robot has reached `goal` within the arrival thresholds.
    pub fn is_at(&self, world: &WorldModel, id: RobotId, goal: Pose) -> bool {
        let control = &world.constants().control;
        world
            .robot_pose(self.team(), id)
            .is_some_and(|pose| {
                close_enough(pose, goal, control.distance_threshold, control.angle_threshold)
            })
    }

    /// Turn around the ball, keeping it on the dribbler, until facing
    /// `face_pos`.
    pub fn pivot_with_ball(&mut self, world: &mut WorldModel, id: RobotId, face_pos: Point2) -> bool {
        let team = self.team();
        let (Some(ball), Some(pose)) = (world.ball_pos(), world.robot_pose(team, id)) else {
            return false;
        };
        let Some(heading) = (face_pos - ball).angle() else {
            return true;
        };

        let offset = world.constants().dribbler_offset();
        let center = ball - Point2::from_angle(heading) * offset;
        let commands = world.commands_mut(team, id);
        commands.is_dribbling = true;
        commands.set_waypoints(vec![Waypoint::with_speeds(
            Pose::from_point(center, heading),
            None,
            Some(PIVOT_SPEED),
        )]);

        trim_angle(heading - pose.w).abs() <= world.constants().control.angle_threshold
    }

    pub fn set_dribbler(&mut self, world: &mut WorldModel, id: RobotId, on: bool) -> bool {
        world.commands_mut(self.team(), id).is_dribbling = on;
        true
    }

    pub fn set_is_kicking(&mut self, world: &mut WorldModel, id: RobotId, on: bool) -> bool {
        world.commands_mut(self.team(), id).is_kicking = on;
        true
    }

    /// Charge the kicker until it can kick at `speed` (mm/s).
    pub fn charge_up_to(&mut self, world: &mut WorldModel, id: RobotId, speed: f64) -> bool {
        let team = self.team();
        let charged = world.status(team, id).is_charged_to(speed);
        world.commands_mut(team, id).is_charging = !charged;
        charged
    }
}
