//! Multi-step routines built from actions.
//!
//! Routine progress is kept per robot in the [`Planner`], so a routine is
//! resumed (not restarted) on the next tick.

use super::planner::Planner;
use crate::core::{Point2, Pose, RobotId};
use crate::world::{Waypoint, WorldModel};

/// Extra distance behind the ball for the lining-up point (mm).
const STAGING_MARGIN: f64 = 200.0;
/// Approach speed for the final capture (mm/s).
const CAPTURE_SPEED: f64 = 300.0;
/// How far ahead to aim for a rolling ball (s).
const BALL_LOOKAHEAD: f64 = 0.3;
/// Give up waiting for the ball to leave after a kick (s).
const KICK_TIMEOUT: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Routine {
    /// Fetching the ball before a kick
    Fetch,
    /// Holding the ball, turning to the target and charging
    Aim,
    /// Kicker fired at `since`
    Fire { since: f64 },
}

impl Planner {
    /// Drive onto the ball and capture it with the dribbler.
    pub fn get_ball(&mut self, world: &mut WorldModel, id: RobotId, now: f64) -> bool {
        let team = self.team();
        if world.ball_in_dribbler(team, id) {
            self.set_dribbler(world, id, true);
            return true;
        }

        let (Some(ball), Some(pose)) = (world.predict_ball_pos(BALL_LOOKAHEAD), world.robot_pose(team, id))
        else {
            return false;
        };
        let Some(dir) = (ball - pose.xy()).unit() else {
            return false;
        };
        let Some(heading) = dir.angle() else {
            return false;
        };

        let offset = world.constants().dribbler_offset();
        let staging = ball - dir * (offset + STAGING_MARGIN);
        if pose.xy().distance(&ball) > offset + 2.0 * STAGING_MARGIN {
            self.set_dribbler(world, id, false);
            self.plan_path(world, id, Pose::from_point(staging, heading), now);
        } else {
            self.set_dribbler(world, id, true);
            let capture = ball - dir * offset;
            world.set_waypoints(
                team,
                id,
                vec![Waypoint::with_speeds(
                    Pose::from_point(capture, heading),
                    None,
                    Some(CAPTURE_SPEED),
                )],
            );
        }
        false
    }

    /// Get the ball, face `target`, charge to at least `min_charge` and
    /// kick. Returns `true` on the tick the kick completes.
    pub fn prepare_and_kick(
        &mut self,
        world: &mut WorldModel,
        id: RobotId,
        target: Point2,
        min_charge: f64,
        now: f64,
    ) -> bool {
        let team = self.team();
        let stage = self.routines.get(&id).copied().unwrap_or(Routine::Fetch);

        let next = match stage {
            Routine::Fetch => {
                self.charge_up_to(world, id, min_charge);
                if self.get_ball(world, id, now) {
                    Routine::Aim
                } else {
                    Routine::Fetch
                }
            }
            Routine::Aim => {
                if !world.ball_in_dribbler(team, id) {
                    Routine::Fetch
                } else {
                    let charged = self.charge_up_to(world, id, min_charge);
                    let aimed = self.pivot_with_ball(world, id, target);
                    if charged && aimed {
                        self.set_is_kicking(world, id, true);
                        Routine::Fire { since: now }
                    } else {
                        Routine::Aim
                    }
                }
            }
            Routine::Fire { since } => {
                if !world.ball_in_dribbler(team, id) || now - since > KICK_TIMEOUT {
                    self.set_is_kicking(world, id, false);
                    self.set_dribbler(world, id, false);
                    self.routines.remove(&id);
                    return true;
                }
                self.set_is_kicking(world, id, true);
                stage
            }
        };

        self.routines.insert(id, next);
        false
    }
}
