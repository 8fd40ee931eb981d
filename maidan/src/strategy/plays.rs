//! Team plays: formations for restarts and stoppages.

use super::planner::Planner;
use crate::core::{Point2, Pose, RobotId};
use crate::world::WorldModel;

/// Gap between neighbouring robots in a wall (mm).
const WALL_GAP: f64 = 20.0;
/// Kicker's distance behind the ball at a kickoff (mm).
const KICKOFF_STANDOFF: f64 = 100.0;
/// Spacing along the touchline during a timeout (mm).
const TIMEOUT_SPACING: f64 = 400.0;
/// Extra margin beyond the referee distance when lining up (mm).
const RESTART_MARGIN: f64 = 200.0;

impl Planner {
    /// Stop every robot of our team and clear all actuators.
    pub fn halt(&mut self, world: &mut WorldModel) -> bool {
        let team = self.team();
        for commands in world.robot_commands_mut(team).values_mut() {
            commands.clear();
        }
        self.routines.clear();
        true
    }

    /// Line `ids` up across the ball-to-goal line, `distance_from_ball` from
    /// the ball, facing it.
    pub fn form_wall(
        &mut self,
        world: &mut WorldModel,
        ids: &[RobotId],
        distance_from_ball: f64,
        now: f64,
    ) -> bool {
        if ids.is_empty() {
            return true;
        }
        let team = self.team();
        let goal = world.get_defense_goal(team);
        let ball = world.ball_pos().unwrap_or(Point2::ZERO);
        let dir = (goal - ball)
            .unit()
            .unwrap_or(Point2::new(world.defense_side_sign(team), 0.0));
        let across = Point2::new(-dir.y, dir.x);
        let center = ball + dir * distance_from_ball;
        let spacing = 2.0 * world.constants().robot.radius + WALL_GAP;
        let mid = (ids.len() as f64 - 1.0) / 2.0;

        let mut done = true;
        for (k, &id) in ids.iter().enumerate() {
            let pos = center + across * ((k as f64 - mid) * spacing);
            let heading = (ball - pos).angle().unwrap_or(dir.angle().unwrap_or(0.0));
            done &= self.move_to(world, id, Pose::from_point(pos, heading), now);
        }
        done
    }

    /// Kickoff positions in our half. When `ours`, the first non-goalie
    /// robot lines up behind the ball.
    pub fn kickoff(&mut self, world: &mut WorldModel, ids: &[RobotId], ours: bool, now: f64) -> bool {
        let team = self.team();
        let side = world.defense_side_sign(team);
        let constants = world.constants();
        let circle = constants.field.center_circle_radius;
        let kicker_dist = constants.dribbler_offset() + KICKOFF_STANDOFF;
        let forward = self.facing_field(world);

        // Own-half spots outside the center circle, nearest first
        let spots = [
            Point2::new(side * (circle + 400.0), 1000.0),
            Point2::new(side * (circle + 400.0), -1000.0),
            Point2::new(side * 1800.0, 0.0),
            Point2::new(side * 2000.0, 1600.0),
            Point2::new(side * 2000.0, -1600.0),
            Point2::new(side * 3000.0, 0.0),
        ];

        let mut done = true;
        let mut spot_iter = spots.iter();
        let mut kicker_assigned = !ours;
        for &id in ids {
            if world.is_goalie(id) {
                done &= self.goalie(world, id);
                continue;
            }
            let pos = if !kicker_assigned {
                kicker_assigned = true;
                Point2::new(side * kicker_dist, 0.0)
            } else if let Some(&spot) = spot_iter.next() {
                spot
            } else {
                continue;
            };
            done &= self.move_to(world, id, Pose::from_point(pos, forward), now);
        }
        done
    }

    /// Park the team along our touchline.
    pub fn timeout(&mut self, world: &mut WorldModel, ids: &[RobotId], now: f64) -> bool {
        let side = world.defense_side_sign(self.team());
        let y = -(world.constants().half_y() - 2.0 * world.constants().robot.radius);
        let heading = std::f64::consts::FRAC_PI_2;
        let mut done = true;
        for (k, &id) in ids.iter().enumerate() {
            let x = side * (TIMEOUT_SPACING + k as f64 * TIMEOUT_SPACING);
            done &= self.move_to(world, id, Pose::new(x, y, heading), now);
        }
        done
    }

    /// Referee STOP: slow down, keep the goalie home, wall up clear of the
    /// ball.
    pub fn stop_formation(&mut self, world: &mut WorldModel, ids: &[RobotId], now: f64) -> bool {
        let team = self.team();
        let limit = world.constants().planner.stop_speed_limit;
        for &id in ids {
            let commands = world.commands_mut(team, id);
            commands.speed_limit = commands.speed_limit.min(limit);
            commands.is_kicking = false;
            commands.is_dribbling = false;
        }
        self.routines.clear();

        let planner = &world.constants().planner;
        let distance = planner.stop_ball_clearance + world.constants().robot.radius + RESTART_MARGIN;
        let mut done = true;
        let mut field_players = Vec::new();
        for &id in ids {
            if world.is_goalie(id) {
                done &= self.goalie(world, id);
            } else {
                field_players.push(id);
            }
        }
        done & self.form_wall(world, &field_players, distance, now)
    }

    /// Penalty setup. The goalie stays on the line for an opponent penalty;
    /// everyone else stands behind the ball. For our own penalty the first
    /// field player takes the kick.
    pub fn penalty(&mut self, world: &mut WorldModel, ids: &[RobotId], ours: bool, now: f64) -> bool {
        let team = self.team();
        let Some(ball) = world.ball_pos() else {
            return false;
        };
        let side = world.defense_side_sign(team);
        let constants = world.constants();
        let behind_dist = constants.planner.penalty_distance + RESTART_MARGIN;
        let spacing = 2.0 * constants.robot.radius + 2.0 * WALL_GAP;
        // Direction the kicking team shoots in
        let shoot = if ours { -side } else { side };
        let goal_line_x = side * (constants.half_x() - constants.robot.radius);
        let forward = self.facing_field(world);

        let mut done = true;
        let mut kicker = None;
        let mut others = Vec::new();
        for &id in ids {
            if world.is_goalie(id) && !ours {
                done &= self.move_straight(world, id, Pose::new(goal_line_x, 0.0, forward));
            } else if world.is_goalie(id) {
                done &= self.goalie(world, id);
            } else if ours && kicker.is_none() {
                kicker = Some(id);
            } else {
                others.push(id);
            }
        }

        if let Some(id) = kicker {
            let target = world.get_attack_goal(team);
            let heading = (target - ball).angle().unwrap_or(0.0);
            let stand = ball - Point2::from_angle(heading) * (world.constants().dribbler_offset() + KICKOFF_STANDOFF);
            done &= self.move_to(world, id, Pose::from_point(stand, heading), now);
        }

        let line_x = ball.x - shoot * behind_dist;
        let mid = (others.len() as f64 - 1.0) / 2.0;
        for (k, &id) in others.iter().enumerate() {
            let pos = Point2::new(line_x, (k as f64 - mid) * spacing);
            done &= self.move_to(world, id, Pose::from_point(pos, forward), now);
        }
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Team;
    use approx::assert_abs_diff_eq;

    fn team_world(ids: &[RobotId]) -> WorldModel {
        let mut w = WorldModel::default();
        for (k, &id) in ids.iter().enumerate() {
            w.push_robot(Team::Blue, id, 0.0, Pose::new(-3500.0 + k as f64 * 600.0, -2500.0, 0.0));
        }
        w
    }

    #[test]
    fn test_halt_clears_everything() {
        let mut w = team_world(&[0, 1]);
        w.commands_mut(Team::Blue, 1).is_kicking = true;
        w.commands_mut(Team::Blue, 1).set_goal(Pose::new(1.0, 1.0, 0.0));
        let mut p = Planner::new(Team::Blue, 1);
        assert!(p.halt(&mut w));
        let c = w.commands(Team::Blue, 1).unwrap();
        assert!(c.waypoints.is_empty() && !c.is_kicking);
    }

    #[test]
    fn test_wall_between_ball_and_goal() {
        let mut w = team_world(&[1, 2]);
        w.push_ball(0.0, Point2::new(0.0, 0.0));
        let mut p = Planner::new(Team::Blue, 1);
        p.form_wall(&mut w, &[1, 2], 800.0, 0.0);
        let a = w.commands(Team::Blue, 1).unwrap().destination().unwrap().pose;
        let b = w.commands(Team::Blue, 2).unwrap().destination().unwrap().pose;
        assert_abs_diff_eq!(a.x, -800.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.x, -800.0, epsilon = 1e-9);
        assert_abs_diff_eq!((a.y - b.y).abs(), 290.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.y + b.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_stop_formation_limits_speed_and_clears_ball() {
        let mut w = team_world(&[0, 1, 2]);
        w.push_ball(0.0, Point2::new(0.0, 0.0));
        let mut p = Planner::new(Team::Blue, 1);
        p.stop_formation(&mut w, &[0, 1, 2], 0.0);
        for id in [0, 1, 2] {
            assert_eq!(w.commands(Team::Blue, id).unwrap().speed_limit, 450.0);
        }
        for id in [1, 2] {
            let dest = w.commands(Team::Blue, id).unwrap().destination().unwrap().pose;
            assert!(dest.xy().norm() >= 635.0);
        }
    }

    #[test]
    fn test_kickoff_positions_in_own_half() {
        let mut w = team_world(&[0, 1, 2, 3]);
        w.push_ball(0.0, Point2::new(0.0, 0.0));
        let mut p = Planner::new(Team::Blue, 1);
        p.kickoff(&mut w, &[0, 1, 2, 3], true, 0.0);
        let kicker = w.commands(Team::Blue, 1).unwrap().destination().unwrap().pose;
        assert_abs_diff_eq!(kicker.x, -211.5, epsilon = 1e-9);
        for id in [2, 3] {
            let dest = w.commands(Team::Blue, id).unwrap().destination().unwrap().pose;
            assert!(dest.x < 0.0);
            assert!(dest.xy().norm() > 495.0);
        }
    }

    #[test]
    fn test_timeout_lines_up() {
        let mut w = team_world(&[1]);
        let mut p = Planner::new(Team::Blue, 1);
        p.timeout(&mut w, &[1], 0.0);
        let a = w.commands(Team::Blue, 1).unwrap().destination().unwrap().pose;
        assert_abs_diff_eq!(a.y, -2730.0, epsilon = 1e-9);
        assert!(a.x < 0.0);
    }

    #[test]
    fn test_opponent_penalty_lines_up_behind_ball() {
        let mut w = team_world(&[0, 1, 2]);
        w.push_ball(0.0, Point2::new(-2500.0, 0.0));
        let mut p = Planner::new(Team::Blue, 1);
        p.penalty(&mut w, &[0, 1, 2], false, 0.0);
        let goalie = w.commands(Team::Blue, 0).unwrap().destination().unwrap().pose;
        assert_abs_diff_eq!(goalie.x, -4365.0, epsilon = 1e-9);
        for id in [1, 2] {
            let dest = w.commands(Team::Blue, id).unwrap().destination().unwrap().pose;
            assert_abs_diff_eq!(dest.x, -1300.0, epsilon = 1e-9);
        }
    }
}
