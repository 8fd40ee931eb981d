//! Per-team planning context with memoized RRT paths.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::routines::Routine;
use crate::core::{Point2, Pose, RobotId, Team, trim_angle};
use crate::planning::{Mover, RrtConfig, find_path, is_chain_blocked, is_path_blocked};
use crate::world::{Waypoint, WorldModel};

/// Goals closer than this (mm) count as unchanged.
const SAME_GOAL_DISTANCE: f64 = 1.0;
/// Headings closer than this (rad) count as unchanged.
const SAME_GOAL_ANGLE: f64 = 1e-3;
/// Ball speed that only a kick produces (mm/s).
const KICK_SEEN_SPEED: f64 = 1000.0;
/// A kicked ball is still this close to its kicker (mm).
const KICK_SEEN_RANGE: f64 = 1500.0;

#[derive(Clone, Copy, Debug)]
struct PathMemo {
    goal: Pose,
    planned_at: f64,
    failed: bool,
}

/// Everything the strategy layer remembers between ticks for one team.
pub struct Planner {
    team: Team,
    rng: SmallRng,
    paths: HashMap<RobotId, PathMemo>,
    pub(crate) routines: HashMap<RobotId, Routine>,
}

impl Planner {
    /// Create a planner. A zero seed draws one from the OS.
    pub fn new(team: Team, seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self {
            team,
            rng,
            paths: HashMap::new(),
            routines: HashMap::new(),
        }
    }

    #[inline]
    pub fn team(&self) -> Team {
        self.team
    }

    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Forget path and routine state of robots not in `ids`.
    pub fn retain_robots(&mut self, ids: &[RobotId]) {
        self.paths.retain(|id, _| ids.contains(id));
        self.routines.retain(|id, _| ids.contains(id));
    }

    /// Drop waypoints our robots have reached from this team's commands.
    ///
    /// The radio's and simulator's copies are overwritten by these on every
    /// snapshot.
    pub fn consume_reached_waypoints(&self, world: &mut WorldModel) {
        let team = self.team;
        let threshold = world.constants().control.distance_threshold;
        for id in world.robot_ids(team) {
            let Some(pose) = world.robot_pose(team, id) else {
                continue;
            };
            if let Some(commands) = world.robot_commands_mut(team).get_mut(&id) {
                let dropped = commands.consume_reached(pose, threshold);
                if dropped > 0 {
                    log::trace!("{} robot {} reached {} waypoints", team, id, dropped);
                }
            }
        }
    }

    /// Clear the kick request of robots the ball has just left at kick
    /// speed.
    pub fn retire_kicks(&self, world: &mut WorldModel) {
        let team = self.team;
        let Some(ball) = world.ball_pos() else {
            return;
        };
        let velocity = world.ball_velocity();
        if velocity.norm() < KICK_SEEN_SPEED {
            return;
        }

        let kicking: Vec<RobotId> = world
            .robot_commands(team)
            .iter()
            .filter(|(_, c)| c.is_kicking)
            .map(|(&id, _)| id)
            .collect();
        for id in kicking {
            if world.ball_in_dribbler(team, id) {
                continue;
            }
            let Some(pose) = world.robot_pose(team, id) else {
                continue;
            };
            let away = ball - pose.xy();
            if away.norm() <= KICK_SEEN_RANGE && away.dot(&velocity) > 0.0 {
                world.commands_mut(team, id).is_kicking = false;
                log::debug!("{} robot {} kick seen", team, id);
            }
        }
    }

    /// Drive to `goal`, straight if possible, else along an RRT path.
    ///
    /// Returns `false` when no path could be found; the previous
    /// waypoints are then left untouched.
    pub fn plan_path(&mut self, world: &mut WorldModel, id: RobotId, goal: Pose, now: f64) -> bool {
        self.plan_path_limited(world, id, goal, None, now)
    }

    /// [`Planner::plan_path`] with a per-leg speed ceiling.
    pub fn plan_path_limited(
        &mut self,
        world: &mut WorldModel,
        id: RobotId,
        goal: Pose,
        max_speed: Option<f64>,
        now: f64,
    ) -> bool {
        let team = self.team;
        let Some(pose) = world.robot_pose(team, id) else {
            return false;
        };
        let mover = Mover::new(team, id);
        // A robot already standing somewhere illegal must be allowed out
        let check_legal = world.is_pos_legal(pose.xy(), team, id);
        let waypoint = |p: Point2| Waypoint::with_speeds(Pose::from_point(p, goal.w), None, max_speed);

        if !is_path_blocked(world, pose.xy(), goal.xy(), mover, check_legal) {
            world.set_waypoints(team, id, vec![waypoint(goal.xy())]);
            self.paths.remove(&id);
            return true;
        }

        let rrt_interval = world.constants().planner.rrt_interval;
        if let Some(memo) = self.paths.get(&id) {
            let same_goal = memo.goal.distance(&goal) < SAME_GOAL_DISTANCE
                && trim_angle(memo.goal.w - goal.w).abs() < SAME_GOAL_ANGLE;
            if same_goal && now - memo.planned_at < rrt_interval {
                if memo.failed {
                    return false;
                }
                let chain: Vec<Point2> = world
                    .waypoints(team, id)
                    .iter()
                    .map(|w| w.pose.xy())
                    .collect();
                if !chain.is_empty()
                    && !is_chain_blocked(world, pose.xy(), &chain, mover, check_legal)
                {
                    return true;
                }
            }
        }

        let config = RrtConfig::from_world(world, check_legal);
        let result = find_path(world, mover, pose.xy(), goal.xy(), &config, &mut self.rng);
        match result {
            Ok(points) => {
                let path = points.into_iter().map(waypoint).collect();
                world.set_waypoints(team, id, path);
                self.paths.insert(
                    id,
                    PathMemo {
                        goal,
                        planned_at: now,
                        failed: false,
                    },
                );
                true
            }
            Err(e) => {
                log::debug!("{} robot {}: {}", team, id, e);
                self.paths.insert(
                    id,
                    PathMemo {
                        goal,
                        planned_at: now,
                        failed: true,
                    },
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_world() -> WorldModel {
        let mut w = WorldModel::default();
        w.push_robot(Team::Blue, 1, 0.0, Pose::new(-1500.0, 0.0, 0.0));
        for (i, y) in [-540.0, -270.0, 0.0, 270.0, 540.0].iter().enumerate() {
            w.push_robot(Team::Yellow, i as u8, 0.0, Pose::new(0.0, *y, 0.0));
        }
        w
    }

    #[test]
    fn test_straight_path_when_clear() {
        let mut w = WorldModel::default();
        w.push_robot(Team::Blue, 1, 0.0, Pose::new(-3000.0, 0.0, 0.0));
        let mut p = Planner::new(Team::Blue, 5);
        let goal = Pose::new(3000.0, 0.0, 1.0);
        assert!(p.plan_path(&mut w, 1, goal, 0.0));
        assert_eq!(w.waypoints(Team::Blue, 1).len(), 1);
        assert_eq!(w.waypoints(Team::Blue, 1)[0].pose, goal);
    }

    #[test]
    fn test_rrt_path_is_memoized() {
        let mut w = wall_world();
        let mut p = Planner::new(Team::Blue, 11);
        let goal = Pose::new(1500.0, 0.0, 0.0);
        assert!(p.plan_path(&mut w, 1, goal, 0.0));
        let first = w.waypoints(Team::Blue, 1).to_vec();
        assert!(first.len() >= 2);

        // Same goal within the replan interval keeps the chain
        assert!(p.plan_path(&mut w, 1, goal, 1.0));
        assert_eq!(w.waypoints(Team::Blue, 1), first.as_slice());
    }

    #[test]
    fn test_reached_waypoints_consumed_on_own_commands() {
        let mut w = WorldModel::default();
        w.push_robot(Team::Blue, 1, 0.0, Pose::new(1000.0, 10.0, 0.0));
        w.set_waypoints(
            Team::Blue,
            1,
            vec![
                Waypoint::new(Pose::new(1000.0, 0.0, 0.0)),
                Waypoint::new(Pose::new(1000.0, 1000.0, 0.0)),
            ],
        );
        let p = Planner::new(Team::Blue, 3);
        p.consume_reached_waypoints(&mut w);
        assert_eq!(w.waypoints(Team::Blue, 1).len(), 1);
        assert_eq!(w.waypoints(Team::Blue, 1)[0].pose.y, 1000.0);

        // Moving off the corner never brings it back
        w.push_robot(Team::Blue, 1, 0.1, Pose::new(1000.0, 100.0, 0.0));
        p.consume_reached_waypoints(&mut w);
        assert_eq!(w.waypoints(Team::Blue, 1).len(), 1);
    }

    #[test]
    fn test_kick_retired_once_ball_leaves() {
        let mut w = WorldModel::default();
        w.push_robot(Team::Blue, 1, 1.0, Pose::new(0.0, 0.0, 0.0));
        w.set_ball_state(1.0, Point2::new(111.5, 0.0), Point2::ZERO);
        w.commands_mut(Team::Blue, 1).is_kicking = true;
        let p = Planner::new(Team::Blue, 3);

        // Still held
        p.retire_kicks(&mut w);
        assert!(w.commands(Team::Blue, 1).unwrap().is_kicking);

        // Flying off the dribbler
        w.set_ball_state(1.1, Point2::new(400.0, 0.0), Point2::new(3000.0, 0.0));
        p.retire_kicks(&mut w);
        assert!(!w.commands(Team::Blue, 1).unwrap().is_kicking);
    }

    #[test]
    fn test_kick_kept_for_unrelated_fast_ball() {
        let mut w = WorldModel::default();
        w.push_robot(Team::Blue, 1, 1.0, Pose::new(0.0, 0.0, 0.0));
        w.commands_mut(Team::Blue, 1).is_kicking = true;
        // Fast, but rolling towards the robot
        w.set_ball_state(1.0, Point2::new(800.0, 0.0), Point2::new(-3000.0, 0.0));
        Planner::new(Team::Blue, 3).retire_kicks(&mut w);
        assert!(w.commands(Team::Blue, 1).unwrap().is_kicking);
    }

    #[test]
    fn test_failed_plan_leaves_waypoints() {
        let mut w = WorldModel::default();
        w.push_robot(Team::Blue, 0, 0.0, Pose::new(0.0, 0.0, 0.0));
        let r = 2.0 * w.constants().robot.radius;
        for k in 0..8 {
            let a = k as f64 * std::f64::consts::FRAC_PI_4;
            w.push_robot(Team::Yellow, k, 0.0, Pose::new(r * a.cos(), r * a.sin(), 0.0));
        }
        let previous = vec![Waypoint::new(Pose::new(10.0, 10.0, 0.0))];
        w.set_waypoints(Team::Blue, 0, previous.clone());

        let mut p = Planner::new(Team::Blue, 2);
        assert!(!p.plan_path(&mut w, 0, Pose::new(2000.0, 0.0, 0.0), 0.0));
        assert_eq!(w.waypoints(Team::Blue, 0), previous.as_slice());
    }
}
