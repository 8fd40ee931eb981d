//! Selectable team strategies and the per-tick dispatcher.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::planner::Planner;
use crate::core::{Point2, Pose, RobotId, Team};
use crate::planning::{Mover, is_position_open};
use crate::world::{RefereeCommand, WorldModel};

/// Wall distance used outside referee stoppages (mm).
const DEFENSE_WALL_DISTANCE: f64 = 800.0;
/// How long each entry formation is held once reached (s).
const FORMATION_HOLD: f64 = 2.0;
/// Attempts at drawing a random legal position.
const RANDOM_TRIES: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Operator drives the selected robot
    #[serde(alias = "UI")]
    Ui,
    GoalieTest,
    AttackerTest,
    DefenderTest,
    /// Scripted formation cycle
    EntryVideo,
    /// Every robot wanders between random legal spots
    RandomRobot,
    /// Referee-driven match play
    FullGame,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Ui => "ui",
            StrategyKind::GoalieTest => "goalie_test",
            StrategyKind::AttackerTest => "attacker_test",
            StrategyKind::DefenderTest => "defender_test",
            StrategyKind::EntryVideo => "entry_video",
            StrategyKind::RandomRobot => "random_robot",
            StrategyKind::FullGame => "full_game",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ui" => Ok(StrategyKind::Ui),
            "goalie_test" => Ok(StrategyKind::GoalieTest),
            "attacker_test" => Ok(StrategyKind::AttackerTest),
            "defender_test" => Ok(StrategyKind::DefenderTest),
            "entry_video" => Ok(StrategyKind::EntryVideo),
            "random_robot" => Ok(StrategyKind::RandomRobot),
            "full_game" => Ok(StrategyKind::FullGame),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// One team's strategy: a kind plus everything it remembers.
pub struct Strategy {
    kind: StrategyKind,
    planner: Planner,
    formation: usize,
    formation_reached_at: Option<f64>,
    random_targets: HashMap<RobotId, Pose>,
}

impl Strategy {
    pub fn new(kind: StrategyKind, team: Team, seed: u64) -> Self {
        Self {
            kind,
            planner: Planner::new(team, seed),
            formation: 0,
            formation_reached_at: None,
            random_targets: HashMap::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    #[inline]
    pub fn team(&self) -> Team {
        self.planner.team()
    }

    pub fn planner_mut(&mut self) -> &mut Planner {
        &mut self.planner
    }

    /// Index of the current entry formation.
    pub fn formation_index(&self) -> usize {
        self.formation
    }

    /// Update commands for every robot of our team.
    pub fn tick(&mut self, world: &mut WorldModel, now: f64) {
        let team = self.team();
        world.prune_commands();
        let ids = world.robot_ids(team);
        self.planner.retain_robots(&ids);
        self.random_targets.retain(|id, _| ids.contains(id));

        let constants = world.constants();
        let limit = if world.referee_command() == Some(RefereeCommand::Stop) {
            constants.planner.stop_speed_limit
        } else {
            constants.robot.max_speed
        };
        for &id in &ids {
            world.commands_mut(team, id).speed_limit = limit;
        }

        match self.kind {
            StrategyKind::Ui => self.ui(world, now),
            StrategyKind::GoalieTest => {
                let goalie = world.constants().planner.goalie_id;
                if ids.contains(&goalie) {
                    self.planner.goalie(world, goalie);
                }
            }
            StrategyKind::AttackerTest => {
                if let Some(id) = field_players(world, &ids).first().copied() {
                    self.planner.attacker(world, id, now);
                }
            }
            StrategyKind::DefenderTest => {
                let goalie = world.constants().planner.goalie_id;
                if ids.contains(&goalie) {
                    self.planner.goalie(world, goalie);
                }
                let wall: Vec<RobotId> = field_players(world, &ids).into_iter().take(2).collect();
                self.planner.form_wall(world, &wall, DEFENSE_WALL_DISTANCE, now);
            }
            StrategyKind::EntryVideo => self.entry_video(world, &ids, now),
            StrategyKind::RandomRobot => self.random_robot(world, &ids, now),
            StrategyKind::FullGame => self.full_game(world, &ids, now),
        }

        self.planner.retire_kicks(world);
        self.planner.consume_reached_waypoints(world);
    }

    fn ui(&mut self, world: &mut WorldModel, now: f64) {
        let team = self.team();
        let ui = world.ui_inputs.clone();
        if ui.selected_ball {
            return;
        }
        let Some(id) = ui.selected_on(team) else {
            return;
        };
        let Some(pose) = world.robot_pose(team, id) else {
            return;
        };

        if let Some(click) = ui.click_position {
            let heading = ui.drag_vector.and_then(|d| d.angle()).unwrap_or(pose.w);
            self.planner
                .plan_path(world, id, Pose::from_point(click, heading), now);
        }
        self.planner.set_dribbler(world, id, ui.dribble);
        self.planner.set_is_kicking(world, id, ui.kick);
        world.commands_mut(team, id).is_charging = ui.charge;
    }

    fn entry_video(&mut self, world: &mut WorldModel, ids: &[RobotId], now: f64) {
        let side = world.defense_side_sign(self.team());
        let poses = formation(self.formation, ids.len(), side);

        let mut done = true;
        for (&id, &pose) in ids.iter().zip(poses.iter()) {
            done &= self.planner.move_to(world, id, pose, now);
        }

        if !done {
            self.formation_reached_at = None;
            return;
        }
        let reached = *self.formation_reached_at.get_or_insert(now);
        if now - reached >= FORMATION_HOLD {
            self.formation = (self.formation + 1) % FORMATION_COUNT;
            self.formation_reached_at = None;
            log::info!("Entry formation {}", self.formation);
        }
    }

    fn random_robot(&mut self, world: &mut WorldModel, ids: &[RobotId], now: f64) {
        let team = self.team();
        for &id in ids {
            let reached = self
                .random_targets
                .get(&id)
                .is_none_or(|&target| self.planner.is_at(world, id, target));
            if reached {
                match self.random_legal_pose(world, id) {
                    Some(target) => {
                        self.random_targets.insert(id, target);
                    }
                    None => continue,
                }
            }
            if let Some(&target) = self.random_targets.get(&id) {
                self.planner.move_to(world, id, target, now);
            }
        }
        log::trace!("{} random targets for {}", self.random_targets.len(), team);
    }

    fn random_legal_pose(&mut self, world: &WorldModel, id: RobotId) -> Option<Pose> {
        let team = self.team();
        let margin = 2.0 * world.constants().robot.radius;
        let half_x = world.constants().half_x() - margin;
        let half_y = world.constants().half_y() - margin;
        let mover = Mover::new(team, id);
        let rng = self.planner.rng();
        for _ in 0..RANDOM_TRIES {
            let p = Point2::new(rng.gen_range(-half_x..=half_x), rng.gen_range(-half_y..=half_y));
            if world.is_pos_legal(p, team, id) && is_position_open(world, p, mover, margin) {
                return Some(Pose::from_point(p, rng.gen_range(-PI..PI)));
            }
        }
        None
    }

    fn full_game(&mut self, world: &mut WorldModel, ids: &[RobotId], now: f64) {
        let team = self.team();
        match world.referee_command() {
            Some(RefereeCommand::Halt) => {
                self.planner.halt(world);
            }
            Some(RefereeCommand::Stop)
            | Some(RefereeCommand::Goal(_))
            | Some(RefereeCommand::BallPlacement(_)) => {
                self.planner.stop_formation(world, ids, now);
            }
            Some(RefereeCommand::PrepareKickoff(t)) => {
                self.planner.kickoff(world, ids, t == team, now);
            }
            Some(RefereeCommand::PreparePenalty(t)) => {
                self.planner.penalty(world, ids, t == team, now);
            }
            Some(RefereeCommand::Timeout(_)) => {
                self.planner.timeout(world, ids, now);
            }
            Some(RefereeCommand::DirectFree(t)) | Some(RefereeCommand::IndirectFree(t))
                if t != team =>
            {
                self.defend(world, ids, now);
            }
            _ => self.normal_play(world, ids, now),
        }
    }

    /// Goalie plus a wall, no attacker.
    fn defend(&mut self, world: &mut WorldModel, ids: &[RobotId], now: f64) {
        let goalie = world.constants().planner.goalie_id;
        if ids.contains(&goalie) {
            self.planner.goalie(world, goalie);
        }
        let clearance = world.constants().planner.stop_ball_clearance
            + 2.0 * world.constants().robot.radius;
        let players = field_players(world, ids);
        self.planner.form_wall(world, &players, clearance, now);
    }

    /// Goalie, one attacker on the ball, a two-robot wall, supporters.
    fn normal_play(&mut self, world: &mut WorldModel, ids: &[RobotId], now: f64) {
        let team = self.team();
        let goalie = world.constants().planner.goalie_id;
        if ids.contains(&goalie) {
            self.planner.goalie(world, goalie);
        }

        let mut players = field_players(world, ids);
        let Some(ball) = world.ball_pos() else {
            return;
        };
        let distance_to = |world: &WorldModel, id: RobotId, p: Point2| {
            world
                .robot_pose(team, id)
                .map_or(f64::INFINITY, |pose| pose.xy().distance(&p))
        };
        players.sort_by(|&a, &b| {
            distance_to(world, a, ball).total_cmp(&distance_to(world, b, ball))
        });

        let Some((&attacker, rest)) = players.split_first() else {
            return;
        };
        self.planner.routines.retain(|&id, _| id == attacker);
        for &id in rest {
            let commands = world.commands_mut(team, id);
            commands.is_dribbling = false;
            commands.is_kicking = false;
            commands.is_charging = false;
        }
        self.planner.attacker(world, attacker, now);

        let own_goal = world.get_defense_goal(team);
        let mut rest = rest.to_vec();
        rest.sort_by(|&a, &b| {
            distance_to(world, a, own_goal).total_cmp(&distance_to(world, b, own_goal))
        });
        let wall_size = rest.len().min(2);
        let (wall, supporters) = rest.split_at(wall_size);
        self.planner
            .form_wall(world, wall, DEFENSE_WALL_DISTANCE, now);

        let mut taken: Vec<Point2> = vec![ball];
        for &id in supporters {
            if let Some(spot) = self.planner.supporter(world, id, &taken, now) {
                taken.push(spot);
            }
        }
    }
}

/// Robot ids excluding the goalie, ascending.
fn field_players(world: &WorldModel, ids: &[RobotId]) -> Vec<RobotId> {
    ids.iter().copied().filter(|&id| !world.is_goalie(id)).collect()
}

const FORMATION_COUNT: usize = 3;

/// Entry-video formations: circle, line, arrow.
fn formation(index: usize, n: usize, side: f64) -> Vec<Pose> {
    let mid = (n as f64 - 1.0) / 2.0;
    let forward = if side < 0.0 { 0.0 } else { PI };
    (0..n)
        .map(|k| {
            let offset = k as f64 - mid;
            match index % FORMATION_COUNT {
                0 => {
                    let a = TAU * k as f64 / n.max(1) as f64;
                    Pose::new(1500.0 * a.cos(), 1500.0 * a.sin(), a)
                }
                1 => Pose::new(side * 1000.0, offset * 400.0, forward),
                _ => Pose::new(side * (600.0 + offset.abs() * 400.0), offset * 400.0, forward),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    fn referee(world: &mut WorldModel, command: RefereeCommand) {
        let msg = crate::proto::SslReferee {
            packet_timestamp: 0,
            stage: 0,
            stage_time_left: None,
            command: command.to_i32(),
            command_counter: 1,
            command_timestamp: 0,
        };
        world.set_referee_message(msg.encode_to_vec());
    }

    fn six_robots() -> WorldModel {
        let mut w = WorldModel::default();
        for id in 0..6u8 {
            let pose = Pose::new(-3500.0 + id as f64 * 600.0, -2500.0, 0.0);
            w.push_robot(Team::Blue, id, 0.0, pose);
        }
        w.push_ball(0.0, Point2::new(0.0, 0.0));
        w
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!("UI".parse::<StrategyKind>().unwrap(), StrategyKind::Ui);
        assert_eq!(
            "full_game".parse::<StrategyKind>().unwrap(),
            StrategyKind::FullGame
        );
        assert!("chess".parse::<StrategyKind>().is_err());
        for kind in [
            StrategyKind::Ui,
            StrategyKind::GoalieTest,
            StrategyKind::AttackerTest,
            StrategyKind::DefenderTest,
            StrategyKind::EntryVideo,
            StrategyKind::RandomRobot,
            StrategyKind::FullGame,
        ] {
            assert_eq!(kind.as_str().parse::<StrategyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_halt_clears_commands() {
        let mut w = six_robots();
        let mut s = Strategy::new(StrategyKind::FullGame, Team::Blue, 1);
        s.tick(&mut w, 0.0);
        assert!(w.commands(Team::Blue, 1).is_some());

        referee(&mut w, RefereeCommand::Halt);
        s.tick(&mut w, 0.01);
        for id in 0..6u8 {
            let c = w.commands(Team::Blue, id).unwrap();
            assert!(c.waypoints.is_empty());
            assert!(!c.is_kicking && !c.is_dribbling && !c.is_charging);
        }
    }

    #[test]
    fn test_stop_lowers_speed_limit() {
        let mut w = six_robots();
        referee(&mut w, RefereeCommand::Stop);
        let mut s = Strategy::new(StrategyKind::FullGame, Team::Blue, 1);
        s.tick(&mut w, 0.0);
        for id in 0..6u8 {
            assert_eq!(w.commands(Team::Blue, id).unwrap().speed_limit, 450.0);
        }

        referee(&mut w, RefereeCommand::ForceStart);
        s.tick(&mut w, 0.01);
        for id in 0..6u8 {
            assert_eq!(w.commands(Team::Blue, id).unwrap().speed_limit, 600.0);
        }
    }

    #[test]
    fn test_normal_play_sends_closest_to_ball() {
        let mut w = six_robots();
        let mut s = Strategy::new(StrategyKind::FullGame, Team::Blue, 1);
        s.tick(&mut w, 0.0);
        // Robot 5 is closest to the ball and starts charging for a shot
        assert!(w.commands(Team::Blue, 5).unwrap().is_charging);
        assert!(!w.commands(Team::Blue, 1).unwrap().is_charging);
    }

    #[test]
    fn test_ui_drives_selected_robot() {
        let mut w = six_robots();
        w.ui_inputs.selected_robot = Some((Team::Blue, 2));
        w.ui_inputs.click_position = Some(Point2::new(-2300.0, 0.0));
        w.ui_inputs.dribble = true;
        let mut s = Strategy::new(StrategyKind::Ui, Team::Blue, 1);
        s.tick(&mut w, 0.0);
        let c = w.commands(Team::Blue, 2).unwrap();
        assert_eq!(c.destination().unwrap().pose.xy(), Point2::new(-2300.0, 0.0));
        assert!(c.is_dribbling);
        assert!(w.waypoints(Team::Blue, 3).is_empty());
    }

    #[test]
    fn test_random_robot_targets_are_legal() {
        let mut w = six_robots();
        let mut s = Strategy::new(StrategyKind::RandomRobot, Team::Blue, 99);
        s.tick(&mut w, 0.0);
        assert_eq!(s.random_targets.len(), 6);
        for (&id, target) in &s.random_targets {
            assert!(w.is_pos_legal(target.xy(), Team::Blue, id));
        }
    }

    #[test]
    fn test_formations_have_one_pose_per_robot() {
        for index in 0..FORMATION_COUNT {
            let poses = formation(index, 5, -1.0);
            assert_eq!(poses.len(), 5);
            for (i, a) in poses.iter().enumerate() {
                for b in &poses[i + 1..] {
                    assert!(a.distance(b) > 270.0);
                }
            }
        }
    }

    #[test]
    fn test_entry_video_advances_after_hold() {
        let mut w = WorldModel::default();
        let poses = formation(0, 2, -1.0);
        for (id, pose) in poses.iter().enumerate() {
            w.push_robot(Team::Blue, id as u8, 0.0, *pose);
        }
        let mut s = Strategy::new(StrategyKind::EntryVideo, Team::Blue, 1);
        s.tick(&mut w, 0.0);
        assert_eq!(s.formation_index(), 0);
        s.tick(&mut w, 2.5);
        assert_eq!(s.formation_index(), 1);
    }
}
