//! The world model snapshot and its field-ownership merge.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::commands::{Commands, Waypoint};
use super::history::History;
use super::referee::{RefereeCommand, RefereeMessage};
use super::status::Status;
use super::ui::UiInputs;
use crate::config::Constants;
use crate::core::{Point2, Pose, RobotId, Team};

/// One ownable slice of the world model.
///
/// Every field has exactly one owning provider; the coordinator copies a
/// provider's owned fields from its returned snapshot into the
/// authoritative one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorldField {
    BallPositions,
    BlueRobotPositions,
    YellowRobotPositions,
    BlueRobotCommands,
    YellowRobotCommands,
    BlueRobotStatus,
    YellowRobotStatus,
    RefereeMessage,
    DefenseSide,
    GameClock,
    UiInputs,
}

impl WorldField {
    pub const POSITIONS: &'static [WorldField] = &[
        WorldField::BallPositions,
        WorldField::BlueRobotPositions,
        WorldField::YellowRobotPositions,
    ];
    pub const COMMANDS: &'static [WorldField] = &[
        WorldField::BlueRobotCommands,
        WorldField::YellowRobotCommands,
    ];
    pub const STATUS: &'static [WorldField] =
        &[WorldField::BlueRobotStatus, WorldField::YellowRobotStatus];
    pub const REFEREE: &'static [WorldField] = &[WorldField::RefereeMessage];
    pub const COORDINATOR: &'static [WorldField] = &[
        WorldField::DefenseSide,
        WorldField::GameClock,
        WorldField::UiInputs,
    ];
}

pub type RobotHistories = BTreeMap<RobotId, History<Pose>>;

/// Shared game state. Cloned by value between the coordinator and each
/// provider.
#[derive(Clone, Debug)]
pub struct WorldModel {
    constants: Arc<Constants>,
    pub ball_positions: History<Point2>,
    pub blue_robot_positions: RobotHistories,
    pub yellow_robot_positions: RobotHistories,
    pub blue_robot_commands: BTreeMap<RobotId, Commands>,
    pub yellow_robot_commands: BTreeMap<RobotId, Commands>,
    pub blue_robot_status: BTreeMap<RobotId, Status>,
    pub yellow_robot_status: BTreeMap<RobotId, Status>,
    pub referee: RefereeMessage,
    pub is_blue_defense_side_left: bool,
    /// Seconds since the coordinator started
    pub game_clock: Option<f64>,
    pub ui_inputs: UiInputs,
}

impl Default for WorldModel {
    fn default() -> Self {
        Self::new(Arc::new(Constants::default()))
    }
}

impl WorldModel {
    pub fn new(constants: Arc<Constants>) -> Self {
        Self {
            ball_positions: History::new(constants.ball.history_depth),
            blue_robot_positions: BTreeMap::new(),
            yellow_robot_positions: BTreeMap::new(),
            blue_robot_commands: BTreeMap::new(),
            yellow_robot_commands: BTreeMap::new(),
            blue_robot_status: BTreeMap::new(),
            yellow_robot_status: BTreeMap::new(),
            referee: RefereeMessage::default(),
            is_blue_defense_side_left: true,
            game_clock: None,
            ui_inputs: UiInputs::default(),
            constants,
        }
    }

    #[inline]
    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn constants_arc(&self) -> Arc<Constants> {
        Arc::clone(&self.constants)
    }

    // ========================================================================
    // Ownership merge
    // ========================================================================

    /// Overwrite `fields` in `self` with the values held by `other`.
    pub fn copy_fields_from(&mut self, other: &WorldModel, fields: &[WorldField]) {
        for field in fields {
            match field {
                WorldField::BallPositions => self.ball_positions = other.ball_positions.clone(),
                WorldField::BlueRobotPositions => {
                    self.blue_robot_positions = other.blue_robot_positions.clone()
                }
                WorldField::YellowRobotPositions => {
                    self.yellow_robot_positions = other.yellow_robot_positions.clone()
                }
                WorldField::BlueRobotCommands => {
                    self.blue_robot_commands = other.blue_robot_commands.clone()
                }
                WorldField::YellowRobotCommands => {
                    self.yellow_robot_commands = other.yellow_robot_commands.clone()
                }
                WorldField::BlueRobotStatus => {
                    self.blue_robot_status = other.blue_robot_status.clone()
                }
                WorldField::YellowRobotStatus => {
                    self.yellow_robot_status = other.yellow_robot_status.clone()
                }
                WorldField::RefereeMessage => self.referee = other.referee.clone(),
                WorldField::DefenseSide => {
                    self.is_blue_defense_side_left = other.is_blue_defense_side_left
                }
                WorldField::GameClock => self.game_clock = other.game_clock,
                WorldField::UiInputs => self.ui_inputs = other.ui_inputs.clone(),
            }
        }
    }

    /// Take a fresh snapshot while keeping our own `owned` fields.
    ///
    /// The incoming snapshot becomes the new state; the owned fields of the
    /// previous state are restored on top of it.
    pub fn absorb_snapshot(&mut self, snapshot: WorldModel, owned: &[WorldField]) {
        let previous = std::mem::replace(self, snapshot);
        self.copy_fields_from(&previous, owned);
    }

    // ========================================================================
    // Team-indexed access
    // ========================================================================

    pub fn robot_positions(&self, team: Team) -> &RobotHistories {
        match team {
            Team::Blue => &self.blue_robot_positions,
            Team::Yellow => &self.yellow_robot_positions,
        }
    }

    pub fn robot_positions_mut(&mut self, team: Team) -> &mut RobotHistories {
        match team {
            Team::Blue => &mut self.blue_robot_positions,
            Team::Yellow => &mut self.yellow_robot_positions,
        }
    }

    pub fn robot_commands(&self, team: Team) -> &BTreeMap<RobotId, Commands> {
        match team {
            Team::Blue => &self.blue_robot_commands,
            Team::Yellow => &self.yellow_robot_commands,
        }
    }

    pub fn robot_commands_mut(&mut self, team: Team) -> &mut BTreeMap<RobotId, Commands> {
        match team {
            Team::Blue => &mut self.blue_robot_commands,
            Team::Yellow => &mut self.yellow_robot_commands,
        }
    }

    pub fn robot_status(&self, team: Team) -> &BTreeMap<RobotId, Status> {
        match team {
            Team::Blue => &self.blue_robot_status,
            Team::Yellow => &self.yellow_robot_status,
        }
    }

    pub fn robot_status_mut(&mut self, team: Team) -> &mut BTreeMap<RobotId, Status> {
        match team {
            Team::Blue => &mut self.blue_robot_status,
            Team::Yellow => &mut self.yellow_robot_status,
        }
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Record a ball observation.
    pub fn push_ball(&mut self, t: f64, pos: Point2) {
        self.ball_positions.push(t, pos);
    }

    /// Record a robot observation, creating its history on first sight.
    pub fn push_robot(&mut self, team: Team, id: RobotId, t: f64, pose: Pose) {
        let depth = self.constants.robot.history_depth;
        self.robot_positions_mut(team)
            .entry(id)
            .or_insert_with(|| History::new(depth))
            .push(t, pose);
    }

    /// Replace the ball history with samples that reproduce `pos` and
    /// `velocity` at time `t` under the friction model.
    pub fn set_ball_state(&mut self, t: f64, pos: Point2, velocity: Point2) {
        // Twice the estimator's minimum spacing, so rounding never hides
        // the older sample from it
        let dt = 2.0 * self.constants.ball.min_time_interval;
        let decel = self.constants.ball.deceleration;
        // Average velocity over [t - dt, t] is the velocity at the midpoint,
        // which is faster than at t by decel * dt / 2.
        let v_mid = match velocity.unit() {
            Some(u) => velocity + u * (decel * dt / 2.0),
            None => Point2::ZERO,
        };
        self.ball_positions.clear();
        self.ball_positions.push(t - dt, pos - v_mid * dt);
        self.ball_positions.push(t, pos);
    }

    pub fn ball_pos(&self) -> Option<Point2> {
        self.ball_positions.latest().map(|s| s.value)
    }

    /// Seconds since the newest ball sample.
    pub fn ball_sample_age(&self, now: f64) -> Option<f64> {
        self.ball_positions.latest().map(|s| now - s.t)
    }

    pub fn is_ball_lost(&self, now: f64) -> bool {
        self.ball_sample_age(now)
            .is_none_or(|age| age > self.constants.vision.ball_lost_time)
    }

    pub fn robot_pose(&self, team: Team, id: RobotId) -> Option<Pose> {
        self.robot_positions(team)
            .get(&id)
            .and_then(|h| h.latest())
            .map(|s| s.value)
    }

    /// Pose whose sample time is closest to `t`.
    pub fn robot_pose_at(&self, team: Team, id: RobotId, t: f64) -> Option<Pose> {
        self.robot_positions(team)
            .get(&id)
            .and_then(|h| h.nearest(t))
            .map(|s| s.value)
    }

    pub fn robot_sample_age(&self, team: Team, id: RobotId, now: f64) -> Option<f64> {
        self.robot_positions(team)
            .get(&id)
            .and_then(|h| h.latest())
            .map(|s| now - s.t)
    }

    /// Robots with at least one pose sample, ascending by id.
    pub fn robot_ids(&self, team: Team) -> Vec<RobotId> {
        self.robot_positions(team)
            .iter()
            .filter(|(_, h)| !h.is_empty())
            .map(|(&id, _)| id)
            .collect()
    }

    /// Latest pose of every tracked robot on `team`.
    pub fn robots(&self, team: Team) -> impl Iterator<Item = (RobotId, Pose)> + '_ {
        self.robot_positions(team)
            .iter()
            .filter_map(|(&id, h)| h.latest().map(|s| (id, s.value)))
    }

    /// Latest pose of every tracked robot on both teams.
    pub fn all_robots(&self) -> impl Iterator<Item = (Team, RobotId, Pose)> + '_ {
        self.robots(Team::Blue)
            .map(|(id, p)| (Team::Blue, id, p))
            .chain(self.robots(Team::Yellow).map(|(id, p)| (Team::Yellow, id, p)))
    }

    /// Unseen (or never seen) for longer than the lost threshold.
    pub fn is_robot_lost(&self, team: Team, id: RobotId, now: f64) -> bool {
        self.robot_sample_age(team, id, now)
            .is_none_or(|age| age > self.constants.vision.robot_lost_time)
    }

    /// Drop robots unseen for longer than the remove threshold.
    pub fn evict_stale_robots(&mut self, now: f64) -> Vec<(Team, RobotId)> {
        let remove_time = self.constants.vision.robot_remove_time;
        let mut evicted = Vec::new();
        for team in [Team::Blue, Team::Yellow] {
            self.robot_positions_mut(team).retain(|&id, h| {
                let keep = h.latest().is_some_and(|s| now - s.t <= remove_time);
                if !keep {
                    evicted.push((team, id));
                }
                keep
            });
        }
        for (team, id) in &evicted {
            log::info!("Evicting {} robot {} (not seen for {}s)", team, id, remove_time);
        }
        evicted
    }

    /// Drop commands of robots that no longer have positions.
    pub fn prune_commands(&mut self) -> usize {
        let mut removed = 0;
        for team in [Team::Blue, Team::Yellow] {
            let tracked: Vec<RobotId> = self.robot_positions(team).keys().copied().collect();
            let commands = self.robot_commands_mut(team);
            let before = commands.len();
            commands.retain(|id, _| tracked.contains(id));
            removed += before - commands.len();
        }
        removed
    }

    // ========================================================================
    // Commands and status
    // ========================================================================

    pub fn commands(&self, team: Team, id: RobotId) -> Option<&Commands> {
        self.robot_commands(team).get(&id)
    }

    /// Commands for a robot, created with the default speed limit.
    pub fn commands_mut(&mut self, team: Team, id: RobotId) -> &mut Commands {
        let limit = self.constants.robot.max_speed;
        self.robot_commands_mut(team)
            .entry(id)
            .or_insert_with(|| Commands::new(limit))
    }

    pub fn set_waypoints(&mut self, team: Team, id: RobotId, waypoints: Vec<Waypoint>) {
        self.commands_mut(team, id).set_waypoints(waypoints);
    }

    pub fn waypoints(&self, team: Team, id: RobotId) -> &[Waypoint] {
        self.commands(team, id)
            .map_or(&[][..], |c| c.waypoints.as_slice())
    }

    pub fn status(&self, team: Team, id: RobotId) -> Status {
        self.robot_status(team).get(&id).copied().unwrap_or_default()
    }

    pub fn status_mut(&mut self, team: Team, id: RobotId) -> &mut Status {
        self.robot_status_mut(team).entry(id).or_default()
    }

    // ========================================================================
    // Referee
    // ========================================================================

    pub fn set_referee_message(&mut self, raw: Vec<u8>) {
        self.referee = RefereeMessage::from_payload(raw);
    }

    pub fn referee_command(&self) -> Option<RefereeCommand> {
        self.referee.command
    }
}
