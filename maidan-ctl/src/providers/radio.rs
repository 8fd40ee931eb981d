//! Radio provider: waypoints to velocities to team frames
//!
//! Each tick derives a robot-local velocity for every commanded robot of our
//! team, encodes one 26-byte frame, writes it to the transport, advances the
//! kicker model and then sleeps out the rest of the message delay.

use super::{Provider, ProviderKind};
use crate::error::{Error, Result};
use crate::transport::RadioTransport;
use maidan::codec::{
    MAX_W, MAX_X, MAX_Y, MIN_W, MIN_X, MIN_Y, ROBOTS_PER_FRAME, RobotCommand, TeamFrame,
};
use maidan::core::{MAX_ROBOT_ID, clock};
use maidan::world::Velocity;
use maidan::{RobotId, Team, WorldModel};
use std::thread;
use std::time::Duration;

/// Linear clamp margin inside the codec range (mm/s).
const LINEAR_MARGIN: f64 = 1.0;
/// Angular clamp margin inside the codec range (rad/s).
const ANGULAR_MARGIN: f64 = 0.01;

pub struct RadioProvider {
    team: Team,
    transport: Box<dyn RadioTransport>,
    frame: TeamFrame,
    last_tick: Option<f64>,
    /// Inside a run of frames that needed clamping
    clamping: bool,
    frames_sent: u64,
}

impl RadioProvider {
    pub fn new(team: Team, transport: Box<dyn RadioTransport>) -> Self {
        Self {
            team,
            transport,
            frame: TeamFrame::new(),
            last_tick: None,
            clamping: false,
            frames_sent: 0,
        }
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Build and send one frame for the world at `now`.
    pub fn tick(&mut self, world: &mut WorldModel, now: f64) -> Result<()> {
        let dt = self.last_tick.map_or(0.0, |t| (now - t).max(0.0));
        self.last_tick = Some(now);

        let ids = self.frame_ids(world);
        let mut commands = Vec::with_capacity(ids.len());
        let mut clamped = false;
        for &id in &ids {
            let velocity = self.velocity_for(world, id, now);
            let (velocity, was_clamped) = clamp_to_codec(velocity);
            clamped |= was_clamped;

            let Some(robot) = world.commands(self.team, id) else {
                continue;
            };
            commands.push(RobotCommand {
                id,
                is_dribbling: robot.is_dribbling,
                is_charging: robot.is_charging,
                is_kicking: robot.is_kicking,
                x: velocity.x,
                y: velocity.y,
                w: velocity.w,
            });
        }
        self.note_clamping(clamped);

        match self.frame.encode(&commands) {
            Ok(()) => self.write_frame()?,
            Err(e) => log::error!("Frame not sent: {}", e),
        }

        let kicker = world.constants().kicker.clone();
        for command in &commands {
            world
                .status_mut(self.team, command.id)
                .advance(dt, command.is_charging, command.is_kicking, &kicker);
        }
        Ok(())
    }

    /// The first addressable robots with commands, in id order.
    fn frame_ids(&self, world: &WorldModel) -> Vec<RobotId> {
        let mut ids = Vec::with_capacity(ROBOTS_PER_FRAME);
        for &id in world.robot_commands(self.team).keys() {
            if id > MAX_ROBOT_ID {
                log::debug!("Skipping robot {} {}: id not addressable", self.team, id);
                continue;
            }
            if ids.len() == ROBOTS_PER_FRAME {
                log::debug!("Frame full, robot {} {} skipped", self.team, id);
                continue;
            }
            ids.push(id);
        }
        ids
    }

    /// Lost robots stop where they are; their waypoints are kept.
    fn velocity_for(&self, world: &mut WorldModel, id: RobotId, now: f64) -> Velocity {
        let pose = if world.is_robot_lost(self.team, id, now) {
            None
        } else {
            world.robot_pose(self.team, id)
        };
        let constants = world.constants_arc();
        let robot = world.commands_mut(self.team, id);
        match pose {
            Some(pose) => robot.derive_speeds(pose, &constants),
            None => {
                robot.derived_xyw = Velocity::ZERO;
                Velocity::ZERO
            }
        }
    }

    fn note_clamping(&mut self, clamped: bool) {
        if clamped && !self.clamping {
            log::warn!(
                "Velocity outside the radio range for {}, clamping until it recovers",
                self.team
            );
        } else if !clamped && self.clamping {
            log::info!("Velocities back inside the radio range for {}", self.team);
        }
        self.clamping = clamped;
    }

    fn write_frame(&mut self) -> Result<()> {
        match self.transport.write_frame(self.frame.as_bytes()) {
            Ok(()) => {
                self.frames_sent += 1;
                Ok(())
            }
            Err(Error::Transport(e)) => {
                log::debug!("Radio write dropped: {}", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Clamp `v` just inside the open codec ranges.
fn clamp_to_codec(v: Velocity) -> (Velocity, bool) {
    let clamped = Velocity {
        x: v.x.clamp(MIN_X + LINEAR_MARGIN, MAX_X - LINEAR_MARGIN),
        y: v.y.clamp(MIN_Y + LINEAR_MARGIN, MAX_Y - LINEAR_MARGIN),
        w: v.w.clamp(MIN_W + ANGULAR_MARGIN, MAX_W - ANGULAR_MARGIN),
    };
    let changed = clamped != v;
    (clamped, changed)
}

impl Provider for RadioProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Radio
    }

    fn pre_run(&mut self, _world: &mut WorldModel) -> Result<()> {
        log::info!(
            "Radio for {} team on {}",
            self.team,
            self.transport.describe()
        );
        Ok(())
    }

    fn run(&mut self, world: &mut WorldModel) -> Result<()> {
        let sent_at = clock::now();
        self.tick(world, sent_at)?;

        let delay = world.constants().control.message_delay;
        let remaining = sent_at + delay - clock::now();
        if remaining > 0.0 {
            thread::sleep(Duration::from_secs_f64(remaining));
        }
        Ok(())
    }

    fn post_run(&mut self, world: &mut WorldModel) {
        // Leave the robots standing still
        let stopped: Vec<RobotCommand> = self
            .frame_ids(world)
            .into_iter()
            .map(RobotCommand::stopped)
            .collect();
        if self.frame.encode(&stopped).is_ok() {
            if let Err(e) = self.write_frame() {
                log::warn!("Final stop frame not sent: {}", e);
            }
        }
        if let Err(e) = self.transport.flush() {
            log::warn!("Radio flush failed: {}", e);
        }
        log::info!("Radio sent {} frames", self.frames_sent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use maidan::codec::decode_team;
    use maidan::world::Waypoint;
    use maidan::Pose;

    fn radio() -> (RadioProvider, MockTransport) {
        let mock = MockTransport::new();
        (RadioProvider::new(Team::Blue, Box::new(mock.clone())), mock)
    }

    #[test]
    fn test_clamp_to_codec() {
        let (v, changed) = clamp_to_codec(Velocity {
            x: 5000.0,
            y: -5000.0,
            w: 100.0,
        });
        assert!(changed);
        assert!(v.x < MAX_X && v.y > MIN_Y && v.w < MAX_W);

        let inside = Velocity {
            x: 10.0,
            y: 0.0,
            w: -1.0,
        };
        assert_eq!(clamp_to_codec(inside), (inside, false));
    }

    #[test]
    fn test_lost_robot_gets_zero_velocity() {
        let (mut radio, mock) = radio();
        let mut world = WorldModel::default();
        world.push_robot(Team::Blue, 1, 0.0, Pose::new(0.0, 0.0, 0.0));
        world.set_waypoints(
            Team::Blue,
            1,
            vec![Waypoint::new(Pose::new(1000.0, 0.0, 0.0))],
        );

        radio.tick(&mut world, 1.0).unwrap();

        let sent = decode_team(&mock.last_frame().unwrap()).unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!((sent[0].x, sent[0].y, sent[0].w), (0.0, 0.0, 0.0));
        // Waypoints survive the loss
        assert_eq!(world.waypoints(Team::Blue, 1).len(), 1);
    }

    #[test]
    fn test_only_our_team_and_six_robots() {
        let (mut radio, mock) = radio();
        let mut world = WorldModel::default();
        for id in 0..8 {
            world.push_robot(Team::Blue, id, 0.0, Pose::new(id as f64 * 300.0, 0.0, 0.0));
            world.commands_mut(Team::Blue, id);
        }
        world.commands_mut(Team::Yellow, 2).is_kicking = true;

        radio.tick(&mut world, 0.01).unwrap();

        let sent = decode_team(&mock.last_frame().unwrap()).unwrap();
        let ids: Vec<RobotId> = sent.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
        assert!(sent.iter().all(|c| !c.is_kicking));
    }

    #[test]
    fn test_moving_robot_and_charge() {
        let (mut radio, mock) = radio();
        let mut world = WorldModel::default();
        world.push_robot(Team::Blue, 3, 0.0, Pose::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
        world.set_waypoints(Team::Blue, 3, vec![Waypoint::new(Pose::new(
            0.0,
            2000.0,
            std::f64::consts::FRAC_PI_2,
        ))]);
        world.commands_mut(Team::Blue, 3).is_charging = true;

        radio.tick(&mut world, 0.0).unwrap();
        radio.tick(&mut world, 0.1).unwrap();

        let sent = decode_team(&mock.last_frame().unwrap()).unwrap();
        // Facing +y, the goal is straight ahead
        assert!(sent[0].y > 0.0);
        assert!(sent[0].x.abs() <= 10.0);
        assert!(sent[0].is_charging);

        let charge = world.status(Team::Blue, 3).charge_level;
        let rate = world.constants().kicker.charge_rate;
        assert!((charge - rate * 0.1).abs() < 1e-9);
        assert_eq!(radio.frames_sent(), 2);
    }

    #[test]
    fn test_kicking_discharges() {
        let (mut radio, _mock) = radio();
        let mut world = WorldModel::default();
        world.push_robot(Team::Blue, 0, 0.0, Pose::new(0.0, 0.0, 0.0));
        world.status_mut(Team::Blue, 0).charge_level = 3000.0;
        world.commands_mut(Team::Blue, 0).is_kicking = true;

        radio.tick(&mut world, 0.05).unwrap();
        assert_eq!(world.status(Team::Blue, 0).charge_level, 0.0);
    }

    #[test]
    fn test_transport_failure_is_swallowed() {
        let (mut radio, mock) = radio();
        mock.set_fail_writes(true);
        let mut world = WorldModel::default();
        world.push_robot(Team::Blue, 0, 0.0, Pose::new(0.0, 0.0, 0.0));
        world.commands_mut(Team::Blue, 0);

        assert!(radio.tick(&mut world, 0.0).is_ok());
        assert_eq!(radio.frames_sent(), 0);
    }

    #[test]
    fn test_clamping_episode() {
        let (mut radio, _mock) = radio();
        radio.note_clamping(true);
        assert!(radio.clamping);
        radio.note_clamping(true);
        assert!(radio.clamping);
        radio.note_clamping(false);
        assert!(!radio.clamping);
    }
}
