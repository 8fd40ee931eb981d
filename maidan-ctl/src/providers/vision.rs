//! Vision provider: SSL-Vision detections into the position rings

use super::{Provider, ProviderKind};
use crate::error::Result;
use crate::net::UdpReceiver;
use maidan::core::{MAX_ROBOT_ID, clock};
use maidan::proto::{SslDetectionFrame, SslDetectionRobot, decode_wrapper};
use maidan::{Point2, Pose, RobotId, Team, WorldModel};

pub struct VisionProvider {
    address: String,
    receiver: Option<UdpReceiver>,
    frames: u64,
    decode_errors: u64,
}

impl VisionProvider {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            receiver: None,
            frames: 0,
            decode_errors: 0,
        }
    }
}

impl Provider for VisionProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Vision
    }

    fn pre_run(&mut self, _world: &mut WorldModel) -> Result<()> {
        self.receiver = Some(UdpReceiver::bind(&self.address)?);
        Ok(())
    }

    fn run(&mut self, world: &mut WorldModel) -> Result<()> {
        let Some(receiver) = self.receiver.as_mut() else {
            return Ok(());
        };

        if let Some(bytes) = receiver.recv()? {
            match decode_detection(bytes) {
                Ok(Some(detection)) => {
                    apply_detection(world, &detection, clock::now());
                    self.frames += 1;
                }
                // Geometry-only packet
                Ok(None) => {}
                Err(e) => {
                    self.decode_errors += 1;
                    log::debug!("Dropped vision datagram: {}", e);
                }
            }
        }

        for (team, id) in world.evict_stale_robots(clock::now()) {
            log::info!("Robot {} {} not seen for too long, removed", team, id);
        }
        Ok(())
    }

    fn post_run(&mut self, _world: &mut WorldModel) {
        log::info!(
            "Vision received {} detection frames ({} undecodable datagrams)",
            self.frames,
            self.decode_errors
        );
        self.receiver = None;
    }
}

/// Detection part of a vision datagram, if it carries one.
pub fn decode_detection(bytes: &[u8]) -> Result<Option<SslDetectionFrame>> {
    Ok(decode_wrapper(bytes)?.detection)
}

/// Append one detection frame to the position rings, stamped `now`.
///
/// Detections are already in field millimetres; only the first ball of
/// the frame is used. Robots without an id, or with one the radio cannot
/// address, are ignored.
pub fn apply_detection(world: &mut WorldModel, frame: &SslDetectionFrame, now: f64) {
    if let Some(ball) = frame.balls.first() {
        world.push_ball(now, Point2::new(f64::from(ball.x), f64::from(ball.y)));
    }
    for (team, robots) in [
        (Team::Blue, &frame.robots_blue),
        (Team::Yellow, &frame.robots_yellow),
    ] {
        for robot in robots {
            if let Some((id, pose)) = robot_pose(robot) {
                world.push_robot(team, id, now, pose);
            }
        }
    }
}

fn robot_pose(robot: &SslDetectionRobot) -> Option<(RobotId, Pose)> {
    let id = RobotId::try_from(robot.robot_id?).ok()?;
    if id > MAX_ROBOT_ID {
        return None;
    }
    let w = f64::from(robot.orientation.unwrap_or(0.0));
    Some((id, Pose::new(f64::from(robot.x), f64::from(robot.y), w)))
}
