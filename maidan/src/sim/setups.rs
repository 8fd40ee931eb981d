//! Initial robot and ball placements for simulator sessions.

use std::f64::consts::{FRAC_PI_4, PI};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{Point2, Pose, RobotId, Team};
use crate::world::WorldModel;

/// Robots per team in a full setup.
const TEAM_SIZE: RobotId = 6;
/// Launch velocity of the ball in the moving-ball setup (mm/s).
const MOVING_BALL_VELOCITY: Point2 = Point2::new(-1800.0, 600.0);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialSetup {
    /// Six robots per team in their own halves, ball on the center spot
    #[default]
    FullTeams,
    /// Full teams with the ball already rolling
    MovingBall,
    /// Our team lined up on the touchline, no opponents
    EntryVideo,
    /// One robot of ours and the ball, nothing else
    ClearField,
    /// One robot of ours boxed in by a ring of opponents
    SurroundedByOpponents,
}

impl InitialSetup {
    pub fn as_str(self) -> &'static str {
        match self {
            InitialSetup::FullTeams => "full_teams",
            InitialSetup::MovingBall => "moving_ball",
            InitialSetup::EntryVideo => "entry_video",
            InitialSetup::ClearField => "clear_field",
            InitialSetup::SurroundedByOpponents => "surrounded_by_opponents",
        }
    }

    /// Replace all positions in `world` with this setup, stamped `now`.
    ///
    /// Commands and status are left alone; `team` is the side the
    /// single-team setups place.
    pub fn apply(self, world: &mut WorldModel, team: Team, now: f64) {
        world.ball_positions.clear();
        world.blue_robot_positions.clear();
        world.yellow_robot_positions.clear();

        let radius = world.constants().robot.radius;
        match self {
            InitialSetup::FullTeams => {
                place_team(world, Team::Blue, now);
                place_team(world, Team::Yellow, now);
                world.push_ball(now, Point2::ZERO);
            }
            InitialSetup::MovingBall => {
                place_team(world, Team::Blue, now);
                place_team(world, Team::Yellow, now);
                world.set_ball_state(now, Point2::ZERO, MOVING_BALL_VELOCITY);
            }
            InitialSetup::EntryVideo => {
                let side = world.defense_side_sign(team);
                let y = -(world.constants().half_y() - 2.0 * radius);
                for id in 0..TEAM_SIZE {
                    let x = side * (500.0 + id as f64 * 500.0);
                    world.push_robot(team, id, now, Pose::new(x, y, PI / 2.0));
                }
                world.push_ball(now, Point2::ZERO);
            }
            InitialSetup::ClearField => {
                let side = world.defense_side_sign(team);
                let facing = if side < 0.0 { 0.0 } else { PI };
                world.push_robot(team, 1, now, Pose::new(side * 3000.0, 0.0, facing));
                world.push_ball(now, Point2::ZERO);
            }
            InitialSetup::SurroundedByOpponents => {
                world.push_robot(team, 1, now, Pose::new(0.0, 0.0, 0.0));
                // Neighbours just touch, leaving no gap a robot fits through
                let ring = radius / (PI / 8.0).sin() + 1.0;
                for k in 0..8 {
                    let a = k as f64 * FRAC_PI_4;
                    let pose = Pose::new(ring * a.cos(), ring * a.sin(), a + PI);
                    world.push_robot(team.other(), k, now, pose);
                }
                world.push_ball(now, Point2::new(2000.0, 0.0));
            }
        }
        log::info!("Applied initial setup {} for {}", self, team);
    }
}

/// Goalie on the goal line, the rest spread over the own half.
fn place_team(world: &mut WorldModel, team: Team, now: f64) {
    let side = world.defense_side_sign(team);
    let half_x = world.constants().half_x();
    let radius = world.constants().robot.radius;
    let goalie = world.constants().planner.goalie_id;
    let facing = if side < 0.0 { 0.0 } else { PI };

    let spots = [
        Point2::new(1000.0, 0.0),
        Point2::new(1500.0, 1200.0),
        Point2::new(1500.0, -1200.0),
        Point2::new(2500.0, 600.0),
        Point2::new(2500.0, -600.0),
    ];
    let mut spot_iter = spots.iter();
    for id in 0..TEAM_SIZE {
        let pos = if id == goalie {
            Point2::new(half_x - 2.0 * radius, 0.0)
        } else if let Some(&spot) = spot_iter.next() {
            spot
        } else {
            continue;
        };
        world.push_robot(team, id, now, Pose::new(side * pos.x, pos.y, facing));
    }
}

impl fmt::Display for InitialSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitialSetup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full_teams" => Ok(InitialSetup::FullTeams),
            "moving_ball" => Ok(InitialSetup::MovingBall),
            "entry_video" => Ok(InitialSetup::EntryVideo),
            "clear_field" => Ok(InitialSetup::ClearField),
            "surrounded_by_opponents" => Ok(InitialSetup::SurroundedByOpponents),
            other => Err(format!("unknown initial setup '{}'", other)),
        }
    }
}
