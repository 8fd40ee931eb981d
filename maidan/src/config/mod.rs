//! Field geometry and physics constants.
//!
//! Every constant the core uses lives in one immutable [`Constants`] value
//! that is shared (as `Arc<Constants>`) by the world model and everything
//! that reads it. Any section or key may be omitted from TOML.
//!
//! ## Example TOML
//!
//! ```toml
//! [field]
//! x_length = 9000.0
//! y_length = 6000.0
//!
//! [robot]
//! max_speed = 600.0     # mm/s
//!
//! [ball]
//! deceleration = 350.0  # mm/s^2
//!
//! [planner]
//! rrt_interval = 3.0    # seconds between forced replans
//! random_seed = 42      # 0 = entropy
//! ```

mod defaults;

use crate::core::RobotId;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All constants of the control core.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constants {
    pub field: FieldSection,
    pub robot: RobotSection,
    pub ball: BallSection,
    pub vision: VisionSection,
    pub control: ControlSection,
    pub kicker: KickerSection,
    pub planner: PlannerSection,
}

/// Field geometry (mm). Origin at the center spot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSection {
    #[serde(default = "defaults::field_x_length")]
    pub x_length: f64,
    #[serde(default = "defaults::field_y_length")]
    pub y_length: f64,
    #[serde(default = "defaults::goal_width")]
    pub goal_width: f64,
    #[serde(default = "defaults::center_circle_radius")]
    pub center_circle_radius: f64,
    #[serde(default = "defaults::defense_area_x_length")]
    pub defense_area_x_length: f64,
    #[serde(default = "defaults::defense_area_y_length")]
    pub defense_area_y_length: f64,
}

impl Default for FieldSection {
    fn default() -> Self {
        Self {
            x_length: defaults::field_x_length(),
            y_length: defaults::field_y_length(),
            goal_width: defaults::goal_width(),
            center_circle_radius: defaults::center_circle_radius(),
            defense_area_x_length: defaults::defense_area_x_length(),
            defense_area_y_length: defaults::defense_area_y_length(),
        }
    }
}

/// Robot body and drive limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotSection {
    /// Body radius (mm)
    #[serde(default = "defaults::robot_radius")]
    pub radius: f64,
    /// Distance from center to the flat dribbler face (mm)
    #[serde(default = "defaults::robot_dribbler_radius")]
    pub dribbler_radius: f64,
    /// Default linear speed limit (mm/s)
    #[serde(default = "defaults::robot_max_speed")]
    pub max_speed: f64,
    /// Angular speed limit (rad/s)
    #[serde(default = "defaults::robot_max_w")]
    pub max_w: f64,
    /// Pose samples kept per robot
    #[serde(default = "defaults::robot_history_depth")]
    pub history_depth: usize,
}

impl Default for RobotSection {
    fn default() -> Self {
        Self {
            radius: defaults::robot_radius(),
            dribbler_radius: defaults::robot_dribbler_radius(),
            max_speed: defaults::robot_max_speed(),
            max_w: defaults::robot_max_w(),
            history_depth: defaults::robot_history_depth(),
        }
    }
}

impl RobotSection {
    /// Half-angle of the flat front face seen from the robot center.
    pub fn front_angle(&self) -> f64 {
        (self.dribbler_radius / self.radius).acos()
    }
}

/// Ball size, friction and dribbling thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BallSection {
    #[serde(default = "defaults::ball_radius")]
    pub radius: f64,
    /// Rolling friction deceleration (mm/s²)
    #[serde(default = "defaults::ball_deceleration")]
    pub deceleration: f64,
    #[serde(default = "defaults::ball_history_depth")]
    pub history_depth: usize,
    /// Minimum sample spacing used for velocity estimation (s)
    #[serde(default = "defaults::min_time_interval")]
    pub min_time_interval: f64,
    #[serde(default = "defaults::dribble_zone_radius")]
    pub dribble_zone_radius: f64,
    /// Extra distance beyond the robot radius the ball may sit at
    #[serde(default = "defaults::dribble_center_margin")]
    pub dribble_center_margin: f64,
    /// How long the ball must stay in the dribbler to count as captured (s)
    #[serde(default = "defaults::dribble_hold_time")]
    pub dribble_hold_time: f64,
}

impl Default for BallSection {
    fn default() -> Self {
        Self {
            radius: defaults::ball_radius(),
            deceleration: defaults::ball_deceleration(),
            history_depth: defaults::ball_history_depth(),
            min_time_interval: defaults::min_time_interval(),
            dribble_zone_radius: defaults::dribble_zone_radius(),
            dribble_center_margin: defaults::dribble_center_margin(),
            dribble_hold_time: defaults::dribble_hold_time(),
        }
    }
}

/// Vision staleness thresholds (s).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisionSection {
    #[serde(default = "defaults::robot_lost_time")]
    pub robot_lost_time: f64,
    #[serde(default = "defaults::robot_remove_time")]
    pub robot_remove_time: f64,
    #[serde(default = "defaults::ball_lost_time")]
    pub ball_lost_time: f64,
}

impl Default for VisionSection {
    fn default() -> Self {
        Self {
            robot_lost_time: defaults::robot_lost_time(),
            robot_remove_time: defaults::robot_remove_time(),
            ball_lost_time: defaults::ball_lost_time(),
        }
    }
}

/// Waypoint-to-velocity controller and radio cadence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlSection {
    /// Minimum time between radio frames (s)
    #[serde(default = "defaults::message_delay")]
    pub message_delay: f64,
    /// Waypoint arrival distance (mm)
    #[serde(default = "defaults::distance_threshold")]
    pub distance_threshold: f64,
    /// Waypoint arrival heading tolerance (rad)
    #[serde(default = "defaults::angle_threshold")]
    pub angle_threshold: f64,
    #[serde(default = "defaults::speed_scale")]
    pub speed_scale: f64,
    #[serde(default = "defaults::rotation_speed_scale")]
    pub rotation_speed_scale: f64,
}

impl Default for ControlSection {
    fn default() -> Self {
        Self {
            message_delay: defaults::message_delay(),
            distance_threshold: defaults::distance_threshold(),
            angle_threshold: defaults::angle_threshold(),
            speed_scale: defaults::speed_scale(),
            rotation_speed_scale: defaults::rotation_speed_scale(),
        }
    }
}

/// Kicker capacitor model. Charge is expressed as achievable kick speed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KickerSection {
    /// Full charge (kick speed, mm/s)
    #[serde(default = "defaults::max_charge_level")]
    pub max_charge_level: f64,
    /// Charge gained per second while charging
    #[serde(default = "defaults::charge_rate")]
    pub charge_rate: f64,
}

impl Default for KickerSection {
    fn default() -> Self {
        Self {
            max_charge_level: defaults::max_charge_level(),
            charge_rate: defaults::charge_rate(),
        }
    }
}

/// Strategy and path planning parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannerSection {
    /// Planner tick period (s)
    #[serde(default = "defaults::planner_interval")]
    pub interval: f64,
    /// Forced replan period for RRT paths (s)
    #[serde(default = "defaults::rrt_interval")]
    pub rrt_interval: f64,
    #[serde(default = "defaults::rrt_iterations")]
    pub rrt_iterations: usize,
    /// Probability of sampling the goal instead of a random point
    #[serde(default = "defaults::rrt_goal_bias")]
    pub rrt_goal_bias: f64,
    /// Clearance required around random samples (mm)
    #[serde(default = "defaults::rrt_sample_buffer")]
    pub rrt_sample_buffer: f64,
    /// Goalie standoff from the goal center (mm)
    #[serde(default = "defaults::goalie_offset")]
    pub goalie_offset: f64,
    /// Goalkeeper id, same for both teams
    #[serde(default = "defaults::goalie_id")]
    pub goalie_id: RobotId,
    /// Speed limit while the referee says STOP (mm/s)
    #[serde(default = "defaults::stop_speed_limit")]
    pub stop_speed_limit: f64,
    /// Ball clearance (beyond robot radius) while stopped (mm)
    #[serde(default = "defaults::stop_ball_clearance")]
    pub stop_ball_clearance: f64,
    /// Distance non-kickers keep behind the ball on a penalty (mm)
    #[serde(default = "defaults::penalty_distance")]
    pub penalty_distance: f64,
    /// Ball extrapolation horizon for shot detection (s)
    #[serde(default = "defaults::shot_horizon")]
    pub shot_horizon: f64,
    #[serde(default = "defaults::shot_lateral_buffer")]
    pub shot_lateral_buffer: f64,
    #[serde(default = "defaults::shot_goal_line_tolerance")]
    pub shot_goal_line_tolerance: f64,
    /// RNG seed for planning; 0 = entropy
    #[serde(default = "defaults::random_seed")]
    pub random_seed: u64,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            interval: defaults::planner_interval(),
            rrt_interval: defaults::rrt_interval(),
            rrt_iterations: defaults::rrt_iterations(),
            rrt_goal_bias: defaults::rrt_goal_bias(),
            rrt_sample_buffer: defaults::rrt_sample_buffer(),
            goalie_offset: defaults::goalie_offset(),
            goalie_id: defaults::goalie_id(),
            stop_speed_limit: defaults::stop_speed_limit(),
            stop_ball_clearance: defaults::stop_ball_clearance(),
            penalty_distance: defaults::penalty_distance(),
            shot_horizon: defaults::shot_horizon(),
            shot_lateral_buffer: defaults::shot_lateral_buffer(),
            shot_goal_line_tolerance: defaults::shot_goal_line_tolerance(),
            random_seed: defaults::random_seed(),
        }
    }
}

impl Constants {
    /// Load constants from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse constants from TOML text; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let constants: Constants = toml::from_str(content)?;
        Ok(constants)
    }

    /// Half field length along x (mm).
    #[inline]
    pub fn half_x(&self) -> f64 {
        self.field.x_length / 2.0
    }

    /// Half field width along y (mm).
    #[inline]
    pub fn half_y(&self) -> f64 {
        self.field.y_length / 2.0
    }

    /// Distance from robot center to an ideally dribbled ball center.
    #[inline]
    pub fn dribbler_offset(&self) -> f64 {
        self.robot.dribbler_radius + self.ball.radius
    }
}
