//! Default value functions for serde deserialization.

// Field geometry (mm)
pub fn field_x_length() -> f64 {
    9000.0
}
pub fn field_y_length() -> f64 {
    6000.0
}
pub fn goal_width() -> f64 {
    1000.0
}
pub fn center_circle_radius() -> f64 {
    495.0
}
pub fn defense_area_x_length() -> f64 {
    1000.0
}
pub fn defense_area_y_length() -> f64 {
    2000.0
}

// Robot
pub fn robot_radius() -> f64 {
    135.0
}
pub fn robot_dribbler_radius() -> f64 {
    80.0
}
pub fn robot_max_speed() -> f64 {
    600.0
}
pub fn robot_max_w() -> f64 {
    6.14
}
pub fn robot_history_depth() -> usize {
    20
}

// Ball
pub fn ball_radius() -> f64 {
    31.5
}
pub fn ball_deceleration() -> f64 {
    350.0
}
pub fn ball_history_depth() -> usize {
    100
}
pub fn min_time_interval() -> f64 {
    0.05
}
pub fn dribble_zone_radius() -> f64 {
    60.0
}
pub fn dribble_center_margin() -> f64 {
    32.0
}
pub fn dribble_hold_time() -> f64 {
    1.0
}

// Vision timing (s)
pub fn robot_lost_time() -> f64 {
    0.2
}
pub fn robot_remove_time() -> f64 {
    5.0
}
pub fn ball_lost_time() -> f64 {
    0.1
}

// Motion control
pub fn message_delay() -> f64 {
    0.05
}
pub fn distance_threshold() -> f64 {
    50.0
}
pub fn speed_scale() -> f64 {
    1.5
}
pub fn rotation_speed_scale() -> f64 {
    3.0
}
pub fn angle_threshold() -> f64 {
    0.1
}

// Kicker
pub fn max_charge_level() -> f64 {
    6500.0
}
pub fn charge_rate() -> f64 {
    3000.0
}

// Planner
pub fn planner_interval() -> f64 {
    0.01
}
pub fn rrt_interval() -> f64 {
    3.0
}
pub fn rrt_iterations() -> usize {
    1000
}
pub fn rrt_goal_bias() -> f64 {
    0.05
}
pub fn rrt_sample_buffer() -> f64 {
    100.0
}
pub fn goalie_offset() -> f64 {
    600.0
}
pub fn goalie_id() -> u8 {
    0
}
pub fn stop_speed_limit() -> f64 {
    450.0
}
pub fn stop_ball_clearance() -> f64 {
    500.0
}
pub fn penalty_distance() -> f64 {
    1000.0
}
pub fn shot_horizon() -> f64 {
    10.0
}
pub fn shot_lateral_buffer() -> f64 {
    250.0
}
pub fn shot_goal_line_tolerance() -> f64 {
    500.0
}
pub fn random_seed() -> u64 {
    0
}
