//! End-to-end scenarios across the world model, codec, physics and
//! planner.

mod common;

use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::f64::consts::FRAC_PI_2;

use maidan::codec::{RobotCommand, decode_team, encode_team};
use maidan::core::{field_to_robot_perspective, robot_to_field_perspective};
use maidan::planning::{Mover, RrtConfig, find_path};
use maidan::strategy::Planner;
use maidan::world::{Commands, Waypoint};
use maidan::{Constants, Error, Point2, Pose, Team, WorldModel};

// ============================================================================
// Perspective conversion
// ============================================================================

#[test]
fn test_perspective_conversion() {
    let v = Point2::new(100.0, 0.0);

    let facing_y = field_to_robot_perspective(FRAC_PI_2, v);
    assert_abs_diff_eq!(facing_y.x, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(facing_y.y, 0.0, epsilon = 1e-9);

    let facing_x = field_to_robot_perspective(0.0, v);
    assert_abs_diff_eq!(facing_x.x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(facing_x.y, 100.0, epsilon = 1e-9);

    for (w, local) in [(FRAC_PI_2, facing_y), (0.0, facing_x)] {
        let back = robot_to_field_perspective(w, local);
        assert_abs_diff_eq!(back.x, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, 0.0, epsilon = 1e-9);
    }
}

// ============================================================================
// Waypoint hand-off
// ============================================================================

#[test]
fn test_waypoint_arrival_and_hand_off() {
    let constants = Constants::default();
    let mut commands = Commands::new(constants.robot.max_speed);
    commands.set_waypoints(common::square_waypoints());

    let v = commands.derive_speeds(Pose::new(0.0, 0.0, FRAC_PI_2), &constants);
    assert!(v.x > 0.0);
    assert_abs_diff_eq!(v.y, 0.0, epsilon = 1e-9);

    // Teleport onto the first corner: the robot now has to go forward (+y)
    let v = commands.derive_speeds(Pose::new(1000.0, 0.0, FRAC_PI_2), &constants);
    assert_eq!(commands.waypoints.len(), 3);
    assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-9);
    assert!(v.y > 0.0);

    // Second corner: move left, which is -x for a robot facing +y
    let v = commands.derive_speeds(Pose::new(1000.0, 1000.0, FRAC_PI_2), &constants);
    assert_eq!(commands.waypoints.len(), 2);
    assert!(v.x < 0.0);
    assert_abs_diff_eq!(v.y, 0.0, epsilon = 1e-9);

    // Third corner: backwards
    let v = commands.derive_speeds(Pose::new(0.0, 1000.0, FRAC_PI_2), &constants);
    assert_eq!(commands.waypoints.len(), 1);
    assert!(v.y < 0.0);

    // On the final waypoint only the heading is off
    let v = commands.derive_speeds(Pose::new(0.0, 0.0, 0.0), &constants);
    assert_eq!(commands.waypoints.len(), 1);
    assert!(v.w > 0.0);
    assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(v.y, 0.0, epsilon = 1e-9);
}

#[test]
fn test_waypoints_round_trip_through_world() {
    let mut world = common::world_with(&[(Team::Yellow, 4, Pose::new(0.0, 0.0, 0.0))]);
    let path = common::square_waypoints();
    world.set_waypoints(Team::Yellow, 4, path.clone());
    assert_eq!(world.waypoints(Team::Yellow, 4), path.as_slice());
}

// ============================================================================
// Codec
// ============================================================================

#[test]
fn test_codec_stability() {
    let cmd = RobotCommand {
        id: 3,
        is_dribbling: true,
        is_charging: false,
        is_kicking: true,
        x: -200.0,
        y: 300.0,
        w: -2.0,
    };
    let frame = encode_team(&[cmd]).unwrap();
    assert_eq!(frame.len(), 26);
    assert_eq!(frame[0], 0x64);
    assert_eq!(frame[25], 0xFF);
    assert!(frame[1..25].iter().all(|&b| b != 0xFF));

    let decoded = decode_team(&frame).unwrap();
    assert_eq!(decoded.len(), 1);
    let d = decoded[0];
    assert_eq!(d.id, 3);
    assert!(d.is_dribbling && !d.is_charging && d.is_kicking);
    assert!((d.x - cmd.x).abs() <= 20.0);
    assert!((d.y - cmd.y).abs() <= 20.0);
    assert!((d.w - cmd.w).abs() <= 0.1);
}

#[test]
fn test_codec_rejects_out_of_range() {
    let cmd = RobotCommand {
        x: 1000.0,
        ..RobotCommand::stopped(2)
    };
    assert!(matches!(
        encode_team(&[cmd]),
        Err(Error::ValueOutOfRange { channel: "x", .. })
    ));

    let bad_id = RobotCommand::stopped(15);
    assert!(matches!(encode_team(&[bad_id]), Err(Error::BadRobotId(15))));

    let seven: Vec<RobotCommand> = (0..7).map(RobotCommand::stopped).collect();
    assert!(matches!(encode_team(&seven), Err(Error::TooManyRobots(7))));
}

// ============================================================================
// RRT
// ============================================================================

#[test]
fn test_rrt_in_clear_field() {
    let world = common::world_with(&[(Team::Blue, 1, Pose::new(-3000.0, 0.0, 0.0))]);
    let config = RrtConfig::from_world(&world, true);
    let mut rng = SmallRng::seed_from_u64(10_000);
    let goal = Point2::new(3000.0, 0.0);
    let path = find_path(
        &world,
        Mover::new(Team::Blue, 1),
        Point2::new(-3000.0, 0.0),
        goal,
        &config,
        &mut rng,
    )
    .unwrap();
    assert_eq!(path, vec![goal]);
}

#[test]
fn test_rrt_when_surrounded() {
    let mut world = common::surrounded_world();
    let config = RrtConfig::from_world(&world, true);
    let mut rng = SmallRng::seed_from_u64(3);
    let result = find_path(
        &world,
        Mover::new(Team::Blue, 0),
        Point2::ZERO,
        Point2::new(3000.0, 0.0),
        &config,
        &mut rng,
    );
    assert!(matches!(result, Err(Error::RrtFailed { iterations: 1000 })));

    // Through the planner the existing chain survives
    let previous = vec![Waypoint::new(Pose::new(0.0, -50.0, 0.0))];
    world.set_waypoints(Team::Blue, 0, previous.clone());
    let mut planner = Planner::new(Team::Blue, 3);
    assert!(!planner.plan_path(&mut world, 0, Pose::new(3000.0, 0.0, 0.0), 0.0));
    assert_eq!(world.waypoints(Team::Blue, 0), previous.as_slice());
}

// ============================================================================
// Ball physics
// ============================================================================

#[test]
fn test_ball_velocity_with_deceleration() {
    let mut world = WorldModel::default();
    common::ball_along_x(&mut world, &[(0.0, 0.0), (0.1, 100.0)]);

    let v = world.ball_velocity();
    assert!(v.norm() >= 1000.0 - 350.0 * 0.05 - 1e-9);
    assert!(v.norm() <= 1000.0 + 1e-9);
    assert!(v.x > 0.0);
    assert_abs_diff_eq!(v.y, 0.0);

    // Truncated at the stopping time
    let stop = world.ball_stop_time();
    assert!(stop < 10.0);
    let end = world.predict_ball_pos(10.0).unwrap();
    let at_stop = world.predict_ball_pos(stop).unwrap();
    assert_abs_diff_eq!(end.x, at_stop.x, epsilon = 1e-9);
    let travelled = v.norm() * v.norm() / (2.0 * 350.0);
    assert_abs_diff_eq!(end.x, 100.0 + travelled, epsilon = 1e-6);
}
