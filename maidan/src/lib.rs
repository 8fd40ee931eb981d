//! Maidan - real-time control core for a small-size soccer team
//!
//! This library holds everything that does not touch a socket or a thread:
//! the world model, physics prediction, the radio command codec, path
//! planning, the layered strategy stack and the physics simulator. The
//! `maidan-ctl` daemon wires these into providers and a coordinator.
//!
//! ## Modules
//!
//! - [`codec`]: bit-exact 26-byte team command frame
//! - [`world`]: time-indexed positions, commands, status, rules geometry
//! - [`physics`]: overlap, ball velocity and prediction, dribbler checks
//! - [`planning`]: straight-path checks and RRT
//! - [`strategy`]: actions, routines, roles, plays and strategy kinds
//! - [`sim`]: simulator tick and initial setups
//! - [`proto`]: SSL vision and referee datagram subsets

pub mod codec;
pub mod config;
pub mod core;
pub mod error;
pub mod physics;
pub mod planning;
pub mod proto;
pub mod sim;
pub mod strategy;
pub mod world;

pub use config::Constants;
pub use core::{Point2, Pose, RobotId, Team};
pub use error::{Error, Result};
pub use world::WorldModel;
