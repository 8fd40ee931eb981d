//! World model: time-indexed positions, commands, status and rules
//! geometry.
//!
//! A [`WorldModel`] is a plain value. The coordinator holds the
//! authoritative copy; every provider works on its own mirror and only
//! writes the [`WorldField`]s it owns.

mod commands;
mod geometry;
mod history;
mod model;
mod referee;
mod status;
mod ui;

pub use commands::{Commands, Velocity, Waypoint, close_enough};
pub use history::{History, Sample};
pub use model::{RobotHistories, WorldField, WorldModel};
pub use referee::{RefereeCommand, RefereeMessage};
pub use status::Status;
pub use ui::UiInputs;
