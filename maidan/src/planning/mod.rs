//! Path planning against moving robots.
//!
//! This module provides:
//! - Occupancy and straight-path checks ([`is_position_open`], [`is_path_blocked`])
//! - RRT search with straight-line smoothing ([`find_path`])

mod obstacles;
mod rrt;

pub use obstacles::{Mover, is_chain_blocked, is_path_blocked, is_position_open};
pub use rrt::{RrtConfig, find_path};
