//! Physics simulator used in place of vision.
//!
//! - [`Simulator`]: per-tick motion, collisions, dribbling and kicking
//! - [`InitialSetup`]: starting placements

mod engine;
mod setups;

pub use engine::Simulator;
pub use setups::InitialSetup;
