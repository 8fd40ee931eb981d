//! Maidan control daemon
//!
//! Wires the `maidan` core into running components: one thread per
//! provider (vision, referee, planner, radio, simulator) and a coordinator
//! on the main thread that owns the authoritative world model.
//!
//! ## Deployments
//!
//! - `vision`: SSL-Vision and game-controller multicast in, radio out
//! - `simulator`: built-in physics in place of vision, radio optional

pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod net;
pub mod providers;
pub mod transport;

pub use config::{AppConfig, CliArgs, Deployment};
pub use coordinator::Coordinator;
pub use error::{Error, Result};
