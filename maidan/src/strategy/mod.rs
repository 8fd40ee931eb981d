//! Layered strategy: actions, routines, roles, plays and strategy kinds.
//!
//! All layers are methods on [`Planner`], which carries the per-team state
//! that survives between ticks (RNG, memoized paths, routine progress).
//! A [`Strategy`] picks what to run each tick.

mod actions;
mod analysis;
mod kinds;
mod planner;
mod plays;
mod roles;
mod routines;

pub use analysis::{best_support_position, intercept_range, rate_attacker_pos};
pub use kinds::{Strategy, StrategyKind};
pub use planner::Planner;
pub use routines::Routine;
