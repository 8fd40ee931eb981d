//! Process-wide monotonic clock.
//!
//! Sample timestamps are `f64` seconds since the first call in this
//! process, so snapshots can cross threads without carrying `Instant`s and
//! tests can use plain numbers.

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Seconds elapsed since the process clock was first read.
pub fn now() -> f64 {
    EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64()
}
