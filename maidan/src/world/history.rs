//! Bounded, newest-first sample history.

use std::collections::VecDeque;

/// One timestamped observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample<T> {
    /// Seconds on the process clock
    pub t: f64,
    pub value: T,
}

/// Ring of samples, newest at the front, timestamps non-increasing.
#[derive(Clone, Debug)]
pub struct History<T> {
    samples: VecDeque<Sample<T>>,
    depth: usize,
}

impl<T: Copy> History<T> {
    pub fn new(depth: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(depth),
            depth: depth.max(1),
        }
    }

    /// Add a sample. Samples older than the newest one are dropped and
    /// `false` is returned.
    pub fn push(&mut self, t: f64, value: T) -> bool {
        if let Some(newest) = self.samples.front() {
            if t < newest.t {
                return false;
            }
        }
        self.samples.push_front(Sample { t, value });
        self.samples.truncate(self.depth);
        true
    }

    #[inline]
    pub fn latest(&self) -> Option<&Sample<T>> {
        self.samples.front()
    }

    /// Newest-first iteration.
    pub fn iter(&self) -> impl Iterator<Item = &Sample<T>> {
        self.samples.iter()
    }

    /// Samples no more than `dt` seconds older than the newest one.
    pub fn within(&self, dt: f64) -> impl Iterator<Item = &Sample<T>> {
        let cutoff = self.latest().map_or(f64::INFINITY, |s| s.t - dt);
        self.samples.iter().take_while(move |s| s.t >= cutoff)
    }

    /// Newest sample that is at least `dt` seconds older than the newest
    /// one, so velocity estimates use the shortest baseline allowed.
    pub fn older_than_newest_by(&self, dt: f64) -> Option<&Sample<T>> {
        let newest = self.latest()?.t;
        self.samples.iter().find(|s| newest - s.t >= dt)
    }

    /// Sample whose timestamp is closest to `t`.
    pub fn nearest(&self, t: f64) -> Option<&Sample<T>> {
        self.samples
            .iter()
            .min_by(|a, b| (a.t - t).abs().total_cmp(&(b.t - t).abs()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
