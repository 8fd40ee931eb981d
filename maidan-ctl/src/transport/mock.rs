//! In-memory radio for tests and simulator sessions

use super::RadioTransport;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every frame written. Clones share the same record.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Default)]
struct MockTransportInner {
    frames: Vec<Vec<u8>>,
    /// Keep only this many most recent frames (0 = unbounded)
    capacity: usize,
    fail_writes: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the `capacity` newest frames.
    pub fn bounded(capacity: usize) -> Self {
        let transport = Self::new();
        transport.inner.lock().capacity = capacity;
        transport
    }

    /// All recorded frames, oldest first
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.inner.lock().frames.clone()
    }

    pub fn last_frame(&self) -> Option<Vec<u8>> {
        self.inner.lock().frames.last().cloned()
    }

    pub fn frame_count(&self) -> usize {
        self.inner.lock().frames.len()
    }

    pub fn clear(&self) {
        self.inner.lock().frames.clear();
    }

    /// Make subsequent writes fail with a transport error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }
}

impl RadioTransport for MockTransport {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.fail_writes {
            return Err(Error::Transport("mock write failure".to_string()));
        }
        inner.frames.push(frame.to_vec());
        if inner.capacity > 0 && inner.frames.len() > inner.capacity {
            let excess = inner.frames.len() - inner.capacity;
            inner.frames.drain(..excess);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
