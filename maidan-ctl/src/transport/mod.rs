//! Radio transports for team command frames

use crate::error::Result;

mod mock;
mod serial;

pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Sink for encoded team frames
pub trait RadioTransport: Send {
    /// Write one complete frame
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Flush any pending writes (blocking until complete)
    fn flush(&mut self) -> Result<()>;

    /// Short description for logs
    fn describe(&self) -> String {
        "radio".to_string()
    }
}
