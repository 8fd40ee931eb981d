//! Serial radio dongle

use super::RadioTransport;
use crate::error::{Error, Result};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::Write;
use std::time::Duration;

/// Write timeout; a frame that cannot go out in time is dropped.
const WRITE_TIMEOUT: Duration = Duration::from_millis(20);

/// Radio dongle on a UART
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialTransport {
    /// Open a serial port
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyUSB0")
    /// * `baud_rate` - Baud rate (e.g., 115200)
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(WRITE_TIMEOUT)
            .open()?;

        log::info!("Opened radio port: {} at {} baud", path, baud_rate);

        Ok(SerialTransport {
            port,
            path: path.to_string(),
        })
    }
}

impl RadioTransport for SerialTransport {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        match self.port.write_all(frame) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                Err(Error::Transport(format!("write to {} timed out", self.path)))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.port.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("serial {}", self.path)
    }
}
