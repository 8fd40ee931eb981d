//! Error types for the maidan core

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A velocity escaped the open interval the codec can quantize
    #[error("{channel} value {value} outside ({min}, {max})")]
    ValueOutOfRange {
        /// Which channel: "x", "y" or "w"
        channel: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Robot id does not fit the 4-bit wire field (or is the sentinel)
    #[error("Bad robot id: {0}")]
    BadRobotId(u8),

    /// More commands than frame slots
    #[error("Too many robots for one frame: {0}")]
    TooManyRobots(usize),

    /// A frame failed structural validation
    #[error("Frame corrupt: {0}")]
    FrameCorrupt(String),

    /// RRT could not reach the goal
    #[error("RRT failed after {iterations} iterations")]
    RrtFailed {
        iterations: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
