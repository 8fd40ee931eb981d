//! Error types for the control daemon

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Daemon error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error raised by the control core
    #[error(transparent)]
    Core(#[from] maidan::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Datagram did not decode
    #[error("Decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Radio transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// A provider thread could not be started
    #[error("Failed to spawn {0}")]
    Spawn(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
