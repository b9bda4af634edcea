//! Error types shared across the bridge.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all bridge failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Socket or file-system operation failure outside the streaming path.
    Io(String),
    /// The simulator could not be reached or refused vehicle control.
    SessionInit(String),
    /// The initial waypoint line was missing or malformed.
    Handshake(String),
    /// The peer disconnected or the connection was already closed.
    ConnectionClosed(String),
    /// A wire line could not be decoded.
    MalformedMessage(String),
    /// A simulator call failed after the session was established.
    Simulator(String),
    /// A read did not complete within the configured timeout.
    Timeout(String),
}

impl AppError {
    /// Whether this error ends the stream without indicating a fault.
    #[must_use]
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed(_))
    }

    /// Whether this error concerns a single line and can be skipped.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedMessage(_))
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::SessionInit(msg) => write!(f, "session init: {msg}"),
            Self::Handshake(msg) => write!(f, "handshake: {msg}"),
            Self::ConnectionClosed(msg) => write!(f, "connection closed: {msg}"),
            Self::MalformedMessage(msg) => write!(f, "malformed message: {msg}"),
            Self::Simulator(msg) => write!(f, "simulator: {msg}"),
            Self::Timeout(msg) => write!(f, "timeout: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
