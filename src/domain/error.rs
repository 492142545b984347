//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>s, <number>m, or <number>m<number>s (e.g., 30s, 1m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when configuration is invalid or cannot be loaded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Sample rate must be a positive integer, got {0}")]
    InvalidSampleRate(u32),

    #[error("Bit rate must be a positive integer, got {0}")]
    InvalidBitRate(u32),

    #[error("Unknown encoder kind: \"{0}\". Valid kinds are: mp3, wav")]
    UnknownEncoderKind(String),

    #[error("MP3 encoding requires the capture rate: configured {configured} Hz, capture {capture} Hz")]
    SampleRateMismatch { configured: u32, capture: u32 },

    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

/// Error when an operation is invoked out of sequence
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct StateError {
    pub current_state: &'static str,
    pub action: &'static str,
}
