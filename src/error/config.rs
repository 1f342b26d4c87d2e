// Configuration error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Configuration error code constants
///
/// Error code range: 4001-4003
pub struct ConfigErrorCodes {}

impl ConfigErrorCodes {
    /// Config JSON could not be parsed
    pub const PARSE_FAILED: i32 = 4001;

    /// Frame geometry (FFT size / hop) is unusable
    pub const INVALID_FRAME: i32 = 4002;

    /// Analyzer parameters are out of range
    pub const INVALID_PARAMETER: i32 = 4003;
}

/// Errors raised while parsing or validating an [`AppConfig`](crate::config::AppConfig)
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ParseFailed { reason: String },
    InvalidFrame { details: String },
    InvalidParameter { name: String, details: String },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::ParseFailed { .. } => ConfigErrorCodes::PARSE_FAILED,
            ConfigError::InvalidFrame { .. } => ConfigErrorCodes::INVALID_FRAME,
            ConfigError::InvalidParameter { .. } => ConfigErrorCodes::INVALID_PARAMETER,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigError::ParseFailed { reason } => format!("Failed to parse config: {}", reason),
            ConfigError::InvalidFrame { details } => format!("Invalid frame settings: {}", details),
            ConfigError::InvalidParameter { name, details } => {
                format!("Invalid parameter '{}': {}", name, details)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseFailed {
            reason: err.to_string(),
        }
    }
}
