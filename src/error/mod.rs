// Error types for the spectral analysis engine
//
// Analyzer failures never reach the audio path as errors: the host units turn
// them into silent skips. They are still modelled as structured, coded errors
// so that the skip reason can be logged and inspected by tooling.

mod analysis;
mod config;

pub use analysis::{log_analysis_error, AnalysisError, AnalysisErrorCodes};
pub use config::{ConfigError, ConfigErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the host boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
