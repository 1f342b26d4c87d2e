// Analysis error types and constants

use crate::error::ErrorCode;
use log::warn;
use std::fmt;

/// Analysis error code constants
///
/// Single source of truth for the numeric codes reported by [`AnalysisError`].
///
/// Error code range: 3001-3006
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// Frame bin count differs from the size the scratch buffer was allocated for
    pub const UNSUPPORTED_RESIZE: i32 = 3001;

    /// Two-buffer analyzer received frames with different bin counts
    pub const BIN_COUNT_MISMATCH: i32 = 3002;

    /// Sub-band cutoff frequencies are not finite, non-negative and ascending
    pub const INVALID_CUTOFFS: i32 = 3003;

    /// Sample rate is not a positive finite number
    pub const INVALID_SAMPLE_RATE: i32 = 3004;

    /// The frame bank holds no frames to resolve a selector against
    pub const EMPTY_BANK: i32 = 3005;

    /// FFT size is too small or odd to pack into a frame
    pub const INVALID_FFT_SIZE: i32 = 3006;
}

/// Log an analysis error with structured context
///
/// Used by the host units the first time an instance skips a call, so a
/// misconfigured graph shows up in the logs without flooding them once per
/// control block.
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    warn!(
        "Analysis error in {}: code={}, component=SpectralAnalyzer, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Analysis-related errors
///
/// These cover the skip conditions of the streaming analyzers and the
/// construction-time validation of their fixed parameters.
///
/// Error code range: 3001-3006
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Frame size changed after the analyzer's scratch state was sized
    UnsupportedResize { allocated: usize, requested: usize },

    /// The two frames of a two-buffer analyzer differ in size
    BinCountMismatch { first: usize, second: usize },

    /// Cutoff frequency table rejected at construction
    InvalidCutoffs { details: String },

    /// Sample rate unusable for frequency/bin conversion
    InvalidSampleRate { sample_rate: f32 },

    /// No frame available in the bank
    EmptyBank,

    /// FFT stage cannot produce a DC / Nyquist / bins frame of this size
    InvalidFftSize { fft_size: usize },
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::UnsupportedResize { .. } => AnalysisErrorCodes::UNSUPPORTED_RESIZE,
            AnalysisError::BinCountMismatch { .. } => AnalysisErrorCodes::BIN_COUNT_MISMATCH,
            AnalysisError::InvalidCutoffs { .. } => AnalysisErrorCodes::INVALID_CUTOFFS,
            AnalysisError::InvalidSampleRate { .. } => AnalysisErrorCodes::INVALID_SAMPLE_RATE,
            AnalysisError::EmptyBank => AnalysisErrorCodes::EMPTY_BANK,
            AnalysisError::InvalidFftSize { .. } => AnalysisErrorCodes::INVALID_FFT_SIZE,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::UnsupportedResize {
                allocated,
                requested,
            } => format!(
                "Frame has {} bins but scratch state was sized for {} bins",
                requested, allocated
            ),
            AnalysisError::BinCountMismatch { first, second } => format!(
                "Frame bin counts differ ({} vs {}), skipping comparison",
                first, second
            ),
            AnalysisError::InvalidCutoffs { details } => {
                format!("Invalid sub-band cutoffs: {}", details)
            }
            AnalysisError::InvalidSampleRate { sample_rate } => {
                format!("Sample rate must be positive and finite (got {})", sample_rate)
            }
            AnalysisError::EmptyBank => "Frame bank is empty".to_string(),
            AnalysisError::InvalidFftSize { fft_size } => {
                format!("FFT size must be even and at least 4 (got {})", fft_size)
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnalysisError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AnalysisError {}
