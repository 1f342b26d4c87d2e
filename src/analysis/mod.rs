// Analysis module - streaming spectral analyzers
//
// Each analyzer consumes one frequency-domain frame per call (two for the
// DiffMags family), updates whatever cross-frame state it keeps, and caches its
// latest output values so the host can re-emit them on calls without a new
// frame.
//
// Analyzers:
// - power: mean bin magnitude
// - flatness: geometric / arithmetic mean of magnitudes
// - percentile: frequency below which a fraction of the magnitude sum lies
// - split_flatness: flatness below and above a percentile split
// - flux: frame-to-frame magnitude change (full or rising-only)
// - subband: mean magnitude per configured frequency band
// - diff_mags: difference between two frames (scalar and in-place polar)
//
// Real-time contract: after the first frame has sized the scratch state no
// analyzer allocates or logs per call.

pub mod diff_mags;
pub mod flatness;
pub mod flux;
pub mod percentile;
pub mod power;
pub mod split_flatness;
pub mod subband;


pub use diff_mags::{DiffMags, PolarDiffMags};
pub use flatness::SpectralFlatness;
pub use flux::{FluxDirection, SpectralFlux};
pub use percentile::SpectralPercentile;
pub use power::SpectralPower;
pub use split_flatness::FlatnessSplitPercentile;
pub use subband::SubbandPower;

use crate::error::AnalysisError;
use crate::frame::{FramePair, FrequencyFrame};

/// Host-supplied facts every analyzer may need
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisContext {
    sample_rate: f32,
}

impl AnalysisContext {
    /// Create a context for the given sample rate in Hz
    pub fn new(sample_rate: f32) -> Result<Self, AnalysisError> {
        if sample_rate.is_finite() && sample_rate > 0.0 {
            Ok(Self { sample_rate })
        } else {
            Err(AnalysisError::InvalidSampleRate { sample_rate })
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn nyquist_hz(&self) -> f32 {
        self.sample_rate * 0.5
    }
}

/// Analyzer over a single frame per call
pub trait FrameAnalyzer {
    /// Per-call scalar parameters (e.g. the percentile fraction)
    type Params: Copy;

    /// Consume one frame and update the cached outputs
    ///
    /// On `Err` the cached outputs and retained state are left unchanged.
    fn analyze(
        &mut self,
        frame: &mut FrequencyFrame,
        params: Self::Params,
        context: &AnalysisContext,
    ) -> Result<(), AnalysisError>;

    /// Latest output values, one per declared output slot
    fn outputs(&self) -> &[f32];
}

/// Analyzer over two frames per call
pub trait PairAnalyzer {
    fn analyze_pair(&mut self, pair: FramePair<'_>) -> Result<(), AnalysisError>;

    fn outputs(&self) -> &[f32];
}
