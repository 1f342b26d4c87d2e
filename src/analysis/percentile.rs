// Percentile module - spectral percentile frequency (centroid / rolloff)
//
// Algorithm:
// 1. Cumulative magnitude sum from DC upwards, stored per bin in scratch
// 2. Nyquist is added to the total but never scanned as a candidate
// 3. Target = total * fraction
// 4. First bin whose cumulative sum reaches the target wins:
//    freq = nyquist_hz * (i + 1) / (bin_count + 2)
// 5. No winner (target <= 0, fraction > 1, silent frame, target inside the
//    Nyquist tail) reports 0 Hz
//
// No interpolation between bins is performed; the result is quantised to the
// bin grid.

use super::{AnalysisContext, FrameAnalyzer};
use crate::error::AnalysisError;
use crate::frame::FrequencyFrame;
use crate::scratch::ScratchBuffer;

/// Frequency below which `fraction` of the spectral magnitude lies
///
/// With fraction 0.5 this is a median-style spectral centroid, with 0.85-0.95
/// a spectral rolloff.
#[derive(Debug, Clone, Default)]
pub struct SpectralPercentile {
    cumulative: ScratchBuffer<f32>,
    output: [f32; 1],
}

impl SpectralPercentile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest percentile frequency in Hz
    pub fn value(&self) -> f32 {
        self.output[0]
    }

    /// Bin count the scratch buffer is locked to, once a frame has been seen
    pub fn bin_count(&self) -> Option<usize> {
        self.cumulative.capacity_bins()
    }
}

/// Scan a cumulative-sum table for the first entry reaching `target`
///
/// # Arguments
/// * `cumulative` - Running magnitude sum per bin, DC folded into the first entry
/// * `target` - Sum to reach (total magnitude times the requested fraction)
/// * `nyquist_hz` - Half the sample rate
///
/// # Returns
/// The winning bin's frequency in Hz, or 0 Hz when nothing reaches a
/// positive target
pub fn percentile_frequency(cumulative: &[f32], target: f32, nyquist_hz: f32) -> f32 {
    if !(target > 0.0) {
        return 0.0;
    }

    let denominator = (cumulative.len() + 2) as f32;
    cumulative
        .iter()
        .position(|&sum| sum >= target)
        .map(|index| nyquist_hz * (index + 1) as f32 / denominator)
        .unwrap_or(0.0)
}

impl FrameAnalyzer for SpectralPercentile {
    /// Percentile as a fraction, e.g. 0.5 for the median
    type Params = f32;

    fn analyze(
        &mut self,
        frame: &mut FrequencyFrame,
        fraction: f32,
        context: &AnalysisContext,
    ) -> Result<(), AnalysisError> {
        let cumulative = self.cumulative.acquire(frame.bin_count())?;
        let spectrum = frame.to_complex();

        let mut total = spectrum.dc.abs();
        for (slot, bin) in cumulative.iter_mut().zip(spectrum.bins.iter()) {
            total += bin.norm();
            *slot = total;
        }
        total += spectrum.nyquist.abs();

        self.output[0] = percentile_frequency(cumulative, total * fraction, context.nyquist_hz());
        Ok(())
    }

    fn outputs(&self) -> &[f32] {
        &self.output
    }
}
