// Flatness module - spectral flatness (Wiener entropy)
//
// Formula: flatness = geometric_mean(|X|) / arithmetic_mean(|X|)
//
// The geometric mean is taken in the log domain in f64 so long spectra do not
// underflow. A zero magnitude contributes ln(0) = -inf and drives the result
// to 0; no bins are filtered out.

use super::{AnalysisContext, FrameAnalyzer};
use crate::error::AnalysisError;
use crate::frame::{ComplexSpectrum, FrequencyFrame};

/// Spectral flatness over DC, all bins and Nyquist
#[derive(Debug, Clone, Default)]
pub struct SpectralFlatness {
    output: [f32; 1],
}

impl SpectralFlatness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f32 {
        self.output[0]
    }
}

/// Running log-sum / linear-sum pair for one spectral region
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FlatnessAccumulator {
    log_sum: f64,
    linear_sum: f64,
}

impl FlatnessAccumulator {
    #[inline]
    pub(crate) fn push(&mut self, magnitude: f32) {
        let magnitude = f64::from(magnitude.abs());
        self.log_sum += magnitude.ln();
        self.linear_sum += magnitude;
    }

    /// Flatness of `count` accumulated magnitudes
    ///
    /// A silent (or empty) region has no meaningful ratio and reports 0.
    pub(crate) fn ratio(&self, count: usize) -> f32 {
        let count = count as f64;
        let arithmetic = self.linear_sum / count;
        if !(arithmetic > 0.0) {
            return 0.0;
        }
        let geometric = (self.log_sum / count).exp();
        (geometric / arithmetic) as f32
    }
}

pub fn spectral_flatness(spectrum: &ComplexSpectrum<'_>) -> f32 {
    let mut acc = FlatnessAccumulator::default();
    acc.push(*spectrum.dc);
    acc.push(*spectrum.nyquist);
    for bin in spectrum.bins.iter() {
        acc.push(bin.norm());
    }
    acc.ratio(spectrum.bins.len() + 2)
}

impl FrameAnalyzer for SpectralFlatness {
    type Params = ();

    fn analyze(
        &mut self,
        frame: &mut FrequencyFrame,
        _params: (),
        _context: &AnalysisContext,
    ) -> Result<(), AnalysisError> {
        self.output[0] = spectral_flatness(&frame.to_complex());
        Ok(())
    }

    fn outputs(&self) -> &[f32] {
        &self.output
    }
}
