// Power module - mean spectral magnitude

use super::{AnalysisContext, FrameAnalyzer};
use crate::error::AnalysisError;
use crate::frame::{ComplexSpectrum, FrequencyFrame};

/// Mean magnitude over DC, all bins and Nyquist
#[derive(Debug, Clone, Default)]
pub struct SpectralPower {
    output: [f32; 1],
}

impl SpectralPower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f32 {
        self.output[0]
    }
}

/// `(|dc| + |nyq| + Σ|bin|) / (bin_count + 2)`
pub fn mean_magnitude(spectrum: &ComplexSpectrum<'_>) -> f32 {
    let total = spectrum.dc.abs()
        + spectrum.nyquist.abs()
        + spectrum.bins.iter().map(|bin| bin.norm()).sum::<f32>();
    total / (spectrum.bins.len() + 2) as f32
}

impl FrameAnalyzer for SpectralPower {
    type Params = ();

    fn analyze(
        &mut self,
        frame: &mut FrequencyFrame,
        _params: (),
        _context: &AnalysisContext,
    ) -> Result<(), AnalysisError> {
        self.output[0] = mean_magnitude(&frame.to_complex());
        Ok(())
    }

    fn outputs(&self) -> &[f32] {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{PolarBin, RectBin};

    fn context() -> AnalysisContext {
        AnalysisContext::new(48000.0).unwrap()
    }

    #[test]
    fn test_power_of_known_frame() {
        let mut frame = FrequencyFrame::from_rectangular(
            2.0,
            -2.0,
            &[RectBin::new(3.0, 4.0), RectBin::new(0.0, 0.0)],
        );
        let mut power = SpectralPower::new();
        power.analyze(&mut frame, (), &context()).unwrap();
        // (2 + 2 + 5 + 0) / 4
        assert!((power.value() - 2.25).abs() < 1e-6, "got {}", power.value());
    }

    #[test]
    fn test_power_scales_linearly() {
        let bins = [RectBin::new(0.3, -0.1), RectBin::new(1.2, 0.7), RectBin::new(-0.4, 0.0)];
        let scaled: Vec<RectBin> = bins
            .iter()
            .map(|b| RectBin::new(b.real * 3.0, b.imag * 3.0))
            .collect();

        let mut power = SpectralPower::new();
        power
            .analyze(&mut FrequencyFrame::from_rectangular(0.5, 0.25, &bins), (), &context())
            .unwrap();
        let base = power.value();
        power
            .analyze(&mut FrequencyFrame::from_rectangular(1.5, 0.75, &scaled), (), &context())
            .unwrap();
        assert!((power.value() - 3.0 * base).abs() < 1e-5);
        assert!(base >= 0.0);
    }

    #[test]
    fn test_power_converts_polar_frames() {
        let mut frame = FrequencyFrame::from_polar(1.0, 1.0, &[PolarBin::new(4.0, 1.3)]);
        let mut power = SpectralPower::new();
        power.analyze(&mut frame, (), &context()).unwrap();
        assert!((power.value() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_power_of_empty_frame() {
        let mut frame = FrequencyFrame::from_rectangular(1.0, 3.0, &[]);
        let mut power = SpectralPower::new();
        power.analyze(&mut frame, (), &context()).unwrap();
        assert_eq!(power.value(), 2.0);
    }
}
