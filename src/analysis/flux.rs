// Flux module - spectral flux between consecutive frames
//
// Algorithm:
// 1. Convert frame to polar form
// 2. norm_t = 1 / (dc² + nyq² + Σ mag²) when normalising (0 for a silent
//    frame instead of dividing by zero), otherwise 1
// 3. d_k = mag_t[k] * norm_t - mag_(t-1)[k] * norm_(t-1), for DC, Nyquist and
//    every bin (edge values compared by absolute value)
// 4. flux_t = sqrt(Σ d_k²), or sqrt(Σ max(0, d_k)²) for the rising-only
//    variant used for onset detection
// 5. Keep the unnormalised magnitudes and norm_t for the next call
//
// History starts as zero magnitudes with unit normalisation, so the first
// frame's flux is its own (normalised) magnitude.

use super::{AnalysisContext, FrameAnalyzer};
use crate::error::AnalysisError;
use crate::frame::FrequencyFrame;
use crate::scratch::ScratchBuffer;

/// Which magnitude changes contribute to the flux
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluxDirection {
    /// Increases and decreases
    Both,
    /// Increases only (positive flux)
    RisingOnly,
}

impl FluxDirection {
    #[inline]
    fn contribution(self, diff: f32) -> f32 {
        match self {
            FluxDirection::Both => diff * diff,
            FluxDirection::RisingOnly if diff > 0.0 => diff * diff,
            FluxDirection::RisingOnly => 0.0,
        }
    }
}

/// Streaming spectral flux with optional per-frame normalisation
#[derive(Debug, Clone)]
pub struct SpectralFlux {
    direction: FluxDirection,
    normalise: bool,
    previous_mags: ScratchBuffer<f32>,
    previous_dc: f32,
    previous_nyquist: f32,
    previous_norm: f32,
    output: [f32; 1],
}

impl SpectralFlux {
    /// Flux counting both increases and decreases
    pub fn new(normalise: bool) -> Self {
        Self::with_direction(FluxDirection::Both, normalise)
    }

    /// Flux counting increases only
    pub fn positive(normalise: bool) -> Self {
        Self::with_direction(FluxDirection::RisingOnly, normalise)
    }

    pub fn with_direction(direction: FluxDirection, normalise: bool) -> Self {
        Self {
            direction,
            normalise,
            previous_mags: ScratchBuffer::new(),
            previous_dc: 0.0,
            previous_nyquist: 0.0,
            previous_norm: 1.0,
            output: [0.0],
        }
    }

    pub fn value(&self) -> f32 {
        self.output[0]
    }
}

impl FrameAnalyzer for SpectralFlux {
    type Params = ();

    fn analyze(
        &mut self,
        frame: &mut FrequencyFrame,
        _params: (),
        _context: &AnalysisContext,
    ) -> Result<(), AnalysisError> {
        let previous = self.previous_mags.acquire(frame.bin_count())?;
        let spectrum = frame.to_polar();
        let (dc, nyquist) = (*spectrum.dc, *spectrum.nyquist);

        let current_norm = if self.normalise {
            let energy = dc * dc
                + nyquist * nyquist
                + spectrum.bins.iter().map(|bin| bin.mag * bin.mag).sum::<f32>();
            if energy != 0.0 {
                1.0 / energy
            } else {
                0.0
            }
        } else {
            1.0
        };
        let previous_norm = self.previous_norm;
        let direction = self.direction;

        let mut flux_squared = direction.contribution(
            (dc * current_norm).abs() - (self.previous_dc * previous_norm).abs(),
        );
        flux_squared += direction.contribution(
            (nyquist * current_norm).abs() - (self.previous_nyquist * previous_norm).abs(),
        );
        for (prev, bin) in previous.iter_mut().zip(spectrum.bins.iter()) {
            flux_squared += direction.contribution(bin.mag * current_norm - *prev * previous_norm);
            *prev = bin.mag;
        }

        self.previous_norm = current_norm;
        self.previous_dc = dc;
        self.previous_nyquist = nyquist;
        self.output[0] = flux_squared.sqrt();
        Ok(())
    }

    fn outputs(&self) -> &[f32] {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Coord, RectBin};

    fn context() -> AnalysisContext {
        AnalysisContext::new(48000.0).unwrap()
    }

    fn frame(dc: f32, nyquist: f32, mags: &[f32]) -> FrequencyFrame {
        let bins: Vec<RectBin> = mags.iter().map(|&m| RectBin::new(m, 0.0)).collect();
        FrequencyFrame::from_rectangular(dc, nyquist, &bins)
    }

    #[test]
    fn test_first_frame_measures_against_silence() {
        let mut flux = SpectralFlux::new(false);
        let mut f = frame(0.0, 0.0, &[3.0, 4.0]);
        flux.analyze(&mut f, (), &context()).unwrap();
        assert!((flux.value() - 5.0).abs() < 1e-5, "got {}", flux.value());
        assert_eq!(f.coord(), Coord::Polar);
    }

    #[test]
    fn test_identical_frames_have_zero_flux() {
        for normalise in [false, true] {
            let mut flux = SpectralFlux::new(normalise);
            flux.analyze(&mut frame(1.0, 0.5, &[2.0, 1.0, 0.25]), (), &context())
                .unwrap();
            flux.analyze(&mut frame(1.0, 0.5, &[2.0, 1.0, 0.25]), (), &context())
                .unwrap();
            assert!(flux.value().abs() < 1e-6, "normalise={} gave {}", normalise, flux.value());
        }
    }

    #[test]
    fn test_normalised_flux_after_gain_change() {
        let mut flux = SpectralFlux::new(true);
        flux.analyze(&mut frame(1.0, 1.0, &[2.0, 3.0]), (), &context())
            .unwrap();
        // Normalisation divides by energy, so a doubled spectrum is not identical:
        // each normalised magnitude halves
        flux.analyze(&mut frame(2.0, 2.0, &[4.0, 6.0]), (), &context())
            .unwrap();
        let energy = 1.0 + 1.0 + 4.0 + 9.0;
        let expected = ((1.0f32 + 1.0 + 4.0 + 9.0) / (4.0 * energy * energy)).sqrt();
        assert!((flux.value() - expected).abs() < 1e-6, "got {} expected {}", flux.value(), expected);
    }

    #[test]
    fn test_positive_flux_ignores_decreases() {
        let mut full = SpectralFlux::new(false);
        let mut positive = SpectralFlux::positive(false);
        for analyzer in [&mut full, &mut positive] {
            analyzer
                .analyze(&mut frame(0.0, 0.0, &[4.0, 1.0]), (), &context())
                .unwrap();
            analyzer
                .analyze(&mut frame(0.0, 0.0, &[1.0, 3.0]), (), &context())
                .unwrap();
        }
        // Full: sqrt(9 + 4); positive: only the +2 rise counts
        assert!((full.value() - 13.0f32.sqrt()).abs() < 1e-5);
        assert!((positive.value() - 2.0).abs() < 1e-5);
        assert!(positive.value() <= full.value());
    }

    #[test]
    fn test_silent_frame_uses_zero_norm() {
        let mut flux = SpectralFlux::new(true);
        flux.analyze(&mut frame(0.0, 0.0, &[0.0, 0.0]), (), &context())
            .unwrap();
        assert_eq!(flux.value(), 0.0);
        assert!(flux.value().is_finite());
    }

    #[test]
    fn test_resize_keeps_history_and_output() {
        let mut flux = SpectralFlux::new(false);
        flux.analyze(&mut frame(0.0, 0.0, &[1.0, 1.0]), (), &context())
            .unwrap();
        let before = flux.value();

        let mut larger = frame(0.0, 0.0, &[9.0, 9.0, 9.0]);
        assert!(flux.analyze(&mut larger, (), &context()).is_err());
        assert_eq!(flux.value(), before);
        assert_eq!(larger.coord(), Coord::Rectangular, "skipped frame is not converted");

        flux.analyze(&mut frame(0.0, 0.0, &[1.0, 1.0]), (), &context())
            .unwrap();
        assert!(flux.value().abs() < 1e-6, "history must still be the first frame");
    }
}
