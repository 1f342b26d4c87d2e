// Spectrum module - forward FFT into a FrequencyFrame
//
// Fills the role of the host's FFT stage for tooling and tests: Hann window,
// forward complex FFT (rustfft), then pack the non-negative half of the
// spectrum into the frame layout. Output is unnormalised.
//
// All buffers (window, FFT buffer, FFT scratch) are allocated at construction,
// so `write` itself does not allocate.

use crate::error::AnalysisError;
use crate::frame::FrequencyFrame;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

pub struct SpectrumWriter {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    /// Hann window (pre-computed)
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumWriter {
    /// Plan a forward FFT of `fft_size` points
    ///
    /// # Arguments
    /// * `fft_size` - Window length in samples; must be even and at least 4
    ///
    /// # Returns
    /// The writer, or `InvalidFftSize` for sizes with no DC / Nyquist / bins layout
    pub fn new(fft_size: usize) -> Result<Self, AnalysisError> {
        if fft_size < 4 || fft_size % 2 != 0 {
            return Err(AnalysisError::InvalidFftSize { fft_size });
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let window = (0..fft_size)
            .map(|i| {
                0.5 * (1.0
                    - ((2.0 * std::f32::consts::PI * i as f32) / (fft_size as f32 - 1.0)).cos())
            })
            .collect();

        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Ok(Self {
            fft,
            fft_size,
            window,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// A silent frame sized for this writer
    pub fn new_frame(&self) -> FrequencyFrame {
        FrequencyFrame::new(self.fft_size)
    }

    /// Window and transform `audio` into `frame`
    ///
    /// Samples beyond `fft_size` are ignored; a shorter input is zero-padded.
    ///
    /// # Arguments
    /// * `audio` - Time-domain window (length <= fft_size)
    /// * `frame` - Destination frame, created for this FFT size
    ///
    /// # Returns
    /// `UnsupportedResize` if the frame was sized for a different FFT
    pub fn write(&mut self, audio: &[f32], frame: &mut FrequencyFrame) -> Result<(), AnalysisError> {
        if frame.samples() != self.fft_size {
            return Err(AnalysisError::UnsupportedResize {
                allocated: self.fft_size.saturating_sub(2) >> 1,
                requested: frame.bin_count(),
            });
        }

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = audio.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let half = self.fft_size / 2;
        let spectrum = frame.overwrite_rectangular();
        *spectrum.dc = self.buffer[0].re;
        *spectrum.nyquist = self.buffer.get(half).map(|c| c.re).unwrap_or(0.0);
        for (bin, value) in spectrum.bins.iter_mut().zip(self.buffer.iter().skip(1)) {
            bin.real = value.re;
            bin.imag = value.im;
        }
        Ok(())
    }
}
