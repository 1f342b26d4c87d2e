// Frame module - frequency-domain frame with lazily converted coordinates
//
// A frame packs one FFT analysis frame into `samples` floats:
//
//   [dc, nyquist, b0.0, b0.1, b1.0, b1.1, ...]
//
// where each bin pair is (real, imag) or (magnitude, phase) depending on the
// coordinate tag. DC and Nyquist are plain real scalars in both forms.
// Conversion rewrites the bin pairs in place and flips the tag; asking for the
// form the frame is already in does no work.

mod coord;

use crate::error::AnalysisError;

pub use coord::{fast_atan2, fast_sin_cos, warm_tables, PolarBin, RectBin};

/// Coordinate form currently held by a frame's bin storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coord {
    Rectangular,
    Polar,
}

/// Mutable view of a frame in rectangular form
#[derive(Debug)]
pub struct ComplexSpectrum<'a> {
    pub dc: &'a mut f32,
    pub nyquist: &'a mut f32,
    pub bins: &'a mut [RectBin],
}

/// Mutable view of a frame in polar form
#[derive(Debug)]
pub struct PolarSpectrum<'a> {
    pub dc: &'a mut f32,
    pub nyquist: &'a mut f32,
    pub bins: &'a mut [PolarBin],
}

/// One frequency-domain analysis frame
///
/// Frames are normally owned by a [`FrameBank`](crate::host::FrameBank) and
/// lent to analyzers for the duration of a single call.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyFrame {
    samples: usize,
    data: Vec<f32>,
    coord: Coord,
}

impl FrequencyFrame {
    /// Create a silent rectangular frame for an FFT of `samples` points
    pub fn new(samples: usize) -> Self {
        Self {
            samples,
            data: vec![0.0; samples.max(2)],
            coord: Coord::Rectangular,
        }
    }

    /// Build a rectangular frame from explicit edge values and bins
    pub fn from_rectangular(dc: f32, nyquist: f32, bins: &[RectBin]) -> Self {
        let mut frame = Self::new(bins.len() * 2 + 2);
        let spectrum = frame.overwrite_rectangular();
        *spectrum.dc = dc;
        *spectrum.nyquist = nyquist;
        spectrum.bins.copy_from_slice(bins);
        frame
    }

    /// Build a polar frame from explicit edge values and bins
    pub fn from_polar(dc: f32, nyquist: f32, bins: &[PolarBin]) -> Self {
        let mut frame = Self::new(bins.len() * 2 + 2);
        frame.coord = Coord::Polar;
        let spectrum = frame.to_polar();
        *spectrum.dc = dc;
        *spectrum.nyquist = nyquist;
        spectrum.bins.copy_from_slice(bins);
        frame
    }

    /// Total frame sample count (the FFT size this frame came from)
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Number of bins strictly between DC and Nyquist
    pub fn bin_count(&self) -> usize {
        self.samples.saturating_sub(2) >> 1
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn dc(&self) -> f32 {
        self.data[0]
    }

    pub fn nyquist(&self) -> f32 {
        self.data[1]
    }

    /// Convert to polar form (memoized) and borrow the bins
    pub fn to_polar(&mut self) -> PolarSpectrum<'_> {
        let convert = self.coord == Coord::Rectangular;
        self.coord = Coord::Polar;
        let (dc, nyquist, pairs) = self.parts();
        let bins: &mut [PolarBin] = bytemuck::cast_slice_mut(pairs);
        if convert {
            for bin in bins.iter_mut() {
                *bin = bytemuck::cast::<PolarBin, RectBin>(*bin).to_polar_apx();
            }
        }
        PolarSpectrum { dc, nyquist, bins }
    }

    /// Convert to rectangular form (memoized) and borrow the bins
    pub fn to_complex(&mut self) -> ComplexSpectrum<'_> {
        let convert = self.coord == Coord::Polar;
        self.coord = Coord::Rectangular;
        let (dc, nyquist, pairs) = self.parts();
        let bins: &mut [RectBin] = bytemuck::cast_slice_mut(pairs);
        if convert {
            for bin in bins.iter_mut() {
                *bin = bytemuck::cast::<RectBin, PolarBin>(*bin).to_complex_apx();
            }
        }
        ComplexSpectrum { dc, nyquist, bins }
    }

    /// Tag the frame rectangular without converting, for writers that are
    /// about to replace every value (e.g. a fresh FFT result).
    pub fn overwrite_rectangular(&mut self) -> ComplexSpectrum<'_> {
        self.coord = Coord::Rectangular;
        let (dc, nyquist, pairs) = self.parts();
        ComplexSpectrum {
            dc,
            nyquist,
            bins: bytemuck::cast_slice_mut(pairs),
        }
    }

    fn parts(&mut self) -> (&mut f32, &mut f32, &mut [f32]) {
        let pair_len = self.bin_count() * 2;
        let (edges, rest) = self.data.split_at_mut(2);
        let (dc, nyquist) = edges.split_at_mut(1);
        (&mut dc[0], &mut nyquist[0], &mut rest[..pair_len])
    }
}

/// Two frames resolved for a two-buffer analyzer
///
/// When both selectors name the same slot the frame is lent once as
/// `Aliased`, so a frame can be compared with itself.
#[derive(Debug)]
pub enum FramePair<'a> {
    Aliased(&'a mut FrequencyFrame),
    Distinct(&'a mut FrequencyFrame, &'a mut FrequencyFrame),
}

impl FramePair<'_> {
    /// Fail with `BinCountMismatch` unless both frames have the same bin count
    pub fn ensure_same_size(&self) -> Result<usize, AnalysisError> {
        match self {
            FramePair::Aliased(frame) => Ok(frame.bin_count()),
            FramePair::Distinct(first, second) if first.bin_count() == second.bin_count() => {
                Ok(first.bin_count())
            }
            FramePair::Distinct(first, second) => Err(AnalysisError::BinCountMismatch {
                first: first.bin_count(),
                second: second.bin_count(),
            }),
        }
    }
}
