// Coord module - bin representations and fast coordinate conversion
//
// Bins are stored as packed f32 pairs. The same storage is read either as
// (real, imag) or as (magnitude, phase) depending on the frame's coordinate
// tag, so both bin types are plain-old-data with identical layout.
//
// Conversion accuracy:
// - magnitude: exact Euclidean norm
// - phase: polynomial atan2 approximation, |error| < 1e-4 rad
// - polar -> rectangular: interpolated sine table, |error| < 1e-5

use bytemuck::{Pod, Zeroable};
use once_cell::sync::Lazy;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Number of table steps per full turn
const SINE_TABLE_SIZE: usize = 8192;

/// One full sine period plus a guard sample for interpolation
static SINE_TABLE: Lazy<Vec<f32>> = Lazy::new(|| {
    (0..=SINE_TABLE_SIZE)
        .map(|i| (TAU * i as f32 / SINE_TABLE_SIZE as f32).sin())
        .collect()
});

/// Build lookup tables ahead of the real-time path.
///
/// The first polar-to-rectangular conversion would otherwise allocate the
/// sine table inside an analyzer call.
pub fn warm_tables() {
    Lazy::force(&SINE_TABLE);
}

/// Bin in rectangular form
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RectBin {
    pub real: f32,
    pub imag: f32,
}

/// Bin in polar form
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PolarBin {
    pub mag: f32,
    pub phase: f32,
}

impl RectBin {
    pub fn new(real: f32, imag: f32) -> Self {
        Self { real, imag }
    }

    /// Euclidean magnitude
    #[inline]
    pub fn norm(&self) -> f32 {
        (self.real * self.real + self.imag * self.imag).sqrt()
    }

    /// Approximate polar form (exact magnitude, approximated phase)
    #[inline]
    pub fn to_polar_apx(self) -> PolarBin {
        PolarBin {
            mag: self.norm(),
            phase: fast_atan2(self.imag, self.real),
        }
    }
}

impl PolarBin {
    pub fn new(mag: f32, phase: f32) -> Self {
        Self { mag, phase }
    }

    /// Approximate rectangular form via the sine table
    #[inline]
    pub fn to_complex_apx(self) -> RectBin {
        let (sin, cos) = fast_sin_cos(self.phase);
        RectBin {
            real: self.mag * cos,
            imag: self.mag * sin,
        }
    }
}

/// Polynomial atan2 approximation
///
/// Octant reduction followed by a degree-9 odd polynomial for atan on [0, 1].
/// Returns an angle in [-PI, PI]; `fast_atan2(0, 0)` is 0.
#[inline]
pub fn fast_atan2(y: f32, x: f32) -> f32 {
    let (abs_x, abs_y) = (x.abs(), y.abs());
    if abs_x == 0.0 && abs_y == 0.0 {
        return 0.0;
    }

    let z = abs_x.min(abs_y) / abs_x.max(abs_y);
    let s = z * z;
    let mut angle =
        z * (0.999_866 + s * (-0.330_299_5 + s * (0.180_141 + s * (-0.085_133 + s * 0.020_835_1))));

    if abs_y > abs_x {
        angle = FRAC_PI_2 - angle;
    }
    if x < 0.0 {
        angle = PI - angle;
    }
    if y < 0.0 {
        -angle
    } else {
        angle
    }
}

/// Table-driven (sin, cos) with linear interpolation
///
/// Any finite phase is accepted; non-finite phases map to angle 0.
#[inline]
pub fn fast_sin_cos(phase: f32) -> (f32, f32) {
    let phase = if phase.is_finite() { phase } else { 0.0 };
    let table = &*SINE_TABLE;
    let turns = phase / TAU;
    let position = (turns - turns.floor()) * SINE_TABLE_SIZE as f32;

    (
        lookup(table, position),
        lookup(table, position + (SINE_TABLE_SIZE / 4) as f32),
    )
}

#[inline]
fn lookup(table: &[f32], position: f32) -> f32 {
    let index = (position as usize).min(SINE_TABLE_SIZE * 2 - 1);
    let frac = position - index as f32;
    let index = index % SINE_TABLE_SIZE;
    table[index] + (table[index + 1] - table[index]) * frac
}
