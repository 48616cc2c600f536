//! # Palette Error-Diffusion Dithering
//!
//! This module converts an 8-bit grayscale surface into a surface that only
//! contains intensities the printer can reproduce (the [`Palette`]).
//!
//! ## Algorithm
//!
//! Rows are visited top to bottom. For every pixel:
//!
//! 1. Pure black (0) and pure white (255) in the *original* image are copied
//!    through untouched and diffuse nothing. Flat regions stay flat.
//! 2. Otherwise the *working* value is snapped to the nearest palette entry.
//! 3. The quantization error is spread to unvisited neighbours through the
//!    [`Kernel`] taps, each update rounded once and clamped to `0..=255`.
//!
//! ## Serpentine Scanning
//!
//! ```text
//! row 0  ──────────────►
//! row 1  ◄──────────────   (kernel mirrored: dx → -dx)
//! row 2  ──────────────►
//! ```
//!
//! Only the horizontal tap offsets are mirrored; `dy` is unchanged.
//!
//! ## Production Kernel
//!
//! ```text
//!              X     .5423  .0533
//!   .0246  .2191  .4715 -.0023 -.1241
//!  -.0065 -.0692  .0168 -.0952 -.0304
//! ```
//!
//! The weights are signed and only approximately sum to 1.0.
//!
//! ## Example
//!
//! ```
//! use image::GrayImage;
//! use multitone::render::dither::{dither, Kernel, Palette};
//!
//! let palette = Palette::new(vec![0, 128, 255]).unwrap();
//! let img = GrayImage::from_raw(2, 1, vec![100, 255]).unwrap();
//!
//! let out = dither(&img, &Kernel::production(), &palette, true);
//! assert_eq!(out.as_raw(), &vec![128, 255]);
//! ```

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MultitoneError;

// ============================================================================
// PALETTE
// ============================================================================

/// Ordered set of intensities the device can reproduce.
///
/// Values are strictly increasing. Lookups break ties toward the lower index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Palette(Vec<u8>);

/// Intensities measured on the production printer and paper.
const PRODUCTION_VALUES: [u8; 11] = [0, 9, 45, 54, 98, 107, 157, 210, 242, 251, 255];

impl Palette {
    /// Build a palette, rejecting empty or unordered value lists.
    pub fn new(values: Vec<u8>) -> Result<Self, MultitoneError> {
        if values.is_empty() {
            return Err(MultitoneError::EmptyPalette);
        }
        if let Some(pair) = values.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(MultitoneError::InvalidPalette(format!(
                "values must be strictly increasing, found {} before {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self(values))
    }

    /// The 11-tone palette of the production calibration.
    pub fn production() -> Self {
        Self(PRODUCTION_VALUES.to_vec())
    }

    /// The palette values in ascending order.
    pub fn values(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, value: u8) -> bool {
        self.0.binary_search(&value).is_ok()
    }

    /// Nearest palette value by absolute difference.
    ///
    /// Ties go to the first candidate found by a linear scan, i.e. the
    /// smaller intensity.
    pub fn nearest(&self, value: i16) -> u8 {
        let mut best = self.0[0];
        let mut best_distance = (i16::from(best) - value).abs();

        for &candidate in &self.0[1..] {
            let distance = (i16::from(candidate) - value).abs();
            if distance < best_distance {
                best = candidate;
                best_distance = distance;
            }
        }

        best
    }
}

impl TryFrom<Vec<u8>> for Palette {
    type Error = MultitoneError;

    fn try_from(values: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Palette> for Vec<u8> {
    fn from(palette: Palette) -> Self {
        palette.0
    }
}

// ============================================================================
// DIFFUSION KERNEL
// ============================================================================

/// One error-diffusion tap, in left-to-right orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tap {
    pub dx: i32,
    pub dy: i32,
    pub weight: f64,
}

impl Tap {
    pub const fn new(dx: i32, dy: i32, weight: f64) -> Self {
        Self { dx, dy, weight }
    }
}

/// Calibrated 12-tap kernel for multi-tone receipt printing.
const PRODUCTION_TAPS: [Tap; 12] = [
    Tap::new(1, 0, 0.5423),
    Tap::new(2, 0, 0.0533),
    Tap::new(-2, 1, 0.0246),
    Tap::new(-1, 1, 0.2191),
    Tap::new(0, 1, 0.4715),
    Tap::new(1, 1, -0.0023),
    Tap::new(2, 1, -0.1241),
    Tap::new(-2, 2, -0.0065),
    Tap::new(-1, 2, -0.0692),
    Tap::new(0, 2, 0.0168),
    Tap::new(1, 2, -0.0952),
    Tap::new(2, 2, -0.0304),
];

/// Ordered list of diffusion taps.
///
/// Every tap points forward in scan order: `dy >= 0`, and taps on the
/// current row (`dy == 0`) have `dx > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tap>", into = "Vec<Tap>")]
pub struct Kernel {
    taps: Vec<Tap>,
}

impl Kernel {
    /// Build a kernel, rejecting taps that would reach finalized pixels.
    pub fn new(taps: Vec<Tap>) -> Result<Self, MultitoneError> {
        for tap in &taps {
            if tap.dy < 0 {
                return Err(MultitoneError::InvalidKernel(format!(
                    "tap ({}, {}) points at a previous row",
                    tap.dx, tap.dy
                )));
            }
            if tap.dy == 0 && tap.dx <= 0 {
                return Err(MultitoneError::InvalidKernel(format!(
                    "tap ({}, {}) on the current row must point right",
                    tap.dx, tap.dy
                )));
            }
            if !tap.weight.is_finite() {
                return Err(MultitoneError::InvalidKernel(format!(
                    "tap ({}, {}) has non-finite weight",
                    tap.dx, tap.dy
                )));
            }
        }
        Ok(Self { taps })
    }

    /// The calibrated kernel used for production prints.
    pub fn production() -> Self {
        Self {
            taps: PRODUCTION_TAPS.to_vec(),
        }
    }

    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Sum of all weights (close to 1.0 for a well-behaved kernel).
    pub fn total_weight(&self) -> f64 {
        self.taps.iter().map(|tap| tap.weight).sum()
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::production()
    }
}

impl TryFrom<Vec<Tap>> for Kernel {
    type Error = MultitoneError;

    fn try_from(taps: Vec<Tap>) -> Result<Self, Self::Error> {
        Self::new(taps)
    }
}

impl From<Kernel> for Vec<Tap> {
    fn from(kernel: Kernel) -> Self {
        kernel.taps
    }
}

// ============================================================================
// DITHERING
// ============================================================================

/// Dither `original` down to `palette` intensities.
///
/// The original stays read-only (it decides the black/white pass-through);
/// diffusion happens on a private working copy. Deterministic: the same
/// inputs always give the same output.
pub fn dither(original: &GrayImage, kernel: &Kernel, palette: &Palette, serpentine: bool) -> GrayImage {
    let (width, height) = original.dimensions();
    debug!(
        width,
        height,
        taps = kernel.len(),
        palette = palette.len(),
        serpentine,
        "Dithering surface"
    );

    let w = width as usize;
    let h = height as usize;
    let source = original.as_raw();
    let mut working: Vec<i16> = source.iter().map(|&v| i16::from(v)).collect();
    let mut output = GrayImage::new(width, height);

    {
        let out: &mut [u8] = &mut output;
        let mut reversed = false;

        for y in 0..h {
            for step in 0..w {
                let x = if reversed { w - 1 - step } else { step };
                let idx = y * w + x;

                let value = source[idx];
                if value == u8::MIN || value == u8::MAX {
                    out[idx] = value;
                    continue;
                }

                let old = working[idx];
                let new = palette.nearest(old);
                out[idx] = new;

                let error = f64::from(old - i16::from(new));
                for tap in kernel.taps() {
                    let dx = if reversed { -tap.dx } else { tap.dx };
                    let tx = x as i64 + i64::from(dx);
                    let ty = y as i64 + i64::from(tap.dy);
                    if tx < 0 || tx >= w as i64 || ty >= h as i64 {
                        continue;
                    }

                    let target = ty as usize * w + tx as usize;
                    let delta = (error * tap.weight).round_ties_even() as i32;
                    working[target] = (i32::from(working[target]) + delta).clamp(0, 255) as i16;
                }
            }

            if serpentine {
                reversed = !reversed;
            }
        }
    }

    debug!("Dithering complete");
    output
}

// ============================================================================
// TESTS
// ============================================================================
