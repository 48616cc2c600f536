//! # Test Patterns
//!
//! Level surfaces that bypass dithering, for measuring a printer.
//!
//! ## Level Strip
//!
//! Sixteen vertical bands, one per print level, each ending in a one-dot
//! level-0 gap so neighbouring bands stay distinguishable on paper:
//!
//! ```text
//! ┌──────┬┬──────┬┬──────┬┬─── ─ ─ ┬──────┬┐
//! │  0   ││  1   ││  2   ││        │  15  ││
//! └──────┴┴──────┴┴──────┴┴─── ─ ─ ┴──────┴┘
//! ```
//!
//! Scanning the printed strip and averaging each band gives the darkness of
//! every level, which is what a [`CalibrationTable`](super::CalibrationTable)
//! is built from.

use super::calibration::{LevelSurface, MAX_LEVEL};

/// Number of distinct print levels.
pub const LEVEL_COUNT: u32 = MAX_LEVEL as u32 + 1;

/// Sixteen equal bands of levels 0 through 15.
///
/// Band width is `width / 16` (at least one dot); the last column of every
/// band is left at level 0. Columns past the sixteenth band are level 0.
///
/// ```
/// use multitone::render::patterns::level_strip;
///
/// let strip = level_strip(512, 2);
/// assert_eq!(strip.get(0, 0), 0);
/// assert_eq!(strip.get(32, 0), 1);
/// assert_eq!(strip.get(63, 1), 0);
/// assert_eq!(strip.get(510, 1), 15);
/// ```
pub fn level_strip(width: u32, height: u32) -> LevelSurface {
    let band = (width / LEVEL_COUNT).max(1);

    LevelSurface::from_fn(width, height, |x, _| {
        let level = x / band;
        if level >= LEVEL_COUNT || x % band == band - 1 {
            0
        } else {
            level as u8
        }
    })
}
