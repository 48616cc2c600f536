//! # Bitplane Packing
//!
//! Splits a 4-bit level surface into four 1-bit planes, one per level bit.
//!
//! ## Plane Order
//!
//! | Plane | Level bit | Color code |
//! |-------|-----------|------------|
//! | 0 | bit 3 (8) | `'1'` (49) |
//! | 1 | bit 2 (4) | `'2'` (50) |
//! | 2 | bit 1 (2) | `'3'` (51) |
//! | 3 | bit 0 (1) | `'4'` (52) |
//!
//! ## Bit Packing
//!
//! Each plane row is padded to whole bytes, MSB = leftmost dot:
//!
//! ```text
//! levels:  15  8  0  4  1 ...
//! plane 0:  1  1  0  0  0 ...   (bit 3)
//! plane 1:  1  0  0  1  0 ...   (bit 2)
//! ```
//!
//! ## Example
//!
//! ```
//! use multitone::render::{bitplane, LevelSurface};
//!
//! let levels = LevelSurface::from_fn(8, 1, |x, _| if x == 0 { 15 } else { 1 });
//! let planes = bitplane::pack(&levels, 0, 1);
//!
//! assert_eq!(planes[0], vec![0b1000_0000]);
//! assert_eq!(planes[3], vec![0b1111_1111]);
//! ```

use super::calibration::LevelSurface;

/// Number of bitplanes in a multi-tone image.
pub const PLANE_COUNT: usize = 4;

/// The four planes of one slice, most significant first.
pub type Bitplanes = [Vec<u8>; PLANE_COUNT];

/// Bytes per packed row for a given width in dots.
#[inline]
pub fn row_bytes(width: u32) -> usize {
    (width as usize).div_ceil(8)
}

/// Pack rows `y_start..y_end` of `levels` into four bitplanes.
///
/// Each plane holds `row_bytes(width) * (y_end - y_start)` bytes addressed by
/// slice-relative row. Padding bits are zero. Calls share no state, so slices
/// can be packed in parallel.
pub fn pack(levels: &LevelSurface, y_start: u32, y_end: u32) -> Bitplanes {
    debug_assert!(y_start <= y_end && y_end <= levels.height());

    let stride = row_bytes(levels.width());
    let rows = (y_end - y_start) as usize;
    let mut planes: Bitplanes = std::array::from_fn(|_| vec![0u8; stride * rows]);

    for (local_y, y) in (y_start..y_end).enumerate() {
        let row_offset = local_y * stride;
        for (x, &level) in levels.row(y).iter().enumerate() {
            let byte = row_offset + x / 8;
            let mask = 1u8 << (7 - (x % 8));
            for (p, plane) in planes.iter_mut().enumerate() {
                if level & (0b1000 >> p) != 0 {
                    plane[byte] |= mask;
                }
            }
        }
    }

    planes
}

/// Rebuild the levels of a packed slice (inverse of [`pack`]).
///
/// Returns `width * rows` levels; padding bits are ignored.
pub fn unpack(planes: &Bitplanes, width: u32, rows: u32) -> Vec<u8> {
    let stride = row_bytes(width);
    let mut levels = Vec::with_capacity(width as usize * rows as usize);

    for y in 0..rows as usize {
        for x in 0..width as usize {
            let byte = y * stride + x / 8;
            let shift = 7 - (x % 8);
            let level = planes
                .iter()
                .enumerate()
                .fold(0u8, |acc, (p, plane)| acc | (((plane[byte] >> shift) & 1) << (3 - p)));
            levels.push(level);
        }
    }

    levels
}
