//! # Multi-Tone Raster Graphics (GS 8 L)
//!
//! Stores one bitplane of a multi-tone raster image in the printer's graphics
//! buffer. A slice is sent as four of these frames (one per level bit, most
//! significant first) followed by [`print_stored`](super::commands::print_stored).
//!
//! ## Frame Layout
//!
//! ```text
//! ┌──────────┬─────────────┬───────┬────┬───────┬───────┬──────┬──────┬─────────┐
//! │ 1D 38 4C │ p1 p2 p3 p4 │ 30 70 │ 34 │ 01 01 │ color │ xL xH│ yL yH│ d1...dk │
//! └──────────┴─────────────┴───────┴────┴───────┴───────┴──────┴──────┴─────────┘
//!   GS 8 L     length (LE)   m fn    a    bx by     c     width  height  plane
//! ```
//!
//! - `length = 10 + k`: counts everything after the length field
//! - `a = 52` (`'4'`): multi-tone mode
//! - `bx by = 1 1`: no horizontal or vertical scaling
//! - `c`: color code `'1'`..`'4'` (49..52)
//! - `k = ceil(width / 8) × height`
//!
//! ## Slice Layout
//!
//! ```text
//! [frame '1'] [frame '2'] [frame '3'] [frame '4'] [GS ( L ... 30 02]
//!    bit 3       bit 2       bit 1       bit 0       print stored
//! ```
//!
//! Slices are kept well below the documented per-command limit of 415 rows;
//! taller slices band visibly.

use super::commands::{GS, print_stored, u16_le, u32_le};
use crate::render::bitplane::{Bitplanes, PLANE_COUNT, row_bytes};

/// `GS 8 L` opcode prefix.
pub const OPCODE: [u8; 3] = [GS, b'8', b'L'];

/// Bytes counted by the length field besides the plane data.
pub const PARAM_LEN: usize = 10;

/// Opcode + length field + parameters.
pub const HEADER_LEN: usize = OPCODE.len() + 4 + PARAM_LEN;

/// `m fn`: function 112, store raster graphics.
pub const FN_STORE_RASTER: [u8; 2] = [0x30, 0x70];

/// Tone mode `a`: multiple tone.
pub const MODE_MULTITONE: u8 = 52;

/// Color codes in plane order, most significant bit first.
pub const COLOR_CODES: [u8; PLANE_COUNT] = [b'1', b'2', b'3', b'4'];

/// # Store Multi-Tone Raster Plane (GS 8 L p1 p2 p3 p4 m fn a bx by c xL xH yL yH d1...dk)
///
/// Builds one frame holding a single bitplane.
///
/// ## Parameters
///
/// - `color`: Color code (`b'1'`..`b'4'`) naming which level bit `data` holds
/// - `width_dots`: Image width in dots
/// - `height`: Rows in this frame
/// - `data`: Packed plane, `ceil(width_dots / 8) * height` bytes
///
/// ## Example
///
/// ```
/// use multitone::protocol::graphics;
///
/// let data = vec![0xAA; 32 * 50];
/// let cmd = graphics::raster_plane(b'1', 256, 50, &data);
///
/// assert_eq!(&cmd[0..3], &[0x1D, 0x38, 0x4C]);
/// // length = 10 + 1600 = 1610 = 0x064A
/// assert_eq!(&cmd[3..7], &[0x4A, 0x06, 0x00, 0x00]);
/// assert_eq!(cmd[12], b'1');
/// assert_eq!(cmd.len(), 17 + 1600);
/// ```
pub fn raster_plane(color: u8, width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    debug_assert!(
        data.len() == row_bytes(u32::from(width_dots)) * height as usize,
        "Plane data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        row_bytes(u32::from(width_dots)) * height as usize,
        row_bytes(u32::from(width_dots)),
        height,
        data.len()
    );

    // u16 dimensions bound the payload to ~512 MiB, well inside u32
    let length = (PARAM_LEN + data.len()) as u32;

    let mut cmd = Vec::with_capacity(HEADER_LEN + data.len());
    cmd.extend_from_slice(&OPCODE);
    cmd.extend_from_slice(&u32_le(length));
    cmd.extend_from_slice(&FN_STORE_RASTER);
    cmd.push(MODE_MULTITONE);
    cmd.push(1); // bx: no horizontal scaling
    cmd.push(1); // by: no vertical scaling
    cmd.push(color);
    cmd.extend_from_slice(&u16_le(width_dots));
    cmd.extend_from_slice(&u16_le(height));
    cmd.extend_from_slice(data);
    cmd
}

/// Frame all four planes of one slice and append the print command.
///
/// ```
/// use multitone::protocol::graphics;
///
/// let planes = [vec![0u8; 2], vec![0u8; 2], vec![0u8; 2], vec![0u8; 2]];
/// let bytes = graphics::slice(&planes, 16, 1);
/// assert_eq!(bytes.len(), 4 * (17 + 2) + 7);
/// ```
pub fn slice(planes: &Bitplanes, width_dots: u16, height: u16) -> Vec<u8> {
    let payload: usize = planes.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(PLANE_COUNT * HEADER_LEN + payload + 7);

    for (plane, &color) in planes.iter().zip(COLOR_CODES.iter()) {
        out.extend(raster_plane(color, width_dots, height, plane));
    }
    out.extend(print_stored());
    out
}

// ============================================================================
// TESTS
// ============================================================================
