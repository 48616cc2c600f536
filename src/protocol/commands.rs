//! # ESC/POS Control Commands
//!
//! Printer setup and paper-handling commands used around multi-tone graphics.
//!
//! ## Command Families
//!
//! | Prefix | Function | Purpose |
//! |--------|----------|---------|
//! | `GS ( K` | 97, 50 | Print control: head energizing, print speed |
//! | `GS ( L` | 50 | Print graphics data stored by `GS 8 L` |
//! | `GS V` | 65 | Feed and cut |
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`
//! - `u32` value 0x00012345 is sent as bytes `[0x45, 0x23, 0x01, 0x00]`

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// GS (Group Separator) - Prefix for every command in this crate
///
/// Hex: 0x1D, Decimal: 29
pub const GS: u8 = 0x1D;

/// Print-control function selecting the head energizing mode (`GS ( K` fn 97).
pub const FN_HEAD_ENERGIZING: u8 = 0x61;

/// Print-control function selecting the print speed (`GS ( K` fn 50).
pub const FN_PRINT_SPEED: u8 = 0x32;

/// `GS V` function: feed to the cutting position, then cut.
pub const CUT_FEED_FULL: u8 = 65;

// ============================================================================
// PRINT CONTROL
// ============================================================================

/// # Select Head Energizing Mode (GS ( K pL pH fn n)
///
/// Controls how many head blocks are energized at once. Multi-tone prints
/// band visibly unless a single head block is energized at a time.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS ( K 2 0 a n |
/// | Hex     | 1D 28 4B 02 00 61 n |
///
/// ## Parameters
///
/// - `n`: 0 = printer default, 1 = single-head energizing, 2 = two-part
///
/// ## Example
///
/// ```
/// use multitone::protocol::commands;
///
/// assert_eq!(
///     commands::head_energizing(1),
///     vec![0x1D, 0x28, 0x4B, 0x02, 0x00, 0x61, 0x01]
/// );
/// ```
#[inline]
pub fn head_energizing(mode: u8) -> Vec<u8> {
    vec![GS, b'(', b'K', 0x02, 0x00, FN_HEAD_ENERGIZING, mode]
}

/// # Select Print Speed (GS ( K pL pH fn m)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS ( K 2 0 2 m |
/// | Hex     | 1D 28 4B 02 00 32 m |
///
/// ## Parameters
///
/// - `m`: 0 = printer default, 1 = slowest ... 9 (or 13) = fastest
///
/// The slowest speed gives the head time to reach each tone and is strongly
/// recommended for multi-tone output.
#[inline]
pub fn print_speed(speed: u8) -> Vec<u8> {
    vec![GS, b'(', b'K', 0x02, 0x00, FN_PRINT_SPEED, speed]
}

// ============================================================================
// GRAPHICS BUFFER
// ============================================================================

/// # Print Graphics Data in Print Buffer (GS ( L pL pH m fn)
///
/// Prints everything stored by the preceding `GS 8 L` raster commands. Sent
/// once per slice, after its four bitplanes.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS ( L 2 0 0 2 |
/// | Hex     | 1D 28 4C 02 00 30 02 |
///
/// ## Example
///
/// ```
/// use multitone::protocol::commands;
///
/// assert_eq!(commands::print_stored(), vec![0x1D, 0x28, 0x4C, 0x02, 0x00, 0x30, 0x02]);
/// ```
#[inline]
pub fn print_stored() -> Vec<u8> {
    vec![GS, b'(', b'L', 0x02, 0x00, b'0', 0x02]
}

// ============================================================================
// CUTTING
// ============================================================================

/// # Feed and Cut (GS V m n)
///
/// Feeds paper to the cutting position plus `n` vertical motion units, then
/// cuts.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS V A n |
/// | Hex     | 1D 56 41 n |
///
/// ## Example
///
/// ```
/// use multitone::protocol::commands;
///
/// assert_eq!(commands::feed_and_cut(0), vec![0x1D, 0x56, 0x41, 0x00]);
/// ```
#[inline]
pub fn feed_and_cut(feed: u8) -> Vec<u8> {
    vec![GS, b'V', CUT_FEED_FULL, feed]
}

// ============================================================================
// ENCODING HELPERS
// ============================================================================

/// Encode a u16 as little-endian bytes.
///
/// ```
/// use multitone::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(512), [0x00, 0x02]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Encode a u32 as little-endian bytes.
#[inline]
pub const fn u32_le(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_energizing() {
        assert_eq!(head_energizing(1), vec![0x1D, 0x28, 0x4B, 0x02, 0x00, 0x61, 1]);
        assert_eq!(head_energizing(2)[6], 2);
    }

    #[test]
    fn test_print_speed() {
        assert_eq!(print_speed(1), vec![0x1D, 0x28, 0x4B, 0x02, 0x00, 0x32, 1]);
        assert_eq!(print_speed(9)[6], 9);
    }

    #[test]
    fn test_print_stored() {
        assert_eq!(print_stored(), vec![0x1D, 0x28, 0x4C, 0x02, 0x00, 0x30, 0x02]);
    }

    #[test]
    fn test_feed_and_cut() {
        assert_eq!(feed_and_cut(0), vec![0x1D, 0x56, 65, 0]);
        assert_eq!(feed_and_cut(100), vec![0x1D, 0x56, 65, 100]);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x00FF), [0xFF, 0x00]);
        assert_eq!(u16_le(0xFF00), [0x00, 0xFF]);
        assert_eq!(u16_le(256), [0x00, 0x01]);
    }

    #[test]
    fn test_u32_le() {
        assert_eq!(u32_le(1610), [0x4A, 0x06, 0x00, 0x00]);
        assert_eq!(u32_le(0x0102_0304), [0x04, 0x03, 0x02, 0x01]);
    }
}
