//! # Slice Chunking
//!
//! Splits an image height into consecutive bands that each fit one set of
//! `GS 8 L` commands.
//!
//! ## Problem
//!
//! The printer accepts up to 415 rows per raster command, but slices that
//! tall print with visible banding. Slices of at most half that height (100
//! by default) print cleanly.
//!
//! ## Layout
//!
//! ```text
//! height = 250, max_rows = 100
//!
//! rows   0 ┬─────────┐
//!          │ slice 0 │ 100 rows
//!      100 ┼─────────┤
//!          │ slice 1 │ 100 rows
//!      200 ┼─────────┤
//!          │ slice 2 │  50 rows
//!      250 ┴─────────┘
//! ```

use crate::error::MultitoneError;

/// Half-open row range `start..end` of one slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: u32,
    pub end: u32,
}

impl Slice {
    pub fn height(&self) -> u32 {
        self.end - self.start
    }
}

/// Iterator over the slices of an image, top to bottom.
#[derive(Debug, Clone)]
pub struct Slices {
    next: u32,
    height: u32,
    max_rows: u32,
}

impl Iterator for Slices {
    type Item = Slice;

    fn next(&mut self) -> Option<Slice> {
        if self.next >= self.height {
            return None;
        }
        let start = self.next;
        let end = start.saturating_add(self.max_rows).min(self.height);
        self.next = end;
        Some(Slice { start, end })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.height - self.next.min(self.height)).div_ceil(self.max_rows) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Slices {}

/// Partition `0..height` into slices of at most `max_rows` rows.
///
/// The last slice holds the remainder. A zero `max_rows` is a configuration
/// error.
///
/// ```
/// use multitone::pipeline::chunking::slices;
///
/// let heights: Vec<u32> = slices(250, 100).unwrap().map(|s| s.height()).collect();
/// assert_eq!(heights, vec![100, 100, 50]);
/// ```
pub fn slices(height: u32, max_rows: u32) -> Result<Slices, MultitoneError> {
    if max_rows == 0 {
        return Err(MultitoneError::Config(
            "lines per chunk must be at least 1".to_string(),
        ));
    }
    Ok(Slices {
        next: 0,
        height,
        max_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_max_rows_rejected() {
        assert!(matches!(slices(10, 0), Err(MultitoneError::Config(_))));
    }

    #[test]
    fn test_single_short_slice() {
        let all: Vec<Slice> = slices(50, 100).unwrap().collect();
        assert_eq!(all, vec![Slice { start: 0, end: 50 }]);
    }

    #[test]
    fn test_exact_multiple() {
        let all: Vec<Slice> = slices(300, 100).unwrap().collect();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2], Slice { start: 200, end: 300 });
    }

    #[test]
    fn test_empty_height() {
        assert_eq!(slices(0, 100).unwrap().count(), 0);
    }

    #[test]
    fn test_slices_cover_height_without_gaps() {
        for height in [1u32, 7, 99, 100, 101, 415, 1000] {
            for max_rows in [1u32, 3, 100, 207, 500] {
                let all: Vec<Slice> = slices(height, max_rows).unwrap().collect();

                let mut expected_start = 0;
                for slice in &all {
                    assert_eq!(slice.start, expected_start);
                    assert!(slice.height() >= 1 && slice.height() <= max_rows);
                    expected_start = slice.end;
                }
                assert_eq!(expected_start, height);

                let remainder = height % max_rows;
                let last = all.last().unwrap().height();
                assert_eq!(last, if remainder == 0 { max_rows } else { remainder });
            }
        }
    }

    #[test]
    fn test_size_hint() {
        let iter = slices(250, 100).unwrap();
        assert_eq!(iter.len(), 3);
    }
}
