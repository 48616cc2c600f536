//! # Calibration Mapping
//!
//! Maps every dithered intensity to the 4-bit print level that reproduces it.
//!
//! The production table was measured by printing all 16 levels (see
//! [`patterns::level_strip`](super::patterns::level_strip)), scanning the
//! receipt, and mapping the average darkness of each square onto `0..=255`.
//! Levels 0-3 and 14 are too close to their neighbours to be useful and are
//! left out.
//!
//! ```text
//! intensity:  0   9  45  54  98 107 157 210 242 251 255
//! level:     15  13  12  11  10   9   8   7   6   5   4
//! ```

use std::collections::BTreeMap;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dither::Palette;
use crate::error::MultitoneError;

/// Highest level a multi-tone pixel can carry (4 bit planes).
pub const MAX_LEVEL: u8 = 15;

const PRODUCTION_ENTRIES: [(u8, u8); 11] = [
    (0, 15),
    (9, 13),
    (45, 12),
    (54, 11),
    (98, 10),
    (107, 9),
    (157, 8),
    (210, 7),
    (242, 6),
    (251, 5),
    (255, 4),
];

/// Mapping from palette intensity to print level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u8, u8>", into = "BTreeMap<u8, u8>")]
pub struct CalibrationTable {
    entries: BTreeMap<u8, u8>,
}

impl CalibrationTable {
    /// Build a table, rejecting levels above [`MAX_LEVEL`].
    pub fn new(entries: BTreeMap<u8, u8>) -> Result<Self, MultitoneError> {
        if let Some((intensity, level)) = entries.iter().find(|(_, level)| **level > MAX_LEVEL) {
            return Err(MultitoneError::InvalidCalibration(format!(
                "intensity {} maps to level {}, maximum is {}",
                intensity, level, MAX_LEVEL
            )));
        }
        Ok(Self { entries })
    }

    /// The measured table for the production palette.
    pub fn production() -> Self {
        Self {
            entries: PRODUCTION_ENTRIES.into_iter().collect(),
        }
    }

    pub fn level(&self, intensity: u8) -> Option<u8> {
        self.entries.get(&intensity).copied()
    }

    /// Iterate `(intensity, level)` pairs in ascending intensity order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.entries.iter().map(|(&k, &v)| (k, v))
    }

    /// The intensities the table covers, as a palette.
    pub fn palette(&self) -> Result<Palette, MultitoneError> {
        Palette::new(self.entries.keys().copied().collect())
    }

    /// Check that the table covers exactly the palette's values.
    pub fn check_palette(&self, palette: &Palette) -> Result<(), MultitoneError> {
        if let Some(&missing) = palette.values().iter().find(|&&v| !self.entries.contains_key(&v)) {
            return Err(MultitoneError::MissingCalibration(missing));
        }
        if let Some(extra) = self.entries.keys().find(|v| !palette.contains(**v)) {
            return Err(MultitoneError::InvalidCalibration(format!(
                "intensity {} is not in the palette",
                extra
            )));
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<u8, u8>> for CalibrationTable {
    type Error = MultitoneError;

    fn try_from(entries: BTreeMap<u8, u8>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<CalibrationTable> for BTreeMap<u8, u8> {
    fn from(table: CalibrationTable) -> Self {
        table.entries
    }
}

/// Row-major surface of print levels (`0..=15`), one per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSurface {
    width: u32,
    height: u32,
    levels: Vec<u8>,
}

impl LevelSurface {
    pub fn new(width: u32, height: u32, levels: Vec<u8>) -> Result<Self, MultitoneError> {
        let expected = width as usize * height as usize;
        if levels.len() != expected {
            return Err(MultitoneError::Input(format!(
                "level surface {}x{} needs {} values, got {}",
                width,
                height,
                expected,
                levels.len()
            )));
        }
        if let Some(&level) = levels.iter().find(|&&l| l > MAX_LEVEL) {
            return Err(MultitoneError::Input(format!(
                "level {} exceeds maximum {}",
                level, MAX_LEVEL
            )));
        }
        Ok(Self {
            width,
            height,
            levels,
        })
    }

    /// Build a surface from a per-pixel function. Levels are masked to 4 bits.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Self {
        let mut levels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                levels.push(f(x, y) & MAX_LEVEL);
            }
        }
        Self {
            width,
            height,
            levels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.levels[y as usize * self.width as usize + x as usize]
    }

    /// Levels of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.levels[start..start + w]
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.levels
    }
}

/// Translate a dithered surface into print levels.
///
/// Fails with [`MultitoneError::MissingCalibration`] on the first pixel whose
/// intensity has no table entry, which means the palette used for dithering
/// does not match the table.
pub fn map_levels(surface: &GrayImage, table: &CalibrationTable) -> Result<LevelSurface, MultitoneError> {
    let (width, height) = surface.dimensions();
    debug!(width, height, entries = table.entries.len(), "Applying calibration table");

    let mut lut = [None; 256];
    for (intensity, level) in table.iter() {
        lut[intensity as usize] = Some(level);
    }

    let levels = surface
        .as_raw()
        .iter()
        .map(|&v| lut[v as usize].ok_or(MultitoneError::MissingCalibration(v)))
        .collect::<Result<Vec<u8>, _>>()?;

    Ok(LevelSurface {
        width,
        height,
        levels,
    })
}
