//! # Printer Configuration
//!
//! Hardware limits of the printer and the calibration profile that describes
//! how it reproduces gray.
//!
//! ## Supported Printers
//!
//! | Model | Width (dots) | Line ceiling | Chunk rows |
//! |-------|--------------|--------------|------------|
//! | Epson 80mm multi-tone | 512 | 415 rows | 100 rows |
//!
//! ## Usage
//!
//! ```
//! use multitone::printer::{CalibrationProfile, PrinterConfig};
//!
//! let config = PrinterConfig::EPSON_80MM;
//! assert!(config.recommended_chunk_rows < config.line_ceiling / 2);
//!
//! let profile = CalibrationProfile::production();
//! assert_eq!(profile.palette.len(), 11);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MultitoneError;
use crate::render::{CalibrationTable, Kernel, Palette};

/// # Printer Configuration
///
/// Defines the hardware characteristics of a multi-tone receipt printer.
///
/// ## Slicing
///
/// - **line_ceiling**: Maximum rows one `GS 8 L` command may carry
/// - **recommended_chunk_rows**: Rows per slice that avoid banding; the
///   manufacturer advises staying under half of `line_ceiling`
#[derive(Debug, Clone, Copy)]
pub struct PrinterConfig {
    /// Printer model name
    pub name: &'static str,

    /// Maximum print width in dots; wider images are scaled down
    pub width_dots: u16,

    /// Documented per-command row limit
    pub line_ceiling: u16,

    /// Default slice height
    pub recommended_chunk_rows: u16,

    /// Default head energizing mode (1 = single head)
    pub head_energizing: u8,

    /// Default print speed (1 = slowest)
    pub print_speed: u8,
}

impl PrinterConfig {
    /// # Epson 80mm Multi-Tone Receipt Printer
    ///
    /// ```text
    /// ├── 4mm ──┼────── 72mm printable ──────┼── 4mm ──┤
    /// │ margin  │         512 dots           │ margin  │
    /// ```
    pub const EPSON_80MM: Self = Self {
        name: "Epson 80mm multi-tone",
        width_dots: 512,
        line_ceiling: 415,
        recommended_chunk_rows: 100,
        head_energizing: 1,
        print_speed: 1,
    };

    /// Largest slice height that stays clear of banding.
    #[inline]
    pub fn banding_limit(&self) -> u16 {
        self.line_ceiling / 2
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::EPSON_80MM
    }
}

// ============================================================================
// CALIBRATION PROFILE
// ============================================================================

fn default_serpentine() -> bool {
    true
}

/// Everything the dither and calibration stages need, as one immutable value.
///
/// Profiles are plain JSON so several printers (or paper stocks) can be
/// calibrated side by side:
///
/// ```json
/// {
///   "name": "my printer",
///   "palette": [0, 128, 255],
///   "calibration": { "0": 15, "128": 8, "255": 4 }
/// }
/// ```
///
/// `kernel` and `serpentine` are optional and default to the production
/// kernel with serpentine scanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    pub name: String,
    pub palette: Palette,
    pub calibration: CalibrationTable,
    #[serde(default)]
    pub kernel: Kernel,
    #[serde(default = "default_serpentine")]
    pub serpentine: bool,
}

impl CalibrationProfile {
    /// Assemble a profile, checking that the table covers the palette exactly.
    pub fn new(
        name: impl Into<String>,
        palette: Palette,
        calibration: CalibrationTable,
        kernel: Kernel,
        serpentine: bool,
    ) -> Result<Self, MultitoneError> {
        let profile = Self {
            name: name.into(),
            palette,
            calibration,
            kernel,
            serpentine,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// The measured profile for [`PrinterConfig::EPSON_80MM`] on standard
    /// thermal paper.
    pub fn production() -> Self {
        Self {
            name: "production".to_string(),
            palette: Palette::production(),
            calibration: CalibrationTable::production(),
            kernel: Kernel::production(),
            serpentine: true,
        }
    }

    /// Parse and validate a JSON profile.
    pub fn from_json(json: &str) -> Result<Self, MultitoneError> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load and validate a JSON profile from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MultitoneError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            MultitoneError::Config(format!("Failed to read profile {}: {}", path.display(), e))
        })?;
        let profile = Self::from_json(&json)?;
        debug!(name = %profile.name, path = %path.display(), "Loaded calibration profile");
        Ok(profile)
    }

    pub fn to_json(&self) -> Result<String, MultitoneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the invariants that span fields (deserialization validates each
    /// part on its own, not the pair).
    ///
    /// The palette must include 0 and 255: pure black and white bypass
    /// quantization, so the table needs levels for them.
    pub fn validate(&self) -> Result<(), MultitoneError> {
        for required in [u8::MIN, u8::MAX] {
            if !self.palette.contains(required) {
                return Err(MultitoneError::InvalidPalette(format!(
                    "profile palette must include {}",
                    required
                )));
            }
        }
        self.calibration.check_palette(&self.palette)
    }
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self::production()
    }
}

// ============================================================================
// TESTS
// ============================================================================
