//! # Error Types
//!
//! This module defines the error type used throughout the multitone library.
//!
//! Every variant belongs to one of three kinds (see [`ErrorKind`]):
//!
//! | Kind | Meaning | Retry? |
//! |------|---------|--------|
//! | Configuration | Palette, calibration table, kernel or dimensions are inconsistent | Never |
//! | Input | The image (or a command stream being inspected) is unusable | Never |
//! | Transport | Writing the finished stream to a file or socket failed | Caller decides |

use thiserror::Error;

/// Main error type for multitone operations
#[derive(Debug, Error)]
pub enum MultitoneError {
    /// A palette must contain at least one intensity
    #[error("Configuration error: palette is empty")]
    EmptyPalette,

    /// Palette values out of order or duplicated
    #[error("Configuration error: invalid palette: {0}")]
    InvalidPalette(String),

    /// A dithered intensity has no entry in the calibration table
    #[error("Configuration error: no calibration level for intensity {0}")]
    MissingCalibration(u8),

    /// Calibration table inconsistent with its palette, or level out of range
    #[error("Configuration error: invalid calibration table: {0}")]
    InvalidCalibration(String),

    /// Diffusion kernel tap pointing at already-finalized pixels
    #[error("Configuration error: invalid diffusion kernel: {0}")]
    InvalidKernel(String),

    /// A dimension does not fit the protocol's 16-bit fields
    #[error("Configuration error: {what} of {value} does not fit in 16 bits")]
    DimensionOverflow { what: &'static str, value: usize },

    /// Any other invalid setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unusable input (zero-sized image, malformed command stream)
    #[error("Input error: {0}")]
    Input(String),

    /// Image decoding/encoding error wrapper
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Transport-level errors (connection, write)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Profile (de)serialization error
    #[error("Profile error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`MultitoneError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Input,
    Transport,
}

impl MultitoneError {
    /// Which part of the error taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyPalette
            | Self::InvalidPalette(_)
            | Self::MissingCalibration(_)
            | Self::InvalidCalibration(_)
            | Self::InvalidKernel(_)
            | Self::DimensionOverflow { .. }
            | Self::Config(_)
            | Self::Json(_) => ErrorKind::Configuration,
            Self::Input(_) | Self::Image(_) => ErrorKind::Input,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }
}
