//! # Rendering Module
//!
//! Turns a grayscale surface into multi-tone print data.
//!
//! ## Modules
//!
//! - [`dither`]: Error diffusion against a fixed palette
//! - [`calibration`]: Palette intensity → 4-bit print level
//! - [`bitplane`]: 4-bit levels → four packed 1-bit planes
//! - [`patterns`]: Level surfaces for printer calibration
//!
//! ## Data Flow
//!
//! ```text
//! GrayImage ──dither──► GrayImage (palette only) ──map_levels──► LevelSurface
//!                                                                    │
//!                                              pack(rows) ◄──────────┘
//!                                                  │
//!                                                  ▼
//!                                         [plane0, plane1, plane2, plane3]
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use image::GrayImage;
//! use multitone::render::{bitplane, dither, map_levels, CalibrationTable, Kernel};
//!
//! let table = CalibrationTable::production();
//! let palette = table.palette().unwrap();
//! let img = GrayImage::from_fn(16, 4, |x, _| image::Luma([(x * 16) as u8]));
//!
//! let dithered = dither::dither(&img, &Kernel::production(), &palette, true);
//! let levels = map_levels(&dithered, &table).unwrap();
//! let planes = bitplane::pack(&levels, 0, 4);
//!
//! assert_eq!(planes[0].len(), 2 * 4);
//! ```

pub mod bitplane;
pub mod calibration;
pub mod dither;
pub mod patterns;

pub use bitplane::{Bitplanes, pack};
pub use calibration::{CalibrationTable, LevelSurface, map_levels};
pub use dither::{Kernel, Palette, Tap};
