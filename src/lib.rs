//! # Multitone - Thermal Printer Grayscale Library
//!
//! Multitone turns grayscale images into 16-level command streams for Epson
//! multi-tone thermal receipt printers. It provides:
//!
//! - **Dithering**: Error diffusion onto a small set of measured gray levels
//! - **Calibration**: Mapping of those grays to the printer's 16 print levels
//! - **Protocol implementation**: `GS 8 L` multi-tone raster framing
//! - **Transport**: File output and raw TCP (port 9100)
//!
//! ## Quick Start
//!
//! ```no_run
//! use multitone::{
//!     pipeline::{Job, JobOptions, PrepareOptions, prepare},
//!     printer::CalibrationProfile,
//!     transport::{NetworkTransport, Sink},
//! };
//!
//! // Decode, flatten, resize and enhance
//! let img = prepare::load("photo.png")?;
//! let gray = prepare::prepare(img, &PrepareOptions::default())?;
//!
//! // Dither, calibrate and frame
//! let mut job = Job::new(CalibrationProfile::production(), JobOptions::default())?;
//! let rendered = job.render(&gray)?;
//!
//! // Send to printer
//! let mut printer = NetworkTransport::connect("192.168.1.50")?;
//! printer.write_all(&rendered.stream)?;
//!
//! # Ok::<(), multitone::MultitoneError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pipeline`] | Image preparation, slicing and the conversion job |
//! | [`render`] | Dithering, calibration, bitplanes and test patterns |
//! | [`protocol`] | Command builders and a stream decoder |
//! | [`transport`] | File and network delivery |
//! | [`printer`] | Printer limits and calibration profiles |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Currently calibrated for:
//! - Epson 80mm multi-tone receipt printers (512 dots, 180 DPI)
//!
//! Other printers that understand the multi-tone `GS 8 L` function work with
//! their own calibration profile (see `multitone calibrate`).

pub mod error;
pub mod pipeline;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod transport;

// Re-exports for convenience
pub use error::MultitoneError;
pub use printer::{CalibrationProfile, PrinterConfig};
