//! # Conversion Pipeline
//!
//! Drives one image through every stage and produces the finished command
//! stream.
//!
//! ## Stages
//!
//! ```text
//! Idle ─► Configuring ─► Emitting(0) ─► ... ─► Emitting(n-1) ─► [Cutting] ─► Done
//!          head, speed     one set of 4 frames + print per slice     GS V A
//! ```
//!
//! Dithering runs over the whole image first (error crosses slice
//! boundaries). Slices are then packed and framed in parallel and joined in
//! slice order, so the output matches a sequential run byte for byte.
//!
//! ## Example
//!
//! ```
//! use image::{GrayImage, Luma};
//! use multitone::pipeline::{Job, JobOptions};
//! use multitone::printer::CalibrationProfile;
//!
//! let img = GrayImage::from_fn(256, 50, |x, _| Luma([x as u8]));
//! let mut job = Job::new(CalibrationProfile::production(), JobOptions::default()).unwrap();
//! let rendered = job.render(&img).unwrap();
//!
//! assert_eq!(rendered.stream.len(), 6489);
//! ```

pub mod chunking;
pub mod prepare;

use image::GrayImage;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::MultitoneError;
use crate::printer::{CalibrationProfile, PrinterConfig};
use crate::protocol::{commands, graphics};
use crate::render::{LevelSurface, bitplane, dither, map_levels};

pub use prepare::PrepareOptions;

/// Per-job printer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOptions {
    /// Rows per slice
    pub max_lines_per_chunk: u32,
    /// Head energizing mode sent before the first slice
    pub head_energizing: u8,
    /// Print speed sent before the first slice
    pub print_speed: u8,
    /// Append a full cut after the last slice
    pub cut: bool,
}

impl JobOptions {
    /// Defaults recommended for `printer`.
    pub fn for_printer(printer: &PrinterConfig) -> Self {
        Self {
            max_lines_per_chunk: u32::from(printer.recommended_chunk_rows),
            head_energizing: printer.head_energizing,
            print_speed: printer.print_speed,
            cut: false,
        }
    }
}

impl Default for JobOptions {
    fn default() -> Self {
        Self::for_printer(&PrinterConfig::EPSON_80MM)
    }
}

/// Where a job currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Configuring,
    /// Emitting the slice with this index
    Emitting(usize),
    Cutting,
    Done,
}

/// Output of [`Job::render`].
#[derive(Debug, Clone)]
pub struct Rendered {
    /// The image after dithering, every pixel a palette value
    pub dithered: GrayImage,
    /// The bytes to send to the printer
    pub stream: Vec<u8>,
}

/// One conversion, from grayscale surface to command stream.
#[derive(Debug, Clone)]
pub struct Job {
    profile: CalibrationProfile,
    options: JobOptions,
    stage: Stage,
}

impl Job {
    /// Create a job.
    ///
    /// Fails if the profile's calibration table does not cover its palette or
    /// the slice height is zero.
    pub fn new(profile: CalibrationProfile, options: JobOptions) -> Result<Self, MultitoneError> {
        profile.validate()?;
        if options.max_lines_per_chunk == 0 {
            return Err(MultitoneError::Config(
                "lines per chunk must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            profile,
            options,
            stage: Stage::Idle,
        })
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Dither, calibrate and frame a grayscale image.
    pub fn render(&mut self, gray: &GrayImage) -> Result<Rendered, MultitoneError> {
        self.stage = Stage::Idle;
        check_dimensions(gray.width(), gray.height())?;

        let dithered = dither::dither(
            gray,
            &self.profile.kernel,
            &self.profile.palette,
            self.profile.serpentine,
        );
        debug!(
            width = gray.width(),
            height = gray.height(),
            palette = self.profile.palette.len(),
            serpentine = self.profile.serpentine,
            "Dithered image"
        );

        let levels = map_levels(&dithered, &self.profile.calibration)?;
        let stream = self.emit(&levels)?;

        Ok(Rendered { dithered, stream })
    }

    /// Frame an already-calibrated level surface (e.g. a test strip).
    pub fn render_levels(&mut self, levels: &LevelSurface) -> Result<Vec<u8>, MultitoneError> {
        self.stage = Stage::Idle;
        self.emit(levels)
    }

    fn emit(&mut self, levels: &LevelSurface) -> Result<Vec<u8>, MultitoneError> {
        let width = check_dimensions(levels.width(), levels.height())?;

        let max_rows = self.options.max_lines_per_chunk;
        let banding_limit = PrinterConfig::EPSON_80MM.banding_limit();
        if max_rows > u32::from(banding_limit) {
            warn!(
                max_rows,
                limit = banding_limit,
                "Slices taller than half the line ceiling may print with banding"
            );
        }

        self.advance(Stage::Configuring);
        let mut out = commands::head_energizing(self.options.head_energizing);
        out.extend(commands::print_speed(self.options.print_speed));

        let slices: Vec<chunking::Slice> = chunking::slices(levels.height(), max_rows)?.collect();
        let frames = slices
            .par_iter()
            .map(|slice| -> Result<Vec<u8>, MultitoneError> {
                let rows = u16::try_from(slice.height()).map_err(|_| {
                    MultitoneError::DimensionOverflow {
                        what: "slice height",
                        value: slice.height() as usize,
                    }
                })?;
                let planes = bitplane::pack(levels, slice.start, slice.end);
                Ok(graphics::slice(&planes, width, rows))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (index, (slice, frame)) in slices.iter().zip(frames).enumerate() {
            self.advance(Stage::Emitting(index));
            debug!(index, start = slice.start, rows = slice.height(), bytes = frame.len(), "Emitting slice");
            out.extend(frame);
        }

        if self.options.cut {
            self.advance(Stage::Cutting);
            out.extend(commands::feed_and_cut(0));
        }

        self.advance(Stage::Done);
        debug!(slices = slices.len(), bytes = out.len(), "Command stream complete");
        Ok(out)
    }

    fn advance(&mut self, next: Stage) {
        debug!(from = ?self.stage, to = ?next, "Stage transition");
        self.stage = next;
    }
}

/// Reject empty surfaces and widths the 16-bit header field cannot carry.
fn check_dimensions(width: u32, height: u32) -> Result<u16, MultitoneError> {
    if width == 0 || height == 0 {
        return Err(MultitoneError::Input(format!(
            "image has zero size ({width}x{height})"
        )));
    }
    u16::try_from(width).map_err(|_| MultitoneError::DimensionOverflow {
        what: "width",
        value: width as usize,
    })
}
