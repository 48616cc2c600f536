//! # Image Preparation
//!
//! Decodes an input image and turns it into the 8-bit grayscale surface the
//! dither stage expects.
//!
//! ## Steps
//!
//! ```text
//! bytes ──decode──► flatten alpha onto white ──► resize (keep aspect)
//!        ──► luma8 ──► sharpness ──► contrast ──► GrayImage
//! ```
//!
//! Transparent pixels become white, not black: receipt paper is white, and
//! most logos with transparency expect to sit on a light background.
//!
//! Enhancement factors follow the usual blend convention: 1.0 leaves the image
//! unchanged, 0.0 gives the degenerate image (the 3x3 smoothing for
//! sharpness, a flat surface at the mean for contrast). `None` skips the step.

use std::fs;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use tracing::debug;

use crate::error::MultitoneError;
use crate::printer::PrinterConfig;

/// Image adjustments applied before dithering.
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareOptions {
    /// Requested output width in dots; aspect ratio is preserved
    pub resize: Option<u32>,
    /// Images wider than this are scaled down to it
    pub max_width: u32,
    /// Sharpness factor (1.0 = unchanged, `None` = skipped)
    pub sharpness: Option<f32>,
    /// Contrast factor (1.0 = unchanged, `None` = skipped)
    pub contrast: Option<f32>,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            resize: None,
            max_width: u32::from(PrinterConfig::EPSON_80MM.width_dots),
            sharpness: Some(2.0),
            contrast: Some(1.2),
        }
    }
}

/// Decode an encoded image (PNG, JPEG, GIF, ..., and HEIC with the `heif`
/// feature).
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, MultitoneError> {
    let img = if is_heic(bytes) {
        decode_heic(bytes)?
    } else {
        image::load_from_memory(bytes)?
    };
    if img.width() == 0 || img.height() == 0 {
        return Err(MultitoneError::Input(format!(
            "image has zero size ({}x{})",
            img.width(),
            img.height()
        )));
    }
    debug!(width = img.width(), height = img.height(), color = ?img.color(), "Decoded image");
    Ok(img)
}

/// Check for an ISO-BMFF `ftyp` box with a HEIF brand.
fn is_heic(data: &[u8]) -> bool {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return false;
    }
    matches!(
        &data[8..12],
        b"heic" | b"heix" | b"hevc" | b"hevx" | b"heim" | b"heis" | b"hevm" | b"hevs" | b"mif1" | b"msf1"
    )
}

#[cfg(feature = "heif")]
fn decode_heic(data: &[u8]) -> Result<DynamicImage, MultitoneError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let heic_err = |stage: &str, e: libheif_rs::HeifError| MultitoneError::Input(format!("{stage}: {e}"));

    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(data).map_err(|e| heic_err("Failed to read HEIC", e))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| heic_err("Failed to get primary image", e))?;
    let image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| heic_err("Failed to decode HEIC image", e))?;

    let interleaved = image
        .planes()
        .interleaved
        .ok_or_else(|| MultitoneError::Input("No interleaved RGB data in HEIC".to_string()))?;

    let (width, height) = (image.width(), image.height());
    let stride = interleaved.stride;
    let bytes = interleaved.data;
    let rgb = RgbImage::from_fn(width, height, |x, y| {
        let offset = y as usize * stride + x as usize * 3;
        match bytes.get(offset..offset + 3) {
            Some(px) => Rgb([px[0], px[1], px[2]]),
            None => Rgb([255, 255, 255]),
        }
    });
    debug!(width, height, "Decoded HEIC image");
    Ok(DynamicImage::ImageRgb8(rgb))
}

#[cfg(not(feature = "heif"))]
fn decode_heic(_data: &[u8]) -> Result<DynamicImage, MultitoneError> {
    Err(MultitoneError::Input(
        "HEIC input requires the `heif` feature".to_string(),
    ))
}

/// Read and decode an image file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<DynamicImage, MultitoneError> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .map_err(|e| MultitoneError::Input(format!("Failed to read {}: {}", path.display(), e)))?;
    decode(&bytes)
}

/// Composite an image with transparency over a white background.
///
/// Images without an alpha channel are returned unchanged.
pub fn flatten_alpha(img: DynamicImage) -> DynamicImage {
    if !img.color().has_alpha() {
        return img;
    }

    debug!("Input image has transparency channel, compositing onto white");
    let rgba = img.to_rgba8();
    let flattened = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = f32::from(a) / 255.0;
        let over_white = |c: u8| (f32::from(c) * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        Rgb([over_white(r), over_white(g), over_white(b)])
    });
    DynamicImage::ImageRgb8(flattened)
}

/// Scale to `target_width`, rounding the height to keep the aspect ratio.
pub fn resize_to_width(img: &DynamicImage, target_width: u32) -> DynamicImage {
    let (orig_w, orig_h) = (img.width(), img.height());
    if orig_w == target_width {
        return img.clone();
    }

    let ratio = f64::from(target_width) / f64::from(orig_w);
    let new_height = ((f64::from(orig_h) * ratio).round() as u32).max(1);
    debug!(orig_w, orig_h, new_width = target_width, new_height, "Resizing image");

    img.resize_exact(target_width.max(1), new_height, FilterType::Lanczos3)
}

/// Blend between a smoothed copy and the image: `smooth + f * (img - smooth)`.
///
/// `factor > 1` sharpens, `factor < 1` blurs and `0` returns the smoothed
/// image. Border pixels are not smoothed.
pub fn adjust_sharpness(gray: &GrayImage, factor: f32) -> GrayImage {
    let smooth = smooth3x3(gray);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let s = f32::from(smooth.get_pixel(x, y).0[0]);
        let v = f32::from(gray.get_pixel(x, y).0[0]);
        Luma([blend(s, v, factor)])
    })
}

/// Scale distances from the mean gray level: `mean + f * (px - mean)`.
///
/// The mean is rounded to a whole gray level; `0` flattens the image to it.
pub fn adjust_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let total: u64 = gray.as_raw().iter().map(|&v| u64::from(v)).sum();
    let count = gray.as_raw().len().max(1) as f64;
    let mean = (total as f64 / count + 0.5).floor() as f32;

    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = blend(mean, f32::from(pixel.0[0]), factor);
    }
    out
}

/// Run every preparation step on a decoded image.
pub fn prepare(img: DynamicImage, options: &PrepareOptions) -> Result<GrayImage, MultitoneError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(MultitoneError::Input("image has zero size".to_string()));
    }

    let img = flatten_alpha(img);

    let img = match options.resize {
        Some(target) => resize_to_width(&img, target),
        None if img.width() > options.max_width => resize_to_width(&img, options.max_width),
        None => img,
    };

    let mut gray = img.to_luma8();

    if let Some(factor) = options.sharpness {
        gray = adjust_sharpness(&gray, factor);
        debug!(factor, "Modified sharpness");
    }

    if let Some(factor) = options.contrast {
        gray = adjust_contrast(&gray, factor);
        debug!(factor, "Modified contrast");
    }

    Ok(gray)
}

fn blend(base: f32, value: f32, factor: f32) -> u8 {
    (base + factor * (value - base)).round().clamp(0.0, 255.0) as u8
}

/// 3x3 smoothing (weights 1 1 1 / 1 5 1 / 1 1 1, sum 13); border copied.
fn smooth3x3(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut out = gray.clone();
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sum = 0u32;
            for dy in 0..3 {
                for dx in 0..3 {
                    let weight = if dx == 1 && dy == 1 { 5 } else { 1 };
                    sum += weight * u32::from(gray.get_pixel(x + dx - 1, y + dy - 1).0[0]);
                }
            }
            out.put_pixel(x, y, Luma([((sum + 6) / 13) as u8]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(img: &DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 3, Luma([77])));
        let decoded = decode(&encode_png(&img)).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_decode_garbage_is_input_error() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Input);
    }

    #[test]
    fn test_is_heic_magic() {
        assert!(is_heic(b"\0\0\0\x18ftypheic\0\0\0\0"));
        assert!(is_heic(b"\0\0\0\x18ftypmif1\0\0\0\0"));
        assert!(!is_heic(b"\x89PNG\r\n\x1a\n\0\0\0\0"));
        assert!(!is_heic(b"ftyp"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/nonexistent/image.png").unwrap_err();
        assert!(matches!(err, MultitoneError::Input(_)));
    }

    #[test]
    fn test_transparent_becomes_white() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([0, 0, 0, 255]));

        let flat = flatten_alpha(DynamicImage::ImageRgba8(rgba)).to_luma8();
        assert_eq!(flat.get_pixel(0, 0).0[0], 255);
        assert_eq!(flat.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn test_opaque_image_untouched() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([10])));
        let flat = flatten_alpha(img.clone());
        assert_eq!(flat, img);
    }

    #[test]
    fn test_resize_keeps_aspect() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(1024, 300, Luma([128])));
        let resized = resize_to_width(&img, 512);
        assert_eq!((resized.width(), resized.height()), (512, 150));
    }

    #[test]
    fn test_resize_rounds_height() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 2, Luma([128])));
        let resized = resize_to_width(&img, 4);
        // 2 * 4/3 = 2.67 → 3
        assert_eq!((resized.width(), resized.height()), (4, 3));
    }

    #[test]
    fn test_prepare_scales_wide_images_only() {
        let options = PrepareOptions {
            sharpness: None,
            contrast: None,
            ..Default::default()
        };

        let wide = DynamicImage::ImageLuma8(GrayImage::from_pixel(1000, 100, Luma([128])));
        let gray = prepare(wide, &options).unwrap();
        assert_eq!(gray.dimensions(), (512, 51));

        let narrow = DynamicImage::ImageLuma8(GrayImage::from_pixel(256, 50, Luma([128])));
        let gray = prepare(narrow, &options).unwrap();
        assert_eq!(gray.dimensions(), (256, 50));
    }

    #[test]
    fn test_prepare_identity_without_enhancements() {
        let ramp = GrayImage::from_fn(256, 4, |x, _| Luma([x as u8]));
        let options = PrepareOptions {
            sharpness: None,
            contrast: None,
            ..Default::default()
        };
        let gray = prepare(DynamicImage::ImageLuma8(ramp.clone()), &options).unwrap();
        assert_eq!(gray, ramp);
    }

    #[test]
    fn test_zero_factors_are_applied() {
        let ramp = GrayImage::from_fn(256, 4, |x, _| Luma([x as u8]));
        let options = PrepareOptions {
            sharpness: Some(0.0),
            contrast: Some(0.0),
            ..Default::default()
        };
        let gray = prepare(DynamicImage::ImageLuma8(ramp), &options).unwrap();
        // smoothing keeps a linear ramp's mean at 127.5, which rounds to 128
        assert!(gray.as_raw().iter().all(|&v| v == 128));
    }

    #[test]
    fn test_zero_contrast_flattens_to_mean() {
        let img = GrayImage::from_raw(3, 1, vec![10, 20, 60]).unwrap();
        assert_eq!(adjust_contrast(&img, 0.0).as_raw(), &vec![30, 30, 30]);
    }

    #[test]
    fn test_zero_sharpness_returns_smoothed() {
        let img = GrayImage::from_fn(3, 3, |x, y| Luma([if (x, y) == (1, 1) { 130 } else { 0 }]));
        let smooth = adjust_sharpness(&img, 0.0);
        // centre: 5 * 130 / 13 = 50; border copied
        assert_eq!(smooth.get_pixel(1, 1).0[0], 50);
        assert_eq!(smooth.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn test_contrast_factor_one_is_identity() {
        let ramp = GrayImage::from_fn(16, 2, |x, _| Luma([(x * 16) as u8]));
        assert_eq!(adjust_contrast(&ramp, 1.0), ramp);
    }

    #[test]
    fn test_contrast_spreads_from_mean() {
        let img = GrayImage::from_raw(2, 1, vec![100, 200]).unwrap();
        let out = adjust_contrast(&img, 2.0);
        // mean 150: 150 + 2 * (100 - 150) = 50, 150 + 2 * 50 = 250
        assert_eq!(out.as_raw(), &vec![50, 250]);
    }

    #[test]
    fn test_sharpness_on_flat_image_is_identity() {
        let flat = GrayImage::from_pixel(5, 5, Luma([90]));
        assert_eq!(adjust_sharpness(&flat, 2.0), flat);
    }

    #[test]
    fn test_sharpness_boosts_edges() {
        let img = GrayImage::from_fn(5, 5, |x, _| Luma([if x < 2 { 50 } else { 200 }]));
        let sharp = adjust_sharpness(&img, 2.0);
        assert!(sharp.get_pixel(1, 2).0[0] < 50);
        assert!(sharp.get_pixel(2, 2).0[0] > 200);
    }
}
