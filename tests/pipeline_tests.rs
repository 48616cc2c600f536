//! # Pipeline Tests
//!
//! End-to-end checks of the conversion pipeline through the public API.
//!
//! ## Test Coverage
//!
//! - **Fixture hash**: A 256x50 horizontal ramp must always produce the same
//!   6489-byte stream, both raw and after zero-factor enhancement. Any change to dithering, calibration, bitplane packing
//!   or framing shows up here first.
//! - **Framing**: Every stream decodes back into well-formed commands in the
//!   expected order.
//! - **Configuration errors**: Mismatched profiles fail before any output.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use multitone::pipeline::{Job, JobOptions, PrepareOptions, prepare};
use multitone::printer::CalibrationProfile;
use multitone::protocol::decode::{Command, decode};
use multitone::render::{CalibrationTable, Kernel, Palette, bitplane};
use multitone::{MultitoneError, error::ErrorKind};
use pretty_assertions::assert_eq;
use sha1::{Digest, Sha1};

/// SHA-1 of the stream for the raw 256x50 ramp with default job options.
const RAMP_SHA1: &str = "d0f60a317310e7bafe187ab9f7143ddb61559171";

/// SHA-1 of the same ramp prepared with sharpness 0 and contrast 0.
const FLATTENED_RAMP_SHA1: &str = "f4b7d16d8ea5967a32f7369054c3772bfc6b2754";

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Column `x` has intensity `x`.
fn ramp(height: u32) -> GrayImage {
    GrayImage::from_fn(256, height, |x, _| Luma([x as u8]))
}

fn render(img: &GrayImage, options: JobOptions) -> Vec<u8> {
    Job::new(CalibrationProfile::production(), options)
        .unwrap()
        .render(img)
        .unwrap()
        .stream
}

fn sha1_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha1::digest(bytes))
}

fn no_enhancements() -> PrepareOptions {
    PrepareOptions {
        sharpness: None,
        contrast: None,
        ..Default::default()
    }
}

// ============================================================================
// FIXTURE
// ============================================================================

#[test]
fn test_ramp_fixture_hash() {
    let stream = render(&ramp(50), JobOptions::default());
    assert_eq!(stream.len(), 6489);
    assert_eq!(sha1_hex(&stream), RAMP_SHA1);
}

#[test]
fn test_ramp_fixture_from_png() {
    let mut png = Vec::new();
    DynamicImage::ImageLuma8(ramp(50))
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();

    let img = prepare::decode(&png).unwrap();
    let gray = prepare::prepare(img, &no_enhancements()).unwrap();
    let stream = render(&gray, JobOptions::default());

    assert_eq!(sha1_hex(&stream), RAMP_SHA1);
}

#[test]
fn test_ramp_with_zero_enhancements() {
    let options = PrepareOptions {
        sharpness: Some(0.0),
        contrast: Some(0.0),
        ..Default::default()
    };
    let gray = prepare::prepare(DynamicImage::ImageLuma8(ramp(50)), &options).unwrap();
    let stream = render(&gray, JobOptions::default());

    assert_eq!(stream.len(), 6489);
    assert_eq!(sha1_hex(&stream), FLATTENED_RAMP_SHA1);

    // Equivalent to printing a uniform mid-gray surface
    let flat = GrayImage::from_pixel(256, 50, Luma([128]));
    assert_eq!(sha1_hex(&render(&flat, JobOptions::default())), FLATTENED_RAMP_SHA1);
}

#[test]
fn test_render_is_repeatable() {
    let img = ramp(50);
    assert_eq!(
        render(&img, JobOptions::default()),
        render(&img, JobOptions::default())
    );
}

// ============================================================================
// FRAMING
// ============================================================================

#[test]
fn test_stream_structure() {
    let options = JobOptions {
        max_lines_per_chunk: 100,
        cut: true,
        ..Default::default()
    };
    let commands = decode(&render(&ramp(250), options)).unwrap();

    // head + speed, 3 slices of (4 planes + print), cut
    assert_eq!(commands.len(), 2 + 3 * 5 + 1);
    assert_eq!(commands[0], Command::HeadEnergizing(1));
    assert_eq!(commands[1], Command::PrintSpeed(1));
    assert_eq!(commands.last(), Some(&Command::FeedCut(0)));

    let mut heights = Vec::new();
    for slice in commands[2..commands.len() - 1].chunks(5) {
        let colors: Vec<u8> = slice[..4]
            .iter()
            .map(|cmd| match cmd {
                Command::Raster { color, width, height, data } => {
                    assert_eq!(*width, 256);
                    assert_eq!(data.len(), bitplane::row_bytes(256) * *height as usize);
                    *color
                }
                other => panic!("expected raster frame, got {}", other),
            })
            .collect();
        assert_eq!(colors, b"1234".to_vec());
        assert_eq!(slice[4], Command::PrintStored);

        if let Command::Raster { height, .. } = &slice[0] {
            heights.push(*height);
        }
    }
    assert_eq!(heights, vec![100, 100, 50]);
}

#[test]
fn test_slice_boundaries_do_not_change_pixels() {
    let img = GrayImage::from_fn(40, 90, |x, y| Luma([((x * 31 + y * 17) % 256) as u8]));

    let planes_of = |rows: u32| -> Vec<u8> {
        let options = JobOptions {
            max_lines_per_chunk: rows,
            ..Default::default()
        };
        decode(&render(&img, options))
            .unwrap()
            .into_iter()
            .filter_map(|cmd| match cmd {
                Command::Raster { color: b'1', data, .. } => Some(data),
                _ => None,
            })
            .flatten()
            .collect()
    };

    // Plane 1 rows concatenate to the same bytes however the image is sliced
    assert_eq!(planes_of(7), planes_of(90));
}

#[test]
fn test_white_image_prints_lightest_level() {
    let white = GrayImage::from_pixel(16, 4, Luma([255]));
    let commands = decode(&render(&white, JobOptions::default())).unwrap();

    // 255 -> level 4 = 0b0100: only the second plane is set
    let planes: Vec<Vec<u8>> = commands
        .into_iter()
        .filter_map(|cmd| match cmd {
            Command::Raster { data, .. } => Some(data),
            _ => None,
        })
        .collect();
    assert_eq!(planes[0], vec![0x00; 8]);
    assert_eq!(planes[1], vec![0xFF; 8]);
    assert_eq!(planes[2], vec![0x00; 8]);
    assert_eq!(planes[3], vec![0x00; 8]);
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

#[test]
fn test_profile_table_mismatch_is_configuration_error() {
    let profile = CalibrationProfile {
        name: "mismatch".to_string(),
        palette: Palette::new(vec![0, 100, 255]).unwrap(),
        calibration: CalibrationTable::production(),
        kernel: Kernel::production(),
        serpentine: true,
    };
    let err = Job::new(profile, JobOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_profile_missing_white_fails_before_rendering() {
    let json = r#"{
        "name": "no white",
        "palette": [0, 128],
        "calibration": {"0": 15, "128": 8}
    }"#;
    let err = CalibrationProfile::from_json(json).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_empty_image_is_input_error() {
    let mut job = Job::new(CalibrationProfile::production(), JobOptions::default()).unwrap();
    let err = job.render(&GrayImage::new(10, 0)).unwrap_err();
    assert!(matches!(err, MultitoneError::Input(_)));
}

#[test]
fn test_custom_profile_from_json() {
    let json = r#"{
        "name": "two tone",
        "palette": [0, 255],
        "calibration": {"0": 15, "255": 0},
        "kernel": [{"dx": 1, "dy": 0, "weight": 1.0}],
        "serpentine": false
    }"#;
    let profile = CalibrationProfile::from_json(json).unwrap();
    let mut job = Job::new(profile, JobOptions::default()).unwrap();

    let rendered = job.render(&GrayImage::from_pixel(8, 1, Luma([0]))).unwrap();
    let commands = decode(&rendered.stream).unwrap();

    // Level 15 sets every plane
    for cmd in &commands[2..6] {
        match cmd {
            Command::Raster { data, .. } => assert_eq!(data, &vec![0xFF]),
            other => panic!("expected raster frame, got {}", other),
        }
    }
}
