//! # Multitone CLI
//!
//! Command-line interface for multi-tone thermal printing.
//!
//! ## Usage
//!
//! ```bash
//! # Convert an image to a command stream file
//! multitone convert photo.jpg --output-file photo.bin
//!
//! # Print straight to a network printer, cutting afterwards
//! multitone convert photo.jpg --printer 192.168.1.50 --cut
//!
//! # Keep the dithered image to preview the result
//! multitone convert photo.jpg --output-file photo.bin --output-image preview.png
//!
//! # Print the 16-level test strip used to measure a calibration table
//! multitone calibrate --printer 192.168.1.50
//!
//! # List the commands in a stream
//! multitone inspect photo.bin
//!
//! # Dump the built-in calibration profile as a template
//! multitone profile > my-printer.json
//! ```

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_subscriber::EnvFilter;

use multitone::{
    CalibrationProfile, MultitoneError, PrinterConfig,
    error::ErrorKind,
    pipeline::{Job, JobOptions, PrepareOptions, prepare},
    protocol::decode,
    render::patterns,
    transport::{FileTransport, NetworkTransport, Sink},
};

/// Multitone - 16-level grayscale printing for Epson thermal printers
#[derive(Parser, Debug)]
#[command(name = "multitone")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter (error, warn, info, debug, trace or a tracing directive)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Where the finished command stream goes.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Destination {
    /// Write the command stream to this file
    #[arg(long, value_name = "PATH")]
    output_file: Option<PathBuf>,

    /// Send the command stream to a network printer (host or host:port)
    #[arg(long, value_name = "HOST")]
    printer: Option<String>,
}

impl Destination {
    fn open(&self) -> Result<Box<dyn Sink>, MultitoneError> {
        match (&self.output_file, &self.printer) {
            (Some(path), _) => Ok(Box::new(FileTransport::create(path)?)),
            (None, Some(host)) => Ok(Box::new(NetworkTransport::connect(host)?)),
            (None, None) => Err(MultitoneError::Config(
                "either --output-file or --printer is required".to_string(),
            )),
        }
    }

    fn describe(&self) -> String {
        match (&self.output_file, &self.printer) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(host)) => host.clone(),
            (None, None) => "nowhere".to_string(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert an image to a multi-tone command stream
    Convert {
        /// Image to print (PNG, JPEG, GIF, BMP, ...)
        image: PathBuf,

        #[command(flatten)]
        destination: Destination,

        /// Also save the dithered image as PNG
        #[arg(long, value_name = "PNG")]
        output_image: Option<PathBuf>,

        /// Rows per slice (should be less than half of 415)
        #[arg(long, default_value_t = 100)]
        num_lines: u32,

        /// Resize to this width in dots, keeping the aspect ratio
        #[arg(long, value_name = "WIDTH")]
        resize: Option<u32>,

        /// Sharpness factor (1.0 = unchanged, 0.0 = smoothed)
        #[arg(long, default_value_t = 2.0)]
        sharpness: f32,

        /// Contrast factor (1.0 = unchanged, 0.0 = flat gray)
        #[arg(long, default_value_t = 1.2)]
        contrast: f32,

        /// Cut the paper after printing
        #[arg(long)]
        cut: bool,

        /// Print speed (the slowest speed is recommended)
        #[arg(long, default_value_t = 1)]
        speed: u8,

        /// Head energizing mode (single-head energizing is recommended)
        #[arg(long, default_value_t = 1)]
        heads_energizing: u8,

        /// Calibration profile JSON (defaults to the built-in profile)
        #[arg(long, value_name = "JSON")]
        profile: Option<PathBuf>,
    },

    /// Print a strip of all 16 print levels for measuring a calibration table
    Calibrate {
        #[command(flatten)]
        destination: Destination,

        /// Strip width in dots
        #[arg(long, default_value_t = 512)]
        width: u32,

        /// Strip height in rows
        #[arg(long, default_value_t = 100)]
        height: u32,

        /// Cut the paper after printing
        #[arg(long)]
        cut: bool,
    },

    /// List the commands in a command stream file
    Inspect {
        /// Command stream to decode
        file: PathBuf,
    },

    /// Print the built-in calibration profile as JSON
    Profile,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(err: &MultitoneError) -> i32 {
    match err.kind() {
        ErrorKind::Configuration => 2,
        ErrorKind::Input => 3,
        ErrorKind::Transport => 4,
    }
}

/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str) -> Result<(), MultitoneError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.is_empty() => EnvFilter::try_new(&directives),
        _ => EnvFilter::try_new(level),
    }
    .map_err(|e| MultitoneError::Config(format!("Invalid log level '{}': {}", level, e)))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run(cli: Cli) -> Result<(), MultitoneError> {
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Convert {
            image,
            destination,
            output_image,
            num_lines,
            resize,
            sharpness,
            contrast,
            cut,
            speed,
            heads_energizing,
            profile,
        } => {
            let profile = match profile {
                Some(path) => CalibrationProfile::load(path)?,
                None => CalibrationProfile::production(),
            };
            let options = JobOptions {
                max_lines_per_chunk: num_lines,
                head_energizing: heads_energizing,
                print_speed: speed,
                cut,
            };
            let mut job = Job::new(profile, options)?;

            info!(image = %image.display(), profile = %job.profile().name, "Opening image");
            let img = prepare::load(&image)?;
            let gray = prepare::prepare(
                img,
                &PrepareOptions {
                    resize,
                    sharpness: Some(sharpness),
                    contrast: Some(contrast),
                    ..Default::default()
                },
            )?;

            info!(width = gray.width(), height = gray.height(), "Converting image");
            let rendered = job.render(&gray)?;

            if let Some(path) = output_image {
                save_png(&path, &rendered.dithered)?;
                info!(path = %path.display(), "Saved dithered image");
            }

            deliver(&destination, &rendered.stream)?;
        }

        Commands::Calibrate {
            destination,
            width,
            height,
            cut,
        } => {
            let options = JobOptions {
                cut,
                ..JobOptions::for_printer(&PrinterConfig::EPSON_80MM)
            };
            let mut job = Job::new(CalibrationProfile::production(), options)?;

            info!(width, height, "Rendering level strip");
            let strip = patterns::level_strip(width, height);
            let stream = job.render_levels(&strip)?;

            deliver(&destination, &stream)?;
        }

        Commands::Inspect { file } => {
            let bytes = fs::read(&file).map_err(|e| {
                MultitoneError::Input(format!("Failed to read {}: {}", file.display(), e))
            })?;
            let commands = decode::decode(&bytes)?;
            for cmd in &commands {
                println!("{}", cmd);
            }
            info!(commands = commands.len(), bytes = bytes.len(), "Decoded stream");
        }

        Commands::Profile => {
            println!("{}", CalibrationProfile::production().to_json()?);
        }
    }

    Ok(())
}

/// Open the destination and write the whole stream.
fn deliver(destination: &Destination, stream: &[u8]) -> Result<(), MultitoneError> {
    let mut sink = destination.open()?;
    sink.write_all(stream)?;
    info!(bytes = stream.len(), to = %destination.describe(), "Command stream delivered");
    Ok(())
}

/// Save the dithered image as PNG
fn save_png(path: &Path, img: &image::GrayImage) -> Result<(), MultitoneError> {
    img.save(path).map_err(|e| {
        MultitoneError::Transport(format!("Failed to save {}: {}", path.display(), e))
    })
}
