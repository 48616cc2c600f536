//! # Printer Module
//!
//! This module provides printer hardware limits and calibration profiles.
//!
//! ## Modules
//!
//! - [`config`]: Printer hardware specifications and calibration profiles

pub mod config;

pub use config::{CalibrationProfile, PrinterConfig};
