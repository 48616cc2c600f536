//! # ESC/POS Multi-Tone Protocol
//!
//! Low-level command builders for Epson-compatible receipt printers that
//! support 16-level ("multi-tone") raster graphics.
//!
//! ## Module Structure
//!
//! - [`commands`]: Print control (head energizing, speed), print stored data, cut
//! - [`graphics`]: `GS 8 L` multi-tone raster planes and slice framing
//! - [`decode`]: Parse a generated stream back into commands
//!
//! ## Usage Example
//!
//! ```
//! use multitone::protocol::{commands, graphics};
//!
//! let mut data = Vec::new();
//! data.extend(commands::head_energizing(1));
//! data.extend(commands::print_speed(1));
//!
//! // One 16-dot wide, 1-row slice: four planes then "print stored"
//! let planes = [vec![0xFF, 0x00], vec![0x00; 2], vec![0x00; 2], vec![0x0F, 0xF0]];
//! data.extend(graphics::slice(&planes, 16, 1));
//!
//! data.extend(commands::feed_and_cut(0));
//! ```

pub mod commands;
pub mod decode;
pub mod graphics;
