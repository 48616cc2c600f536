//! # Printer Transport Layer
//!
//! Delivers a finished command stream. The stream is always built in full
//! before a transport is opened, so a conversion error never leaves a
//! half-written file or a printer holding a partial job.
//!
//! ## Available Transports
//!
//! - [`file`]: Write the stream to a file (for later `cat` or `lp -o raw`)
//! - [`network`]: Raw TCP to the printer's port 9100
//!
//! Failures are reported as [`MultitoneError::Transport`] and never retried.

pub mod file;
pub mod network;

pub use file::FileTransport;
pub use network::NetworkTransport;

use crate::error::MultitoneError;

/// Destination for a command stream.
pub trait Sink {
    /// Write the whole stream, returning once it has been flushed.
    fn write_all(&mut self, data: &[u8]) -> Result<(), MultitoneError>;
}

impl Sink for Vec<u8> {
    fn write_all(&mut self, data: &[u8]) -> Result<(), MultitoneError> {
        self.extend_from_slice(data);
        Ok(())
    }
}
