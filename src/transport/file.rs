//! # File Transport
//!
//! Writes the command stream to a file, creating or truncating it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::Sink;
use crate::error::MultitoneError;

/// Writes a command stream to a file.
///
/// ```no_run
/// use multitone::transport::{FileTransport, Sink};
///
/// let mut out = FileTransport::create("receipt.bin")?;
/// out.write_all(&[0x1D, 0x56, 0x41, 0x00])?;
/// # Ok::<(), multitone::error::MultitoneError>(())
/// ```
#[derive(Debug)]
pub struct FileTransport {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileTransport {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, MultitoneError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| {
            MultitoneError::Transport(format!("Failed to create {}: {}", path.display(), e))
        })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }
}

impl Sink for FileTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<(), MultitoneError> {
        self.writer
            .write_all(data)
            .and_then(|()| self.writer.flush())
            .map_err(|e| {
                MultitoneError::Transport(format!("Write to {} failed: {}", self.path.display(), e))
            })?;
        debug!(path = %self.path.display(), bytes = data.len(), "Wrote command stream");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("multitone-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_writes_and_truncates() {
        let path = temp_path("truncate.bin");
        fs::write(&path, vec![0xAA; 64]).unwrap();

        let mut sink = FileTransport::create(&path).unwrap();
        sink.write_all(&[1, 2, 3]).unwrap();
        drop(sink);

        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_directory_is_transport_error() {
        let err = FileTransport::create("/nonexistent-dir/out.bin").unwrap_err();
        assert!(matches!(err, MultitoneError::Transport(_)));
    }
}
