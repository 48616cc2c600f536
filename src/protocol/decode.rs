//! # Command Stream Decoder
//!
//! Parses a byte stream built by this crate back into [`Command`]s.
//!
//! Only the command set this crate emits is understood; anything else is
//! reported as an input error with its byte offset. Raster frames are walked
//! by their length field, so a decoded stream proves the framing is
//! self-describing.
//!
//! ```
//! use multitone::protocol::{commands, decode::{decode, Command}};
//!
//! let mut stream = commands::head_energizing(1);
//! stream.extend(commands::feed_and_cut(0));
//!
//! let cmds = decode(&stream).unwrap();
//! assert_eq!(cmds, vec![Command::HeadEnergizing(1), Command::FeedCut(0)]);
//! ```

use std::fmt;

use super::commands::{CUT_FEED_FULL, FN_HEAD_ENERGIZING, FN_PRINT_SPEED, GS, print_stored};
use super::graphics::{FN_STORE_RASTER, HEADER_LEN, MODE_MULTITONE, OPCODE, PARAM_LEN};
use crate::error::MultitoneError;

/// One decoded printer command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `GS ( K` fn 97
    HeadEnergizing(u8),
    /// `GS ( K` fn 50
    PrintSpeed(u8),
    /// `GS 8 L` fn 112, multi-tone
    Raster {
        color: u8,
        width: u16,
        height: u16,
        data: Vec<u8>,
    },
    /// `GS ( L` fn 50
    PrintStored,
    /// `GS V A n`
    FeedCut(u8),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeadEnergizing(n) => write!(f, "head energizing mode {}", n),
            Self::PrintSpeed(n) => write!(f, "print speed {}", n),
            Self::Raster {
                color,
                width,
                height,
                data,
            } => write!(
                f,
                "raster plane '{}' {}x{} ({} bytes)",
                *color as char,
                width,
                height,
                data.len()
            ),
            Self::PrintStored => write!(f, "print stored graphics"),
            Self::FeedCut(n) => write!(f, "feed {} and cut", n),
        }
    }
}

/// Decode a complete command stream.
pub fn decode(stream: &[u8]) -> Result<Vec<Command>, MultitoneError> {
    let mut commands = Vec::new();
    let mut pos = 0;

    while pos < stream.len() {
        let (command, used) = decode_one(&stream[pos..]).map_err(|msg| {
            MultitoneError::Input(format!("offset {}: {}", pos, msg))
        })?;
        commands.push(command);
        pos += used;
    }

    Ok(commands)
}

/// Decode the command at the start of `bytes`, returning it and its length.
fn decode_one(bytes: &[u8]) -> Result<(Command, usize), String> {
    if bytes[0] != GS {
        return Err(format!("unknown command byte 0x{:02X}", bytes[0]));
    }
    take(bytes, 2)?;

    match bytes[1] {
        b'(' => decode_paren(bytes),
        b'8' => decode_raster(bytes),
        b'V' => {
            let cmd = take(bytes, 4)?;
            if cmd[2] != CUT_FEED_FULL {
                return Err(format!("unsupported cut mode {}", cmd[2]));
            }
            Ok((Command::FeedCut(cmd[3]), 4))
        }
        other => Err(format!("unknown GS command 0x{:02X}", other)),
    }
}

fn decode_paren(bytes: &[u8]) -> Result<(Command, usize), String> {
    let cmd = take(bytes, 7)?;
    if cmd[3] != 0x02 || cmd[4] != 0x00 {
        return Err(format!("unexpected parameter length {}", u16::from_le_bytes([cmd[3], cmd[4]])));
    }

    match (cmd[2], cmd[5]) {
        (b'K', FN_HEAD_ENERGIZING) => Ok((Command::HeadEnergizing(cmd[6]), 7)),
        (b'K', FN_PRINT_SPEED) => Ok((Command::PrintSpeed(cmd[6]), 7)),
        (b'L', _) if cmd == print_stored().as_slice() => Ok((Command::PrintStored, 7)),
        (kind, function) => Err(format!(
            "unsupported GS ( {} function 0x{:02X}",
            kind as char, function
        )),
    }
}

fn decode_raster(bytes: &[u8]) -> Result<(Command, usize), String> {
    let header = take(bytes, HEADER_LEN)?;
    if header[..3] != OPCODE {
        return Err("malformed GS 8 L opcode".to_string());
    }

    let length = u32::from_le_bytes([header[3], header[4], header[5], header[6]]) as usize;
    if length < PARAM_LEN {
        return Err(format!("raster length {} shorter than its parameters", length));
    }
    if header[7..9] != FN_STORE_RASTER || header[9] != MODE_MULTITONE {
        return Err("raster frame is not a multi-tone store command".to_string());
    }

    let total = 7 + length;
    let frame = take(bytes, total)?;
    let width = u16::from_le_bytes([header[13], header[14]]);
    let height = u16::from_le_bytes([header[15], header[16]]);
    let data = frame[HEADER_LEN..].to_vec();

    let expected = (width as usize).div_ceil(8) * height as usize;
    if data.len() != expected {
        return Err(format!(
            "raster {}x{} declares {} data bytes, expected {}",
            width,
            height,
            data.len(),
            expected
        ));
    }

    Ok((
        Command::Raster {
            color: header[12],
            width,
            height,
            data,
        },
        total,
    ))
}

fn take(bytes: &[u8], len: usize) -> Result<&[u8], String> {
    bytes
        .get(..len)
        .ok_or_else(|| format!("truncated command: need {} bytes, have {}", len, bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{commands, graphics};

    #[test]
    fn test_decode_setup_commands() {
        let mut stream = commands::head_energizing(1);
        stream.extend(commands::print_speed(3));
        stream.extend(commands::print_stored());

        let cmds = decode(&stream).unwrap();
        assert_eq!(
            cmds,
            vec![
                Command::HeadEnergizing(1),
                Command::PrintSpeed(3),
                Command::PrintStored
            ]
        );
    }

    #[test]
    fn test_decode_recovers_plane_bytes() {
        let planes = [vec![1, 2, 3, 4], vec![5, 6, 7, 8], vec![9, 10, 11, 12], vec![13, 14, 15, 16]];
        let stream = graphics::slice(&planes, 10, 2);

        let cmds = decode(&stream).unwrap();
        assert_eq!(cmds.len(), 5);
        for (i, cmd) in cmds[..4].iter().enumerate() {
            match cmd {
                Command::Raster {
                    color,
                    width,
                    height,
                    data,
                } => {
                    assert_eq!(*color, graphics::COLOR_CODES[i]);
                    assert_eq!((*width, *height), (10, 2));
                    assert_eq!(data, &planes[i]);
                }
                other => panic!("expected raster, got {:?}", other),
            }
        }
        assert_eq!(cmds[4], Command::PrintStored);
    }

    #[test]
    fn test_decode_rejects_truncated_raster() {
        let frame = graphics::raster_plane(b'1', 8, 2, &[0xFF, 0x00]);
        let err = decode(&frame[..frame.len() - 1]).unwrap_err();
        assert!(err.to_string().contains("truncated"), "{}", err);
    }

    #[test]
    fn test_decode_rejects_unknown_bytes() {
        let mut stream = commands::print_speed(1);
        stream.push(0x1B);
        let err = decode(&stream).unwrap_err();
        assert!(err.to_string().contains("offset 7"), "{}", err);
    }

    #[test]
    fn test_decode_empty_stream() {
        assert!(decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_display() {
        let cmd = Command::Raster {
            color: b'2',
            width: 256,
            height: 50,
            data: vec![0; 1600],
        };
        assert_eq!(cmd.to_string(), "raster plane '2' 256x50 (1600 bytes)");
    }
}
