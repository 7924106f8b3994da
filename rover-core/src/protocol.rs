//! Command protocol
//!
//! Frames look like `^0000<A><P>\r`. The parser collects the bytes between
//! the `^` and the carriage return into one of three fixed slots, decodes the
//! finished slot and moves on to the next slot. A slot that fills up without
//! a terminator is abandoned.

use crate::config::{
    BACKWARD_SCALE, BUMP_SCALE, FORWARD_SCALE, FRAME_LEN, FRAME_SLOTS, SPIN_SCALE,
};
use crate::display::{RowText, BLANK};
use crate::error::FrameError;

const START: u8 = b'^';
const END: u8 = b'\r';
const PREFIX: &[u8] = b"0000";

/// Bytes from the action code onwards echoed to the display
const ECHO_LEN: usize = 6;

/// Decoded command, durations already scaled to ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Forward(u32),
    Backward(u32),
    Right(u32),
    Left(u32),
    Bump(u32),
    Stop,
    LineFollow,
    Arrived,
    Identify,
    ExitLineFollow,
}

impl Command {
    /// Commands that put the wheels in motion and reset the motion timer
    pub fn is_timed(&self) -> bool {
        matches!(
            self,
            Self::Forward(_) | Self::Backward(_) | Self::Right(_) | Self::Left(_) | Self::Bump(_)
        )
    }
}

/// A command together with the raw suffix shown on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub echo: RowText,
}

/// Decodes the bytes between `^` and `\r`.
///
/// Zero padding between the `0000` prefix and the action byte is accepted,
/// so `00000F5` and `0000F5` both mean "forward for 5 × 25 ticks".
pub fn decode(frame: &[u8]) -> Result<Frame, FrameError> {
    let body = frame.strip_prefix(PREFIX).ok_or(FrameError::BadPrefix)?;
    let start = body
        .iter()
        .position(|b| *b != b'0')
        .ok_or(FrameError::MissingAction)?;
    let body = &body[start..];
    let action = body[0];

    let parameter = |scale: u32| -> Result<u32, FrameError> {
        match body.get(1) {
            Some(d) if d.is_ascii_digit() => Ok(u32::from(d - b'0') * scale),
            Some(d) => Err(FrameError::BadParameter(*d)),
            None => Err(FrameError::BadParameter(END)),
        }
    };

    let command = match action {
        b'F' => Command::Forward(parameter(FORWARD_SCALE)?),
        b'B' => Command::Backward(parameter(BACKWARD_SCALE)?),
        b'R' => Command::Right(parameter(SPIN_SCALE)?),
        b'L' => Command::Left(parameter(SPIN_SCALE)?),
        b'P' => Command::Bump(parameter(BUMP_SCALE)?),
        b'S' => Command::Stop,
        b'C' => Command::LineFollow,
        b'+' => Command::Arrived,
        b'D' => Command::Identify,
        b'E' => Command::ExitLineFollow,
        other => return Err(FrameError::UnknownAction(other)),
    };

    let mut echo = BLANK;
    for (dst, src) in echo.iter_mut().zip(body.iter().take(ECHO_LEN)) {
        *dst = *src;
    }
    Ok(Frame { command, echo })
}

/// Frame extractor over a byte stream
#[derive(Debug, Clone)]
pub struct Parser {
    slots: [[u8; FRAME_LEN]; FRAME_SLOTS],
    slot: usize,
    index: usize,
    in_frame: bool,
    last_error: Option<FrameError>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub const fn new() -> Self {
        Self {
            slots: [[0; FRAME_LEN]; FRAME_SLOTS],
            slot: 0,
            index: 0,
            in_frame: false,
            last_error: None,
        }
    }

    /// Slot the next frame is collected into
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Why the most recent dropped frame was dropped
    pub fn last_error(&self) -> Option<FrameError> {
        self.last_error
    }

    /// Feeds one byte. Returns the decode result once a frame completes or
    /// is abandoned; bytes outside a frame are ignored.
    pub fn push(&mut self, byte: u8) -> Option<Result<Frame, FrameError>> {
        if byte == START {
            // a start marker always resynchronises onto a fresh frame
            self.in_frame = true;
            self.index = 0;
            return None;
        }
        if !self.in_frame {
            return None;
        }

        if byte == END {
            let result = decode(&self.slots[self.slot][..self.index]);
            self.finish();
            if let Err(e) = result {
                debug!("frame dropped: {}", e);
                self.last_error = Some(e);
            }
            return Some(result);
        }

        self.slots[self.slot][self.index] = byte;
        self.index += 1;
        if self.index >= FRAME_LEN {
            debug!("frame dropped: {}", FrameError::Overlong);
            self.finish();
            self.last_error = Some(FrameError::Overlong);
            return Some(Err(FrameError::Overlong));
        }
        None
    }

    fn finish(&mut self) {
        self.slot = (self.slot + 1) % FRAME_SLOTS;
        self.index = 0;
        self.in_frame = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(bytes: &[u8]) -> Option<Result<Frame, FrameError>> {
        let mut parser = Parser::new();
        let mut out = None;
        for b in bytes {
            if let Some(r) = parser.push(*b) {
                out = Some(r);
            }
        }
        out
    }

    fn command(bytes: &[u8]) -> Command {
        parse(bytes).unwrap().unwrap().command
    }

    #[test]
    fn test_forward_five() {
        assert_eq!(command(b"^00000F5\r"), Command::Forward(125));
        assert_eq!(command(b"^0000F5\r"), Command::Forward(125));
    }

    #[test]
    fn test_scaling_per_action() {
        assert_eq!(command(b"^0000B2\r"), Command::Backward(50));
        assert_eq!(command(b"^0000R3\r"), Command::Right(60));
        assert_eq!(command(b"^0000L1\r"), Command::Left(20));
        assert_eq!(command(b"^0000P9\r"), Command::Bump(45));
        assert_eq!(command(b"^00000S\r"), Command::Stop);
        assert_eq!(command(b"^0000C\r"), Command::LineFollow);
        assert_eq!(command(b"^0000+\r"), Command::Arrived);
        assert_eq!(command(b"^0000D\r"), Command::Identify);
        assert_eq!(command(b"^0000E\r"), Command::ExitLineFollow);
    }

    #[test]
    fn test_echo_starts_at_action() {
        let frame = parse(b"^00000F5\r").unwrap().unwrap();
        assert_eq!(&frame.echo, b"F5        ");
    }

    #[test]
    fn test_rejected_frames() {
        assert_eq!(parse(b"^1234F5\r"), Some(Err(FrameError::BadPrefix)));
        assert_eq!(parse(b"^000\r"), Some(Err(FrameError::BadPrefix)));
        assert_eq!(parse(b"^0000\r"), Some(Err(FrameError::MissingAction)));
        assert_eq!(parse(b"^0000X\r"), Some(Err(FrameError::UnknownAction(b'X'))));
        assert_eq!(parse(b"^0000Fz\r"), Some(Err(FrameError::BadParameter(b'z'))));
        assert_eq!(parse(b"^0000F\r"), Some(Err(FrameError::BadParameter(b'\r'))));
    }

    #[test]
    fn test_noise_outside_frames_is_ignored() {
        assert_eq!(parse(b"OK\r\n+IPD,0,9:"), None);
        assert_eq!(command(b"\r\n+IPD,0,9:^0000S\r\n"), Command::Stop);
    }

    #[test]
    fn test_slot_advances_modulo_three() {
        let mut parser = Parser::new();
        for expected in [1, 2, 0, 1] {
            for b in b"^0000S\r" {
                parser.push(*b);
            }
            assert_eq!(parser.slot(), expected);
        }
    }

    #[test]
    fn test_overlong_frame_is_abandoned() {
        let mut parser = Parser::new();
        let mut results = 0;
        for b in b"^000000000000000000F5\r" {
            if let Some(r) = parser.push(*b) {
                assert_eq!(r, Err(FrameError::Overlong));
                results += 1;
            }
        }
        assert_eq!(results, 1);
        assert_eq!(parser.slot(), 1);
        assert_eq!(parser.last_error(), Some(FrameError::Overlong));

        // the parser recovers on the next start marker
        let mut last = None;
        for b in b"^0000F5\r" {
            last = parser.push(*b).or(last);
        }
        assert_eq!(last.unwrap().unwrap().command, Command::Forward(125));
    }
}
