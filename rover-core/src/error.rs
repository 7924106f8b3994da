//! Error types
//!
//! None of these are fatal. Transmit errors are reported to the caller that
//! tried to arm a sequence, frame errors describe why a frame was dropped.

use core::fmt;

/// Arming a transmit sequence failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxError {
    /// A previous sequence is still draining
    Busy,
    /// Sequences must end with a line feed, it is what stops the drain
    MissingTerminator,
    /// Sequence longer than the transmit buffer
    TooLong,
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "transmit sequence still draining"),
            Self::MissingTerminator => write!(f, "transmit sequence lacks a line feed"),
            Self::TooLong => write!(f, "transmit sequence exceeds buffer"),
        }
    }
}

/// Reason a command frame was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// First four bytes are not `0000`
    BadPrefix,
    /// Frame ended before the action byte
    MissingAction,
    /// Action byte not in the command table
    UnknownAction(u8),
    /// Movement command without a digit parameter
    BadParameter(u8),
    /// Slot filled up without a carriage return
    Overlong,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadPrefix => write!(f, "frame without 0000 prefix"),
            Self::MissingAction => write!(f, "frame without action byte"),
            Self::UnknownAction(b) => write!(f, "unknown action byte 0x{:02x}", b),
            Self::BadParameter(b) => write!(f, "bad parameter byte 0x{:02x}", b),
            Self::Overlong => write!(f, "unterminated frame abandoned"),
        }
    }
}
