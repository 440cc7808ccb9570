use crate::{command::RequestMode, request::RequestStatus};
use core::{fmt, result::Result as CoreResult};
use thiserror::Error;

pub type Result<T> = CoreResult<T, Error>;

/// Part of an attempt that ran out of time
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Phase {
    Acknowledgment,
    Payload,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Acknowledgment => f.write_str("acknowledgment"),
            Phase::Payload => f.write_str("payload"),
        }
    }
}

/// Framing broke while reading the response to a request
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ProtocolError {
    #[error("No line feed within {len} acknowledgment bytes")]
    AckOverflow { len: usize },
    #[error("Discarded {discarded} bytes of noise without finding an acknowledgment")]
    NoiseOverflow { discarded: usize },
    #[error("Acknowledgment of {len} bytes is not valid text")]
    UnreadableAck { len: usize },
    #[error("Row {row} ends with {found:#04x} instead of a line feed")]
    MissingRowDelimiter { row: usize, found: u8 },
}

/// Payload does not fit the layout of the requested mode
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FormatError {
    #[error("Unknown request mode code {0}")]
    UnknownMode(u8),
    #[error("Unknown request mode \"{0}\"")]
    UnknownModeName(String),
    #[error("Request mode {0} has no row structure")]
    NoRowStructure(RequestMode),
    #[error("Request mode {0} has no payload")]
    NoPayload(RequestMode),
    #[error("Payload for {mode} should be {expected} bytes long, got {actual}")]
    LengthMismatch {
        mode: RequestMode,
        expected: usize,
        actual: usize,
    },
    #[error("Row {row} is not terminated by a line feed")]
    MisplacedDelimiter { row: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("No complete {0} arrived before the deadline")]
    Timeout(Phase),
    #[error("Malformed response: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("Invalid frame format: {0}")]
    Format(#[from] FormatError),
    #[error("Request is {actual}, expected it to be {expected}")]
    UnexpectedState {
        expected: RequestStatus,
        actual: RequestStatus,
    },

    #[error("Invalid data: {0}")]
    InvalidData(&'static str),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[cfg(feature = "serialport")]
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),
}

impl Error {
    /// Whether issuing a fresh request may succeed where this one failed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Protocol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_policy_classification() {
        assert!(Error::Timeout(Phase::Payload).is_recoverable());
        assert!(Error::from(ProtocolError::AckOverflow { len: 255 }).is_recoverable());
        assert!(!Error::from(FormatError::UnknownMode(9)).is_recoverable());
        assert!(!Error::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe)).is_recoverable());
    }

    #[test]
    fn describes_failures() {
        assert_eq!(
            Error::Timeout(Phase::Acknowledgment).to_string(),
            "No complete acknowledgment arrived before the deadline"
        );
        assert_eq!(
            ProtocolError::MissingRowDelimiter { row: 3, found: 0xff }.to_string(),
            "Row 3 ends with 0xff instead of a line feed"
        );
    }
}
