//! Errors of reading and writing messages, and the status codes they map to.
#[cfg(feature = "std")]
use core::fmt;

/// Why a message could not be read
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameError {
    /// patience was exhausted before the start markers were seen
    SyncTimeout,
    /// the two OSP length bytes could not be read
    LengthReadError,
    /// the declared OSP payload length is 0 or does not fit the buffer
    PayloadLengthOutOfRange(u16),
    /// the stream ended or the buffer filled up before the message was complete
    IncompleteRead { expected: usize, received: usize },
    /// NMEA line shorter than the minimal `XX*HH`
    MessageTooShort(usize),
    /// NMEA checksum field is not `*` followed by two hex digits
    MalformedTrailer,
    ChecksumMismatch { expected: u16, computed: u16 },
}

impl FrameError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FrameError::SyncTimeout => StatusCode::SyncTimeout,
            FrameError::LengthReadError => StatusCode::LengthReadError,
            FrameError::PayloadLengthOutOfRange(_) => StatusCode::PayloadLengthOutOfRange,
            FrameError::IncompleteRead { .. } => StatusCode::IncompleteRead,
            FrameError::MessageTooShort(_) => StatusCode::MessageTooShort,
            FrameError::MalformedTrailer => StatusCode::MalformedTrailer,
            FrameError::ChecksumMismatch { .. } => StatusCode::ChecksumMismatch,
        }
    }
}

#[cfg(feature = "std")]
impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FrameError::SyncTimeout => write!(f, "start of message not found before patience ran out"),
            FrameError::LengthReadError => write!(f, "could not read payload length"),
            FrameError::PayloadLengthOutOfRange(len) => {
                write!(f, "payload length {} out of range", len)
            }
            FrameError::IncompleteRead { expected, received } => write!(
                f,
                "incomplete message, expected {} bytes, received {}",
                expected, received
            ),
            FrameError::MessageTooShort(len) => write!(f, "message of {} chars is too short", len),
            FrameError::MalformedTrailer => write!(f, "malformed checksum field"),
            FrameError::ChecksumMismatch { expected, computed } => write!(
                f,
                "checksum mismatch, message carries {:#06x}, computed {:#06x}",
                expected, computed
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}

/// Why a command could not be sent
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// argument token, base or message id not representable
    InvalidArgument,
    /// the frame would need this many bytes, more than the buffer holds
    CommandTooLong(usize),
    Write(WriteError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteError {
    ShortWrite { written: usize, expected: usize },
    /// the transport refused the write
    Transport,
    /// waiting for the output to drain failed
    Drain,
}

impl From<WriteError> for BuildError {
    fn from(e: WriteError) -> BuildError {
        BuildError::Write(e)
    }
}

#[cfg(feature = "std")]
impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuildError::InvalidArgument => write!(f, "invalid command argument"),
            BuildError::CommandTooLong(len) => write!(f, "command of {} bytes is too long", len),
            BuildError::Write(WriteError::ShortWrite { written, expected }) => write!(
                f,
                "error sending command, {} of {} bytes written",
                written, expected
            ),
            BuildError::Write(WriteError::Transport) => write!(f, "error sending command"),
            BuildError::Write(WriteError::Drain) => write!(f, "error draining command"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BuildError {}

/// Numeric outcome of a read
///
/// `0..=6` keep the values historically returned for OSP reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum StatusCode {
    Ok = 0,
    ChecksumMismatch = 1,
    IncompleteRead = 2,
    PayloadLengthOutOfRange = 3,
    LengthReadError = 4,
    MessageTooShort = 5,
    SyncTimeout = 6,
    MalformedTrailer = 7,
}

impl TryFrom<u8> for StatusCode {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StatusCode::Ok),
            1 => Ok(StatusCode::ChecksumMismatch),
            2 => Ok(StatusCode::IncompleteRead),
            3 => Ok(StatusCode::PayloadLengthOutOfRange),
            4 => Ok(StatusCode::LengthReadError),
            5 => Ok(StatusCode::MessageTooShort),
            6 => Ok(StatusCode::SyncTimeout),
            7 => Ok(StatusCode::MalformedTrailer),
            _ => Err("Unknown StatusCode"),
        }
    }
}

impl<T> From<&Result<T, FrameError>> for StatusCode {
    fn from(result: &Result<T, FrameError>) -> Self {
        match result {
            Ok(_) => StatusCode::Ok,
            Err(e) => e.status_code(),
        }
    }
}

#[cfg(feature = "std")]
impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StatusCode::Ok => write!(f, "Message received"),
            StatusCode::ChecksumMismatch => write!(f, "Error: message checksum does not match"),
            StatusCode::IncompleteRead => {
                write!(f, "Error: not enough bytes received for the message")
            }
            StatusCode::PayloadLengthOutOfRange => write!(f, "Error: payload length out of range"),
            StatusCode::LengthReadError => write!(f, "Error: unable to read payload length"),
            StatusCode::MessageTooShort => write!(f, "Error: message too short"),
            StatusCode::SyncTimeout => {
                write!(f, "Error: start of message not received before patience ran out")
            }
            StatusCode::MalformedTrailer => write!(f, "Error: malformed checksum field"),
        }
    }
}
