use defmt::Formatter;

use crate::error::{BuildError, FrameError, StatusCode, WriteError};
use crate::sync::{NmeaSync, OspSync, Patience};

impl defmt::Format for FrameError {
    fn format(&self, fmt: Formatter<'_>) {
        match *self {
            FrameError::SyncTimeout => defmt::write!(fmt, "FrameError::SyncTimeout"),
            FrameError::LengthReadError => defmt::write!(fmt, "FrameError::LengthReadError"),
            FrameError::PayloadLengthOutOfRange(len) => {
                defmt::write!(fmt, "FrameError::PayloadLengthOutOfRange({=u16})", len)
            }
            FrameError::IncompleteRead { expected, received } => defmt::write!(
                fmt,
                "FrameError::IncompleteRead {{ expected: {=usize}, received: {=usize} }}",
                expected,
                received
            ),
            FrameError::MessageTooShort(len) => {
                defmt::write!(fmt, "FrameError::MessageTooShort({=usize})", len)
            }
            FrameError::MalformedTrailer => defmt::write!(fmt, "FrameError::MalformedTrailer"),
            FrameError::ChecksumMismatch { expected, computed } => defmt::write!(
                fmt,
                "FrameError::ChecksumMismatch {{ expected: {=u16:#x}, computed: {=u16:#x} }}",
                expected,
                computed
            ),
        }
    }
}

impl defmt::Format for WriteError {
    fn format(&self, fmt: Formatter<'_>) {
        match *self {
            WriteError::ShortWrite { written, expected } => defmt::write!(
                fmt,
                "WriteError::ShortWrite {{ written: {=usize}, expected: {=usize} }}",
                written,
                expected
            ),
            WriteError::Transport => defmt::write!(fmt, "WriteError::Transport"),
            WriteError::Drain => defmt::write!(fmt, "WriteError::Drain"),
        }
    }
}

impl defmt::Format for BuildError {
    fn format(&self, fmt: Formatter<'_>) {
        match self {
            BuildError::InvalidArgument => defmt::write!(fmt, "BuildError::InvalidArgument"),
            BuildError::CommandTooLong(len) => {
                defmt::write!(fmt, "BuildError::CommandTooLong({=usize})", len)
            }
            BuildError::Write(e) => defmt::write!(fmt, "BuildError::Write({})", e),
        }
    }
}

impl defmt::Format for StatusCode {
    fn format(&self, fmt: Formatter<'_>) {
        defmt::write!(fmt, "StatusCode({=u8})", *self as u8)
    }
}

impl defmt::Format for Patience {
    fn format(&self, fmt: Formatter<'_>) {
        defmt::write!(fmt, "Patience({=u32})", self.remaining())
    }
}

impl defmt::Format for OspSync {
    fn format(&self, fmt: Formatter<'_>) {
        defmt::write!(fmt, "OspSync({=u8})", self.stage())
    }
}

impl defmt::Format for NmeaSync {
    fn format(&self, fmt: Formatter<'_>) {
        defmt::write!(fmt, "NmeaSync({=u8})", self.stage())
    }
}
