//! NMEA text messages
//!
//! A sentence received from the receiver is `$<body>*HH` followed by CR LF, where `HH` are the
//! two hex digits of the XOR of every body byte. The line feed ending the previous sentence is
//! used, together with `$`, to find the start of the next one.
//!
//! Commands are SiRF proprietary `$PSRF<ddd>,<arguments>*HH` sentences.
use heapless::Vec;

use crate::buffer::FrameBuffer;
use crate::checksum::nmea_checksum;
use crate::error::{BuildError, FrameError};
use crate::sync::{synchronize, NmeaSync, Patience};
use crate::transport::Transport;
use crate::{CHECKSUM_DELIMITER, CR, LF, MAX_BUFFER_SIZE};

/// Shortest line accepted before CR: `XX*HH`
pub const MIN_LINE_LENGTH: usize = 5;

/// `*HH`
const TRAILER_LENGTH: usize = 3;

const COMMAND_HEADER: &[u8] = b"$PSRF";

/// `$PSRF` + 3 digit id + `,` + `*HH` + CR LF
pub const COMMAND_OVERHEAD: usize = COMMAND_HEADER.len() + 3 + 1 + TRAILER_LENGTH + 2;

pub type NmeaFrame = Vec<u8, MAX_BUFFER_SIZE>;

/// A verified NMEA sentence, borrowed from the receive buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NmeaMessage<'a> {
    body: &'a [u8],
    checksum: u8,
}

#[allow(clippy::len_without_is_empty)]
impl<'a> NmeaMessage<'a> {
    /// Everything between `$` and `*`
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// The body as text, `None` if the receiver sent something which is not UTF-8
    pub fn as_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.body).ok()
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }
}

/// Reads one NMEA sentence from `transport` into `buffer`.
///
/// After synchronizing on `LF $`, bytes are read one at a time up to CR. A line that does not
/// end before the buffer is full, or before the transport stops delivering, is an
/// [`FrameError::IncompleteRead`] whose `expected` is only a lower bound.
pub fn read_message<'b, T>(
    transport: &mut T,
    buffer: &'b mut FrameBuffer,
    patience: &mut Patience,
) -> Result<NmeaMessage<'b>, FrameError>
where
    T: Transport + ?Sized,
{
    buffer.clear();
    synchronize::<NmeaSync, _>(transport, patience)?;

    let mut byte = [0u8; 1];
    loop {
        match transport.read(&mut byte) {
            Ok(1) if byte[0] == CR => break,
            Ok(1) => {
                if buffer.push(byte[0]).is_err() {
                    debug!("nmea: no CR within {} chars", buffer.len());
                    return Err(FrameError::IncompleteRead {
                        expected: buffer.len() + 1,
                        received: buffer.len(),
                    });
                }
            }
            _ => {
                debug!("nmea: line ended after {} chars without CR", buffer.len());
                return Err(FrameError::IncompleteRead {
                    expected: buffer.len() + 1,
                    received: buffer.len(),
                });
            }
        }
    }

    let buffer: &'b FrameBuffer = buffer;
    let line = buffer.as_slice();
    trace!("nmea: line of {} chars", line.len());
    if line.len() < MIN_LINE_LENGTH {
        return Err(FrameError::MessageTooShort(line.len()));
    }

    let (body, trailer) = line.split_at(line.len() - TRAILER_LENGTH);
    if trailer[0] != CHECKSUM_DELIMITER {
        return Err(FrameError::MalformedTrailer);
    }
    let mut carried = [0u8; 1];
    base16::decode_slice(&trailer[1..], &mut carried)
        .map_err(|_| FrameError::MalformedTrailer)?;

    let computed = nmea_checksum(body);
    if carried[0] != computed {
        warn!(
            "nmea: checksum mismatch, carried {} computed {}",
            carried[0], computed
        );
        return Err(FrameError::ChecksumMismatch {
            expected: carried[0] as u16,
            computed: computed as u16,
        });
    }

    Ok(NmeaMessage {
        body,
        checksum: computed,
    })
}

/// SiRF proprietary `$PSRF` command
///
/// `arguments` is the comma separated argument list, appended verbatim after the id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NmeaCommand<'a> {
    pub message_id: u16,
    pub arguments: &'a str,
}

impl<'a> NmeaCommand<'a> {
    pub fn new(message_id: u16, arguments: &'a str) -> Self {
        Self {
            message_id,
            arguments,
        }
    }

    /// Serializes the command into a complete line, CR LF included
    pub fn encode(&self) -> Result<NmeaFrame, BuildError> {
        if self.message_id > 999 {
            return Err(BuildError::InvalidArgument);
        }
        let frame_len = COMMAND_OVERHEAD + self.arguments.len();
        if frame_len > MAX_BUFFER_SIZE {
            return Err(BuildError::CommandTooLong(frame_len));
        }
        let too_long = |_: ()| BuildError::CommandTooLong(frame_len);

        let id = self.message_id;
        let digits = [
            b'0' + (id / 100) as u8,
            b'0' + (id / 10 % 10) as u8,
            b'0' + (id % 10) as u8,
        ];

        let mut frame = NmeaFrame::new();
        frame.extend_from_slice(COMMAND_HEADER).map_err(too_long)?;
        frame.extend_from_slice(&digits).map_err(too_long)?;
        frame.extend_from_slice(b",").map_err(too_long)?;
        frame
            .extend_from_slice(self.arguments.as_bytes())
            .map_err(too_long)?;

        // everything after '$'
        let checksum = nmea_checksum(&frame[1..]);
        let mut hex = [0u8; 2];
        base16::encode_config_slice(&[checksum], base16::EncodeUpper, &mut hex);

        frame
            .extend_from_slice(&[CHECKSUM_DELIMITER, hex[0], hex[1], CR, LF])
            .map_err(too_long)?;
        Ok(frame)
    }
}
