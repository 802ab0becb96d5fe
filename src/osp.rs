//! OSP binary messages
//!
//! On the wire every message looks like
//!
//! | bytes      | content                                             |
//! |------------|-----------------------------------------------------|
//! | 2          | start sequence `A0 A2`                              |
//! | 2          | payload length, big endian                          |
//! | length     | payload, first byte is the message id               |
//! | 2          | 15 bit checksum of the payload, big endian          |
//! | 2          | end sequence `B0 B3`                                |
//!
//! Reading stops after the checksum, the end sequence is skipped by the next synchronization.
use heapless::Vec;

use crate::buffer::FrameBuffer;
use crate::checksum::osp_checksum;
use crate::error::{BuildError, FrameError};
use crate::sync::{synchronize, OspSync, Patience};
use crate::transport::Transport;
use crate::{END1, END2, MAX_BUFFER_SIZE, START1, START2};

/// start (2) + length (2) + checksum (2) + end (2)
pub const FRAME_OVERHEAD: usize = 8;

/// Declared payload lengths must be below this to fit the buffer with the checksum
pub const PAYLOAD_LENGTH_LIMIT: usize = MAX_BUFFER_SIZE - 3;

pub type OspFrame = Vec<u8, MAX_BUFFER_SIZE>;

/// A verified OSP message, borrowed from the receive buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OspMessage<'a> {
    payload: &'a [u8],
    checksum: u16,
}

#[allow(clippy::len_without_is_empty)]
impl<'a> OspMessage<'a> {
    /// Payload including the message id, without length and checksum
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn message_id(&self) -> u8 {
        // payload is never empty, zero lengths are rejected while reading
        self.payload[0]
    }

    /// Message data following the id
    pub fn data(&self) -> &'a [u8] {
        &self.payload[1..]
    }

    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }
}

/// Reads one OSP message from `transport` into `buffer`.
///
/// Input is skipped until `START1 START2` while `patience` lasts. What is left of it is kept in
/// `patience` for the caller to inspect.
pub fn read_message<'b, T>(
    transport: &mut T,
    buffer: &'b mut FrameBuffer,
    patience: &mut Patience,
) -> Result<OspMessage<'b>, FrameError>
where
    T: Transport + ?Sized,
{
    buffer.clear();
    synchronize::<OspSync, _>(transport, patience)?;

    let mut length = [0u8; 2];
    match transport.read(&mut length) {
        Ok(2) => {}
        _ => {
            debug!("osp: payload length not received");
            return Err(FrameError::LengthReadError);
        }
    }
    let payload_len = u16::from_be_bytes(length);
    trace!("osp: payload length {}", payload_len);
    if payload_len == 0 || payload_len as usize >= PAYLOAD_LENGTH_LIMIT {
        debug!("osp: payload length {} out of range", payload_len);
        return Err(FrameError::PayloadLengthOutOfRange(payload_len));
    }

    // payload followed by the checksum
    let expected = payload_len as usize + 2;
    let received = buffer.fill_from(transport, expected);
    if received < expected {
        debug!("osp: {} of {} bytes received", received, expected);
        return Err(FrameError::IncompleteRead { expected, received });
    }

    let buffer: &'b FrameBuffer = buffer;
    let (payload, trailer) = buffer.as_slice().split_at(payload_len as usize);
    let carried = u16::from_be_bytes([trailer[0], trailer[1]]);
    let computed = osp_checksum(payload);
    if carried != computed {
        warn!(
            "osp: checksum mismatch for message id {}, carried {} computed {}",
            payload[0], carried, computed
        );
        return Err(FrameError::ChecksumMismatch {
            expected: carried,
            computed,
        });
    }

    Ok(OspMessage {
        payload,
        checksum: carried,
    })
}

/// OSP command to be sent to the receiver
///
/// `arguments` are the payload bytes following the message id, written as whitespace
/// separated numbers in `base`. Each number is truncated to a byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OspCommand<'a> {
    pub message_id: u8,
    pub arguments: &'a str,
    pub base: u32,
}

impl<'a> OspCommand<'a> {
    /// Command with hexadecimal arguments
    pub fn new(message_id: u8, arguments: &'a str) -> Self {
        Self {
            message_id,
            arguments,
            base: 16,
        }
    }

    pub fn with_base(mut self, base: u32) -> Self {
        self.base = base;
        self
    }

    /// Serializes the command into a complete frame, start and end sequences included
    pub fn encode(&self) -> Result<OspFrame, BuildError> {
        if !(2..=36).contains(&self.base) {
            return Err(BuildError::InvalidArgument);
        }

        let mut token_count = 0;
        for token in self.arguments.split_whitespace() {
            parse_token(token, self.base)?;
            token_count += 1;
        }

        let payload_len = 1 + token_count;
        let frame_len = FRAME_OVERHEAD + payload_len;
        if frame_len > MAX_BUFFER_SIZE {
            return Err(BuildError::CommandTooLong(frame_len));
        }
        let too_long = |_: ()| BuildError::CommandTooLong(frame_len);

        let mut frame = OspFrame::new();
        frame
            .extend_from_slice(&[START1, START2])
            .map_err(too_long)?;
        frame
            .extend_from_slice(&(payload_len as u16).to_be_bytes())
            .map_err(too_long)?;
        frame
            .push(self.message_id)
            .map_err(|_| BuildError::CommandTooLong(frame_len))?;
        for token in self.arguments.split_whitespace() {
            frame
                .push(parse_token(token, self.base)?)
                .map_err(|_| BuildError::CommandTooLong(frame_len))?;
        }

        let checksum = osp_checksum(&frame[4..]);
        frame
            .extend_from_slice(&checksum.to_be_bytes())
            .map_err(too_long)?;
        frame.extend_from_slice(&[END1, END2]).map_err(too_long)?;
        Ok(frame)
    }
}

fn parse_token(token: &str, base: u32) -> Result<u8, BuildError> {
    let digits = match base {
        16 => token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token),
        _ => token,
    };
    u64::from_str_radix(digits, base)
        .map(|value| value as u8)
        .map_err(|_| BuildError::InvalidArgument)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use rand::{thread_rng, Rng};
    use std::string::String;

    fn read(
        t: &mut MockTransport,
        patience: u32,
    ) -> (Result<(u8, std::vec::Vec<u8>), FrameError>, Patience) {
        let mut buffer = FrameBuffer::new();
        let mut patience = Patience::new(patience);
        let result = read_message(t, &mut buffer, &mut patience)
            .map(|m| (m.message_id(), m.payload().to_vec()));
        (result, patience)
    }

    #[test]
    fn test_read_message() {
        let mut t = MockTransport::with_input(&[
            0x00, START1, START2, 0x00, 0x03, 0x81, 0x02, 0x03, 0x00, 0x86, END1, END2,
        ]);
        let (result, patience) = read(&mut t, 10);
        assert_eq!(result, Ok((0x81, vec![0x81, 0x02, 0x03])));
        assert_eq!(patience.remaining(), 9);
        assert_eq!(t.input.len(), 2);
    }

    #[test]
    fn test_read_message_chunked_payload() {
        let mut t = MockTransport::with_input(&[
            START1, START2, 0x00, 0x03, 0x81, 0x02, 0x03, 0x00, 0x86,
        ]);
        let mut buffer = FrameBuffer::new();
        let mut patience = Patience::new(1);
        // length is read in a single call, payload may trickle in
        t.read_chunk = Some(2);
        let msg = read_message(&mut t, &mut buffer, &mut patience).unwrap();
        assert_eq!(msg.data(), &[0x02, 0x03]);
        assert_eq!(msg.checksum(), 0x86);
        assert_eq!(msg.len(), 3);
    }

    #[test]
    fn test_corrupted_payload_is_checksum_mismatch() {
        let mut t = MockTransport::with_input(&[
            START1, START2, 0x00, 0x03, 0x81, 0x03, 0x03, 0x00, 0x86, END1, END2,
        ]);
        let (result, _) = read(&mut t, 10);
        assert_eq!(
            result,
            Err(FrameError::ChecksumMismatch {
                expected: 0x86,
                computed: 0x87
            })
        );
    }

    #[test]
    fn test_any_single_byte_corruption_is_detected() {
        let frame = OspCommand::new(0x81, "02 03 10 ff").encode().unwrap();
        for idx in 4..frame.len() - 4 {
            let mut corrupted = frame.clone();
            corrupted[idx] ^= 0x01;
            let mut t = MockTransport::with_input(&corrupted);
            let (result, _) = read(&mut t, 10);
            assert!(
                matches!(result, Err(FrameError::ChecksumMismatch { .. })),
                "corruption at {} not detected",
                idx
            );
        }
    }

    #[test]
    fn test_no_start_sequence_is_sync_timeout() {
        let mut t = MockTransport::with_input(&[0x42; 100]);
        let (result, patience) = read(&mut t, 10);
        assert_eq!(result, Err(FrameError::SyncTimeout));
        assert_eq!(patience.remaining(), 0);
        assert_eq!(t.reads, 10);
    }

    #[test]
    fn test_length_read_error() {
        let mut t = MockTransport::with_input(&[START1, START2, 0x00]);
        let (result, _) = read(&mut t, 10);
        assert_eq!(result, Err(FrameError::LengthReadError));
    }

    #[test]
    fn test_declared_length_too_big_reads_no_payload() {
        let len = (MAX_BUFFER_SIZE as u16).to_be_bytes();
        let mut t = MockTransport::with_input(&[START1, START2, len[0], len[1], 0x01, 0x02]);
        let (result, _) = read(&mut t, 10);
        assert_eq!(
            result,
            Err(FrameError::PayloadLengthOutOfRange(MAX_BUFFER_SIZE as u16))
        );
        // two sync reads and the length
        assert_eq!(t.reads, 3);
        assert_eq!(t.input.len(), 2);
    }

    #[test]
    fn test_zero_length_is_out_of_range() {
        let mut t = MockTransport::with_input(&[START1, START2, 0x00, 0x00]);
        let (result, _) = read(&mut t, 10);
        assert_eq!(result, Err(FrameError::PayloadLengthOutOfRange(0)));
    }

    #[test]
    fn test_length_limit_boundary() {
        let limit = PAYLOAD_LENGTH_LIMIT as u16;
        let mut t = MockTransport::with_input(&[START1, START2]);
        t.input.extend(limit.to_be_bytes());
        let (result, _) = read(&mut t, 10);
        assert_eq!(result, Err(FrameError::PayloadLengthOutOfRange(limit)));

        // largest accepted payload
        let payload = [0x01u8; PAYLOAD_LENGTH_LIMIT - 1];
        let mut t = MockTransport::with_input(&[START1, START2]);
        t.input.extend(((PAYLOAD_LENGTH_LIMIT - 1) as u16).to_be_bytes());
        t.input.extend(payload);
        t.input.extend(osp_checksum(&payload).to_be_bytes());
        let (result, _) = read(&mut t, 10);
        assert_eq!(result.unwrap().1.len(), 2048);
    }

    #[test]
    fn test_incomplete_payload() {
        let mut t = MockTransport::with_input(&[START1, START2, 0x00, 0x05, 0x81, 0x02]);
        let (result, _) = read(&mut t, 10);
        assert_eq!(
            result,
            Err(FrameError::IncompleteRead {
                expected: 7,
                received: 2
            })
        );
    }

    #[test]
    fn test_encode_command() {
        let frame = OspCommand::new(0x81, "02 03").encode().unwrap();
        assert_eq!(
            &frame[..],
            &[START1, START2, 0x00, 0x03, 0x81, 0x02, 0x03, 0x00, 0x86, END1, END2]
        );
    }

    #[test]
    fn test_encode_command_without_arguments() {
        let frame = OspCommand::new(0x84, "   ").encode().unwrap();
        assert_eq!(
            &frame[..],
            &[START1, START2, 0x00, 0x01, 0x84, 0x00, 0x84, END1, END2]
        );
    }

    #[test]
    fn test_encode_command_bases() {
        let hex = OspCommand::new(0x80, "0x10 ff 1").encode().unwrap();
        let dec = OspCommand::new(0x80, "16 255 1").with_base(10).encode().unwrap();
        assert_eq!(hex, dec);
        // truncated to a byte
        let wide = OspCommand::new(0x80, "0x110 0x1ff 0x101").encode().unwrap();
        assert_eq!(hex, wide);
    }

    #[test]
    fn test_encode_command_invalid_argument() {
        assert_eq!(
            OspCommand::new(0x80, "01 zz").encode(),
            Err(BuildError::InvalidArgument)
        );
        assert_eq!(
            OspCommand::new(0x80, "19").with_base(8).encode(),
            Err(BuildError::InvalidArgument)
        );
        assert_eq!(
            OspCommand::new(0x80, "1").with_base(37).encode(),
            Err(BuildError::InvalidArgument)
        );
        assert_eq!(
            OspCommand::new(0x80, "-1").encode(),
            Err(BuildError::InvalidArgument)
        );
    }

    #[test]
    fn test_encode_command_too_long() {
        let max_tokens = MAX_BUFFER_SIZE - FRAME_OVERHEAD - 1;
        let mut args = String::new();
        for _ in 0..max_tokens {
            args.push_str("aa ");
        }
        let frame = OspCommand::new(0x80, &args).encode().unwrap();
        assert_eq!(frame.len(), MAX_BUFFER_SIZE);

        args.push_str("aa");
        assert_eq!(
            OspCommand::new(0x80, &args).encode(),
            Err(BuildError::CommandTooLong(MAX_BUFFER_SIZE + 1))
        );
    }

    #[test]
    fn test_random_payload_roundtrip() {
        let mut rng = thread_rng();
        for _ in 0..20 {
            let len = rng.gen_range(1, MAX_BUFFER_SIZE - FRAME_OVERHEAD);
            let mut payload = vec![0u8; len];
            rng.try_fill(&mut payload[..]).unwrap();

            let args: std::vec::Vec<String> =
                payload[1..].iter().map(|b| format!("{:02x}", b)).collect();
            let frame = OspCommand::new(payload[0], &args.join(" ")).encode().unwrap();

            let mut t = MockTransport::with_input(&frame);
            t.read_chunk = Some(rng.gen_range(2, 64));
            let (result, _) = read(&mut t, 1);
            assert_eq!(result, Ok((payload[0], payload)));
        }
    }
}
