//! Reusable receive buffer.
use heapless::Vec;

use crate::MAX_BUFFER_SIZE;

/// Fixed capacity storage for the message currently being received.
///
/// Cleared at the start of every read and filled through an explicit cursor, so a buffer can be
/// reused across reads without reallocating. Its length never exceeds [`MAX_BUFFER_SIZE`].
pub struct FrameBuffer {
    buf: Vec<u8, MAX_BUFFER_SIZE>,
}

impl FrameBuffer {
    pub const CAPACITY: usize = MAX_BUFFER_SIZE;

    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buf.len() == Self::CAPACITY
    }

    pub fn remaining(&self) -> usize {
        Self::CAPACITY - self.buf.len()
    }

    /// Appends one byte, handing it back if the buffer is full
    pub fn push(&mut self, byte: u8) -> Result<(), u8> {
        self.buf.push(byte)
    }

    /// Reads from `transport` into the free space until `wanted` more bytes were stored or a read
    /// returns nothing. Returns how many bytes were stored by this call.
    ///
    /// A failed read ends filling the same way an empty one does.
    pub fn fill_from<T>(&mut self, transport: &mut T, wanted: usize) -> usize
    where
        T: crate::Transport + ?Sized,
    {
        let start = self.buf.len();
        let end = start + wanted.min(self.remaining());
        // heapless 0.7 has no way to hand out spare capacity, zero it first and shrink after
        if self.buf.resize_default(end).is_err() {
            return 0;
        }

        let mut stored = start;
        while stored < end {
            match transport.read(&mut self.buf[stored..end]) {
                Ok(0) | Err(_) => break,
                Ok(n) => stored += n,
            }
        }
        self.buf.truncate(stored);
        stored - start
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for FrameBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
