//! Byte transport the framers run on.
//!
//! Opening the device and setting up line parameters (speed, raw mode, inter-byte timeout) is
//! the caller's business. The framing layer only needs blocking reads and writes plus a way to
//! wait until written bytes have left the local buffer.

/// Blocking byte transport, usually a serial line
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Reads up to `buf.len()` bytes. `Ok(0)` means nothing arrived before the line timeout
    /// or end of stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Writes `buf`, returning how many bytes were accepted
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;

    /// Blocks until every written byte was transmitted
    fn drain(&mut self) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        (**self).write(buf)
    }

    fn drain(&mut self) -> Result<(), Self::Error> {
        (**self).drain()
    }
}

/// Adapts any `std::io::Read + std::io::Write`, e.g. a port opened with `serialport`.
///
/// Timeouts reported as errors by the underlying reader are turned into empty reads, so they
/// only cost patience. `drain` maps to `flush`, which serial ports implement with `tcdrain`.
#[cfg(feature = "std")]
pub struct IoTransport<P> {
    inner: P,
}

#[cfg(feature = "std")]
impl<P> IoTransport<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &P {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut P {
        &mut self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<P: std::io::Read + std::io::Write> Transport for IoTransport<P> {
    type Error = std::io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        use std::io::ErrorKind;

        match self.inner.read(buf) {
            Err(ref e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            result => result,
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.inner.write(buf)
    }

    fn drain(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}
