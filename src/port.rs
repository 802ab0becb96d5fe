//! A transport paired with the buffer messages are received into.
//!
//! [`Port`] is what applications talk to: it reads OSP and NMEA messages and writes commands of
//! both kinds over one [`Transport`]. Access goes through `&mut self`, one operation at a time.
//! Applications reading and writing from different threads split the transport themselves.
use crate::buffer::FrameBuffer;
use crate::error::{BuildError, FrameError, WriteError};
use crate::nmea::{self, NmeaCommand, NmeaMessage};
use crate::osp::{self, OspCommand, OspMessage};
use crate::sync::Patience;
use crate::transport::Transport;

/// Patience used by [`Port::read_osp`] and [`Port::read_nmea`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortConfig {
    pub osp_patience: Patience,
    pub nmea_patience: Patience,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            osp_patience: Patience::OSP_DEFAULT,
            nmea_patience: Patience::NMEA_DEFAULT,
        }
    }
}

pub struct Port<T> {
    transport: T,
    config: PortConfig,
    rx: FrameBuffer,
    remaining_patience: Patience,
}

impl<T: Transport> Port<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, PortConfig::default())
    }

    pub fn with_config(transport: T, config: PortConfig) -> Self {
        Self {
            transport,
            config,
            rx: FrameBuffer::new(),
            remaining_patience: Patience::new(0),
        }
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    /// Patience left over by the last read
    pub fn remaining_patience(&self) -> Patience {
        self.remaining_patience
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Reads an OSP message, skipping at most `patience` useless bytes or empty reads on the way
    pub fn read_osp_message(&mut self, patience: Patience) -> Result<OspMessage<'_>, FrameError> {
        let mut patience = patience;
        let result = osp::read_message(&mut self.transport, &mut self.rx, &mut patience);
        self.remaining_patience = patience;
        result
    }

    /// Reads an OSP message with the configured patience
    pub fn read_osp(&mut self) -> Result<OspMessage<'_>, FrameError> {
        let patience = self.config.osp_patience;
        self.read_osp_message(patience)
    }

    /// Reads a NMEA sentence, skipping at most `patience` useless bytes or empty reads on the way
    pub fn read_nmea_message(&mut self, patience: Patience) -> Result<NmeaMessage<'_>, FrameError> {
        let mut patience = patience;
        let result = nmea::read_message(&mut self.transport, &mut self.rx, &mut patience);
        self.remaining_patience = patience;
        result
    }

    /// Reads a NMEA sentence with the configured patience
    pub fn read_nmea(&mut self) -> Result<NmeaMessage<'_>, FrameError> {
        let patience = self.config.nmea_patience;
        self.read_nmea_message(patience)
    }

    /// Sends an OSP command and waits until it left the line
    pub fn write_osp_command(&mut self, command: &OspCommand) -> Result<(), BuildError> {
        let frame = command.encode()?;
        debug!(
            "osp: sending message id {} in {} bytes",
            command.message_id,
            frame.len()
        );
        send_frame(&mut self.transport, &frame)?;
        Ok(())
    }

    /// Sends a `$PSRF` command and waits until it left the line
    pub fn write_nmea_command(&mut self, command: &NmeaCommand) -> Result<(), BuildError> {
        let frame = command.encode()?;
        debug!(
            "nmea: sending $PSRF{} in {} bytes",
            command.message_id,
            frame.len()
        );
        send_frame(&mut self.transport, &frame)?;
        Ok(())
    }
}

/// Writes the whole frame, drains the transport and only then checks all of it was accepted
fn send_frame<T: Transport + ?Sized>(transport: &mut T, frame: &[u8]) -> Result<(), WriteError> {
    let written = transport.write(frame).map_err(|_| WriteError::Transport)?;
    if transport.drain().is_err() {
        warn!("drain failed after writing {} bytes", written);
        return Err(WriteError::Drain);
    }
    if written != frame.len() {
        warn!("short write, {} of {} bytes", written, frame.len());
        return Err(WriteError::ShortWrite {
            written,
            expected: frame.len(),
        });
    }
    Ok(())
}
