//! Framing layer for the two protocols spoken by SiRF receivers over a serial line.
//!
//! OSP is binary, wrapped in `A0 A2 .. B0 B3` markers with a big-endian length and a 15 bit
//! additive checksum. NMEA is line based, `$<body>*HH` terminated by CR/LF, with an XOR checksum.
//!
//! Reading a message first synchronizes on the protocol's start markers, spending a
//! [`Patience`](sync::Patience) budget for every byte (or empty read) which does not move the
//! synchronization forward. Writing a command serializes it into a complete frame, writes it and
//! drains the line.
//!
//! Opening and configuring the serial device is not done here - any [`Transport`] will do, and
//! with the `std` feature any `std::io::Read + std::io::Write` (e.g. a `serialport` port) can be
//! wrapped in [`transport::IoTransport`].

#![cfg_attr(not(any(feature = "std", test)), no_std)]

#[macro_use]
mod fmt;

pub mod buffer;
pub mod checksum;
pub mod error;
pub mod nmea;
pub mod osp;
pub mod port;
pub mod sync;
pub mod transport;

// include defmt::Format implementations
// we don't want them derive()d in the modules unless defmt-impl feature is set
#[cfg(feature = "defmt-impl")]
pub mod defmt;

// reexport heapless
pub use heapless;

pub use error::{BuildError, FrameError, StatusCode, WriteError};
pub use port::{Port, PortConfig};
pub use sync::Patience;
pub use transport::Transport;

/// Maximum payload size (2048) + length (2) + checksum (2)
pub const MAX_BUFFER_SIZE: usize = 2052;

/// OSP messages are preceded by the two bytes `START1 START2`
pub const START1: u8 = 0xa0;
pub const START2: u8 = 0xa2;
/// OSP messages are followed by the two bytes `END1 END2`
pub const END1: u8 = 0xb0;
pub const END2: u8 = 0xb3;

pub const LF: u8 = b'\n';
pub const CR: u8 = b'\r';
pub const DOLLAR: u8 = b'$';
/// Separates NMEA body from the two hex digits of its checksum
pub const CHECKSUM_DELIMITER: u8 = b'*';
