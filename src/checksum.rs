//! Checksums of both protocols.
//!
//! The bit widths are part of the wire format: OSP carries a 15 bit sum in two bytes, NMEA an
//! 8 bit XOR in two hex digits.

const OSP_CHECKSUM_MASK: u16 = 0x7fff;

/// 15 bit additive checksum of an OSP payload (message id included)
///
/// Seeded with the first byte, every following byte is added and the sum is masked to 15 bits
/// after each addition. An empty payload yields 0.
pub fn osp_checksum(payload: &[u8]) -> u16 {
    match payload.split_first() {
        Some((&first, rest)) => rest.iter().fold(first as u16, |acc, &b| {
            (acc + b as u16) & OSP_CHECKSUM_MASK
        }),
        None => 0,
    }
}

/// XOR of every byte between `$` and `*` of a NMEA sentence
pub fn nmea_checksum(body: &[u8]) -> u8 {
    match body.split_first() {
        Some((&first, rest)) => rest.iter().fold(first, |acc, &b| acc ^ b),
        None => 0,
    }
}
