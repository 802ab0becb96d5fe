//! Synchronization on the start markers of a message.
//!
//! Both protocols announce a message with two marker bytes: `START1 START2` for OSP and
//! `LF $` for NMEA. Bytes are consumed one at a time and fed into a small automaton until
//! both markers were seen in sequence. How long to keep trying is not a wall-clock timeout
//! but a [`Patience`] budget: every byte which does not move the automaton forward, and every
//! empty or failed read, costs one unit.

use crate::error::FrameError;
use crate::transport::Transport;
use crate::{DOLLAR, LF, MAX_BUFFER_SIZE, START1, START2};

/// Budget of wasted transport operations allowed while synchronizing
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Patience(u32);

impl Patience {
    /// Default budget for OSP reads
    pub const OSP_DEFAULT: Patience = Patience(2 * MAX_BUFFER_SIZE as u32);
    /// Default budget for NMEA reads
    pub const NMEA_DEFAULT: Patience = Patience(MAX_BUFFER_SIZE as u32);

    pub const fn new(units: u32) -> Self {
        Patience(units)
    }

    pub const fn remaining(&self) -> u32 {
        self.0
    }

    pub const fn is_exhausted(&self) -> bool {
        self.0 == 0
    }

    /// Spends one unit, saturating at zero
    pub fn spend(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }
}

impl From<u32> for Patience {
    fn from(units: u32) -> Self {
        Patience(units)
    }
}

/// What a byte did to the automaton
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// moved towards (or reached) the synced state
    Advanced,
    /// kept the current state without costing patience
    Held,
    /// did not help, costs one unit of patience
    Wasted,
}

/// A start-marker automaton with a total transition function
pub trait SyncAutomaton: Copy + PartialEq + core::fmt::Debug {
    const INITIAL: Self;

    fn step(self, byte: u8) -> (Self, Progress);

    fn is_synced(self) -> bool;
}

/// Two-marker automaton shared by both protocols.
///
/// Waiting for the first marker, a repeated second marker is tolerated. Waiting for the
/// second one, a repeated first marker is tolerated and anything else starts over.
fn two_marker_step(stage: u8, byte: u8, first: u8, second: u8) -> (u8, Progress) {
    match (stage, byte) {
        (0, b) if b == first => (1, Progress::Advanced),
        (0, b) if b == second => (0, Progress::Held),
        (0, _) => (0, Progress::Wasted),
        (1, b) if b == second => (2, Progress::Advanced),
        (1, b) if b == first => (1, Progress::Held),
        (1, _) => (0, Progress::Wasted),
        _ => (2, Progress::Held),
    }
}

/// OSP synchronization: `START1` then `START2`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OspSync {
    SeekStart,
    SeekSecondMarker,
    Synced,
}

impl OspSync {
    pub(crate) fn stage(self) -> u8 {
        match self {
            OspSync::SeekStart => 0,
            OspSync::SeekSecondMarker => 1,
            OspSync::Synced => 2,
        }
    }

    fn from_stage(stage: u8) -> Self {
        match stage {
            0 => OspSync::SeekStart,
            1 => OspSync::SeekSecondMarker,
            _ => OspSync::Synced,
        }
    }
}

impl SyncAutomaton for OspSync {
    const INITIAL: Self = OspSync::SeekStart;

    fn step(self, byte: u8) -> (Self, Progress) {
        let (stage, progress) = two_marker_step(self.stage(), byte, START1, START2);
        (Self::from_stage(stage), progress)
    }

    fn is_synced(self) -> bool {
        self == OspSync::Synced
    }
}

/// NMEA synchronization: line feed ending the previous sentence, then `$`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NmeaSync {
    SeekLineFeed,
    SeekDollar,
    Synced,
}

impl NmeaSync {
    pub(crate) fn stage(self) -> u8 {
        match self {
            NmeaSync::SeekLineFeed => 0,
            NmeaSync::SeekDollar => 1,
            NmeaSync::Synced => 2,
        }
    }

    fn from_stage(stage: u8) -> Self {
        match stage {
            0 => NmeaSync::SeekLineFeed,
            1 => NmeaSync::SeekDollar,
            _ => NmeaSync::Synced,
        }
    }
}

impl SyncAutomaton for NmeaSync {
    const INITIAL: Self = NmeaSync::SeekLineFeed;

    fn step(self, byte: u8) -> (Self, Progress) {
        let (stage, progress) = two_marker_step(self.stage(), byte, LF, DOLLAR);
        (Self::from_stage(stage), progress)
    }

    fn is_synced(self) -> bool {
        self == NmeaSync::Synced
    }
}

/// Skips input until the automaton `A` is synced or `patience` runs out.
///
/// On success the transport is positioned right after the second marker. Whatever patience is
/// left stays in `patience`.
pub fn synchronize<A, T>(transport: &mut T, patience: &mut Patience) -> Result<(), FrameError>
where
    A: SyncAutomaton,
    T: Transport + ?Sized,
{
    let mut state = A::INITIAL;
    let mut empty_reads = 0u32;
    let mut byte = [0u8; 1];

    while !state.is_synced() && !patience.is_exhausted() {
        match transport.read(&mut byte) {
            Ok(1) => {
                let (next, progress) = state.step(byte[0]);
                if progress == Progress::Wasted {
                    patience.spend();
                }
                state = next;
            }
            _ => {
                empty_reads += 1;
                patience.spend();
            }
        }
    }

    trace!(
        "synchronize: synced={} patience={} empty_reads={}",
        state.is_synced(),
        patience.remaining(),
        empty_reads
    );

    if state.is_synced() {
        Ok(())
    } else {
        Err(FrameError::SyncTimeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    #[test]
    fn test_osp_transitions() {
        use OspSync::*;
        assert_eq!(SeekStart.step(START1), (SeekSecondMarker, Progress::Advanced));
        assert_eq!(SeekStart.step(START2), (SeekStart, Progress::Held));
        assert_eq!(SeekStart.step(0x00), (SeekStart, Progress::Wasted));
        assert_eq!(SeekSecondMarker.step(START2), (Synced, Progress::Advanced));
        assert_eq!(SeekSecondMarker.step(START1), (SeekSecondMarker, Progress::Held));
        assert_eq!(SeekSecondMarker.step(0x42), (SeekStart, Progress::Wasted));
        assert!(Synced.is_synced());
        assert!(!SeekSecondMarker.is_synced());
    }

    #[test]
    fn test_osp_transitions_are_total() {
        for state in [OspSync::SeekStart, OspSync::SeekSecondMarker] {
            for byte in 0..=u8::MAX {
                let (next, progress) = state.step(byte);
                match (byte, progress) {
                    (START1, p) | (START2, p) => assert_ne!(p, Progress::Wasted),
                    (_, p) => {
                        assert_eq!(p, Progress::Wasted);
                        assert_eq!(next, OspSync::SeekStart);
                    }
                }
            }
        }
    }

    #[test]
    fn test_nmea_transitions() {
        use NmeaSync::*;
        assert_eq!(SeekLineFeed.step(LF), (SeekDollar, Progress::Advanced));
        assert_eq!(SeekLineFeed.step(DOLLAR), (SeekLineFeed, Progress::Held));
        assert_eq!(SeekLineFeed.step(b'G'), (SeekLineFeed, Progress::Wasted));
        assert_eq!(SeekDollar.step(DOLLAR), (Synced, Progress::Advanced));
        assert_eq!(SeekDollar.step(LF), (SeekDollar, Progress::Held));
        assert_eq!(SeekDollar.step(b'\r'), (SeekLineFeed, Progress::Wasted));
    }

    #[test]
    fn test_synchronize_skips_noise() {
        let mut t = MockTransport::with_input(&[0x01, 0x02, START1, 0x03, START1, START1, START2, 0x99]);
        let mut patience = Patience::new(10);
        synchronize::<OspSync, _>(&mut t, &mut patience).unwrap();
        assert_eq!(patience.remaining(), 7);
        // positioned right after the markers
        assert_eq!(t.input.front(), Some(&0x99));
    }

    #[test]
    fn test_synchronize_repeated_second_marker_is_free() {
        let mut t = MockTransport::with_input(&[START2, START2, START2, START1, START2]);
        let mut patience = Patience::new(1);
        synchronize::<OspSync, _>(&mut t, &mut patience).unwrap();
        assert_eq!(patience.remaining(), 1);
    }

    #[test]
    fn test_synchronize_noise_exhausts_patience() {
        let noise = [0x55u8; 64];
        let mut t = MockTransport::with_input(&noise);
        let mut patience = Patience::new(10);
        let err = synchronize::<OspSync, _>(&mut t, &mut patience).unwrap_err();
        assert_eq!(err, FrameError::SyncTimeout);
        assert!(patience.is_exhausted());
        assert_eq!(t.reads, 10);
        assert_eq!(t.input.len(), 54);
    }

    #[test]
    fn test_synchronize_empty_and_failed_reads_cost_patience() {
        let mut t = MockTransport::with_input(&[]);
        t.failing_reads = 2;
        let mut patience = Patience::new(5);
        assert_eq!(
            synchronize::<NmeaSync, _>(&mut t, &mut patience),
            Err(FrameError::SyncTimeout)
        );
        assert_eq!(t.reads, 5);
    }

    #[test]
    fn test_synchronize_without_patience_does_not_read() {
        let mut t = MockTransport::with_input(&[LF, DOLLAR]);
        let mut patience = Patience::new(0);
        assert_eq!(
            synchronize::<NmeaSync, _>(&mut t, &mut patience),
            Err(FrameError::SyncTimeout)
        );
        assert_eq!(t.reads, 0);
    }

    #[test]
    fn test_patience_defaults() {
        assert_eq!(Patience::OSP_DEFAULT.remaining(), 4104);
        assert_eq!(Patience::NMEA_DEFAULT.remaining(), 2052);
        let mut p = Patience::from(1);
        p.spend();
        p.spend();
        assert!(p.is_exhausted());
    }
}
