//! Per-sample trigger flags.
//!
//! The envelope engine consumes one flag byte per sample. Edges are one-sample
//! pulses; the gate bit is the held level of the same signal.

use std::ops::{BitOr, BitOrAssign};

/// Typed bitset of the trigger events seen in one sample.
///
/// # Examples
///
/// ```
/// use multistage::EnvelopeFlags;
///
/// let flags = EnvelopeFlags::RISING_EDGE | EnvelopeFlags::GATE;
/// assert!(flags.contains(EnvelopeFlags::GATE));
/// assert!(!flags.contains(EnvelopeFlags::FALLING_EDGE));
/// assert_eq!(flags.bits(), 0b101);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct EnvelopeFlags(u8);

impl EnvelopeFlags {
    /// Gate went from low to high on this sample.
    pub const RISING_EDGE: Self = Self(0b001);
    /// Gate went from high to low on this sample.
    pub const FALLING_EDGE: Self = Self(0b010);
    /// Gate is currently high.
    pub const GATE: Self = Self(0b100);

    const ALL_BITS: u8 = 0b111;

    /// No events.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds flags from a raw byte, dropping unknown bits.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL_BITS)
    }

    /// Raw byte representation.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for EnvelopeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EnvelopeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<u8> for EnvelopeFlags {
    fn from(bits: u8) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl From<EnvelopeFlags> for u8 {
    fn from(flags: EnvelopeFlags) -> Self {
        flags.bits()
    }
}

/// Edge detector turning a stream of gate levels into envelope flags.
///
/// # Examples
///
/// ```
/// use multistage::{EnvelopeFlags, GateFlags};
///
/// let mut gate = GateFlags::new();
/// assert_eq!(gate.process(true), EnvelopeFlags::RISING_EDGE | EnvelopeFlags::GATE);
/// assert_eq!(gate.process(true), EnvelopeFlags::GATE);
/// assert_eq!(gate.process(false), EnvelopeFlags::FALLING_EDGE);
/// assert_eq!(gate.process(false), EnvelopeFlags::empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GateFlags {
    previous: EnvelopeFlags,
}

impl GateFlags {
    /// Creates a detector whose gate starts low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives this sample's flags from the previous sample's flags and the
    /// current gate level.
    pub fn extract(previous: EnvelopeFlags, gate_high: bool) -> EnvelopeFlags {
        let was_high = previous.contains(EnvelopeFlags::GATE);
        match (was_high, gate_high) {
            (false, true) => EnvelopeFlags::RISING_EDGE | EnvelopeFlags::GATE,
            (true, true) => EnvelopeFlags::GATE,
            (true, false) => EnvelopeFlags::FALLING_EDGE,
            (false, false) => EnvelopeFlags::empty(),
        }
    }

    /// Feeds one gate level and returns the flags for this sample.
    pub fn process(&mut self, gate_high: bool) -> EnvelopeFlags {
        self.previous = Self::extract(self.previous, gate_high);
        self.previous
    }

    /// Converts a block of gate levels into flag bytes, in order.
    ///
    /// Processes `min(gates.len(), out.len())` samples.
    pub fn process_block(&mut self, gates: &[bool], out: &mut [u8]) {
        debug_assert_eq!(gates.len(), out.len());
        for (gate, flags) in gates.iter().zip(out.iter_mut()) {
            *flags = self.process(*gate).bits();
        }
    }

    /// True if the last processed gate level was high.
    pub fn is_high(&self) -> bool {
        self.previous.contains(EnvelopeFlags::GATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_match_wire_format() {
        assert_eq!(EnvelopeFlags::RISING_EDGE.bits(), 1);
        assert_eq!(EnvelopeFlags::FALLING_EDGE.bits(), 2);
        assert_eq!(EnvelopeFlags::GATE.bits(), 4);
    }

    #[test]
    fn test_from_bits_truncates() {
        let flags = EnvelopeFlags::from(0xff);
        assert_eq!(flags.bits(), 0b111);
        assert!(EnvelopeFlags::from(0b1000).is_empty());
    }

    #[test]
    fn test_bitor_assign() {
        let mut flags = EnvelopeFlags::empty();
        flags |= EnvelopeFlags::GATE;
        flags |= EnvelopeFlags::RISING_EDGE;
        assert!(flags.contains(EnvelopeFlags::GATE | EnvelopeFlags::RISING_EDGE));
        assert_eq!(u8::from(flags), 0b101);
    }

    #[test]
    fn test_extract_ignores_previous_edges() {
        let previous = EnvelopeFlags::RISING_EDGE;
        assert_eq!(
            GateFlags::extract(previous, true),
            EnvelopeFlags::RISING_EDGE | EnvelopeFlags::GATE
        );
        assert_eq!(
            GateFlags::extract(EnvelopeFlags::FALLING_EDGE, false),
            EnvelopeFlags::empty()
        );
    }

    #[test]
    fn test_process_block() {
        let mut gate = GateFlags::new();
        let gates = [false, true, true, false, false, true];
        let mut out = [0u8; 6];
        gate.process_block(&gates, &mut out);
        assert_eq!(out, [0, 0b101, 0b100, 0b010, 0, 0b101]);
        assert!(gate.is_high());
    }
}
