//! Envelope trait for note-driven playback.

use crate::Signal;

/// Trait for envelope generators with lifecycle control.
///
/// Envelopes control parameters over time in response to performance events
/// (note on/off). Unlike free-running signals, they have a defined lifecycle:
/// they start on `trigger`, move toward completion after `release`, and
/// report when they have nothing left to play.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use multistage::{CurveTables, Envelope, EnvelopeConfig, GatedEnvelope, Signal};
///
/// let tables = Arc::new(CurveTables::new(44100.0).unwrap());
/// let mut env = GatedEnvelope::new(tables, EnvelopeConfig::adsr(0.1, 0.2, 0.7, 0.3)).unwrap();
///
/// env.trigger(0.8);
/// for _ in 0..1000 {
///     let level = env.next_sample();
///     // Use level to control amplitude, filter cutoff, etc.
/// }
///
/// env.release();
/// while env.is_active() {
///     env.next_sample();
/// }
/// ```
pub trait Envelope: Signal {
    /// Opens the gate, starting the envelope from its first segment.
    ///
    /// # Arguments
    ///
    /// * `velocity` - Note velocity (typically 0.0 to 1.0). How velocity is
    ///   applied depends on the implementation.
    fn trigger(&mut self, velocity: f64);

    /// Closes the gate.
    fn release(&mut self);

    /// Returns true while the envelope still has output to produce.
    fn is_active(&self) -> bool;
}
