//! Note-on/note-off front end for the multistage engine.

use std::sync::Arc;

use super::{
    CurveTables, Envelope, EnvelopeConfig, EnvelopeFlags, GateFlags, MultistageEnvelope,
};
use crate::Signal;
use crate::error::ConfigResult;

/// A [`MultistageEnvelope`] driven by a held gate instead of raw flags.
///
/// `trigger` raises the gate and `release` lowers it; every sample the gate
/// level is turned into edge and gate flags for the engine. Output is scaled
/// by the velocity of the last trigger.
///
/// Velocity is applied to the output, not to the configured levels, so a
/// legato retrigger at a different velocity steps the output to the new
/// scale even though the engine itself stays continuous.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use multistage::{CurveTables, Envelope, EnvelopeConfig, GatedEnvelope, Signal};
///
/// let tables = Arc::new(CurveTables::new(48000.0).unwrap());
/// let mut env = GatedEnvelope::new(tables, EnvelopeConfig::ar(0.0, 0.0)).unwrap();
/// assert!(!env.is_active());
///
/// env.trigger(0.5);
/// for _ in 0..100 {
///     env.next_sample();
/// }
/// // Held at full level, scaled by velocity
/// assert_eq!(env.next_sample(), 0.5);
///
/// env.release();
/// while env.is_active() {
///     env.next_sample();
/// }
/// assert_eq!(env.next_sample(), 0.0);
/// ```
#[derive(Debug)]
pub struct GatedEnvelope {
    envelope: MultistageEnvelope,
    gate: GateFlags,
    gate_high: bool,
    retrigger: bool,
    velocity: f64,
}

impl GatedEnvelope {
    /// Creates a gated envelope with the given configuration.
    pub fn new(tables: Arc<CurveTables>, config: EnvelopeConfig) -> ConfigResult<Self> {
        Ok(Self::from_envelope(
            MultistageEnvelope::new(tables).with_config(config)?,
        ))
    }

    /// Wraps an existing engine.
    pub fn from_envelope(envelope: MultistageEnvelope) -> Self {
        Self {
            envelope,
            gate: GateFlags::new(),
            gate_high: false,
            retrigger: false,
            velocity: 1.0,
        }
    }

    /// The wrapped engine.
    pub fn envelope(&self) -> &MultistageEnvelope {
        &self.envelope
    }

    /// Mutable access to the wrapped engine, e.g. for reconfiguration.
    pub fn envelope_mut(&mut self) -> &mut MultistageEnvelope {
        &mut self.envelope
    }

    /// True between `trigger` and `release`.
    pub fn is_gate_high(&self) -> bool {
        self.gate_high
    }

    /// Velocity of the last trigger; 1.0 before any trigger.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}

impl Envelope for GatedEnvelope {
    /// Raises the gate and restarts the envelope.
    ///
    /// The new velocity takes effect on the next sample.
    fn trigger(&mut self, velocity: f64) {
        self.gate_high = true;
        // A trigger while the gate is already high still restarts the envelope
        self.retrigger = true;
        self.velocity = velocity;
    }

    fn release(&mut self) {
        self.gate_high = false;
    }

    fn is_active(&self) -> bool {
        self.gate_high || self.retrigger || !self.envelope.is_finished()
    }
}

impl Signal for GatedEnvelope {
    fn next_sample(&mut self) -> f64 {
        let mut flags = self.gate.process(self.gate_high);
        if std::mem::take(&mut self.retrigger) {
            flags |= EnvelopeFlags::RISING_EDGE;
        }
        self.envelope.process(flags) * self.velocity
    }
}
