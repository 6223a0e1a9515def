//! Multistage - a sample-accurate multistage envelope generator
//!
//! This library shapes amplitude and modulation signals with an envelope of up
//! to six segments, each with its own duration, target level and curve. The
//! envelope is driven by per-sample rising edge, falling edge and gate flags,
//! and supports sustain points, loop windows and legato or hard retriggers.

pub mod envelopes;
pub mod error;
pub mod signal;
pub mod units;

// Re-export commonly used types at the crate root
pub use envelopes::{
    CurveTables, Envelope, EnvelopeConfig, EnvelopeFlags, GateFlags, GatedEnvelope,
    MAX_SEGMENTS, MultistageEnvelope, Shape, Stage,
};
pub use error::{ConfigError, ConfigResult};
pub use signal::Signal;
pub use units::PitchTables;
