//! Multistage envelope generation.
//!
//! This module provides the segment table ([`EnvelopeConfig`]), the
//! per-sample engine that walks it ([`MultistageEnvelope`]), the lookup tables
//! the engine reads ([`CurveTables`]), and the trigger flags that drive it.

mod config;
mod envelope;
mod flags;
mod gated;
mod multistage;
mod shape;
mod tables;

pub use config::{EnvelopeConfig, MAX_SEGMENTS};
pub use envelope::Envelope;
pub use flags::{EnvelopeFlags, GateFlags};
pub use gated::GatedEnvelope;
pub use multistage::{DEFAULT_INCREMENT_SCALE, MultistageEnvelope, Stage};
pub use shape::Shape;
pub use tables::{CurveTables, INCREMENT_GAMMA, MAX_SEGMENT_TIME, MIN_SEGMENT_TIME};
