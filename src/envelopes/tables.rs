//! Lookup tables consumed by the envelope engine.
//!
//! `CurveTables` bundles the duration to phase-increment table and one table
//! per [`Shape`]. Tables are read-only once built, so a single instance is
//! usually shared between envelopes behind an `Arc`.

use std::fmt;

use super::Shape;
use crate::error::{ConfigError, ConfigResult};
use crate::units::{TABLE_STEPS, Table, build_table, interpolate};

/// Shortest segment duration the default increment table reaches, in seconds.
pub const MIN_SEGMENT_TIME: f64 = 0.0005;

/// Longest segment duration the default increment table reaches, in seconds.
pub const MAX_SEGMENT_TIME: f64 = 16.0;

/// Curvature of the duration control's mapping onto segment time.
pub const INCREMENT_GAMMA: f64 = 0.175;

/// Read-only tables mapping durations to phase increments and phases to
/// shape factors.
///
/// # Examples
///
/// ```
/// use multistage::{CurveTables, Shape};
///
/// let tables = CurveTables::new(48000.0).unwrap();
///
/// // Longer durations advance the phase more slowly
/// assert!(tables.duration_to_increment(0.0) > tables.duration_to_increment(1.0));
///
/// // Every shape spans [0, 1]
/// assert_eq!(tables.shape_factor(Shape::Quartic, 0.0), 0.0);
/// assert_eq!(tables.shape_factor(Shape::Quartic, 1.0), 1.0);
/// ```
#[derive(Clone, PartialEq)]
pub struct CurveTables {
    increments: Table,
    linear: Table,
    exponential: Table,
    quartic: Table,
}

impl CurveTables {
    /// Generates the default tables for the given sample rate.
    ///
    /// Durations map onto segment times from [`MIN_SEGMENT_TIME`] to
    /// [`MAX_SEGMENT_TIME`] along a power curve.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSampleRate`] when `sample_rate` is not a
    /// positive finite number.
    pub fn new(sample_rate: f64) -> ConfigResult<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ConfigError::InvalidSampleRate { rate: sample_rate });
        }

        Ok(Self {
            increments: increment_table(sample_rate),
            linear: shape_table(Shape::Linear),
            exponential: shape_table(Shape::Exponential),
            quartic: shape_table(Shape::Quartic),
        })
    }

    /// Wraps caller-supplied tables.
    ///
    /// Useful for tests that need exact arithmetic, e.g. identity ramps.
    pub fn from_tables(
        increments: Table,
        linear: Table,
        exponential: Table,
        quartic: Table,
    ) -> Self {
        Self {
            increments,
            linear,
            exponential,
            quartic,
        }
    }

    /// Returns the per-sample phase increment for a duration control in `[0, 1]`.
    #[inline]
    pub fn duration_to_increment(&self, duration: f64) -> f64 {
        interpolate(&self.increments, duration)
    }

    /// Returns the shape factor for a phase in `[0, 1]`.
    #[inline]
    pub fn shape_factor(&self, shape: Shape, phase: f64) -> f64 {
        interpolate(self.shape_table(shape), phase)
    }

    /// Returns the raw table behind a shape.
    pub fn shape_table(&self, shape: Shape) -> &Table {
        match shape {
            Shape::Linear => &self.linear,
            Shape::Exponential => &self.exponential,
            Shape::Quartic => &self.quartic,
        }
    }

    /// Returns the raw duration to increment table.
    pub fn increment_table(&self) -> &Table {
        &self.increments
    }
}

// The tables themselves are too long to be useful in debug output
impl fmt::Debug for CurveTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveTables")
            .field("fastest_increment", &self.increments[0])
            .field("slowest_increment", &self.increments[TABLE_STEPS])
            .finish_non_exhaustive()
    }
}

fn shape_table(shape: Shape) -> Table {
    // Guard sample repeats the last step, then the table is scaled to end at 1
    let mut table =
        build_table(|i| shape.evaluate(i.min(TABLE_STEPS - 1) as f64 / TABLE_STEPS as f64));
    let max = table[TABLE_STEPS];
    for value in table.iter_mut() {
        *value /= max;
    }
    table
}

fn increment_table(sample_rate: f64) -> Table {
    let min_increment = 1.0 / (MAX_SEGMENT_TIME * sample_rate);
    let max_increment = 1.0 / (MIN_SEGMENT_TIME * sample_rate);
    let fast = max_increment.powf(-INCREMENT_GAMMA);
    let slow = min_increment.powf(-INCREMENT_GAMMA);

    build_table(|i| {
        let rate = fast + (slow - fast) * i as f64 / TABLE_STEPS as f64;
        rate.powf(-1.0 / INCREMENT_GAMMA)
    })
}
