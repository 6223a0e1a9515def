//! Error types for envelope configuration.

use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while building or installing an envelope configuration.
///
/// None of these can occur while processing samples; every check happens when
/// the configuration is mutated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// More segments requested than the fixed segment table holds.
    #[error("too many segments: {requested} (max {max})")]
    TooManySegments {
        /// Requested segment count.
        requested: usize,
        /// Capacity of the segment table.
        max: usize,
    },

    /// Sustain point lies past the last segment.
    #[error("sustain point {sustain_point} is beyond segment count {num_segments}")]
    SustainOutOfRange {
        /// Requested sustain point.
        sustain_point: usize,
        /// Active segment count.
        num_segments: usize,
    },

    /// Loop window is reversed or extends past the last segment.
    #[error("invalid loop window [{start}, {end}) for {num_segments} segments")]
    InvalidLoop {
        /// First segment of the window.
        start: usize,
        /// One past the last segment of the window.
        end: usize,
        /// Active segment count.
        num_segments: usize,
    },

    /// Per-segment setter called with an index outside the table.
    #[error("segment index {index} out of range (max {max})")]
    SegmentIndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Exclusive upper bound for the index.
        max: usize,
    },

    /// Table generation requested for a non-positive or non-finite rate.
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate.
        rate: f64,
    },
}
