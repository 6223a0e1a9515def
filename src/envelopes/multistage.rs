//! Sample-accurate multistage envelope engine.
//!
//! The engine walks the segments of an [`EnvelopeConfig`] one sample at a
//! time. Each call to [`MultistageEnvelope::process`] resolves at most one
//! structural transition, then computes the output for the current segment:
//!
//! 1. A rising edge restarts from segment 0.
//! 2. Otherwise a falling edge jumps to the sustain point, if there is one.
//! 3. Otherwise an exhausted segment (phase >= 1) advances to the next one,
//!    wrapping at the end of the loop window.
//!
//! Every transition anchors the new segment at the current output (or at a
//! level for natural advances and hard resets), and the shape factor is read
//! before the phase moves, so the first sample of a segment always equals its
//! start value.

use std::sync::Arc;

use super::{CurveTables, EnvelopeConfig, EnvelopeFlags};
use crate::Signal;
use crate::error::ConfigResult;

/// Default multiplier applied to table increments.
///
/// The default increment table is calibrated for half the block rate this
/// engine is usually driven at; see [`MultistageEnvelope::with_increment_scale`].
pub const DEFAULT_INCREMENT_SCALE: f64 = 2.0;

/// Where the engine is in its segment sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Running segment `n`.
    Active(usize),
    /// Past the last segment; output holds until the next rising edge.
    Finished,
}

/// Multistage envelope generator driven by per-sample trigger flags.
///
/// The engine is not `Clone`; share its [`CurveTables`] instead and build one
/// engine per output stream.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use multistage::{CurveTables, EnvelopeConfig, EnvelopeFlags, MultistageEnvelope};
///
/// let tables = Arc::new(CurveTables::new(48000.0).unwrap());
/// let mut env = MultistageEnvelope::new(tables)
///     .with_config(EnvelopeConfig::ad(0.1, 0.3))
///     .unwrap();
///
/// // Nothing happens until the first rising edge
/// assert_eq!(env.process(EnvelopeFlags::empty()), 0.0);
///
/// let first = env.process(EnvelopeFlags::RISING_EDGE | EnvelopeFlags::GATE);
/// assert_eq!(first, 0.0);
/// assert!(env.process(EnvelopeFlags::GATE) > 0.0);
/// ```
#[derive(Debug)]
pub struct MultistageEnvelope {
    config: EnvelopeConfig,
    tables: Arc<CurveTables>,
    increment_scale: f64,

    stage: Stage,
    phase: f64,
    start_value: f64,
    value: f64,
}

impl MultistageEnvelope {
    /// Creates an engine with the default configuration, already initialized.
    pub fn new(tables: Arc<CurveTables>) -> Self {
        let mut envelope = Self {
            config: EnvelopeConfig::default(),
            tables,
            increment_scale: DEFAULT_INCREMENT_SCALE,
            stage: Stage::Finished,
            phase: 0.0,
            start_value: 0.0,
            value: 0.0,
        };
        envelope.init();
        envelope
    }

    /// Sets the factor applied to every phase increment read from the tables.
    ///
    /// Recompute this when the driving rate differs from the rate the
    /// increment table was built for; `1.0` uses the table as-is.
    pub fn with_increment_scale(mut self, scale: f64) -> Self {
        self.increment_scale = scale;
        self
    }

    /// Installs `config`, consuming and returning the engine.
    pub fn with_config(mut self, config: EnvelopeConfig) -> ConfigResult<Self> {
        self.set_config(config)?;
        Ok(self)
    }

    /// Resets to the finished state with zero output.
    ///
    /// The next rising edge restarts from `level(0)` regardless of the hard
    /// reset setting.
    pub fn init(&mut self) {
        self.stage = Stage::Finished;
        self.phase = 0.0;
        self.start_value = 0.0;
        self.value = 0.0;
    }

    /// Validates and installs a new configuration.
    ///
    /// Output continues from the current value; if the running segment no
    /// longer exists the engine finishes.
    pub fn set_config(&mut self, config: EnvelopeConfig) -> ConfigResult<()> {
        config.validate()?;
        self.config = config;
        if let Stage::Active(segment) = self.stage {
            self.enter(segment);
            if self.is_finished() {
                self.start_value = self.value;
                self.phase = 0.0;
            }
        }
        Ok(())
    }

    /// Edits the configuration in place, rolling back if the result is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use multistage::{CurveTables, MultistageEnvelope};
    ///
    /// let tables = Arc::new(CurveTables::new(48000.0).unwrap());
    /// let mut env = MultistageEnvelope::new(tables);
    ///
    /// env.configure(|config| {
    ///     config.set_adsr(0.1, 0.2, 0.6, 0.4);
    ///     config.set_hard_reset(true);
    ///     Ok(())
    /// })
    /// .unwrap();
    ///
    /// assert!(env.configure(|config| config.set_sustain_point(5)).is_err());
    /// assert_eq!(env.config().sustain_point(), 2);
    /// ```
    pub fn configure<F>(&mut self, edit: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut EnvelopeConfig) -> ConfigResult<()>,
    {
        let mut config = self.config;
        edit(&mut config)?;
        self.set_config(config)
    }

    /// The installed configuration.
    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }

    /// The shared lookup tables this engine reads.
    pub fn tables(&self) -> &Arc<CurveTables> {
        &self.tables
    }

    /// Factor applied to every table increment.
    pub fn increment_scale(&self) -> f64 {
        self.increment_scale
    }

    /// Current segment, or [`Stage::Finished`].
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// True once the last segment has run out, or before the first trigger.
    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Finished
    }

    /// Progress through the current segment.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Last computed output sample.
    pub fn value(&self) -> f64 {
        self.value
    }

    fn enter(&mut self, segment: usize) {
        self.stage = if segment < self.config.num_segments() {
            Stage::Active(segment)
        } else {
            Stage::Finished
        };
    }

    /// Advances by one sample and returns the new output.
    #[inline]
    pub fn process(&mut self, flags: EnvelopeFlags) -> f64 {
        let sustain_point = self.config.sustain_point();

        if flags.contains(EnvelopeFlags::RISING_EDGE) {
            self.start_value = if self.is_finished() || self.config.hard_reset() {
                self.config.level(0)
            } else {
                self.value
            };
            self.enter(0);
            self.phase = 0.0;
        } else if flags.contains(EnvelopeFlags::FALLING_EDGE) && sustain_point != 0 {
            self.start_value = self.value;
            self.enter(sustain_point);
            self.phase = 0.0;
        } else if self.phase >= 1.0 {
            if let Stage::Active(segment) = self.stage {
                self.start_value = self.config.level(segment + 1);
                let mut next = segment + 1;
                if next == self.config.loop_end() {
                    next = self.config.loop_start();
                }
                self.enter(next);
            }
            self.phase = 0.0;
        }

        let Stage::Active(segment) = self.stage else {
            self.value = self.start_value;
            return self.value;
        };

        let sustained = sustain_point != 0
            && segment == sustain_point
            && flags.contains(EnvelopeFlags::GATE);
        let increment = if sustained {
            0.0
        } else {
            self.increment_scale * self.tables.duration_to_increment(self.config.time(segment))
        };

        let t = self.tables.shape_factor(self.config.shape(segment), self.phase);
        self.phase += increment;
        self.value = self.start_value + (self.config.level(segment + 1) - self.start_value) * t;
        self.value
    }

    /// Processes a block of raw flag bytes, one output sample per byte.
    ///
    /// Processes `min(flags.len(), out.len())` samples.
    pub fn process_block(&mut self, flags: &[u8], out: &mut [f64]) {
        debug_assert_eq!(flags.len(), out.len());
        for (bits, sample) in flags.iter().zip(out.iter_mut()) {
            *sample = self.process(EnvelopeFlags::from_bits_truncate(*bits));
        }
    }
}

/// Free-running output: every sample is processed with no flags set.
impl Signal for MultistageEnvelope {
    fn next_sample(&mut self) -> f64 {
        self.process(EnvelopeFlags::empty())
    }
}
