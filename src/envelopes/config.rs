//! Segment table: levels, durations and shapes of a multistage envelope.
//!
//! `EnvelopeConfig` is plain data. The owner builds it with one of the preset
//! builders or the raw setters and installs it into a [`MultistageEnvelope`];
//! the engine only ever reads it.
//!
//! [`MultistageEnvelope`]: super::MultistageEnvelope

use super::Shape;
use crate::error::{ConfigError, ConfigResult};

/// Capacity of the segment table.
pub const MAX_SEGMENTS: usize = 6;

/// Configuration of a multistage envelope.
///
/// Segment `i` runs from `level(i)` (or wherever the envelope was when the
/// segment was entered) to `level(i + 1)` over `time(i)`, following
/// `shape(i)`. Durations are controls in `[0, 1]`, mapped onto seconds by the
/// engine's [`CurveTables`](super::CurveTables).
///
/// Invariants, checked by [`validate`](Self::validate) and the global setters:
/// - `num_segments <= MAX_SEGMENTS`
/// - `sustain_point <= num_segments` (0 disables sustain)
/// - `loop_start <= loop_end <= num_segments` (equal values disable looping)
///
/// # Examples
///
/// ```
/// use multistage::{EnvelopeConfig, Shape};
///
/// let config = EnvelopeConfig::adsr(0.1, 0.2, 0.7, 0.3);
/// assert_eq!(config.num_segments(), 3);
/// assert_eq!(config.sustain_point(), 2);
/// assert_eq!(config.level(2), 0.7);
/// assert_eq!(config.shape(0), Shape::Quartic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    levels: [f64; MAX_SEGMENTS + 1],
    times: [f64; MAX_SEGMENTS],
    shapes: [Shape; MAX_SEGMENTS],
    num_segments: usize,
    sustain_point: usize,
    loop_start: usize,
    loop_end: usize,
    hard_reset: bool,
}

impl Default for EnvelopeConfig {
    /// An ADSR with instant attack, short decay, half-level sustain and a
    /// medium release.
    fn default() -> Self {
        Self::adsr(0.0, 0.125, 0.5, 0.5)
    }
}

impl EnvelopeConfig {
    fn empty() -> Self {
        Self {
            levels: [0.0; MAX_SEGMENTS + 1],
            times: [0.0; MAX_SEGMENTS],
            shapes: [Shape::Linear; MAX_SEGMENTS],
            num_segments: 0,
            sustain_point: 0,
            loop_start: 0,
            loop_end: 0,
            hard_reset: false,
        }
    }

    /// Attack-decay, exponential decay, no sustain.
    pub fn ad(attack: f64, decay: f64) -> Self {
        let mut config = Self::empty();
        config.set_ad(attack, decay);
        config
    }

    /// Attack-release, holding at full level while the gate is high.
    pub fn ar(attack: f64, decay: f64) -> Self {
        let mut config = Self::empty();
        config.set_ar(attack, decay);
        config
    }

    /// Attack, decay to `sustain`, then a final ramp to zero, without holding.
    ///
    /// The final segment's duration control is `sustain`, not `release`;
    /// `release` is only used by the looping variant.
    pub fn adr(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        let mut config = Self::empty();
        config.set_adr(attack, decay, sustain, release);
        config
    }

    /// Classic ADSR with a quartic attack and exponential decay and release.
    pub fn adsr(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        let mut config = Self::empty();
        config.set_adsr(attack, decay, sustain, release);
        config
    }

    /// Attack, decay, sustain, re-attack, release.
    pub fn adsar(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        let mut config = Self::empty();
        config.set_adsar(attack, decay, sustain, release);
        config
    }

    /// Attack, decay, re-attack, release, without holding.
    pub fn adar(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        let mut config = Self::empty();
        config.set_adar(attack, decay, sustain, release);
        config
    }

    /// Looping attack-decay.
    pub fn ad_loop(attack: f64, decay: f64) -> Self {
        let mut config = Self::empty();
        config.set_ad_loop(attack, decay);
        config
    }

    /// Looping attack-decay-release.
    pub fn adr_loop(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        let mut config = Self::empty();
        config.set_adr_loop(attack, decay, sustain, release);
        config
    }

    /// Looping attack-decay-attack-release.
    pub fn adar_loop(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        let mut config = Self::empty();
        config.set_adar_loop(attack, decay, sustain, release);
        config
    }

    /// In-place form of [`ad`](Self::ad).
    pub fn set_ad(&mut self, attack: f64, decay: f64) {
        self.apply_preset(
            &[0.0, 1.0, 0.0],
            &[attack, decay],
            &[Shape::Linear, Shape::Exponential],
            0,
            0,
        );
    }

    /// In-place form of [`ar`](Self::ar).
    pub fn set_ar(&mut self, attack: f64, decay: f64) {
        self.apply_preset(
            &[0.0, 1.0, 0.0],
            &[attack, decay],
            &[Shape::Linear, Shape::Linear],
            1,
            0,
        );
    }

    /// In-place form of [`adr`](Self::adr). `release` is ignored.
    pub fn set_adr(&mut self, attack: f64, decay: f64, sustain: f64, _release: f64) {
        self.apply_preset(
            &[0.0, 1.0, sustain, 0.0],
            &[attack, decay, sustain],
            &[Shape::Linear; 3],
            0,
            0,
        );
    }

    /// In-place form of [`adsr`](Self::adsr).
    pub fn set_adsr(&mut self, attack: f64, decay: f64, sustain: f64, release: f64) {
        self.apply_preset(
            &[0.0, 1.0, sustain, 0.0],
            &[attack, decay, release],
            &[Shape::Quartic, Shape::Exponential, Shape::Exponential],
            2,
            0,
        );
    }

    /// In-place form of [`adsar`](Self::adsar).
    pub fn set_adsar(&mut self, attack: f64, decay: f64, sustain: f64, release: f64) {
        self.apply_preset(
            &[0.0, 1.0, sustain, 1.0, 0.0],
            &[attack, decay, attack, release],
            &[Shape::Linear; 4],
            2,
            0,
        );
    }

    /// In-place form of [`adar`](Self::adar).
    pub fn set_adar(&mut self, attack: f64, decay: f64, sustain: f64, release: f64) {
        self.apply_preset(
            &[0.0, 1.0, sustain, 1.0, 0.0],
            &[attack, decay, attack, release],
            &[Shape::Linear; 4],
            0,
            0,
        );
    }

    /// In-place form of [`ad_loop`](Self::ad_loop).
    pub fn set_ad_loop(&mut self, attack: f64, decay: f64) {
        self.apply_preset(
            &[0.0, 1.0, 0.0],
            &[attack, decay],
            &[Shape::Linear; 2],
            0,
            2,
        );
    }

    /// In-place form of [`adr_loop`](Self::adr_loop).
    pub fn set_adr_loop(&mut self, attack: f64, decay: f64, sustain: f64, release: f64) {
        self.apply_preset(
            &[0.0, 1.0, sustain, 0.0],
            &[attack, decay, release],
            &[Shape::Linear; 3],
            0,
            3,
        );
    }

    /// In-place form of [`adar_loop`](Self::adar_loop).
    pub fn set_adar_loop(&mut self, attack: f64, decay: f64, sustain: f64, release: f64) {
        self.apply_preset(
            &[0.0, 1.0, sustain, 1.0, 0.0],
            &[attack, decay, attack, release],
            &[Shape::Linear; 4],
            0,
            4,
        );
    }

    // Presets always loop from segment 0 and leave `hard_reset` alone.
    fn apply_preset(
        &mut self,
        levels: &[f64],
        times: &[f64],
        shapes: &[Shape],
        sustain_point: usize,
        loop_end: usize,
    ) {
        debug_assert_eq!(levels.len(), times.len() + 1);
        debug_assert_eq!(shapes.len(), times.len());

        self.num_segments = times.len();
        self.sustain_point = sustain_point;
        self.levels[..levels.len()].copy_from_slice(levels);
        self.times[..times.len()].copy_from_slice(times);
        self.shapes[..shapes.len()].copy_from_slice(shapes);
        self.loop_start = 0;
        self.loop_end = loop_end;
    }

    /// Sets the duration control of `segment`.
    ///
    /// `segment` must be below [`MAX_SEGMENTS`]: debug builds panic, release
    /// builds ignore the call. See [`try_set_time`](Self::try_set_time).
    pub fn set_time(&mut self, segment: usize, time: f64) {
        debug_assert!(segment < MAX_SEGMENTS, "segment {segment} out of range");
        if let Some(slot) = self.times.get_mut(segment) {
            *slot = time;
        }
    }

    /// Sets level `index`, the level reached at the end of segment `index - 1`.
    ///
    /// Level 0 is the start of the sequence and the hard reset target.
    /// `index` must be at most [`MAX_SEGMENTS`]: debug builds panic, release
    /// builds ignore the call.
    pub fn set_level(&mut self, index: usize, level: f64) {
        debug_assert!(index <= MAX_SEGMENTS, "level {index} out of range");
        if let Some(slot) = self.levels.get_mut(index) {
            *slot = level;
        }
    }

    /// Sets the shape of `segment`, with the same precondition as
    /// [`set_time`](Self::set_time).
    pub fn set_shape(&mut self, segment: usize, shape: Shape) {
        debug_assert!(segment < MAX_SEGMENTS, "segment {segment} out of range");
        if let Some(slot) = self.shapes.get_mut(segment) {
            *slot = shape;
        }
    }

    /// Checked variant of [`set_time`](Self::set_time).
    pub fn try_set_time(&mut self, segment: usize, time: f64) -> ConfigResult<()> {
        let slot = self
            .times
            .get_mut(segment)
            .ok_or(ConfigError::SegmentIndexOutOfRange {
                index: segment,
                max: MAX_SEGMENTS,
            })?;
        *slot = time;
        Ok(())
    }

    /// Checked variant of [`set_level`](Self::set_level).
    pub fn try_set_level(&mut self, index: usize, level: f64) -> ConfigResult<()> {
        let slot = self
            .levels
            .get_mut(index)
            .ok_or(ConfigError::SegmentIndexOutOfRange {
                index,
                max: MAX_SEGMENTS + 1,
            })?;
        *slot = level;
        Ok(())
    }

    /// Checked variant of [`set_shape`](Self::set_shape).
    pub fn try_set_shape(&mut self, segment: usize, shape: Shape) -> ConfigResult<()> {
        let slot = self
            .shapes
            .get_mut(segment)
            .ok_or(ConfigError::SegmentIndexOutOfRange {
                index: segment,
                max: MAX_SEGMENTS,
            })?;
        *slot = shape;
        Ok(())
    }

    /// Sets the number of active segments.
    ///
    /// # Errors
    ///
    /// Fails without modifying the config if the count exceeds
    /// [`MAX_SEGMENTS`] or would leave the sustain point or loop window
    /// past the last segment.
    pub fn set_num_segments(&mut self, num_segments: usize) -> ConfigResult<()> {
        let mut candidate = *self;
        candidate.num_segments = num_segments;
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Sets the segment at which progression freezes while the gate is held.
    ///
    /// 0 disables sustain. A falling edge jumps straight to this segment.
    pub fn set_sustain_point(&mut self, sustain_point: usize) -> ConfigResult<()> {
        let mut candidate = *self;
        candidate.sustain_point = sustain_point;
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Sets the loop window `[start, end)`. Equal bounds disable looping.
    pub fn set_loop(&mut self, start: usize, end: usize) -> ConfigResult<()> {
        let mut candidate = *self;
        candidate.loop_start = start;
        candidate.loop_end = end;
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// When set, every retrigger restarts from `level(0)` instead of the
    /// current output.
    pub fn set_hard_reset(&mut self, hard_reset: bool) {
        self.hard_reset = hard_reset;
    }

    /// Checks the configuration invariants.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.num_segments > MAX_SEGMENTS {
            return Err(ConfigError::TooManySegments {
                requested: self.num_segments,
                max: MAX_SEGMENTS,
            });
        }
        if self.sustain_point > self.num_segments {
            return Err(ConfigError::SustainOutOfRange {
                sustain_point: self.sustain_point,
                num_segments: self.num_segments,
            });
        }
        if self.loop_start > self.loop_end || self.loop_end > self.num_segments {
            return Err(ConfigError::InvalidLoop {
                start: self.loop_start,
                end: self.loop_end,
                num_segments: self.num_segments,
            });
        }
        Ok(())
    }

    /// Number of active segments.
    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    /// Sustain segment, or 0 when sustain is disabled.
    pub fn sustain_point(&self) -> usize {
        self.sustain_point
    }

    /// First segment of the loop window.
    pub fn loop_start(&self) -> usize {
        self.loop_start
    }

    /// End of the loop window, exclusive.
    pub fn loop_end(&self) -> usize {
        self.loop_end
    }

    /// True when the loop window is non-empty.
    pub fn is_looping(&self) -> bool {
        self.loop_start != self.loop_end
    }

    /// True if retriggers restart from `level(0)`.
    pub fn hard_reset(&self) -> bool {
        self.hard_reset
    }

    /// Level `index`; panics if `index > MAX_SEGMENTS`.
    pub fn level(&self, index: usize) -> f64 {
        self.levels[index]
    }

    /// Duration control of `segment`; panics if `segment >= MAX_SEGMENTS`.
    pub fn time(&self, segment: usize) -> f64 {
        self.times[segment]
    }

    /// Shape of `segment`; panics if `segment >= MAX_SEGMENTS`.
    pub fn shape(&self, segment: usize) -> Shape {
        self.shapes[segment]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(config: &EnvelopeConfig) -> Vec<f64> {
        (0..=config.num_segments()).map(|i| config.level(i)).collect()
    }

    fn shapes(config: &EnvelopeConfig) -> Vec<Shape> {
        (0..config.num_segments()).map(|i| config.shape(i)).collect()
    }

    fn times(config: &EnvelopeConfig) -> Vec<f64> {
        (0..config.num_segments()).map(|i| config.time(i)).collect()
    }

    #[test]
    fn test_ad() {
        let config = EnvelopeConfig::ad(0.1, 0.3);
        assert_eq!(levels(&config), [0.0, 1.0, 0.0]);
        assert_eq!(times(&config), [0.1, 0.3]);
        assert_eq!(shapes(&config), [Shape::Linear, Shape::Exponential]);
        assert_eq!(config.sustain_point(), 0);
        assert!(!config.is_looping());
    }

    #[test]
    fn test_ar() {
        let config = EnvelopeConfig::ar(0.05, 0.2);
        assert_eq!(levels(&config), [0.0, 1.0, 0.0]);
        assert_eq!(shapes(&config), [Shape::Linear, Shape::Linear]);
        assert_eq!(config.sustain_point(), 1);
    }

    #[test]
    fn test_adr_final_time_is_sustain() {
        let config = EnvelopeConfig::adr(0.1, 0.2, 0.6, 0.4);
        assert_eq!(levels(&config), [0.0, 1.0, 0.6, 0.0]);
        assert_eq!(times(&config), [0.1, 0.2, 0.6]);
        assert_eq!(config.time(2), 0.6);
        assert_eq!(shapes(&config), [Shape::Linear; 3]);
        assert_eq!(config.sustain_point(), 0);
    }

    #[test]
    fn test_adsr() {
        let config = EnvelopeConfig::adsr(0.1, 0.2, 0.6, 0.4);
        assert_eq!(levels(&config), [0.0, 1.0, 0.6, 0.0]);
        assert_eq!(
            shapes(&config),
            [Shape::Quartic, Shape::Exponential, Shape::Exponential]
        );
        assert_eq!(config.sustain_point(), 2);
        assert!(!config.is_looping());
    }

    #[test]
    fn test_adsar_and_adar() {
        let adsar = EnvelopeConfig::adsar(0.1, 0.2, 0.6, 0.4);
        assert_eq!(levels(&adsar), [0.0, 1.0, 0.6, 1.0, 0.0]);
        assert_eq!(times(&adsar), [0.1, 0.2, 0.1, 0.4]);
        assert_eq!(adsar.sustain_point(), 2);

        let adar = EnvelopeConfig::adar(0.1, 0.2, 0.6, 0.4);
        assert_eq!(levels(&adar), levels(&adsar));
        assert_eq!(times(&adar), times(&adsar));
        assert_eq!(shapes(&adar), [Shape::Linear; 4]);
        assert_eq!(adar.sustain_point(), 0);
    }

    #[test]
    fn test_looping_presets() {
        let ad = EnvelopeConfig::ad_loop(0.1, 0.2);
        assert_eq!((ad.loop_start(), ad.loop_end()), (0, 2));
        assert_eq!(shapes(&ad), [Shape::Linear; 2]);

        let adr = EnvelopeConfig::adr_loop(0.1, 0.2, 0.5, 0.3);
        assert_eq!((adr.loop_start(), adr.loop_end()), (0, 3));
        assert_eq!(times(&adr), [0.1, 0.2, 0.3]);

        let adar = EnvelopeConfig::adar_loop(0.1, 0.2, 0.5, 0.3);
        assert_eq!((adar.loop_start(), adar.loop_end()), (0, 4));
        assert!(adar.is_looping());
    }

    #[test]
    fn test_presets_validate() {
        let presets = [
            EnvelopeConfig::ad(0.1, 0.2),
            EnvelopeConfig::ar(0.1, 0.2),
            EnvelopeConfig::adr(0.1, 0.2, 0.5, 0.3),
            EnvelopeConfig::adsr(0.1, 0.2, 0.5, 0.3),
            EnvelopeConfig::adsar(0.1, 0.2, 0.5, 0.3),
            EnvelopeConfig::adar(0.1, 0.2, 0.5, 0.3),
            EnvelopeConfig::ad_loop(0.1, 0.2),
            EnvelopeConfig::adr_loop(0.1, 0.2, 0.5, 0.3),
            EnvelopeConfig::adar_loop(0.1, 0.2, 0.5, 0.3),
            EnvelopeConfig::default(),
        ];
        for preset in presets {
            assert_eq!(preset.validate(), Ok(()));
        }
    }

    #[test]
    fn test_preset_switch_clears_loop() {
        let mut config = EnvelopeConfig::adar_loop(0.1, 0.2, 0.5, 0.3);
        config.set_ad(0.1, 0.2);
        assert!(!config.is_looping());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_preset_keeps_hard_reset() {
        let mut config = EnvelopeConfig::default();
        config.set_hard_reset(true);
        config.set_adsr(0.1, 0.2, 0.5, 0.3);
        assert!(config.hard_reset());
    }

    #[test]
    fn test_custom_topology() {
        let mut config = EnvelopeConfig::ad(0.0, 0.0);
        config.set_num_segments(5).unwrap();
        for segment in 0..5 {
            config.set_time(segment, 0.1 * segment as f64);
            config.set_level(segment + 1, segment as f64);
            config.set_shape(segment, Shape::Quartic);
        }
        config.set_sustain_point(3).unwrap();
        config.set_loop(1, 4).unwrap();

        assert_eq!(config.level(5), 4.0);
        assert_eq!(config.time(2), 0.2);
        assert_eq!(config.shape(4), Shape::Quartic);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_too_many_segments() {
        let mut config = EnvelopeConfig::ad(0.1, 0.2);
        let err = config.set_num_segments(MAX_SEGMENTS + 1).unwrap_err();
        assert_eq!(
            err,
            ConfigError::TooManySegments {
                requested: 7,
                max: MAX_SEGMENTS
            }
        );
        assert_eq!(config.num_segments(), 2);
    }

    #[test]
    fn test_rejects_sustain_past_end() {
        let mut config = EnvelopeConfig::ad(0.1, 0.2);
        assert!(matches!(
            config.set_sustain_point(3),
            Err(ConfigError::SustainOutOfRange { .. })
        ));
        assert_eq!(config.sustain_point(), 0);

        // Sustain on the final boundary is allowed
        config.set_sustain_point(2).unwrap();

        let mut config = EnvelopeConfig::adsr(0.1, 0.2, 0.5, 0.3);
        assert!(config.set_num_segments(1).is_err());
        assert_eq!(config.num_segments(), 3);
    }

    #[test]
    fn test_rejects_bad_loops() {
        let mut config = EnvelopeConfig::adar(0.1, 0.2, 0.5, 0.3);
        assert!(matches!(
            config.set_loop(3, 1),
            Err(ConfigError::InvalidLoop { .. })
        ));
        assert!(config.set_loop(0, 5).is_err());
        assert!(!config.is_looping());

        let mut config = EnvelopeConfig::adar_loop(0.1, 0.2, 0.5, 0.3);
        assert!(config.set_num_segments(3).is_err());
    }

    #[test]
    fn test_checked_setters() {
        let mut config = EnvelopeConfig::default();
        assert!(config.try_set_time(5, 0.3).is_ok());
        assert_eq!(
            config.try_set_time(6, 0.3),
            Err(ConfigError::SegmentIndexOutOfRange { index: 6, max: 6 })
        );
        assert!(config.try_set_level(6, 0.3).is_ok());
        assert!(config.try_set_level(7, 0.3).is_err());
        assert!(config.try_set_shape(6, Shape::Linear).is_err());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn test_unchecked_setter_panics_in_debug() {
        let mut config = EnvelopeConfig::default();
        config.set_time(MAX_SEGMENTS, 0.5);
    }

    #[test]
    fn test_nan_is_stored() {
        let mut config = EnvelopeConfig::default();
        config.set_level(1, f64::NAN);
        assert!(config.level(1).is_nan());
        assert_eq!(config.validate(), Ok(()));
    }
}
