//! Table lookup helpers and pitch conversion.
//!
//! Every table in this crate samples a function over `[0, 1]` at 256 equal
//! steps plus one guard sample at the right edge, for 257 entries in total.

/// Number of interpolation steps in a lookup table.
pub const TABLE_STEPS: usize = 256;

/// Number of entries in a lookup table (steps plus the guard sample).
pub const TABLE_LEN: usize = TABLE_STEPS + 1;

/// A 257-entry lookup table over `[0, 1]`.
pub type Table = [f64; TABLE_LEN];

/// Semitone offset of the pitch tables' first coarse entry.
const PITCH_OFFSET: f64 = 128.0;

/// Splits a non-negative value into its integral and fractional parts.
///
/// Negative and NaN inputs saturate the integral part to 0.
///
/// # Examples
///
/// ```
/// use multistage::units::integral_fractional;
///
/// assert_eq!(integral_fractional(3.25), (3, 0.25));
/// ```
#[inline]
pub fn integral_fractional(value: f64) -> (usize, f64) {
    let integral = value as usize;
    (integral, value - integral as f64)
}

/// Builds a table by evaluating `f` at every index.
pub fn build_table(f: impl FnMut(usize) -> f64) -> Table {
    std::array::from_fn(f)
}

/// Linearly interpolates `table` at `x` in `[0, 1]`.
///
/// `x` is clamped into the table's domain, so `interpolate(table, 0.0)` is
/// exactly `table[0]` and any `x >= 1.0` returns exactly `table[256]`.
/// NaN propagates.
///
/// # Examples
///
/// ```
/// use multistage::units::{build_table, interpolate};
///
/// let ramp = build_table(|i| i as f64);
/// assert_eq!(interpolate(&ramp, 0.5), 128.0);
/// assert_eq!(interpolate(&ramp, 1.0), 256.0);
/// ```
#[inline]
pub fn interpolate(table: &Table, x: f64) -> f64 {
    let (integral, fractional) = integral_fractional(x.clamp(0.0, 1.0) * TABLE_STEPS as f64);
    if integral >= TABLE_STEPS {
        return table[TABLE_STEPS];
    }
    let a = table[integral];
    let b = table[integral + 1];
    a + (b - a) * fractional
}

/// Coarse and fine tables for semitone to frequency ratio conversion.
///
/// The coarse table holds one entry per semitone from -128 to +128, the fine
/// table spans a single semitone in 256 steps.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchTables {
    coarse: Table,
    fine: Table,
}

impl PitchTables {
    /// Generates equal-tempered tables.
    pub fn new() -> Self {
        Self {
            coarse: build_table(|i| 2.0_f64.powf((i as f64 - PITCH_OFFSET) / 12.0)),
            fine: build_table(|i| 2.0_f64.powf(i as f64 / (TABLE_STEPS as f64 * 12.0))),
        }
    }

    /// Wraps caller-supplied tables.
    pub fn from_tables(coarse: Table, fine: Table) -> Self {
        Self { coarse, fine }
    }

    /// Converts a semitone offset into a frequency ratio.
    ///
    /// Approximates `2^(semitones / 12)` for semitones in `[-128, 128]`;
    /// values outside that range are clamped.
    ///
    /// # Examples
    ///
    /// ```
    /// use multistage::units::PitchTables;
    ///
    /// let tables = PitchTables::new();
    /// assert!((tables.semitones_to_ratio(12.0) - 2.0).abs() < 1e-9);
    /// ```
    #[inline]
    pub fn semitones_to_ratio(&self, semitones: f64) -> f64 {
        let pitch = (semitones + PITCH_OFFSET).clamp(0.0, 2.0 * PITCH_OFFSET);
        let (integral, fractional) = integral_fractional(pitch);
        let fine_index = ((fractional * TABLE_STEPS as f64) as usize).min(TABLE_STEPS);
        self.coarse[integral] * self.fine[fine_index]
    }
}

impl Default for PitchTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_integral_fractional() {
        assert_eq!(integral_fractional(0.0), (0, 0.0));
        assert_eq!(integral_fractional(255.5), (255, 0.5));
        assert_eq!(integral_fractional(-1.0).0, 0);
    }

    #[test]
    fn test_interpolate_endpoints_exact() {
        let table = build_table(|i| ((i * 37) % 101) as f64 * 0.013 - 0.4);
        assert_eq!(interpolate(&table, 0.0), table[0]);
        assert_eq!(interpolate(&table, 1.0), table[TABLE_STEPS]);
    }

    #[test]
    fn test_interpolate_midpoints() {
        let table = build_table(|i| (i * 2) as f64);
        // x = 1/512 sits halfway between entries 0 and 1
        assert!(approx_eq(interpolate(&table, 1.0 / 512.0), 1.0));
        assert!(approx_eq(interpolate(&table, 0.25), 128.0));
    }

    #[test]
    fn test_interpolate_clamps_domain() {
        let table = build_table(|i| i as f64);
        assert_eq!(interpolate(&table, -0.5), 0.0);
        assert_eq!(interpolate(&table, 3.0), 256.0);
        assert!(interpolate(&table, f64::NAN).is_nan());
    }

    #[test]
    fn test_semitones_to_ratio() {
        let tables = PitchTables::new();
        assert!(approx_eq(tables.semitones_to_ratio(0.0), 1.0));
        assert!(approx_eq(tables.semitones_to_ratio(12.0), 2.0));
        assert!(approx_eq(tables.semitones_to_ratio(-24.0), 0.25));

        let expected = 2.0_f64.powf(7.5 / 12.0);
        assert!((tables.semitones_to_ratio(7.5) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_semitones_to_ratio_clamps() {
        let tables = PitchTables::new();
        assert_eq!(
            tables.semitones_to_ratio(500.0),
            tables.semitones_to_ratio(128.0)
        );
        assert_eq!(
            tables.semitones_to_ratio(-500.0),
            tables.semitones_to_ratio(-128.0)
        );
    }
}
