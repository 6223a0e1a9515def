//! Segment shaping curves.
//!
//! A shape maps a segment's normalized phase [0, 1] to the fraction of the
//! way travelled from the segment's start value to its end level. At run time
//! shapes are read from precomputed tables (see [`CurveTables`]); the closed
//! forms here are used to generate the default tables.
//!
//! [`CurveTables`]: super::CurveTables

/// Exponent applied to the phase by the quartic shape.
pub const QUARTIC_EXPONENT: f64 = 3.32;

/// Rate of the exponential shape's approach to its end level.
pub const EXPONENTIAL_RATE: f64 = 4.0;

/// Shaping curve for one envelope segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    /// Constant rate of change
    #[default]
    Linear,

    /// Fast start, slow finish (`1 - e^(-4x)`)
    Exponential,

    /// Slow start, fast finish (`x^3.32`)
    Quartic,
}

impl Shape {
    /// All shapes, in table order.
    pub const ALL: [Shape; 3] = [Shape::Linear, Shape::Exponential, Shape::Quartic];

    /// Evaluates the un-normalized closed form of the shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use multistage::Shape;
    ///
    /// assert_eq!(Shape::Linear.evaluate(0.5), 0.5);
    /// assert_eq!(Shape::Quartic.evaluate(0.0), 0.0);
    /// ```
    pub fn evaluate(self, x: f64) -> f64 {
        match self {
            Shape::Linear => x,
            Shape::Exponential => 1.0 - (-EXPONENTIAL_RATE * x).exp(),
            Shape::Quartic => x.powf(QUARTIC_EXPONENT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        assert_eq!(Shape::default(), Shape::Linear);
    }

    #[test]
    fn test_shapes_start_at_zero() {
        for shape in Shape::ALL {
            assert_eq!(shape.evaluate(0.0), 0.0);
        }
    }

    #[test]
    fn test_exponential_above_linear_above_quartic() {
        for x in [0.1, 0.25, 0.5, 0.75, 0.9] {
            assert!(Shape::Exponential.evaluate(x) / Shape::Exponential.evaluate(1.0) > x);
            assert!(Shape::Quartic.evaluate(x) < x);
        }
    }

    #[test]
    fn test_shapes_monotonic() {
        for shape in Shape::ALL {
            let mut previous = shape.evaluate(0.0);
            for i in 1..=100 {
                let current = shape.evaluate(i as f64 / 100.0);
                assert!(current > previous, "{shape:?} not increasing at {i}");
                previous = current;
            }
        }
    }
}
