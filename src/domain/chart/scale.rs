//! Logarithmic mapping between data values and horizontal pixels.

use super::value_objects::LogRange;

/// Smallest log span the transform divides by.
const MIN_LOG_SPAN: f64 = 1e-9;

/// `pixel_x(v) = width * (log10(v) - log10(min)) / (log10(max) - log10(min))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    domain: LogRange,
    width: f64,
}

impl LogScale {
    /// Creates a scale over `domain` (in exponents) spanning `width` pixels.
    ///
    /// A domain narrower than `MIN_LOG_SPAN` is widened around its center so
    /// the transform never divides by zero.
    pub fn new(domain: LogRange, width: f64) -> Self {
        Self { domain: domain.with_min_span(MIN_LOG_SPAN), width: width.max(0.0) }
    }

    /// Scale over raw domain bounds. Both must be strictly positive.
    pub fn from_values(domain_min: f64, domain_max: f64, width: f64) -> Self {
        Self::new(LogRange::from_values(domain_min, domain_max), width)
    }

    pub fn domain(&self) -> LogRange {
        self.domain
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Pixels covered by one decade.
    pub fn pixels_per_decade(&self) -> f64 {
        self.width / self.domain.span()
    }

    /// Pixel position of `value`, or `None` when it has no logarithm.
    pub fn pixel_x(&self, value: f64) -> Option<f64> {
        if !(value.is_finite() && value > 0.0) {
            return None;
        }
        Some(self.exponent_to_pixel(value.log10()))
    }

    pub fn exponent_to_pixel(&self, exponent: f64) -> f64 {
        self.width * (exponent - self.domain.min) / self.domain.span()
    }

    pub fn pixel_to_exponent(&self, px: f64) -> f64 {
        if self.width <= 0.0 {
            return self.domain.min;
        }
        self.domain.min + px / self.width * self.domain.span()
    }

    /// Inverse of [`Self::pixel_x`].
    pub fn domain_value(&self, px: f64) -> f64 {
        10f64.powf(self.pixel_to_exponent(px))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_map_to_edges() {
        let scale = LogScale::from_values(1.0, 1000.0, 300.0);
        assert!((scale.pixel_x(1.0).unwrap() - 0.0).abs() < 1e-9);
        assert!((scale.pixel_x(10.0).unwrap() - 100.0).abs() < 1e-9);
        assert!((scale.pixel_x(1000.0).unwrap() - 300.0).abs() < 1e-9);
        assert!((scale.pixels_per_decade() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_values_have_no_position() {
        let scale = LogScale::from_values(1.0, 10.0, 100.0);
        assert_eq!(scale.pixel_x(0.0), None);
        assert_eq!(scale.pixel_x(-5.0), None);
        assert_eq!(scale.pixel_x(f64::NAN), None);
    }

    #[test]
    fn degenerate_domain_is_widened() {
        let scale = LogScale::new(LogRange::new(2.0, 2.0), 100.0);
        assert!(scale.domain().span() > 0.0);
        assert!(scale.pixel_x(100.0).unwrap().is_finite());
    }
}
