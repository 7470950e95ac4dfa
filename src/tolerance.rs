//! A [ToleranceContext] decides when two floating point numbers are "equal enough".
//!
//! Every fuzzy comparison made by the crate (feasibility of a constraint,
//! integrality of a variable, agreement of two objective values) goes through
//! this type, so that the same precision and scale apply everywhere.
//!
//! The epsilon used to compare a value `b` against a reference value `a` is
//! `max(10^-scale, |a| * 10^-precision)`: an absolute tolerance for numbers close
//! to zero combined with a relative one for large magnitudes.
use std::fmt::{Display, Formatter};

/// A pair of a precision (number of significant digits) and a scale (number of decimal places).
///
/// ```
/// use mip_lp::ToleranceContext;
/// let context = ToleranceContext::new(7, 6);
/// assert!(context.within(1.0, 1.000_000_5));
/// assert!(!context.within(1.0, 1.000_01));
/// // Huge magnitudes are compared relatively
/// assert!(context.within(1e12, 1e12 + 1000.));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToleranceContext {
    precision: u32,
    scale: i32,
}

impl ToleranceContext {
    /// Create a context with the given number of significant digits and decimal places.
    pub const fn new(precision: u32, scale: i32) -> Self {
        ToleranceContext { precision, scale }
    }

    /// Number of significant digits
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Number of decimal places
    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// A copy of this context with a different scale
    ///
    /// ```
    /// # use mip_lp::ToleranceContext;
    /// let strict = ToleranceContext::new(7, 6);
    /// assert_eq!(strict.with_scale(4), ToleranceContext::new(7, 4));
    /// ```
    pub fn with_scale(self, scale: i32) -> Self {
        ToleranceContext { scale, ..self }
    }

    /// A copy of this context with a different precision
    pub fn with_precision(self, precision: u32) -> Self {
        ToleranceContext { precision, ..self }
    }

    /// The absolute tolerance, used on its own for values close to zero
    #[inline]
    pub fn absolute(&self) -> f64 {
        10f64.powi(-self.scale)
    }

    /// The relative tolerance, applied to the magnitude of the reference value
    #[inline]
    pub fn relative(&self) -> f64 {
        10f64.powi(-(self.precision as i32))
    }

    /// The epsilon allowed around the reference value `reference`
    #[inline]
    pub fn epsilon(&self, reference: f64) -> f64 {
        let relative = if reference.is_finite() {
            reference.abs() * self.relative()
        } else {
            0.
        };
        self.absolute().max(relative)
    }

    /// Returns true when `value` is within [epsilon](Self::epsilon) of `reference`.
    /// Two identical values (including two zeros, and two identical infinities) always compare equal.
    #[inline]
    #[allow(clippy::float_cmp)]
    pub fn within(&self, reference: f64, value: f64) -> bool {
        if reference == value {
            return true;
        }
        (reference - value).abs() <= self.epsilon(reference)
    }

    /// True when `value` is within epsilon of zero
    #[inline]
    pub fn is_zero(&self, value: f64) -> bool {
        self.within(0., value)
    }

    /// True when `value` is within epsilon of the closest integer
    ///
    /// ```
    /// # use mip_lp::ToleranceContext;
    /// let context = ToleranceContext::new(12, 6);
    /// assert!(context.is_integral(3.000_000_1));
    /// assert!(!context.is_integral(3.5));
    /// ```
    #[inline]
    pub fn is_integral(&self, value: f64) -> bool {
        value.is_finite() && self.within(value.round(), value)
    }

    /// `value <= limit`, allowing `value` to exceed `limit` by epsilon
    #[inline]
    pub fn is_at_most(&self, value: f64, limit: f64) -> bool {
        value <= limit || self.within(limit, value)
    }

    /// `value >= limit`, allowing `value` to fall short of `limit` by epsilon
    #[inline]
    pub fn is_at_least(&self, value: f64, limit: f64) -> bool {
        value >= limit || self.within(limit, value)
    }

    /// True when `value` lies in `[lower, upper]` up to the tolerance.
    /// Infinite limits never reject a finite value.
    pub fn is_between(&self, lower: f64, value: f64, upper: f64) -> bool {
        !value.is_nan() && self.is_at_least(value, lower) && self.is_at_most(value, upper)
    }
}

/// 12 significant digits, 8 decimal places
impl Default for ToleranceContext {
    fn default() -> Self {
        ToleranceContext::new(12, 8)
    }
}

impl Display for ToleranceContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "precision={} scale={}", self.precision, self.scale)
    }
}
