//! Precondition checks on physical bounds.
//!
//! Unlike the outlier filter these never adapt: a value outside its bounds
//! is a typed [`RangeViolation`] and the caller decides what to do with the case.

use crate::error::{Quantity, RangeViolation};

/// Inclusive `[lower, upper]` bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub const TEMPERATURE_C: Self = Self::new(-40.0, 60.0);
    pub const DUTY_PERCENT: Self = Self::new(0.0, 100.0);

    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// NaN is never contained.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }
}

pub fn validate(value: f64, bounds: Bounds, quantity: Quantity) -> Result<f64, RangeViolation> {
    if bounds.contains(value) {
        Ok(value)
    } else {
        Err(RangeViolation {
            quantity,
            value,
            lower: bounds.lower,
            upper: bounds.upper,
        })
    }
}

/// Check every value; the first violation wins.
pub fn validate_all<'a>(
    values: impl IntoIterator<Item = &'a f64>,
    bounds: Bounds,
    quantity: Quantity,
) -> Result<(), RangeViolation> {
    for &v in values {
        validate(v, bounds, quantity)?;
    }
    Ok(())
}
