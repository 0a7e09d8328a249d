use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Reference ambient temperature (K) used by sensible-heat balances.
pub const AMBIENT_TEMPERATURE_K: Real = 298.15;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::OutOfRange { what, value: v })
    }
}

/// Finite and greater than or equal to zero.
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(CoreError::OutOfRange { what, value: v })
    }
}

/// Subtract `amount` from `value` without going below zero.
///
/// Returns the new value and the amount actually removed.
pub fn floored_sub(value: Real, amount: Real) -> (Real, Real) {
    let next = (value - amount).max(0.0);
    (next, value - next)
}

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[Real]) -> Real {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<Real>() / values.len() as Real
    }
}
