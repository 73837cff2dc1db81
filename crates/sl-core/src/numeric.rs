use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

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

/// Replace a non-finite value with `fallback`.
///
/// Tick-time arithmetic never propagates errors; NaN and infinities are
/// repaired at the computation site with this helper.
#[inline]
pub fn finite_or(v: Real, fallback: Real) -> Real {
    if v.is_finite() { v } else { fallback }
}

/// Clamp into `[lo, hi]`, mapping NaN to `lo`.
#[inline]
pub fn clamp_finite(v: Real, lo: Real, hi: Real) -> Real {
    if v.is_nan() { lo } else { v.clamp(lo, hi) }
}

/// Clamp a control fraction into `[0, 1]`.
#[inline]
pub fn clamp_unit(v: Real) -> Real {
    clamp_finite(v, 0.0, 1.0)
}

/// Linear blend between `a` and `b`.
#[inline]
pub fn lerp(a: Real, b: Real, t: Real) -> Real {
    a + (b - a) * t
}
