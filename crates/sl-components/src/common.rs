//! Common utilities for consumer calculations.

use crate::error::{ComponentError, ComponentResult};
use sl_core::imperial::ONE_ATMOSPHERE_PSI;
use sl_core::numeric::ensure_finite;

/// Napier's rule divisor: lb/s = P(psia) × A(in²) / 70 for steam discharging
/// to atmosphere through a sharp orifice at choked conditions.
pub const NAPIER_DIVISOR: f64 = 70.0;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// Ensure a configured rate, area or capacity is finite and not negative.
pub fn check_non_negative(value: f64, what: &'static str) -> ComponentResult<f64> {
    check_finite(value, what)?;
    if value < 0.0 {
        return Err(ComponentError::InvalidArg { what });
    }
    Ok(value)
}

/// Steam discharged through an orifice of `area_in2` from `psig` to
/// atmosphere. Zero at or below atmospheric pressure.
pub fn napier_flow_lb_per_s(psig: f64, area_in2: f64) -> f64 {
    if psig <= 0.0 || area_in2 <= 0.0 || !psig.is_finite() {
        return 0.0;
    }
    (psig + ONE_ATMOSPHERE_PSI) * area_in2 / NAPIER_DIVISOR
}
