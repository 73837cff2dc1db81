//! First-order lag used to smooth firing and feed rates.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Output of a first-order lag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LagState {
    pub value: f64,
}

/// First-order lag with time constant `tau`.
///
/// Dynamics: dy/dt = (u - y) / tau, discretized exactly for a held input:
///
/// ```text
/// y[n+1] = y[n] + (u - y[n]) * (1 - exp(-dt / tau))
/// ```
///
/// The exact form never overshoots, whatever the step size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FirstOrderLag {
    /// Time constant (seconds)
    pub tau: f64,
}

impl FirstOrderLag {
    pub fn new(tau: f64) -> ControlResult<Self> {
        if !tau.is_finite() || tau <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "tau must be positive and finite",
            });
        }
        Ok(Self { tau })
    }

    /// Advance the lag by `dt` toward `input`.
    pub fn step(&self, state: LagState, dt: f64, input: f64) -> LagState {
        if dt <= 0.0 || !input.is_finite() {
            return state;
        }
        let alpha = 1.0 - (-dt / self.tau).exp();
        LagState {
            value: state.value + (input - state.value) * alpha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_tau() {
        assert!(FirstOrderLag::new(0.0).is_err());
        assert!(FirstOrderLag::new(-1.0).is_err());
        assert!(FirstOrderLag::new(f64::NAN).is_err());
    }

    #[test]
    fn one_time_constant_reaches_63_percent() {
        let lag = FirstOrderLag::new(2.0).unwrap();
        let s = lag.step(LagState::default(), 2.0, 1.0);
        assert!((s.value - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn zero_step_is_identity() {
        let lag = FirstOrderLag::new(1.0).unwrap();
        let s = LagState { value: 0.3 };
        assert_eq!(lag.step(s, 0.0, 10.0), s);
    }

    #[test]
    fn large_step_does_not_overshoot() {
        let lag = FirstOrderLag::new(0.1).unwrap();
        let s = lag.step(LagState { value: 0.0 }, 100.0, 1.0);
        assert!(s.value <= 1.0);
        assert!((s.value - 1.0).abs() < 1e-9);
    }
}
