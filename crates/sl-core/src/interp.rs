//! Piecewise-linear curves over strictly increasing abscissae.
//!
//! Every empirical relationship in the model (steam tables, valve events,
//! efficiency curves) is evaluated through [`Interpolator`]. Outside the table
//! the first or last segment is extended linearly; callers that must not
//! extrapolate use [`Interpolator::eval_clamped`].
//!
//! [`Interpolator2D`] blends between a family of 1D curves keyed by a second
//! variable (for example rpm rows of a cutoff-keyed table).

use crate::error::{CoreError, CoreResult};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interpolator {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Interpolator {
    /// Build a curve from matching abscissa/ordinate slices.
    ///
    /// # Errors
    /// Fewer than two points, mismatched lengths, non-finite values or an
    /// abscissa that is not strictly increasing.
    pub fn new(x: &[f64], y: &[f64]) -> CoreResult<Self> {
        if x.len() != y.len() {
            return Err(CoreError::InvalidArg {
                what: "interpolator x and y lengths differ",
            });
        }
        if x.len() < 2 {
            return Err(CoreError::InvalidArg {
                what: "interpolator needs at least two points",
            });
        }
        for (&xi, &yi) in x.iter().zip(y) {
            crate::numeric::ensure_finite(xi, "interpolator x")?;
            crate::numeric::ensure_finite(yi, "interpolator y")?;
        }
        if let Some(index) = x.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CoreError::NotMonotone {
                what: "interpolator x",
                index: index + 1,
            });
        }
        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
        })
    }

    /// Evenly spaced abscissa starting at `x0` with step `dx`.
    pub fn uniform(x0: f64, dx: f64, y: &[f64]) -> CoreResult<Self> {
        let x: Vec<f64> = (0..y.len()).map(|i| x0 + dx * i as f64).collect();
        Self::new(&x, y)
    }

    /// Curve with the axes swapped. The ordinate must be strictly monotone;
    /// a decreasing ordinate is reversed so the new abscissa increases.
    pub fn inverse(&self) -> CoreResult<Self> {
        let increasing = self.y.windows(2).all(|w| w[1] > w[0]);
        let decreasing = self.y.windows(2).all(|w| w[1] < w[0]);
        if increasing {
            Self::new(&self.y, &self.x)
        } else if decreasing {
            let x: Vec<f64> = self.y.iter().rev().copied().collect();
            let y: Vec<f64> = self.x.iter().rev().copied().collect();
            Self::new(&x, &y)
        } else {
            Err(CoreError::NotMonotone {
                what: "inverse of non-monotone curve",
                index: 0,
            })
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x[0]
    }

    pub fn max_x(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Evaluate with linear extrapolation beyond the table ends.
    pub fn eval(&self, x: f64) -> f64 {
        let last = self.x.len() - 1;
        // Index of the segment [i, i+1] containing x, clamped to the end segments.
        let i = self.x.partition_point(|&xi| xi <= x).clamp(1, last) - 1;
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    /// Evaluate with the argument clamped to the table domain.
    pub fn eval_clamped(&self, x: f64) -> f64 {
        let x = if x.is_nan() { self.min_x() } else { x };
        self.eval(x.clamp(self.min_x(), self.max_x()))
    }
}

/// Family of curves `y = f_z(x)` keyed by increasing `z`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interpolator2D {
    z: Vec<f64>,
    curves: Vec<Interpolator>,
}

impl Interpolator2D {
    pub fn new(z: &[f64], curves: Vec<Interpolator>) -> CoreResult<Self> {
        if z.len() != curves.len() || z.is_empty() {
            return Err(CoreError::InvalidArg {
                what: "2D interpolator needs one curve per z key",
            });
        }
        if let Some(index) = z.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CoreError::NotMonotone {
                what: "2D interpolator z",
                index: index + 1,
            });
        }
        Ok(Self {
            z: z.to_vec(),
            curves,
        })
    }

    /// Evaluate at `(z, x)`. `z` is clamped to the key range; each curve is
    /// evaluated clamped to its own domain.
    pub fn eval(&self, z: f64, x: f64) -> f64 {
        let last = self.z.len() - 1;
        let z = if z.is_nan() { self.z[0] } else { z.clamp(self.z[0], self.z[last]) };
        if last == 0 {
            return self.curves[0].eval_clamped(x);
        }
        let i = self.z.partition_point(|&zi| zi <= z).clamp(1, last) - 1;
        let (z0, z1) = (self.z[i], self.z[i + 1]);
        let t = (z - z0) / (z1 - z0);
        let y0 = self.curves[i].eval_clamped(x);
        let y1 = self.curves[i + 1].eval_clamped(x);
        y0 + (y1 - y0) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ramp() -> Interpolator {
        Interpolator::new(&[0.0, 1.0, 3.0], &[0.0, 10.0, 20.0]).unwrap()
    }

    #[test]
    fn hits_table_points() {
        let c = ramp();
        assert_eq!(c.eval(0.0), 0.0);
        assert_eq!(c.eval(1.0), 10.0);
        assert_eq!(c.eval(3.0), 20.0);
        assert!((c.eval(2.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn extrapolates_from_end_segments() {
        let c = ramp();
        assert!((c.eval(-1.0) + 10.0).abs() < 1e-12);
        assert!((c.eval(5.0) - 30.0).abs() < 1e-12);
        assert_eq!(c.eval_clamped(5.0), 20.0);
        assert_eq!(c.eval_clamped(f64::NAN), 0.0);
    }

    #[test]
    fn rejects_bad_tables() {
        assert!(Interpolator::new(&[0.0], &[1.0]).is_err());
        assert!(Interpolator::new(&[0.0, 1.0], &[1.0]).is_err());
        assert!(matches!(
            Interpolator::new(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0]),
            Err(CoreError::NotMonotone { index: 2, .. })
        ));
        assert!(Interpolator::new(&[0.0, f64::NAN], &[0.0, 1.0]).is_err());
    }

    #[test]
    fn inverse_of_decreasing_curve() {
        let c = Interpolator::new(&[0.0, 1.0, 2.0], &[5.0, 3.0, 1.0]).unwrap();
        let inv = c.inverse().unwrap();
        assert!((inv.eval(3.0) - 1.0).abs() < 1e-12);
        assert!((inv.eval(2.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn inverse_rejects_plateau() {
        let c = Interpolator::new(&[0.0, 1.0, 2.0], &[1.0, 1.0, 2.0]).unwrap();
        assert!(c.inverse().is_err());
    }

    #[test]
    fn blends_between_rows() {
        let lo = Interpolator::new(&[0.0, 1.0], &[0.0, 1.0]).unwrap();
        let hi = Interpolator::new(&[0.0, 1.0], &[1.0, 2.0]).unwrap();
        let grid = Interpolator2D::new(&[0.0, 10.0], vec![lo, hi]).unwrap();
        assert!((grid.eval(5.0, 0.5) - 1.0).abs() < 1e-12);
        assert!((grid.eval(-3.0, 0.5) - 0.5).abs() < 1e-12);
        assert!((grid.eval(30.0, 0.5) - 1.5).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn monotone_table_gives_monotone_curve(a in -10.0f64..10.0, b in -10.0f64..10.0) {
            let c = ramp();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(c.eval(lo) <= c.eval(hi) + 1e-12);
        }
    }
}
