//! sl-core: stable foundation for the steam locomotive model.
//!
//! Contains:
//! - units (uom SI types, constructors and imperial conversions)
//! - numeric (Real + tolerances + float helpers)
//! - interp (monotone piecewise-linear curves, 1D and 2D)
//! - error (shared error types)

pub mod error;
pub mod interp;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use interp::{Interpolator, Interpolator2D};
pub use numeric::*;
pub use units::*;
