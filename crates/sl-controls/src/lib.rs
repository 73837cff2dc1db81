//! Signal conditioning primitives shared by the locomotive model.
//!
//! Firing rates, tractive force displays and protective flags are all
//! conditioned signals: a smoothed rate, a rolling average of a
//! crank-angle-resolved force, a flag that sets at one threshold and clears
//! at another, a timer that gates a state transition.
//!
//! # Design Principles
//!
//! - **Plain state**: every primitive is a serde-derivable value so it can be
//!   captured in a snapshot and restored bit for bit
//! - **Δt-proportional**: a zero time step never changes state
//! - **No allocation per tick**: buffers are sized at construction

pub mod error;
pub mod filter;
pub mod latch;
pub mod moving_average;

pub use error::{ControlError, ControlResult};
pub use filter::{FirstOrderLag, LagState};
pub use latch::{DelayTimer, HysteresisLatch, LatchDirection};
pub use moving_average::MovingAverage;
