//! sl-sim: the steam locomotive as a whole, advanced one tick at a time.
//!
//! Provides:
//! - Boiler heat/mass balance with saturation pressure, shell radiation and
//!   the fusible-plug and priming degraded states
//! - Firebox and firing controller (manual/automatic, overrides, boost,
//!   grate limit, fire exhaustion) and the tender
//! - [`SteamLocomotive`]: per-tick orchestration of firing, engines,
//!   consumers and boiler, with warnings and an effects record
//! - Flat serde snapshots with restore
//! - Periodic `tracing` telemetry and a fixed-step runner
//!
//! # Design Principles
//!
//! - Degraded physical states are flags in [`WarningFlags`], never errors
//! - Ticking never fails: bad arithmetic is clamped where it happens
//! - `update` with `dt <= 0` changes nothing
//!
//! # Example
//!
//! ```no_run
//! # use sl_sim::*;
//! # fn build() -> SteamLocomotive { unimplemented!() }
//! let mut loco = build();
//! let controls = ControlInputs {
//!     throttle: 0.6,
//!     cutoff: 0.35,
//!     ..Default::default()
//! };
//! let env = Environment {
//!     speed_mps: 12.0,
//!     ..Default::default()
//! };
//! let out = loco.update(0.1, &controls, &env);
//! println!("{:.0} lbf at {:.0} psig", out.tractive_force_lbf, out.boiler_pressure_psig);
//! ```

pub mod boiler;
pub mod error;
pub mod firing;
pub mod inputs;
pub mod locomotive;
pub mod outputs;
pub mod runner;
pub mod snapshot;
pub mod telemetry;
pub mod tender;

pub use boiler::{BoilerConfig, BoilerFlows, BoilerState, StartMode};
pub use error::{SimError, SimResult};
pub use firing::{
    Firebox, FiringCommand, FiringConfig, FiringInputs, FiringMode, FiringOutputs, FiringState,
    FuelType,
};
pub use inputs::{ControlInputs, Environment};
pub use locomotive::{LocomotiveSpec, SteamLocomotive};
pub use outputs::{EffectsState, EngineReport, TickOutputs, WarningFlags};
pub use runner::{RunOptions, RunRecord, run_fixed};
pub use snapshot::{LocomotiveSnapshot, SNAPSHOT_VERSION};
pub use telemetry::{Telemetry, Verbosity};
pub use tender::{TenderConfig, TenderState};
