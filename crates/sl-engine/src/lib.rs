//! Cylinder engine and tractive force models for steam locomotives.
//!
//! Provides:
//! - Cylinder geometry and engine topologies (simple, non-receiver compound,
//!   geared)
//! - Indicator-diagram engine: valve events, characteristic cycle pressures,
//!   mean effective pressure and cylinder steam usage
//! - Crank-angle-resolved tractive force with reciprocating inertia, vertical
//!   thrust and hammer blow, plus the simplified mean-force formula
//! - Booster engine state machine
//!
//! [`SteamEngine`] ties these together for one engine per tick.

pub mod booster;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod indicator;
pub mod tractive;
pub mod usage;

pub use booster::{BoosterCommand, BoosterController, BoosterState};
pub use engine::{EngineInputs, EngineOutputs, EngineRole, EngineState, PowerLimit, SteamEngine};
pub use error::{EngineError, EngineResult};
pub use geometry::{CylinderGeometry, EngineParams, EngineRatings, EngineTopology};
pub use indicator::{
    CycleConditions, CyclePressures, CylinderCycle, IndicatorDiagram, compute_indicator_diagram,
    log_mean_pressure, mean_effective_pressure,
};
pub use tractive::{CrankDescriptor, TractiveForceModel, TractiveForceState};
pub use usage::CylinderSteamUsage;
