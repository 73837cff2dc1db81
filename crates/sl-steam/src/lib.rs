//! sl-steam: steam property provider for the locomotive model.
//!
//! Provides:
//! - Saturated steam and water tables (density, enthalpy, saturation
//!   temperature and pressure, specific heat of water)
//! - Valve-event curves keyed by cutoff
//! - Cylinder calibration curves (wire drawing, cutoff pressure drop,
//!   condensation, superheat, piston speed factors)
//! - Firing curves (boiler efficiency vs. grate combustion rate) and the
//!   live steam injector ratio
//!
//! # Architecture
//!
//! All curves live in one immutable [`SteamProperties`] value built once at
//! startup and shared as `Arc<SteamProperties>` by every component. Tables are
//! published in imperial units (psig, °F, BTU/lb, lb/ft³), so the lookups are
//! imperial too; callers convert at their own boundary.

pub mod error;
pub mod properties;
pub mod tables;

pub use error::{SteamError, SteamResult};
pub use properties::{CycleEventFractions, SteamProperties};
