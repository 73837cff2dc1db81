//! sl-components: steam consumers attached to the boiler.
//!
//! Provides models for every draw on the boiler:
//! - Safety valves with lift/reseat hysteresis
//! - Live steam injectors and the mechanical motion pump
//! - Blower, cylinder cocks and fusible plug vent (orifice discharge)
//! - Fixed-rate auxiliaries: air compressor, generator, vacuum ejectors, stoker
//! - Engine draws (main cylinders and booster) fed back from the engines
//!
//! All consumers implement the [`SteamConsumer`] trait: a deterministic
//! function of the boiler conditions and the consumer's own setting that
//! returns the steam withdrawn, water returned and heat removed this tick.
//! [`SteamConsumerSet`] owns them for the locomotive lifetime and aggregates
//! the draws.
//!
//! # Example
//!
//! ```no_run
//! use sl_components::{BoilerConditions, Blower, SteamConsumer};
//! use sl_steam::SteamProperties;
//!
//! let props = SteamProperties::new().unwrap();
//! let conditions = BoilerConditions::at_pressure(&props, 200.0, 200.0, 60.0);
//! let mut blower = Blower::new(0.5).unwrap();
//! blower.setting = 0.4;
//! let draw = blower.draw(&conditions);
//! println!("Blower steam: {} lb/s", draw.steam_lb_per_s);
//! ```

pub mod auxiliary;
pub mod common;
pub mod consumer_set;
pub mod error;
pub mod feedwater;
pub mod orifice;
pub mod safety_valve;
pub mod traits;

// Re-exports
pub use auxiliary::{AuxiliaryKind, Blower, EngineDraw, FixedAuxiliary};
pub use common::napier_flow_lb_per_s;
pub use consumer_set::{SteamConsumerSet, SteamUsageBreakdown};
pub use error::{ComponentError, ComponentResult};
pub use feedwater::{Injector, MotionPump};
pub use orifice::{CylinderCocks, FusiblePlugVent};
pub use safety_valve::SafetyValves;
pub use traits::{BoilerConditions, ConsumerKind, SteamConsumer, SteamDraw};
