//! Per-tick control and environment inputs.

use crate::firing::{FiringCommand, FiringMode};
use serde::{Deserialize, Serialize};

/// Cab control positions for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlInputs {
    /// Regulator opening [0, 1]
    pub throttle: f64,
    /// Signed reverser cutoff; negative is reverse gear
    pub cutoff: f64,
    pub damper: f64,
    pub blower: f64,
    pub injectors: [f64; 2],
    pub motion_pump: f64,
    /// Manual firing rate [0, 1]
    pub firing_rate: f64,
    pub firing_mode: FiringMode,
    pub firing_command: Option<FiringCommand>,
    pub cylinder_cocks: bool,
    pub compound_bypass: bool,
    pub booster_engage: bool,
    pub booster_latch: bool,
    pub compressor: bool,
    pub generator: bool,
    pub large_ejector: bool,
    pub small_ejector: bool,
    /// Selected gear for geared engines, 0 is neutral
    pub gear: usize,
}

impl Default for ControlInputs {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            cutoff: 0.0,
            damper: 1.0,
            blower: 0.0,
            injectors: [0.0; 2],
            motion_pump: 0.0,
            firing_rate: 0.0,
            firing_mode: FiringMode::Automatic,
            firing_command: None,
            cylinder_cocks: false,
            compound_bypass: false,
            booster_engage: false,
            booster_latch: false,
            compressor: false,
            generator: false,
            large_ejector: false,
            small_ejector: false,
            gear: 1,
        }
    }
}

/// Conditions supplied by the surrounding train simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Signed train speed (m/s)
    pub speed_mps: f64,
    pub outside_temp_f: f64,
    /// Brake/auxiliary air available to the booster controls
    pub air_available: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            speed_mps: 0.0,
            outside_temp_f: 50.0,
            air_available: true,
        }
    }
}
