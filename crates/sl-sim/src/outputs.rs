//! Per-tick outputs: forces, boiler state, usage, warnings and effects.

use crate::boiler::BoilerFlows;
use crate::firing::FiringOutputs;
use serde::{Deserialize, Serialize};
use sl_components::SteamUsageBreakdown;
use sl_core::units::{Force, Power, Pressure, hp, lbf, psi};
use sl_engine::{BoosterState, EngineRole, PowerLimit};

/// Discrete degraded-state and informational flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningFlags {
    pub fusible_plug_blown: bool,
    pub boiler_priming: bool,
    pub fuel_exhausted: bool,
    pub water_exhausted: bool,
    pub fire_exhausted: bool,
    pub grate_limit_exceeded: bool,
    pub boiler_limited: bool,
    pub critical_speed_limited: bool,
    pub hammer_blow_warning: bool,
    pub hammer_blow_excessive: bool,
}

impl WarningFlags {
    pub fn any(&self) -> bool {
        *self != WarningFlags::default()
    }
}

/// One engine's share of the tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineReport {
    pub name: String,
    pub role: EngineRole,
    /// Locomotive axle the engine drives
    pub axle: usize,
    pub indicated_hp: f64,
    pub mep_psi: f64,
    pub lp_mep_psi: Option<f64>,
    pub crank_rpm: f64,
    pub piston_speed_ft_per_min: f64,
    /// Signed rim force (lbf)
    pub tractive_force_lbf: f64,
    pub display_force_lbf: f64,
    pub axle_weight_delta_lbf: f64,
    pub steam_usage_lb_per_s: f64,
    pub power_limit: Option<PowerLimit>,
    pub booster_state: Option<BoosterState>,
}

impl EngineReport {
    pub fn indicated_power(&self) -> Power {
        hp(self.indicated_hp)
    }
}

/// Presentation-layer triggers derived from the physical state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectsState {
    /// Driving axle angle of the first main engine (rad)
    pub crank_angle_rad: f64,
    pub cylinder_cocks_open: bool,
    pub safety_valves_open: bool,
    pub blower_on: bool,
    pub injectors_on: [bool; 2],
    /// Exhaust steam up the chimney (lb/s)
    pub exhaust_lb_per_s: f64,
    pub cylinder_cock_lb_per_s: f64,
    pub safety_valve_lb_per_s: f64,
    /// Smoke density [0, 1] from the burn rate
    pub smoke: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickOutputs {
    /// Signed raw rim force of all engines (lbf)
    pub tractive_force_lbf: f64,
    /// Smoothed rim force for display (lbf)
    pub display_force_lbf: f64,
    /// Signed raw rim force per driven axle, indexed by axle id (lbf)
    pub axle_forces_lbf: Vec<f64>,
    pub engines: Vec<EngineReport>,
    pub boiler_pressure_psig: f64,
    pub boiler_heat_btu: f64,
    pub water_fraction: f64,
    pub water_temp_f: f64,
    pub fire_mass_lb: f64,
    pub firing: FiringOutputs,
    pub flows: BoilerFlows,
    pub steam: SteamUsageBreakdown,
    pub fuel_lb: f64,
    pub water_lb: f64,
    pub warnings: WarningFlags,
    pub effects: EffectsState,
}

impl TickOutputs {
    pub fn tractive_force(&self) -> Force {
        lbf(self.tractive_force_lbf)
    }

    pub fn boiler_pressure(&self) -> Pressure {
        psi(self.boiler_pressure_psig)
    }

    pub fn indicated_hp(&self) -> f64 {
        self.engines.iter().map(|e| e.indicated_hp).sum()
    }
}
