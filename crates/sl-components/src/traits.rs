//! Core trait for boiler steam consumers.

use serde::{Deserialize, Serialize};
use sl_steam::SteamProperties;

/// Boiler state as seen by a consumer for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoilerConditions {
    pub pressure_psig: f64,
    pub max_pressure_psig: f64,
    pub steam_enthalpy_btu_per_lb: f64,
    pub water_enthalpy_btu_per_lb: f64,
    /// Enthalpy of tender feedwater entering through injectors or pumps.
    pub feedwater_enthalpy_btu_per_lb: f64,
    /// Live steam injector delivery ratio at this pressure.
    pub injector_water_per_steam: f64,
}

impl BoilerConditions {
    /// Look up enthalpies for a boiler at `pressure_psig`.
    pub fn at_pressure(
        props: &SteamProperties,
        pressure_psig: f64,
        max_pressure_psig: f64,
        feedwater_temp_f: f64,
    ) -> Self {
        Self {
            pressure_psig,
            max_pressure_psig,
            steam_enthalpy_btu_per_lb: props.steam_enthalpy_btu_per_lb(pressure_psig),
            water_enthalpy_btu_per_lb: props.water_enthalpy_btu_per_lb(pressure_psig),
            // Liquid water below boiling: 1 BTU/lb·°F above 32 °F.
            feedwater_enthalpy_btu_per_lb: (feedwater_temp_f - 32.0).max(0.0),
            injector_water_per_steam: props.injector_water_per_steam(pressure_psig),
        }
    }

    /// Latent heat carried away by each pound of steam leaving the boiler.
    pub fn latent_heat_btu_per_lb(&self) -> f64 {
        (self.steam_enthalpy_btu_per_lb - self.water_enthalpy_btu_per_lb).max(0.0)
    }

    /// Heat needed to raise one pound of feedwater to boiler water enthalpy.
    pub fn feed_heating_btu_per_lb(&self) -> f64 {
        (self.water_enthalpy_btu_per_lb - self.feedwater_enthalpy_btu_per_lb).max(0.0)
    }

    /// Boiler pressure as a fraction of its maximum.
    pub fn pressure_fraction(&self) -> f64 {
        if self.max_pressure_psig > 0.0 {
            (self.pressure_psig / self.max_pressure_psig).max(0.0)
        } else {
            0.0
        }
    }
}

/// Exchange between one consumer and the boiler over one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SteamDraw {
    /// Steam withdrawn from the boiler (lb/s).
    pub steam_lb_per_s: f64,
    /// Water entering the boiler (lb/s).
    pub water_in_lb_per_s: f64,
    /// Heat removed from the boiler (BTU/s). Positive removes heat.
    pub heat_btu_per_s: f64,
}

impl SteamDraw {
    pub const ZERO: SteamDraw = SteamDraw {
        steam_lb_per_s: 0.0,
        water_in_lb_per_s: 0.0,
        heat_btu_per_s: 0.0,
    };

    /// Plain steam withdrawal: usage × (steam enthalpy − water enthalpy).
    pub fn steam(steam_lb_per_s: f64, conditions: &BoilerConditions) -> Self {
        let steam_lb_per_s = sl_core::finite_or(steam_lb_per_s, 0.0).max(0.0);
        Self {
            steam_lb_per_s,
            water_in_lb_per_s: 0.0,
            heat_btu_per_s: steam_lb_per_s * conditions.latent_heat_btu_per_lb(),
        }
    }

    /// Net mass change of the boiler (lb/s), positive when it gains water.
    pub fn net_mass_lb_per_s(&self) -> f64 {
        self.water_in_lb_per_s - self.steam_lb_per_s
    }
}

impl std::ops::Add for SteamDraw {
    type Output = SteamDraw;

    fn add(self, rhs: SteamDraw) -> SteamDraw {
        SteamDraw {
            steam_lb_per_s: self.steam_lb_per_s + rhs.steam_lb_per_s,
            water_in_lb_per_s: self.water_in_lb_per_s + rhs.water_in_lb_per_s,
            heat_btu_per_s: self.heat_btu_per_s + rhs.heat_btu_per_s,
        }
    }
}

/// Identifies a consumer in the usage breakdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsumerKind {
    Cylinders,
    Booster,
    SafetyValves,
    Injector,
    MotionPump,
    Blower,
    CylinderCocks,
    Compressor,
    Generator,
    LargeEjector,
    SmallEjector,
    Stoker,
    FusiblePlug,
}

/// Trait for anything that draws on (or feeds) the boiler.
///
/// Consumers are deterministic functions of the boiler conditions and their
/// own settings. Stateful consumers (safety valves) update their state in an
/// inherent method before `draw` is called.
pub trait SteamConsumer: Send + Sync {
    /// Consumer name for debugging and identification.
    fn name(&self) -> &str;

    fn kind(&self) -> ConsumerKind;

    /// Steam, water and heat exchanged this tick.
    fn draw(&self, conditions: &BoilerConditions) -> SteamDraw;
}
