//! Feedwater: live steam injectors and the motion-driven pump.

use crate::common::check_non_negative;
use crate::error::ComponentResult;
use crate::traits::{BoilerConditions, ConsumerKind, SteamConsumer, SteamDraw};

/// Below this boiler pressure an injector will not pick up (psig).
pub const INJECTOR_MIN_PRESSURE_PSIG: f64 = 25.0;

/// Live steam injector.
///
/// Steam drawn from the boiler condenses into the feedwater and returns with
/// it, so the net mass gain is the delivered water and the net heat cost is
/// raising that water from tender temperature to boiler water enthalpy:
///
/// ```text
/// steam  = water / ratio(P)
/// heat   = steam·(hs − hw) + (water + steam)·(hw − h_mix)
///        = water·(hw − h_feed)
/// ```
#[derive(Clone, Debug)]
pub struct Injector {
    name: String,
    /// Water delivery at full setting (lb/s)
    pub max_water_lb_per_s: f64,
    /// Operator setting [0, 1]
    pub setting: f64,
}

impl Injector {
    pub fn new(name: impl Into<String>, max_water_lb_per_s: f64) -> ComponentResult<Self> {
        Ok(Self {
            name: name.into(),
            max_water_lb_per_s: check_non_negative(max_water_lb_per_s, "injector capacity")?,
            setting: 0.0,
        })
    }

    /// Water delivered at the current setting, zero below pick-up pressure.
    pub fn water_lb_per_s(&self, conditions: &BoilerConditions) -> f64 {
        if conditions.pressure_psig < INJECTOR_MIN_PRESSURE_PSIG {
            return 0.0;
        }
        self.max_water_lb_per_s * sl_core::clamp_unit(self.setting)
    }
}

impl SteamConsumer for Injector {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ConsumerKind {
        ConsumerKind::Injector
    }

    fn draw(&self, conditions: &BoilerConditions) -> SteamDraw {
        let water = self.water_lb_per_s(conditions);
        if water <= 0.0 {
            return SteamDraw::ZERO;
        }
        let steam = water / conditions.injector_water_per_steam.max(1.0);
        SteamDraw {
            steam_lb_per_s: steam,
            water_in_lb_per_s: water + steam,
            heat_btu_per_s: water * conditions.feed_heating_btu_per_lb(),
        }
    }
}

/// Feed pump driven from the motion; delivery follows road speed.
#[derive(Clone, Debug)]
pub struct MotionPump {
    /// Water delivery at or above `full_speed_mps` (lb/s)
    pub max_water_lb_per_s: f64,
    /// Speed at which the pump reaches full delivery (m/s)
    pub full_speed_mps: f64,
    /// Operator setting [0, 1]
    pub setting: f64,
    /// Current road speed (m/s)
    pub speed_mps: f64,
}

impl MotionPump {
    pub fn new(max_water_lb_per_s: f64, full_speed_mps: f64) -> ComponentResult<Self> {
        Ok(Self {
            max_water_lb_per_s: check_non_negative(max_water_lb_per_s, "pump capacity")?,
            full_speed_mps: check_non_negative(full_speed_mps, "pump full speed")?,
            setting: 0.0,
            speed_mps: 0.0,
        })
    }
}

impl SteamConsumer for MotionPump {
    fn name(&self) -> &str {
        "motion pump"
    }

    fn kind(&self) -> ConsumerKind {
        ConsumerKind::MotionPump
    }

    fn draw(&self, conditions: &BoilerConditions) -> SteamDraw {
        let speed_fraction = if self.full_speed_mps > 0.0 {
            sl_core::clamp_unit(self.speed_mps.abs() / self.full_speed_mps)
        } else {
            1.0
        };
        let water = self.max_water_lb_per_s * sl_core::clamp_unit(self.setting) * speed_fraction;
        if water <= 0.0 {
            return SteamDraw::ZERO;
        }
        SteamDraw {
            steam_lb_per_s: 0.0,
            water_in_lb_per_s: water,
            heat_btu_per_s: water * conditions.feed_heating_btu_per_lb(),
        }
    }
}
