//! Combustion and firing control.
//!
//! The burn rate follows the boiler's heat demand, corrected by four
//! multiplicative ratios rather than a feedback controller:
//!
//! ```text
//! burn = Q_out(prev) / (CV · η) · HeatRatio · PressureRatio
//!                               · BoilerHeatRatio · MaxBoilerHeatRatio
//! ```
//!
//! Feed keeps the fire mass near its ideal value (automatic) or follows the
//! fireman's setting (manual). Both rates pass through a first-order lag
//! whose time constant depends on the fuel.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use sl_controls::{DelayTimer, FirstOrderLag, HysteresisLatch, LagState};
use sl_core::Interpolator;
use sl_steam::SteamProperties;

/// Fuel bed depth of an ideal fire (ft).
const IDEAL_FIRE_DEPTH_FT: f64 = 7.0 / 12.0;
/// Bulk density of a fire bed (lb/ft³).
const FIRE_BED_DENSITY_LB_PER_FT3: f64 = 54.0;
/// Burn rate that keeps a banked fire alight (lb/ft²·h).
const IDLE_BURN_LB_PER_FT2_H: f64 = 2.0;

pub const DEFAULT_GRATE_LIMIT_LB_PER_FT2_H: f64 = 150.0;
pub const BOOST_FACTOR: f64 = 1.33;
pub const BOOST_TRIGGER_FRACTION: f64 = 0.95;
pub const DEFAULT_BOOST_DURATION_S: f64 = 60.0;
pub const DEFAULT_BOOST_COOLDOWN_S: f64 = 300.0;
pub const FIRE_EXHAUSTED_FRACTION: f64 = 0.05;
pub const FIRE_RECOVERED_FRACTION: f64 = 0.10;

/// Pressure fractions ending a forced fire-up / fire-down and re-arming it.
const FIRE_UP_END: f64 = 0.98;
const FIRE_UP_REARM: f64 = 0.90;
const FIRE_DOWN_END: f64 = 0.90;
const FIRE_DOWN_REARM: f64 = 0.98;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelType {
    #[default]
    Coal,
    Wood,
    Oil,
}

impl FuelType {
    /// Default calorific value (BTU/lb).
    pub fn calorific_value_btu_per_lb(self) -> f64 {
        match self {
            FuelType::Coal => 14_360.0,
            FuelType::Wood => 6_450.0,
            FuelType::Oil => 18_360.0,
        }
    }

    /// Feed/burn lag time constant (s).
    pub fn lag_tau_s(self) -> f64 {
        match self {
            FuelType::Coal => 30.0,
            FuelType::Wood => 20.0,
            FuelType::Oil => 3.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiringMode {
    Manual,
    #[default]
    Automatic,
}

/// Overrides that bypass the ratio computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiringCommand {
    ForceFireUp,
    ForceFireDown,
    Reset,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FiringConfig {
    pub fuel: FuelType,
    pub calorific_value_btu_per_lb: f64,
    pub grate_area_ft2: f64,
    pub grate_limit_lb_per_ft2_h: f64,
    /// Normal feed ceiling (lb/s)
    pub max_firing_rate_lb_per_s: f64,
    pub ideal_fire_mass_lb: f64,
    pub max_fire_mass_lb: f64,
    pub superheated: bool,
    pub boost_duration_s: f64,
    pub boost_cooldown_s: f64,
    /// Against boiler heat / normal heat
    pub heat_ratio: Interpolator,
    /// Against boiler pressure / max pressure
    pub pressure_ratio: Interpolator,
    /// Against boiler heat / safety-valve heat
    pub boiler_heat_ratio: Interpolator,
    /// Against boiler heat / safety-valve heat
    pub max_boiler_heat_ratio: Interpolator,
}

impl FiringConfig {
    pub fn new(fuel: FuelType, grate_area_ft2: f64) -> SimResult<Self> {
        if !(grate_area_ft2.is_finite() && grate_area_ft2 > 0.0) {
            return Err(SimError::InvalidArg {
                what: "grate area must be positive",
            });
        }
        let ideal = grate_area_ft2 * IDEAL_FIRE_DEPTH_FT * FIRE_BED_DENSITY_LB_PER_FT3;
        Ok(Self {
            fuel,
            calorific_value_btu_per_lb: fuel.calorific_value_btu_per_lb(),
            grate_area_ft2,
            grate_limit_lb_per_ft2_h: DEFAULT_GRATE_LIMIT_LB_PER_FT2_H,
            max_firing_rate_lb_per_s: grate_area_ft2 * DEFAULT_GRATE_LIMIT_LB_PER_FT2_H / 3600.0,
            ideal_fire_mass_lb: ideal,
            max_fire_mass_lb: 2.0 * ideal,
            superheated: false,
            boost_duration_s: DEFAULT_BOOST_DURATION_S,
            boost_cooldown_s: DEFAULT_BOOST_COOLDOWN_S,
            heat_ratio: Interpolator::new(&[0.0, 0.9, 1.0, 1.1], &[1.5, 1.2, 1.0, 0.8])?,
            pressure_ratio: Interpolator::new(&[0.0, 0.9, 1.0, 1.05], &[1.5, 1.1, 1.0, 0.7])?,
            boiler_heat_ratio: Interpolator::new(&[0.0, 0.95, 1.0, 1.1], &[1.0, 1.0, 0.6, 0.01])?,
            max_boiler_heat_ratio: Interpolator::new(
                &[0.0, 1.0, 1.05, 1.1],
                &[1.0, 1.0, 0.3, 0.01],
            )?,
        })
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.calorific_value_btu_per_lb > 0.0) {
            return Err(SimError::InvalidArg {
                what: "calorific value must be positive",
            });
        }
        if !(self.max_fire_mass_lb >= self.ideal_fire_mass_lb && self.ideal_fire_mass_lb > 0.0) {
            return Err(SimError::InvalidArg {
                what: "fire mass limits out of order",
            });
        }
        if !(self.max_firing_rate_lb_per_s > 0.0 && self.grate_limit_lb_per_ft2_h > 0.0) {
            return Err(SimError::InvalidArg {
                what: "firing rate and grate limit must be positive",
            });
        }
        Ok(())
    }

    fn idle_burn_lb_per_s(&self) -> f64 {
        self.grate_area_ft2 * IDLE_BURN_LB_PER_FT2_H / 3600.0
    }

    fn lag(&self) -> SimResult<FirstOrderLag> {
        Ok(FirstOrderLag::new(self.fuel.lag_tau_s())?)
    }
}

/// Boiler view and operator settings for one firing step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FiringInputs {
    pub mode: FiringMode,
    /// Manual firing setting [0, 1]
    pub operator_fraction: f64,
    pub command: Option<FiringCommand>,
    /// Heat that left the boiler last tick (BTU/s)
    pub previous_heat_out_btu_per_s: f64,
    pub boiler_heat_btu: f64,
    /// Heat at a normal working level (BTU)
    pub normal_heat_btu: f64,
    pub safety_heat_btu: f64,
    pub pressure_psig: f64,
    pub max_pressure_psig: f64,
    /// Available draught [0, 1]
    pub draught: f64,
    pub fuel_available: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FiringOutputs {
    pub feed_lb_per_s: f64,
    pub burn_lb_per_s: f64,
    pub burn_raw_lb_per_s: f64,
    pub heat_in_btu_per_s: f64,
    pub boiler_efficiency: f64,
    pub grate_rate_lb_per_ft2_h: f64,
    pub grate_limit_exceeded: bool,
    pub fire_exhausted: bool,
    pub boost_active: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiringState {
    pub fire_mass_lb: f64,
    pub feed: LagState,
    pub burn: LagState,
    pub efficiency: f64,
    /// Active override, if any
    pub active_command: Option<FiringCommand>,
    /// Set once a fire-up completes; clears when pressure falls back
    pub fire_up_done: HysteresisLatch,
    /// Set once a fire-down completes; clears when pressure rises back
    pub fire_down_done: HysteresisLatch,
    pub fire_exhausted: HysteresisLatch,
    pub low_fire: DelayTimer,
    pub boost: DelayTimer,
    pub cooldown: DelayTimer,
}

/// Firebox: configuration plus carried state.
#[derive(Clone, Debug)]
pub struct Firebox {
    pub config: FiringConfig,
    pub state: FiringState,
    lag: FirstOrderLag,
    outputs: FiringOutputs,
}

impl Firebox {
    pub fn new(config: FiringConfig) -> SimResult<Self> {
        config.validate()?;
        let lag = config.lag()?;
        let state = FiringState {
            fire_mass_lb: config.ideal_fire_mass_lb,
            feed: LagState::default(),
            burn: LagState::default(),
            efficiency: 0.7,
            active_command: None,
            fire_up_done: HysteresisLatch::rising(FIRE_UP_END, FIRE_UP_REARM),
            fire_down_done: HysteresisLatch::falling(FIRE_DOWN_END, FIRE_DOWN_REARM),
            fire_exhausted: HysteresisLatch::falling(
                FIRE_EXHAUSTED_FRACTION,
                FIRE_RECOVERED_FRACTION,
            ),
            low_fire: DelayTimer::new(config.fuel.lag_tau_s()),
            boost: DelayTimer::new(config.boost_duration_s),
            cooldown: DelayTimer::new(config.boost_cooldown_s),
        };
        Ok(Self {
            config,
            state,
            lag,
            outputs: FiringOutputs::default(),
        })
    }

    pub fn outputs(&self) -> &FiringOutputs {
        &self.outputs
    }

    pub fn fire_fraction(&self) -> f64 {
        self.state.fire_mass_lb / self.config.ideal_fire_mass_lb
    }

    /// Set the fire mass directly (scenario tooling and snapshots).
    pub fn set_fire_mass(&mut self, fire_mass_lb: f64) {
        self.state.fire_mass_lb =
            sl_core::clamp_finite(fire_mass_lb, 0.0, self.config.max_fire_mass_lb);
    }

    pub fn restore(&mut self, state: FiringState) {
        self.state = state;
        self.outputs = FiringOutputs::default();
    }

    fn boost_active(&self) -> bool {
        self.state.boost.running && !self.state.boost.is_done()
    }

    /// Run the boost cycle: trigger, bounded run, mandatory cooldown.
    fn update_boost(&mut self, dt: f64) {
        let s = &mut self.state;
        if s.cooldown.running {
            if s.cooldown.update(dt) {
                s.cooldown.reset();
            }
            return;
        }
        if s.boost.running {
            if s.boost.update(dt) {
                s.boost.reset();
                s.cooldown.start();
                tracing::debug!("firing boost ended, cooling down");
            }
            return;
        }
        let low = s.fire_mass_lb < BOOST_TRIGGER_FRACTION * self.config.ideal_fire_mass_lb;
        if low {
            s.low_fire.start();
            if s.low_fire.update(dt) {
                s.low_fire.reset();
                s.boost.start();
                tracing::debug!("firing boost started");
            }
        } else {
            s.low_fire.reset();
        }
    }

    fn apply_command(&mut self, inputs: &FiringInputs) {
        let p_frac = if inputs.max_pressure_psig > 0.0 {
            inputs.pressure_psig / inputs.max_pressure_psig
        } else {
            0.0
        };
        let up_done = self.state.fire_up_done.update(p_frac);
        let down_done = self.state.fire_down_done.update(p_frac);

        match inputs.command {
            Some(FiringCommand::Reset) => {
                self.state.fire_mass_lb = self.config.ideal_fire_mass_lb;
                self.state.active_command = None;
                self.state.fire_exhausted.set_active(false);
                self.state.boost.reset();
                self.state.cooldown.reset();
                self.state.low_fire.reset();
                tracing::info!("firing reset to ideal fire mass");
            }
            Some(cmd @ FiringCommand::ForceFireUp) if !up_done => {
                self.state.active_command = Some(cmd);
            }
            Some(cmd @ FiringCommand::ForceFireDown) if !down_done => {
                self.state.active_command = Some(cmd);
            }
            _ => {}
        }

        match self.state.active_command {
            Some(FiringCommand::ForceFireUp) if up_done => self.state.active_command = None,
            Some(FiringCommand::ForceFireDown) if down_done => self.state.active_command = None,
            _ => {}
        }
    }

    /// Advance the fire by `dt` and return the heat delivered to the boiler.
    pub fn update(&mut self, props: &SteamProperties, inputs: &FiringInputs, dt: f64) -> &FiringOutputs {
        if !(dt > 0.0) {
            return &self.outputs;
        }
        self.apply_command(inputs);
        self.update_boost(dt);

        let cfg = &self.config;
        let draught = sl_core::clamp_unit(inputs.draught);
        let ceiling = cfg.max_firing_rate_lb_per_s * if self.boost_active() { BOOST_FACTOR } else { 1.0 };
        let cv = cfg.calorific_value_btu_per_lb;
        let efficiency = self.state.efficiency.max(0.05);

        let burn_raw = match self.state.active_command {
            Some(FiringCommand::ForceFireUp) => ceiling,
            Some(FiringCommand::ForceFireDown) => cfg.idle_burn_lb_per_s(),
            _ => {
                let heat = inputs.boiler_heat_btu;
                let ratio = |curve: &Interpolator, x: f64, scale: f64| {
                    if scale > 0.0 {
                        curve.eval_clamped(x / scale).max(0.0)
                    } else {
                        1.0
                    }
                };
                let product = ratio(&cfg.heat_ratio, heat, inputs.normal_heat_btu)
                    * ratio(&cfg.pressure_ratio, inputs.pressure_psig, inputs.max_pressure_psig)
                    * ratio(&cfg.boiler_heat_ratio, heat, inputs.safety_heat_btu)
                    * ratio(&cfg.max_boiler_heat_ratio, heat, inputs.safety_heat_btu);
                let demand = inputs.previous_heat_out_btu_per_s.max(0.0) / (cv * efficiency);
                (demand * product).max(cfg.idle_burn_lb_per_s())
            }
        };
        let burn_raw = sl_core::finite_or(burn_raw, 0.0) * (0.5 + 0.5 * draught);

        let feed_target = if !inputs.fuel_available {
            0.0
        } else {
            match (self.state.active_command, inputs.mode) {
                (Some(FiringCommand::ForceFireUp), _) => ceiling,
                (Some(FiringCommand::ForceFireDown), _) => 0.0,
                (_, FiringMode::Manual) => {
                    cfg.max_firing_rate_lb_per_s * sl_core::clamp_unit(inputs.operator_fraction)
                }
                (_, FiringMode::Automatic) => {
                    let topup = (cfg.ideal_fire_mass_lb - self.state.fire_mass_lb) / cfg.fuel.lag_tau_s();
                    (burn_raw + topup).clamp(0.0, ceiling)
                }
            }
        };

        self.state.feed = self.lag.step(self.state.feed, dt, feed_target);
        if !inputs.fuel_available {
            self.state.feed.value = 0.0;
        }
        let exhausted = self.state.fire_exhausted.update(self.fire_fraction());
        let burn_target = if exhausted { 0.0 } else { burn_raw };
        self.state.burn = self.lag.step(self.state.burn, dt, burn_target);
        if exhausted {
            self.state.burn.value = 0.0;
        }

        let feed = self.state.feed.value.max(0.0);
        let available = self.state.fire_mass_lb / dt + feed;
        let burn = self.state.burn.value.clamp(0.0, available.max(0.0));
        self.state.fire_mass_lb =
            (self.state.fire_mass_lb + dt * (feed - burn)).clamp(0.0, self.config.max_fire_mass_lb);

        let grate_rate = burn * 3600.0 / self.config.grate_area_ft2;
        let limit = self.config.grate_limit_lb_per_ft2_h;
        let exceeded = grate_rate > limit;
        let mut eff = props.boiler_efficiency(grate_rate, self.config.superheated);
        if exceeded {
            eff *= limit / grate_rate;
        }
        self.state.efficiency = eff;

        self.outputs = FiringOutputs {
            feed_lb_per_s: feed,
            burn_lb_per_s: burn,
            burn_raw_lb_per_s: if exhausted { 0.0 } else { burn_raw },
            heat_in_btu_per_s: burn * self.config.calorific_value_btu_per_lb * eff,
            boiler_efficiency: eff,
            grate_rate_lb_per_ft2_h: grate_rate,
            grate_limit_exceeded: exceeded,
            fire_exhausted: exhausted,
            boost_active: self.boost_active(),
        };
        &self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> FiringInputs {
        FiringInputs {
            mode: FiringMode::Automatic,
            previous_heat_out_btu_per_s: 5_000.0,
            boiler_heat_btu: 1.0e6,
            normal_heat_btu: 1.0e6,
            safety_heat_btu: 1.1e6,
            pressure_psig: 190.0,
            max_pressure_psig: 200.0,
            draught: 1.0,
            fuel_available: true,
            ..Default::default()
        }
    }

    #[test]
    fn ideal_fire_mass_from_grate() {
        let cfg = FiringConfig::new(FuelType::Coal, 40.0).unwrap();
        assert!((cfg.ideal_fire_mass_lb - 40.0 * 7.0 / 12.0 * 54.0).abs() < 1e-9);
        assert_eq!(cfg.max_fire_mass_lb, 2.0 * cfg.ideal_fire_mass_lb);
    }

    #[test]
    fn oil_responds_faster_than_coal() {
        let props = SteamProperties::new().unwrap();
        let mut coal = Firebox::new(FiringConfig::new(FuelType::Coal, 40.0).unwrap()).unwrap();
        let mut oil = Firebox::new(FiringConfig::new(FuelType::Oil, 40.0).unwrap()).unwrap();
        let c = coal.update(&props, &inputs(), 1.0).burn_lb_per_s;
        let o = oil.update(&props, &inputs(), 1.0).burn_lb_per_s;
        assert!(o > c);
    }

    #[test]
    fn manual_feed_follows_setting() {
        let props = SteamProperties::new().unwrap();
        let mut fb = Firebox::new(FiringConfig::new(FuelType::Oil, 40.0).unwrap()).unwrap();
        let mut i = inputs();
        i.mode = FiringMode::Manual;
        i.operator_fraction = 0.5;
        for _ in 0..100 {
            fb.update(&props, &i, 1.0);
        }
        let target = 0.5 * fb.config.max_firing_rate_lb_per_s;
        assert!((fb.outputs().feed_lb_per_s - target).abs() < 1e-6);
    }

    #[test]
    fn fire_up_ends_at_pressure_and_rearms() {
        let props = SteamProperties::new().unwrap();
        let mut fb = Firebox::new(FiringConfig::new(FuelType::Coal, 40.0).unwrap()).unwrap();
        let mut i = inputs();
        i.pressure_psig = 150.0;
        i.command = Some(FiringCommand::ForceFireUp);
        fb.update(&props, &i, 1.0);
        assert_eq!(fb.state.active_command, Some(FiringCommand::ForceFireUp));

        i.command = None;
        i.pressure_psig = 199.0;
        fb.update(&props, &i, 1.0);
        assert_eq!(fb.state.active_command, None);

        // Not re-armed until pressure falls back below the re-arm level.
        i.command = Some(FiringCommand::ForceFireUp);
        i.pressure_psig = 185.0;
        fb.update(&props, &i, 1.0);
        assert_eq!(fb.state.active_command, None);
        i.pressure_psig = 170.0;
        fb.update(&props, &i, 1.0);
        assert_eq!(fb.state.active_command, Some(FiringCommand::ForceFireUp));
    }

    #[test]
    fn boost_then_cooldown() {
        let props = SteamProperties::new().unwrap();
        let mut cfg = FiringConfig::new(FuelType::Oil, 40.0).unwrap();
        cfg.boost_duration_s = 10.0;
        cfg.boost_cooldown_s = 20.0;
        let mut fb = Firebox::new(cfg).unwrap();
        let mut i = inputs();
        i.fuel_available = false;
        fb.set_fire_mass(0.5 * fb.config.ideal_fire_mass_lb);
        let mut saw_boost = false;
        for _ in 0..5 {
            saw_boost |= fb.update(&props, &i, 1.0).boost_active;
        }
        assert!(saw_boost);
        for _ in 0..12 {
            fb.update(&props, &i, 1.0);
        }
        assert!(!fb.outputs().boost_active);
        assert!(fb.state.cooldown.running);
    }
}
