//! Boiler heat and mass balance.
//!
//! The boiler is a single control volume holding saturated water and steam.
//! Heat and mass are integrated explicitly; pressure follows the water
//! temperature along the saturation curve:
//!
//! ```text
//! dH/dt = Q_fire − Q_consumers − Q_radiation
//! dM/dt = ṁ_feed − ṁ_steam
//! dT/dt = (Q_fire − Q_consumers − Q_radiation) / (cp(T) · M_water)
//! P     = P_sat(T)
//! ```

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use sl_controls::HysteresisLatch;
use sl_core::imperial::{BTU_TO_KJ, LB_TO_KG, k_to_f};
use sl_steam::SteamProperties;

/// Pressure the integrator may overshoot the maximum by (psi).
pub const PRESSURE_HEADROOM_PSI: f64 = 7.0;
/// Heat ceiling as a multiple of the safety-valve heat.
pub const HEAT_CEILING: f64 = 1.05;
pub const MAX_WATER_FRACTION: f64 = 1.01;

const HOT_START_FRACTION: f64 = 0.97;
const COLD_START_FRACTION: f64 = 0.66;
const START_WATER_FRACTION: f64 = 0.8;

/// Conductance of lagged boiler shell (BTU/h·ft²·°F).
const INSULATED_CONDUCTANCE: f64 = 0.3;
/// Conductance of bare boiler shell (BTU/h·ft²·°F).
const BARE_CONDUCTANCE: f64 = 2.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartMode {
    #[default]
    Hot,
    Cold,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoilerConfig {
    pub volume_ft3: f64,
    pub max_pressure_psig: f64,
    /// Outer shell area exposed to the air (ft²)
    pub shell_area_ft2: f64,
    /// Share of the shell under lagging [0, 1]
    pub insulated_fraction: f64,
    /// Below this water fraction the fusible plug melts
    pub min_water_fraction: f64,
    /// Above this water fraction the boiler primes
    pub priming_water_fraction: f64,
    /// Priming clears once the water fraction falls below this
    pub priming_clear_fraction: f64,
}

impl BoilerConfig {
    pub fn new(volume_ft3: f64, max_pressure_psig: f64) -> SimResult<Self> {
        let cfg = Self {
            volume_ft3,
            max_pressure_psig,
            shell_area_ft2: 6.0 * volume_ft3.max(0.0).powf(2.0 / 3.0),
            insulated_fraction: 0.9,
            min_water_fraction: 0.70,
            priming_water_fraction: 0.91,
            priming_clear_fraction: 0.90,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.volume_ft3.is_finite() && self.volume_ft3 > 0.0) {
            return Err(SimError::InvalidArg {
                what: "boiler volume must be positive",
            });
        }
        if !(self.max_pressure_psig.is_finite() && self.max_pressure_psig > 0.0) {
            return Err(SimError::InvalidArg {
                what: "max boiler pressure must be positive",
            });
        }
        if !(0.0..=1.0).contains(&self.insulated_fraction) {
            return Err(SimError::InvalidArg {
                what: "insulated fraction must be in [0, 1]",
            });
        }
        if self.priming_clear_fraction > self.priming_water_fraction
            || self.min_water_fraction >= self.priming_clear_fraction
        {
            return Err(SimError::InvalidArg {
                what: "water level thresholds out of order",
            });
        }
        Ok(())
    }
}

/// Heat and mass exchanged with the boiler over one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoilerFlows {
    pub heat_in_btu_per_s: f64,
    pub heat_out_btu_per_s: f64,
    pub radiation_btu_per_s: f64,
    pub steam_out_lb_per_s: f64,
    pub water_in_lb_per_s: f64,
}

impl BoilerFlows {
    pub fn net_heat_btu_per_s(&self) -> f64 {
        self.heat_in_btu_per_s - self.heat_out_btu_per_s - self.radiation_btu_per_s
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoilerState {
    pub heat_btu: f64,
    pub mass_lb: f64,
    pub pressure_psig: f64,
    pub water_fraction: f64,
    pub water_temp_k: f64,
    pub fusible_plug: HysteresisLatch,
    pub priming: HysteresisLatch,
}

/// Heat held by a boiler of `volume_ft3` at `psig` with `water_fraction`.
pub fn boiler_heat_btu(
    props: &SteamProperties,
    volume_ft3: f64,
    psig: f64,
    water_fraction: f64,
) -> f64 {
    let rho_w = props.water_density_lb_per_ft3(psig);
    let rho_s = props.steam_density_lb_per_ft3(psig);
    let h_w = props.water_enthalpy_btu_per_lb(psig);
    let h_s = props.steam_enthalpy_btu_per_lb(psig);
    volume_ft3 * (water_fraction * rho_w * h_w + (1.0 - water_fraction) * rho_s * h_s)
}

/// Mass held by a boiler of `volume_ft3` at `psig` with `water_fraction`.
pub fn boiler_mass_lb(
    props: &SteamProperties,
    volume_ft3: f64,
    psig: f64,
    water_fraction: f64,
) -> f64 {
    let rho_w = props.water_density_lb_per_ft3(psig);
    let rho_s = props.steam_density_lb_per_ft3(psig);
    volume_ft3 * (water_fraction * rho_w + (1.0 - water_fraction) * rho_s)
}

/// Heat held at the safety-valve pressure with a normal water level.
pub fn safety_valve_heat_btu(props: &SteamProperties, config: &BoilerConfig) -> f64 {
    boiler_heat_btu(
        props,
        config.volume_ft3,
        config.max_pressure_psig,
        START_WATER_FRACTION,
    )
}

/// Heat held at normal working pressure (the hot-start level).
pub fn normal_heat_btu(props: &SteamProperties, config: &BoilerConfig) -> f64 {
    boiler_heat_btu(
        props,
        config.volume_ft3,
        config.max_pressure_psig * HOT_START_FRACTION,
        START_WATER_FRACTION,
    )
}

/// Speed-dependent multiplier on shell heat loss.
///
/// Rises steeply while the train gets moving, more slowly up to 20 m/s, and
/// is flat beyond.
pub fn convective_factor(speed_mps: f64) -> f64 {
    let v = speed_mps.abs();
    if !v.is_finite() {
        return 1.0;
    }
    if v <= 5.0 {
        1.0 + 0.12 * v
    } else if v <= 20.0 {
        1.6 + 0.04 * (v - 5.0)
    } else {
        2.2
    }
}

impl BoilerState {
    /// Fill a boiler for a hot (in steam) or cold start.
    pub fn initialize(props: &SteamProperties, config: &BoilerConfig, mode: StartMode) -> Self {
        let fraction = match mode {
            StartMode::Hot => HOT_START_FRACTION,
            StartMode::Cold => COLD_START_FRACTION,
        };
        let psig = config.max_pressure_psig * fraction;
        Self {
            heat_btu: boiler_heat_btu(props, config.volume_ft3, psig, START_WATER_FRACTION),
            mass_lb: boiler_mass_lb(props, config.volume_ft3, psig, START_WATER_FRACTION),
            pressure_psig: psig,
            water_fraction: START_WATER_FRACTION,
            water_temp_k: props.saturation_temp_k(psig),
            fusible_plug: HysteresisLatch::permanent_below(config.min_water_fraction),
            priming: HysteresisLatch::rising(
                config.priming_water_fraction,
                config.priming_clear_fraction,
            ),
        }
    }

    pub fn fusible_plug_blown(&self) -> bool {
        self.fusible_plug.is_active()
    }

    pub fn priming(&self) -> bool {
        self.priming.is_active()
    }

    /// Water mass in the boiler (lb).
    pub fn water_mass_lb(&self, props: &SteamProperties, config: &BoilerConfig) -> f64 {
        self.water_fraction * config.volume_ft3 * props.water_density_lb_per_ft3(self.pressure_psig)
    }

    /// Heat lost through the shell (BTU/s).
    pub fn radiation_loss_btu_per_s(
        &self,
        config: &BoilerConfig,
        speed_mps: f64,
        outside_temp_f: f64,
    ) -> f64 {
        let delta_f = (k_to_f(self.water_temp_k) - outside_temp_f).max(0.0);
        let conductance = config.shell_area_ft2
            * (config.insulated_fraction * INSULATED_CONDUCTANCE
                + (1.0 - config.insulated_fraction) * BARE_CONDUCTANCE);
        let loss = conductance * delta_f * convective_factor(speed_mps) / 3600.0;
        sl_core::finite_or(loss, 0.0).max(0.0)
    }

    /// Advance heat, mass, temperature and pressure by `dt`.
    ///
    /// Returns `true` if either degraded-state latch changed.
    pub fn integrate(
        &mut self,
        props: &SteamProperties,
        config: &BoilerConfig,
        dt: f64,
        flows: &BoilerFlows,
    ) -> bool {
        if !(dt > 0.0) {
            return false;
        }
        let net_heat = sl_core::finite_or(flows.net_heat_btu_per_s(), 0.0);
        let safety_heat = safety_valve_heat_btu(props, config);
        let heat_before = self.heat_btu;
        self.heat_btu = (self.heat_btu + dt * net_heat).clamp(0.0, HEAT_CEILING * safety_heat);
        // Temperature follows only the heat the clamp let through.
        let applied_btu = self.heat_btu - heat_before;

        let net_mass = sl_core::finite_or(flows.water_in_lb_per_s, 0.0)
            - sl_core::finite_or(flows.steam_out_lb_per_s, 0.0);
        self.mass_lb = (self.mass_lb + dt * net_mass).max(0.0);
        self.water_fraction = self.fraction_from_mass(props, config);

        let water_kg = self.water_mass_lb(props, config) * LB_TO_KG;
        let cp = props.water_specific_heat_kj_per_kg_k(self.water_temp_k);
        if water_kg > 0.0 && cp > 0.0 {
            let d_temp = applied_btu * BTU_TO_KJ / (cp * water_kg);
            self.water_temp_k = sl_core::finite_or(self.water_temp_k + d_temp, self.water_temp_k);
        }
        let ceiling_psig = config.max_pressure_psig + PRESSURE_HEADROOM_PSI;
        self.water_temp_k = self.water_temp_k.clamp(
            props.saturation_temp_k(0.0),
            props.saturation_temp_k(ceiling_psig),
        );
        self.pressure_psig = props
            .saturation_pressure_psig(self.water_temp_k)
            .clamp(0.0, ceiling_psig);

        let plug_before = self.fusible_plug.is_active();
        let priming_before = self.priming.is_active();
        let plug = self.fusible_plug.update(self.water_fraction);
        let priming = self.priming.update(self.water_fraction);
        if plug && !plug_before {
            tracing::warn!(water_fraction = self.water_fraction, "fusible plug blown");
        }
        if priming != priming_before {
            tracing::warn!(water_fraction = self.water_fraction, priming, "boiler priming changed");
        }
        plug != plug_before || priming != priming_before
    }

    fn fraction_from_mass(&self, props: &SteamProperties, config: &BoilerConfig) -> f64 {
        let rho_w = props.water_density_lb_per_ft3(self.pressure_psig);
        let rho_s = props.steam_density_lb_per_ft3(self.pressure_psig);
        let span = rho_w - rho_s;
        if span <= 0.0 {
            return self.water_fraction;
        }
        let f = (self.mass_lb / config.volume_ft3 - rho_s) / span;
        sl_core::clamp_finite(f, 0.0, MAX_WATER_FRACTION)
    }

    /// Set the water level directly, re-deriving a consistent mass and heat.
    pub fn force_water_fraction(
        &mut self,
        props: &SteamProperties,
        config: &BoilerConfig,
        fraction: f64,
    ) {
        let f = sl_core::clamp_finite(fraction, 0.0, MAX_WATER_FRACTION);
        self.water_fraction = f;
        self.mass_lb = boiler_mass_lb(props, config.volume_ft3, self.pressure_psig, f);
        self.heat_btu = boiler_heat_btu(props, config.volume_ft3, self.pressure_psig, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SteamProperties, BoilerConfig) {
        (
            SteamProperties::new().unwrap(),
            BoilerConfig::new(300.0, 200.0).unwrap(),
        )
    }

    #[test]
    fn hot_start_exceeds_cold_start() {
        let (props, cfg) = setup();
        let hot = BoilerState::initialize(&props, &cfg, StartMode::Hot);
        let cold = BoilerState::initialize(&props, &cfg, StartMode::Cold);
        assert!((hot.pressure_psig - 194.0).abs() < 1e-9);
        assert!((cold.pressure_psig - 132.0).abs() < 1e-9);
        assert!(hot.heat_btu > cold.heat_btu);
        assert!(hot.water_temp_k > cold.water_temp_k);
    }

    #[test]
    fn heating_raises_pressure() {
        let (props, cfg) = setup();
        let mut b = BoilerState::initialize(&props, &cfg, StartMode::Cold);
        let p0 = b.pressure_psig;
        let flows = BoilerFlows {
            heat_in_btu_per_s: 5_000.0,
            ..Default::default()
        };
        for _ in 0..100 {
            b.integrate(&props, &cfg, 1.0, &flows);
        }
        assert!(b.pressure_psig > p0);
        assert!(b.pressure_psig <= cfg.max_pressure_psig + PRESSURE_HEADROOM_PSI);
    }

    #[test]
    fn temperature_tracks_clamped_heat() {
        let (props, cfg) = setup();
        let mut b = BoilerState::initialize(&props, &cfg, StartMode::Hot);
        let ceiling_psig = cfg.max_pressure_psig + PRESSURE_HEADROOM_PSI;
        let t_max = props.saturation_temp_k(ceiling_psig);
        let heating = BoilerFlows {
            heat_in_btu_per_s: 20_000.0,
            ..Default::default()
        };
        for _ in 0..600 {
            b.integrate(&props, &cfg, 1.0, &heating);
            assert!(b.water_temp_k <= t_max + 1e-9);
        }
        let ceiling_heat = HEAT_CEILING * safety_valve_heat_btu(&props, &cfg);
        assert!((b.heat_btu - ceiling_heat).abs() < 1e-6);
        let pinned_psig = b.pressure_psig;

        // Heat leaves at once: pressure must fall with it, not stay pinned.
        let cooling = BoilerFlows {
            heat_out_btu_per_s: 20_000.0,
            ..Default::default()
        };
        for _ in 0..10 {
            b.integrate(&props, &cfg, 1.0, &cooling);
        }
        assert!(b.pressure_psig < pinned_psig - 1.0);

        for _ in 0..300 {
            b.integrate(&props, &cfg, 1.0, &cooling);
        }
        assert_eq!(b.heat_btu, 0.0);
        assert!(b.pressure_psig < 0.5 * cfg.max_pressure_psig);
        assert!(b.water_temp_k >= props.saturation_temp_k(0.0) - 1e-9);
    }

    #[test]
    fn priming_has_hysteresis() {
        let (props, cfg) = setup();
        let mut b = BoilerState::initialize(&props, &cfg, StartMode::Hot);
        b.force_water_fraction(&props, &cfg, 0.92);
        b.integrate(&props, &cfg, 0.1, &BoilerFlows::default());
        assert!(b.priming());
        b.force_water_fraction(&props, &cfg, 0.905);
        b.integrate(&props, &cfg, 0.1, &BoilerFlows::default());
        assert!(b.priming());
        b.force_water_fraction(&props, &cfg, 0.85);
        b.integrate(&props, &cfg, 0.1, &BoilerFlows::default());
        assert!(!b.priming());
    }

    #[test]
    fn convective_factor_segments() {
        assert_eq!(convective_factor(0.0), 1.0);
        assert!((convective_factor(5.0) - 1.6).abs() < 1e-12);
        assert!((convective_factor(20.0) - 2.2).abs() < 1e-12);
        assert_eq!(convective_factor(40.0), 2.2);
        assert_eq!(convective_factor(-10.0), convective_factor(10.0));
    }

    #[test]
    fn radiation_grows_with_speed() {
        let (props, cfg) = setup();
        let b = BoilerState::initialize(&props, &cfg, StartMode::Hot);
        let still = b.radiation_loss_btu_per_s(&cfg, 0.0, 50.0);
        let moving = b.radiation_loss_btu_per_s(&cfg, 25.0, 50.0);
        assert!(still > 0.0);
        assert!((moving / still - 2.2).abs() < 1e-9);
    }
}
