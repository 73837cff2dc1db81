//! Periodic structured tracing of the locomotive state.

use crate::outputs::TickOutputs;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INTERVAL_S: f64 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verbosity {
    #[default]
    Off,
    /// Boiler, firing and total force at `info`
    Summary,
    /// Summary plus per-engine and per-consumer detail at `debug`
    Detailed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub verbosity: Verbosity,
    pub interval_s: f64,
    pub elapsed_s: f64,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(Verbosity::Off, DEFAULT_INTERVAL_S)
    }
}

impl Telemetry {
    pub fn new(verbosity: Verbosity, interval_s: f64) -> Self {
        Self {
            verbosity,
            interval_s: if interval_s > 0.0 {
                interval_s
            } else {
                DEFAULT_INTERVAL_S
            },
            elapsed_s: 0.0,
        }
    }

    /// Accumulate `dt` and emit events once per interval.
    ///
    /// Returns whether anything was emitted.
    pub fn record(&mut self, dt: f64, out: &TickOutputs) -> bool {
        if self.verbosity == Verbosity::Off || !(dt > 0.0) {
            return false;
        }
        self.elapsed_s += dt;
        if self.elapsed_s < self.interval_s {
            return false;
        }
        self.elapsed_s = 0.0;

        tracing::info!(
            pressure_psig = out.boiler_pressure_psig,
            water_fraction = out.water_fraction,
            fire_mass_lb = out.fire_mass_lb,
            burn_lb_per_s = out.firing.burn_lb_per_s,
            steam_lb_per_s = out.steam.total_steam,
            force_lbf = out.tractive_force_lbf,
            ihp = out.indicated_hp(),
            "locomotive"
        );
        if out.warnings.any() {
            tracing::info!(warnings = ?out.warnings, "locomotive warnings");
        }

        if self.verbosity == Verbosity::Detailed {
            for e in &out.engines {
                tracing::debug!(
                    engine = %e.name,
                    mep_psi = e.mep_psi,
                    lp_mep_psi = ?e.lp_mep_psi,
                    ihp = e.indicated_hp,
                    crank_rpm = e.crank_rpm,
                    piston_speed = e.piston_speed_ft_per_min,
                    force_lbf = e.tractive_force_lbf,
                    axle_delta_lbf = e.axle_weight_delta_lbf,
                    limit = ?e.power_limit,
                    booster = ?e.booster_state,
                    "engine"
                );
            }
            tracing::debug!(
                heat_in = out.flows.heat_in_btu_per_s,
                heat_out = out.flows.heat_out_btu_per_s,
                radiation = out.flows.radiation_btu_per_s,
                efficiency = out.firing.boiler_efficiency,
                grate_rate = out.firing.grate_rate_lb_per_ft2_h,
                "boiler heat"
            );
            tracing::debug!(usage = ?out.steam, "steam usage");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_once_per_interval() {
        let mut t = Telemetry::new(Verbosity::Summary, 1.0);
        let out = TickOutputs::default();
        assert!(!t.record(0.4, &out));
        assert!(!t.record(0.4, &out));
        assert!(t.record(0.4, &out));
        assert!(!t.record(0.4, &out));
    }

    #[test]
    fn off_never_emits() {
        let mut t = Telemetry::new(Verbosity::Off, 0.1);
        assert!(!t.record(1.0, &TickOutputs::default()));
        assert_eq!(t.elapsed_s, 0.0);
    }
}
