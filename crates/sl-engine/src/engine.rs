//! One steam engine: indicator diagram, steam usage, power and rim force.

use crate::booster::{BoosterCommand, BoosterController, BoosterState};
use crate::error::EngineResult;
use crate::geometry::{CylinderGeometry, EngineParams, EngineRatings, EngineTopology, mps_to_mph};
use crate::indicator::{CycleConditions, IndicatorDiagram, compute_indicator_diagram};
use crate::tractive::{
    CrankInputs, CylinderDrive, HAMMER_EXCESSIVE_FRACTION, HAMMER_WARNING_FRACTION,
    TractiveForceModel, TractiveForceState, simplified_force_lbf,
};
use crate::usage::{CylinderSteamUsage, cylinder_steam_usage};
use serde::{Deserialize, Serialize};
use sl_core::imperial::ONE_ATMOSPHERE_PSI;
use sl_core::units::{Force, Power};
use sl_steam::SteamProperties;

/// Reverser positions closer to mid gear than this admit no steam.
pub const MID_GEAR_CUTOFF: f64 = 0.01;
/// Booster steam drawn while idling or running disengaged (lb/h).
pub const BOOSTER_IDLE_STEAM_LB_PER_H: f64 = 300.0;

/// What an engine drives and how it is controlled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineRole {
    /// Adhesion engine on the driving wheels, worked by throttle and reverser
    #[default]
    #[serde(alias = "Adhesion")]
    Main,
    /// Cog engine on a rack pinion, worked like a main engine
    Rack,
    /// Auxiliary engine under its own state machine and fixed cutoff
    Booster,
}

impl EngineRole {
    /// Main and rack engines follow the driver's throttle and reverser.
    pub fn follows_reverser(self) -> bool {
        self != EngineRole::Booster
    }
}

/// Why the rim force was capped this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerLimit {
    BoilerLimited,
    CriticalSpeedLimited,
}

/// Per-tick inputs shared by every engine on the locomotive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineInputs {
    pub dt: f64,
    /// Regulator opening [0, 1]
    pub throttle: f64,
    /// Signed reverser cutoff; negative is reverse gear
    pub cutoff: f64,
    pub boiler_psig: f64,
    /// Signed road speed (m/s)
    pub speed_mps: f64,
    pub cocks_open: bool,
    pub compound_bypass: bool,
    pub gear: usize,
    /// Boiler-condition force multiplier (priming, fusible plug)
    pub force_derate: f64,
    pub booster: BoosterCommand,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EngineOutputs {
    pub diagram: Option<IndicatorDiagram>,
    pub usage: CylinderSteamUsage,
    /// Cylinder usage plus any booster idle steam (lb/s)
    pub steam_usage_lb_per_s: f64,
    pub mep_psi: f64,
    pub lp_mep_psi: Option<f64>,
    pub indicated_hp: f64,
    pub crank_rpm: f64,
    pub piston_speed_ft_per_min: f64,
    /// Signed rim force fed to the slip solver (lbf)
    pub tractive_force_lbf: f64,
    /// Moving-average rim force (lbf)
    pub display_force_lbf: f64,
    pub axle_weight_delta_lbf: f64,
    pub hammer_blow_lbf: f64,
    pub hammer_warning: bool,
    pub hammer_excessive: bool,
    pub power_limit: Option<PowerLimit>,
    pub booster_state: Option<BoosterState>,
}

impl EngineOutputs {
    pub fn tractive_force(&self) -> Force {
        sl_core::units::lbf(self.tractive_force_lbf)
    }

    pub fn indicated_power(&self) -> Power {
        sl_core::units::hp(self.indicated_hp)
    }
}

/// State carried between ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// LP clearance pressure left by the previous cycle (psia)
    pub lp_clearance_psia: f64,
    pub previous_ihp: f64,
    pub previous_usage_lb_per_s: f64,
    pub tractive: TractiveForceState,
    pub booster: Option<BoosterController>,
}

#[derive(Clone, Debug)]
pub struct SteamEngine {
    pub name: String,
    pub role: EngineRole,
    pub geometry: CylinderGeometry,
    pub topology: EngineTopology,
    pub params: EngineParams,
    pub ratings: EngineRatings,
    pub tractive: TractiveForceModel,
    state: EngineState,
    outputs: EngineOutputs,
}

impl SteamEngine {
    /// Build an engine and derive its ratings.
    ///
    /// # Errors
    /// Invalid geometry, topology or parameters.
    pub fn new(
        props: &SteamProperties,
        name: impl Into<String>,
        role: EngineRole,
        geometry: CylinderGeometry,
        topology: EngineTopology,
        params: EngineParams,
    ) -> EngineResult<Self> {
        geometry.validate()?;
        topology.validate()?;
        params.validate()?;
        let ratings = EngineRatings::derive(props, &geometry, &topology, &params);
        let tractive =
            TractiveForceModel::for_cylinders(geometry.cylinders, params.advanced_adhesion)?;
        let state = EngineState {
            lp_clearance_psia: ONE_ATMOSPHERE_PSI,
            previous_ihp: 0.0,
            previous_usage_lb_per_s: 0.0,
            tractive: TractiveForceState::new(tractive.cranks.len(), params.average_samples)?,
            booster: (role == EngineRole::Booster).then(BoosterController::default),
        };
        Ok(Self {
            name: name.into(),
            role,
            geometry,
            topology,
            params,
            ratings,
            tractive,
            state,
            outputs: EngineOutputs::default(),
        })
    }

    /// Replace the default crank phasing.
    pub fn with_tractive_model(mut self, model: TractiveForceModel) -> EngineResult<Self> {
        self.state.tractive = TractiveForceState::new(model.cranks.len(), self.params.average_samples)?;
        self.tractive = model;
        Ok(self)
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn outputs(&self) -> &EngineOutputs {
        &self.outputs
    }

    /// Restore carried state, e.g. from a snapshot.
    pub fn restore_state(&mut self, state: EngineState) {
        self.state = state;
        self.outputs = EngineOutputs::default();
    }

    pub fn booster_state(&self) -> Option<BoosterState> {
        self.state.booster.as_ref().map(|b| b.state)
    }

    /// Advance the engine by one tick.
    pub fn update(&mut self, props: &SteamProperties, inputs: &EngineInputs) -> &EngineOutputs {
        if !(inputs.dt > 0.0) {
            return &self.outputs;
        }

        let direction = if inputs.cutoff < 0.0 { -1.0 } else { 1.0 };
        let mut throttle = sl_core::clamp_unit(inputs.throttle);
        let mut gear = inputs.gear;
        let mut idle_steam = 0.0;

        let booster_state = match self.state.booster.as_mut() {
            Some(booster) => {
                let cmd = BoosterCommand {
                    main_cutoff: inputs.cutoff,
                    speed_mps: inputs.speed_mps,
                    ..inputs.booster
                };
                let s = booster.update(&cmd, inputs.dt);
                if s.draws_idle_steam() {
                    idle_steam = BOOSTER_IDLE_STEAM_LB_PER_H / 3600.0;
                }
                if s.is_driving() {
                    gear = 1;
                } else {
                    throttle = 0.0;
                    gear = 0;
                }
                Some(s)
            }
            None => None,
        };

        let cutoff = match self.params.fixed_cutoff {
            Some(c) => c,
            None => {
                let c = inputs.cutoff.abs().min(self.params.max_cutoff);
                if c < MID_GEAR_CUTOFF {
                    throttle = 0.0;
                }
                c
            }
        };

        let cond = CycleConditions {
            throttle,
            cutoff,
            max_cutoff: self.params.max_cutoff,
            boiler_psig: inputs.boiler_psig,
            wheel_rpm: self.params.wheel_rpm(inputs.speed_mps),
            superheated: self.params.superheated,
            superheat_factor: self.params.superheat_factor,
            back_pressure_psig: self
                .params
                .back_pressure
                .eval_clamped(self.state.previous_ihp)
                .max(0.0),
            cock_area_in2: inputs.cocks_open.then_some(self.params.cylinder_cock_area_in2),
            compound_bypass: inputs.compound_bypass,
            gear,
        };

        let diagram = compute_indicator_diagram(
            props,
            &self.geometry,
            &self.topology,
            &cond,
            self.state.lp_clearance_psia,
        );
        if let Some(p) = diagram.lp_clearance_psia {
            self.state.lp_clearance_psia = p;
        }

        let usage = cylinder_steam_usage(
            props,
            &self.geometry,
            &self.topology,
            &diagram,
            self.params.superheated,
            inputs.boiler_psig,
            self.state.previous_usage_lb_per_s,
        );

        let lp_geometry = match &self.topology {
            EngineTopology::Compound { lp, .. } => Some(lp),
            _ => None,
        };
        let mut ihp = self.geometry.hp_per_psi(diagram.crank_rpm) * diagram.hp.mep_psi;
        if let (Some(lp_geom), Some(lp)) = (lp_geometry, diagram.lp.as_ref()) {
            ihp += lp_geom.hp_per_psi(diagram.crank_rpm) * lp.mep_psi;
        }
        let ihp = sl_core::finite_or(ihp, 0.0).max(0.0);

        let mut power_scale = 1.0;
        let mut power_limit = None;
        if ihp > self.ratings.max_indicated_hp {
            power_scale = self.ratings.max_indicated_hp / ihp;
            power_limit = Some(
                if mps_to_mph(inputs.speed_mps.abs()) > self.ratings.critical_speed_mph {
                    PowerLimit::CriticalSpeedLimited
                } else {
                    PowerLimit::BoilerLimited
                },
            );
        }
        let force_derate = sl_core::clamp_finite(inputs.force_derate, 0.0, 1.0) * power_scale;

        let force = if self.tractive.advanced {
            let mut drives = vec![CylinderDrive {
                geometry: &self.geometry,
                cycle: &diagram.hp,
            }];
            if let (Some(lp_geom), Some(lp)) = (lp_geometry, diagram.lp.as_ref()) {
                drives.push(CylinderDrive {
                    geometry: lp_geom,
                    cycle: lp,
                });
            }
            let crank_inputs = CrankInputs {
                drives: &drives,
                wheel_radius_in: self.params.wheel_radius_in,
                speed_mps: inputs.speed_mps,
                dt: inputs.dt,
                direction,
                mechanical_efficiency: self.params.mechanical_efficiency,
                gear_ratio: diagram.gear_ratio,
                derate: diagram.derate * force_derate,
                excess_rod_balance_lb: self.params.excess_rod_balance_lb,
            };
            self.tractive.step(&mut self.state.tractive, &crank_inputs)
        } else {
            let r = self.params.wheel_radius_in;
            let eff = self.params.mechanical_efficiency;
            let mut f = simplified_force_lbf(&self.geometry, r, diagram.hp.mep_psi, eff, diagram.gear_ratio);
            if let (Some(lp_geom), Some(lp)) = (lp_geometry, diagram.lp.as_ref()) {
                f += simplified_force_lbf(lp_geom, r, lp.mep_psi, eff, diagram.gear_ratio);
            }
            let f = f.max(0.0) * force_derate * direction;
            self.tractive.record_simplified(&mut self.state.tractive, f)
        };

        self.state.previous_ihp = ihp.min(self.ratings.max_indicated_hp);
        self.state.previous_usage_lb_per_s = usage.steam_lb_per_s;

        let hammer = self.state.tractive.hammer_blow_lbf;
        let axle_load = self.params.axle_load_lb;
        self.outputs = EngineOutputs {
            diagram: Some(diagram),
            usage,
            steam_usage_lb_per_s: usage.steam_lb_per_s + idle_steam,
            mep_psi: diagram.hp.mep_psi,
            lp_mep_psi: diagram.lp.map(|lp| lp.mep_psi),
            indicated_hp: ihp,
            crank_rpm: diagram.crank_rpm,
            piston_speed_ft_per_min: self.geometry.piston_speed_ft_per_min(diagram.crank_rpm),
            tractive_force_lbf: force,
            display_force_lbf: self.state.tractive.display_force_lbf(),
            axle_weight_delta_lbf: self.state.tractive.axle_weight_delta_lbf,
            hammer_blow_lbf: hammer,
            hammer_warning: hammer > HAMMER_WARNING_FRACTION * axle_load,
            hammer_excessive: hammer > HAMMER_EXCESSIVE_FRACTION * axle_load,
            power_limit,
            booster_state,
        };
        if let Some(limit) = power_limit {
            tracing::trace!(engine = %self.name, ?limit, ihp, "indicated power capped");
        }
        &self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(advanced: bool) -> SteamEngine {
        let props = SteamProperties::new().unwrap();
        let g = CylinderGeometry::new(2, 20.0, 26.0).unwrap();
        let mut params = EngineParams::new(33.0, 200.0).unwrap();
        params.advanced_adhesion = advanced;
        SteamEngine::new(&props, "main", EngineRole::Main, g, EngineTopology::Simple, params).unwrap()
    }

    fn inputs(cutoff: f64) -> EngineInputs {
        EngineInputs {
            dt: 0.1,
            throttle: 1.0,
            cutoff,
            boiler_psig: 200.0,
            speed_mps: 3.0,
            force_derate: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn reverse_gear_gives_negative_force() {
        let props = SteamProperties::new().unwrap();
        let mut e = engine(false);
        let fwd = e.update(&props, &inputs(0.5)).tractive_force_lbf;
        let rev = e.update(&props, &inputs(-0.5)).tractive_force_lbf;
        assert!(fwd > 0.0);
        assert!(rev < 0.0);
    }

    #[test]
    fn mid_gear_admits_nothing() {
        let props = SteamProperties::new().unwrap();
        let mut e = engine(false);
        let out = e.update(&props, &inputs(0.0));
        assert_eq!(out.mep_psi, 0.0);
        assert_eq!(out.tractive_force_lbf, 0.0);
    }

    #[test]
    fn zero_dt_keeps_outputs() {
        let props = SteamProperties::new().unwrap();
        let mut e = engine(true);
        let before = e.update(&props, &inputs(0.5)).clone();
        let state = e.state().clone();
        let mut idle = inputs(0.5);
        idle.dt = 0.0;
        assert_eq!(e.update(&props, &idle), &before);
        assert_eq!(e.state(), &state);
    }

    #[test]
    fn fusible_plug_derate_zeroes_force() {
        let props = SteamProperties::new().unwrap();
        let mut e = engine(false);
        let mut i = inputs(0.5);
        i.force_derate = 0.0;
        assert_eq!(e.update(&props, &i).tractive_force_lbf, 0.0);
    }
}
