//! Per-tick orchestration of one steam locomotive.
//!
//! Order within a tick:
//!
//! ```text
//! boiler view → firing → engines → consumers → boiler integration → tender
//! ```
//!
//! Every stage reads the boiler as it stood at the start of the tick; only
//! the integration step writes it.

use crate::boiler::{
    BoilerConfig, BoilerFlows, BoilerState, StartMode, normal_heat_btu, safety_valve_heat_btu,
};
use crate::error::{SimError, SimResult};
use crate::firing::{Firebox, FiringConfig, FiringInputs};
use crate::inputs::{ControlInputs, Environment};
use crate::outputs::{EffectsState, EngineReport, TickOutputs, WarningFlags};
use crate::telemetry::{Telemetry, Verbosity};
use crate::tender::{TenderConfig, TenderState};
use sl_components::{AuxiliaryKind, BoilerConditions, EngineDraw, SteamConsumerSet};
use sl_core::imperial::k_to_f;
use sl_engine::{
    BoosterCommand, EngineInputs, EngineOutputs, EngineRole, PowerLimit, SteamEngine,
};
use sl_steam::SteamProperties;
use std::sync::Arc;

/// Force multiplier once the fusible plug has melted.
pub const FUSIBLE_PLUG_DERATE: f64 = 0.0;
/// Force multiplier while the boiler primes.
pub const PRIMING_DERATE: f64 = 0.1;
/// Boiler efficiency assumed when sizing full exhaust draught.
const NOMINAL_EFFICIENCY: f64 = 0.7;

/// Everything needed to build a locomotive.
#[derive(Clone, Debug)]
pub struct LocomotiveSpec {
    pub name: String,
    pub boiler: BoilerConfig,
    pub firing: FiringConfig,
    pub engines: Vec<SteamEngine>,
    /// Engine draws are rebuilt from `engines`; anything here is replaced.
    pub consumers: SteamConsumerSet,
    pub tender: TenderConfig,
    pub telemetry: Telemetry,
}

pub struct SteamLocomotive {
    pub name: String,
    pub(crate) props: Arc<SteamProperties>,
    pub(crate) boiler_config: BoilerConfig,
    pub(crate) boiler: BoilerState,
    pub(crate) firebox: Firebox,
    pub(crate) engines: Vec<SteamEngine>,
    pub(crate) consumers: SteamConsumerSet,
    pub(crate) tender_config: TenderConfig,
    pub(crate) tender: TenderState,
    pub(crate) telemetry: Telemetry,
    pub(crate) previous_flows: BoilerFlows,
    pub(crate) last_controls: ControlInputs,
    pub(crate) conditions: BoilerConditions,
    pub(crate) normal_heat_btu: f64,
    pub(crate) safety_heat_btu: f64,
    pub(crate) outputs: TickOutputs,
}

impl std::fmt::Debug for SteamLocomotive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteamLocomotive")
            .field("name", &self.name)
            .field("engines", &self.engines.len())
            .field("pressure_psig", &self.boiler.pressure_psig)
            .field("water_fraction", &self.boiler.water_fraction)
            .finish()
    }
}

impl SteamLocomotive {
    /// Assemble a locomotive and fill its boiler for a hot or cold start.
    ///
    /// # Errors
    /// Invalid boiler, firing or tender configuration, or no engines.
    pub fn new(props: Arc<SteamProperties>, spec: LocomotiveSpec, mode: StartMode) -> SimResult<Self> {
        spec.boiler.validate()?;
        spec.tender.validate()?;
        if spec.engines.is_empty() {
            return Err(SimError::InvalidArg {
                what: "locomotive needs at least one engine",
            });
        }
        if spec
            .engines
            .iter()
            .filter(|e| e.role == EngineRole::Main)
            .count()
            == 0
        {
            return Err(SimError::InvalidArg {
                what: "locomotive needs a main engine",
            });
        }

        let mut consumers = spec.consumers;
        consumers.engines = spec
            .engines
            .iter()
            .map(|e| {
                if e.role.follows_reverser() {
                    EngineDraw::main(e.name.clone())
                } else {
                    EngineDraw::booster(e.name.clone())
                }
            })
            .collect();

        let boiler = BoilerState::initialize(&props, &spec.boiler, mode);
        let firebox = Firebox::new(spec.firing)?;
        let env = Environment::default();
        let conditions = BoilerConditions::at_pressure(
            &props,
            boiler.pressure_psig,
            spec.boiler.max_pressure_psig,
            env.outside_temp_f,
        );
        let normal_heat = normal_heat_btu(&props, &spec.boiler);
        let safety_heat = safety_valve_heat_btu(&props, &spec.boiler);

        tracing::info!(
            name = %spec.name,
            engines = spec.engines.len(),
            ?mode,
            pressure_psig = boiler.pressure_psig,
            "locomotive initialized"
        );

        let mut loco = Self {
            name: spec.name,
            props,
            boiler_config: spec.boiler,
            boiler,
            firebox,
            engines: spec.engines,
            consumers,
            tender: TenderState::full(&spec.tender),
            tender_config: spec.tender,
            telemetry: spec.telemetry,
            previous_flows: BoilerFlows::default(),
            last_controls: ControlInputs::default(),
            conditions,
            normal_heat_btu: normal_heat,
            safety_heat_btu: safety_heat,
            outputs: TickOutputs::default(),
        };
        loco.outputs = loco.static_outputs();
        Ok(loco)
    }

    pub fn props(&self) -> &Arc<SteamProperties> {
        &self.props
    }

    pub fn boiler(&self) -> &BoilerState {
        &self.boiler
    }

    pub fn boiler_config(&self) -> &BoilerConfig {
        &self.boiler_config
    }

    pub fn firebox(&self) -> &Firebox {
        &self.firebox
    }

    pub fn engines(&self) -> &[SteamEngine] {
        &self.engines
    }

    pub fn consumers(&self) -> &SteamConsumerSet {
        &self.consumers
    }

    pub fn tender(&self) -> &TenderState {
        &self.tender
    }

    /// Boiler view at the end of the last tick.
    pub fn conditions(&self) -> &BoilerConditions {
        &self.conditions
    }

    pub fn outputs(&self) -> &TickOutputs {
        &self.outputs
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.telemetry.verbosity = verbosity;
    }

    /// Force the boiler water level (scenario and test tooling).
    pub fn force_water_fraction(&mut self, fraction: f64) {
        self.boiler
            .force_water_fraction(&self.props, &self.boiler_config, fraction);
        self.outputs.water_fraction = self.boiler.water_fraction;
    }

    pub fn set_fire_mass(&mut self, fire_mass_lb: f64) {
        self.firebox.set_fire_mass(fire_mass_lb);
        self.outputs.fire_mass_lb = self.firebox.state.fire_mass_lb;
    }

    pub fn refill_tender(&mut self) {
        self.tender.refill(&self.tender_config);
        tracing::info!(name = %self.name, "tender refilled");
    }

    /// Advance the locomotive by `dt` seconds.
    ///
    /// A non-positive `dt` leaves every piece of state untouched.
    pub fn update(&mut self, dt: f64, controls: &ControlInputs, env: &Environment) -> &TickOutputs {
        if !(dt > 0.0 && dt.is_finite()) {
            return &self.outputs;
        }
        let props = Arc::clone(&self.props);
        self.last_controls = *controls;
        let max_psig = self.boiler_config.max_pressure_psig;
        let conditions = BoilerConditions::at_pressure(
            &props,
            self.boiler.pressure_psig,
            max_psig,
            env.outside_temp_f,
        );

        // Firing
        self.consumers.blower.setting = sl_core::clamp_unit(controls.blower);
        let blower_draught = self.consumers.blower.draught_fraction(&conditions);
        let draught = sl_core::clamp_unit(controls.damper)
            * blower_draught.max(self.exhaust_draught(&conditions));
        let firing_inputs = FiringInputs {
            mode: controls.firing_mode,
            operator_fraction: controls.firing_rate,
            command: controls.firing_command,
            previous_heat_out_btu_per_s: self.previous_flows.heat_out_btu_per_s
                + self.previous_flows.radiation_btu_per_s,
            boiler_heat_btu: self.boiler.heat_btu,
            normal_heat_btu: self.normal_heat_btu,
            safety_heat_btu: self.safety_heat_btu,
            pressure_psig: self.boiler.pressure_psig,
            max_pressure_psig: max_psig,
            draught,
            fuel_available: !self.tender.fuel_exhausted(),
        };
        let firing = *self.firebox.update(&props, &firing_inputs, dt);

        // Engines
        let force_derate = if self.boiler.fusible_plug_blown() {
            FUSIBLE_PLUG_DERATE
        } else if self.boiler.priming() {
            PRIMING_DERATE
        } else {
            1.0
        };
        let engine_inputs = EngineInputs {
            dt,
            throttle: controls.throttle,
            cutoff: controls.cutoff,
            boiler_psig: self.boiler.pressure_psig,
            speed_mps: env.speed_mps,
            cocks_open: controls.cylinder_cocks,
            compound_bypass: controls.compound_bypass,
            gear: controls.gear,
            force_derate,
            booster: BoosterCommand {
                engage: controls.booster_engage,
                latch: controls.booster_latch,
                air_available: env.air_available,
                ..Default::default()
            },
        };
        let mut reports = Vec::with_capacity(self.engines.len());
        for (engine, draw) in self.engines.iter_mut().zip(self.consumers.engines.iter_mut()) {
            engine.update(&props, &engine_inputs);
            let out = engine.outputs();
            draw.usage_lb_per_s = out.steam_usage_lb_per_s;
            reports.push(engine_report(engine, out));
        }

        // Consumers
        let water_available = !self.tender.water_exhausted();
        let feed_fraction = |setting: f64| if water_available { setting } else { 0.0 };
        self.consumers.safety_valves.update(self.boiler.pressure_psig);
        for (injector, setting) in self.consumers.injectors.iter_mut().zip(controls.injectors) {
            injector.setting = feed_fraction(setting);
        }
        if let Some(pump) = self.consumers.motion_pump.as_mut() {
            pump.setting = feed_fraction(controls.motion_pump);
            pump.speed_mps = env.speed_mps;
        }
        self.consumers.cylinder_cocks.open = controls.cylinder_cocks;
        self.consumers.cylinder_cocks.chest_pressure_psig =
            sl_core::clamp_unit(controls.throttle) * self.boiler.pressure_psig;
        for (kind, on) in [
            (AuxiliaryKind::Compressor, controls.compressor),
            (AuxiliaryKind::Generator, controls.generator),
            (AuxiliaryKind::LargeEjector, controls.large_ejector),
            (AuxiliaryKind::SmallEjector, controls.small_ejector),
        ] {
            if let Some(aux) = self.consumers.auxiliary_mut(kind) {
                aux.on = on;
            }
        }
        let max_firing = self.firebox.config.max_firing_rate_lb_per_s;
        if let Some(stoker) = self.consumers.auxiliary_mut(AuxiliaryKind::Stoker) {
            stoker.on = firing.feed_lb_per_s > 0.0;
            stoker.level = firing.feed_lb_per_s / max_firing;
        }
        self.consumers.fusible_plug.blown = self.boiler.fusible_plug_blown();
        let (total, breakdown) = self.consumers.draw_all(&conditions);

        // Boiler
        let flows = BoilerFlows {
            heat_in_btu_per_s: firing.heat_in_btu_per_s,
            heat_out_btu_per_s: total.heat_btu_per_s,
            radiation_btu_per_s: self.boiler.radiation_loss_btu_per_s(
                &self.boiler_config,
                env.speed_mps,
                env.outside_temp_f,
            ),
            steam_out_lb_per_s: total.steam_lb_per_s,
            water_in_lb_per_s: total.water_in_lb_per_s,
        };
        self.boiler.integrate(&props, &self.boiler_config, dt, &flows);
        self.previous_flows = flows;

        self.tender
            .draw(firing.feed_lb_per_s * dt, breakdown.feedwater_in * dt);
        self.conditions = BoilerConditions::at_pressure(
            &props,
            self.boiler.pressure_psig,
            max_psig,
            env.outside_temp_f,
        );

        // Outputs
        let warnings = WarningFlags {
            fusible_plug_blown: self.boiler.fusible_plug_blown(),
            boiler_priming: self.boiler.priming(),
            fuel_exhausted: self.tender.fuel_exhausted(),
            water_exhausted: self.tender.water_exhausted(),
            fire_exhausted: firing.fire_exhausted,
            grate_limit_exceeded: firing.grate_limit_exceeded,
            boiler_limited: reports
                .iter()
                .any(|r| r.power_limit == Some(PowerLimit::BoilerLimited)),
            critical_speed_limited: reports
                .iter()
                .any(|r| r.power_limit == Some(PowerLimit::CriticalSpeedLimited)),
            hammer_blow_warning: self.engines.iter().any(|e| e.outputs().hammer_warning),
            hammer_blow_excessive: self.engines.iter().any(|e| e.outputs().hammer_excessive),
        };
        let mut injectors_on = [false; 2];
        for (on, injector) in injectors_on.iter_mut().zip(&self.consumers.injectors) {
            *on = injector.water_lb_per_s(&conditions) > 0.0;
        }
        let effects = EffectsState {
            crank_angle_rad: self.main_crank_angle_rad(),
            cylinder_cocks_open: breakdown.cylinder_cocks > 0.0,
            safety_valves_open: self.consumers.safety_valves.is_open(),
            blower_on: breakdown.blower > 0.0,
            injectors_on,
            exhaust_lb_per_s: breakdown.cylinders + breakdown.booster,
            cylinder_cock_lb_per_s: breakdown.cylinder_cocks,
            safety_valve_lb_per_s: breakdown.safety_valves,
            smoke: if max_firing > 0.0 {
                sl_core::clamp_unit(firing.burn_lb_per_s / max_firing)
            } else {
                0.0
            },
        };

        self.outputs = TickOutputs {
            tractive_force_lbf: reports.iter().map(|r| r.tractive_force_lbf).sum(),
            display_force_lbf: reports.iter().map(|r| r.display_force_lbf).sum(),
            axle_forces_lbf: axle_forces_lbf(&reports),
            engines: reports,
            firing,
            flows,
            steam: breakdown,
            warnings,
            effects,
            ..self.static_outputs()
        };
        self.telemetry.record(dt, &self.outputs);
        &self.outputs
    }

    /// Exhaust draught [0, 1] from last tick's cylinder exhaust.
    fn exhaust_draught(&self, conditions: &BoilerConditions) -> f64 {
        let exhaust: f64 = self
            .engines
            .iter()
            .map(|e| e.state().previous_usage_lb_per_s)
            .sum();
        let cfg = &self.firebox.config;
        let full = cfg.max_firing_rate_lb_per_s * cfg.calorific_value_btu_per_lb * NOMINAL_EFFICIENCY
            / conditions.latent_heat_btu_per_lb().max(1.0);
        if full > 0.0 {
            sl_core::clamp_unit(exhaust / full)
        } else {
            0.0
        }
    }

    fn main_crank_angle_rad(&self) -> f64 {
        self.engines
            .iter()
            .find(|e| e.role == EngineRole::Main)
            .map(|e| e.state().tractive.axle_angle_rad)
            .unwrap_or(0.0)
    }

    /// Outputs that depend only on stored state (boiler, fire, tender).
    pub(crate) fn static_outputs(&self) -> TickOutputs {
        TickOutputs {
            boiler_pressure_psig: self.boiler.pressure_psig,
            boiler_heat_btu: self.boiler.heat_btu,
            water_fraction: self.boiler.water_fraction,
            water_temp_f: k_to_f(self.boiler.water_temp_k),
            fire_mass_lb: self.firebox.state.fire_mass_lb,
            fuel_lb: self.tender.fuel_lb,
            water_lb: self.tender.water_lb,
            warnings: WarningFlags {
                fusible_plug_blown: self.boiler.fusible_plug_blown(),
                boiler_priming: self.boiler.priming(),
                fuel_exhausted: self.tender.fuel_exhausted(),
                water_exhausted: self.tender.water_exhausted(),
                fire_exhausted: self.firebox.state.fire_exhausted.is_active(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Rim force summed per driven axle, indexed by axle id.
fn axle_forces_lbf(reports: &[EngineReport]) -> Vec<f64> {
    let axles = reports.iter().map(|r| r.axle + 1).max().unwrap_or(0);
    let mut forces = vec![0.0; axles];
    for r in reports {
        forces[r.axle] += r.tractive_force_lbf;
    }
    forces
}

fn engine_report(engine: &SteamEngine, out: &EngineOutputs) -> EngineReport {
    EngineReport {
        name: engine.name.clone(),
        role: engine.role,
        axle: engine.params.attached_axle,
        indicated_hp: out.indicated_hp,
        mep_psi: out.mep_psi,
        lp_mep_psi: out.lp_mep_psi,
        crank_rpm: out.crank_rpm,
        piston_speed_ft_per_min: out.piston_speed_ft_per_min,
        tractive_force_lbf: out.tractive_force_lbf,
        display_force_lbf: out.display_force_lbf,
        axle_weight_delta_lbf: out.axle_weight_delta_lbf,
        steam_usage_lb_per_s: out.steam_usage_lb_per_s,
        power_limit: out.power_limit,
        booster_state: out.booster_state,
    }
}
