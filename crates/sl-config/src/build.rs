//! Turn a repaired definition into a runnable locomotive.

use crate::ConfigResult;
use crate::schema::{AdhesionDef, AdhesionMode, EngineDef, FeedwaterDef, LocomotiveDef, TopologyDef};
use sl_components::{
    AuxiliaryKind, Blower, CylinderCocks, FixedAuxiliary, FusiblePlugVent, Injector, MotionPump,
    SafetyValves, SteamConsumerSet,
};
use sl_engine::{CylinderGeometry, EngineParams, EngineRole, EngineTopology, SteamEngine};
use sl_sim::{
    BoilerConfig, FiringConfig, LocomotiveSpec, StartMode, SteamLocomotive, Telemetry,
    TenderConfig,
};
use sl_steam::SteamProperties;
use std::sync::Arc;

/// Steam raised per pound of fuel at the safety valves' rated discharge.
const SAFETY_VALVE_EVAPORATION: f64 = 8.0;

/// High-pressure cylinders with the definition's overrides applied.
fn hp_geometry(def: &EngineDef) -> ConfigResult<CylinderGeometry> {
    let mut g = CylinderGeometry::new(def.cylinders, def.bore_in, def.stroke_in)?;
    if let Some(c) = def.clearance_fraction {
        g.clearance_fraction = c;
    }
    if let Some(l) = def.rod_length_in {
        g.rod_length_in = l;
    }
    if let Some(w) = def.reciprocating_weight_lb {
        g.reciprocating_weight_lb = w;
    }
    if let Some(w) = def.rod_weight_lb {
        g.rod_weight_lb = w;
    }
    g.validate()?;
    Ok(g)
}

pub fn build_engine(
    props: &SteamProperties,
    def: &EngineDef,
    max_pressure_psig: f64,
    adhesion: &AdhesionDef,
) -> ConfigResult<SteamEngine> {
    let hp = hp_geometry(def)?;
    let topology = match &def.topology {
        TopologyDef::Simple => EngineTopology::Simple,
        TopologyDef::Compound {
            lp_cylinders,
            lp_bore_in,
            lp_stroke_in,
            receiver_volume_ft3,
        } => EngineTopology::Compound {
            lp: CylinderGeometry::new(*lp_cylinders, *lp_bore_in, *lp_stroke_in)?,
            receiver_volume_ft3: *receiver_volume_ft3,
        },
        TopologyDef::Geared {
            gear_ratios,
            max_piston_speed_ft_per_min,
        } => EngineTopology::Geared {
            gear_ratios: gear_ratios.clone(),
            max_piston_speed_ft_per_min: *max_piston_speed_ft_per_min,
        },
    };

    let mut params = EngineParams::new(def.wheel_radius_in, max_pressure_psig)?;
    params.superheated = def.superheated;
    params.advanced_adhesion = adhesion.mode == AdhesionMode::Advanced;
    params.average_samples = adhesion.average_samples;
    params.max_indicated_hp = def.max_indicated_hp;
    params.design_speed_mph = def.design_speed_mph;
    params.fixed_cutoff = def.fixed_cutoff;
    if let Some(v) = def.max_cutoff {
        params.max_cutoff = v;
    }
    if let Some(v) = def.superheat_factor {
        params.superheat_factor = v;
    }
    if let Some(v) = def.mechanical_efficiency {
        params.mechanical_efficiency = v;
    }
    if let Some(v) = def.cylinder_cock_area_in2 {
        params.cylinder_cock_area_in2 = v;
    }
    if let Some(v) = def.axle_load_lb {
        params.axle_load_lb = v;
    }
    if let Some(v) = def.excess_rod_balance_lb {
        params.excess_rod_balance_lb = v;
    }
    if let Some(axle) = def.attached_axle {
        params.attached_axle = axle;
    }

    Ok(SteamEngine::new(
        props,
        def.name.clone(),
        def.role,
        hp,
        topology,
        params,
    )?)
}

/// Assemble the locomotive description from a repaired definition.
pub fn build_spec(props: &SteamProperties, def: &LocomotiveDef) -> ConfigResult<LocomotiveSpec> {
    let bd = &def.boiler;
    let mut boiler = BoilerConfig::new(bd.volume_ft3, bd.max_pressure_psig)?;
    if let Some(area) = bd.shell_area_ft2 {
        boiler.shell_area_ft2 = area;
    }
    boiler.insulated_fraction = bd.insulated_fraction;
    boiler.min_water_fraction = bd.min_water_fraction;
    boiler.priming_water_fraction = bd.priming_water_fraction;
    boiler.priming_clear_fraction = bd.priming_water_fraction - 0.01;
    boiler.validate()?;

    let fd = &def.firebox;
    let mut firing = FiringConfig::new(fd.fuel, fd.grate_area_ft2)?;
    if let Some(cv) = fd.calorific_value_btu_per_lb {
        firing.calorific_value_btu_per_lb = cv;
    }
    if let Some(limit) = fd.grate_limit_lb_per_ft2_h {
        firing.grate_limit_lb_per_ft2_h = limit;
        firing.max_firing_rate_lb_per_s = fd.grate_area_ft2 * limit / 3600.0;
    }
    if let Some(rate) = fd.max_firing_rate_lb_per_s {
        firing.max_firing_rate_lb_per_s = rate;
    }
    firing.superheated = def.engines.iter().any(|e| e.superheated);
    firing.validate()?;

    let engines = def
        .engines
        .iter()
        .map(|e| build_engine(props, e, bd.max_pressure_psig, &def.adhesion))
        .collect::<ConfigResult<Vec<_>>>()?;

    let cock_cylinders: usize = engines
        .iter()
        .filter(|e| e.role == EngineRole::Main)
        .map(|e| match &e.topology {
            EngineTopology::Compound { lp, .. } => e.geometry.cylinders + lp.cylinders,
            _ => e.geometry.cylinders,
        })
        .sum();
    let cock_area = engines
        .iter()
        .find(|e| e.role == EngineRole::Main)
        .map(|e| e.params.cylinder_cock_area_in2)
        .unwrap_or(0.0);

    let (injectors, motion_pump) = match &def.feedwater {
        FeedwaterDef::SteamInjector { injectors } => (
            injectors
                .iter()
                .map(|i| Injector::new(i.name.clone(), i.max_water_lb_per_s))
                .collect::<Result<Vec<_>, _>>()?,
            None,
        ),
        FeedwaterDef::MotionPump {
            max_water_lb_per_s,
            full_speed_mps,
            injector,
        } => (
            injector
                .iter()
                .map(|i| Injector::new(i.name.clone(), i.max_water_lb_per_s))
                .collect::<Result<Vec<_>, _>>()?,
            Some(MotionPump::new(*max_water_lb_per_s, *full_speed_mps)?),
        ),
    };

    let ad = &def.auxiliaries;
    let mut auxiliaries = Vec::new();
    for (kind, rate) in [
        (AuxiliaryKind::Compressor, ad.compressor_lb_per_s),
        (AuxiliaryKind::Generator, ad.generator_lb_per_s),
        (AuxiliaryKind::LargeEjector, ad.large_ejector_lb_per_s),
        (AuxiliaryKind::SmallEjector, ad.small_ejector_lb_per_s),
        (AuxiliaryKind::Stoker, ad.stoker_lb_per_s),
    ] {
        if let Some(rate) = rate {
            auxiliaries.push(FixedAuxiliary::new(kind, rate)?);
        }
    }

    let safety_capacity = bd
        .safety_valve_capacity_lb_per_s
        .unwrap_or(firing.max_firing_rate_lb_per_s * SAFETY_VALVE_EVAPORATION);
    let consumers = SteamConsumerSet {
        engines: Vec::new(),
        safety_valves: SafetyValves::new(bd.max_pressure_psig, safety_capacity)?,
        injectors,
        motion_pump,
        blower: Blower::new(ad.blower_lb_per_s)?,
        cylinder_cocks: CylinderCocks::new(cock_area, cock_cylinders)?,
        auxiliaries,
        fusible_plug: FusiblePlugVent::new(bd.fusible_plug_area_in2)?,
    };

    Ok(LocomotiveSpec {
        name: def.name.clone(),
        boiler,
        firing,
        engines,
        consumers,
        tender: TenderConfig::new(def.tender.fuel_capacity_lb, def.tender.water_capacity_lb)?,
        telemetry: Telemetry::new(def.telemetry.verbosity, def.telemetry.interval_s),
    })
}

pub fn build_locomotive(
    props: Arc<SteamProperties>,
    def: &LocomotiveDef,
    mode: StartMode,
) -> ConfigResult<SteamLocomotive> {
    let spec = build_spec(&props, def)?;
    Ok(SteamLocomotive::new(props, spec, mode)?)
}
