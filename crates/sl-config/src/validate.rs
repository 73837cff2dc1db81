//! Definition validation and conservative repair.
//!
//! Structural problems (unsupported version, no engines) are errors.
//! Out-of-range numbers are replaced by a conservative default and reported
//! once with `tracing::warn!`, so a loaded definition always builds.

use crate::schema::{
    EngineDef, FeedwaterDef, LATEST_VERSION, LocomotiveDef, TopologyDef,
};
use sl_engine::EngineRole;
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Locomotive has no engines")]
    NoEngines,

    #[error("Locomotive has no main engine")]
    NoMainEngine,

    #[error("Duplicate engine name: {name}")]
    DuplicateEngine { name: String },
}

/// One value replaced during repair.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub field: String,
    pub value: f64,
    pub replacement: f64,
}

#[derive(Default)]
struct Repairs {
    done: Vec<Substitution>,
}

impl Repairs {
    /// Replace `v` with `default` unless `ok(v)`.
    fn check(&mut self, field: &str, v: &mut f64, default: f64, ok: impl Fn(f64) -> bool) {
        if v.is_finite() && ok(*v) {
            return;
        }
        tracing::warn!(field, value = *v, replacement = default, "substituting default");
        self.done.push(Substitution {
            field: field.to_string(),
            value: *v,
            replacement: default,
        });
        *v = default;
    }

    fn positive(&mut self, field: &str, v: &mut f64, default: f64) {
        self.check(field, v, default, |x| x > 0.0);
    }

    fn non_negative(&mut self, field: &str, v: &mut f64, default: f64) {
        self.check(field, v, default, |x| x >= 0.0);
    }

    fn optional(&mut self, field: &str, v: &mut Option<f64>, ok: impl Fn(f64) -> bool) {
        if let Some(x) = *v {
            if !(x.is_finite() && ok(x)) {
                tracing::warn!(field, value = x, "ignoring invalid override");
                self.done.push(Substitution {
                    field: field.to_string(),
                    value: x,
                    replacement: f64::NAN,
                });
                *v = None;
            }
        }
    }

    fn count(&mut self, field: &str, v: &mut usize, default: usize) {
        if *v == 0 {
            tracing::warn!(field, replacement = default, "substituting default");
            self.done.push(Substitution {
                field: field.to_string(),
                value: 0.0,
                replacement: default as f64,
            });
            *v = default;
        }
    }
}

/// Check structure and repair out-of-range values in place.
///
/// Returns every substitution made. Overrides that are invalid are dropped
/// (reported with a NaN replacement) so the derived value is used instead.
pub fn repair_locomotive(def: &mut LocomotiveDef) -> Result<Vec<Substitution>, ValidationError> {
    validate_locomotive(def)?;
    let mut r = Repairs::default();

    let b = &mut def.boiler;
    r.positive("boiler.volume_ft3", &mut b.volume_ft3, 300.0);
    r.positive("boiler.max_pressure_psig", &mut b.max_pressure_psig, 200.0);
    r.optional("boiler.shell_area_ft2", &mut b.shell_area_ft2, |x| x > 0.0);
    r.check("boiler.insulated_fraction", &mut b.insulated_fraction, 0.9, |x| {
        (0.0..=1.0).contains(&x)
    });
    r.check("boiler.min_water_fraction", &mut b.min_water_fraction, 0.70, |x| {
        x > 0.0 && x < 0.9
    });
    let min = b.min_water_fraction;
    r.check(
        "boiler.priming_water_fraction",
        &mut b.priming_water_fraction,
        0.91,
        |x| x > min + 0.02 && x <= 1.0,
    );
    r.optional(
        "boiler.safety_valve_capacity_lb_per_s",
        &mut b.safety_valve_capacity_lb_per_s,
        |x| x > 0.0,
    );
    r.non_negative("boiler.fusible_plug_area_in2", &mut b.fusible_plug_area_in2, 0.75);

    let f = &mut def.firebox;
    r.positive("firebox.grate_area_ft2", &mut f.grate_area_ft2, 40.0);
    r.optional("firebox.calorific_value_btu_per_lb", &mut f.calorific_value_btu_per_lb, |x| x > 0.0);
    r.optional("firebox.grate_limit_lb_per_ft2_h", &mut f.grate_limit_lb_per_ft2_h, |x| x > 0.0);
    r.optional("firebox.max_firing_rate_lb_per_s", &mut f.max_firing_rate_lb_per_s, |x| x > 0.0);

    for engine in &mut def.engines {
        repair_engine(&mut r, engine);
    }

    match &mut def.feedwater {
        FeedwaterDef::SteamInjector { injectors } => {
            for inj in injectors {
                r.non_negative(
                    "feedwater.injector.max_water_lb_per_s",
                    &mut inj.max_water_lb_per_s,
                    crate::schema::DEFAULT_INJECTOR_LB_PER_S,
                );
            }
        }
        FeedwaterDef::MotionPump {
            max_water_lb_per_s,
            full_speed_mps,
            injector,
        } => {
            r.non_negative("feedwater.pump.max_water_lb_per_s", max_water_lb_per_s, 4.0);
            r.positive("feedwater.pump.full_speed_mps", full_speed_mps, 10.0);
            if let Some(inj) = injector {
                r.non_negative(
                    "feedwater.injector.max_water_lb_per_s",
                    &mut inj.max_water_lb_per_s,
                    crate::schema::DEFAULT_INJECTOR_LB_PER_S,
                );
            }
        }
    }

    let a = &mut def.auxiliaries;
    r.non_negative("auxiliaries.blower_lb_per_s", &mut a.blower_lb_per_s, 0.5);
    for (field, v) in [
        ("auxiliaries.compressor_lb_per_s", &mut a.compressor_lb_per_s),
        ("auxiliaries.generator_lb_per_s", &mut a.generator_lb_per_s),
        ("auxiliaries.large_ejector_lb_per_s", &mut a.large_ejector_lb_per_s),
        ("auxiliaries.small_ejector_lb_per_s", &mut a.small_ejector_lb_per_s),
        ("auxiliaries.stoker_lb_per_s", &mut a.stoker_lb_per_s),
    ] {
        r.optional(field, v, |x| x >= 0.0);
    }

    r.positive("tender.fuel_capacity_lb", &mut def.tender.fuel_capacity_lb, 20_000.0);
    r.positive("tender.water_capacity_lb", &mut def.tender.water_capacity_lb, 80_000.0);
    r.count("adhesion.average_samples", &mut def.adhesion.average_samples, 36);
    r.positive(
        "telemetry.interval_s",
        &mut def.telemetry.interval_s,
        sl_sim::telemetry::DEFAULT_INTERVAL_S,
    );

    Ok(r.done)
}

pub fn validate_locomotive(def: &LocomotiveDef) -> Result<(), ValidationError> {
    if def.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: def.version,
        });
    }
    if def.engines.is_empty() {
        return Err(ValidationError::NoEngines);
    }
    if !def.engines.iter().any(|e| e.role == EngineRole::Main) {
        return Err(ValidationError::NoMainEngine);
    }
    let mut names = HashSet::new();
    for engine in &def.engines {
        if !names.insert(engine.name.as_str()) {
            return Err(ValidationError::DuplicateEngine {
                name: engine.name.clone(),
            });
        }
    }
    Ok(())
}

fn repair_engine(r: &mut Repairs, e: &mut EngineDef) {
    r.count("engine.cylinders", &mut e.cylinders, 2);
    r.positive("engine.bore_in", &mut e.bore_in, 20.0);
    r.positive("engine.stroke_in", &mut e.stroke_in, 26.0);
    r.positive("engine.wheel_radius_in", &mut e.wheel_radius_in, 33.0);
    r.optional("engine.clearance_fraction", &mut e.clearance_fraction, |x| {
        (0.0..0.5).contains(&x)
    });
    let crank = e.stroke_in / 2.0;
    r.optional("engine.rod_length_in", &mut e.rod_length_in, |x| x > crank);
    r.optional("engine.reciprocating_weight_lb", &mut e.reciprocating_weight_lb, |x| x >= 0.0);
    r.optional("engine.rod_weight_lb", &mut e.rod_weight_lb, |x| x >= 0.0);
    r.optional("engine.max_cutoff", &mut e.max_cutoff, |x| x > 0.0 && x <= 1.0);
    r.optional("engine.superheat_factor", &mut e.superheat_factor, |x| x > 0.0);
    r.optional("engine.mechanical_efficiency", &mut e.mechanical_efficiency, |x| {
        x > 0.0 && x <= 1.0
    });
    r.optional("engine.cylinder_cock_area_in2", &mut e.cylinder_cock_area_in2, |x| x >= 0.0);
    r.optional("engine.axle_load_lb", &mut e.axle_load_lb, |x| x > 0.0);
    r.optional("engine.excess_rod_balance_lb", &mut e.excess_rod_balance_lb, |x| x >= 0.0);
    r.optional("engine.max_indicated_hp", &mut e.max_indicated_hp, |x| x > 0.0);
    r.optional("engine.design_speed_mph", &mut e.design_speed_mph, |x| x > 0.0);
    r.optional("engine.fixed_cutoff", &mut e.fixed_cutoff, |x| x > 0.0 && x <= 1.0);

    match &mut e.topology {
        TopologyDef::Simple => {}
        TopologyDef::Compound {
            lp_cylinders,
            lp_bore_in,
            lp_stroke_in,
            receiver_volume_ft3,
        } => {
            r.count("engine.lp_cylinders", lp_cylinders, 2);
            r.positive("engine.lp_bore_in", lp_bore_in, e.bore_in * 1.6);
            r.positive("engine.lp_stroke_in", lp_stroke_in, e.stroke_in);
            r.non_negative("engine.receiver_volume_ft3", receiver_volume_ft3, 0.0);
        }
        TopologyDef::Geared {
            gear_ratios,
            max_piston_speed_ft_per_min,
        } => {
            if gear_ratios.is_empty() {
                tracing::warn!(engine = %e.name, "geared engine without gears, using 1:1");
                gear_ratios.push(1.0);
            }
            for ratio in gear_ratios.iter_mut() {
                r.positive("engine.gear_ratio", ratio, 1.0);
            }
            r.positive(
                "engine.max_piston_speed_ft_per_min",
                max_piston_speed_ft_per_min,
                1_000.0,
            );
        }
    }
}
