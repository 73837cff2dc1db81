//! Locomotive definition file schema.

use serde::{Deserialize, Serialize};
use sl_engine::EngineRole;
use sl_sim::{FuelType, Verbosity};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocomotiveDef {
    pub version: u32,
    pub name: String,
    pub boiler: BoilerDef,
    pub firebox: FireboxDef,
    pub engines: Vec<EngineDef>,
    #[serde(default)]
    pub feedwater: FeedwaterDef,
    #[serde(default)]
    pub auxiliaries: AuxiliariesDef,
    pub tender: TenderDef,
    #[serde(default)]
    pub adhesion: AdhesionDef,
    #[serde(default)]
    pub telemetry: TelemetryDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoilerDef {
    pub volume_ft3: f64,
    pub max_pressure_psig: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_area_ft2: Option<f64>,
    #[serde(default = "default_insulated_fraction")]
    pub insulated_fraction: f64,
    #[serde(default = "default_min_water_fraction")]
    pub min_water_fraction: f64,
    #[serde(default = "default_priming_water_fraction")]
    pub priming_water_fraction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_valve_capacity_lb_per_s: Option<f64>,
    #[serde(default = "default_fusible_plug_area")]
    pub fusible_plug_area_in2: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FireboxDef {
    #[serde(default)]
    pub fuel: FuelType,
    pub grate_area_ft2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calorific_value_btu_per_lb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grate_limit_lb_per_ft2_h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_firing_rate_lb_per_s: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineDef {
    pub name: String,
    #[serde(default)]
    pub role: EngineRole,
    pub cylinders: usize,
    pub bore_in: f64,
    pub stroke_in: f64,
    pub wheel_radius_in: f64,
    #[serde(default)]
    pub topology: TopologyDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clearance_fraction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rod_length_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reciprocating_weight_lb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rod_weight_lb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cutoff: Option<f64>,
    #[serde(default)]
    pub superheated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superheat_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanical_efficiency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cylinder_cock_area_in2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axle_load_lb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excess_rod_balance_lb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_indicated_hp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_speed_mph: Option<f64>,
    /// Boosters run at a fixed cutoff instead of following the reverser
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_cutoff: Option<f64>,
    /// Locomotive axle driven by this engine; the first axle when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_axle: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum TopologyDef {
    #[default]
    Simple,
    Compound {
        lp_cylinders: usize,
        lp_bore_in: f64,
        lp_stroke_in: f64,
        #[serde(default)]
        receiver_volume_ft3: f64,
    },
    Geared {
        gear_ratios: Vec<f64>,
        max_piston_speed_ft_per_min: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InjectorDef {
    pub name: String,
    pub max_water_lb_per_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum FeedwaterDef {
    SteamInjector {
        injectors: Vec<InjectorDef>,
    },
    /// Motion pump with an optional live steam injector for standing feed
    MotionPump {
        max_water_lb_per_s: f64,
        full_speed_mps: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        injector: Option<InjectorDef>,
    },
}

impl Default for FeedwaterDef {
    fn default() -> Self {
        FeedwaterDef::SteamInjector {
            injectors: vec![
                InjectorDef {
                    name: "injector 1".to_string(),
                    max_water_lb_per_s: DEFAULT_INJECTOR_LB_PER_S,
                },
                InjectorDef {
                    name: "injector 2".to_string(),
                    max_water_lb_per_s: DEFAULT_INJECTOR_LB_PER_S,
                },
            ],
        }
    }
}

/// Auxiliary steam rates (lb/s); absent auxiliaries are not fitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuxiliariesDef {
    #[serde(default = "default_blower")]
    pub blower_lb_per_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressor_lb_per_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_lb_per_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_ejector_lb_per_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_ejector_lb_per_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoker_lb_per_s: Option<f64>,
}

impl Default for AuxiliariesDef {
    fn default() -> Self {
        Self {
            blower_lb_per_s: default_blower(),
            compressor_lb_per_s: Some(0.03),
            generator_lb_per_s: Some(0.01),
            large_ejector_lb_per_s: None,
            small_ejector_lb_per_s: None,
            stoker_lb_per_s: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenderDef {
    pub fuel_capacity_lb: f64,
    pub water_capacity_lb: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AdhesionMode {
    #[default]
    Simplified,
    /// Crank-angle resolved force with inertia and hammer blow
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdhesionDef {
    #[serde(default)]
    pub mode: AdhesionMode,
    #[serde(default = "default_average_samples")]
    pub average_samples: usize,
}

impl Default for AdhesionDef {
    fn default() -> Self {
        Self {
            mode: AdhesionMode::default(),
            average_samples: default_average_samples(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetryDef {
    #[serde(default)]
    pub verbosity: Verbosity,
    #[serde(default = "default_interval")]
    pub interval_s: f64,
}

impl Default for TelemetryDef {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            interval_s: default_interval(),
        }
    }
}

pub const DEFAULT_INJECTOR_LB_PER_S: f64 = 4.0;

fn default_insulated_fraction() -> f64 {
    0.9
}

fn default_min_water_fraction() -> f64 {
    0.70
}

fn default_priming_water_fraction() -> f64 {
    0.91
}

fn default_fusible_plug_area() -> f64 {
    0.75
}

fn default_blower() -> f64 {
    0.5
}

fn default_average_samples() -> usize {
    36
}

fn default_interval() -> f64 {
    sl_sim::telemetry::DEFAULT_INTERVAL_S
}
