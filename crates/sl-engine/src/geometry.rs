//! Cylinder geometry, engine topologies and per-engine parameters.

use crate::error::{EngineError, EngineResult};
use sl_core::Interpolator;
use sl_core::imperial::{IN_PER_FT, IN_TO_M};
use sl_steam::SteamProperties;
use std::f64::consts::PI;

/// Cubic inches per cubic foot.
const IN3_PER_FT3: f64 = 1_728.0;
/// Miles per hour per m/s.
const MPH_PER_MPS: f64 = 2.236_936;

/// One group of identical double-acting cylinders.
#[derive(Clone, Debug, PartialEq)]
pub struct CylinderGeometry {
    pub cylinders: usize,
    /// Bore (in)
    pub bore_in: f64,
    /// Piston stroke (in)
    pub stroke_in: f64,
    /// Clearance volume as a fraction of swept volume
    pub clearance_fraction: f64,
    /// Main (connecting) rod length, crank pin to crosshead (in)
    pub rod_length_in: f64,
    /// Piston, piston rod and crosshead weight per cylinder (lb)
    pub reciprocating_weight_lb: f64,
    /// Main rod weight per cylinder (lb)
    pub rod_weight_lb: f64,
}

impl CylinderGeometry {
    /// Geometry with typical clearance, rod length and reciprocating weights.
    ///
    /// # Errors
    /// Zero cylinders or non-positive bore/stroke.
    pub fn new(cylinders: usize, bore_in: f64, stroke_in: f64) -> EngineResult<Self> {
        let g = Self {
            cylinders,
            bore_in,
            stroke_in,
            clearance_fraction: 0.08,
            rod_length_in: 4.5 * stroke_in,
            reciprocating_weight_lb: 0.003 * bore_in * bore_in * stroke_in,
            rod_weight_lb: 0.002 * bore_in * bore_in * stroke_in,
        };
        g.validate()?;
        Ok(g)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.cylinders == 0 {
            return Err(EngineError::InvalidArg {
                what: "engine needs at least one cylinder",
            });
        }
        for (v, what) in [
            (self.bore_in, "cylinder bore must be positive"),
            (self.stroke_in, "cylinder stroke must be positive"),
            (self.rod_length_in, "rod length must be positive"),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(EngineError::InvalidArg { what });
            }
        }
        if self.rod_length_in <= self.crank_radius_in() {
            return Err(EngineError::NonPhysical {
                what: "rod length must exceed crank radius",
            });
        }
        if !(0.0..1.0).contains(&self.clearance_fraction) {
            return Err(EngineError::InvalidArg {
                what: "clearance fraction must be in [0, 1)",
            });
        }
        if self.reciprocating_weight_lb < 0.0 || self.rod_weight_lb < 0.0 {
            return Err(EngineError::InvalidArg {
                what: "reciprocating weights cannot be negative",
            });
        }
        Ok(())
    }

    pub fn piston_area_in2(&self) -> f64 {
        PI / 4.0 * self.bore_in * self.bore_in
    }

    /// Swept volume of one end of one cylinder (ft³).
    pub fn swept_volume_ft3(&self) -> f64 {
        self.piston_area_in2() * self.stroke_in / IN3_PER_FT3
    }

    pub fn stroke_ft(&self) -> f64 {
        self.stroke_in / IN_PER_FT
    }

    pub fn crank_radius_in(&self) -> f64 {
        self.stroke_in / 2.0
    }

    /// Crank radius over rod length.
    pub fn rod_ratio(&self) -> f64 {
        self.crank_radius_in() / self.rod_length_in
    }

    /// Weight treated as reciprocating: piston assembly plus a third of the rod.
    pub fn effective_reciprocating_weight_lb(&self) -> f64 {
        self.reciprocating_weight_lb + self.rod_weight_lb / 3.0
    }

    /// Mean tractive effort per psi of MEP at the wheel rim (lbf/psi).
    pub fn tractive_factor(&self, wheel_radius_in: f64) -> f64 {
        (self.cylinders as f64 / 2.0) * self.bore_in * self.bore_in * self.stroke_in
            / (2.0 * wheel_radius_in)
    }

    /// Indicated horsepower per psi of MEP at `crank_rpm`.
    pub fn hp_per_psi(&self, crank_rpm: f64) -> f64 {
        self.cylinders as f64 * self.stroke_ft() * self.piston_area_in2() * 2.0 * crank_rpm.abs()
            / sl_core::imperial::FT_LB_PER_MIN_PER_HP
    }

    /// Mean piston speed (ft/min) at `crank_rpm`.
    pub fn piston_speed_ft_per_min(&self, crank_rpm: f64) -> f64 {
        2.0 * self.stroke_ft() * crank_rpm.abs()
    }
}

/// Cylinder arrangement of an engine.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineTopology {
    /// All cylinders fed from the steam chest and exhausting to the blast pipe.
    Simple,
    /// Non-receiver compound: the engine geometry is the high pressure group,
    /// `lp` the low pressure group fed from the HP exhaust through a small
    /// receiver volume.
    Compound {
        lp: CylinderGeometry,
        receiver_volume_ft3: f64,
    },
    /// Cylinders drive a crankshaft geared to the axles. Gear index 0 is
    /// neutral; `gear_ratios[i - 1]` is crank revolutions per wheel revolution
    /// in gear `i`.
    Geared {
        gear_ratios: Vec<f64>,
        max_piston_speed_ft_per_min: f64,
    },
}

impl EngineTopology {
    pub fn validate(&self) -> EngineResult<()> {
        match self {
            EngineTopology::Simple => Ok(()),
            EngineTopology::Compound {
                lp,
                receiver_volume_ft3,
            } => {
                lp.validate()?;
                if !(receiver_volume_ft3.is_finite() && *receiver_volume_ft3 >= 0.0) {
                    return Err(EngineError::InvalidArg {
                        what: "receiver volume cannot be negative",
                    });
                }
                Ok(())
            }
            EngineTopology::Geared {
                gear_ratios,
                max_piston_speed_ft_per_min,
            } => {
                if gear_ratios.is_empty() || gear_ratios.iter().any(|r| !(r.is_finite() && *r > 0.0))
                {
                    return Err(EngineError::InvalidArg {
                        what: "geared engine needs positive gear ratios",
                    });
                }
                if !(max_piston_speed_ft_per_min.is_finite() && *max_piston_speed_ft_per_min > 0.0)
                {
                    return Err(EngineError::InvalidArg {
                        what: "max piston speed must be positive",
                    });
                }
                Ok(())
            }
        }
    }

    /// Crank revolutions per wheel revolution in `gear`; zero in neutral.
    pub fn gear_ratio(&self, gear: usize) -> f64 {
        match self {
            EngineTopology::Geared { gear_ratios, .. } => {
                if gear == 0 {
                    0.0
                } else {
                    gear_ratios[(gear - 1).min(gear_ratios.len() - 1)]
                }
            }
            _ => 1.0,
        }
    }

    fn highest_gear_ratio(&self) -> f64 {
        match self {
            EngineTopology::Geared { gear_ratios, .. } => {
                gear_ratios.iter().copied().fold(1.0, f64::max)
            }
            _ => 1.0,
        }
    }
}

/// Engine-level parameters besides the cylinder geometry.
#[derive(Clone, Debug)]
pub struct EngineParams {
    /// Driving wheel radius (in)
    pub wheel_radius_in: f64,
    pub max_boiler_pressure_psig: f64,
    pub max_cutoff: f64,
    pub superheated: bool,
    /// Divisor in the superheated wire-drawing ratio `1 - sqrt(rpm) / factor`
    pub superheat_factor: f64,
    pub mechanical_efficiency: f64,
    /// Orifice area of one cylinder cock (in²)
    pub cylinder_cock_area_in2: f64,
    /// Static load on the driven axle (lb)
    pub axle_load_lb: f64,
    /// Overbalance in the driving wheel counterweights (lb)
    pub excess_rod_balance_lb: f64,
    /// Exhaust back pressure (psig) against indicated horsepower
    pub back_pressure: Interpolator,
    /// Override for the derived maximum indicated horsepower
    pub max_indicated_hp: Option<f64>,
    /// Override for the design speed used to derive the maximum IHP (mph)
    pub design_speed_mph: Option<f64>,
    /// Fixed cutoff for engines without a reverser (boosters)
    pub fixed_cutoff: Option<f64>,
    /// Resolve force by crank angle instead of the mean-force formula
    pub advanced_adhesion: bool,
    /// Samples in the displayed force moving average
    pub average_samples: usize,
    /// Index of the locomotive axle this engine drives
    pub attached_axle: usize,
}

impl EngineParams {
    pub fn new(wheel_radius_in: f64, max_boiler_pressure_psig: f64) -> EngineResult<Self> {
        if !(wheel_radius_in.is_finite() && wheel_radius_in > 0.0) {
            return Err(EngineError::InvalidArg {
                what: "wheel radius must be positive",
            });
        }
        if !(max_boiler_pressure_psig.is_finite() && max_boiler_pressure_psig > 0.0) {
            return Err(EngineError::InvalidArg {
                what: "max boiler pressure must be positive",
            });
        }
        Ok(Self {
            wheel_radius_in,
            max_boiler_pressure_psig,
            max_cutoff: 0.75,
            superheated: false,
            superheat_factor: 200.0,
            mechanical_efficiency: 0.9,
            cylinder_cock_area_in2: 0.5,
            axle_load_lb: 44_000.0,
            excess_rod_balance_lb: 0.0,
            back_pressure: Interpolator::new(
                &sl_steam::tables::BACK_PRESSURE_IHP,
                &sl_steam::tables::BACK_PRESSURE_PSIG,
            )?,
            max_indicated_hp: None,
            design_speed_mph: None,
            fixed_cutoff: None,
            advanced_adhesion: false,
            average_samples: 36,
            attached_axle: 0,
        })
    }

    pub fn wheel_radius_m(&self) -> f64 {
        self.wheel_radius_in * IN_TO_M
    }

    /// Driving wheel revolutions per minute at road speed `speed_mps`.
    pub fn wheel_rpm(&self, speed_mps: f64) -> f64 {
        speed_mps.abs() / (2.0 * PI * self.wheel_radius_m()) * 60.0
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(self.max_cutoff > 0.0 && self.max_cutoff <= 1.0) {
            return Err(EngineError::InvalidArg {
                what: "max cutoff must be in (0, 1]",
            });
        }
        if !(self.mechanical_efficiency > 0.0 && self.mechanical_efficiency <= 1.0) {
            return Err(EngineError::InvalidArg {
                what: "mechanical efficiency must be in (0, 1]",
            });
        }
        if self.superheat_factor <= 0.0 {
            return Err(EngineError::InvalidArg {
                what: "superheat factor must be positive",
            });
        }
        if self.average_samples == 0 {
            return Err(EngineError::InvalidArg {
                what: "force average needs at least one sample",
            });
        }
        Ok(())
    }
}

/// Design ratings derived once at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineRatings {
    /// Starting tractive effort at maximum boiler pressure (lbf)
    pub max_tractive_effort_lbf: f64,
    pub max_indicated_hp: f64,
    /// Speed above which cylinder power, not adhesion, limits the force (mph)
    pub critical_speed_mph: f64,
    /// Static axle load over starting tractive effort
    pub factor_of_adhesion: f64,
}

impl EngineRatings {
    pub fn derive(
        props: &SteamProperties,
        geometry: &CylinderGeometry,
        topology: &EngineTopology,
        params: &EngineParams,
    ) -> Self {
        let p = params.max_boiler_pressure_psig;
        let r = params.wheel_radius_in;
        let max_te = match topology {
            // Vauclain's rule: HP cylinders at 2/3, LP at 1/4 of boiler pressure.
            EngineTopology::Compound { lp, .. } => {
                geometry.tractive_factor(r) * p * 2.0 / 3.0 + lp.tractive_factor(r) * p / 4.0
            }
            _ => geometry.tractive_factor(r) * 0.85 * p * topology.highest_gear_ratio(),
        };

        // Rule of thumb: design speed in mph equals driving wheel diameter in inches.
        let design_mph = params.design_speed_mph.unwrap_or(2.0 * r);
        let design_rpm = params.wheel_rpm(design_mph / MPH_PER_MPS) * topology.highest_gear_ratio();
        let speed_factor = props.piston_speed_factor(
            geometry.piston_speed_ft_per_min(design_rpm),
            params.superheated,
        );
        let max_ihp = params
            .max_indicated_hp
            .unwrap_or(speed_factor * max_te * design_mph / 375.0)
            .max(1.0);
        let max_te = max_te.max(1.0);

        Self {
            max_tractive_effort_lbf: max_te,
            max_indicated_hp: max_ihp,
            critical_speed_mph: max_ihp * 375.0 / max_te,
            factor_of_adhesion: params.axle_load_lb / max_te,
        }
    }
}

pub(crate) fn mps_to_mph(v: f64) -> f64 {
    v * MPH_PER_MPS
}
