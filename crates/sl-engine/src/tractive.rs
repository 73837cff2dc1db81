//! Crank-angle tractive force and dynamic axle load.
//!
//! The simplified model turns MEP straight into a mean rim force. The
//! advanced model follows each crank round the revolution: piston position
//! picks the indicator-diagram segment on either side of the piston, the
//! pressure difference becomes a crank torque through the connecting rod
//! geometry, and reciprocating inertia, guide-bar thrust and hammer blow are
//! added on top.

use crate::error::{EngineError, EngineResult};
use crate::geometry::CylinderGeometry;
use crate::indicator::CylinderCycle;
use serde::{Deserialize, Serialize};
use sl_controls::MovingAverage;
use sl_core::imperial::{G_FTPS2, IN_PER_FT};
use std::f64::consts::{PI, TAU};

/// Hammer blow above this share of the static axle load raises a warning.
pub const HAMMER_WARNING_FRACTION: f64 = 0.3;
/// Hammer blow above this share of the static axle load is excessive.
pub const HAMMER_EXCESSIVE_FRACTION: f64 = 0.5;

/// One crank on the driven axle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrankDescriptor {
    /// Angle ahead of the reference crank (rad)
    pub offset_rad: f64,
    /// Whether this crank's reciprocating masses are modelled
    pub inertia: bool,
}

impl CrankDescriptor {
    /// Standard phasing: two cylinders quartered at 90°, three or more
    /// evenly spaced. Only the first two cranks carry inertia terms.
    pub fn defaults(cylinders: usize) -> Vec<CrankDescriptor> {
        let step = if cylinders == 2 {
            PI / 2.0
        } else {
            TAU / cylinders.max(1) as f64
        };
        (0..cylinders)
            .map(|i| CrankDescriptor {
                offset_rad: step * i as f64,
                inertia: i < 2,
            })
            .collect()
    }
}

/// A cylinder group acting on the cranks with its own indicator diagram.
#[derive(Clone, Copy, Debug)]
pub struct CylinderDrive<'a> {
    pub geometry: &'a CylinderGeometry,
    pub cycle: &'a CylinderCycle,
}

/// Per-tick inputs to the advanced model.
#[derive(Clone, Copy, Debug)]
pub struct CrankInputs<'a> {
    /// Groups sharing the cranks; a compound supplies HP then LP
    pub drives: &'a [CylinderDrive<'a>],
    pub wheel_radius_in: f64,
    /// Signed road speed (m/s)
    pub speed_mps: f64,
    pub dt: f64,
    /// +1 forward gear, −1 reverse gear
    pub direction: f64,
    pub mechanical_efficiency: f64,
    pub gear_ratio: f64,
    /// Multiplier from overspeed, priming or fusible plug
    pub derate: f64,
    pub excess_rod_balance_lb: f64,
}

/// Static description of how an engine's cranks are arranged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TractiveForceModel {
    pub cranks: Vec<CrankDescriptor>,
    pub advanced: bool,
}

/// Crank angles and forces carried between ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TractiveForceState {
    /// Driven axle angle (rad), [0, 2π)
    pub axle_angle_rad: f64,
    /// Crankshaft angle (rad); equals the axle angle unless geared
    pub crankshaft_angle_rad: f64,
    pub crank_angles_rad: Vec<f64>,
    pub piston_force_lbf: Vec<f64>,
    pub inertia_force_lbf: Vec<f64>,
    pub tangential_force_lbf: Vec<f64>,
    /// Signed rim force this tick (lbf)
    pub real_force_lbf: f64,
    pub average: MovingAverage,
    pub axle_weight_delta_lbf: f64,
    /// Peak hammer blow at the current speed (lbf)
    pub hammer_blow_lbf: f64,
}

impl TractiveForceState {
    pub fn new(cranks: usize, average_samples: usize) -> EngineResult<Self> {
        Ok(Self {
            axle_angle_rad: 0.0,
            crankshaft_angle_rad: 0.0,
            crank_angles_rad: vec![0.0; cranks],
            piston_force_lbf: vec![0.0; cranks],
            inertia_force_lbf: vec![0.0; cranks],
            tangential_force_lbf: vec![0.0; cranks],
            real_force_lbf: 0.0,
            average: MovingAverage::new(average_samples)?,
            axle_weight_delta_lbf: 0.0,
            hammer_blow_lbf: 0.0,
        })
    }

    /// Smoothed rim force for display and driveline use.
    pub fn display_force_lbf(&self) -> f64 {
        self.average.average()
    }
}

/// Piston position as a fraction of stroke from the head end at crank angle
/// `theta`, with crank radius `r` and rod length `l`.
pub fn piston_position(theta: f64, r: f64, l: f64) -> f64 {
    let s = theta.sin();
    let inner = (l * l - r * r * s * s).max(0.0);
    let x = (r * (1.0 - theta.cos()) + l - inner.sqrt()) / (2.0 * r);
    x.clamp(0.0, 1.0)
}

/// Pressure (psia) on the working side at stroke fraction `x`.
pub fn working_pressure(cycle: &CylinderCycle, x: f64) -> f64 {
    let e = &cycle.events;
    let p = &cycle.pressures;
    let c = cycle.clearance;
    if x <= e.cutoff {
        let t = if e.cutoff > 0.0 { x / e.cutoff } else { 1.0 };
        sl_core::lerp(p.initial, p.cutoff, t)
    } else if x <= e.exhaust_open {
        p.cutoff * (e.cutoff + c) / (x + c)
    } else {
        let span = 1.0 - e.exhaust_open;
        let t = if span > 0.0 { (x - e.exhaust_open) / span } else { 1.0 };
        sl_core::lerp(p.release, p.back, t)
    }
}

/// Pressure (psia) on the exhausting side with `remaining` of the return
/// stroke still to go.
pub fn returning_pressure(cycle: &CylinderCycle, remaining: f64) -> f64 {
    let e = &cycle.events;
    let p = &cycle.pressures;
    let c = cycle.clearance;
    if remaining >= e.compression_close {
        p.back
    } else if remaining >= e.admission_open {
        p.pre_compression * (e.compression_close + c) / (remaining + c)
    } else {
        let t = if e.admission_open > 0.0 {
            remaining / e.admission_open
        } else {
            0.0
        };
        sl_core::lerp(p.initial, p.pre_admission, t)
    }
}

/// Mean rim force (lbf) from MEP, without crank resolution.
pub fn simplified_force_lbf(
    geometry: &CylinderGeometry,
    wheel_radius_in: f64,
    mep_psi: f64,
    mechanical_efficiency: f64,
    gear_ratio: f64,
) -> f64 {
    geometry.tractive_factor(wheel_radius_in) * mep_psi * mechanical_efficiency * gear_ratio
}

impl TractiveForceModel {
    pub fn new(cranks: Vec<CrankDescriptor>, advanced: bool) -> EngineResult<Self> {
        if cranks.is_empty() {
            return Err(EngineError::InvalidArg {
                what: "engine needs at least one crank",
            });
        }
        if cranks.iter().any(|c| !c.offset_rad.is_finite()) {
            return Err(EngineError::InvalidArg {
                what: "crank offsets must be finite",
            });
        }
        Ok(Self { cranks, advanced })
    }

    pub fn for_cylinders(cylinders: usize, advanced: bool) -> EngineResult<Self> {
        Self::new(CrankDescriptor::defaults(cylinders), advanced)
    }

    /// Advance the cranks by one tick and resolve the rim force.
    ///
    /// Returns the signed rim force (lbf) and leaves per-crank detail in
    /// `state`.
    pub fn step(&self, state: &mut TractiveForceState, input: &CrankInputs<'_>) -> f64 {
        let wheel_radius_ft = input.wheel_radius_in / IN_PER_FT;
        let speed_ftps = input.speed_mps / sl_core::imperial::FT_TO_M;
        let wheel_omega = if wheel_radius_ft > 0.0 {
            speed_ftps / wheel_radius_ft
        } else {
            0.0
        };
        let crank_omega = wheel_omega * input.gear_ratio;

        if input.dt > 0.0 && wheel_omega.is_finite() {
            state.axle_angle_rad = (state.axle_angle_rad + input.dt * wheel_omega).rem_euclid(TAU);
            state.crankshaft_angle_rad =
                (state.crankshaft_angle_rad + input.dt * crank_omega).rem_euclid(TAU);
        }

        let n = self.cranks.len();
        state.crank_angles_rad.resize(n, 0.0);
        state.piston_force_lbf.resize(n, 0.0);
        state.inertia_force_lbf.resize(n, 0.0);
        state.tangential_force_lbf.resize(n, 0.0);

        let Some(reference) = input.drives.first() else {
            state.real_force_lbf = 0.0;
            state.axle_weight_delta_lbf = 0.0;
            state.average.push(0.0);
            return 0.0;
        };
        let geometry = reference.geometry;
        let r_in = geometry.crank_radius_in();
        let r_ft = r_in / IN_PER_FT;
        let lambda = geometry.rod_ratio();

        let mut crank_sum = 0.0;
        let mut vertical = 0.0;
        for (i, crank) in self.cranks.iter().enumerate() {
            let theta = (state.crankshaft_angle_rad + crank.offset_rad).rem_euclid(TAU);
            let x = piston_position(theta, r_in, geometry.rod_length_in);
            let head_working = theta < PI;

            let mut piston = 0.0;
            for drive in input.drives {
                let share = drive.geometry.cylinders as f64 / n as f64;
                let (working, returning) = if head_working {
                    (
                        working_pressure(drive.cycle, x),
                        returning_pressure(drive.cycle, 1.0 - x),
                    )
                } else {
                    (
                        working_pressure(drive.cycle, 1.0 - x),
                        returning_pressure(drive.cycle, x),
                    )
                };
                piston += share * drive.geometry.piston_area_in2() * (working - returning);
            }

            let (s, c) = theta.sin_cos();
            let tangential_factor = (s + lambda * s * c).abs();
            let inertia = if crank.inertia {
                let half = if head_working { 1.0 } else { -1.0 };
                let mass = geometry.effective_reciprocating_weight_lb() / G_FTPS2;
                -half * mass * crank_omega * crank_omega * r_ft * (c + lambda * (2.0 * theta).cos())
            } else {
                0.0
            };
            let tangential = (piston + inertia) * tangential_factor;

            let obliquity = lambda * s / (1.0 - lambda * lambda * s * s).max(1e-9).sqrt();
            vertical += piston * obliquity;

            state.crank_angles_rad[i] = theta;
            state.piston_force_lbf[i] = piston;
            state.inertia_force_lbf[i] = inertia;
            state.tangential_force_lbf[i] = tangential;
            crank_sum += tangential;
        }

        let to_tread = if input.wheel_radius_in > 0.0 {
            r_in / input.wheel_radius_in
        } else {
            0.0
        };
        let force = (crank_sum
            * to_tread
            * input.mechanical_efficiency
            * input.gear_ratio
            * input.derate)
            .max(0.0);
        let force = sl_core::finite_or(force, 0.0) * input.direction;

        let hammer_peak =
            input.excess_rod_balance_lb / G_FTPS2 * wheel_omega * wheel_omega * r_ft;
        let hammer = hammer_peak * state.axle_angle_rad.cos();
        state.hammer_blow_lbf = sl_core::finite_or(hammer_peak.abs(), 0.0);
        state.axle_weight_delta_lbf =
            sl_core::finite_or((vertical * input.derate + hammer) * input.direction, 0.0);

        state.real_force_lbf = force;
        state.average.push(force);
        force
    }

    /// Record a force computed by the simplified formula.
    pub fn record_simplified(&self, state: &mut TractiveForceState, force_lbf: f64) -> f64 {
        let force = sl_core::finite_or(force_lbf, 0.0);
        state.real_force_lbf = force;
        state.axle_weight_delta_lbf = 0.0;
        state.hammer_blow_lbf = 0.0;
        state.average.push(force);
        force
    }
}
