//! Indicator-diagram engine.
//!
//! Each working cycle is reduced to six characteristic pressures joined by
//! straight lines (admission, release, pre-admission) and isothermal curves
//! (expansion, compression):
//!
//! ```text
//!   p
//!   │ a────b            a initial      d back
//!   │ │     ╲           b cutoff       e pre-compression
//!   │ │       ╲         c release      f pre-admission
//!   │ f         ╲c
//!   │  ╲          │
//!   │   ╲e────────d
//!   └──────────────────── stroke
//! ```
//!
//! Mean effective pressure is the enclosed area over the stroke:
//!
//! ```text
//! MEP = admission + expansion + release − (exhaust + compression + pre-admission)
//! ```
//!
//! with each term a mean pressure times the stroke fraction it covers, the
//! isothermal segments using the log-mean pressure `P₁·ln R / (R − 1)`.
//! All pressures here are absolute (psia); MEP is a pressure difference.

use crate::geometry::{CylinderGeometry, EngineTopology};
use serde::{Deserialize, Serialize};
use sl_components::napier_flow_lb_per_s;
use sl_core::imperial::ONE_ATMOSPHERE_PSI;
use sl_steam::{CycleEventFractions, SteamProperties};

/// Below this throttle opening the steam chest is treated as empty.
pub const THROTTLE_CLOSED: f64 = 0.005;
/// Geared engines lose all power this far (as a fraction of the rating)
/// above their maximum piston speed.
pub const GEARED_OVERSPEED_BAND: f64 = 0.25;
/// Slowest crank rate used to time cylinder cock losses (rev/s).
const MIN_COCK_TIMING_REV_PER_S: f64 = 0.25;

/// The six characteristic pressures of one cylinder cycle (psia).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CyclePressures {
    pub initial: f64,
    pub cutoff: f64,
    pub release: f64,
    pub back: f64,
    pub pre_compression: f64,
    pub pre_admission: f64,
}

impl CyclePressures {
    pub const ZERO: CyclePressures = CyclePressures {
        initial: 0.0,
        cutoff: 0.0,
        release: 0.0,
        back: 0.0,
        pre_compression: 0.0,
        pre_admission: 0.0,
    };

    fn sanitized(self) -> Self {
        let fix = |p: f64| sl_core::finite_or(p, 0.0).max(0.0);
        Self {
            initial: fix(self.initial),
            cutoff: fix(self.cutoff),
            release: fix(self.release),
            back: fix(self.back),
            pre_compression: fix(self.pre_compression),
            pre_admission: fix(self.pre_admission),
        }
    }
}

/// One group of cylinders evaluated over a cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CylinderCycle {
    pub events: CycleEventFractions,
    pub clearance: f64,
    pub pressures: CyclePressures,
    /// Mean effective pressure (psi), never negative
    pub mep_psi: f64,
}

impl CylinderCycle {
    fn idle(events: CycleEventFractions, clearance: f64) -> Self {
        Self {
            events,
            clearance,
            pressures: CyclePressures::ZERO,
            mep_psi: 0.0,
        }
    }

    fn from_pressures(events: CycleEventFractions, clearance: f64, p: CyclePressures) -> Self {
        let pressures = p.sanitized();
        let mep = mean_effective_pressure(&events, clearance, &pressures);
        Self {
            events,
            clearance,
            pressures,
            mep_psi: sl_core::finite_or(mep, 0.0).max(0.0),
        }
    }

    /// Steam mass exhausted per stroke of one cylinder end (lb): the charge at
    /// release less the cushion retained at admission.
    pub fn steam_per_stroke_lb(&self, props: &SteamProperties, geometry: &CylinderGeometry) -> f64 {
        if self.pressures.initial <= 0.0 {
            return 0.0;
        }
        let swept = geometry.swept_volume_ft3();
        let c = self.clearance;
        let gauge = |psia: f64| (psia - ONE_ATMOSPHERE_PSI).max(0.0);
        let at_release = (self.events.exhaust_open + c)
            * swept
            * props.steam_density_lb_per_ft3(gauge(self.pressures.release));
        let cushion = (self.events.admission_open + c)
            * swept
            * props.steam_density_lb_per_ft3(gauge(self.pressures.pre_admission));
        (at_release - cushion).max(0.0)
    }
}

/// Working conditions for one indicator-diagram evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleConditions {
    /// Regulator opening [0, 1]
    pub throttle: f64,
    /// Cutoff magnitude (reverser sign removed)
    pub cutoff: f64,
    pub max_cutoff: f64,
    pub boiler_psig: f64,
    /// Driving wheel speed (rpm)
    pub wheel_rpm: f64,
    pub superheated: bool,
    pub superheat_factor: f64,
    /// Exhaust back pressure from the previous tick's power (psig)
    pub back_pressure_psig: f64,
    /// Orifice area of one open cylinder cock (in²); `None` when closed
    pub cock_area_in2: Option<f64>,
    /// Compound bypass open: HP and LP both take boiler steam
    pub compound_bypass: bool,
    /// Selected gear for geared engines
    pub gear: usize,
}

/// Result of one indicator-diagram evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndicatorDiagram {
    /// The engine's own cylinders (the HP group of a compound)
    pub hp: CylinderCycle,
    /// LP group of a compound
    pub lp: Option<CylinderCycle>,
    /// HP release pressure fed to the LP blend in series working (psia)
    pub receiver_blend_input_psia: Option<f64>,
    /// LP clearance pressure carried to the next cycle (psia)
    pub lp_clearance_psia: Option<f64>,
    pub crank_rpm: f64,
    pub gear_ratio: f64,
    /// Overspeed derate applied to MEP and force [0, 1]
    pub derate: f64,
    /// Fraction of admitted steam driving the pistons with cocks open
    pub cock_drive_fraction: f64,
}

impl IndicatorDiagram {
    pub fn is_idle(&self) -> bool {
        self.hp.mep_psi == 0.0 && self.lp.is_none_or(|lp| lp.mep_psi == 0.0)
    }
}

/// Mean pressure over an isothermal segment starting at `p_high` with
/// volume ratio `ratio` (≥ 1).
pub fn log_mean_pressure(p_high: f64, ratio: f64) -> f64 {
    if !(ratio > 1.0 + 1e-9) || !ratio.is_finite() {
        return p_high;
    }
    p_high * ratio.ln() / (ratio - 1.0)
}

/// Enclosed diagram area per unit stroke (psi).
pub fn mean_effective_pressure(
    events: &CycleEventFractions,
    clearance: f64,
    p: &CyclePressures,
) -> f64 {
    let c = clearance;
    let e = events;
    let admission = 0.5 * (p.initial + p.cutoff) * e.cutoff;
    let expansion = log_mean_pressure(p.cutoff, (e.exhaust_open + c) / (e.cutoff + c))
        * (e.exhaust_open - e.cutoff);
    let release = 0.5 * (p.release + p.back) * (1.0 - e.exhaust_open);
    let exhaust = p.back * (1.0 - e.compression_close);
    let compression = log_mean_pressure(
        p.pre_admission,
        (e.compression_close + c) / (e.admission_open + c),
    ) * (e.compression_close - e.admission_open);
    let pre_admission = 0.5 * (p.pre_admission + p.initial) * e.admission_open;
    (admission + expansion + release) - (exhaust + compression + pre_admission)
}

/// Initial pressure in the cylinder for a given steam chest pressure.
pub fn initial_pressure_psia(
    props: &SteamProperties,
    chest_psig: f64,
    crank_rpm: f64,
    superheated: bool,
    superheat_factor: f64,
) -> f64 {
    let ratio = if superheated {
        (1.0 - crank_rpm.abs().sqrt() / superheat_factor).clamp(0.5, 1.0)
    } else {
        props.saturated_initial_pressure_ratio(crank_rpm)
    };
    (chest_psig.max(0.0) + ONE_ATMOSPHERE_PSI) * ratio
}

/// Pressures for a cylinder exhausting to a known back pressure.
fn exhausting_cycle(
    events: &CycleEventFractions,
    clearance: f64,
    initial_psia: f64,
    cutoff_ratio: f64,
    back_psia: f64,
) -> CyclePressures {
    let c = clearance;
    let cutoff = initial_psia * cutoff_ratio;
    let release = cutoff * (events.cutoff + c) / (events.exhaust_open + c);
    let pre_admission = back_psia * (events.compression_close + c) / (events.admission_open + c);
    CyclePressures {
        initial: initial_psia,
        cutoff,
        release,
        back: back_psia,
        pre_compression: back_psia,
        pre_admission,
    }
}

/// Fraction of the admitted charge that drives the piston when the cocks
/// blow part of it to atmosphere during admission.
#[allow(clippy::too_many_arguments)]
fn cock_drive_fraction(
    props: &SteamProperties,
    geometry: &CylinderGeometry,
    events: &CycleEventFractions,
    clearance: f64,
    cutoff_psia: f64,
    chest_psig: f64,
    crank_rpm: f64,
    cock_area_in2: f64,
) -> f64 {
    let charge = (events.cutoff + clearance)
        * geometry.swept_volume_ft3()
        * props.steam_density_lb_per_ft3((cutoff_psia - ONE_ATMOSPHERE_PSI).max(0.0));
    let rev_per_s = (crank_rpm.abs() / 60.0).max(MIN_COCK_TIMING_REV_PER_S);
    let admission_time_s = events.cutoff / (2.0 * rev_per_s);
    let lost = napier_flow_lb_per_s(chest_psig, cock_area_in2) * admission_time_s;
    if charge + lost <= 0.0 {
        return 1.0;
    }
    (charge / (charge + lost)).clamp(0.0, 1.0)
}

/// Apply a drive fraction to the gauge part of the admission pressures.
fn derate_admission(p: &mut CyclePressures, fraction: f64) {
    let scale = |psia: f64| ONE_ATMOSPHERE_PSI + (psia - ONE_ATMOSPHERE_PSI) * fraction;
    let initial = scale(p.initial);
    let ratio = if p.initial > 0.0 { p.cutoff / p.initial } else { 0.0 };
    let release_ratio = if p.cutoff > 0.0 { p.release / p.cutoff } else { 0.0 };
    p.initial = initial;
    p.cutoff = initial * ratio;
    p.release = p.cutoff * release_ratio;
}

/// Evaluate the indicator diagram for any topology.
///
/// `lp_prior_clearance_psia` is the LP clearance pressure left by the
/// previous cycle; only compounds in series working use it.
pub fn compute_indicator_diagram(
    props: &SteamProperties,
    geometry: &CylinderGeometry,
    topology: &EngineTopology,
    cond: &CycleConditions,
    lp_prior_clearance_psia: f64,
) -> IndicatorDiagram {
    match topology {
        EngineTopology::Simple => simple_diagram(props, geometry, cond, 1.0, 1.0),
        EngineTopology::Geared {
            max_piston_speed_ft_per_min,
            ..
        } => geared_diagram(props, geometry, topology, *max_piston_speed_ft_per_min, cond),
        EngineTopology::Compound {
            lp,
            receiver_volume_ft3,
        } => compound_diagram(
            props,
            geometry,
            lp,
            *receiver_volume_ft3,
            cond,
            lp_prior_clearance_psia,
        ),
    }
}

fn port_opening(cond: &CycleConditions) -> f64 {
    if cond.max_cutoff > 0.0 {
        (cond.cutoff / cond.max_cutoff).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

fn throttle_closed(cond: &CycleConditions) -> bool {
    !(cond.throttle > THROTTLE_CLOSED) || !(cond.boiler_psig > 0.0)
}

/// One cylinder group fed from the steam chest, exhausting to the blast pipe.
fn chest_fed_cycle(
    props: &SteamProperties,
    geometry: &CylinderGeometry,
    events: &CycleEventFractions,
    cond: &CycleConditions,
    crank_rpm: f64,
) -> (CylinderCycle, f64) {
    let c = geometry.clearance_fraction;
    let chest_psig = sl_core::clamp_unit(cond.throttle) * cond.boiler_psig.max(0.0);
    let initial = initial_pressure_psia(
        props,
        chest_psig,
        crank_rpm,
        cond.superheated,
        cond.superheat_factor,
    );
    let cutoff_ratio = props.cutoff_pressure_ratio(crank_rpm, events.cutoff, port_opening(cond));
    let back = cond.back_pressure_psig.max(0.0) + ONE_ATMOSPHERE_PSI;
    let mut p = exhausting_cycle(events, c, initial, cutoff_ratio, back);

    let mut drive = 1.0;
    if let Some(area) = cond.cock_area_in2 {
        drive = cock_drive_fraction(
            props, geometry, events, c, p.cutoff, chest_psig, crank_rpm, area,
        );
        derate_admission(&mut p, drive);
    }
    (CylinderCycle::from_pressures(*events, c, p), drive)
}

fn simple_diagram(
    props: &SteamProperties,
    geometry: &CylinderGeometry,
    cond: &CycleConditions,
    gear_ratio: f64,
    derate: f64,
) -> IndicatorDiagram {
    let events = props.cycle_events(cond.cutoff);
    let crank_rpm = cond.wheel_rpm.abs() * gear_ratio;
    if throttle_closed(cond) || gear_ratio <= 0.0 {
        return IndicatorDiagram {
            hp: CylinderCycle::idle(events, geometry.clearance_fraction),
            lp: None,
            receiver_blend_input_psia: None,
            lp_clearance_psia: None,
            crank_rpm,
            gear_ratio,
            derate: 0.0,
            cock_drive_fraction: 1.0,
        };
    }
    let (mut hp, drive) = chest_fed_cycle(props, geometry, &events, cond, crank_rpm);
    hp.mep_psi *= derate;
    IndicatorDiagram {
        hp,
        lp: None,
        receiver_blend_input_psia: None,
        lp_clearance_psia: None,
        crank_rpm,
        gear_ratio,
        derate,
        cock_drive_fraction: drive,
    }
}

fn geared_diagram(
    props: &SteamProperties,
    geometry: &CylinderGeometry,
    topology: &EngineTopology,
    max_piston_speed_ft_per_min: f64,
    cond: &CycleConditions,
) -> IndicatorDiagram {
    let ratio = topology.gear_ratio(cond.gear);
    let piston_speed = geometry.piston_speed_ft_per_min(cond.wheel_rpm * ratio);
    let over = (piston_speed - max_piston_speed_ft_per_min).max(0.0);
    let derate =
        (1.0 - over / (GEARED_OVERSPEED_BAND * max_piston_speed_ft_per_min)).clamp(0.0, 1.0);
    simple_diagram(props, geometry, cond, ratio, derate)
}

fn compound_diagram(
    props: &SteamProperties,
    hp_geom: &CylinderGeometry,
    lp_geom: &CylinderGeometry,
    receiver_volume_ft3: f64,
    cond: &CycleConditions,
    lp_prior_clearance_psia: f64,
) -> IndicatorDiagram {
    let events = props.cycle_events(cond.cutoff);
    let crank_rpm = cond.wheel_rpm.abs();
    if throttle_closed(cond) {
        return IndicatorDiagram {
            hp: CylinderCycle::idle(events, hp_geom.clearance_fraction),
            lp: Some(CylinderCycle::idle(events, lp_geom.clearance_fraction)),
            receiver_blend_input_psia: None,
            lp_clearance_psia: Some(lp_prior_clearance_psia),
            crank_rpm,
            gear_ratio: 1.0,
            derate: 0.0,
            cock_drive_fraction: 1.0,
        };
    }

    if cond.compound_bypass {
        // Simple working: both groups take chest steam and exhaust to atmosphere.
        let (hp, drive) = chest_fed_cycle(props, hp_geom, &events, cond, crank_rpm);
        let (lp, _) = chest_fed_cycle(props, lp_geom, &events, cond, crank_rpm);
        return IndicatorDiagram {
            hp,
            lp: Some(lp),
            receiver_blend_input_psia: None,
            lp_clearance_psia: Some(lp.pressures.pre_admission),
            crank_rpm,
            gear_ratio: 1.0,
            derate: 1.0,
            cock_drive_fraction: drive,
        };
    }

    // Series working: the HP exhaust is the LP admission.
    let c_hp = hp_geom.clearance_fraction;
    let c_lp = lp_geom.clearance_fraction;
    let (hp_fwd, drive) = chest_fed_cycle(props, hp_geom, &events, cond, crank_rpm);
    let hp_release = hp_fwd.pressures.release;

    let v_hp = (1.0 + c_hp) * hp_geom.swept_volume_ft3();
    let v_lp_clear = c_lp * lp_geom.swept_volume_ft3();
    let v_start = v_hp + receiver_volume_ft3 + v_lp_clear;
    let lp_initial = if v_start > 0.0 {
        (hp_release * (v_hp + receiver_volume_ft3) + lp_prior_clearance_psia * v_lp_clear)
            / v_start
    } else {
        hp_release
    };

    // HP piston returns while the LP piston admits, on a common crosshead.
    let x = events.cutoff;
    let v_at_lp_cutoff = (1.0 - x + c_hp) * hp_geom.swept_volume_ft3()
        + receiver_volume_ft3
        + (x + c_lp) * lp_geom.swept_volume_ft3();
    let lp_cutoff = if v_at_lp_cutoff > 0.0 {
        lp_initial * v_start / v_at_lp_cutoff
    } else {
        lp_initial
    };

    let back = cond.back_pressure_psig.max(0.0) + ONE_ATMOSPHERE_PSI;
    let lp_cutoff_ratio = if lp_initial > 0.0 { lp_cutoff / lp_initial } else { 0.0 };
    let lp_p = exhausting_cycle(&events, c_lp, lp_initial, lp_cutoff_ratio, back);
    let lp = CylinderCycle::from_pressures(events, c_lp, lp_p);

    let hp_back = 0.5 * (lp_p.initial + lp_p.cutoff);
    let hp_pre_compression = lp_p.cutoff;
    let hp_p = CyclePressures {
        back: hp_back,
        pre_compression: hp_pre_compression,
        pre_admission: hp_pre_compression * (events.compression_close + c_hp)
            / (events.admission_open + c_hp),
        ..hp_fwd.pressures
    };
    let hp = CylinderCycle::from_pressures(events, c_hp, hp_p);

    IndicatorDiagram {
        hp,
        lp: Some(lp),
        receiver_blend_input_psia: Some(hp_release),
        lp_clearance_psia: Some(lp.pressures.pre_admission),
        crank_rpm,
        gear_ratio: 1.0,
        derate: 1.0,
        cock_drive_fraction: drive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> SteamProperties {
        SteamProperties::new().unwrap()
    }

    fn conditions(throttle: f64) -> CycleConditions {
        CycleConditions {
            throttle,
            cutoff: 0.5,
            max_cutoff: 0.75,
            boiler_psig: 200.0,
            wheel_rpm: 0.0,
            superheated: false,
            superheat_factor: 200.0,
            back_pressure_psig: 0.0,
            cock_area_in2: None,
            compound_bypass: false,
            gear: 1,
        }
    }

    #[test]
    fn log_mean_limits() {
        assert_eq!(log_mean_pressure(100.0, 1.0), 100.0);
        let m = log_mean_pressure(100.0, 2.0);
        assert!((m - 100.0 * 2f64.ln()).abs() < 1e-9);
        assert!(m < 100.0 && m > 50.0);
    }

    #[test]
    fn closed_throttle_gives_empty_diagram() {
        let g = CylinderGeometry::new(2, 20.0, 26.0).unwrap();
        let d = compute_indicator_diagram(&props(), &g, &EngineTopology::Simple, &conditions(0.0), 0.0);
        assert!(d.is_idle());
        assert_eq!(d.hp.pressures, CyclePressures::ZERO);
    }

    #[test]
    fn pressures_follow_the_cycle() {
        let g = CylinderGeometry::new(2, 20.0, 26.0).unwrap();
        let mut cond = conditions(1.0);
        cond.wheel_rpm = 150.0;
        let d = compute_indicator_diagram(&props(), &g, &EngineTopology::Simple, &cond, 0.0);
        let p = d.hp.pressures;
        assert!(p.initial <= 214.696);
        assert!(p.cutoff < p.initial);
        assert!(p.release < p.cutoff);
        assert!(p.back >= ONE_ATMOSPHERE_PSI);
        assert!(p.pre_admission > p.pre_compression);
    }

    #[test]
    fn open_cocks_reduce_mep() {
        let g = CylinderGeometry::new(2, 20.0, 26.0).unwrap();
        let shut = compute_indicator_diagram(&props(), &g, &EngineTopology::Simple, &conditions(1.0), 0.0);
        let mut cond = conditions(1.0);
        cond.cock_area_in2 = Some(0.5);
        let open = compute_indicator_diagram(&props(), &g, &EngineTopology::Simple, &cond, 0.0);
        assert!(open.cock_drive_fraction < 1.0);
        assert!(open.hp.mep_psi < shut.hp.mep_psi);
    }

    #[test]
    fn superheated_initial_pressure_closed_form() {
        let p = props();
        let a = initial_pressure_psia(&p, 200.0, 400.0, true, 200.0);
        assert!((a - 214.696 * (1.0 - 20.0 / 200.0)).abs() < 1e-9);
    }
}
