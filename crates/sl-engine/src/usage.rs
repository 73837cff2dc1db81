//! Cylinder steam consumption.

use crate::geometry::{CylinderGeometry, EngineTopology};
use crate::indicator::IndicatorDiagram;
use serde::{Deserialize, Serialize};
use sl_steam::SteamProperties;

/// Lowest factor applied when superheat exceeds the condensation limit.
const MIN_SUPERHEAT_FACTOR: f64 = 0.6;
const RANKINE_OFFSET: f64 = 459.67;

/// Steam drawn by one engine's cylinders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CylinderSteamUsage {
    pub steam_lb_per_s: f64,
    /// Steam exhausted per stroke before condensation (lb)
    pub mass_per_stroke_lb: f64,
    /// Multiplier for initial condensation (saturated) or superheat gain
    pub condensation_factor: f64,
    /// Superheat delivered to the steam chest (°F)
    pub superheat_f: f64,
}

/// Factor applied to the ideal steam usage for cylinder condensation.
///
/// Saturated engines lose `condensation_fraction(cutoff)` of the charge to
/// the cylinder walls. Superheat reduces that loss; once it exceeds the
/// condensation limit the steam volume grows with temperature instead.
pub fn condensation_factor(
    props: &SteamProperties,
    cutoff: f64,
    superheated: bool,
    superheat_f: f64,
    boiler_psig: f64,
) -> f64 {
    let cond = props.condensation_fraction(cutoff);
    if !superheated {
        return 1.0 + cond;
    }
    let limit = props.superheat_condensation_limit_f(cutoff);
    let excess = superheat_f - limit;
    if excess > 0.0 {
        let t_sat_r = props.saturation_temp_f(boiler_psig) + RANKINE_OFFSET;
        (t_sat_r / (t_sat_r + excess)).max(MIN_SUPERHEAT_FACTOR)
    } else if limit > 0.0 {
        1.0 + cond * (1.0 - superheat_f.max(0.0) / limit)
    } else {
        1.0 + cond
    }
}

/// Steam drawn by the cylinders for the given diagram.
///
/// Series compounds only draw boiler steam through the HP group; with the
/// bypass open both groups take steam from the chest.
pub fn cylinder_steam_usage(
    props: &SteamProperties,
    geometry: &CylinderGeometry,
    topology: &EngineTopology,
    diagram: &IndicatorDiagram,
    superheated: bool,
    boiler_psig: f64,
    previous_usage_lb_per_s: f64,
) -> CylinderSteamUsage {
    if diagram.is_idle() || diagram.crank_rpm <= 0.0 {
        return CylinderSteamUsage {
            condensation_factor: 1.0,
            ..Default::default()
        };
    }
    let rev_per_s = diagram.crank_rpm / 60.0;

    let hp_mass = diagram.hp.steam_per_stroke_lb(props, geometry);
    let mut mass_rate = geometry.cylinders as f64 * 2.0 * rev_per_s * hp_mass;
    let mut per_stroke = hp_mass;

    if let (EngineTopology::Compound { lp: lp_geom, .. }, Some(lp), None) =
        (topology, diagram.lp.as_ref(), diagram.receiver_blend_input_psia)
    {
        let lp_mass = lp.steam_per_stroke_lb(props, lp_geom);
        mass_rate += lp_geom.cylinders as f64 * 2.0 * rev_per_s * lp_mass;
        per_stroke += lp_mass;
    }

    let superheat_f = if superheated {
        props.superheat_temp_f(previous_usage_lb_per_s.max(0.0) * 3600.0)
    } else {
        0.0
    };
    let factor = condensation_factor(
        props,
        diagram.hp.events.cutoff,
        superheated,
        superheat_f,
        boiler_psig,
    );

    CylinderSteamUsage {
        steam_lb_per_s: sl_core::finite_or(mass_rate * factor, 0.0).max(0.0),
        mass_per_stroke_lb: per_stroke,
        condensation_factor: factor,
        superheat_f,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::{CycleConditions, compute_indicator_diagram};

    fn conditions(wheel_rpm: f64) -> CycleConditions {
        CycleConditions {
            throttle: 1.0,
            cutoff: 0.3,
            max_cutoff: 0.75,
            boiler_psig: 200.0,
            wheel_rpm,
            superheated: false,
            superheat_factor: 200.0,
            back_pressure_psig: 0.0,
            cock_area_in2: None,
            compound_bypass: false,
            gear: 1,
        }
    }

    #[test]
    fn saturated_factor_adds_condensation() {
        let props = SteamProperties::new().unwrap();
        let f = condensation_factor(&props, 0.3, false, 0.0, 200.0);
        assert!((f - (1.0 + props.condensation_fraction(0.3))).abs() < 1e-12);
    }

    #[test]
    fn high_superheat_shrinks_usage() {
        let props = SteamProperties::new().unwrap();
        let f = condensation_factor(&props, 0.3, true, 1_000.0, 200.0);
        assert!(f < 1.0 && f >= MIN_SUPERHEAT_FACTOR);
    }

    #[test]
    fn usage_scales_with_speed() {
        let props = SteamProperties::new().unwrap();
        let g = CylinderGeometry::new(2, 20.0, 26.0).unwrap();
        let t = EngineTopology::Simple;
        let slow = compute_indicator_diagram(&props, &g, &t, &conditions(60.0), 0.0);
        let fast = compute_indicator_diagram(&props, &g, &t, &conditions(120.0), 0.0);
        let a = cylinder_steam_usage(&props, &g, &t, &slow, false, 200.0, 0.0);
        let b = cylinder_steam_usage(&props, &g, &t, &fast, false, 200.0, 0.0);
        assert!(a.steam_lb_per_s > 0.0);
        assert!(b.steam_lb_per_s > a.steam_lb_per_s);
    }

    #[test]
    fn standing_engine_uses_no_steam() {
        let props = SteamProperties::new().unwrap();
        let g = CylinderGeometry::new(2, 20.0, 26.0).unwrap();
        let t = EngineTopology::Simple;
        let d = compute_indicator_diagram(&props, &g, &t, &conditions(0.0), 0.0);
        let u = cylinder_steam_usage(&props, &g, &t, &d, false, 200.0, 0.0);
        assert_eq!(u.steam_lb_per_s, 0.0);
    }
}
