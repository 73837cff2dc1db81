//! Integration tests: indicator diagram, force models and booster behaviour.
//!
//! Covers:
//! - Scenario A: full-throttle simple engine at half cutoff
//! - MEP non-decreasing in throttle for every topology, cocks open or shut
//! - Compound receiver continuity in series working
//! - Geared neutral and overspeed derate
//! - Crank-resolved force averaging to the mean-force formula

use proptest::prelude::*;
use sl_core::imperial::ONE_ATMOSPHERE_PSI;
use sl_engine::indicator::THROTTLE_CLOSED;
use sl_engine::tractive::{CrankInputs, CylinderDrive};
use sl_engine::{
    BoosterCommand, BoosterState, CycleConditions, CylinderGeometry, EngineInputs, EngineParams,
    EngineRole, EngineTopology, SteamEngine, TractiveForceModel, TractiveForceState,
    compute_indicator_diagram,
};
use sl_steam::SteamProperties;

const WHEEL_RADIUS_IN: f64 = 0.84 / 0.0254;

fn props() -> SteamProperties {
    SteamProperties::new().expect("steam tables")
}

fn conditions(throttle: f64, cutoff: f64, wheel_rpm: f64) -> CycleConditions {
    CycleConditions {
        throttle,
        cutoff,
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

fn simple_engine(advanced: bool) -> SteamEngine {
    let g = CylinderGeometry::new(2, 20.0, 26.0).unwrap();
    let mut params = EngineParams::new(WHEEL_RADIUS_IN, 200.0).unwrap();
    params.advanced_adhesion = advanced;
    SteamEngine::new(&props(), "main", EngineRole::Main, g, EngineTopology::Simple, params).unwrap()
}

fn running(speed_mps: f64, dt: f64) -> EngineInputs {
    EngineInputs {
        dt,
        throttle: 1.0,
        cutoff: 0.5,
        boiler_psig: 200.0,
        speed_mps,
        force_derate: 1.0,
        ..Default::default()
    }
}

#[test]
fn scenario_a_full_throttle_half_cutoff() {
    let p = props();
    let mut engine = simple_engine(false);
    let out = engine.update(&p, &running(0.0, 0.1));

    assert!(out.mep_psi > 0.0, "MEP above back pressure: {}", out.mep_psi);
    assert!(out.mep_psi < 200.0, "MEP below initial pressure: {}", out.mep_psi);
    assert!(out.tractive_force_lbf > 0.0);

    let diagram = out.diagram.expect("diagram");
    assert!(diagram.hp.pressures.initial <= 200.0 + ONE_ATMOSPHERE_PSI + 1e-9);
    assert!(diagram.hp.pressures.back >= ONE_ATMOSPHERE_PSI);
}

#[test]
fn closed_throttle_forces_everything_to_zero() {
    let p = props();
    let g = CylinderGeometry::new(2, 20.0, 26.0).unwrap();
    for throttle in [0.0, THROTTLE_CLOSED] {
        let d = compute_indicator_diagram(
            &p,
            &g,
            &EngineTopology::Simple,
            &conditions(throttle, 0.5, 100.0),
            ONE_ATMOSPHERE_PSI,
        );
        assert_eq!(d.hp.mep_psi, 0.0);
        assert_eq!(d.hp.pressures.initial, 0.0);
        assert_eq!(d.hp.pressures.pre_admission, 0.0);
    }
}

#[derive(Clone, Copy, Debug)]
enum Layout {
    Simple,
    CompoundSeries,
    CompoundBypass,
    Geared,
}

fn layout() -> impl Strategy<Value = Layout> {
    prop_oneof![
        Just(Layout::Simple),
        Just(Layout::CompoundSeries),
        Just(Layout::CompoundBypass),
        Just(Layout::Geared),
    ]
}

fn topology_for(layout: Layout) -> EngineTopology {
    match layout {
        Layout::Simple => EngineTopology::Simple,
        Layout::CompoundSeries | Layout::CompoundBypass => EngineTopology::Compound {
            lp: CylinderGeometry::new(2, 32.0, 26.0).unwrap(),
            receiver_volume_ft3: 4.0,
        },
        Layout::Geared => EngineTopology::Geared {
            gear_ratios: vec![2.0, 3.5],
            max_piston_speed_ft_per_min: 800.0,
        },
    }
}

proptest! {
    #[test]
    fn mep_never_falls_as_throttle_opens(
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
        cutoff in 0.05f64..0.75,
        rpm in 0.0f64..350.0,
        superheated in any::<bool>(),
        cocks_open in any::<bool>(),
        layout in layout(),
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let p = props();
        let g = CylinderGeometry::new(2, 20.0, 26.0).unwrap();
        let topology = topology_for(layout);
        let at = |throttle: f64| {
            let mut c = conditions(throttle, cutoff, rpm);
            c.superheated = superheated;
            c.cock_area_in2 = cocks_open.then_some(0.5);
            c.compound_bypass = matches!(layout, Layout::CompoundBypass);
            c
        };
        let d_lo = compute_indicator_diagram(&p, &g, &topology, &at(lo), ONE_ATMOSPHERE_PSI);
        let d_hi = compute_indicator_diagram(&p, &g, &topology, &at(hi), ONE_ATMOSPHERE_PSI);
        prop_assert!(d_lo.hp.mep_psi <= d_hi.hp.mep_psi + 1e-9,
            "{:?} throttle {} -> {} HP MEP {} -> {}", layout, lo, hi, d_lo.hp.mep_psi, d_hi.hp.mep_psi);
        if let (Some(lp_lo), Some(lp_hi)) = (d_lo.lp, d_hi.lp) {
            prop_assert!(lp_lo.mep_psi <= lp_hi.mep_psi + 1e-9,
                "{:?} throttle {} -> {} LP MEP {} -> {}", layout, lo, hi, lp_lo.mep_psi, lp_hi.mep_psi);
        }
    }
}

#[test]
fn scenario_d_compound_receiver_continuity() {
    let p = props();
    let hp = CylinderGeometry::new(2, 15.0, 26.0).unwrap();
    let topology = EngineTopology::Compound {
        lp: CylinderGeometry::new(2, 25.0, 26.0).unwrap(),
        receiver_volume_ft3: 0.5,
    };
    let prior = 40.0;
    let d = compute_indicator_diagram(&p, &hp, &topology, &conditions(1.0, 0.5, 120.0), prior);

    let blend = d.receiver_blend_input_psia.expect("series working");
    assert_eq!(blend, d.hp.pressures.release);

    let lp = d.lp.expect("LP cycle");
    let (lo, hi) = if blend < prior { (blend, prior) } else { (prior, blend) };
    assert!(lp.pressures.initial >= lo - 1e-9 && lp.pressures.initial <= hi + 1e-9);
    assert!(lp.pressures.cutoff < lp.pressures.initial);
}

#[test]
fn compound_bypass_feeds_both_groups_from_chest() {
    let p = props();
    let hp = CylinderGeometry::new(2, 15.0, 26.0).unwrap();
    let topology = EngineTopology::Compound {
        lp: CylinderGeometry::new(2, 25.0, 26.0).unwrap(),
        receiver_volume_ft3: 0.5,
    };
    let mut cond = conditions(1.0, 0.5, 60.0);
    cond.compound_bypass = true;
    let d = compute_indicator_diagram(&p, &hp, &topology, &cond, ONE_ATMOSPHERE_PSI);
    let lp = d.lp.expect("LP cycle");
    assert!(d.receiver_blend_input_psia.is_none());
    assert!((lp.pressures.initial - d.hp.pressures.initial).abs() < 1e-9);
}

#[test]
fn geared_neutral_and_overspeed() {
    let p = props();
    let g = CylinderGeometry::new(2, 12.0, 12.0).unwrap();
    let topology = EngineTopology::Geared {
        gear_ratios: vec![2.0],
        max_piston_speed_ft_per_min: 300.0,
    };

    let mut neutral = conditions(1.0, 0.5, 100.0);
    neutral.gear = 0;
    let d = compute_indicator_diagram(&p, &g, &topology, &neutral, ONE_ATMOSPHERE_PSI);
    assert_eq!(d.hp.mep_psi, 0.0);
    assert_eq!(d.hp.pressures.initial, 0.0);

    // 2 ft stroke travel per rev: 150 crank rpm is exactly the rated speed.
    let rated = compute_indicator_diagram(&p, &g, &topology, &conditions(1.0, 0.5, 75.0), ONE_ATMOSPHERE_PSI);
    assert!((rated.crank_rpm - 150.0).abs() < 1e-9);
    assert!((rated.derate - 1.0).abs() < 1e-12);

    let fast = compute_indicator_diagram(&p, &g, &topology, &conditions(1.0, 0.5, 80.0), ONE_ATMOSPHERE_PSI);
    assert!((fast.derate - (1.0 - 20.0 / 75.0)).abs() < 1e-9);
    assert!(fast.hp.mep_psi < rated.hp.mep_psi);

    let runaway = compute_indicator_diagram(&p, &g, &topology, &conditions(1.0, 0.5, 200.0), ONE_ATMOSPHERE_PSI);
    assert_eq!(runaway.derate, 0.0);
    assert_eq!(runaway.hp.mep_psi, 0.0);
}

#[test]
fn crank_resolved_force_averages_to_mean_force() {
    let p = props();
    let speed = 3.0;
    let wheel_radius_m = WHEEL_RADIUS_IN * 0.0254;
    let revolution_s = 2.0 * std::f64::consts::PI * wheel_radius_m / speed;
    let steps = 720;
    let dt = revolution_s / steps as f64;

    let mut simple = simple_engine(false);
    simple.update(&p, &running(speed, dt));
    let mean = simple.update(&p, &running(speed, dt)).tractive_force_lbf;

    let mut advanced = simple_engine(true);
    for _ in 0..steps {
        advanced.update(&p, &running(speed, dt));
    }
    let mut sum = 0.0;
    for _ in 0..steps {
        sum += advanced.update(&p, &running(speed, dt)).tractive_force_lbf;
    }
    let average = sum / steps as f64;

    let rel = (average - mean).abs() / mean;
    assert!(rel < 0.08, "crank average {average:.0} vs mean {mean:.0}");
    let display = advanced.outputs().display_force_lbf;
    assert!(display > 0.0);
}

#[test]
fn extra_cranks_carry_no_inertia() {
    let p = props();
    let g = CylinderGeometry::new(3, 18.0, 26.0).unwrap();
    let d = compute_indicator_diagram(&p, &g, &EngineTopology::Simple, &conditions(1.0, 0.4, 100.0), ONE_ATMOSPHERE_PSI);
    let model = TractiveForceModel::for_cylinders(3, true).unwrap();
    let mut state = TractiveForceState::new(3, 36).unwrap();
    let drives = [CylinderDrive {
        geometry: &g,
        cycle: &d.hp,
    }];
    let inputs = CrankInputs {
        drives: &drives,
        wheel_radius_in: 34.0,
        speed_mps: 15.0,
        dt: 0.05,
        direction: 1.0,
        mechanical_efficiency: 0.9,
        gear_ratio: 1.0,
        derate: 1.0,
        excess_rod_balance_lb: 200.0,
    };
    for _ in 0..10 {
        model.step(&mut state, &inputs);
        assert_eq!(state.inertia_force_lbf[2], 0.0);
    }
    assert!(state.inertia_force_lbf[0] != 0.0 || state.inertia_force_lbf[1] != 0.0);
    assert!(state.hammer_blow_lbf > 0.0);
}

#[test]
fn booster_only_drives_when_engaged() {
    let p = props();
    let g = CylinderGeometry::new(2, 10.0, 12.0).unwrap();
    let mut params = EngineParams::new(18.0, 200.0).unwrap();
    params.fixed_cutoff = Some(0.75);
    let topology = EngineTopology::Geared {
        gear_ratios: vec![1.5],
        max_piston_speed_ft_per_min: 800.0,
    };
    let mut booster =
        SteamEngine::new(&p, "booster", EngineRole::Booster, g, topology, params).unwrap();

    let mut inputs = running(2.0, 1.0);
    let out = booster.update(&p, &inputs);
    assert_eq!(out.booster_state, Some(BoosterState::Disengaged));
    assert_eq!(out.tractive_force_lbf, 0.0);
    assert_eq!(out.steam_usage_lb_per_s, 0.0);

    inputs.booster = BoosterCommand {
        engage: true,
        latch: true,
        air_available: true,
        ..Default::default()
    };
    let out = booster.update(&p, &inputs);
    assert_eq!(out.booster_state, Some(BoosterState::Idle));
    assert!(out.steam_usage_lb_per_s > 0.0);
    assert_eq!(out.tractive_force_lbf, 0.0);

    let mut state = BoosterState::Idle;
    for _ in 0..200 {
        state = booster.update(&p, &inputs).booster_state.expect("booster");
    }
    assert_eq!(state, BoosterState::RunEngaged);
    assert!(booster.outputs().tractive_force_lbf > 0.0);
}
