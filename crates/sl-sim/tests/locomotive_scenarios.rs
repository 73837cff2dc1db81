//! Integration tests: whole-locomotive ticks.
//!
//! Covers:
//! - Hot versus cold start
//! - Zero and negative dt leave state bit-identical
//! - Boiler mass conservation with no draws and no combustion
//! - Scenario B: fusible plug latches for the run
//! - Scenario C: fire exhaustion forces the burn to zero
//! - Priming derate and recovery
//! - Tender exhaustion and refill
//! - Snapshot/restore equality
//! - Fixed-step runner and telemetry
//! - Rim force routed to each engine's driven axle

use sl_components::{
    AuxiliaryKind, Blower, CylinderCocks, FixedAuxiliary, FusiblePlugVent, Injector,
    SafetyValves, SteamConsumerSet,
};
use sl_engine::{CylinderGeometry, EngineParams, EngineRole, EngineTopology, SteamEngine};
use sl_sim::{
    BoilerConfig, ControlInputs, Environment, FiringConfig, FiringMode, FuelType,
    LocomotiveSpec, RunOptions, SimError, StartMode, SteamLocomotive, Telemetry, TenderConfig,
    Verbosity, run_fixed,
};
use sl_steam::SteamProperties;
use std::sync::Arc;

const WHEEL_RADIUS_IN: f64 = 0.84 / 0.0254;

fn spec(props: &SteamProperties, tender: TenderConfig) -> LocomotiveSpec {
    let geometry = CylinderGeometry::new(2, 20.0, 26.0).unwrap();
    let params = EngineParams::new(WHEEL_RADIUS_IN, 200.0).unwrap();
    let engine = SteamEngine::new(
        props,
        "main",
        EngineRole::Main,
        geometry,
        EngineTopology::Simple,
        params,
    )
    .unwrap();
    LocomotiveSpec {
        name: "test engine".into(),
        boiler: BoilerConfig::new(300.0, 200.0).unwrap(),
        firing: FiringConfig::new(FuelType::Coal, 40.0).unwrap(),
        engines: vec![engine],
        consumers: SteamConsumerSet {
            engines: Vec::new(),
            safety_valves: SafetyValves::new(200.0, 6.0).unwrap(),
            injectors: vec![
                Injector::new("injector 1", 4.0).unwrap(),
                Injector::new("injector 2", 4.0).unwrap(),
            ],
            motion_pump: None,
            blower: Blower::new(0.5).unwrap(),
            cylinder_cocks: CylinderCocks::new(0.5, 2).unwrap(),
            auxiliaries: vec![FixedAuxiliary::new(AuxiliaryKind::Compressor, 0.03).unwrap()],
            fusible_plug: FusiblePlugVent::new(0.75).unwrap(),
        },
        tender,
        telemetry: Telemetry::default(),
    }
}

fn locomotive_with(mode: StartMode, tender: TenderConfig) -> SteamLocomotive {
    let props = SteamProperties::shared().expect("steam tables");
    let spec = spec(&props, tender);
    SteamLocomotive::new(Arc::clone(&props), spec, mode).expect("locomotive")
}

fn locomotive(mode: StartMode) -> SteamLocomotive {
    locomotive_with(mode, TenderConfig::new(20_000.0, 80_000.0).unwrap())
}

fn working() -> ControlInputs {
    ControlInputs {
        throttle: 1.0,
        cutoff: 0.5,
        ..Default::default()
    }
}

fn idle_manual() -> ControlInputs {
    ControlInputs {
        firing_mode: FiringMode::Manual,
        firing_rate: 0.0,
        ..Default::default()
    }
}

#[test]
fn hot_start_beats_cold_start() {
    let hot = locomotive(StartMode::Hot);
    let cold = locomotive(StartMode::Cold);
    assert!(hot.outputs().boiler_pressure_psig > cold.outputs().boiler_pressure_psig);
    assert!(hot.outputs().boiler_heat_btu > cold.outputs().boiler_heat_btu);
}

#[test]
fn non_positive_dt_changes_nothing() {
    let mut loco = locomotive(StartMode::Hot);
    let env = Environment {
        speed_mps: 5.0,
        ..Default::default()
    };
    for _ in 0..20 {
        loco.update(0.1, &working(), &env);
    }
    let before = loco.snapshot();
    let outputs = loco.outputs().clone();
    loco.update(0.0, &working(), &env);
    loco.update(-1.0, &working(), &env);
    loco.update(f64::NAN, &working(), &env);
    assert_eq!(loco.snapshot(), before);
    assert_eq!(loco.outputs(), &outputs);
}

#[test]
fn mass_is_conserved_without_draws_or_fire() {
    let mut loco = locomotive(StartMode::Hot);
    loco.set_fire_mass(0.0);
    let mass = loco.boiler().mass_lb;
    for _ in 0..200 {
        let out = loco.update(1.0, &idle_manual(), &Environment::default());
        assert_eq!(out.firing.heat_in_btu_per_s, 0.0);
        assert_eq!(out.steam.total_steam, 0.0);
    }
    assert_eq!(loco.boiler().mass_lb, mass);
}

#[test]
fn scenario_b_fusible_plug_stays_blown() {
    let mut loco = locomotive(StartMode::Hot);
    loco.force_water_fraction(0.69);
    let out = loco.update(0.1, &working(), &Environment::default());
    assert!(out.warnings.fusible_plug_blown);

    loco.force_water_fraction(0.8);
    for _ in 0..10 {
        let out = loco.update(0.1, &working(), &Environment::default());
        assert!(out.warnings.fusible_plug_blown);
        assert_eq!(out.tractive_force_lbf, 0.0);
        assert!(out.steam.fusible_plug > 0.0);
    }
}

#[test]
fn scenario_c_fire_exhausts_without_feed() {
    let mut loco = locomotive(StartMode::Hot);
    let ideal = loco.firebox().config.ideal_fire_mass_lb;
    loco.set_fire_mass(0.06 * ideal);

    let mut exhausted = false;
    for _ in 0..20_000 {
        let out = loco.update(1.0, &idle_manual(), &Environment::default());
        if out.warnings.fire_exhausted {
            exhausted = true;
            assert_eq!(out.firing.burn_raw_lb_per_s, 0.0);
            assert_eq!(out.firing.burn_lb_per_s, 0.0);
            assert!(out.fire_mass_lb < 0.05 * ideal);
            break;
        }
    }
    assert!(exhausted, "fire never exhausted");

    let out = loco.update(1.0, &idle_manual(), &Environment::default());
    assert!(out.warnings.fire_exhausted);
    assert_eq!(out.firing.heat_in_btu_per_s, 0.0);
}

#[test]
fn priming_cuts_force_to_a_tenth_and_clears() {
    let env = Environment::default();
    let mut normal = locomotive(StartMode::Hot);
    let mut primed = locomotive(StartMode::Hot);
    primed.force_water_fraction(0.95);

    normal.update(0.1, &working(), &env);
    let out = primed.update(0.1, &working(), &env);
    assert!(out.warnings.boiler_priming);

    let base = normal.update(0.1, &working(), &env).tractive_force_lbf;
    let derated = primed.update(0.1, &working(), &env).tractive_force_lbf;
    assert!(base > 0.0);
    let ratio = derated / base;
    assert!((ratio - 0.1).abs() < 0.005, "ratio {ratio}");

    primed.force_water_fraction(0.85);
    let out = primed.update(0.1, &working(), &env);
    assert!(!out.warnings.boiler_priming);
}

#[test]
fn empty_tender_stops_feed_until_refilled() {
    let mut loco = locomotive_with(StartMode::Hot, TenderConfig::new(5.0, 50.0).unwrap());
    let controls = ControlInputs {
        firing_mode: FiringMode::Manual,
        firing_rate: 1.0,
        injectors: [1.0, 0.0],
        ..Default::default()
    };
    let env = Environment::default();
    let mut empty = false;
    for _ in 0..600 {
        let out = loco.update(1.0, &controls, &env);
        if out.warnings.fuel_exhausted && out.warnings.water_exhausted {
            empty = true;
            break;
        }
    }
    assert!(empty);

    let out = loco.update(1.0, &controls, &env);
    assert_eq!(out.firing.feed_lb_per_s, 0.0);
    assert_eq!(out.steam.injectors, 0.0);
    assert_eq!(out.steam.feedwater_in, 0.0);

    loco.refill_tender();
    let out = loco.update(1.0, &controls, &env);
    assert!(!out.warnings.fuel_exhausted);
    assert!(!out.warnings.water_exhausted);
    assert!(out.steam.injectors > 0.0);
}

#[test]
fn restored_snapshot_ticks_identically() {
    let env = Environment {
        speed_mps: 10.0,
        ..Default::default()
    };
    let controls = ControlInputs {
        throttle: 0.5,
        cutoff: 0.4,
        blower: 0.3,
        injectors: [0.5, 0.0],
        compressor: true,
        ..Default::default()
    };
    let mut original = locomotive(StartMode::Hot);
    for _ in 0..50 {
        original.update(0.2, &controls, &env);
    }

    let mut copy = locomotive(StartMode::Cold);
    copy.restore(original.snapshot()).expect("restore");
    assert_eq!(copy.snapshot(), original.snapshot());

    for _ in 0..50 {
        let a = original.update(0.2, &controls, &env).clone();
        let b = copy.update(0.2, &controls, &env).clone();
        assert_eq!(a, b);
    }
    let a = serde_json::to_string(&original.snapshot()).unwrap();
    let b = serde_json::to_string(&copy.snapshot()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn snapshot_from_other_layout_is_rejected() {
    let mut loco = locomotive(StartMode::Hot);
    let mut snap = loco.snapshot();
    snap.engines.clear();
    assert!(matches!(
        loco.restore(snap),
        Err(SimError::SnapshotMismatch { .. })
    ));
}

#[test]
fn fixed_run_records_and_traces() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut loco = locomotive(StartMode::Hot);
    loco.set_verbosity(Verbosity::Detailed);
    let opts = RunOptions {
        dt: 0.5,
        t_end: 20.0,
        max_steps: 1_000,
        record_every: 4,
    };
    let env = Environment {
        speed_mps: 8.0,
        ..Default::default()
    };
    let record = run_fixed(&mut loco, &working(), &env, &opts).expect("run");
    assert_eq!(record.t.len(), 10);
    assert_eq!(record.outputs.len(), record.t.len());
    let last = record.last().expect("outputs");
    assert!(last.tractive_force_lbf > 0.0);
    assert!(last.engines[0].indicated_hp > 0.0);

    let bad = RunOptions {
        dt: 0.0,
        ..RunOptions::default()
    };
    assert!(run_fixed(&mut loco, &working(), &env, &bad).is_err());
}

#[test]
fn rack_engine_force_lands_on_its_own_axle() {
    let props = SteamProperties::shared().expect("steam tables");
    let mut spec = spec(&props, TenderConfig::new(20_000.0, 80_000.0).unwrap());
    let mut params = EngineParams::new(WHEEL_RADIUS_IN, 200.0).unwrap();
    params.attached_axle = 2;
    let rack = SteamEngine::new(
        &props,
        "rack",
        EngineRole::Rack,
        CylinderGeometry::new(2, 14.0, 20.0).unwrap(),
        EngineTopology::Simple,
        params,
    )
    .unwrap();
    spec.engines.push(rack);
    let mut loco = SteamLocomotive::new(Arc::clone(&props), spec, StartMode::Hot).expect("locomotive");

    let env = Environment {
        speed_mps: 3.0,
        ..Default::default()
    };
    for _ in 0..10 {
        loco.update(0.1, &working(), &env);
    }
    let out = loco.outputs();
    let main = &out.engines[0];
    let rack = &out.engines[1];
    assert_eq!((main.axle, rack.axle), (0, 2));
    assert!(rack.tractive_force_lbf > 0.0);
    assert!(rack.booster_state.is_none());

    assert_eq!(out.axle_forces_lbf.len(), 3);
    assert_eq!(out.axle_forces_lbf[0], main.tractive_force_lbf);
    assert_eq!(out.axle_forces_lbf[1], 0.0);
    assert_eq!(out.axle_forces_lbf[2], rack.tractive_force_lbf);
    let per_axle: f64 = out.axle_forces_lbf.iter().sum();
    assert!((per_axle - out.tractive_force_lbf).abs() < 1e-9);
    // Rack steam counts as cylinder steam, not booster steam.
    assert_eq!(out.steam.booster, 0.0);
    assert!(out.steam.cylinders > main.steam_usage_lb_per_s);
}
