//! Property checks over the whole steam table range.

use proptest::prelude::*;
use sl_steam::SteamProperties;

proptest! {
    #[test]
    fn steam_density_increases_with_pressure(a in 0.0f64..480.0, d in 0.5f64..50.0) {
        let p = SteamProperties::new().unwrap();
        prop_assert!(p.steam_density_lb_per_ft3(a + d) > p.steam_density_lb_per_ft3(a));
    }

    #[test]
    fn water_density_never_increases_with_pressure(a in 0.0f64..480.0, d in 0.5f64..50.0) {
        let p = SteamProperties::new().unwrap();
        prop_assert!(p.water_density_lb_per_ft3(a + d) <= p.water_density_lb_per_ft3(a));
    }

    #[test]
    fn steam_enthalpy_exceeds_water_enthalpy(psig in 0.0f64..485.0) {
        let p = SteamProperties::new().unwrap();
        prop_assert!(p.steam_enthalpy_btu_per_lb(psig) >= p.water_enthalpy_btu_per_lb(psig));
    }

    #[test]
    fn valve_events_are_ordered(cutoff in 0.05f64..=0.8) {
        let p = SteamProperties::new().unwrap();
        let e = p.cycle_events(cutoff);
        prop_assert!(0.0 < e.cutoff);
        prop_assert!(e.cutoff < e.exhaust_open);
        prop_assert!(e.exhaust_open < 1.0);
        prop_assert!(0.0 < e.admission_open);
        prop_assert!(e.admission_open < e.compression_close);
        prop_assert!(e.compression_close < 1.0);
        prop_assert!(e.admission_open < e.cutoff);
    }

    #[test]
    fn valve_events_move_monotonically_with_cutoff(a in 0.05f64..0.79, d in 0.001f64..0.2) {
        let p = SteamProperties::new().unwrap();
        let b = (a + d).min(0.8);
        let ea = p.cycle_events(a);
        let eb = p.cycle_events(b);
        prop_assert!(eb.exhaust_open >= ea.exhaust_open);
        prop_assert!(eb.compression_close <= ea.compression_close);
        prop_assert!(eb.admission_open <= ea.admission_open);
    }
}

#[test]
fn saturated_water_temperature_rises_with_pressure() {
    let p = SteamProperties::new().unwrap();
    let mut last = p.saturation_temp_f(0.0);
    for psig in (10..480).step_by(10) {
        let t = p.saturation_temp_f(psig as f64);
        assert!(t > last, "temperature must rise at {psig} psig");
        last = t;
    }
}
