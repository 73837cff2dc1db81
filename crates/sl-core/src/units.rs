// sl-core/src/units.rs

use uom::si::f64::{Force as UomForce, Power as UomPower, Pressure as UomPressure};

// Public canonical unit types (SI, f64)
pub type Force = UomForce;
pub type Power = UomPower;
pub type Pressure = UomPressure;

#[inline]
pub fn psi(v: f64) -> Pressure {
    use uom::si::pressure::pound_force_per_square_inch;
    Pressure::new::<pound_force_per_square_inch>(v)
}

#[inline]
pub fn lbf(v: f64) -> Force {
    use uom::si::force::pound_force;
    Force::new::<pound_force>(v)
}

#[inline]
pub fn hp(v: f64) -> Power {
    use uom::si::power::horsepower;
    Power::new::<horsepower>(v)
}

/// Imperial conversion factors for the unit-suffixed f64 fields used inside
/// the physics code. Curve-fit tables are published in imperial units, so the
/// hot path stays imperial and converts at the public boundary.
pub mod imperial {
    pub const ONE_ATMOSPHERE_PSI: f64 = 14.696;
    pub const LB_TO_KG: f64 = 0.453_592_37;
    pub const IN_TO_M: f64 = 0.0254;
    pub const FT_TO_M: f64 = 0.3048;
    pub const IN_PER_FT: f64 = 12.0;
    pub const BTU_TO_KJ: f64 = 1.055_056;
    /// Foot-pounds per minute in one horsepower.
    pub const FT_LB_PER_MIN_PER_HP: f64 = 33_000.0;
    /// Standard gravity (ft/s²) for lb-mass to slug conversion.
    pub const G_FTPS2: f64 = 32.174;

    #[inline]
    pub fn k_to_f(k: f64) -> f64 {
        (k - 273.15) * 9.0 / 5.0 + 32.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_constructors_match_imperial_inputs() {
        use uom::si::force::newton;
        use uom::si::power::watt;
        use uom::si::pressure::pascal;

        assert!((lbf(1.0).get::<newton>() - 4.448_221_6).abs() < 1e-4);
        assert!((psi(1.0).get::<pascal>() - 6_894.757).abs() < 1e-2);
        assert!((hp(1.0).get::<watt>() - 745.699_872).abs() < 1e-3);
    }

    #[test]
    fn imperial_factors_agree_with_uom() {
        use uom::si::f64::{Energy, Length, Mass};
        use uom::si::{energy, length, mass};

        let ft = Length::new::<length::foot>(1.0).get::<length::meter>();
        assert!((ft - imperial::FT_TO_M).abs() < 1e-12);
        let inch = Length::new::<length::inch>(1.0).get::<length::meter>();
        assert!((inch - imperial::IN_TO_M).abs() < 1e-12);
        let lb = Mass::new::<mass::pound>(1.0).get::<mass::kilogram>();
        assert!((lb - imperial::LB_TO_KG).abs() < 1e-9);
        let btu = Energy::new::<energy::btu_it>(1.0).get::<energy::kilojoule>();
        assert!((btu - imperial::BTU_TO_KJ).abs() < 1e-5);
    }

    #[test]
    fn kelvin_to_fahrenheit_points() {
        assert!((imperial::k_to_f(273.15) - 32.0).abs() < 1e-9);
        assert!((imperial::k_to_f(373.15) - 212.0).abs() < 1e-9);
    }
}
