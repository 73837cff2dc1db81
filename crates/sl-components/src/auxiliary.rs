//! Blower, fixed-rate auxiliaries and engine draws.

use crate::common::check_non_negative;
use crate::error::ComponentResult;
use crate::traits::{BoilerConditions, ConsumerKind, SteamConsumer, SteamDraw};
use serde::{Deserialize, Serialize};

/// Smokebox blower. Usage follows the valve setting and boiler pressure.
#[derive(Clone, Debug)]
pub struct Blower {
    /// Usage at full setting and maximum boiler pressure (lb/s)
    pub max_lb_per_s: f64,
    /// Valve setting [0, 1]
    pub setting: f64,
}

impl Blower {
    pub fn new(max_lb_per_s: f64) -> ComponentResult<Self> {
        Ok(Self {
            max_lb_per_s: check_non_negative(max_lb_per_s, "blower capacity")?,
            setting: 0.0,
        })
    }

    /// Draught produced, as a fraction of full blower draught.
    pub fn draught_fraction(&self, conditions: &BoilerConditions) -> f64 {
        sl_core::clamp_unit(self.setting) * conditions.pressure_fraction().min(1.0)
    }
}

impl SteamConsumer for Blower {
    fn name(&self) -> &str {
        "blower"
    }

    fn kind(&self) -> ConsumerKind {
        ConsumerKind::Blower
    }

    fn draw(&self, conditions: &BoilerConditions) -> SteamDraw {
        SteamDraw::steam(
            self.max_lb_per_s * self.draught_fraction(conditions),
            conditions,
        )
    }
}

/// Which fixed-rate auxiliary a [`FixedAuxiliary`] models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuxiliaryKind {
    Compressor,
    Generator,
    LargeEjector,
    SmallEjector,
    Stoker,
}

impl AuxiliaryKind {
    fn consumer_kind(self) -> ConsumerKind {
        match self {
            AuxiliaryKind::Compressor => ConsumerKind::Compressor,
            AuxiliaryKind::Generator => ConsumerKind::Generator,
            AuxiliaryKind::LargeEjector => ConsumerKind::LargeEjector,
            AuxiliaryKind::SmallEjector => ConsumerKind::SmallEjector,
            AuxiliaryKind::Stoker => ConsumerKind::Stoker,
        }
    }

    fn label(self) -> &'static str {
        match self {
            AuxiliaryKind::Compressor => "air compressor",
            AuxiliaryKind::Generator => "turbo generator",
            AuxiliaryKind::LargeEjector => "large ejector",
            AuxiliaryKind::SmallEjector => "small ejector",
            AuxiliaryKind::Stoker => "mechanical stoker",
        }
    }
}

/// Auxiliary drawing a rated steam flow scaled by its `level` while on.
#[derive(Clone, Debug)]
pub struct FixedAuxiliary {
    pub kind: AuxiliaryKind,
    /// Usage at full level (lb/s)
    pub rate_lb_per_s: f64,
    pub on: bool,
    /// Fraction of rated usage while on (stoker follows the firing rate)
    pub level: f64,
}

impl FixedAuxiliary {
    pub fn new(kind: AuxiliaryKind, rate_lb_per_s: f64) -> ComponentResult<Self> {
        Ok(Self {
            kind,
            rate_lb_per_s: check_non_negative(rate_lb_per_s, "auxiliary steam rate")?,
            on: false,
            level: 1.0,
        })
    }
}

impl SteamConsumer for FixedAuxiliary {
    fn name(&self) -> &str {
        self.kind.label()
    }

    fn kind(&self) -> ConsumerKind {
        self.kind.consumer_kind()
    }

    fn draw(&self, conditions: &BoilerConditions) -> SteamDraw {
        if !self.on || conditions.pressure_psig <= 0.0 {
            return SteamDraw::ZERO;
        }
        SteamDraw::steam(
            self.rate_lb_per_s * sl_core::clamp_unit(self.level),
            conditions,
        )
    }
}

/// Steam taken by an engine's cylinders, fed back from the engine model.
#[derive(Clone, Debug)]
pub struct EngineDraw {
    name: String,
    booster: bool,
    pub usage_lb_per_s: f64,
}

impl EngineDraw {
    pub fn main(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            booster: false,
            usage_lb_per_s: 0.0,
        }
    }

    pub fn booster(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            booster: true,
            usage_lb_per_s: 0.0,
        }
    }
}

impl SteamConsumer for EngineDraw {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ConsumerKind {
        if self.booster {
            ConsumerKind::Booster
        } else {
            ConsumerKind::Cylinders
        }
    }

    fn draw(&self, conditions: &BoilerConditions) -> SteamDraw {
        SteamDraw::steam(self.usage_lb_per_s, conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_steam::SteamProperties;

    fn conditions(psig: f64) -> BoilerConditions {
        let props = SteamProperties::new().unwrap();
        BoilerConditions::at_pressure(&props, psig, 200.0, 60.0)
    }

    #[test]
    fn blower_follows_setting_and_pressure() {
        let mut b = Blower::new(1.0).unwrap();
        assert_eq!(b.draw(&conditions(200.0)), SteamDraw::ZERO);
        b.setting = 0.5;
        assert!((b.draw(&conditions(200.0)).steam_lb_per_s - 0.5).abs() < 1e-12);
        assert!((b.draw(&conditions(100.0)).steam_lb_per_s - 0.25).abs() < 1e-12);
    }

    #[test]
    fn auxiliary_only_draws_when_on() {
        let mut c = FixedAuxiliary::new(AuxiliaryKind::Compressor, 0.03).unwrap();
        assert_eq!(c.draw(&conditions(200.0)), SteamDraw::ZERO);
        c.on = true;
        assert!((c.draw(&conditions(200.0)).steam_lb_per_s - 0.03).abs() < 1e-12);
        assert_eq!(c.draw(&conditions(0.0)), SteamDraw::ZERO);
        assert_eq!(c.kind(), ConsumerKind::Compressor);
    }

    #[test]
    fn engine_draw_kind() {
        assert_eq!(EngineDraw::main("main").kind(), ConsumerKind::Cylinders);
        assert_eq!(EngineDraw::booster("booster").kind(), ConsumerKind::Booster);
    }
}
