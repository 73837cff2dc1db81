//! Consumers that discharge steam to atmosphere through a fixed orifice.

use crate::common::{check_non_negative, napier_flow_lb_per_s};
use crate::error::ComponentResult;
use crate::traits::{BoilerConditions, ConsumerKind, SteamConsumer, SteamDraw};

/// Cylinder drain cocks.
///
/// While open and with steam in the chest, every cylinder blows one cock
/// (the end under admission) to atmosphere at steam chest pressure.
#[derive(Clone, Debug)]
pub struct CylinderCocks {
    /// Orifice area of a single cock (in²)
    pub orifice_area_in2: f64,
    /// Cylinders fitted with cocks
    pub cylinders: usize,
    pub open: bool,
    /// Steam chest pressure this tick (psig)
    pub chest_pressure_psig: f64,
}

impl CylinderCocks {
    pub fn new(orifice_area_in2: f64, cylinders: usize) -> ComponentResult<Self> {
        Ok(Self {
            orifice_area_in2: check_non_negative(orifice_area_in2, "cylinder cock area")?,
            cylinders,
            open: false,
            chest_pressure_psig: 0.0,
        })
    }

    /// Discharge of a single cock at `chest_psig` (lb/s).
    pub fn flow_per_cock_lb_per_s(&self, chest_psig: f64) -> f64 {
        napier_flow_lb_per_s(chest_psig, self.orifice_area_in2)
    }
}

impl SteamConsumer for CylinderCocks {
    fn name(&self) -> &str {
        "cylinder cocks"
    }

    fn kind(&self) -> ConsumerKind {
        ConsumerKind::CylinderCocks
    }

    fn draw(&self, conditions: &BoilerConditions) -> SteamDraw {
        if !self.open {
            return SteamDraw::ZERO;
        }
        let per_cock = self.flow_per_cock_lb_per_s(self.chest_pressure_psig);
        SteamDraw::steam(per_cock * self.cylinders as f64, conditions)
    }
}

/// Steam escaping through a melted fusible plug in the firebox crown.
#[derive(Clone, Debug)]
pub struct FusiblePlugVent {
    /// Bore of the plug once the lead core has melted (in²)
    pub area_in2: f64,
    pub blown: bool,
}

impl FusiblePlugVent {
    pub fn new(area_in2: f64) -> ComponentResult<Self> {
        Ok(Self {
            area_in2: check_non_negative(area_in2, "fusible plug area")?,
            blown: false,
        })
    }
}

impl SteamConsumer for FusiblePlugVent {
    fn name(&self) -> &str {
        "fusible plug"
    }

    fn kind(&self) -> ConsumerKind {
        ConsumerKind::FusiblePlug
    }

    fn draw(&self, conditions: &BoilerConditions) -> SteamDraw {
        if !self.blown {
            return SteamDraw::ZERO;
        }
        SteamDraw::steam(
            napier_flow_lb_per_s(conditions.pressure_psig, self.area_in2),
            conditions,
        )
    }
}
