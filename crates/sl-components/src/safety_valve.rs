//! Boiler safety valves.

use crate::common::check_non_negative;
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{BoilerConditions, ConsumerKind, SteamConsumer, SteamDraw};
use sl_controls::HysteresisLatch;

/// Lift above maximum working pressure at which the valves open (psi).
pub const DEFAULT_LIFT_PSI: f64 = 2.0;
/// Pressure below maximum at which the valves reseat (psi).
pub const DEFAULT_RESEAT_PSI: f64 = 3.0;

/// Bank of safety valves treated as one lifting element.
///
/// The valves lift at `max + lift` and stay open until the pressure falls
/// below `max - reseat`, discharging their full capacity while open.
#[derive(Clone, Debug)]
pub struct SafetyValves {
    /// Discharge capacity of all valves together (lb/s)
    pub capacity_lb_per_s: f64,
    latch: HysteresisLatch,
}

impl SafetyValves {
    pub fn new(max_pressure_psig: f64, capacity_lb_per_s: f64) -> ComponentResult<Self> {
        Self::with_blowdown(
            max_pressure_psig,
            capacity_lb_per_s,
            DEFAULT_LIFT_PSI,
            DEFAULT_RESEAT_PSI,
        )
    }

    pub fn with_blowdown(
        max_pressure_psig: f64,
        capacity_lb_per_s: f64,
        lift_psi: f64,
        reseat_psi: f64,
    ) -> ComponentResult<Self> {
        if !(max_pressure_psig.is_finite() && max_pressure_psig > 0.0) {
            return Err(ComponentError::InvalidArg {
                what: "safety valve max pressure must be positive",
            });
        }
        check_non_negative(capacity_lb_per_s, "safety valve capacity")?;
        check_non_negative(lift_psi, "safety valve lift")?;
        check_non_negative(reseat_psi, "safety valve reseat")?;
        Ok(Self {
            capacity_lb_per_s,
            latch: HysteresisLatch::rising(
                max_pressure_psig + lift_psi,
                max_pressure_psig - reseat_psi,
            ),
        })
    }

    /// Pressure at which the valves lift.
    pub fn lift_pressure_psig(&self) -> f64 {
        self.latch.set
    }

    /// Update lift state from the current boiler pressure.
    pub fn update(&mut self, pressure_psig: f64) -> bool {
        self.latch.update(pressure_psig)
    }

    pub fn is_open(&self) -> bool {
        self.latch.is_active()
    }

    pub fn set_open(&mut self, open: bool) {
        self.latch.set_active(open);
    }
}

impl SteamConsumer for SafetyValves {
    fn name(&self) -> &str {
        "safety valves"
    }

    fn kind(&self) -> ConsumerKind {
        ConsumerKind::SafetyValves
    }

    fn draw(&self, conditions: &BoilerConditions) -> SteamDraw {
        if self.is_open() {
            SteamDraw::steam(self.capacity_lb_per_s, conditions)
        } else {
            SteamDraw::ZERO
        }
    }
}
