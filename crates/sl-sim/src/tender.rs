//! Tender fuel and water supply.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TenderConfig {
    pub fuel_capacity_lb: f64,
    pub water_capacity_lb: f64,
}

impl TenderConfig {
    pub fn new(fuel_capacity_lb: f64, water_capacity_lb: f64) -> SimResult<Self> {
        let cfg = Self {
            fuel_capacity_lb,
            water_capacity_lb,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.fuel_capacity_lb.is_finite() && self.fuel_capacity_lb > 0.0) {
            return Err(SimError::InvalidArg {
                what: "tender fuel capacity must be positive",
            });
        }
        if !(self.water_capacity_lb.is_finite() && self.water_capacity_lb > 0.0) {
            return Err(SimError::InvalidArg {
                what: "tender water capacity must be positive",
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TenderState {
    pub fuel_lb: f64,
    pub water_lb: f64,
}

impl TenderState {
    pub fn full(config: &TenderConfig) -> Self {
        Self {
            fuel_lb: config.fuel_capacity_lb,
            water_lb: config.water_capacity_lb,
        }
    }

    pub fn fuel_exhausted(&self) -> bool {
        self.fuel_lb <= 0.0
    }

    pub fn water_exhausted(&self) -> bool {
        self.water_lb <= 0.0
    }

    /// Take fuel and water out of the tender; levels never go negative.
    ///
    /// Returns `true` when this draw emptied either supply.
    pub fn draw(&mut self, fuel_lb: f64, water_lb: f64) -> bool {
        let was_empty = (self.fuel_exhausted(), self.water_exhausted());
        self.fuel_lb = (self.fuel_lb - sl_core::finite_or(fuel_lb, 0.0).max(0.0)).max(0.0);
        self.water_lb = (self.water_lb - sl_core::finite_or(water_lb, 0.0).max(0.0)).max(0.0);
        let now_empty = (self.fuel_exhausted(), self.water_exhausted());
        if now_empty.0 && !was_empty.0 {
            tracing::warn!("tender fuel exhausted");
        }
        if now_empty.1 && !was_empty.1 {
            tracing::warn!("tender water exhausted");
        }
        now_empty != was_empty
    }

    pub fn refill(&mut self, config: &TenderConfig) {
        *self = Self::full(config);
    }
}
