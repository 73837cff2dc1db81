//! Steam property provider.

use crate::error::{SteamResult, table};
use crate::tables as t;
use sl_core::{Interpolator, Interpolator2D};
use std::sync::Arc;

/// Valve events for one cutoff setting, all as fractions of the stroke.
///
/// `cutoff` and `exhaust_open` are piston positions on the working stroke.
/// `compression_close` and `admission_open` are measured back from the end
/// of the return stroke, so on the return stroke the piston reaches the
/// compression point first (`compression_close > admission_open`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleEventFractions {
    pub cutoff: f64,
    pub exhaust_open: f64,
    pub compression_close: f64,
    pub admission_open: f64,
}

/// Every table-driven property the locomotive needs.
#[derive(Clone, Debug)]
pub struct SteamProperties {
    steam_density: Interpolator,
    water_density: Interpolator,
    steam_heat: Interpolator,
    water_heat: Interpolator,
    saturation_temp_f: Interpolator,
    saturation_pressure: Interpolator,
    saturation_temp_k: Interpolator,
    water_specific_heat: Interpolator,
    saturated_efficiency: Interpolator,
    superheated_efficiency: Interpolator,
    exhaust_open: Interpolator,
    compression_close: Interpolator,
    admission_open: Interpolator,
    condensation_fraction: Interpolator,
    superheat_limit: Interpolator,
    superheat_temp: Interpolator,
    saturated_initial_ratio: Interpolator,
    saturated_speed_factor: Interpolator,
    superheated_speed_factor: Interpolator,
    cutoff_ratio_upper: Interpolator2D,
    cutoff_ratio_lower: Interpolator2D,
    injector_ratio: Interpolator,
}

impl SteamProperties {
    /// Build and validate every curve.
    pub fn new() -> SteamResult<Self> {
        let p = &t::PRESSURE_PSIG;
        let sat_temp_k = Interpolator::uniform(
            0.0,
            t::SATURATION_PRESSURE_STEP_PSIG,
            &t::SATURATION_TEMP_K,
        )
        .map_err(table("saturation temperature (K)"))?;
        let saturation_pressure = sat_temp_k
            .inverse()
            .map_err(table("saturation pressure"))?;

        Ok(Self {
            steam_density: Interpolator::new(p, &t::STEAM_DENSITY_LB_PER_FT3)
                .map_err(table("steam density"))?,
            water_density: Interpolator::new(p, &t::WATER_DENSITY_LB_PER_FT3)
                .map_err(table("water density"))?,
            steam_heat: Interpolator::new(p, &t::STEAM_HEAT_BTU_PER_LB)
                .map_err(table("steam enthalpy"))?,
            water_heat: Interpolator::new(p, &t::WATER_HEAT_BTU_PER_LB)
                .map_err(table("water enthalpy"))?,
            saturation_temp_f: Interpolator::new(p, &t::SATURATION_TEMP_F)
                .map_err(table("saturation temperature (F)"))?,
            saturation_pressure,
            saturation_temp_k: sat_temp_k,
            water_specific_heat: Interpolator::uniform(
                t::SPECIFIC_HEAT_START_K,
                t::SPECIFIC_HEAT_STEP_K,
                &t::WATER_SPECIFIC_HEAT_KJ_PER_KG_K,
            )
            .map_err(table("water specific heat"))?,
            saturated_efficiency: Interpolator::new(
                &t::GRATE_RATE_LB_PER_FT2_H,
                &t::SATURATED_BOILER_EFFICIENCY,
            )
            .map_err(table("saturated boiler efficiency"))?,
            superheated_efficiency: Interpolator::new(
                &t::GRATE_RATE_LB_PER_FT2_H,
                &t::SUPERHEATED_BOILER_EFFICIENCY,
            )
            .map_err(table("superheated boiler efficiency"))?,
            exhaust_open: Interpolator::new(&t::EVENT_CUTOFF, &t::EVENT_EXHAUST_OPEN)
                .map_err(table("exhaust open"))?,
            compression_close: Interpolator::new(&t::EVENT_CUTOFF, &t::EVENT_COMPRESSION_CLOSE)
                .map_err(table("compression close"))?,
            admission_open: Interpolator::new(&t::EVENT_CUTOFF, &t::EVENT_ADMISSION_OPEN)
                .map_err(table("admission open"))?,
            condensation_fraction: Interpolator::new(
                &t::CONDENSATION_CUTOFF,
                &t::CONDENSATION_FRACTION,
            )
            .map_err(table("cylinder condensation"))?,
            superheat_limit: Interpolator::new(
                &t::CONDENSATION_CUTOFF,
                &t::SUPERHEAT_CONDENSATION_LIMIT_F,
            )
            .map_err(table("superheat condensation limit"))?,
            superheat_temp: Interpolator::uniform(
                0.0,
                t::SUPERHEAT_FLOW_STEP_LB_PER_H,
                &t::SUPERHEAT_TEMP_F,
            )
            .map_err(table("superheat temperature"))?,
            saturated_initial_ratio: Interpolator::uniform(
                0.0,
                t::WHEEL_RPM_STEP,
                &t::SATURATED_INITIAL_PRESSURE_RATIO,
            )
            .map_err(table("saturated initial pressure ratio"))?,
            saturated_speed_factor: Interpolator::uniform(
                0.0,
                t::PISTON_SPEED_STEP_FT_PER_MIN,
                &t::SATURATED_SPEED_FACTOR,
            )
            .map_err(table("saturated speed factor"))?,
            superheated_speed_factor: Interpolator::uniform(
                0.0,
                t::PISTON_SPEED_STEP_FT_PER_MIN,
                &t::SUPERHEATED_SPEED_FACTOR,
            )
            .map_err(table("superheated speed factor"))?,
            cutoff_ratio_upper: cutoff_grid(&t::CUTOFF_RATIO_UPPER)
                .map_err(table("cutoff pressure ratio (upper)"))?,
            cutoff_ratio_lower: cutoff_grid(&t::CUTOFF_RATIO_LOWER)
                .map_err(table("cutoff pressure ratio (lower)"))?,
            injector_ratio: Interpolator::new(
                &t::INJECTOR_PRESSURE_PSIG,
                &t::INJECTOR_WATER_PER_STEAM,
            )
            .map_err(table("injector water/steam ratio"))?,
        })
    }

    /// Build once for sharing between the boiler, engines and consumers.
    pub fn shared() -> SteamResult<Arc<Self>> {
        Ok(Arc::new(Self::new()?))
    }

    // --- saturated steam and water, keyed by boiler pressure (psig) ---

    pub fn steam_density_lb_per_ft3(&self, psig: f64) -> f64 {
        self.steam_density.eval(psig.max(0.0)).max(0.0)
    }

    pub fn water_density_lb_per_ft3(&self, psig: f64) -> f64 {
        self.water_density.eval(psig.max(0.0)).max(0.0)
    }

    pub fn steam_enthalpy_btu_per_lb(&self, psig: f64) -> f64 {
        self.steam_heat.eval_clamped(psig)
    }

    pub fn water_enthalpy_btu_per_lb(&self, psig: f64) -> f64 {
        self.water_heat.eval(psig.max(0.0))
    }

    pub fn saturation_temp_f(&self, psig: f64) -> f64 {
        self.saturation_temp_f.eval(psig.max(0.0))
    }

    pub fn saturation_temp_k(&self, psig: f64) -> f64 {
        self.saturation_temp_k.eval(psig.max(0.0))
    }

    /// Gauge pressure of saturated water at `temp_k`, never negative.
    pub fn saturation_pressure_psig(&self, temp_k: f64) -> f64 {
        self.saturation_pressure.eval(temp_k).max(0.0)
    }

    pub fn water_specific_heat_kj_per_kg_k(&self, temp_k: f64) -> f64 {
        self.water_specific_heat.eval_clamped(temp_k)
    }

    // --- firing ---

    /// Boiler efficiency at a grate combustion rate (lb/ft²/h).
    pub fn boiler_efficiency(&self, grate_rate_lb_per_ft2_h: f64, superheated: bool) -> f64 {
        let curve = if superheated {
            &self.superheated_efficiency
        } else {
            &self.saturated_efficiency
        };
        curve.eval(grate_rate_lb_per_ft2_h.max(0.0)).clamp(0.05, 1.0)
    }

    // --- cylinders ---

    /// Cutoff range covered by the valve-event data.
    pub fn event_cutoff_range(&self) -> (f64, f64) {
        (self.exhaust_open.min_x(), self.exhaust_open.max_x())
    }

    /// Valve events at `cutoff`, with the cutoff clamped to the table range.
    pub fn cycle_events(&self, cutoff: f64) -> CycleEventFractions {
        let (lo, hi) = self.event_cutoff_range();
        let cutoff = sl_core::clamp_finite(cutoff, lo, hi);
        CycleEventFractions {
            cutoff,
            exhaust_open: self.exhaust_open.eval(cutoff).clamp(cutoff, 1.0),
            compression_close: self.compression_close.eval(cutoff).clamp(0.0, 1.0),
            admission_open: self.admission_open.eval(cutoff).clamp(0.0, 1.0),
        }
    }

    pub fn condensation_fraction(&self, cutoff: f64) -> f64 {
        self.condensation_fraction.eval_clamped(cutoff).max(0.0)
    }

    /// Superheat (°F) above which no cylinder condensation occurs.
    pub fn superheat_condensation_limit_f(&self, cutoff: f64) -> f64 {
        self.superheat_limit.eval_clamped(cutoff)
    }

    /// Superheat (°F) delivered at a cylinder steam flow (lb/h).
    pub fn superheat_temp_f(&self, steam_flow_lb_per_h: f64) -> f64 {
        self.superheat_temp.eval_clamped(steam_flow_lb_per_h)
    }

    /// Ratio of cylinder initial pressure to steam chest pressure for a
    /// saturated engine.
    pub fn saturated_initial_pressure_ratio(&self, wheel_rpm: f64) -> f64 {
        self.saturated_initial_ratio.eval_clamped(wheel_rpm.abs())
    }

    /// Ratio of cutoff to initial pressure; `port_opening` in [0, 1] blends
    /// the narrow (0) and wide (1) port curves.
    pub fn cutoff_pressure_ratio(&self, wheel_rpm: f64, cutoff: f64, port_opening: f64) -> f64 {
        let rpm = wheel_rpm.abs();
        let lower = self.cutoff_ratio_lower.eval(rpm, cutoff);
        let upper = self.cutoff_ratio_upper.eval(rpm, cutoff);
        sl_core::lerp(lower, upper, sl_core::clamp_unit(port_opening)).clamp(0.0, 1.0)
    }

    /// Cylinder power factor against piston speed (ft/min).
    pub fn piston_speed_factor(&self, piston_speed_ft_per_min: f64, superheated: bool) -> f64 {
        let curve = if superheated {
            &self.superheated_speed_factor
        } else {
            &self.saturated_speed_factor
        };
        curve.eval_clamped(piston_speed_ft_per_min.abs())
    }

    // --- feedwater ---

    /// Pounds of water delivered per pound of steam by a live steam injector.
    pub fn injector_water_per_steam(&self, psig: f64) -> f64 {
        self.injector_ratio.eval_clamped(psig).max(1.0)
    }
}

fn cutoff_grid(rows: &[[f64; 11]; 8]) -> sl_core::CoreResult<Interpolator2D> {
    let curves = rows
        .iter()
        .map(|row| Interpolator::new(&t::CUTOFF_RATIO_CUTOFF, row))
        .collect::<Result<Vec<_>, _>>()?;
    Interpolator2D::new(&t::CUTOFF_RATIO_RPM, curves)
}
