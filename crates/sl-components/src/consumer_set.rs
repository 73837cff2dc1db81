//! Aggregation of every consumer attached to one boiler.

use crate::auxiliary::{AuxiliaryKind, Blower, EngineDraw, FixedAuxiliary};
use crate::feedwater::{Injector, MotionPump};
use crate::orifice::{CylinderCocks, FusiblePlugVent};
use crate::safety_valve::SafetyValves;
use crate::traits::{BoilerConditions, ConsumerKind, SteamConsumer, SteamDraw};
use serde::{Deserialize, Serialize};

/// Steam usage per consumer for one tick (lb/s).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SteamUsageBreakdown {
    pub cylinders: f64,
    pub booster: f64,
    pub safety_valves: f64,
    pub injectors: f64,
    pub blower: f64,
    pub cylinder_cocks: f64,
    pub compressor: f64,
    pub generator: f64,
    pub ejectors: f64,
    pub stoker: f64,
    pub fusible_plug: f64,
    /// Feedwater entering the boiler, net of returned injector steam.
    pub feedwater_in: f64,
    pub total_steam: f64,
}

impl SteamUsageBreakdown {
    fn record(&mut self, kind: ConsumerKind, draw: &SteamDraw) {
        let steam = draw.steam_lb_per_s;
        match kind {
            ConsumerKind::Cylinders => self.cylinders += steam,
            ConsumerKind::Booster => self.booster += steam,
            ConsumerKind::SafetyValves => self.safety_valves += steam,
            ConsumerKind::Injector => self.injectors += steam,
            // Driven off the motion: no steam, its water lands in `feedwater_in`.
            ConsumerKind::MotionPump => {}
            ConsumerKind::Blower => self.blower += steam,
            ConsumerKind::CylinderCocks => self.cylinder_cocks += steam,
            ConsumerKind::Compressor => self.compressor += steam,
            ConsumerKind::Generator => self.generator += steam,
            ConsumerKind::LargeEjector | ConsumerKind::SmallEjector => self.ejectors += steam,
            ConsumerKind::Stoker => self.stoker += steam,
            ConsumerKind::FusiblePlug => self.fusible_plug += steam,
        }
        self.feedwater_in += draw.net_mass_lb_per_s().max(0.0);
        if draw.net_mass_lb_per_s() < 0.0 {
            self.total_steam += -draw.net_mass_lb_per_s();
        }
    }
}

/// Every consumer on the boiler, owned for the locomotive lifetime.
#[derive(Clone, Debug)]
pub struct SteamConsumerSet {
    pub engines: Vec<EngineDraw>,
    pub safety_valves: SafetyValves,
    pub injectors: Vec<Injector>,
    pub motion_pump: Option<MotionPump>,
    pub blower: Blower,
    pub cylinder_cocks: CylinderCocks,
    pub auxiliaries: Vec<FixedAuxiliary>,
    pub fusible_plug: FusiblePlugVent,
}

impl SteamConsumerSet {
    pub fn consumers(&self) -> Vec<&dyn SteamConsumer> {
        let mut all: Vec<&dyn SteamConsumer> = Vec::with_capacity(16);
        all.extend(self.engines.iter().map(|e| e as &dyn SteamConsumer));
        all.push(&self.safety_valves);
        all.extend(self.injectors.iter().map(|i| i as &dyn SteamConsumer));
        if let Some(pump) = &self.motion_pump {
            all.push(pump);
        }
        all.push(&self.blower);
        all.push(&self.cylinder_cocks);
        all.extend(self.auxiliaries.iter().map(|a| a as &dyn SteamConsumer));
        all.push(&self.fusible_plug);
        all
    }

    pub fn auxiliary_mut(&mut self, kind: AuxiliaryKind) -> Option<&mut FixedAuxiliary> {
        self.auxiliaries.iter_mut().find(|a| a.kind == kind)
    }

    /// Sum of all draws plus the per-consumer breakdown.
    pub fn draw_all(&self, conditions: &BoilerConditions) -> (SteamDraw, SteamUsageBreakdown) {
        let mut total = SteamDraw::ZERO;
        let mut breakdown = SteamUsageBreakdown::default();
        for consumer in self.consumers() {
            let draw = consumer.draw(conditions);
            breakdown.record(consumer.kind(), &draw);
            total = total + draw;
        }
        (total, breakdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_steam::SteamProperties;

    fn set() -> SteamConsumerSet {
        SteamConsumerSet {
            engines: vec![EngineDraw::main("main")],
            safety_valves: SafetyValves::new(200.0, 6.0).unwrap(),
            injectors: vec![
                Injector::new("injector 1", 4.0).unwrap(),
                Injector::new("injector 2", 4.0).unwrap(),
            ],
            motion_pump: None,
            blower: Blower::new(0.5).unwrap(),
            cylinder_cocks: CylinderCocks::new(0.5, 2).unwrap(),
            auxiliaries: vec![
                FixedAuxiliary::new(AuxiliaryKind::Compressor, 0.03).unwrap(),
                FixedAuxiliary::new(AuxiliaryKind::Generator, 0.01).unwrap(),
            ],
            fusible_plug: FusiblePlugVent::new(0.75).unwrap(),
        }
    }

    fn conditions() -> BoilerConditions {
        let props = SteamProperties::new().unwrap();
        BoilerConditions::at_pressure(&props, 200.0, 200.0, 60.0)
    }

    #[test]
    fn idle_set_draws_nothing() {
        let (total, breakdown) = set().draw_all(&conditions());
        assert_eq!(total, SteamDraw::ZERO);
        assert_eq!(breakdown.total_steam, 0.0);
    }

    #[test]
    fn breakdown_sums_to_total() {
        let mut s = set();
        s.engines[0].usage_lb_per_s = 3.0;
        s.blower.setting = 1.0;
        s.injectors[0].setting = 1.0;
        if let Some(c) = s.auxiliary_mut(AuxiliaryKind::Compressor) {
            c.on = true;
        }
        let (total, b) = s.draw_all(&conditions());
        assert_eq!(b.cylinders, 3.0);
        assert!((b.blower - 0.5).abs() < 1e-12);
        assert!((b.compressor - 0.03).abs() < 1e-12);
        assert!(b.injectors > 0.0);
        assert!((b.feedwater_in - 4.0).abs() < 1e-9);
        assert!((b.total_steam - (3.0 + 0.5 + 0.03)).abs() < 1e-9);
        assert!((total.net_mass_lb_per_s() - (b.feedwater_in - b.total_steam)).abs() < 1e-9);
    }

    #[test]
    fn motion_pump_feeds_water_without_steam() {
        let mut s = set();
        let mut pump = MotionPump::new(3.0, 10.0).unwrap();
        pump.setting = 1.0;
        pump.speed_mps = 5.0;
        s.motion_pump = Some(pump);
        let (total, b) = s.draw_all(&conditions());
        assert!((b.feedwater_in - 1.5).abs() < 1e-9);
        assert_eq!(b.total_steam, 0.0);
        assert_eq!(total.steam_lb_per_s, 0.0);
        assert!(total.heat_btu_per_s > 0.0);
    }
}
