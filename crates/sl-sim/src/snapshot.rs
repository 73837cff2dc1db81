//! Flat, serde-derivable snapshot of everything a locomotive carries between
//! ticks.
//!
//! Restoring a snapshot and ticking produces the same outputs as ticking the
//! original. Cached property lookups are re-derived from the restored
//! pressure rather than stored.

use crate::boiler::{BoilerFlows, BoilerState};
use crate::error::{SimError, SimResult};
use crate::firing::FiringState;
use crate::inputs::{ControlInputs, Environment};
use crate::locomotive::SteamLocomotive;
use crate::tender::TenderState;
use serde::{Deserialize, Serialize};
use sl_components::BoilerConditions;
use sl_engine::EngineState;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocomotiveSnapshot {
    pub version: u32,
    pub name: String,
    pub boiler: BoilerState,
    pub firing: FiringState,
    pub tender: TenderState,
    pub engines: Vec<EngineState>,
    pub safety_valves_open: bool,
    pub previous_flows: BoilerFlows,
    /// Control positions applied on the last tick
    pub controls: ControlInputs,
    pub telemetry_elapsed_s: f64,
}

impl SteamLocomotive {
    pub fn snapshot(&self) -> LocomotiveSnapshot {
        LocomotiveSnapshot {
            version: SNAPSHOT_VERSION,
            name: self.name.clone(),
            boiler: self.boiler.clone(),
            firing: self.firebox.state.clone(),
            tender: self.tender,
            engines: self.engines.iter().map(|e| e.state().clone()).collect(),
            safety_valves_open: self.consumers.safety_valves.is_open(),
            previous_flows: self.previous_flows,
            controls: self.last_controls,
            telemetry_elapsed_s: self.telemetry.elapsed_s,
        }
    }

    /// Restore carried state from `snapshot`.
    ///
    /// # Errors
    /// `SnapshotMismatch` if the snapshot was taken from a locomotive with a
    /// different version or engine count. Nothing is modified on error.
    pub fn restore(&mut self, snapshot: LocomotiveSnapshot) -> SimResult<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SimError::SnapshotMismatch {
                what: "unsupported snapshot version",
            });
        }
        if snapshot.engines.len() != self.engines.len() {
            return Err(SimError::SnapshotMismatch {
                what: "engine count differs",
            });
        }
        if snapshot
            .engines
            .iter()
            .zip(&self.engines)
            .any(|(s, e)| s.booster.is_some() != e.state().booster.is_some())
        {
            return Err(SimError::SnapshotMismatch {
                what: "booster engine layout differs",
            });
        }

        self.boiler = snapshot.boiler;
        self.firebox.restore(snapshot.firing);
        self.tender = snapshot.tender;
        for (engine, state) in self.engines.iter_mut().zip(snapshot.engines) {
            engine.restore_state(state);
        }
        self.consumers.safety_valves.set_open(snapshot.safety_valves_open);
        self.consumers.fusible_plug.blown = self.boiler.fusible_plug_blown();
        self.previous_flows = snapshot.previous_flows;
        self.last_controls = snapshot.controls;
        self.telemetry.elapsed_s = snapshot.telemetry_elapsed_s;

        self.conditions = BoilerConditions::at_pressure(
            &self.props,
            self.boiler.pressure_psig,
            self.boiler_config.max_pressure_psig,
            Environment::default().outside_temp_f,
        );
        self.outputs = self.static_outputs();
        tracing::debug!(
            name = %self.name,
            pressure_psig = self.boiler.pressure_psig,
            "snapshot restored"
        );
        Ok(())
    }
}
