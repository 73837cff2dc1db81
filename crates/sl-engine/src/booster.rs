//! Booster engine state machine.
//!
//! ```text
//! Disengaged ──engage & air──▶ Idle ──soak done & ready──▶ RunDisengaged
//!                                                           │   ▲
//!                                        sync done & ready  ▼   │ not ready
//!                                                         RunEngaged
//! ```
//!
//! Readiness is re-evaluated every tick from the latch request, the main
//! reverser cutoff and road speed; it does not hold once a condition fails.
//! Releasing the engage switch or losing air returns to `Disengaged` from
//! any state and resets both timers.

use serde::{Deserialize, Serialize};
use sl_controls::DelayTimer;

pub const DEFAULT_HEAT_SOAK_S: f64 = 120.0;
pub const DEFAULT_GEAR_SYNC_S: f64 = 5.0;
/// Main reverser cutoff at or above which the booster may latch.
pub const DEFAULT_THROTTLE_CUTOFF: f64 = 0.3;
/// Road speed above which the booster drops out (m/s).
pub const DEFAULT_CUT_OUT_SPEED_MPS: f64 = 9.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoosterState {
    #[default]
    Disengaged,
    /// Warming through with idle steam
    Idle,
    /// Ready and turning, gears not yet meshed
    RunDisengaged,
    /// Gears meshed and driving
    RunEngaged,
}

impl BoosterState {
    /// Whether idle steam is drawn to keep the engine warm.
    pub fn draws_idle_steam(self) -> bool {
        matches!(self, BoosterState::Idle | BoosterState::RunDisengaged)
    }

    pub fn is_driving(self) -> bool {
        self == BoosterState::RunEngaged
    }
}

/// Driver and locomotive inputs to the booster.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoosterCommand {
    /// Booster engage (idle) switch
    pub engage: bool,
    /// Booster latch / ready request
    pub latch: bool,
    pub air_available: bool,
    /// Main engine reverser cutoff magnitude
    pub main_cutoff: f64,
    pub speed_mps: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoosterController {
    pub state: BoosterState,
    pub heat_soak: DelayTimer,
    pub gear_sync: DelayTimer,
    pub throttle_cutoff: f64,
    pub cut_out_speed_mps: f64,
    ready: bool,
}

impl Default for BoosterController {
    fn default() -> Self {
        Self::new(DEFAULT_HEAT_SOAK_S, DEFAULT_GEAR_SYNC_S)
    }
}

impl BoosterController {
    pub fn new(heat_soak_s: f64, gear_sync_s: f64) -> Self {
        Self {
            state: BoosterState::Disengaged,
            heat_soak: DelayTimer::new(heat_soak_s),
            gear_sync: DelayTimer::new(gear_sync_s),
            throttle_cutoff: DEFAULT_THROTTLE_CUTOFF,
            cut_out_speed_mps: DEFAULT_CUT_OUT_SPEED_MPS,
            ready: false,
        }
    }

    /// Whether the latch request and its gating conditions held on the last update.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Advance the state machine by `dt` seconds.
    pub fn update(&mut self, cmd: &BoosterCommand, dt: f64) -> BoosterState {
        if !cmd.engage || !cmd.air_available {
            if self.state != BoosterState::Disengaged {
                tracing::debug!(from = ?self.state, "booster disengaged");
            }
            self.state = BoosterState::Disengaged;
            self.ready = false;
            self.heat_soak.reset();
            self.gear_sync.reset();
            return self.state;
        }

        self.ready = cmd.latch
            && cmd.main_cutoff.abs() >= self.throttle_cutoff
            && cmd.speed_mps.abs() <= self.cut_out_speed_mps;

        let next = match self.state {
            BoosterState::Disengaged => {
                self.heat_soak.start();
                BoosterState::Idle
            }
            BoosterState::Idle => {
                let soaked = self.heat_soak.update(dt);
                if soaked && self.ready {
                    self.gear_sync.start();
                    BoosterState::RunDisengaged
                } else {
                    BoosterState::Idle
                }
            }
            BoosterState::RunDisengaged => {
                if !self.ready {
                    self.gear_sync.reset();
                    BoosterState::RunDisengaged
                } else {
                    self.gear_sync.start();
                    if self.gear_sync.update(dt) {
                        BoosterState::RunEngaged
                    } else {
                        BoosterState::RunDisengaged
                    }
                }
            }
            BoosterState::RunEngaged => {
                if self.ready {
                    BoosterState::RunEngaged
                } else {
                    self.gear_sync.reset();
                    BoosterState::RunDisengaged
                }
            }
        };
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "booster transition");
        }
        self.state = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(latch: bool) -> BoosterCommand {
        BoosterCommand {
            engage: true,
            latch,
            air_available: true,
            main_cutoff: 0.6,
            speed_mps: 2.0,
        }
    }

    #[test]
    fn walks_through_every_state() {
        let mut b = BoosterController::new(10.0, 2.0);
        assert_eq!(b.update(&command(true), 1.0), BoosterState::Idle);
        for _ in 0..9 {
            assert_eq!(b.update(&command(true), 1.0), BoosterState::Idle);
        }
        assert_eq!(b.update(&command(true), 1.0), BoosterState::RunDisengaged);
        assert_eq!(b.update(&command(true), 1.0), BoosterState::RunDisengaged);
        assert_eq!(b.update(&command(true), 1.0), BoosterState::RunEngaged);
    }

    #[test]
    fn dropped_latch_steps_back_once() {
        let mut b = BoosterController::new(0.0, 0.0);
        b.update(&command(true), 1.0);
        b.update(&command(true), 1.0);
        assert_eq!(b.update(&command(true), 1.0), BoosterState::RunEngaged);
        assert_eq!(b.update(&command(false), 1.0), BoosterState::RunDisengaged);
        assert_eq!(b.update(&command(false), 1.0), BoosterState::RunDisengaged);
    }

    #[test]
    fn short_cutoff_prevents_latch() {
        let mut b = BoosterController::new(0.0, 0.0);
        let mut cmd = command(true);
        cmd.main_cutoff = 0.2;
        b.update(&cmd, 1.0);
        assert_eq!(b.update(&cmd, 1.0), BoosterState::Idle);
        assert!(!b.is_ready());
    }

    #[test]
    fn readiness_drops_as_soon_as_speed_exceeds_cut_out() {
        let mut b = BoosterController::new(0.0, 0.0);
        b.update(&command(true), 1.0);
        b.update(&command(true), 1.0);
        assert_eq!(b.update(&command(true), 1.0), BoosterState::RunEngaged);
        assert!(b.is_ready());

        let mut fast = command(true);
        fast.speed_mps = DEFAULT_CUT_OUT_SPEED_MPS + 1.0;
        assert_eq!(b.update(&fast, 1.0), BoosterState::RunDisengaged);
        assert!(!b.is_ready());

        // Back under the cut-out speed with the request still held.
        b.update(&command(true), 1.0);
        assert!(b.is_ready());
        assert_eq!(b.state, BoosterState::RunEngaged);
    }

    #[test]
    fn losing_air_disengages() {
        let mut b = BoosterController::new(0.0, 0.0);
        b.update(&command(true), 1.0);
        let mut cmd = command(true);
        cmd.air_available = false;
        assert_eq!(b.update(&cmd, 1.0), BoosterState::Disengaged);
        assert!(!b.heat_soak.running);
        assert!(!b.is_ready());
    }
}
