//! Hysteresis latches and delay timers for protective flags and state
//! machines.

use serde::{Deserialize, Serialize};

/// Which side of the thresholds activates the latch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LatchDirection {
    /// Set when the signal rises above `set`, clear when it falls below `clear`.
    Rising,
    /// Set when the signal falls below `set`, clear when it rises above `clear`.
    Falling,
}

/// Two-threshold flag.
///
/// A `permanent` latch never clears once set (for the lifetime of the run).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HysteresisLatch {
    pub direction: LatchDirection,
    pub set: f64,
    pub clear: f64,
    pub permanent: bool,
    active: bool,
}

impl HysteresisLatch {
    pub fn rising(set: f64, clear: f64) -> Self {
        Self {
            direction: LatchDirection::Rising,
            set,
            clear,
            permanent: false,
            active: false,
        }
    }

    pub fn falling(set: f64, clear: f64) -> Self {
        Self {
            direction: LatchDirection::Falling,
            set,
            clear,
            permanent: false,
            active: false,
        }
    }

    /// Falling latch that stays set once tripped.
    pub fn permanent_below(set: f64) -> Self {
        Self {
            permanent: true,
            ..Self::falling(set, set)
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Force the latch state, e.g. when restoring a snapshot.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Feed a new signal value; returns the latch state afterwards.
    pub fn update(&mut self, value: f64) -> bool {
        if value.is_nan() {
            return self.active;
        }
        let (trip, release) = match self.direction {
            LatchDirection::Rising => (value > self.set, value < self.clear),
            LatchDirection::Falling => (value < self.set, value > self.clear),
        };
        if !self.active && trip {
            self.active = true;
        } else if self.active && release && !self.permanent {
            self.active = false;
        }
        self.active
    }
}

/// Counts time while running; done once `elapsed >= duration`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelayTimer {
    pub duration_s: f64,
    pub elapsed_s: f64,
    pub running: bool,
}

impl DelayTimer {
    pub fn new(duration_s: f64) -> Self {
        Self {
            duration_s: duration_s.max(0.0),
            elapsed_s: 0.0,
            running: false,
        }
    }

    /// Start counting if not already running.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.elapsed_s = 0.0;
        }
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed_s = 0.0;
    }

    /// Advance by `dt` and report whether the delay has elapsed.
    pub fn update(&mut self, dt: f64) -> bool {
        if self.running && dt > 0.0 {
            self.elapsed_s = (self.elapsed_s + dt).min(self.duration_s);
        }
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.running && self.elapsed_s >= self.duration_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rising_latch_has_hysteresis() {
        let mut l = HysteresisLatch::rising(0.91, 0.90);
        assert!(!l.update(0.905));
        assert!(l.update(0.92));
        assert!(l.update(0.905));
        assert!(!l.update(0.899));
    }

    #[test]
    fn falling_latch_has_hysteresis() {
        let mut l = HysteresisLatch::falling(0.05, 0.10);
        assert!(l.update(0.04));
        assert!(l.update(0.08));
        assert!(!l.update(0.11));
    }

    #[test]
    fn permanent_latch_never_clears() {
        let mut l = HysteresisLatch::permanent_below(0.70);
        assert!(!l.update(0.75));
        assert!(l.update(0.69));
        assert!(l.update(0.95));
    }

    #[test]
    fn nan_leaves_latch_alone() {
        let mut l = HysteresisLatch::rising(1.0, 0.5);
        l.update(2.0);
        assert!(l.update(f64::NAN));
    }

    #[test]
    fn timer_completes_after_duration() {
        let mut t = DelayTimer::new(1.0);
        assert!(!t.update(5.0));
        t.start();
        assert!(!t.update(0.6));
        assert!(t.update(0.6));
        t.reset();
        assert!(!t.is_done());
    }

    #[test]
    fn restarting_running_timer_keeps_progress() {
        let mut t = DelayTimer::new(2.0);
        t.start();
        t.update(1.5);
        t.start();
        assert!(t.update(0.5));
    }
}
