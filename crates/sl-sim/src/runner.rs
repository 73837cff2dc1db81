//! Fixed-step runs with held inputs and decimated recording.

use crate::error::{SimError, SimResult};
use crate::inputs::{ControlInputs, Environment};
use crate::locomotive::SteamLocomotive;
use crate::outputs::TickOutputs;

/// Options for a fixed-step run.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Tick length (seconds)
    pub dt: f64,
    /// Run length (seconds)
    pub t_end: f64,
    /// Maximum number of ticks (safety limit)
    pub max_steps: usize,
    /// Record every N-th tick
    pub record_every: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dt: 0.1,
            t_end: 60.0,
            max_steps: 1_000_000,
            record_every: 10,
        }
    }
}

/// Recorded outputs of a run.
#[derive(Clone, Debug, Default)]
pub struct RunRecord {
    /// Time points (seconds)
    pub t: Vec<f64>,
    pub outputs: Vec<TickOutputs>,
}

impl RunRecord {
    pub fn last(&self) -> Option<&TickOutputs> {
        self.outputs.last()
    }
}

/// Tick `loco` with constant inputs until `t_end`.
///
/// # Errors
/// Non-positive `dt`, negative `t_end`, or zero step/record limits.
pub fn run_fixed(
    loco: &mut SteamLocomotive,
    controls: &ControlInputs,
    env: &Environment,
    opts: &RunOptions,
) -> SimResult<RunRecord> {
    if !(opts.dt > 0.0 && opts.dt.is_finite()) {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    if !(opts.t_end >= 0.0) {
        return Err(SimError::InvalidArg {
            what: "t_end must be non-negative",
        });
    }
    if opts.max_steps == 0 || opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "max_steps and record_every must be positive",
        });
    }

    let mut record = RunRecord::default();
    let mut t = 0.0;
    let mut step = 0;
    while t < opts.t_end && step < opts.max_steps {
        let out = loco.update(opts.dt, controls, env);
        t += opts.dt;
        step += 1;
        if step % opts.record_every == 0 {
            record.t.push(t);
            record.outputs.push(out.clone());
        }
    }
    if step % opts.record_every != 0 {
        record.t.push(t);
        record.outputs.push(loco.outputs().clone());
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_options_defaults() {
        let opts = RunOptions::default();
        assert_eq!(opts.dt, 0.1);
        assert_eq!(opts.record_every, 10);
        assert!(opts.max_steps > 0);
    }
}
