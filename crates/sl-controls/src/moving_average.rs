//! Fixed-length circular moving average.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Rolling mean of the last `capacity` samples.
///
/// Until the buffer fills, the mean covers only the samples seen so far.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovingAverage {
    samples: Vec<f64>,
    capacity: usize,
    next: usize,
    sum: f64,
}

impl MovingAverage {
    pub fn new(capacity: usize) -> ControlResult<Self> {
        if capacity == 0 {
            return Err(ControlError::InvalidArg {
                what: "moving average capacity must be positive",
            });
        }
        Ok(Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            next: 0,
            sum: 0.0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Add a sample and return the updated mean.
    pub fn push(&mut self, value: f64) -> f64 {
        let value = if value.is_finite() { value } else { 0.0 };
        if self.samples.len() < self.capacity {
            self.samples.push(value);
        } else {
            self.sum -= self.samples[self.next];
            self.samples[self.next] = value;
        }
        self.sum += value;
        self.next = (self.next + 1) % self.capacity;
        // Resum once per wrap to bound rounding drift.
        if self.next == 0 {
            self.sum = self.samples.iter().sum();
        }
        self.average()
    }

    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum / self.samples.len() as f64
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.next = 0;
        self.sum = 0.0;
    }
}
