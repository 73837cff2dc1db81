//! Property tests for the signal conditioning primitives.

use proptest::prelude::*;
use sl_controls::{FirstOrderLag, HysteresisLatch, LagState, MovingAverage};

proptest! {
    #[test]
    fn moving_average_matches_window_mean(
        samples in prop::collection::vec(-1.0e4f64..1.0e4, 1..200),
        capacity in 1usize..50,
    ) {
        let mut avg = MovingAverage::new(capacity).unwrap();
        let mut last = 0.0;
        for s in &samples {
            last = avg.push(*s);
        }
        let window = &samples[samples.len().saturating_sub(capacity)..];
        let expected = window.iter().sum::<f64>() / window.len() as f64;
        prop_assert!((last - expected).abs() < 1e-6, "{} vs {}", last, expected);
    }

    #[test]
    fn lag_moves_toward_input_without_overshoot(
        start in -100.0f64..100.0,
        input in -100.0f64..100.0,
        tau in 0.1f64..60.0,
        dt in 0.0f64..10.0,
    ) {
        let lag = FirstOrderLag::new(tau).unwrap();
        let next = lag.step(LagState { value: start }, dt, input);
        let (lo, hi) = if start <= input { (start, input) } else { (input, start) };
        prop_assert!(next.value >= lo - 1e-9 && next.value <= hi + 1e-9);
    }
}

#[test]
fn rising_latch_needs_to_fall_below_clear_level() {
    let mut latch = HysteresisLatch::rising(0.91, 0.90);
    assert!(!latch.update(0.905));
    assert!(latch.update(0.915));
    assert!(latch.update(0.905));
    assert!(!latch.update(0.895));
}
