/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

const BACKOFF_DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(200);
const BACKOFF_DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);
const BACKOFF_DEFAULT_MAX_ATTEMPTS: u32 = 30;
const BACKOFF_DEFAULT_JITTER: f64 = 0.2;

/// Retry delay policy for failed cache refreshes.
///
/// `next_delay` maps a 1-based attempt number to the delay to wait before
/// that attempt, or `None` once retrying should stop.
#[derive(Clone, Debug, PartialEq)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    max_attempts: u32,
    jitter: f64,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        ExponentialBackoff {
            initial_delay: BACKOFF_DEFAULT_INITIAL_DELAY,
            max_delay: BACKOFF_DEFAULT_MAX_DELAY,
            multiplier: 2.0,
            max_attempts: BACKOFF_DEFAULT_MAX_ATTEMPTS,
            jitter: BACKOFF_DEFAULT_JITTER,
        }
    }
}

impl ExponentialBackoff {
    pub fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        ExponentialBackoff {
            initial_delay,
            max_delay,
            ..Default::default()
        }
    }

    pub fn set_multiplier(&mut self, multiplier: f64) {
        self.multiplier = multiplier.max(1.0);
    }

    pub fn set_max_attempts(&mut self, count: u32) {
        self.max_attempts = count;
    }

    /// Jitter ratio in [0.0, 1.0]. With 0.0 the delay sequence is fully
    /// deterministic.
    pub fn set_jitter(&mut self, ratio: f64) {
        self.jitter = ratio.clamp(0.0, 1.0);
    }

    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt < 1 || attempt > self.max_attempts {
            return None;
        }
        // large exponents saturate to inf and get capped by max_delay
        let exponent = attempt.saturating_sub(1).min(1024) as i32;
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let mut delay = base.min(self.max_delay.as_secs_f64());
        if self.jitter > 0.0 {
            let rand = fastrand::f64() * 2.0 - 1.0;
            delay += delay * self.jitter * rand;
        }
        Some(Duration::from_secs_f64(delay.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_sequence() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_millis(200), Duration::from_secs(1));
        backoff.set_jitter(0.0);
        backoff.set_max_attempts(5);

        assert_eq!(backoff.next_delay(1), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_delay(2), Some(Duration::from_millis(400)));
        assert_eq!(backoff.next_delay(3), Some(Duration::from_millis(800)));
        assert_eq!(backoff.next_delay(4), Some(Duration::from_secs(1)));
        assert_eq!(backoff.next_delay(5), Some(Duration::from_secs(1)));
        assert_eq!(backoff.next_delay(6), None);
    }

    #[test]
    fn attempt_zero_stops() {
        let backoff = ExponentialBackoff::default();
        assert_eq!(backoff.next_delay(0), None);
    }

    #[test]
    fn jitter_stays_bounded() {
        let mut exact = ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(60));
        exact.set_jitter(0.0);
        let mut jittered = exact.clone();
        jittered.set_jitter(0.5);
        for attempt in 1..=10 {
            let base = exact.next_delay(attempt).unwrap();
            let delay = jittered.next_delay(attempt).unwrap();
            assert!(delay >= base.mul_f64(0.5));
            assert!(delay <= base.mul_f64(1.5));
        }
    }
}
