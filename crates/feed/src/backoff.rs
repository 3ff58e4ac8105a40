//! Reconnect backoff policy.
//!
//! Exponential with additive jitter:
//! `delay = min(base * 2^min(attempt, 10), max) + delay * jitter * U[0,1)`.
//! The attempt counter resets on a successful subscribe, so a healthy
//! connection always restarts the ladder from the base delay.

use std::time::Duration;

use rand::Rng;

pub struct ReconnectBackoff {
    base: Duration,
    max: Duration,
    jitter_factor: f64,
    attempt: u32,
}

impl ReconnectBackoff {
    #[must_use]
    pub const fn new(base: Duration, max: Duration, jitter_factor: f64) -> Self {
        Self {
            base,
            max,
            jitter_factor,
            attempt: 0,
        }
    }

    /// Delay before the next reconnect attempt; increments the counter.
    pub fn next_delay(&mut self) -> Duration {
        let deterministic = backoff_delay(self.base, self.max, self.attempt);
        self.attempt = self.attempt.saturating_add(1);

        if self.jitter_factor <= 0.0 {
            return deterministic;
        }
        let jitter = deterministic.mul_f64(self.jitter_factor * rand::thread_rng().gen::<f64>());
        deterministic + jitter
    }

    /// Called after a successful subscribe.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }
}

/// The deterministic part of the policy: `min(base * 2^min(attempt, 10), max)`.
/// The exponent saturates at 10 so the shift can never overflow; the clamp
/// is on the delay, not the attempt counter.
#[must_use]
pub fn backoff_delay(base: Duration, max: Duration, attempt: u32) -> Duration {
    let exponent = attempt.min(10);
    let multiplier = 1u64 << exponent;
    base.checked_mul(u32::try_from(multiplier).unwrap_or(u32::MAX))
        .map_or(max, |d| d.min(max))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_millis(1000);
    const MAX: Duration = Duration::from_millis(30000);

    #[test]
    fn delays_double_until_the_cap() {
        let expected_ms = [
            1000, 2000, 4000, 8000, 16000, 30000, 30000, 30000, 30000, 30000, 30000, 30000,
        ];
        for (attempt, expected) in expected_ms.iter().enumerate() {
            let delay = backoff_delay(BASE, MAX, attempt as u32);
            assert_eq!(
                delay,
                Duration::from_millis(*expected),
                "attempt {attempt}"
            );
        }
    }

    #[test]
    fn delay_saturates_at_max_not_at_attempt() {
        // Far beyond the exponent saturation point the delay stays clamped.
        assert_eq!(backoff_delay(BASE, MAX, 100), MAX);
        assert_eq!(backoff_delay(BASE, MAX, u32::MAX), MAX);
    }

    #[test]
    fn zero_jitter_is_fully_deterministic() {
        let mut backoff = ReconnectBackoff::new(BASE, MAX, 0.0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
        assert_eq!(backoff.next_delay(), Duration::from_millis(2000));
        assert_eq!(backoff.next_delay(), Duration::from_millis(4000));
    }

    #[test]
    fn jitter_is_additive_and_bounded() {
        let mut backoff = ReconnectBackoff::new(BASE, MAX, 0.5);
        for _ in 0..50 {
            backoff.reset();
            let delay = backoff.next_delay();
            assert!(delay >= BASE);
            assert!(delay < BASE + BASE.mul_f64(0.5));
        }
    }

    #[test]
    fn reset_restarts_the_ladder() {
        let mut backoff = ReconnectBackoff::new(BASE, MAX, 0.0);
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.attempt(), 2);

        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
    }
}
