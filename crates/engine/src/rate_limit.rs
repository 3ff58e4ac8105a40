//! Per-trader sliding-window rate limiter.
//!
//! Each trader gets a window of their recent trade timestamps. A trade is
//! admitted while the trailing 60 seconds hold fewer than the configured
//! maximum; timestamps strictly older than the window are pruned on every
//! admission check.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};

pub struct TraderRateLimiter {
    max_per_minute: usize,
    windows: HashMap<String, VecDeque<DateTime<Utc>>>,
}

impl TraderRateLimiter {
    #[must_use]
    pub fn new(max_per_minute: usize) -> Self {
        Self {
            max_per_minute: max_per_minute.max(1),
            windows: HashMap::new(),
        }
    }

    /// Returns true and records `now` when the trader is under the cap.
    pub fn admit(&mut self, trader: &str, now: DateTime<Utc>) -> bool {
        let window = self.windows.entry(trader.to_string()).or_default();

        let cutoff = now - Duration::seconds(60);
        while window.front().is_some_and(|&t| t < cutoff) {
            window.pop_front();
        }

        if window.len() >= self.max_per_minute {
            return false;
        }
        window.push_back(now);
        true
    }

    #[must_use]
    pub fn tracked_traders(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn admits_up_to_the_cap_then_rejects() {
        let mut limiter = TraderRateLimiter::new(2);

        assert!(limiter.admit("trader-1", t0()));
        assert!(limiter.admit("trader-1", t0() + Duration::milliseconds(1)));
        assert!(!limiter.admit("trader-1", t0() + Duration::milliseconds(2)));
    }

    #[test]
    fn traders_are_limited_independently() {
        let mut limiter = TraderRateLimiter::new(1);

        assert!(limiter.admit("trader-1", t0()));
        assert!(limiter.admit("trader-2", t0()));
        assert!(!limiter.admit("trader-1", t0() + Duration::milliseconds(1)));
        assert_eq!(limiter.tracked_traders(), 2);
    }

    #[test]
    fn admission_reopens_when_the_oldest_ages_out() {
        let mut limiter = TraderRateLimiter::new(2);
        limiter.admit("trader-1", t0());
        limiter.admit("trader-1", t0() + Duration::seconds(30));

        // At exactly 60s the first timestamp is not yet "older than 60s".
        assert!(!limiter.admit("trader-1", t0() + Duration::seconds(60)));

        // One tick past 60s it ages out and frees a slot.
        assert!(limiter.admit(
            "trader-1",
            t0() + Duration::seconds(60) + Duration::milliseconds(1)
        ));
    }

    #[test]
    fn rejected_attempts_do_not_consume_slots() {
        let mut limiter = TraderRateLimiter::new(1);
        limiter.admit("trader-1", t0());

        for ms in 1..5 {
            assert!(!limiter.admit("trader-1", t0() + Duration::milliseconds(ms)));
        }

        // The single held slot still ages out on schedule.
        assert!(limiter.admit("trader-1", t0() + Duration::seconds(61)));
    }
}
