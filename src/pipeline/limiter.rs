//! Minute-bucket admission control for backend calls.
//!
//! Free-tier LLM quotas are expressed as requests per minute, so the limiter
//! mirrors that exactly: a fixed-window counter keyed by the wall-clock
//! minute. It deliberately is not a sliding window — near a minute boundary
//! it can admit up to 2× quota across two adjacent windows, which matches
//! how the backends meter.
//!
//! The transition logic is a pure function of `(state, now)` so tests can
//! drive it with a fake clock and never sleep. Only [`RateLimiter::admit`]
//! touches real time, and only through the injected [`Clock`].
//!
//! Strictly in-process: no coordination across processes, one sequential
//! caller assumed.

use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Source of "seconds since some fixed epoch". Injected so limiter tests
/// run without real time passing.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

/// Production clock backed by `SystemTime`.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The call may go out now; the window counter was incremented.
    Proceed,
    /// The window is saturated; wait this long, then check again.
    Wait(Duration),
}

/// Fixed-window counter bounding backend calls per wall-clock minute.
///
/// Owned by the pipeline run — never shared, never global — so independent
/// runs (and tests) cannot contaminate each other's windows.
#[derive(Debug)]
pub struct RateLimiter {
    quota: u32,
    bucket: u64,
    count: u32,
}

impl RateLimiter {
    pub fn new(quota: u32) -> Self {
        Self {
            quota: quota.max(1),
            bucket: 0,
            count: 0,
        }
    }

    /// Pure admission transition.
    ///
    /// A minute rollover always resets the window before the quota check, so
    /// saturation never outlives its minute. On `Proceed` the admission is
    /// already counted.
    pub fn check(&mut self, now_secs: u64) -> Admission {
        let minute = now_secs / 60;
        if self.bucket != minute {
            self.bucket = minute;
            self.count = 0;
        }

        if self.count >= self.quota {
            // Sleep one second past the boundary, matching how the backends
            // round their own windows.
            let until_next_minute = 60 - (now_secs % 60) + 1;
            return Admission::Wait(Duration::from_secs(until_next_minute));
        }

        self.count += 1;
        Admission::Proceed
    }

    /// Admit one backend call, sleeping through saturated windows.
    ///
    /// This is a blocking wait by design: no timeout, no cancellation point.
    /// With a sequential caller at most one sleep is ever pending.
    pub async fn admit(&mut self, clock: &dyn Clock) {
        loop {
            match self.check(clock.now_secs()) {
                Admission::Proceed => return,
                Admission::Wait(wait) => {
                    debug!(
                        "Rate window saturated ({}/min), sleeping {:?}",
                        self.quota, wait
                    );
                    sleep(wait).await;
                }
            }
        }
    }

    /// Admissions counted in the current window. Exposed for stats and tests.
    pub fn admitted_this_minute(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Test clock advanced manually by each test.
    struct FakeClock(AtomicU64);

    impl FakeClock {
        fn at(secs: u64) -> Self {
            Self(AtomicU64::new(secs))
        }

        fn advance(&self, secs: u64) {
            self.0.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for FakeClock {
        fn now_secs(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn admits_up_to_quota_within_one_minute() {
        let mut limiter = RateLimiter::new(3);
        for _ in 0..3 {
            assert_eq!(limiter.check(120), Admission::Proceed);
        }
        assert!(matches!(limiter.check(130), Admission::Wait(_)));
        assert_eq!(limiter.admitted_this_minute(), 3);
    }

    #[test]
    fn wait_runs_to_just_past_the_minute_boundary() {
        let mut limiter = RateLimiter::new(1);
        assert_eq!(limiter.check(125), Admission::Proceed);
        // 125s → next boundary at 180s, plus the one-second cushion.
        assert_eq!(
            limiter.check(130),
            Admission::Wait(Duration::from_secs(51))
        );
    }

    #[test]
    fn minute_rollover_resets_the_counter_first() {
        let mut limiter = RateLimiter::new(2);
        assert_eq!(limiter.check(59), Admission::Proceed);
        assert_eq!(limiter.check(59), Admission::Proceed);
        assert!(matches!(limiter.check(59), Admission::Wait(_)));

        // One second later the window has rolled; saturation is gone.
        assert_eq!(limiter.check(60), Admission::Proceed);
        assert_eq!(limiter.admitted_this_minute(), 1);
    }

    #[test]
    fn quota_zero_is_clamped_to_one() {
        let mut limiter = RateLimiter::new(0);
        assert_eq!(limiter.check(0), Admission::Proceed);
        assert!(matches!(limiter.check(0), Admission::Wait(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn admit_proceeds_without_sleep_after_rollover() {
        let clock = FakeClock::at(30);
        let mut limiter = RateLimiter::new(1);

        limiter.admit(&clock).await;
        assert_eq!(limiter.admitted_this_minute(), 1);

        // The window is saturated, but the wall clock has moved past the
        // boundary by the time the next call arrives: no sleep happens.
        clock.advance(31);
        limiter.admit(&clock).await;
        assert_eq!(limiter.admitted_this_minute(), 1);
    }
}
