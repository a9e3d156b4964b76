//! Skip-if-recently-updated guard.
//!
//! Two schedules can fire close together. Before doing any work the
//! orchestrator asks when the mode's directory last changed; if that is
//! within the threshold the run ends as `Skipped`. The check is best effort
//! and not atomic: two runs may both pass it, which only costs a redundant,
//! idempotent sync.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Default minimum age of the last change before a new run proceeds.
pub const DEFAULT_FRESHNESS_THRESHOLD: Duration = Duration::from_secs(10 * 60);

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Guard outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The guard is switched off.
    Disabled,
    /// No change has been recorded; proceed.
    Unknown,
    /// Changed `age` ago, within the threshold; skip.
    Recent { age: Duration },
    /// Changed `age` ago, beyond the threshold; proceed.
    Stale { age: Duration },
}

impl Freshness {
    pub fn should_skip(&self) -> bool {
        matches!(self, Freshness::Recent { .. })
    }
}

/// Compares the last change time against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessGuard {
    threshold: Duration,
}

impl Default for FreshnessGuard {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS_THRESHOLD)
    }
}

impl FreshnessGuard {
    /// A zero threshold disables the guard.
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn is_enabled(&self) -> bool {
        !self.threshold.is_zero()
    }

    /// Classify a last-change time relative to `now`.
    ///
    /// A change dated in the future (clock skew) counts as zero age.
    pub fn evaluate(&self, now: DateTime<Utc>, last_change: Option<DateTime<Utc>>) -> Freshness {
        if !self.is_enabled() {
            return Freshness::Disabled;
        }
        let Some(last_change) = last_change else {
            return Freshness::Unknown;
        };

        let age = (now - last_change).to_std().unwrap_or(Duration::ZERO);
        if age < self.threshold {
            Freshness::Recent { age }
        } else {
            Freshness::Stale { age }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_recent_change_skips() {
        let guard = FreshnessGuard::new(Duration::from_secs(600));
        let result = guard.evaluate(at(12, 5), Some(at(12, 0)));
        assert_eq!(
            result,
            Freshness::Recent {
                age: Duration::from_secs(300)
            }
        );
        assert!(result.should_skip());
    }

    #[test]
    fn test_old_change_proceeds() {
        let guard = FreshnessGuard::new(Duration::from_secs(600));
        let result = guard.evaluate(at(13, 0), Some(at(12, 0)));
        assert!(!result.should_skip());
        assert!(matches!(result, Freshness::Stale { .. }));
    }

    #[test]
    fn test_exact_threshold_proceeds() {
        let guard = FreshnessGuard::new(Duration::from_secs(600));
        assert!(!guard.evaluate(at(12, 10), Some(at(12, 0))).should_skip());
    }

    #[test]
    fn test_future_change_counts_as_recent() {
        let guard = FreshnessGuard::new(Duration::from_secs(60));
        assert_eq!(
            guard.evaluate(at(12, 0), Some(at(12, 30))),
            Freshness::Recent {
                age: Duration::ZERO
            }
        );
    }

    #[test]
    fn test_unknown_and_disabled() {
        let guard = FreshnessGuard::default();
        assert_eq!(guard.evaluate(at(12, 0), None), Freshness::Unknown);

        let disabled = FreshnessGuard::new(Duration::ZERO);
        assert_eq!(
            disabled.evaluate(at(12, 0), Some(at(12, 0))),
            Freshness::Disabled
        );
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(at(1, 2)).now(), at(1, 2));
    }
}
