use std::fmt;
use std::ops::Add;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Monotonic time since the monitor's clock started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);
    /// Latest representable time, about 584 years after start.
    pub const MAX: Timestamp = Timestamp(Duration::from_nanos(u64::MAX));

    pub fn from_duration(d: Duration) -> Self {
        Self(d.min(Self::MAX.0))
    }

    /// Negative seconds clamp to zero, values past `MAX` saturate.
    pub fn from_secs_f64(secs: f64) -> Self {
        Duration::try_from_secs_f64(secs.max(0.0))
            .map(Self::from_duration)
            .unwrap_or(Self::MAX)
    }

    /// `None` unless `secs` is finite, non-negative and within `MAX`.
    pub fn try_from_secs_f64(secs: f64) -> Option<Self> {
        if secs < 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(secs)
            .ok()
            .filter(|d| *d <= Self::MAX.0)
            .map(Self)
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn since(&self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp::from_duration(self.0.saturating_add(rhs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.as_secs_f64())
    }
}

/// Source of the current time for timing-dependent transitions.
///
/// Injected so escalation and clear windows can be tested without sleeping.
pub trait Clock: Send {
    fn now(&self) -> Timestamp;
}

/// Manually advanced clock. Clones share the same time.
///
/// Used by tests and by replay sources, which advance it per frame.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saturates at `Timestamp::MAX`.
    pub fn advance(&self, by: Duration) {
        let by = nanos(by);
        // The closure always returns Some, so the update cannot fail.
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(by))
            });
    }

    pub fn set(&self, to: Timestamp) {
        self.nanos.store(nanos(to.as_duration()), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(Duration::from_nanos(self.nanos.load(Ordering::SeqCst)))
    }
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_since_saturates() {
        let early = Timestamp::from_secs_f64(1.0);
        let late = Timestamp::from_secs_f64(3.5);
        assert_eq!(late.since(early), Duration::from_millis(2500));
        assert_eq!(early.since(late), Duration::ZERO);
    }

    #[test]
    fn test_negative_seconds_clamp_to_zero() {
        assert_eq!(Timestamp::from_secs_f64(-2.0), Timestamp::ZERO);
    }

    #[test]
    fn test_display_uses_millisecond_precision() {
        assert_eq!(Timestamp::from_secs_f64(5.0625).to_string(), "5.063");
        assert_eq!(Timestamp::ZERO.to_string(), "0.000");
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(Duration::from_millis(62_500));
        assert_relative_eq!(clock.now().as_secs_f64(), 62.5);

        clock.set(Timestamp::from_secs_f64(1.0));
        assert_relative_eq!(handle.now().as_secs_f64(), 1.0);
    }

    #[test]
    fn test_out_of_range_seconds_saturate() {
        assert_eq!(Timestamp::from_secs_f64(1e20), Timestamp::MAX);
        assert_eq!(Timestamp::from_secs_f64(2e10), Timestamp::MAX);
        assert_eq!(Timestamp::from_secs_f64(f64::INFINITY), Timestamp::MAX);
        assert_eq!(Timestamp::MAX + Duration::from_secs(1), Timestamp::MAX);
    }

    #[rstest]
    #[case::negative(-1.0)]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    #[case::past_u64_nanos(2e10)]
    #[case::huge(1e20)]
    fn test_try_from_secs_rejects(#[case] secs: f64) {
        assert_eq!(Timestamp::try_from_secs_f64(secs), None);
    }

    #[test]
    fn test_try_from_secs_accepts_in_range() {
        let t = Timestamp::try_from_secs_f64(1.5).unwrap();
        assert_eq!(t.as_duration(), Duration::from_millis(1500));
    }

    #[test]
    fn test_manual_clock_saturates_instead_of_wrapping() {
        let clock = ManualClock::new();
        clock.set(Timestamp::from_secs_f64(1.0));
        clock.advance(Duration::from_secs(20_000_000_000));
        assert_eq!(clock.now(), Timestamp::MAX);

        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), Timestamp::MAX);

        clock.set(Timestamp::from_duration(Duration::MAX));
        assert_eq!(clock.now(), Timestamp::MAX);
    }
}
