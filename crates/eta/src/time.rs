use std::time::{Duration, Instant};

/// A trait for time sources that return a monotonic timestamp.
///
/// This abstraction allows the cache to run against a real monotonic timer in
/// production and a mocked time source in tests.
///
/// The unit is **milliseconds** relative to an arbitrary, fixed origin. Only
/// differences between two readings are meaningful.
///
/// # Example
///
/// ```
/// use eta::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource: Send + Sync {
    /// Returns the current time in milliseconds since the source's origin.
    fn current_millis(&self) -> u64;
}

/// A monotonic time source measuring elapsed time since construction.
///
/// Backed by [`Instant`], so wall-clock adjustments (NTP, daylight savings)
/// never make cached entries appear younger or older than they are.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        duration_to_millis(self.origin.elapsed())
    }
}

/// Converts a [`Duration`] to whole milliseconds, saturating at `u64::MAX`.
pub(crate) fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
