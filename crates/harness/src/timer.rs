use std::time::{Duration, Instant};

/// Whole milliseconds elapsed since `start`, truncated.
///
/// Backed by the monotonic clock, so wall-clock adjustments do not affect it.
/// Whether time spent suspended is counted depends on the platform.
pub fn elapsed_millis(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Captured start point for timing one stage or one phase.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_millis(&self) -> u64 {
        elapsed_millis(self.start)
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_whole_milliseconds() {
        let start = Instant::now()
            .checked_sub(Duration::from_micros(5_900))
            .expect("clock too close to its origin");
        let millis = elapsed_millis(start);
        assert!(millis >= 5, "expected at least 5ms, got {millis}");
    }

    #[test]
    fn stopwatch_elapsed_is_monotonic() {
        let watch = Stopwatch::start();
        let first = watch.elapsed();
        let second = watch.elapsed();
        assert!(second >= first);
        assert!(watch.elapsed_millis() <= second.as_millis() as u64 + 1_000);
    }
}
