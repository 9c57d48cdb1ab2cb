//! Step timing.
//!
//! `ProfilerScope` is an RAII timer emitting a `trace` event on drop;
//! `FrameTimer` accumulates per-step cost for diagnostics.

use std::time::Instant;
use tracing::trace;

/// Measures wall time from construction until drop.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    /// Opens a scope named `name`; the timer starts now.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Milliseconds since the scope opened
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        trace!(scope = self.name, elapsed_ms = self.elapsed_ms(), "profiler scope closed");
    }
}

/// Running statistics over recorded step durations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTimer {
    last_ms: f64,
    max_ms: f64,
    total_ms: f64,
    frames: u64,
}

impl FrameTimer {
    /// Creates a new frame timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one step that took `time_ms`.
    pub fn record(&mut self, time_ms: f64) {
        self.last_ms = time_ms;
        self.max_ms = self.max_ms.max(time_ms);
        self.total_ms += time_ms;
        self.frames += 1;
    }

    /// Duration of the most recent step
    #[must_use]
    pub fn last_frame_time_ms(&self) -> f64 {
        self.last_ms
    }

    /// Slowest recorded step
    #[must_use]
    pub fn max_frame_time_ms(&self) -> f64 {
        self.max_ms
    }

    /// Mean over every recorded step, 0 before the first
    #[must_use]
    pub fn mean_frame_time_ms(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.total_ms / self.frames as f64
        }
    }

    /// Number of recorded steps
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_profiler_scope_measures_time() {
        let scope = ProfilerScope::new("test");
        thread::sleep(Duration::from_millis(10));
        let elapsed = scope.elapsed_ms();
        assert!(elapsed >= 10.0, "Expected at least 10ms, got {elapsed}");
    }

    #[test]
    fn test_frame_timer_statistics() {
        let mut timer = FrameTimer::new();
        assert_eq!(timer.mean_frame_time_ms(), 0.0);

        for ms in [16.0, 8.0, 12.0] {
            timer.record(ms);
        }
        assert_eq!(timer.last_frame_time_ms(), 12.0);
        assert_eq!(timer.max_frame_time_ms(), 16.0);
        assert_eq!(timer.frames(), 3);
        assert_relative_eq!(timer.mean_frame_time_ms(), 12.0);
    }
}
