//! Time management utilities

use std::time::{Duration, Instant};

/// Frame timer driving the engine loop
///
/// In real-time mode the delta is measured from the wall clock. A timer built
/// with [`Timer::fixed`] reports the same delta every frame instead, which
/// keeps headless runs and tests deterministic.
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    fixed_delta: Option<f32>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new wall-clock timer
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            fixed_delta: None,
        }
    }

    /// Create a timer that advances by `delta` seconds per frame
    #[must_use]
    pub fn fixed(delta: f32) -> Self {
        Self {
            fixed_delta: Some(delta),
            ..Self::new()
        }
    }

    /// Advance the timer by one frame and return the new delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta_time = match self.fixed_delta {
            Some(delta) => delta,
            None => now.duration_since(self.last_frame).as_secs_f32(),
        };
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
        self.delta_time
    }

    /// Sleep until the current frame has lasted `1 / target_fps` seconds
    pub fn pace(&self, target_fps: u32) {
        if target_fps == 0 || self.fixed_delta.is_some() {
            return;
        }
        let budget = Duration::from_secs_f32(1.0 / target_fps as f32);
        let spent = self.last_frame.elapsed();
        if spent < budget {
            std::thread::sleep(budget - spent);
        }
    }

    /// Get the time since the last frame in seconds
    #[must_use]
    pub const fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    #[must_use]
    pub const fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    #[must_use]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    #[must_use]
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    /// Get the elapsed time
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed + self.start_time.map_or(Duration::ZERO, |start| start.elapsed())
    }

    /// Get the elapsed time in microseconds
    #[must_use]
    pub fn elapsed_micros(&self) -> u64 {
        u64::try_from(self.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_timer_is_deterministic() {
        let mut timer = Timer::fixed(0.25);
        assert_eq!(timer.tick(), 0.25);
        assert_eq!(timer.tick(), 0.25);
        assert_eq!(timer.frame_count(), 2);
        assert_eq!(timer.total_time(), 0.5);
        assert_eq!(timer.average_fps(), 4.0);
    }

    #[test]
    fn test_stopwatch_accumulates() {
        let mut stopwatch = Stopwatch::start_new();
        stopwatch.stop();
        let first = stopwatch.elapsed();
        stopwatch.start();
        stopwatch.stop();
        assert!(stopwatch.elapsed() >= first);
    }
}
