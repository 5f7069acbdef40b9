//! Frame timing and delta time.
//!
//! The [`Time`] resource is advanced once per frame by whoever drives the
//! loop. A windowed host calls [`Time::tick`] to measure wall-clock time;
//! a headless driver calls [`Time::advance`] with a fixed step so runs are
//! reproducible.

use std::time::{Duration, Instant};

/// Frame timing resource.
#[derive(Clone, Copy, Debug)]
pub struct Time {
    /// When the current frame started.
    frame_start: Instant,
    /// Duration of the previous frame, after clamping.
    delta: Duration,
    /// Simulated time since startup.
    elapsed: Duration,
    /// Frame counter.
    frame_count: u64,
    /// Longest delta handed to the simulation. Longer stalls (debugger,
    /// window drag) are clipped so one frame can't teleport everything.
    max_delta: Duration,
}

impl Time {
    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            max_delta: Duration::from_millis(100),
        }
    }

    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Measure wall-clock time since the previous tick.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let measured = now - self.frame_start;
        self.frame_start = now;
        self.advance(measured);
    }

    /// Advance by an explicit duration.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta.min(self.max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta time in seconds (f32), the most common way to use it.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Estimated FPS based on the last frame's delta.
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let mut time = Time::new();
        time.advance(Duration::from_millis(16));
        time.advance(Duration::from_millis(16));
        assert_eq!(time.frame_count(), 2);
        assert_eq!(time.elapsed(), Duration::from_millis(32));
        assert!((time.fps() - 62.5).abs() < 0.01);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut time = Time::new().with_max_delta(Duration::from_millis(50));
        time.advance(Duration::from_secs(3));
        assert_eq!(time.delta(), Duration::from_millis(50));
    }
}
