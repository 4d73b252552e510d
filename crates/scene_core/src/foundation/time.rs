//! Time management utilities
//!
//! The engine never samples the clock itself during a frame; the window
//! source supplies the delta time and [`FrameClock`] accumulates it.

use std::time::{Duration, Instant};

/// Accumulates per-frame delta times handed in by the window source
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl FrameClock {
    /// Create a new clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame of `delta_time` seconds.
    ///
    /// Negative or non-finite deltas are treated as zero.
    pub fn advance(&mut self, delta_time: f32) {
        let delta_time = if delta_time.is_finite() && delta_time > 0.0 { delta_time } else { 0.0 };
        self.delta_time = delta_time;
        self.total_time += delta_time;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since the clock started
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

/// Wall-clock timer for CPU-side work within a frame
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
    lap: Option<Duration>,
}

impl Stopwatch {
    /// Start timing now
    pub fn start_new() -> Self {
        Self {
            started: Instant::now(),
            lap: None,
        }
    }

    /// Freeze the reading; later calls to [`Stopwatch::elapsed`] return it
    pub fn stop(&mut self) -> Duration {
        let started = self.started;
        *self.lap.get_or_insert_with(|| started.elapsed())
    }

    /// Time since start, or the frozen reading once stopped
    pub fn elapsed(&self) -> Duration {
        self.lap.unwrap_or_else(|| self.started.elapsed())
    }

    /// [`Stopwatch::elapsed`] in milliseconds
    pub fn elapsed_millis(&self) -> f32 {
        self.elapsed().as_secs_f32() * 1000.0
    }
}
