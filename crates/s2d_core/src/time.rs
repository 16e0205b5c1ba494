//! Frame timing driven by a millisecond tick counter.
//!
//! `FrameClock` converts absolute ticks (milliseconds since startup) into
//! seconds and reports the difference from the previous frame. The previous
//! value starts at zero, so the first frame's delta is the full time elapsed
//! since the tick source started.

use std::time::Instant;

const MILLISECONDS_IN_SECOND: f32 = 1000.0;
const FPS_SAMPLE_COUNT: usize = 60;

/// Monotonic millisecond counter anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct TickSource {
    start: Instant,
}

impl TickSource {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

pub struct FrameClock {
    previous_ticks: f32,
    pub delta_time: f32,
    pub frame_count: u64,

    fps_samples: [f32; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous_ticks: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
        }
    }

    /// Record a frame at `now_ms` and return the seconds since the previous one.
    pub fn tick(&mut self, now_ms: u64) -> f32 {
        let ticks = now_ms as f32 / MILLISECONDS_IN_SECOND;
        self.delta_time = ticks - self.previous_ticks;
        self.previous_ticks = ticks;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.delta_time;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt = self.fps_samples.iter().sum::<f32>() / FPS_SAMPLE_COUNT as f32;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };

        self.delta_time
    }

    /// Tick value (seconds) recorded by the most recent frame.
    pub fn previous_ticks(&self) -> f32 {
        self.previous_ticks
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
