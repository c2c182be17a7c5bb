//! Frames-per-second measurement
use std::time::{Duration, Instant};

/// Counts frames and publishes a rate once per measurement window
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: Duration,
    started: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            started: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    /// Record one frame finished at `now`
    pub fn tick(&mut self, now: Instant) {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed >= self.window {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.started = now;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
