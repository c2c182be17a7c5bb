//! Viewer settings
use std::path::PathBuf;
use std::time::Duration;

use tracing::Level;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub target_fps: u32,
    /// View rotation per key press, in radians
    pub rotation_step: f32,
    /// Zoom change per key press
    pub zoom_step: f32,
    /// Auto-spin per frame around X and Y, in radians
    pub spin: (f32, f32),
    /// Center and unit-scale the model after loading
    pub normalize: bool,
    pub log_file: PathBuf,
    pub log_level: Level,
}

impl ViewerConfig {
    pub fn frame_time(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.target_fps.max(1)))
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            rotation_step: 0.1,
            zoom_step: 0.1,
            spin: (0.01, 0.015),
            normalize: true,
            log_file: PathBuf::from("stlview.log"),
            log_level: Level::INFO,
        }
    }
}
