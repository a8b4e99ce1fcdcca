use serde_derive::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::history::HISTORY_LEN;
use crate::motion::Convention;
use crate::projection::{self, Scale};

/// Live settings the UI hands to the frame cycle. Read once at the start of
/// every tick.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CycleConfig {
    pub confidence_threshold: f32,
    pub display_width: u32,
    /// `None` keeps the source aspect ratio at `display_width`.
    pub display_height: Option<u32>,
    pub show_trajectories: bool,
    pub show_labels: bool,
    /// Trajectory capacity, `1..=30`; applies from the next session.
    pub history_len: usize,
    pub convention: Convention,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            display_width: 640,
            display_height: None,
            show_trajectories: true,
            show_labels: true,
            history_len: HISTORY_LEN,
            convention: Convention::DownIsForward,
        }
    }
}

impl CycleConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let json = fs::read_to_string(path)?;
        let mut config: CycleConfig = serde_json::from_str(&json)?;
        config.set_confidence_threshold(config.confidence_threshold);
        config.history_len = config.history_len.clamp(1, HISTORY_LEN);

        Ok(config)
    }

    /// Clamps into `[0, 1]`; NaN falls back to the default.
    pub fn set_confidence_threshold(&mut self, threshold: f32) {
        self.confidence_threshold = if threshold.is_nan() {
            Self::default().confidence_threshold
        } else {
            threshold.clamp(0.0, 1.0)
        };
    }

    pub fn display_dims(&self, source: (u32, u32)) -> Option<(u32, u32)> {
        let height = match self.display_height {
            Some(h) => h,
            None => projection::fit_height(source, self.display_width)?,
        };

        Some((self.display_width, height))
    }

    pub fn scale(&self, source: (u32, u32)) -> Option<Scale> {
        Scale::new(source, self.display_dims(source)?)
    }
}
