use serde_derive::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::detection::{latest_per_track, Detection};
use crate::TrackId;

/// Which sign of vertical displacement counts as forward.
///
/// Screen-space y grows downward, so with `DownIsForward` an object moving
/// toward the bottom of the frame is counted as forward.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Convention {
    #[default]
    DownIsForward,
    UpIsForward,
}

/// Direction events observed in one frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameMotion {
    pub forward: u32,
    pub backward: u32,
}

/// Direction events accumulated over a session.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionTotals {
    pub forward: u64,
    pub backward: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MotionDirectionCounter {
    convention: Convention,
    last_y: HashMap<TrackId, f32>,
    totals: DirectionTotals,
}

impl MotionDirectionCounter {
    pub fn new(convention: Convention) -> Self {
        Self {
            convention,
            last_y: HashMap::with_capacity(64),
            totals: DirectionTotals::default(),
        }
    }

    #[inline]
    pub fn convention(&self) -> Convention {
        self.convention
    }

    /// Compares every track's center y against the previous observation and
    /// counts the moves. A track seen for the first time only seeds its y.
    pub fn classify(&mut self, detections: &[Detection]) -> FrameMotion {
        let mut frame = FrameMotion::default();

        for det in latest_per_track(detections) {
            let curr_y = det.center().y;

            if let Some(prev_y) = self.last_y.insert(det.track_id, curr_y) {
                let dy = match self.convention {
                    Convention::DownIsForward => curr_y - prev_y,
                    Convention::UpIsForward => prev_y - curr_y,
                };

                if dy > 0.0 {
                    frame.forward += 1;
                    self.totals.forward += 1;
                } else if dy < 0.0 {
                    frame.backward += 1;
                    self.totals.backward += 1;
                }
            }
        }

        frame
    }

    /// Forgets the last y of tracks missing from the current frame, so a
    /// returning id is seeded again instead of compared to a stale position.
    pub fn evict_stale(&mut self, current_ids: &HashSet<TrackId>) {
        self.last_y.retain(|id, _| current_ids.contains(id));
    }

    #[inline]
    pub fn last_y(&self, id: TrackId) -> Option<f32> {
        self.last_y.get(&id).copied()
    }

    #[inline]
    pub fn totals(&self) -> DirectionTotals {
        self.totals
    }

    #[inline]
    pub fn tracked(&self) -> usize {
        self.last_y.len()
    }

    pub fn reset(&mut self) {
        self.last_y.clear();
        self.totals = DirectionTotals::default();
    }
}
