use nalgebra as na;
use std::collections::{HashMap, HashSet};
use tracing::trace;

use crate::circular_queue::CircularQueue;
use crate::detection::{latest_per_track, Detection};
use crate::TrackId;

pub const HISTORY_LEN: usize = 30;

/// Recent center positions of one track, source-frame pixels, oldest first.
#[derive(Debug, Clone)]
pub struct TrackHistory {
    points: CircularQueue<na::Point2<f32>>,
}

impl TrackHistory {
    fn new(capacity: usize) -> Self {
        Self {
            points: CircularQueue::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn points(&self) -> impl DoubleEndedIterator<Item = &na::Point2<f32>> + ExactSizeIterator {
        self.points.iter()
    }

    #[inline]
    pub fn latest(&self) -> Option<&na::Point2<f32>> {
        self.points.latest()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Trajectories of the tracks seen in the latest frame.
///
/// Tracks absent from a frame are dropped by [`evict_stale`], so an id that
/// comes back later starts over with a fresh history.
///
/// [`evict_stale`]: TrackHistoryStore::evict_stale
#[derive(Debug, Clone)]
pub struct TrackHistoryStore {
    capacity: usize,
    histories: HashMap<TrackId, TrackHistory>,
}

impl Default for TrackHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackHistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_LEN)
    }

    /// Per-track capacity, clamped to `1..=HISTORY_LEN`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.clamp(1, HISTORY_LEN),
            histories: HashMap::with_capacity(64),
        }
    }

    /// Appends the center of every detection to its track's history.
    /// Duplicate ids append only their last detection.
    pub fn update(&mut self, detections: &[Detection]) {
        let capacity = self.capacity;

        for det in latest_per_track(detections) {
            self.histories
                .entry(det.track_id)
                .or_insert_with(|| TrackHistory::new(capacity))
                .points
                .push(det.center());
        }
    }

    pub fn evict_stale(&mut self, current_ids: &HashSet<TrackId>) {
        self.histories.retain(|id, _| {
            let live = current_ids.contains(id);
            if !live {
                trace!(track_id = *id, "history evicted");
            }
            live
        });
    }

    #[inline]
    pub fn all_histories(&self) -> impl Iterator<Item = (TrackId, &TrackHistory)> {
        self.histories.iter().map(|(id, h)| (*id, h))
    }

    #[inline]
    pub fn get(&self, id: TrackId) -> Option<&TrackHistory> {
        self.histories.get(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.histories.clear();
    }
}
