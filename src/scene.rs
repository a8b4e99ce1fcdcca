use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::CycleConfig;
use crate::filter;
use crate::frame::FrameDetections;
use crate::history::TrackHistoryStore;
use crate::motion::{DirectionTotals, MotionDirectionCounter};
use crate::result::{AnnotatedDetection, FrameResult, ProjectedTrajectory};

/// Per-session annotation state: trajectories, direction counters and the
/// session clock. Must be fed frames in capture order by a single owner.
#[derive(Debug, Clone)]
pub struct Scene {
    history: TrackHistoryStore,
    motion: MotionDirectionCounter,
    frame_count: u64,
    started_at: Instant,
    last_frame_at: Option<Instant>,
}

impl Scene {
    pub fn new(config: &CycleConfig, now: Instant) -> Self {
        Self {
            history: TrackHistoryStore::with_capacity(config.history_len),
            motion: MotionDirectionCounter::new(config.convention),
            frame_count: 0,
            started_at: now,
            last_frame_at: None,
        }
    }

    /// Starts a new session. History capacity and direction convention are
    /// taken from `config`.
    pub fn reset(&mut self, config: &CycleConfig, now: Instant) {
        self.history = TrackHistoryStore::with_capacity(config.history_len);

        if self.motion.convention() == config.convention {
            self.motion.reset();
        } else {
            self.motion = MotionDirectionCounter::new(config.convention);
        }

        self.frame_count = 0;
        self.started_at = now;
        self.last_frame_at = None;
    }

    /// Runs filter, eviction, history update, direction classification and
    /// projection for one frame. A frame with a zero-sized side carries no
    /// usable coordinates and yields `None` without touching any state.
    pub fn process(
        &mut self,
        frame: FrameDetections,
        config: &CycleConfig,
        now: Instant,
    ) -> Option<FrameResult> {
        let source_dims = frame.dims;
        let display_dims = config.display_dims(source_dims)?;
        let scale = config.scale(source_dims)?;

        let fps = self
            .last_frame_at
            .map(|prev| now.saturating_duration_since(prev).as_secs_f32())
            .filter(|dt| *dt > 0.0)
            .map(|dt| 1.0 / dt)
            .unwrap_or(0.0);
        self.last_frame_at = Some(now);
        self.frame_count += 1;

        let raw_count = frame.len();
        let filtered = FrameDetections::new(
            source_dims,
            filter::by_confidence(frame.detections, config.confidence_threshold),
        );

        let current_ids = filtered.track_ids();
        self.history.evict_stale(&current_ids);
        self.motion.evict_stale(&current_ids);
        self.history.update(&filtered.detections);
        let motion = self.motion.classify(&filtered.detections);

        let detections = filtered
            .detections
            .into_iter()
            .map(|detection| AnnotatedDetection {
                display: config
                    .show_labels
                    .then(|| scale.project_box(&detection.ltrb)),
                detection,
            })
            .collect();

        let mut trajectories: Vec<ProjectedTrajectory> = if config.show_trajectories {
            self.history
                .all_histories()
                .filter(|(_, h)| h.len() > 1)
                .map(|(track_id, h)| ProjectedTrajectory {
                    track_id,
                    points: scale.project_trajectory(h.points()),
                })
                .collect()
        } else {
            Vec::new()
        };
        trajectories.sort_unstable_by_key(|t| t.track_id);

        let elapsed = self.elapsed(now);
        let secs = elapsed.as_secs_f32();
        let avg_fps = if secs > 0.01 {
            self.frame_count as f32 / secs
        } else {
            0.0
        };

        debug!(
            frame = self.frame_count,
            raw = raw_count,
            kept = current_ids.len(),
            forward = motion.forward,
            backward = motion.backward,
            "frame processed"
        );

        Some(FrameResult {
            frame_index: self.frame_count,
            source_dims,
            display_dims,
            detections,
            trajectories,
            motion,
            totals: self.motion.totals(),
            live_tracks: self.history.len(),
            fps,
            avg_fps,
            elapsed,
        })
    }

    #[inline]
    pub fn history(&self) -> &TrackHistoryStore {
        &self.history
    }

    #[inline]
    pub fn motion(&self) -> &MotionDirectionCounter {
        &self.motion
    }

    #[inline]
    pub fn totals(&self) -> DirectionTotals {
        self.motion.totals()
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn live_tracks(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }
}
