use nalgebra as na;
use serde_derive::Serialize;
use std::time::Duration;

use crate::detection::Detection;
use crate::motion::{DirectionTotals, FrameMotion};
use crate::projection::DisplayBox;
use crate::TrackId;

/// A filtered detection as it should be annotated.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AnnotatedDetection {
    pub detection: Detection,
    /// Present when labels are shown.
    pub display: Option<DisplayBox>,
}

/// Display-space polyline of one track, oldest point first.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProjectedTrajectory {
    pub track_id: TrackId,
    pub points: Vec<na::Point2<i32>>,
}

/// One row of the detections table.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TableRow {
    pub index: usize,
    pub track_id: TrackId,
    pub confidence: String,
    pub class_name: &'static str,
    pub coords: String,
}

/// Everything the renderer needs for one processed frame.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FrameResult {
    pub frame_index: u64,
    pub source_dims: (u32, u32),
    pub display_dims: (u32, u32),
    pub detections: Vec<AnnotatedDetection>,
    pub trajectories: Vec<ProjectedTrajectory>,
    pub motion: FrameMotion,
    pub totals: DirectionTotals,
    pub live_tracks: usize,
    /// From the interval since the previous processed frame. Ticks that
    /// read no frame or had their frame skipped are not counted, so after a
    /// stall this reflects the gap between the two frames around it.
    /// 0 for the first frame of a session.
    pub fps: f32,
    pub avg_fps: f32,
    #[serde(serialize_with = "as_secs")]
    pub elapsed: Duration,
}

impl FrameResult {
    pub fn table_rows(&self) -> Vec<TableRow> {
        self.detections
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let d = &a.detection;
                let [x1, y1, x2, y2] = *d.ltrb.as_slice();

                TableRow {
                    index: i + 1,
                    track_id: d.track_id,
                    confidence: format!("{:.2}", d.confidence),
                    class_name: d.class_name(),
                    coords: format!("{},{},{},{}", x1 as i32, y1 as i32, x2 as i32, y2 as i32),
                }
            })
            .collect()
    }

    pub fn elapsed_label(&self) -> String {
        format_elapsed(self.elapsed)
    }
}

/// `"{minutes}m {seconds:.1}s"`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    let minutes = (secs / 60.0).floor();

    format!("{}m {:.1}s", minutes as u64, secs - minutes * 60.0)
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}
