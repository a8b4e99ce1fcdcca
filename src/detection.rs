use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::bbox::{BBox, Ltrb, Xywh};
use crate::TrackId;

pub const NAMES: [&str; 8] = [
    "person",
    "bicycle",
    "car",
    "motorbike",
    "aeroplane",
    "bus",
    "train",
    "truck",
];

/// One tracked object in one frame, as handed over by the detector.
///
/// Both box forms come from the detector: the corner form frames the
/// object, the center form drives trajectories and motion.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    #[serde(rename = "id")]
    pub track_id: TrackId,
    pub ltrb: BBox<Ltrb>,
    pub xywh: BBox<Xywh>,
    #[serde(rename = "p")]
    pub confidence: f32,
    #[serde(rename = "c", default)]
    pub class: i32,
}

impl Detection {
    pub fn new(track_id: TrackId, ltrb: BBox<Ltrb>, xywh: BBox<Xywh>, confidence: f32) -> Self {
        Self {
            track_id,
            ltrb,
            xywh,
            confidence,
            class: 0,
        }
    }

    /// Builds a detection from the corner form only, deriving the center form.
    pub fn from_ltrb(track_id: TrackId, ltrb: BBox<Ltrb>, confidence: f32) -> Self {
        Self::new(track_id, ltrb, ltrb.as_xywh(), confidence)
    }

    /// Builds a detection from the center form only, deriving the corner form.
    pub fn from_xywh(track_id: TrackId, xywh: BBox<Xywh>, confidence: f32) -> Self {
        Self::new(track_id, xywh.as_ltrb(), xywh, confidence)
    }

    #[inline]
    pub fn with_class(mut self, class: i32) -> Self {
        self.class = class;
        self
    }

    #[inline(always)]
    pub fn center(&self) -> na::Point2<f32> {
        self.xywh.center()
    }

    pub fn class_name(&self) -> &'static str {
        usize::try_from(self.class)
            .ok()
            .and_then(|idx| NAMES.get(idx))
            .copied()
            .unwrap_or("unknown")
    }
}

/// Last detection of every track id, ordered by that last occurrence.
///
/// The tracker should never emit an id twice per frame. When it does, the
/// later detection replaces the earlier one, so stateful consumers see at
/// most one observation per id and frame.
pub fn latest_per_track(detections: &[Detection]) -> Vec<&Detection> {
    let mut last: HashMap<TrackId, usize> = HashMap::with_capacity(detections.len());
    for (idx, det) in detections.iter().enumerate() {
        last.insert(det.track_id, idx);
    }

    detections
        .iter()
        .enumerate()
        .filter(|(idx, det)| last.get(&det.track_id) == Some(idx))
        .map(|(_, det)| det)
        .collect()
}
