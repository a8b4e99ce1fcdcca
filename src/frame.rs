use ndarray::prelude::*;
use std::collections::HashSet;

use crate::bbox::BBox;
use crate::detection::Detection;
use crate::error::Error;
use crate::TrackId;

/// Detector output for a single frame, in source-frame pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameDetections {
    pub dims: (u32, u32),
    pub detections: Vec<Detection>,
}

impl FrameDetections {
    pub fn new(dims: (u32, u32), detections: Vec<Detection>) -> Self {
        Self { dims, detections }
    }

    /// Assembles detections from the row-aligned tensors a tracker returns:
    /// corner boxes `(N, 4)`, center boxes `(N, 4)`, ids `(N)`, scores `(N)`
    /// and optional class ids `(N)`.
    pub fn from_tensors(
        dims: (u32, u32),
        xyxy: ArrayView2<'_, f32>,
        xywh: ArrayView2<'_, f32>,
        ids: ArrayView1<'_, i64>,
        confs: ArrayView1<'_, f32>,
        classes: Option<ArrayView1<'_, i32>>,
    ) -> Result<Self, Error> {
        let n = ids.len();

        check_rows("xyxy", xyxy.nrows(), n)?;
        check_rows("xywh", xywh.nrows(), n)?;
        check_rows("conf", confs.len(), n)?;
        check_rows("xyxy columns", xyxy.ncols(), 4)?;
        check_rows("xywh columns", xywh.ncols(), 4)?;
        if let Some(classes) = &classes {
            check_rows("cls", classes.len(), n)?;
        }

        let detections = (0..n)
            .map(|i| {
                let c = xyxy.row(i);
                let x = xywh.row(i);

                Detection::new(
                    ids[i],
                    BBox::ltrb(c[0], c[1], c[2], c[3]),
                    BBox::xywh(x[0], x[1], x[2], x[3]),
                    confs[i],
                )
                .with_class(classes.as_ref().map(|cls| cls[i]).unwrap_or(0))
            })
            .collect();

        Ok(Self { dims, detections })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn track_ids(&self) -> HashSet<TrackId> {
        self.detections.iter().map(|d| d.track_id).collect()
    }
}

#[inline]
fn check_rows(what: &'static str, actual: usize, expected: usize) -> Result<(), Error> {
    if actual == expected {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            what,
            expected,
            actual,
        })
    }
}
