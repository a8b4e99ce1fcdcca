use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb, Xywh};

/// Corner box in display pixels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Source-frame to display-space transform. Stored data always stays in
/// source pixels; this is applied only when a frame result is emitted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub sx: f32,
    pub sy: f32,
}

impl Scale {
    /// Independent factors for both axes. `None` if a source side is 0.
    pub fn new(source: (u32, u32), display: (u32, u32)) -> Option<Self> {
        let (sw, sh) = source;
        let (dw, dh) = display;
        if sw == 0 || sh == 0 {
            return None;
        }

        Some(Self {
            sx: dw as f32 / sw as f32,
            sy: dh as f32 / sh as f32,
        })
    }

    /// Fits the frame to `display_width`, deriving the height from the source
    /// aspect ratio (truncated to whole pixels).
    pub fn fit_width(source: (u32, u32), display_width: u32) -> Option<Self> {
        Self::new(source, (display_width, fit_height(source, display_width)?))
    }

    #[inline]
    pub fn project_point(&self, p: &na::Point2<f32>) -> na::Point2<i32> {
        na::Point2::new(scale(p.x, self.sx), scale(p.y, self.sy))
    }

    #[inline]
    pub fn project_box(&self, b: &BBox<Ltrb>) -> DisplayBox {
        DisplayBox {
            x1: scale(b.left(), self.sx),
            y1: scale(b.top(), self.sy),
            x2: scale(b.right(), self.sx),
            y2: scale(b.bottom(), self.sy),
        }
    }

    #[inline]
    pub fn project_center(&self, b: &BBox<Xywh>) -> na::Point2<i32> {
        self.project_point(&b.center())
    }

    pub fn project_trajectory<'a, I>(&self, points: I) -> Vec<na::Point2<i32>>
    where
        I: IntoIterator<Item = &'a na::Point2<f32>>,
    {
        points.into_iter().map(|p| self.project_point(p)).collect()
    }
}

/// Display height preserving the source aspect ratio at `display_width`.
pub fn fit_height(source: (u32, u32), display_width: u32) -> Option<u32> {
    let (sw, sh) = source;
    if sw == 0 || sh == 0 {
        return None;
    }

    Some((sh as f64 * (display_width as f64 / sw as f64)) as u32)
}

#[inline(always)]
fn scale(v: f32, s: f32) -> i32 {
    (v * s).floor() as i32
}
