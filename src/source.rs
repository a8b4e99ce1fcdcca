use std::fmt;
use std::path::PathBuf;

use crate::detection::Detection;
use crate::error::Error;

/// What to open: a video file or a capture device index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    File(PathBuf),
    Device(i32),
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::File(path) => write!(f, "{}", path.display()),
            SourceSpec::Device(idx) => write!(f, "device #{}", idx),
        }
    }
}

pub trait RawFrame {
    /// `(width, height)` in pixels.
    fn dims(&self) -> (u32, u32);
}

/// Capture side: hands out frames one at a time.
pub trait FrameSource {
    type Frame: RawFrame;

    fn open(&mut self, spec: &SourceSpec) -> Result<(), Error>;
    fn is_open(&self) -> bool;
    /// `None` when no frame is available this tick.
    fn read(&mut self) -> Option<Self::Frame>;
    fn close(&mut self);
}

/// Detection and tracking model: boxes with persistent track ids.
pub trait Detector<F> {
    fn detect(&mut self, frame: &F) -> Result<Vec<Detection>, Error>;
}

impl<F, D: Detector<F> + ?Sized> Detector<F> for Box<D> {
    #[inline]
    fn detect(&mut self, frame: &F) -> Result<Vec<Detection>, Error> {
        (**self).detect(frame)
    }
}
