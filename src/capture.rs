use opencv::{core::Mat, prelude::*, videoio};
use tracing::warn;

use crate::error::Error;
use crate::source::{FrameSource, RawFrame, SourceSpec};

impl RawFrame for Mat {
    #[inline]
    fn dims(&self) -> (u32, u32) {
        (self.cols().max(0) as u32, self.rows().max(0) as u32)
    }
}

/// OpenCV `VideoCapture` over a video file or a camera.
#[derive(Default)]
pub struct VideoCaptureSource {
    cap: Option<videoio::VideoCapture>,
}

impl VideoCaptureSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSource for VideoCaptureSource {
    type Frame = Mat;

    fn open(&mut self, spec: &SourceSpec) -> Result<(), Error> {
        let unavailable = |reason: String| Error::SourceUnavailable {
            name: spec.to_string(),
            reason,
        };

        let cap = match spec {
            SourceSpec::File(path) => {
                videoio::VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)
            }
            SourceSpec::Device(idx) => videoio::VideoCapture::new(*idx, videoio::CAP_ANY),
        }
        .map_err(|err| unavailable(err.to_string()))?;

        if !cap.is_opened().map_err(|err| unavailable(err.to_string()))? {
            return Err(unavailable("capture did not open".into()));
        }

        self.close();
        self.cap = Some(cap);

        Ok(())
    }

    fn is_open(&self) -> bool {
        self.cap
            .as_ref()
            .map(|cap| cap.is_opened().unwrap_or(false))
            .unwrap_or(false)
    }

    fn read(&mut self) -> Option<Mat> {
        let cap = self.cap.as_mut()?;
        let mut frame = Mat::default();

        match cap.read(&mut frame) {
            Ok(true) if frame.cols() > 0 && frame.rows() > 0 => Some(frame),
            Ok(_) => None,
            Err(err) => {
                warn!("capture read failed: {}", err);
                None
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut cap) = self.cap.take() {
            if let Err(err) = cap.release() {
                warn!("capture release failed: {}", err);
            }
        }
    }
}
