//! Recorded detection logs.
//!
//! A log holds one frame per line as `<frame_idx>:<json>`, where the json is
//! a [`RecordedFrame`]. Replaying a log stands in for both the capture and
//! the detector, which is how the annotation state is exercised offline.

use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use tracing::{info, warn};

use crate::detection::Detection;
use crate::error::Error;
use crate::source::{Detector, FrameSource, RawFrame, SourceSpec};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub dims: (u32, u32),
    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl RawFrame for RecordedFrame {
    #[inline]
    fn dims(&self) -> (u32, u32) {
        self.dims
    }
}

impl RecordedFrame {
    pub fn to_line(&self, frame_idx: u64) -> Result<String, Error> {
        Ok(format!("{}:{}", frame_idx, serde_json::to_string(self)?))
    }

    /// Parses one log line. A line without a `:` separator is a frame the
    /// tracker returned nothing for; its dims are unknown.
    pub fn parse_line(line: &str) -> Result<Self, Error> {
        match line.find(':') {
            Some(idx) => Ok(serde_json::from_str(&line[idx + 1..])?),
            None => Ok(Self {
                dims: (0, 0),
                detections: Vec::new(),
            }),
        }
    }
}

/// Frame source backed by a detection log.
pub struct DetectionLog<R: BufRead = BufReader<File>> {
    lines: Option<Lines<R>>,
    line_no: usize,
    last_dims: (u32, u32),
}

impl<R: BufRead> Default for DetectionLog<R> {
    fn default() -> Self {
        Self {
            lines: None,
            line_no: 0,
            last_dims: (0, 0),
        }
    }
}

impl DetectionLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: BufRead> DetectionLog<R> {
    /// Opens over an already available reader.
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: Some(reader.lines()),
            line_no: 0,
            last_dims: (0, 0),
        }
    }

    #[inline]
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl FrameSource for DetectionLog {
    type Frame = RecordedFrame;

    fn open(&mut self, spec: &SourceSpec) -> Result<(), Error> {
        let path = match spec {
            SourceSpec::File(path) => path,
            SourceSpec::Device(_) => {
                return Err(Error::SourceUnavailable {
                    name: spec.to_string(),
                    reason: "detection logs cannot be read from a device".into(),
                })
            }
        };

        let file = File::open(path).map_err(|err| Error::SourceUnavailable {
            name: spec.to_string(),
            reason: err.to_string(),
        })?;

        *self = Self::from_reader(BufReader::new(file));

        Ok(())
    }

    fn is_open(&self) -> bool {
        self.lines.is_some()
    }

    fn read(&mut self) -> Option<RecordedFrame> {
        read_next(self)
    }

    fn close(&mut self) {
        self.lines = None;
    }
}

fn read_next<R: BufRead>(log: &mut DetectionLog<R>) -> Option<RecordedFrame> {
    let next = log.lines.as_mut()?.next();
    let line = match next {
        Some(Ok(line)) => line,
        Some(Err(err)) => {
            warn!(line = log.line_no + 1, "detection log read failed: {}", err);
            log.lines = None;
            return None;
        }
        None => {
            info!(lines = log.line_no, "detection log exhausted");
            log.lines = None;
            return None;
        }
    };
    log.line_no += 1;

    match RecordedFrame::parse_line(&line) {
        Ok(mut frame) => {
            // Empty lines inherit the size of the stream.
            if frame.dims == (0, 0) {
                frame.dims = log.last_dims;
            }
            log.last_dims = frame.dims;
            Some(frame)
        }
        Err(err) => {
            warn!(line = log.line_no, "skipping corrupt frame: {}", err);
            None
        }
    }
}

/// Replays the detections stored with each recorded frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct Recorded;

impl Detector<RecordedFrame> for Recorded {
    #[inline]
    fn detect(&mut self, frame: &RecordedFrame) -> Result<Vec<Detection>, Error> {
        Ok(frame.detections.clone())
    }
}
