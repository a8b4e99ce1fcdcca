use serde_derive::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::CycleConfig;
use crate::error::Error;
use crate::frame::FrameDetections;
use crate::result::{format_elapsed, FrameResult};
use crate::scene::Scene;
use crate::source::{Detector, FrameSource, RawFrame, SourceSpec};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
}

/// Drives one capture session at a time: reads a frame, runs the detector
/// and feeds the result through the [`Scene`].
///
/// Frames are processed strictly one after another; the caller decides how
/// often [`tick`](FrameCycle::tick) is invoked.
pub struct FrameCycle<S, D> {
    source: S,
    detector: D,
    scene: Scene,
    current: Option<SourceSpec>,
}

impl<S, D> FrameCycle<S, D>
where
    S: FrameSource,
    D: Detector<S::Frame>,
{
    pub fn new(source: S, detector: D) -> Self {
        Self {
            source,
            detector,
            scene: Scene::new(&CycleConfig::default(), Instant::now()),
            current: None,
        }
    }

    #[inline]
    pub fn state(&self) -> CycleState {
        if self.current.is_some() {
            CycleState::Running
        } else {
            CycleState::Idle
        }
    }

    #[inline]
    pub fn current_source(&self) -> Option<&SourceSpec> {
        self.current.as_ref()
    }

    /// Opens `spec` and starts a fresh session. A running session is closed
    /// first. If the source cannot be opened the cycle stays idle and the
    /// annotation state is left as it was.
    pub fn open(&mut self, spec: SourceSpec, config: &CycleConfig) -> Result<(), Error> {
        if self.current.is_some() {
            self.close();
        }

        if let Err(err) = self.source.open(&spec) {
            warn!(source = %spec, "cannot open source: {}", err);
            return Err(err);
        }

        self.scene.reset(config, Instant::now());
        info!(source = %spec, "session started");
        self.current = Some(spec);

        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(spec) = self.current.take() {
            self.source.close();
            self.log_summary(&spec, "session closed");
        }
    }

    /// Open/close button semantics: closes a running session, otherwise opens
    /// `spec`.
    pub fn toggle(&mut self, spec: SourceSpec, config: &CycleConfig) -> Result<CycleState, Error> {
        if self.current.is_some() {
            self.close();
        } else {
            self.open(spec, config)?;
        }

        Ok(self.state())
    }

    /// Processes the next frame. `None` while idle, when no frame could be
    /// read, or when the detector failed on it; none of these touch the
    /// annotation state. A source that is no longer open ends the session.
    pub fn tick(&mut self, config: &CycleConfig) -> Option<FrameResult> {
        self.current.as_ref()?;

        let frame = match self.source.read() {
            Some(frame) => frame,
            None => {
                if !self.source.is_open() {
                    self.end_of_stream();
                }
                return None;
            }
        };

        let detections = match self.detector.detect(&frame) {
            Ok(detections) => detections,
            Err(err) => {
                warn!(frame = self.scene.frame_count() + 1, "detector failed: {}", err);
                return None;
            }
        };

        self.scene.process(
            FrameDetections::new(frame.dims(), detections),
            config,
            Instant::now(),
        )
    }

    /// Feeds detections obtained outside of this cycle, for callers that run
    /// capture and detection themselves. Frames must arrive in capture order.
    pub fn process(&mut self, frame: FrameDetections, config: &CycleConfig) -> Option<FrameResult> {
        self.current.as_ref()?;
        self.scene.process(frame, config, Instant::now())
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    fn end_of_stream(&mut self) {
        if let Some(spec) = self.current.take() {
            self.source.close();
            self.log_summary(&spec, "end of stream");
        }
    }

    fn log_summary(&self, spec: &SourceSpec, msg: &str) {
        let totals = self.scene.totals();

        info!(
            source = %spec,
            frames = self.scene.frame_count(),
            forward = totals.forward,
            backward = totals.backward,
            elapsed = %format_elapsed(self.scene.elapsed(Instant::now())),
            "{}",
            msg
        );
    }
}
