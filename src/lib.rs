//! Per-frame bookkeeping for live tracking annotation.
//!
//! An external detector/tracker hands over boxes with persistent track ids
//! every frame. This crate keeps what has to survive between frames: bounded
//! trajectories per track, vertical direction counters, confidence filtering
//! and stale track eviction. It emits display-space coordinates for a
//! renderer to draw.

pub mod bbox;
pub mod config;
pub mod cycle;
pub mod detection;
pub mod error;
pub mod filter;
pub mod frame;
pub mod history;
pub mod motion;
pub mod projection;
pub mod replay;
pub mod result;
pub mod scene;
pub mod source;

#[cfg(feature = "opencv")]
pub mod capture;

mod circular_queue;

pub use config::CycleConfig;
pub use cycle::{CycleState, FrameCycle};
pub use detection::Detection;
pub use error::Error;
pub use frame::FrameDetections;
pub use result::FrameResult;
pub use scene::Scene;
pub use source::{Detector, FrameSource, RawFrame, SourceSpec};

/// Identifier the external tracker assigns to one physical object.
pub type TrackId = i64;
