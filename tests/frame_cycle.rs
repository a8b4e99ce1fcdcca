use std::collections::{HashMap, VecDeque};
use std::io::Write;

use trackstate::bbox::BBox;
use trackstate::motion::DirectionTotals;
use trackstate::replay::{DetectionLog, Recorded, RecordedFrame};
use trackstate::{
    CycleConfig, CycleState, Detection, Detector, Error, FrameCycle, FrameSource, RawFrame,
    SourceSpec,
};

/// Capture stand-in: every opened source plays the same scripted frames.
struct ScriptedSource {
    script: HashMap<String, Vec<Vec<Detection>>>,
    queue: VecDeque<Vec<Detection>>,
    open: bool,
}

struct ScriptedFrame(Vec<Detection>);

impl RawFrame for ScriptedFrame {
    fn dims(&self) -> (u32, u32) {
        (1280, 720)
    }
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            script: HashMap::new(),
            queue: VecDeque::new(),
            open: false,
        }
    }

    fn with(mut self, name: &str, frames: Vec<Vec<Detection>>) -> Self {
        self.script.insert(name.to_string(), frames);
        self
    }
}

impl FrameSource for ScriptedSource {
    type Frame = ScriptedFrame;

    fn open(&mut self, spec: &SourceSpec) -> Result<(), Error> {
        match self.script.get(&spec.to_string()) {
            Some(frames) => {
                self.queue = frames.iter().cloned().collect();
                self.open = true;
                Ok(())
            }
            None => Err(Error::SourceUnavailable {
                name: spec.to_string(),
                reason: "no such script".into(),
            }),
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn read(&mut self) -> Option<ScriptedFrame> {
        let frame = self.queue.pop_front().map(ScriptedFrame);
        if frame.is_none() {
            self.open = false;
        }
        frame
    }

    fn close(&mut self) {
        self.open = false;
        self.queue.clear();
    }
}

/// Fails on frames that carry the track id `FAIL`.
struct FlakyDetector;

const FAIL: i64 = -1;

impl Detector<ScriptedFrame> for FlakyDetector {
    fn detect(&mut self, frame: &ScriptedFrame) -> Result<Vec<Detection>, Error> {
        if frame.0.iter().any(|d| d.track_id == FAIL) {
            return Err(Error::Detector("inference failed".into()));
        }
        Ok(frame.0.clone())
    }
}

fn det(id: i64, cx: f32, cy: f32) -> Detection {
    Detection::from_xywh(id, BBox::xywh(cx, cy, 20.0, 40.0), 0.9)
}

fn file(name: &str) -> SourceSpec {
    SourceSpec::File(name.into())
}

#[test]
fn single_track_end_to_end() {
    let source = ScriptedSource::new().with(
        "walk.mp4",
        vec![
            vec![det(1, 10.0, 10.0)],
            vec![det(1, 10.0, 20.0)],
            vec![det(1, 10.0, 15.0)],
        ],
    );
    let config = CycleConfig::default();
    let mut cycle = FrameCycle::new(source, FlakyDetector);
    cycle.open(file("walk.mp4"), &config).unwrap();

    let results: Vec<_> = (0..3).filter_map(|_| cycle.tick(&config)).collect();
    assert_eq!(results.len(), 3);

    let history: Vec<(f32, f32)> = cycle
        .scene()
        .history()
        .get(1)
        .unwrap()
        .points()
        .map(|p| (p.x, p.y))
        .collect();
    assert_eq!(history, vec![(10.0, 10.0), (10.0, 20.0), (10.0, 15.0)]);

    assert_eq!((results[1].motion.forward, results[1].motion.backward), (1, 0));
    assert_eq!((results[2].motion.forward, results[2].motion.backward), (0, 1));
    assert_eq!(
        results[2].totals,
        DirectionTotals {
            forward: 1,
            backward: 1
        }
    );
    assert!(results.iter().all(|r| r.live_tracks == 1));
}

#[test]
fn reopening_resets_the_session() {
    let frames = vec![
        vec![det(1, 0.0, 0.0), det(2, 0.0, 0.0), det(3, 0.0, 0.0), det(4, 0.0, 0.0)],
        vec![det(1, 0.0, 5.0), det(2, 0.0, 5.0), det(3, 0.0, -5.0), det(4, 0.0, 0.0)],
        vec![det(1, 0.0, 9.0), det(2, 0.0, 5.0), det(3, 0.0, -9.0), det(4, 0.0, 0.0)],
    ];
    let source = ScriptedSource::new().with("a.mp4", frames);
    let config = CycleConfig::default();
    let mut cycle = FrameCycle::new(source, FlakyDetector);

    cycle.open(file("a.mp4"), &config).unwrap();
    let mut last = None;
    for _ in 0..3 {
        last = cycle.tick(&config).or(last);
    }
    let last = last.unwrap();
    assert_eq!(
        last.totals,
        DirectionTotals {
            forward: 3,
            backward: 2
        }
    );
    assert_eq!(last.live_tracks, 4);

    cycle.close();
    assert_eq!(cycle.state(), CycleState::Idle);
    cycle.open(file("a.mp4"), &config).unwrap();

    assert_eq!(cycle.scene().totals(), DirectionTotals::default());
    assert_eq!(cycle.scene().live_tracks(), 0);
    assert!(cycle.scene().history().is_empty());
    assert_eq!(cycle.scene().frame_count(), 0);
}

#[test]
fn failed_open_keeps_state() {
    let source = ScriptedSource::new().with(
        "a.mp4",
        vec![vec![det(1, 0.0, 0.0)], vec![det(1, 0.0, 3.0)]],
    );
    let config = CycleConfig::default();
    let mut cycle = FrameCycle::new(source, FlakyDetector);

    cycle.open(file("a.mp4"), &config).unwrap();
    cycle.tick(&config);
    cycle.tick(&config);
    cycle.close();

    let err = cycle.open(file("missing.mp4"), &config).unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }));
    assert_eq!(cycle.state(), CycleState::Idle);
    assert_eq!(cycle.scene().totals().forward, 1);
    assert_eq!(cycle.scene().live_tracks(), 1);
}

#[test]
fn reappearing_track_starts_a_new_history() {
    let frames = vec![
        vec![det(7, 0.0, 0.0), det(8, 0.0, 0.0)],
        vec![det(7, 0.0, 10.0), det(8, 0.0, 0.0)],
        vec![det(8, 0.0, 0.0)],
        vec![det(8, 0.0, 0.0)],
        vec![det(7, 0.0, 50.0), det(8, 0.0, 0.0)],
    ];
    let source = ScriptedSource::new().with("a.mp4", frames);
    let config = CycleConfig::default();
    let mut cycle = FrameCycle::new(source, FlakyDetector);
    cycle.open(file("a.mp4"), &config).unwrap();

    cycle.tick(&config);
    cycle.tick(&config);
    let r = cycle.tick(&config).unwrap();
    assert!(cycle.scene().history().get(7).is_none());
    assert_eq!(r.live_tracks, 1);

    cycle.tick(&config);
    let r = cycle.tick(&config).unwrap();

    assert_eq!(cycle.scene().history().get(7).map(|h| h.len()), Some(1));
    assert_eq!(r.motion.forward, 0);
    assert_eq!(r.totals.forward, 1);
}

#[test]
fn threshold_changes_apply_on_the_next_tick() {
    let frames = vec![
        vec![det(1, 0.0, 0.0), Detection { confidence: 0.4, ..det(2, 0.0, 0.0) }],
        vec![det(1, 0.0, 1.0), Detection { confidence: 0.4, ..det(2, 0.0, 1.0) }],
    ];
    let source = ScriptedSource::new().with("a.mp4", frames);
    let mut config = CycleConfig::default();
    let mut cycle = FrameCycle::new(source, FlakyDetector);
    cycle.open(file("a.mp4"), &config).unwrap();

    assert_eq!(cycle.tick(&config).unwrap().detections.len(), 2);

    config.set_confidence_threshold(0.5);
    let r = cycle.tick(&config).unwrap();
    assert_eq!(r.detections.len(), 1);
    assert_eq!(r.live_tracks, 1);
    assert_eq!(r.totals.forward, 1);
}

#[test]
fn detector_failure_skips_the_frame() {
    let frames = vec![
        vec![det(1, 0.0, 0.0)],
        vec![det(FAIL, 0.0, 0.0)],
        vec![det(1, 0.0, 2.0)],
    ];
    let source = ScriptedSource::new().with("a.mp4", frames);
    let config = CycleConfig::default();
    let mut cycle = FrameCycle::new(source, FlakyDetector);
    cycle.open(file("a.mp4"), &config).unwrap();

    assert!(cycle.tick(&config).is_some());
    assert!(cycle.tick(&config).is_none());
    assert_eq!(cycle.state(), CycleState::Running);

    let r = cycle.tick(&config).unwrap();
    assert_eq!(r.frame_index, 2);
    assert_eq!(r.motion.forward, 1);
    assert_eq!(r.live_tracks, 1);
}

#[test]
fn replays_a_detection_log() {
    let path = std::env::temp_dir().join(format!("trackstate-replay-{}.dets", std::process::id()));
    {
        let mut out = std::fs::File::create(&path).unwrap();
        for (idx, y) in [100.0, 140.0, 140.0, 90.0].into_iter().enumerate() {
            let frame = RecordedFrame {
                dims: (1920, 1080),
                detections: vec![det(5, 300.0, y)],
            };
            writeln!(out, "{}", frame.to_line(idx as u64).unwrap()).unwrap();
        }
    }

    let config = CycleConfig::default();
    let mut cycle = FrameCycle::new(DetectionLog::new(), Recorded);
    cycle.open(SourceSpec::File(path.clone()), &config).unwrap();

    let mut results = Vec::new();
    while cycle.state() == CycleState::Running {
        if let Some(r) = cycle.tick(&config) {
            results.push(r);
        }
    }
    std::fs::remove_file(&path).unwrap();

    assert_eq!(results.len(), 4);
    let last = results.last().unwrap();
    assert_eq!(
        last.totals,
        DirectionTotals {
            forward: 1,
            backward: 1
        }
    );
    assert_eq!(last.display_dims, (640, 360));
    assert_eq!(last.trajectories.len(), 1);
    assert_eq!(last.trajectories[0].points.len(), 4);
    assert_eq!(last.trajectories[0].points[3].y, 30);
}
