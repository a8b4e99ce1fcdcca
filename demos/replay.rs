use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

use trackstate::replay::{DetectionLog, Recorded};
use trackstate::{CycleConfig, CycleState, FrameCycle, SourceSpec};

/// Replays a recorded detection log through the annotation state.
#[derive(Parser, Debug)]
#[command(name = "replay")]
struct Args {
    /// Detection log, one `<frame_idx>:<json>` line per frame
    detections: PathBuf,
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured confidence threshold
    #[arg(long)]
    conf: Option<f32>,
    #[arg(long)]
    display_width: Option<u32>,
    #[arg(long)]
    no_trajectories: bool,
    #[arg(long)]
    no_labels: bool,
    /// Ticks per second, 0 replays as fast as possible
    #[arg(long, default_value_t = 0)]
    fps: u32,
    /// Print every frame result as a JSON line
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trackstate=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CycleConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CycleConfig::default(),
    };
    if let Some(conf) = args.conf {
        config.set_confidence_threshold(conf);
    }
    if let Some(width) = args.display_width {
        config.display_width = width;
    }
    config.show_trajectories &= !args.no_trajectories;
    config.show_labels &= !args.no_labels;

    info!(
        "conf={:.2} display_width={} trajectories={} labels={}",
        config.confidence_threshold,
        config.display_width,
        config.show_trajectories,
        config.show_labels
    );

    let mut cycle = FrameCycle::new(DetectionLog::new(), Recorded);
    cycle
        .open(SourceSpec::File(args.detections.clone()), &config)
        .with_context(|| format!("opening {}", args.detections.display()))?;

    let period = (args.fps > 0).then(|| Duration::from_secs_f64(1.0 / args.fps as f64));

    while cycle.state() == CycleState::Running {
        let started = Instant::now();

        if let Some(result) = cycle.tick(&config) {
            if args.json {
                println!("{}", serde_json::to_string(&result)?);
            } else {
                println!(
                    "frame {:>5}: {:>3} objects, {:>3} tracks, fwd {:>2} bwd {:>2} | total fwd {} bwd {} | {:.1} fps {}",
                    result.frame_index,
                    result.detections.len(),
                    result.live_tracks,
                    result.motion.forward,
                    result.motion.backward,
                    result.totals.forward,
                    result.totals.backward,
                    result.fps,
                    result.elapsed_label(),
                );
            }
        }

        if let Some(period) = period {
            if let Some(rest) = period.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }

    let totals = cycle.scene().totals();
    info!(
        "replayed {} frames: forward={} backward={}",
        cycle.scene().frame_count(),
        totals.forward,
        totals.backward
    );

    Ok(())
}
