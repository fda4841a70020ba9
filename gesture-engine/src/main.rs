//! gesture-replay: run a recorded landmark trace through the engine.
//!
//! Prints every emitted event and, with `--expect`, fails unless the
//! gesture sequence matches exactly.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing::info;

use gesture_engine::frame_timing::{FrameTiming, DEFAULT_BUDGET_MS};
use gesture_engine::{
    EngineConfig, EngineEvent, FramePump, GestureEngine, GestureTag, TickResult, TraceSource,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Sexp,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "gesture-replay", about = "Replay a landmark trace through the gesture engine")]
struct Cli {
    /// JSON-lines trace file
    trace: PathBuf,

    /// TOML config overriding the default thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "sexp")]
    format: Format,

    /// Also print per-frame telemetry and presence changes
    #[arg(long)]
    telemetry: bool,

    /// Comma-separated gesture sequence the trace must produce
    #[arg(long, value_delimiter = ',')]
    expect: Option<Vec<GestureTag>>,

    /// Disable mirror correction
    #[arg(long)]
    no_mirror: bool,

    /// Per-frame budget for the timing report (ms)
    #[arg(long, default_value_t = DEFAULT_BUDGET_MS)]
    budget_ms: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_engine=info,gesture_replay=info".into()),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if cli.no_mirror {
        config.mirror_correction = false;
    }

    let mut engine = GestureEngine::new(config).context("invalid engine config")?;
    let events = engine.broadcast_receiver();
    let source = TraceSource::open(&cli.trace)
        .with_context(|| format!("opening trace {}", cli.trace.display()))?;
    info!(trace = %cli.trace.display(), "replaying");

    let mut pump =
        FramePump::new(source, engine).with_timing(FrameTiming::new(600, cli.budget_ms));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut emitted = Vec::new();

    loop {
        let done = matches!(pump.tick(0.0), TickResult::Exhausted | TickResult::Stopped);
        // Drain after every tick so the bounded channel never fills.
        for event in events.try_iter() {
            if let EngineEvent::Gesture(g) = &event {
                emitted.push(g.gesture);
            } else if !cli.telemetry {
                continue;
            }
            let line = match cli.format {
                Format::Sexp => event.to_sexp(),
                Format::Json => serde_json::to_string(&event).context("encoding event")?,
            };
            writeln!(out, "{line}")?;
        }
        if done {
            break;
        }
    }

    let stats = pump.engine().broadcast_stats();
    info!(
        frames = pump.timing().total_frames,
        source_errors = pump.source_errors(),
        gestures = emitted.len(),
        events_sent = stats.sent,
        events_dropped = stats.dropped,
        "replay finished"
    );
    info!("timing {}", pump.timing().stats_sexp());

    if let Some(expected) = cli.expect {
        if expected != emitted {
            bail!(
                "gesture mismatch: expected [{}], got [{}]",
                join(&expected),
                join(&emitted)
            );
        }
        info!("gesture sequence matched");
    }
    Ok(())
}

fn join(tags: &[GestureTag]) -> String {
    tags.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
}
