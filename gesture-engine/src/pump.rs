//! Host-side driver: pulls frames from a landmark source and feeds the
//! engine, one tick per video frame.
//!
//! The pose estimator itself is outside this crate.  Anything that can
//! produce a `FrameInput` per tick implements `LandmarkSource`.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{info, warn};

use crate::engine::GestureEngine;
use crate::error::SourceError;
use crate::events::GestureTag;
use crate::frame_timing::FrameTiming;
use crate::landmarks::FrameInput;
use crate::pipeline::FrameOutcome;

/// A per-frame landmark producer.
pub trait LandmarkSource {
    /// Produce the input for the frame at `now_ms`.
    ///
    /// `Ok(None)` means the source is exhausted.  An error costs one frame;
    /// the pump keeps ticking.
    fn detect(&mut self, now_ms: f64) -> Result<Option<FrameInput>, SourceError>;
}

/// Source that replays a fixed list of results, errors included.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<Result<FrameInput, SourceError>>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = Result<FrameInput, SourceError>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn from_inputs(inputs: impl IntoIterator<Item = FrameInput>) -> Self {
        Self::new(inputs.into_iter().map(Ok))
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl LandmarkSource for ScriptedSource {
    fn detect(&mut self, _now_ms: f64) -> Result<Option<FrameInput>, SourceError> {
        self.frames.pop_front().transpose()
    }
}

/// What one tick did.
#[derive(Debug)]
pub enum TickResult {
    Processed(FrameOutcome),
    /// The source failed; the frame was skipped.
    SourceFailed,
    Exhausted,
    Stopped,
}

/// Totals from `run_until_exhausted`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub source_errors: u64,
    pub gestures: Vec<GestureTag>,
}

/// Drives one engine from one source.
pub struct FramePump<S: LandmarkSource> {
    source: S,
    engine: GestureEngine,
    timing: FrameTiming,
    source_errors: u64,
}

impl<S: LandmarkSource> FramePump<S> {
    pub fn new(source: S, engine: GestureEngine) -> Self {
        Self {
            source,
            engine,
            timing: FrameTiming::default(),
            source_errors: 0,
        }
    }

    pub fn with_timing(mut self, timing: FrameTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Pull one frame and run it through the engine.
    pub fn tick(&mut self, now_ms: f64) -> TickResult {
        if !self.engine.is_active() {
            return TickResult::Stopped;
        }

        let detect_start = Instant::now();
        let input = match self.source.detect(now_ms) {
            Ok(Some(input)) => input,
            Ok(None) => return TickResult::Exhausted,
            Err(e) => {
                self.source_errors += 1;
                warn!(error = %e, errors = self.source_errors, "landmark source failed, skipping frame");
                return TickResult::SourceFailed;
            }
        };
        let detect_ms = detect_start.elapsed().as_secs_f64() * 1000.0;

        let process_start = Instant::now();
        let outcome = self.engine.process_frame(&input);
        let process_ms = process_start.elapsed().as_secs_f64() * 1000.0;
        self.timing.record(detect_ms, process_ms);

        TickResult::Processed(outcome)
    }

    /// Tick until the source runs dry or the engine stops.  Frames carry
    /// their own timestamps, so `now_ms` is only advisory here.
    pub fn run_until_exhausted(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut now_ms = 0.0;
        loop {
            match self.tick(now_ms) {
                TickResult::Processed(outcome) => {
                    summary.frames += 1;
                    summary.gestures.extend(outcome.gesture_tags());
                }
                TickResult::SourceFailed => summary.source_errors += 1,
                TickResult::Exhausted | TickResult::Stopped => break,
            }
            now_ms += crate::frame_timing::DEFAULT_BUDGET_MS;
        }
        info!(
            frames = summary.frames,
            gestures = summary.gestures.len(),
            source_errors = summary.source_errors,
            "source exhausted"
        );
        summary
    }

    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    pub fn source_errors(&self) -> u64 {
        self.source_errors
    }

    pub fn into_parts(self) -> (S, GestureEngine) {
        (self.source, self.engine)
    }
}
