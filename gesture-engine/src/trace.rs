//! Recorded landmark traces: one JSON object per line.
//!
//! ```text
//! {"t": 16.7, "hand": {"image": [[x, y, z], ...21], "world": null, "handedness": "Right"}}
//! {"t": 33.4, "hand": null}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SourceError;
use crate::landmarks::{FrameInput, Handedness, LandmarkFrame, Point3};
use crate::pump::LandmarkSource;

#[derive(Debug, Serialize, Deserialize)]
struct TraceRecord {
    t: f64,
    hand: Option<TraceHand>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TraceHand {
    image: Vec<[f32; 3]>,
    #[serde(default)]
    world: Option<Vec<[f32; 3]>>,
    #[serde(default)]
    handedness: Option<String>,
}

/// Parse one trace line.  `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<FrameInput>, SourceError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let record: TraceRecord = serde_json::from_str(trimmed).map_err(|source| SourceError::TraceParse {
        line: line_no,
        source,
    })?;

    let Some(hand) = record.hand else {
        return Ok(Some(FrameInput::NoHand {
            timestamp_ms: record.t,
        }));
    };
    let image: Vec<Point3> = hand.image.into_iter().map(Point3::from_array).collect();
    let world: Option<Vec<Point3>> = hand
        .world
        .map(|w| w.into_iter().map(Point3::from_array).collect());
    let frame = LandmarkFrame::from_slices(
        &image,
        world.as_deref(),
        Handedness::from_label(hand.handedness.as_deref()),
        record.t,
    )
    .map_err(|source| SourceError::TraceFrame {
        line: line_no,
        source,
    })?;
    Ok(Some(FrameInput::Hand(frame)))
}

/// Encode one input as a trace line (no trailing newline).
pub fn encode(input: &FrameInput) -> Result<String, serde_json::Error> {
    let record = match input {
        FrameInput::NoHand { timestamp_ms } => TraceRecord {
            t: *timestamp_ms,
            hand: None,
        },
        FrameInput::Hand(frame) => TraceRecord {
            t: frame.timestamp_ms,
            hand: Some(TraceHand {
                image: to_rows(&frame.image[..]),
                world: frame.world.as_ref().map(|w| to_rows(&w[..])),
                handedness: match frame.handedness {
                    Handedness::Unknown => None,
                    Handedness::Left => Some("Left".to_string()),
                    Handedness::Right => Some("Right".to_string()),
                },
            }),
        },
    };
    serde_json::to_string(&record)
}

fn to_rows(points: &[Point3]) -> Vec<[f32; 3]> {
    points.iter().map(|p| [p.x, p.y, p.z]).collect()
}

/// `LandmarkSource` over a JSON-lines trace.
pub struct TraceSource<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
}

impl TraceSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let file = File::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened trace");
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> LandmarkSource for TraceSource<R> {
    fn detect(&mut self, _now_ms: f64) -> Result<Option<FrameInput>, SourceError> {
        loop {
            let Some(line) = self.lines.next() else {
                return Ok(None);
            };
            self.line_no += 1;
            if let Some(input) = parse_line(&line?, self.line_no)? {
                return Ok(Some(input));
            }
        }
    }
}
