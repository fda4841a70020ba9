//! Error types.
//!
//! None of these stop the engine: frame and source errors cost at most one
//! frame, config errors surface before an engine is built.

use std::path::PathBuf;

use thiserror::Error;

/// A landmark frame that violates the 21-point contract.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("expected {expected} {space} landmarks, got {actual}")]
    LandmarkCount {
        space: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{space} landmark {index} has a non-finite coordinate")]
    NonFinite { space: &'static str, index: usize },
}

/// Configuration could not be loaded or is out of range.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// The upstream landmark source failed for one frame.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("landmark detector failed: {0}")]
    Detector(String),
    #[error("trace line {line}: {source}")]
    TraceParse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("trace line {line}: {source}")]
    TraceFrame {
        line: usize,
        #[source]
        source: FrameError,
    },
    #[error("trace read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A gesture name that is not part of the fixed vocabulary.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown gesture `{0}`")]
pub struct UnknownGesture(pub String);
