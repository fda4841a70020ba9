//! Hand-landmark gesture classification.
//!
//! Turns a per-frame stream of 21-point hand landmarks into smoothed
//! telemetry and debounced gesture events: tilts, swipes, finger flicks,
//! pinch start/end, and a pinky click.

pub mod bus;
pub mod cascade;
pub mod config;
pub mod contact;
pub mod engine;
pub mod error;
pub mod events;
pub mod frame_timing;
pub mod guard;
pub mod landmarks;
pub mod metrics;
pub mod orientation;
pub mod pipeline;
pub mod pump;
pub mod state;
pub mod trace;

#[cfg(test)]
mod fixtures;

pub use config::{AnchorPoint, EngineConfig};
pub use engine::{GestureEngine, StopHandle};
pub use error::{ConfigError, FrameError, SourceError};
pub use events::{Direction, EngineEvent, GestureEvent, GesturePayload, GestureTag, TelemetryEvent};
pub use guard::GuardState;
pub use landmarks::{FrameInput, HandLandmark, Handedness, LandmarkFrame, Landmarks, Point2, Point3};
pub use pipeline::FrameOutcome;
pub use pump::{FramePump, LandmarkSource, ScriptedSource, TickResult};
pub use trace::TraceSource;
