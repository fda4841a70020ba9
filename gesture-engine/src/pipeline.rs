//! One frame pass: metrics, orientation, telemetry, guard, classification.
//!
//! `process` is the whole engine minus delivery.  It reads and writes only
//! the `EngineState` it is handed, so it can be driven directly in tests or
//! by a host that wants its own delivery.

use tracing::debug;

use crate::cascade::classify;
use crate::config::{AnchorPoint, EngineConfig};
use crate::contact::{update_lever, update_pinch, update_pinky};
use crate::events::{GestureEvent, GestureTag, TelemetryEvent};
use crate::guard::{advance, evaluate, is_hand_open};
use crate::landmarks::{FrameInput, HandLandmark, LandmarkFrame, Point2};
use crate::metrics::HandMetrics;
use crate::orientation::Orientation;
use crate::state::{EngineState, TimedPoint};

/// Everything one frame produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    /// Present on every hand frame.
    pub telemetry: Option<TelemetryEvent>,
    /// Gestures in emission order: at most one discrete gesture, then
    /// pinch edges, then pinky click.
    pub gestures: Vec<GestureEvent>,
    /// `Some(true)` when a hand was acquired, `Some(false)` when lost.
    pub presence_changed: Option<bool>,
}

impl FrameOutcome {
    pub fn gesture_tags(&self) -> Vec<GestureTag> {
        self.gestures.iter().map(|g| g.gesture).collect()
    }
}

pub fn process(state: &mut EngineState, config: &EngineConfig, input: &FrameInput) -> FrameOutcome {
    match input {
        FrameInput::Hand(frame) => process_hand(state, config, frame),
        FrameInput::NoHand { timestamp_ms } => process_no_hand(state, *timestamp_ms),
    }
}

fn process_no_hand(state: &mut EngineState, timestamp_ms: f64) -> FrameOutcome {
    let mut outcome = FrameOutcome::default();
    if !state.hand_present {
        return outcome;
    }
    if state.pinching {
        outcome
            .gestures
            .push(GestureEvent::new(GestureTag::PinchEnd, None, timestamp_ms));
    }
    state.clear_on_hand_lost();
    outcome.presence_changed = Some(false);
    debug!(t = timestamp_ms, "hand lost, history cleared");
    outcome
}

fn process_hand(state: &mut EngineState, config: &EngineConfig, frame: &LandmarkFrame) -> FrameOutcome {
    let ts = frame.timestamp_ms;
    let mut outcome = FrameOutcome::default();
    if !state.hand_present {
        state.hand_present = true;
        outcome.presence_changed = Some(true);
        debug!(t = ts, handedness = frame.handedness.as_str(), "hand acquired");
    } else if state.frame_gap_exceeded(ts, config.max_frame_gap_ms) {
        debug!(
            t = ts,
            gap_ms = state.last_hand_ms.map(|last| ts - last),
            "frame gap, motion history cleared"
        );
        state.clear_motion_history();
    }
    state.last_hand_ms = Some(ts);

    let metrics = HandMetrics::extract(frame);
    let orientation = Orientation::resolve(frame, config.facing_threshold_deg);
    let hand_open = is_hand_open(frame, config.open_min_extended);
    let lever = update_lever(state, config, metrics.middle_distance);

    let next = evaluate(
        hand_open,
        orientation.is_facing_camera,
        state.cooldown_elapsed(ts, config.cooldown_ms),
    );
    advance(state, next);

    let anchor = match config.anchor {
        AnchorPoint::Wrist => frame.image_point(HandLandmark::Wrist).xy(),
        AnchorPoint::PalmCenter => metrics.palm_center,
    };
    if state.guard.permits_classification() {
        if let Some(detection) = classify(state, config, frame, &orientation, anchor) {
            if detection.tag.is_discrete() {
                state.last_gesture_ms = Some(ts);
            }
            outcome
                .gestures
                .push(GestureEvent::new(detection.tag, detection.payload, ts));
        }
    }
    state.prev_anchor = Some(TimedPoint {
        position: anchor,
        timestamp_ms: ts,
    });

    if let Some(edge) = update_pinch(state, config, metrics.pinch_distance) {
        outcome.gestures.push(GestureEvent::new(edge, None, ts));
    }
    if update_pinky(state, config, metrics.pinky_distance) {
        debug!(t = ts, distance = metrics.pinky_distance, "pinky click");
        outcome
            .gestures
            .push(GestureEvent::new(GestureTag::PinkyClick, None, ts));
    }

    let cursor = smooth_cursor(state, config, frame);
    let palm_center = if config.mirror_correction {
        metrics.palm_center.mirrored_x()
    } else {
        metrics.palm_center
    };

    outcome.telemetry = Some(TelemetryEvent {
        timestamp_ms: ts,
        landmarks: frame.image,
        world_landmarks: frame.world,
        cursor_projection: cursor,
        palm_center_projection: Some(palm_center),
        pinch_distance: metrics.pinch_distance,
        tilt_angle: metrics.tilt_angle,
        pitch: orientation.pitch_deg,
        yaw: orientation.yaw_deg,
        is_facing_camera: orientation.is_facing_camera,
        handedness: orientation.handedness,
        hand_scale: metrics.hand_scale,
        is_middle_pinch_lever: lever,
        is_pinching: state.pinching,
        hand_open,
        guard: state.guard,
        mirrored: config.mirror_correction,
    });
    outcome
}

/// Index fingertip, mirrored for display and smoothed against the previous
/// cursor.
fn smooth_cursor(state: &mut EngineState, config: &EngineConfig, frame: &LandmarkFrame) -> Point2 {
    let raw = frame.image_point(HandLandmark::IndexTip).xy();
    let raw = if config.mirror_correction { raw.mirrored_x() } else { raw };
    let cursor = match state.cursor {
        Some(prev) => prev.lerp(&raw, 1.0 - config.cursor_smoothing),
        None => raw,
    };
    state.cursor = Some(cursor);
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::guard::GuardState;
    use crate::landmarks::Handedness;

    fn hand(frame: LandmarkFrame) -> FrameInput {
        FrameInput::Hand(frame)
    }

    fn unmirrored() -> EngineConfig {
        EngineConfig {
            mirror_correction: false,
            cursor_smoothing: 0.0,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_telemetry_every_hand_frame() {
        let mut state = EngineState::new();
        let config = EngineConfig::default();
        let out = process(&mut state, &config, &hand(fixtures::open_frame(0.5, 0.8, 0.0)));
        let telemetry = out.telemetry.expect("telemetry");
        assert_eq!(out.presence_changed, Some(true));
        assert!(telemetry.hand_open);
        assert!(telemetry.is_facing_camera);
        assert_eq!(telemetry.guard, GuardState::OpenActive);
        assert!(telemetry.mirrored);

        // Closed hand still gets telemetry
        let closed = fixtures::frame(fixtures::closed_hand(0.5, 0.8), 16.0);
        let out = process(&mut state, &config, &hand(closed));
        let telemetry = out.telemetry.expect("telemetry");
        assert!(!telemetry.hand_open);
        assert_eq!(telemetry.guard, GuardState::Closed);
        assert_eq!(out.presence_changed, None);
    }

    #[test]
    fn test_no_hand_frames() {
        let mut state = EngineState::new();
        let config = EngineConfig::default();
        let out = process(&mut state, &config, &FrameInput::NoHand { timestamp_ms: 0.0 });
        assert_eq!(out, FrameOutcome::default(), "no hand before any hand is silent");

        process(&mut state, &config, &hand(fixtures::open_frame(0.5, 0.8, 16.0)));
        let out = process(&mut state, &config, &FrameInput::NoHand { timestamp_ms: 32.0 });
        assert!(out.telemetry.is_none());
        assert_eq!(out.presence_changed, Some(false));
        assert!(state.prev_anchor.is_none());
        assert_eq!(state.guard, GuardState::Idle);
    }

    #[test]
    fn test_hand_loss_ends_pinch() {
        let mut state = EngineState::new();
        let config = EngineConfig::default();
        let pinched = fixtures::with_pinch_distance(fixtures::open_hand(0.5, 0.8), 0.1);
        let out = process(&mut state, &config, &hand(fixtures::frame(pinched, 0.0)));
        assert_eq!(out.gesture_tags(), vec![GestureTag::PinchStart]);

        let out = process(&mut state, &config, &FrameInput::NoHand { timestamp_ms: 16.0 });
        assert_eq!(out.gesture_tags(), vec![GestureTag::PinchEnd]);
        assert!(!state.pinching);
    }

    #[test]
    fn test_discrete_gesture_starts_cooldown() {
        let mut state = EngineState::new();
        let config = unmirrored();
        process(&mut state, &config, &hand(fixtures::open_frame(0.5, 0.5, 0.0)));
        let out = process(&mut state, &config, &hand(fixtures::open_frame(0.3, 0.5, 100.0)));
        assert_eq!(out.gesture_tags(), vec![GestureTag::SwipeLeft]);
        assert_eq!(state.last_gesture_ms, Some(100.0));

        let out = process(&mut state, &config, &hand(fixtures::open_frame(0.1, 0.5, 200.0)));
        assert!(out.gestures.is_empty());
        assert_eq!(out.telemetry.map(|t| t.guard), Some(GuardState::OpenBlocked));
    }

    #[test]
    fn test_pinch_does_not_start_cooldown() {
        let mut state = EngineState::new();
        let config = EngineConfig::default();
        let pinched = fixtures::with_pinch_distance(fixtures::open_hand(0.5, 0.8), 0.1);
        process(&mut state, &config, &hand(fixtures::frame(pinched, 0.0)));
        assert!(state.last_gesture_ms.is_none());
    }

    #[test]
    fn test_contact_detectors_bypass_guard() {
        let mut state = EngineState::new();
        let config = EngineConfig::default();
        // Turned away from the camera: guard blocks, pinch still tracked
        let pinched = fixtures::with_pinch_distance(fixtures::open_hand(0.5, 0.8), 0.1);
        let frame = fixtures::frame(pinched, 0.0)
            .with_world(fixtures::world_hand(70.0, 0.0))
            .with_handedness(Handedness::Right);
        let out = process(&mut state, &config, &hand(frame));
        assert_eq!(out.gesture_tags(), vec![GestureTag::PinchStart]);
        assert_eq!(state.guard, GuardState::OpenBlocked);
    }

    #[test]
    fn test_frame_gap_drops_motion_baselines() {
        let mut state = EngineState::new();
        let config = unmirrored();
        process(&mut state, &config, &hand(fixtures::open_frame(0.8, 0.5, 0.0)));
        // Upstream stalled without reporting a lost hand
        let out = process(&mut state, &config, &hand(fixtures::open_frame(0.3, 0.5, 1500.0)));
        assert!(out.gestures.is_empty(), "stale baseline produced {:?}", out.gesture_tags());
        assert_eq!(out.presence_changed, None);
        assert_eq!(state.last_hand_ms, Some(1500.0));

        // A fresh baseline classifies normally again
        let out = process(&mut state, &config, &hand(fixtures::open_frame(0.1, 0.5, 1600.0)));
        assert_eq!(out.gesture_tags(), vec![GestureTag::SwipeLeft]);
    }

    #[test]
    fn test_frame_gap_keeps_pinch() {
        let mut state = EngineState::new();
        let config = EngineConfig::default();
        let pinched = fixtures::with_pinch_distance(fixtures::open_hand(0.5, 0.8), 0.1);
        process(&mut state, &config, &hand(fixtures::frame(pinched, 0.0)));
        let out = process(&mut state, &config, &hand(fixtures::frame(pinched, 2000.0)));
        assert!(out.gestures.is_empty());
        assert!(state.pinching);
    }

    #[test]
    fn test_pinky_snap_and_gap() {
        let mut state = EngineState::new();
        let config = EngineConfig::default();
        let pinky = |d: f32, t: f64| {
            hand(fixtures::frame(
                fixtures::with_pinky_distance(fixtures::open_hand(0.5, 0.8), d),
                t,
            ))
        };
        process(&mut state, &config, &pinky(0.6, 0.0));
        let out = process(&mut state, &config, &pinky(0.45, 16.0));
        assert_eq!(out.gesture_tags(), vec![GestureTag::PinkyClick]);
        let out = process(&mut state, &config, &pinky(0.3, 32.0));
        assert!(out.gestures.is_empty(), "latched pinky clicked again");

        // Reopen, then the same closing step spread over a stall
        process(&mut state, &config, &pinky(0.8, 48.0));
        let out = process(&mut state, &config, &pinky(0.45, 1048.0));
        assert!(out.gestures.is_empty(), "snap measured across a stall");
    }

    #[test]
    fn test_middle_lever_telemetry() {
        let mut state = EngineState::new();
        let config = EngineConfig::default();
        let lever = |state: &mut EngineState, d: f32, t: f64| {
            let landmarks = fixtures::with_middle_distance(fixtures::open_hand(0.5, 0.8), d);
            process(state, &config, &hand(fixtures::frame(landmarks, t)))
                .telemetry
                .map(|telemetry| telemetry.is_middle_pinch_lever)
        };
        assert_eq!(lever(&mut state, 0.8, 0.0), Some(false));
        assert_eq!(lever(&mut state, 0.3, 16.0), Some(true));
        // Inside the release margin
        assert_eq!(lever(&mut state, 0.55, 32.0), Some(true));
        assert_eq!(lever(&mut state, 0.7, 48.0), Some(false));
    }

    #[test]
    fn test_cursor_mirroring_and_smoothing() {
        let mut state = EngineState::new();
        let raw = unmirrored();
        let out = process(&mut state, &raw, &hand(fixtures::open_frame(0.5, 0.8, 0.0)));
        let cursor = out.telemetry.unwrap().cursor_projection;
        // Index tip sits at wrist + (-0.05, -0.34)
        assert!((cursor.x - 0.45).abs() < 1e-5, "cursor {cursor:?}");

        let mut state = EngineState::new();
        let mirrored = EngineConfig {
            cursor_smoothing: 0.0,
            ..EngineConfig::default()
        };
        let out = process(&mut state, &mirrored, &hand(fixtures::open_frame(0.5, 0.8, 0.0)));
        let telemetry = out.telemetry.unwrap();
        assert!((telemetry.cursor_projection.x - 0.55).abs() < 1e-5);
        assert!((telemetry.palm_center_projection.unwrap().x - 0.5).abs() < 1e-5);

        let mut state = EngineState::new();
        let smoothed = EngineConfig {
            mirror_correction: false,
            cursor_smoothing: 0.5,
            ..EngineConfig::default()
        };
        process(&mut state, &smoothed, &hand(fixtures::open_frame(0.5, 0.8, 0.0)));
        let out = process(&mut state, &smoothed, &hand(fixtures::open_frame(0.7, 0.8, 16.0)));
        // Halfway between 0.45 and 0.65
        let x = out.telemetry.unwrap().cursor_projection.x;
        assert!((x - 0.55).abs() < 1e-5, "smoothed cursor {x}");
    }
}
