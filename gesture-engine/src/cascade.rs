//! Discrete gesture cascade: tilt, then finger flick, then palm swipe.
//!
//! Runs only while the guard is `OpenActive`.  At most one detection wins
//! per frame.  Tilt and flick refresh their baselines on every classified
//! frame even when an earlier stage wins, so a skipped stage never compares
//! against a stale sample.

use tracing::debug;

use crate::config::EngineConfig;
use crate::events::{Direction, GesturePayload, GestureTag};
use crate::landmarks::{HandLandmark, LandmarkFrame, Point2};
use crate::orientation::Orientation;
use crate::state::{EngineState, FingerOffsets, PalmSample};

/// Floor applied to frame intervals so a duplicated timestamp cannot divide
/// by zero.
const MIN_DT_S: f32 = 0.001;

/// A gesture chosen by the cascade for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub tag: GestureTag,
    pub payload: Option<GesturePayload>,
}

/// Run the cascade against the previous-frame history in `state`.
///
/// `anchor` is this frame's swipe anchor.  It is compared against
/// `state.prev_anchor` but not stored; the caller refreshes anchor history
/// on every hand frame.
pub fn classify(
    state: &mut EngineState,
    config: &EngineConfig,
    frame: &LandmarkFrame,
    orientation: &Orientation,
    anchor: Point2,
) -> Option<Detection> {
    let tilt = detect_tilt(state, config, frame, orientation);
    let flick = detect_flick(state, config, frame, anchor);
    let winner = tilt
        .or(flick)
        .or_else(|| detect_swipe(state, config, frame.timestamp_ms, anchor));

    if let Some(d) = &winner {
        debug!(gesture = d.tag.as_str(), t = frame.timestamp_ms, "cascade winner");
    }
    winner
}

// ── Tilt ───────────────────────────────────────────────────

fn palm_sample(frame: &LandmarkFrame, orientation: &Orientation) -> PalmSample {
    if orientation.from_world {
        PalmSample::World {
            pitch_deg: orientation.pitch_deg,
            yaw_deg: orientation.yaw_deg,
        }
    } else {
        let v = frame
            .image_point(HandLandmark::Wrist)
            .to(&frame.image_point(HandLandmark::MiddleMcp));
        PalmSample::Image { dx: v.x, dy: v.y }
    }
}

fn detect_tilt(
    state: &mut EngineState,
    config: &EngineConfig,
    frame: &LandmarkFrame,
    orientation: &Orientation,
) -> Option<Detection> {
    let sample = palm_sample(frame, orientation);
    let prev = state.prev_palm.replace(sample)?;

    // Image-mode deltas are read as radians for the payload.
    let (dv, dh, threshold, in_radians) = match (prev, sample) {
        (
            PalmSample::World { pitch_deg: p0, yaw_deg: y0 },
            PalmSample::World { pitch_deg: p1, yaw_deg: y1 },
        ) => (p1 - p0, y1 - y0, config.tilt_delta_deg, false),
        (PalmSample::Image { dx: x0, dy: y0 }, PalmSample::Image { dx: x1, dy: y1 }) => {
            (y1 - y0, x1 - x0, config.tilt_vector_delta, true)
        }
        // World data appeared or vanished: this frame is a baseline only.
        _ => return None,
    };

    let (direction, delta) = if dv.abs() > dh.abs() && dv.abs() > threshold {
        (if dv > 0.0 { Direction::Down } else { Direction::Up }, dv)
    } else if dh.abs() > threshold {
        (Direction::horizontal(dh > 0.0, config.mirror_correction), dh)
    } else {
        return None;
    };

    Some(Detection {
        tag: GestureTag::tilt(direction),
        payload: Some(GesturePayload::angle(if in_radians {
            delta.to_degrees()
        } else {
            delta
        })),
    })
}

// ── Finger flick ───────────────────────────────────────────

fn detect_flick(
    state: &mut EngineState,
    config: &EngineConfig,
    frame: &LandmarkFrame,
    anchor: Point2,
) -> Option<Detection> {
    let wrist = frame.image_point(HandLandmark::Wrist).xy();
    let offset = |lm: HandLandmark| {
        let p = frame.image_point(lm);
        Point2::new(p.x - wrist.x, p.y - wrist.y)
    };
    let current = FingerOffsets {
        index: offset(HandLandmark::IndexTip),
        middle: offset(HandLandmark::MiddleTip),
        timestamp_ms: frame.timestamp_ms,
    };
    let prev = state.prev_fingers.replace(current)?;

    let dt = ((frame.timestamp_ms - prev.timestamp_ms) / 1000.0) as f32;
    if dt <= 0.0 {
        return None;
    }

    // Palm stability shield: a moving hand drags the fingertips with it.
    if let Some(prev_anchor) = state.prev_anchor {
        let anchor_dt = (((frame.timestamp_ms - prev_anchor.timestamp_ms) / 1000.0) as f32).max(MIN_DT_S);
        let palm_speed = anchor.distance(&prev_anchor.position) / anchor_dt;
        if palm_speed > config.palm_stability_speed {
            return None;
        }
    }

    let vx = peak(
        (current.index.x - prev.index.x) / dt,
        (current.middle.x - prev.middle.x) / dt,
    );
    let vy = peak(
        (current.index.y - prev.index.y) / dt,
        (current.middle.y - prev.middle.y) / dt,
    );

    let (direction, velocity) = if vy.abs() > vx.abs() && vy.abs() > config.flick_velocity {
        (if vy < 0.0 { Direction::Down } else { Direction::Up }, vy)
    } else if vx.abs() > config.flick_velocity {
        (Direction::horizontal(vx > 0.0, config.mirror_correction), vx)
    } else {
        return None;
    };

    Some(Detection {
        tag: GestureTag::flick(direction),
        payload: Some(GesturePayload::velocity(velocity.abs())),
    })
}

/// The value with the larger magnitude.
fn peak(a: f32, b: f32) -> f32 {
    if a.abs() >= b.abs() {
        a
    } else {
        b
    }
}

// ── Swipe ──────────────────────────────────────────────────

fn detect_swipe(
    state: &EngineState,
    config: &EngineConfig,
    timestamp_ms: f64,
    anchor: Point2,
) -> Option<Detection> {
    let prev = state.prev_anchor?;
    let dx = anchor.x - prev.position.x;
    let dy = anchor.y - prev.position.y;
    let distance = anchor.distance(&prev.position);
    let dt = (((timestamp_ms - prev.timestamp_ms) / 1000.0) as f32).max(MIN_DT_S);

    if distance <= config.swipe_min_distance || distance / dt <= config.swipe_min_speed {
        return None;
    }

    let direction = if dx.abs() > dy.abs() {
        if dx.abs() <= config.swipe_min_distance {
            return None;
        }
        Direction::horizontal(dx > 0.0, config.mirror_correction)
    } else {
        if dy.abs() <= config.swipe_min_distance {
            return None;
        }
        if dy < 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    };

    Some(Detection {
        tag: GestureTag::swipe(direction),
        payload: None,
    })
}
