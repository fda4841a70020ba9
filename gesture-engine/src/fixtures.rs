//! Synthetic hand poses shared by unit tests.
//!
//! The canonical pose is an upright right hand with every finger extended,
//! wrist at `(wx, wy)` and the middle MCP 0.2 above it, so `hand_scale` is 0.2.

use crate::landmarks::{HandLandmark, LandmarkFrame, Landmarks, Point3, LANDMARK_COUNT};

pub const SCALE: f32 = 0.2;

const OPEN_OFFSETS: [(f32, f32); LANDMARK_COUNT] = [
    (0.0, 0.0),
    (-0.05, -0.03),
    (-0.08, -0.06),
    (-0.10, -0.09),
    (-0.12, -0.12),
    (-0.04, -0.19),
    (-0.045, -0.26),
    (-0.05, -0.30),
    (-0.05, -0.34),
    (0.0, -0.20),
    (0.0, -0.28),
    (0.0, -0.32),
    (0.0, -0.36),
    (0.04, -0.19),
    (0.045, -0.26),
    (0.05, -0.30),
    (0.05, -0.33),
    (0.08, -0.17),
    (0.09, -0.22),
    (0.095, -0.26),
    (0.10, -0.30),
];

/// Upright open hand with the wrist at `(wx, wy)`.
pub fn open_hand(wx: f32, wy: f32) -> Landmarks {
    let mut out = [Point3::default(); LANDMARK_COUNT];
    for (i, (dx, dy)) in OPEN_OFFSETS.iter().enumerate() {
        out[i] = Point3::new(wx + dx, wy + dy, 0.0);
    }
    out
}

/// Fist: index, middle and ring tips folded below their PIP joints.
pub fn closed_hand(wx: f32, wy: f32) -> Landmarks {
    let mut out = open_hand(wx, wy);
    for (tip, pip) in HandLandmark::open_test_fingers() {
        let p = out[pip.index()];
        out[tip.index()] = Point3::new(p.x, p.y + 0.05, 0.0);
    }
    out
}

pub fn set_point(landmarks: &mut Landmarks, landmark: HandLandmark, x: f32, y: f32) {
    landmarks[landmark.index()] = Point3::new(x, y, 0.0);
}

/// Move the thumb tip so the normalized pinch distance equals `d`.
pub fn with_pinch_distance(mut landmarks: Landmarks, d: f32) -> Landmarks {
    let index_tip = landmarks[HandLandmark::IndexTip.index()];
    landmarks[HandLandmark::ThumbTip.index()] =
        Point3::new(index_tip.x + d * SCALE, index_tip.y, 0.0);
    landmarks
}

/// Move the pinky tip so the normalized pinky-to-MCP distance equals `d`.
pub fn with_pinky_distance(mut landmarks: Landmarks, d: f32) -> Landmarks {
    let mcp = landmarks[HandLandmark::PinkyMcp.index()];
    landmarks[HandLandmark::PinkyTip.index()] = Point3::new(mcp.x, mcp.y - d * SCALE, 0.0);
    landmarks
}

/// Move the middle tip so the normalized middle-to-MCP distance equals `d`.
pub fn with_middle_distance(mut landmarks: Landmarks, d: f32) -> Landmarks {
    let mcp = landmarks[HandLandmark::MiddleMcp.index()];
    landmarks[HandLandmark::MiddleTip.index()] = Point3::new(mcp.x, mcp.y - d * SCALE, 0.0);
    landmarks
}

/// World-space landmarks for a right hand rotated to `pitch_deg` / `yaw_deg`.
pub fn world_hand(pitch_deg: f32, yaw_deg: f32) -> Landmarks {
    let mut out = [Point3::default(); LANDMARK_COUNT];
    let pitch = pitch_deg.to_radians();
    let yaw = yaw_deg.to_radians();
    out[HandLandmark::MiddleMcp.index()] =
        Point3::new(0.0, -0.09 * pitch.cos(), 0.09 * pitch.sin());
    let index_mcp = Point3::new(-0.02, -0.085, 0.0);
    out[HandLandmark::IndexMcp.index()] = index_mcp;
    out[HandLandmark::PinkyMcp.index()] = Point3::new(
        index_mcp.x + 0.06 * yaw.cos(),
        index_mcp.y + 0.015,
        0.06 * yaw.sin(),
    );
    out
}

pub fn frame(landmarks: Landmarks, timestamp_ms: f64) -> LandmarkFrame {
    LandmarkFrame::new(landmarks, timestamp_ms)
}

pub fn open_frame(wx: f32, wy: f32, timestamp_ms: f64) -> LandmarkFrame {
    frame(open_hand(wx, wy), timestamp_ms)
}
