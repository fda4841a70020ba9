//! Scale-normalized hand measurements.
//!
//! Everything here is a pure function of one frame.  Finger apertures are
//! divided by `hand_scale` (wrist to middle MCP) so thresholds hold at any
//! distance from the camera.

use serde::Serialize;

use crate::landmarks::{HandLandmark, LandmarkFrame, Point2, Point3};

/// Normalized distance reported when the hand scale collapses to zero.
/// Reads as "maximally open" to every threshold in the engine.
pub const OPEN_HAND_SENTINEL: f32 = 10.0;

/// Below this the hand scale is treated as degenerate.
const MIN_HAND_SCALE: f32 = 1e-6;

/// Per-frame scalar measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandMetrics {
    /// Image-space wrist to middle-MCP distance.
    pub hand_scale: f32,
    /// Thumb tip to index tip, normalized.
    pub pinch_distance: f32,
    /// Pinky tip to pinky MCP, normalized.
    pub pinky_distance: f32,
    /// Middle tip to middle MCP, normalized.
    pub middle_distance: f32,
    /// Midpoint of wrist and middle MCP.
    pub palm_center: Point2,
    /// Angle of the wrist to middle-MCP vector from vertical, radians.
    pub tilt_angle: f32,
}

impl HandMetrics {
    pub fn extract(frame: &LandmarkFrame) -> Self {
        let wrist = frame.image_point(HandLandmark::Wrist);
        let middle_mcp = frame.image_point(HandLandmark::MiddleMcp);
        let hand_scale = wrist.distance_2d(&middle_mcp);

        let pinch_distance = normalized_distance(
            frame.image_point(HandLandmark::ThumbTip),
            frame.image_point(HandLandmark::IndexTip),
            hand_scale,
        );
        let pinky_distance = normalized_distance(
            frame.image_point(HandLandmark::PinkyTip),
            frame.image_point(HandLandmark::PinkyMcp),
            hand_scale,
        );
        let middle_distance = normalized_distance(
            frame.image_point(HandLandmark::MiddleTip),
            middle_mcp,
            hand_scale,
        );

        let palm = wrist.to(&middle_mcp);
        Self {
            hand_scale,
            pinch_distance,
            pinky_distance,
            middle_distance,
            palm_center: Point2::new((wrist.x + middle_mcp.x) * 0.5, (wrist.y + middle_mcp.y) * 0.5),
            tilt_angle: palm.x.atan2(-palm.y),
        }
    }
}

/// Image-space distance between two landmarks in units of `scale`.
pub fn normalized_distance(a: Point3, b: Point3, scale: f32) -> f32 {
    if scale.is_nan() || scale < MIN_HAND_SCALE {
        return OPEN_HAND_SENTINEL;
    }
    a.distance_2d(&b) / scale
}
