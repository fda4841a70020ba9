//! Palm orientation ("gimbal") from world-space landmarks.
//!
//! Pitch comes from the wrist to middle-MCP vector, yaw from the index-MCP
//! to pinky-MCP vector.  Yaw is negated for left hands so the same physical
//! rotation reads with the same sign on either hand.

use serde::Serialize;

use crate::landmarks::{HandLandmark, Handedness, LandmarkFrame, Landmarks};

/// Default half-angle of the facing-camera cone, degrees.
pub const DEFAULT_FACING_THRESHOLD_DEG: f32 = 55.0;

/// Resolved orientation for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Orientation {
    pub pitch_deg: f32,
    pub yaw_deg: f32,
    pub is_facing_camera: bool,
    pub handedness: Handedness,
    /// False when the frame had no world landmarks and defaults were used.
    pub from_world: bool,
}

impl Orientation {
    /// Defaults used when world landmarks are missing.
    pub fn neutral(handedness: Handedness) -> Self {
        Self {
            pitch_deg: 0.0,
            yaw_deg: 0.0,
            is_facing_camera: true,
            handedness,
            from_world: false,
        }
    }

    pub fn resolve(frame: &LandmarkFrame, facing_threshold_deg: f32) -> Self {
        let Some(world) = frame.world.as_ref() else {
            return Self::neutral(frame.handedness);
        };

        let pitch_deg = pitch_degrees(world);
        let yaw_deg = yaw_degrees(world, frame.handedness);
        Self {
            pitch_deg,
            yaw_deg,
            is_facing_camera: pitch_deg.abs() < facing_threshold_deg
                && yaw_deg.abs() < facing_threshold_deg,
            handedness: frame.handedness,
            from_world: true,
        }
    }
}

/// 0 for an upright hand, positive as the fingers lean away in depth.
pub fn pitch_degrees(world: &Landmarks) -> f32 {
    let v = world[HandLandmark::Wrist.index()].to(&world[HandLandmark::MiddleMcp.index()]);
    v.z.atan2(-v.y).to_degrees()
}

/// 0 with the knuckle line parallel to the image plane.
pub fn yaw_degrees(world: &Landmarks, handedness: Handedness) -> f32 {
    let v = world[HandLandmark::IndexMcp.index()].to(&world[HandLandmark::PinkyMcp.index()]);
    let yaw = v.z.atan2(v.x.abs()).to_degrees();
    match handedness {
        Handedness::Left => -yaw,
        _ => yaw,
    }
}
