//! Engine output: gesture events, per-frame telemetry, and the broadcast
//! envelope that carries both.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownGesture;
use crate::guard::GuardState;
use crate::landmarks::{Handedness, Landmarks, Point2};

// ── Gesture vocabulary ─────────────────────────────────────

/// Direction of a tilt, swipe, or flick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Horizontal direction for a signed x delta.  Positive x reads as
    /// right, swapped when the display is mirrored.
    pub fn horizontal(positive: bool, mirrored: bool) -> Self {
        if positive != mirrored {
            Self::Right
        } else {
            Self::Left
        }
    }
}

/// The fixed set of gestures the engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureTag {
    TiltUp,
    TiltDown,
    TiltLeft,
    TiltRight,
    SwipeUp,
    SwipeDown,
    SwipeLeft,
    SwipeRight,
    FingerFlickUp,
    FingerFlickDown,
    FingerFlickLeft,
    FingerFlickRight,
    PinchStart,
    PinchEnd,
    PinkyClick,
}

impl GestureTag {
    pub const ALL: [GestureTag; 15] = [
        Self::TiltUp,
        Self::TiltDown,
        Self::TiltLeft,
        Self::TiltRight,
        Self::SwipeUp,
        Self::SwipeDown,
        Self::SwipeLeft,
        Self::SwipeRight,
        Self::FingerFlickUp,
        Self::FingerFlickDown,
        Self::FingerFlickLeft,
        Self::FingerFlickRight,
        Self::PinchStart,
        Self::PinchEnd,
        Self::PinkyClick,
    ];

    pub fn tilt(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::TiltUp,
            Direction::Down => Self::TiltDown,
            Direction::Left => Self::TiltLeft,
            Direction::Right => Self::TiltRight,
        }
    }

    pub fn swipe(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::SwipeUp,
            Direction::Down => Self::SwipeDown,
            Direction::Left => Self::SwipeLeft,
            Direction::Right => Self::SwipeRight,
        }
    }

    pub fn flick(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::FingerFlickUp,
            Direction::Down => Self::FingerFlickDown,
            Direction::Left => Self::FingerFlickLeft,
            Direction::Right => Self::FingerFlickRight,
        }
    }

    /// Whether this gesture comes from the guarded cascade and so starts
    /// the cooldown.  Contact gestures (pinch, pinky) never do.
    pub fn is_discrete(&self) -> bool {
        !matches!(self, Self::PinchStart | Self::PinchEnd | Self::PinkyClick)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TiltUp => "tilt-up",
            Self::TiltDown => "tilt-down",
            Self::TiltLeft => "tilt-left",
            Self::TiltRight => "tilt-right",
            Self::SwipeUp => "swipe-up",
            Self::SwipeDown => "swipe-down",
            Self::SwipeLeft => "swipe-left",
            Self::SwipeRight => "swipe-right",
            Self::FingerFlickUp => "finger-flick-up",
            Self::FingerFlickDown => "finger-flick-down",
            Self::FingerFlickLeft => "finger-flick-left",
            Self::FingerFlickRight => "finger-flick-right",
            Self::PinchStart => "pinch-start",
            Self::PinchEnd => "pinch-end",
            Self::PinkyClick => "pinky-click",
        }
    }
}

impl fmt::Display for GestureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GestureTag {
    type Err = UnknownGesture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownGesture(s.to_string()))
    }
}

// ── Events ─────────────────────────────────────────────────

/// Optional numeric detail attached to a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GesturePayload {
    /// Rotation in degrees (tilts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f32>,
    /// Peak velocity in normalized units per second (flicks).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f32>,
}

impl GesturePayload {
    pub fn angle(angle: f32) -> Self {
        Self {
            angle: Some(angle),
            velocity: None,
        }
    }

    pub fn velocity(velocity: f32) -> Self {
        Self {
            angle: None,
            velocity: Some(velocity),
        }
    }
}

/// One fired gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureEvent {
    pub gesture: GestureTag,
    pub data: Option<GesturePayload>,
    pub timestamp_ms: f64,
}

impl GestureEvent {
    pub fn new(gesture: GestureTag, data: Option<GesturePayload>, timestamp_ms: f64) -> Self {
        Self {
            gesture,
            data,
            timestamp_ms,
        }
    }

    pub fn to_sexp(&self) -> String {
        let mut fields = vec![
            ("gesture", format!("\"{}\"", self.gesture)),
            ("t", format!("{:.1}", self.timestamp_ms)),
        ];
        if let Some(data) = &self.data {
            if let Some(angle) = data.angle {
                fields.push(("angle", format!("{angle:.2}")));
            }
            if let Some(velocity) = data.velocity {
                fields.push(("velocity", format!("{velocity:.3}")));
            }
        }
        format_event("gesture", &fields)
    }
}

/// Continuous per-frame snapshot, emitted whenever a hand is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub timestamp_ms: f64,
    pub landmarks: Landmarks,
    pub world_landmarks: Option<Landmarks>,
    /// Smoothed index-fingertip cursor, mirror-corrected.
    pub cursor_projection: Point2,
    /// Palm center, mirror-corrected.
    pub palm_center_projection: Option<Point2>,
    pub pinch_distance: f32,
    /// Radians.
    pub tilt_angle: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub is_facing_camera: bool,
    pub handedness: Handedness,
    pub hand_scale: f32,
    pub is_middle_pinch_lever: bool,
    pub is_pinching: bool,
    pub hand_open: bool,
    pub guard: GuardState,
    pub mirrored: bool,
}

impl TelemetryEvent {
    pub fn to_sexp(&self) -> String {
        format_event(
            "telemetry",
            &[
                ("t", format!("{:.1}", self.timestamp_ms)),
                (
                    "cursor",
                    format!("({:.4} {:.4})", self.cursor_projection.x, self.cursor_projection.y),
                ),
                ("pinch", format!("{:.3}", self.pinch_distance)),
                ("pitch", format!("{:.1}", self.pitch)),
                ("yaw", format!("{:.1}", self.yaw)),
                ("facing", sexp_bool(self.is_facing_camera)),
                ("open", sexp_bool(self.hand_open)),
                ("pinching", sexp_bool(self.is_pinching)),
                ("lever", sexp_bool(self.is_middle_pinch_lever)),
                ("guard", format!(":{}", self.guard.as_str())),
            ],
        )
    }
}

/// Everything that goes out on the broadcast channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EngineEvent {
    Gesture(GestureEvent),
    Telemetry(Box<TelemetryEvent>),
    /// A hand was acquired (`true`) or lost (`false`).
    HandPresence { present: bool, timestamp_ms: f64 },
}

impl EngineEvent {
    pub fn to_sexp(&self) -> String {
        match self {
            Self::Gesture(g) => g.to_sexp(),
            Self::Telemetry(t) => t.to_sexp(),
            Self::HandPresence {
                present,
                timestamp_ms,
            } => format_event(
                "hand-presence",
                &[
                    ("present", sexp_bool(*present)),
                    ("t", format!("{timestamp_ms:.1}")),
                ],
            ),
        }
    }
}

/// Format an event s-expression: `(:type :event :event :NAME :k v ...)`.
pub fn format_event(event_type: &str, fields: &[(&str, String)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}

pub(crate) fn sexp_bool(b: bool) -> String {
    if b { "t" } else { "nil" }.to_string()
}
