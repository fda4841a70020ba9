//! Hand landmark data model.
//!
//! Models the 21-point hand layout produced by the upstream pose estimator.
//! Every frame carries image-space points (x, y normalized to the video
//! frame, z a relative depth) and optionally world-space points (meters,
//! origin near the wrist).

use serde::{Deserialize, Serialize};

use crate::error::FrameError;

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in estimator order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// (tip, PIP) pairs consulted by the open-hand test.
    pub fn open_test_fingers() -> [(HandLandmark, HandLandmark); 3] {
        [
            (Self::IndexTip, Self::IndexPip),
            (Self::MiddleTip, Self::MiddlePip),
            (Self::RingTip, Self::RingPip),
        ]
    }
}

// ── Handedness ─────────────────────────────────────────────

/// Which hand the estimator reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Unknown => "unknown",
        }
    }

    /// Parse an estimator label ("Left" / "Right"), case-insensitively.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some(l) if l.eq_ignore_ascii_case("left") => Self::Left,
            Some(l) if l.eq_ignore_ascii_case("right") => Self::Right,
            _ => Self::Unknown,
        }
    }
}

// ── Points ─────────────────────────────────────────────────

/// A 2D position, image-normalized unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation toward `target` by `t` (0 = self, 1 = target).
    pub fn lerp(&self, target: &Point2, t: f32) -> Point2 {
        Point2 {
            x: lerp(self.x, target.x, t),
            y: lerp(self.y, target.y, t),
        }
    }

    /// Flip x around the frame center, for a mirrored display.
    pub fn mirrored_x(&self) -> Point2 {
        Point2 {
            x: 1.0 - self.x,
            y: self.y,
        }
    }
}

/// A single 3D landmark position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(p: [f32; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }

    pub fn xy(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Euclidean distance in the x/y plane.
    pub fn distance_2d(&self, other: &Point3) -> f32 {
        self.xy().distance(&other.xy())
    }

    /// Vector from `self` to `other`.
    pub fn to(&self, other: &Point3) -> Point3 {
        Point3::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }

    pub fn scaled(&self, k: f32) -> Point3 {
        Point3::new(self.x * k, self.y * k, self.z * k)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One hand's worth of landmarks, indexed by `HandLandmark`.
pub type Landmarks = [Point3; LANDMARK_COUNT];

// ── Frames ─────────────────────────────────────────────────

/// One estimator result for a detected hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkFrame {
    /// Image-space landmarks.
    pub image: Landmarks,
    /// World-space landmarks, when the estimator provides them.
    pub world: Option<Landmarks>,
    /// Reported handedness.
    pub handedness: Handedness,
    /// Host timestamp in milliseconds.
    pub timestamp_ms: f64,
}

impl LandmarkFrame {
    pub fn new(image: Landmarks, timestamp_ms: f64) -> Self {
        Self {
            image,
            world: None,
            handedness: Handedness::Unknown,
            timestamp_ms,
        }
    }

    pub fn with_world(mut self, world: Landmarks) -> Self {
        self.world = Some(world);
        self
    }

    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = handedness;
        self
    }

    /// Build a frame from estimator slices, checking the 21-point invariant.
    pub fn from_slices(
        image: &[Point3],
        world: Option<&[Point3]>,
        handedness: Handedness,
        timestamp_ms: f64,
    ) -> Result<Self, FrameError> {
        let image = to_landmarks(image, "image")?;
        let world = world.map(|w| to_landmarks(w, "world")).transpose()?;
        Ok(Self {
            image,
            world,
            handedness,
            timestamp_ms,
        })
    }

    /// Image-space position of a landmark.
    pub fn image_point(&self, landmark: HandLandmark) -> Point3 {
        self.image[landmark.index()]
    }

}

/// What the estimator produced for one video frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameInput {
    /// A hand was detected.
    Hand(LandmarkFrame),
    /// No hand in view.
    NoHand { timestamp_ms: f64 },
}

impl FrameInput {
    pub fn timestamp_ms(&self) -> f64 {
        match self {
            Self::Hand(frame) => frame.timestamp_ms,
            Self::NoHand { timestamp_ms } => *timestamp_ms,
        }
    }
}

fn to_landmarks(points: &[Point3], space: &'static str) -> Result<Landmarks, FrameError> {
    if points.len() != LANDMARK_COUNT {
        return Err(FrameError::LandmarkCount {
            space,
            expected: LANDMARK_COUNT,
            actual: points.len(),
        });
    }
    let mut out = [Point3::default(); LANDMARK_COUNT];
    for (i, p) in points.iter().enumerate() {
        if !p.is_finite() {
            return Err(FrameError::NonFinite { space, index: i });
        }
        out[i] = *p;
    }
    Ok(out)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
