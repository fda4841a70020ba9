//! Engine history: everything the classifiers remember between frames.
//!
//! Owned by exactly one engine and threaded by `&mut` through each frame
//! pass.  Nothing else mutates it.

use crate::events::sexp_bool;
use crate::guard::GuardState;
use crate::landmarks::Point2;

/// A position stamped with the host time it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPoint {
    pub position: Point2,
    pub timestamp_ms: f64,
}

/// Previous palm-orientation sample used by the tilt classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PalmSample {
    /// Gimbal angles from world landmarks, degrees.
    World { pitch_deg: f32, yaw_deg: f32 },
    /// Image-space wrist to middle-MCP vector.
    Image { dx: f32, dy: f32 },
}

/// Index and middle fingertip offsets from the wrist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerOffsets {
    pub index: Point2,
    pub middle: Point2,
    pub timestamp_ms: f64,
}

/// Per-hand classifier history.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    /// Current guard state.
    pub guard: GuardState,
    /// Whether the previous frame had a hand.
    pub hand_present: bool,
    /// Host time of the previous hand frame.
    pub last_hand_ms: Option<f64>,
    /// Anchor (wrist or palm center) from the previous hand frame.
    pub prev_anchor: Option<TimedPoint>,
    /// Palm orientation from the last classified frame.
    pub prev_palm: Option<PalmSample>,
    /// Fingertip offsets from the last classified frame.
    pub prev_fingers: Option<FingerOffsets>,
    /// Normalized pinky-to-MCP distance from the previous hand frame.
    pub prev_pinky_distance: Option<f32>,
    /// Thumb and index in contact.
    pub pinching: bool,
    /// A pinky click fired and the finger has not reopened yet.
    pub pinky_latched: bool,
    /// Middle finger folded onto the palm.
    pub middle_lever: bool,
    /// Host time the last discrete gesture fired.
    pub last_gesture_ms: Option<f64>,
    /// Smoothed cursor from the previous frame.
    pub cursor: Option<Point2>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a discrete gesture may fire at `now_ms`.
    pub fn cooldown_elapsed(&self, now_ms: f64, cooldown_ms: f64) -> bool {
        match self.last_gesture_ms {
            Some(last) => now_ms - last >= cooldown_ms,
            None => true,
        }
    }

    /// Drop the rotation and flick baselines.  Anchor history is kept so a
    /// swipe baseline survives short guard blocks.
    pub fn clear_orientation_history(&mut self) {
        self.prev_palm = None;
        self.prev_fingers = None;
    }

    /// Drop every baseline a velocity or delta is computed from.  Contact
    /// latches and the cursor are kept.
    pub fn clear_motion_history(&mut self) {
        self.prev_anchor = None;
        self.prev_palm = None;
        self.prev_fingers = None;
        self.prev_pinky_distance = None;
    }

    /// Whether more than `max_gap_ms` passed since the previous hand frame.
    pub fn frame_gap_exceeded(&self, now_ms: f64, max_gap_ms: f64) -> bool {
        self.last_hand_ms.is_some_and(|last| now_ms - last > max_gap_ms)
    }

    /// Forget all motion and contact history after the hand leaves view.
    /// The cooldown timestamp survives: it is wall-clock, not a delta.
    pub fn clear_on_hand_lost(&mut self) {
        self.guard = GuardState::Idle;
        self.hand_present = false;
        self.last_hand_ms = None;
        self.clear_motion_history();
        self.pinching = false;
        self.pinky_latched = false;
        self.middle_lever = false;
        self.cursor = None;
    }

    /// Reset all history, including the cooldown.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:guard :{} :hand {} :pinching {} :pinky-latched {} :lever {} :last-gesture-ms {})",
            self.guard.as_str(),
            sexp_bool(self.hand_present),
            sexp_bool(self.pinching),
            sexp_bool(self.pinky_latched),
            sexp_bool(self.middle_lever),
            self.last_gesture_ms
                .map(|t| format!("{t:.0}"))
                .unwrap_or_else(|| "nil".to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> EngineState {
        EngineState {
            guard: GuardState::OpenActive,
            hand_present: true,
            last_hand_ms: Some(10.0),
            prev_anchor: Some(TimedPoint {
                position: Point2::new(0.5, 0.5),
                timestamp_ms: 10.0,
            }),
            prev_palm: Some(PalmSample::Image { dx: 0.0, dy: -0.2 }),
            prev_fingers: Some(FingerOffsets {
                index: Point2::new(0.0, -0.3),
                middle: Point2::new(0.0, -0.35),
                timestamp_ms: 10.0,
            }),
            prev_pinky_distance: Some(0.6),
            pinching: true,
            pinky_latched: true,
            middle_lever: true,
            last_gesture_ms: Some(5.0),
            cursor: Some(Point2::new(0.4, 0.4)),
        }
    }

    #[test]
    fn test_cooldown_elapsed() {
        let mut state = EngineState::new();
        assert!(state.cooldown_elapsed(0.0, 400.0));
        state.last_gesture_ms = Some(100.0);
        assert!(!state.cooldown_elapsed(499.0, 400.0));
        assert!(state.cooldown_elapsed(500.0, 400.0));
    }

    #[test]
    fn test_clear_orientation_keeps_anchor() {
        let mut state = populated();
        state.clear_orientation_history();
        assert!(state.prev_palm.is_none());
        assert!(state.prev_fingers.is_none());
        assert!(state.prev_anchor.is_some());
        assert_eq!(state.prev_pinky_distance, Some(0.6));
    }

    #[test]
    fn test_clear_motion_history_keeps_contacts() {
        let mut state = populated();
        state.clear_motion_history();
        assert!(state.prev_anchor.is_none());
        assert!(state.prev_palm.is_none());
        assert!(state.prev_fingers.is_none());
        assert!(state.prev_pinky_distance.is_none());
        assert!(state.pinching);
        assert!(state.pinky_latched);
        assert!(state.cursor.is_some());
    }

    #[test]
    fn test_frame_gap_exceeded() {
        let mut state = EngineState::new();
        assert!(!state.frame_gap_exceeded(10_000.0, 250.0));
        state.last_hand_ms = Some(100.0);
        assert!(!state.frame_gap_exceeded(350.0, 250.0));
        assert!(state.frame_gap_exceeded(351.0, 250.0));
    }

    #[test]
    fn test_clear_on_hand_lost() {
        let mut state = populated();
        state.clear_on_hand_lost();
        assert_eq!(state.guard, GuardState::Idle);
        assert!(!state.hand_present);
        assert!(state.last_hand_ms.is_none());
        assert!(state.prev_anchor.is_none());
        assert!(state.prev_palm.is_none());
        assert!(state.prev_fingers.is_none());
        assert!(state.prev_pinky_distance.is_none());
        assert!(!state.pinching);
        assert!(!state.pinky_latched);
        assert!(!state.middle_lever);
        assert!(state.cursor.is_none());
        assert_eq!(state.last_gesture_ms, Some(5.0));
    }

    #[test]
    fn test_reset_clears_cooldown() {
        let mut state = populated();
        state.reset();
        assert!(state.last_gesture_ms.is_none());
        assert_eq!(state.guard, GuardState::Idle);
    }

    #[test]
    fn test_status_sexp() {
        let state = EngineState::new();
        let sexp = state.status_sexp();
        assert!(sexp.contains(":guard :idle"));
        assert!(sexp.contains(":last-gesture-ms nil"));
    }
}
