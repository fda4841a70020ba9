//! Guard state machine gating discrete classification.
//!
//! `Idle` (no hand) → `Closed` (fist) → `OpenBlocked` (open but turned away
//! or cooling down) → `OpenActive` (classification allowed).  Entering a
//! blocking state drops the rotation and flick baselines so classification
//! never resumes from a stale sample.

use serde::Serialize;
use tracing::debug;

use crate::landmarks::{HandLandmark, LandmarkFrame};
use crate::state::EngineState;

/// Guard state for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardState {
    /// No hand in view.
    #[default]
    Idle,
    /// Hand present but not open.
    Closed,
    /// Open, but not facing the camera or still in cooldown.
    OpenBlocked,
    /// Open, facing the camera, cooldown elapsed.
    OpenActive,
}

impl GuardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Closed => "closed",
            Self::OpenBlocked => "open-blocked",
            Self::OpenActive => "open-active",
        }
    }

    pub fn permits_classification(&self) -> bool {
        matches!(self, Self::OpenActive)
    }

    /// States whose entry invalidates rotation and flick baselines.
    fn is_blocking(&self) -> bool {
        matches!(self, Self::Closed | Self::OpenBlocked)
    }
}

/// Number of index/middle/ring fingertips above their PIP joint.
pub fn extended_finger_count(frame: &LandmarkFrame) -> usize {
    HandLandmark::open_test_fingers()
        .iter()
        .filter(|(tip, pip)| frame.image_point(*tip).y < frame.image_point(*pip).y)
        .count()
}

pub fn is_hand_open(frame: &LandmarkFrame, min_extended: usize) -> bool {
    extended_finger_count(frame) >= min_extended
}

/// Guard state for a hand-present frame.
pub fn evaluate(hand_open: bool, facing_camera: bool, cooldown_elapsed: bool) -> GuardState {
    if !hand_open {
        GuardState::Closed
    } else if !facing_camera || !cooldown_elapsed {
        GuardState::OpenBlocked
    } else {
        GuardState::OpenActive
    }
}

/// Move the guard to `next`, clearing stale baselines on entry into a
/// blocking state.  Returns true if the state changed.
pub fn advance(state: &mut EngineState, next: GuardState) -> bool {
    let prev = state.guard;
    if prev == next {
        return false;
    }
    if next.is_blocking() {
        state.clear_orientation_history();
    }
    debug!(from = prev.as_str(), to = next.as_str(), "guard transition");
    state.guard = next;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::landmarks::Point2;
    use crate::state::{FingerOffsets, PalmSample, TimedPoint};

    fn with_baselines() -> EngineState {
        EngineState {
            guard: GuardState::OpenActive,
            hand_present: true,
            prev_anchor: Some(TimedPoint {
                position: Point2::new(0.5, 0.5),
                timestamp_ms: 0.0,
            }),
            prev_palm: Some(PalmSample::World {
                pitch_deg: 0.0,
                yaw_deg: 0.0,
            }),
            prev_fingers: Some(FingerOffsets {
                index: Point2::new(0.0, -0.3),
                middle: Point2::new(0.0, -0.3),
                timestamp_ms: 0.0,
            }),
            ..EngineState::default()
        }
    }

    #[test]
    fn test_open_hand_detection() {
        let open = fixtures::open_frame(0.5, 0.8, 0.0);
        assert_eq!(extended_finger_count(&open), 3);
        assert!(is_hand_open(&open, 2));

        let closed = fixtures::frame(fixtures::closed_hand(0.5, 0.8), 0.0);
        assert_eq!(extended_finger_count(&closed), 0);
        assert!(!is_hand_open(&closed, 2));
    }

    #[test]
    fn test_two_of_three_is_open() {
        let mut hand = fixtures::open_hand(0.5, 0.8);
        // Fold the ring finger only
        let pip = hand[HandLandmark::RingPip.index()];
        fixtures::set_point(&mut hand, HandLandmark::RingTip, pip.x, pip.y + 0.04);
        let frame = fixtures::frame(hand, 0.0);
        assert_eq!(extended_finger_count(&frame), 2);
        assert!(is_hand_open(&frame, 2));
        assert!(!is_hand_open(&frame, 3));
    }

    #[test]
    fn test_evaluate_states() {
        assert_eq!(evaluate(false, true, true), GuardState::Closed);
        assert_eq!(evaluate(true, false, true), GuardState::OpenBlocked);
        assert_eq!(evaluate(true, true, false), GuardState::OpenBlocked);
        assert_eq!(evaluate(true, true, true), GuardState::OpenActive);
        assert!(GuardState::OpenActive.permits_classification());
        assert!(!GuardState::OpenBlocked.permits_classification());
    }

    #[test]
    fn test_entering_blocked_clears_orientation_history() {
        let mut state = with_baselines();
        assert!(advance(&mut state, GuardState::OpenBlocked));
        assert!(state.prev_palm.is_none());
        assert!(state.prev_fingers.is_none());
        assert!(state.prev_anchor.is_some(), "swipe baseline must persist");
    }

    #[test]
    fn test_entering_closed_clears_orientation_history() {
        let mut state = with_baselines();
        assert!(advance(&mut state, GuardState::Closed));
        assert_eq!(state.guard, GuardState::Closed);
        assert!(state.prev_palm.is_none());
    }

    #[test]
    fn test_same_state_is_not_a_transition() {
        let mut state = with_baselines();
        assert!(!advance(&mut state, GuardState::OpenActive));
        assert!(state.prev_palm.is_some());
    }
}
