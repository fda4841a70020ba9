//! Guard-independent contact detectors: pinch, pinky snap, middle lever.
//!
//! Each is a small hysteresis latch over one normalized distance.  They run
//! on every hand frame regardless of guard state and never touch the
//! cooldown.

use tracing::debug;

use crate::config::EngineConfig;
use crate::events::GestureTag;
use crate::state::EngineState;

/// Thumb to index contact.  Returns `PinchStart` / `PinchEnd` on edges.
pub fn update_pinch(state: &mut EngineState, config: &EngineConfig, pinch_distance: f32) -> Option<GestureTag> {
    if state.pinching {
        if pinch_distance >= config.pinch_threshold + config.pinch_release_margin {
            state.pinching = false;
            debug!(distance = pinch_distance, "pinch released");
            return Some(GestureTag::PinchEnd);
        }
    } else if pinch_distance < config.pinch_threshold {
        state.pinching = true;
        debug!(distance = pinch_distance, "pinch engaged");
        return Some(GestureTag::PinchStart);
    }
    None
}

/// Pinky snap.  Fires once when the pinky closes fast below the click
/// threshold, then stays latched until it reopens past the re-arm margin.
pub fn update_pinky(state: &mut EngineState, config: &EngineConfig, pinky_distance: f32) -> bool {
    let closing_speed = state.prev_pinky_distance.map(|prev| prev - pinky_distance);
    state.prev_pinky_distance = Some(pinky_distance);

    if state.pinky_latched {
        if pinky_distance >= config.pinky_click_threshold + config.pinky_rearm_margin {
            state.pinky_latched = false;
            debug!(distance = pinky_distance, "pinky re-armed");
        }
        return false;
    }

    let snapped = closing_speed.is_some_and(|v| v > config.pinky_snap_speed);
    if pinky_distance < config.pinky_click_threshold && snapped {
        state.pinky_latched = true;
        return true;
    }
    false
}

/// Middle finger folded onto the palm.  Telemetry only.  Returns the
/// current lever state.
pub fn update_lever(state: &mut EngineState, config: &EngineConfig, middle_distance: f32) -> bool {
    if state.middle_lever {
        if middle_distance > config.lever_threshold + config.lever_release_margin {
            state.middle_lever = false;
        }
    } else if middle_distance < config.lever_threshold {
        state.middle_lever = true;
    }
    state.middle_lever
}
