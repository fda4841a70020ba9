//! Engine configuration.
//!
//! Every tuned threshold lives here.  Values load from TOML with
//! `#[serde(default)]`, so a file only needs the keys it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::events::sexp_bool;
use crate::orientation::DEFAULT_FACING_THRESHOLD_DEG;

/// Which point the swipe classifier tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorPoint {
    #[default]
    Wrist,
    PalmCenter,
}

impl AnchorPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::PalmCenter => "palm-center",
        }
    }
}

/// Configuration for gesture classification thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum time between discrete gestures (ms).
    pub cooldown_ms: f64,
    /// Half-angle of the facing-camera cone (degrees).
    pub facing_threshold_deg: f32,
    /// Extended fingers (of index, middle, ring) needed for an open hand.
    pub open_min_extended: usize,
    /// World-mode tilt threshold (degrees).
    pub tilt_delta_deg: f32,
    /// Image-mode tilt threshold on the wrist to middle-MCP vector.
    pub tilt_vector_delta: f32,
    /// Fingertip velocity for a flick (normalized units/s).
    pub flick_velocity: f32,
    /// Anchor speed above which flicks are suppressed (normalized units/s).
    pub palm_stability_speed: f32,
    /// Minimum anchor displacement for a swipe.
    pub swipe_min_distance: f32,
    /// Minimum anchor speed for a swipe (normalized units/s).
    pub swipe_min_speed: f32,
    /// Normalized thumb to index distance that engages a pinch.
    pub pinch_threshold: f32,
    /// Extra distance required before a pinch releases.
    pub pinch_release_margin: f32,
    /// Normalized pinky distance below which a snap can click.
    pub pinky_click_threshold: f32,
    /// Per-frame closing speed for a pinky snap.
    pub pinky_snap_speed: f32,
    /// Extra distance the pinky must reopen before re-arming.
    pub pinky_rearm_margin: f32,
    /// Normalized middle distance that engages the lever.
    pub lever_threshold: f32,
    /// Extra distance required before the lever releases.
    pub lever_release_margin: f32,
    /// Longest silence between hand frames before motion baselines are
    /// dropped (ms).
    pub max_frame_gap_ms: f64,
    /// Cursor smoothing factor (0 = raw, towards 1 = heavy).
    pub cursor_smoothing: f32,
    /// Swap horizontal directions and mirror projections for a selfie view.
    pub mirror_correction: bool,
    /// Swipe anchor.
    pub anchor: AnchorPoint,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 400.0,
            facing_threshold_deg: DEFAULT_FACING_THRESHOLD_DEG,
            open_min_extended: 2,
            tilt_delta_deg: 8.6,
            tilt_vector_delta: 0.15,
            flick_velocity: 1.2,
            palm_stability_speed: 0.5,
            swipe_min_distance: 0.05,
            swipe_min_speed: 0.2,
            pinch_threshold: 0.4,
            pinch_release_margin: 0.0,
            pinky_click_threshold: 0.5,
            pinky_snap_speed: 0.08,
            pinky_rearm_margin: 0.1,
            lever_threshold: 0.5,
            lever_release_margin: 0.1,
            max_frame_gap_ms: 250.0,
            cursor_smoothing: 0.3,
            mirror_correction: true,
            anchor: AnchorPoint::Wrist,
        }
    }
}

impl EngineConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds that would disable or invert a classifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("cooldown_ms", self.cooldown_ms as f32, true)?;
        positive("facing_threshold_deg", self.facing_threshold_deg, false)?;
        positive("tilt_delta_deg", self.tilt_delta_deg, false)?;
        positive("tilt_vector_delta", self.tilt_vector_delta, false)?;
        positive("flick_velocity", self.flick_velocity, false)?;
        positive("palm_stability_speed", self.palm_stability_speed, false)?;
        positive("swipe_min_distance", self.swipe_min_distance, false)?;
        positive("swipe_min_speed", self.swipe_min_speed, false)?;
        positive("pinch_threshold", self.pinch_threshold, false)?;
        positive("pinch_release_margin", self.pinch_release_margin, true)?;
        positive("pinky_click_threshold", self.pinky_click_threshold, false)?;
        positive("pinky_snap_speed", self.pinky_snap_speed, false)?;
        positive("pinky_rearm_margin", self.pinky_rearm_margin, true)?;
        positive("lever_threshold", self.lever_threshold, false)?;
        positive("lever_release_margin", self.lever_release_margin, true)?;
        positive("max_frame_gap_ms", self.max_frame_gap_ms as f32, false)?;

        if self.facing_threshold_deg > 90.0 {
            return Err(ConfigError::Invalid {
                field: "facing_threshold_deg",
                reason: format!("{} exceeds 90", self.facing_threshold_deg),
            });
        }
        if !(1..=3).contains(&self.open_min_extended) {
            return Err(ConfigError::Invalid {
                field: "open_min_extended",
                reason: format!("{} not in 1..=3", self.open_min_extended),
            });
        }
        if !(0.0..1.0).contains(&self.cursor_smoothing) {
            return Err(ConfigError::Invalid {
                field: "cursor_smoothing",
                reason: format!("{} not in [0, 1)", self.cursor_smoothing),
            });
        }
        Ok(())
    }

    /// Generate s-expression for config reporting.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:cooldown-ms {:.0} :facing-deg {:.1} :open-min {} :tilt-deg {:.2} :tilt-vector {:.3} :flick-velocity {:.2} :palm-stability {:.2} :swipe-distance {:.3} :swipe-speed {:.2} :pinch {:.2} :pinky {:.2} :pinky-snap {:.3} :lever {:.2} :max-gap-ms {:.0} :smoothing {:.2} :mirror {} :anchor :{})",
            self.cooldown_ms,
            self.facing_threshold_deg,
            self.open_min_extended,
            self.tilt_delta_deg,
            self.tilt_vector_delta,
            self.flick_velocity,
            self.palm_stability_speed,
            self.swipe_min_distance,
            self.swipe_min_speed,
            self.pinch_threshold,
            self.pinky_click_threshold,
            self.pinky_snap_speed,
            self.lever_threshold,
            self.max_frame_gap_ms,
            self.cursor_smoothing,
            sexp_bool(self.mirror_correction),
            self.anchor.as_str(),
        )
    }
}

fn positive(field: &'static str, value: f32, allow_zero: bool) -> Result<(), ConfigError> {
    let ok = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be finite and {}", if allow_zero { ">= 0" } else { "> 0" }),
        })
    }
}
