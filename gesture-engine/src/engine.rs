//! The gesture engine: owns configuration, history, and delivery.
//!
//! One engine tracks one hand.  Engines share nothing, so a host can run
//! several side by side (e.g. one per camera).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Receiver;
use tracing::{debug, info};

use crate::bus::{BroadcastStats, Broadcaster, GestureListener, ListenerId, ListenerRegistry};
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::events::{EngineEvent, GestureEvent, GestureTag};
use crate::landmarks::FrameInput;
use crate::pipeline::{self, FrameOutcome};
use crate::state::EngineState;

/// Cloneable handle that stops an engine from any thread.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Gesture classification engine.
#[derive(Debug)]
pub struct GestureEngine {
    config: EngineConfig,
    state: EngineState,
    listeners: ListenerRegistry,
    broadcaster: Broadcaster,
    active: StopHandle,
}

impl GestureEngine {
    /// Create an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            cooldown_ms = config.cooldown_ms,
            mirror = config.mirror_correction,
            anchor = config.anchor.as_str(),
            "gesture engine created"
        );
        Ok(Self::build(config))
    }

    pub fn with_defaults() -> Self {
        Self::build(EngineConfig::default())
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            config,
            state: EngineState::new(),
            listeners: ListenerRegistry::new(),
            broadcaster: Broadcaster::new(),
            active: StopHandle::new(),
        }
    }

    /// Run one frame and deliver its events.
    ///
    /// Order: hand acquired, telemetry, gestures (each to listeners, then
    /// broadcast), hand lost.  Returns an empty outcome once stopped.
    pub fn process_frame(&mut self, input: &FrameInput) -> FrameOutcome {
        if !self.active.is_active() {
            return FrameOutcome::default();
        }

        let outcome = pipeline::process(&mut self.state, &self.config, input);
        let ts = input.timestamp_ms();

        if outcome.presence_changed == Some(true) {
            self.broadcaster.send(&EngineEvent::HandPresence {
                present: true,
                timestamp_ms: ts,
            });
        }
        if let Some(telemetry) = &outcome.telemetry {
            self.broadcaster
                .send(&EngineEvent::Telemetry(Box::new(telemetry.clone())));
        }
        for gesture in &outcome.gestures {
            self.emit(gesture);
        }
        if outcome.presence_changed == Some(false) {
            self.broadcaster.send(&EngineEvent::HandPresence {
                present: false,
                timestamp_ms: ts,
            });
        }
        outcome
    }

    fn emit(&mut self, gesture: &GestureEvent) {
        debug!(gesture = gesture.gesture.as_str(), t = gesture.timestamp_ms, "gesture");
        self.listeners.notify(gesture);
        self.broadcaster.send(&EngineEvent::Gesture(gesture.clone()));
    }

    /// Register a gesture callback.  Callbacks run inline, in registration
    /// order.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GestureEvent) + Send + 'static,
    {
        let listener: GestureListener = Box::new(listener);
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Open a receiver for gestures, telemetry, and presence changes.
    pub fn broadcast_receiver(&mut self) -> Receiver<EngineEvent> {
        self.broadcaster.subscribe()
    }

    pub fn broadcast_stats(&self) -> BroadcastStats {
        self.broadcaster.stats()
    }

    /// Stop processing.  Later frames are ignored.
    pub fn stop(&self) {
        if self.active.is_active() {
            info!("gesture engine stopped");
        }
        self.active.stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.active.clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_active()
    }

    /// Toggle mirror correction.  Returns true if the setting changed, so
    /// the presentation layer can flip its own view.
    pub fn set_mirror_correction(&mut self, enabled: bool) -> bool {
        if self.config.mirror_correction == enabled {
            return false;
        }
        self.config.mirror_correction = enabled;
        // The smoothed cursor lives in the old projection.
        self.state.cursor = None;
        debug!(enabled, "mirror correction changed");
        true
    }

    /// Drop all history, including cooldown.  Listeners and receivers stay.
    ///
    /// An open pinch is closed with `PinchEnd` and a tracked hand is reported
    /// lost, both stamped with the last hand frame's time.
    pub fn reset(&mut self) {
        let ts = self.state.last_hand_ms.unwrap_or(0.0);
        if self.state.pinching {
            self.emit(&GestureEvent::new(GestureTag::PinchEnd, None, ts));
        }
        if self.state.hand_present {
            self.broadcaster.send(&EngineEvent::HandPresence {
                present: false,
                timestamp_ms: ts,
            });
        }
        self.state.reset();
        debug!("engine history reset");
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        let stats = self.broadcast_stats();
        format!(
            "(:active {} :listeners {} :receivers {} :sent {} :dropped {} :state {} :config {})",
            if self.is_active() { "t" } else { "nil" },
            self.listeners.len(),
            self.broadcaster.receiver_count(),
            stats.sent,
            stats.dropped,
            self.state.status_sexp(),
            self.config.config_sexp(),
        )
    }
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
