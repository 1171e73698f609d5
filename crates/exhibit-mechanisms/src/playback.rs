//! # Playback Capability
//!
//! The autoplay mechanism depends on a media player it does not control.
//! [`PlaybackEngine`] is the narrow seam: load, play, pause, report the
//! position, and push state changes to a listener. Engines may refuse to
//! start without a user gesture, and may fail to report pauses at all.
//!
//! [`SimulatedPlayback`] is a deterministic clock-driven engine used by the
//! CLI and the tests. It loops at the end of the media like the installed
//! piece does.

use std::sync::Arc;

use exhibit_core::Clock;
use parking_lot::Mutex;
use thiserror::Error;

/// Engine-reported player state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Unstarted,
    Playing,
    Paused,
    Buffering,
    Ended,
}

/// Who asked for playback to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayTrigger {
    /// Started by the page on its own.
    Autonomous,
    /// Started from a visitor click or key press.
    UserGesture,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The environment blocks autonomous playback.
    #[error("playback requires a user gesture")]
    GestureRequired,

    #[error("media {0:?} is not available")]
    MediaUnavailable(String),
}

/// Receives engine state changes.
pub type StateListener = Box<dyn FnMut(PlaybackState) + Send>;

/// A media player the autoplay solver can drive.
pub trait PlaybackEngine: Send {
    fn load(&mut self, media_ref: &str) -> Result<(), PlaybackError>;

    /// Current position in seconds.
    fn current_position(&self) -> f64;

    fn state(&self) -> PlaybackState;

    /// Register a state-change listener. Engines may never call it.
    fn subscribe(&mut self, listener: StateListener);

    fn play(&mut self, trigger: PlayTrigger) -> Result<(), PlaybackError>;

    fn pause(&mut self);
}

/// Creates an engine per autoplay session.
pub trait PlaybackProvider: Send + Sync {
    fn create(&self) -> Box<dyn PlaybackEngine>;
}

// ─── Simulated engine ────────────────────────────────────────────────

struct SimulatedInner {
    clock: Arc<dyn Clock>,
    duration_secs: f64,
    autoplay_allowed: bool,
    reports_pauses: bool,
    media: Option<String>,
    state: PlaybackState,
    /// Position at `anchor_ms`.
    anchor_secs: f64,
    anchor_ms: u64,
    frozen: bool,
    listeners: Vec<StateListener>,
}

impl SimulatedInner {
    fn position(&self) -> f64 {
        if self.state != PlaybackState::Playing || self.frozen {
            return self.anchor_secs;
        }
        let elapsed = self.clock.now_ms().saturating_sub(self.anchor_ms) as f64 / 1000.0;
        let pos = self.anchor_secs + elapsed;
        if self.duration_secs > 0.0 {
            pos % self.duration_secs
        } else {
            0.0
        }
    }

    fn set_state(&mut self, state: PlaybackState, notify: bool) {
        self.anchor_secs = self.position();
        self.anchor_ms = self.clock.now_ms();
        self.state = state;
        if notify {
            for listener in self.listeners.iter_mut() {
                listener(state);
            }
        }
    }
}

/// Clock-driven looping player. Clones share one underlying player, so a
/// test can keep a handle after giving the engine to a solver.
#[derive(Clone)]
pub struct SimulatedPlayback {
    inner: Arc<Mutex<SimulatedInner>>,
}

impl std::fmt::Debug for SimulatedPlayback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SimulatedPlayback")
            .field("media", &inner.media)
            .field("state", &inner.state)
            .field("position", &inner.position())
            .finish()
    }
}

impl SimulatedPlayback {
    pub fn new(clock: Arc<dyn Clock>, duration_secs: f64) -> Self {
        let anchor_ms = clock.now_ms();
        Self {
            inner: Arc::new(Mutex::new(SimulatedInner {
                clock,
                duration_secs,
                autoplay_allowed: true,
                reports_pauses: true,
                media: None,
                state: PlaybackState::Unstarted,
                anchor_secs: 0.0,
                anchor_ms,
                frozen: false,
                listeners: Vec::new(),
            })),
        }
    }

    /// Refuse autonomous playback until a user gesture arrives.
    pub fn block_autoplay(self) -> Self {
        self.inner.lock().autoplay_allowed = false;
        self
    }

    /// Stop emitting `Paused` notifications.
    pub fn silent_pauses(self) -> Self {
        self.inner.lock().reports_pauses = false;
        self
    }

    /// Pause from outside the solver, as native player controls would.
    pub fn external_pause(&self) {
        let mut inner = self.inner.lock();
        let notify = inner.reports_pauses;
        inner.set_state(PlaybackState::Paused, notify);
    }

    /// Jump to `secs`, keeping the current state.
    pub fn seek(&self, secs: f64) {
        let mut inner = self.inner.lock();
        inner.anchor_secs = secs;
        inner.anchor_ms = inner.clock.now_ms();
    }

    /// Freeze the reported position while still claiming to play.
    pub fn stall(&self, stalled: bool) {
        let mut inner = self.inner.lock();
        inner.anchor_secs = inner.position();
        inner.anchor_ms = inner.clock.now_ms();
        inner.frozen = stalled;
    }

    pub fn media(&self) -> Option<String> {
        self.inner.lock().media.clone()
    }
}

impl PlaybackEngine for SimulatedPlayback {
    fn load(&mut self, media_ref: &str) -> Result<(), PlaybackError> {
        if media_ref.is_empty() {
            return Err(PlaybackError::MediaUnavailable(media_ref.to_string()));
        }
        let mut inner = self.inner.lock();
        inner.media = Some(media_ref.to_string());
        inner.anchor_secs = 0.0;
        inner.state = PlaybackState::Unstarted;
        Ok(())
    }

    fn current_position(&self) -> f64 {
        self.inner.lock().position()
    }

    fn state(&self) -> PlaybackState {
        self.inner.lock().state
    }

    fn subscribe(&mut self, listener: StateListener) {
        self.inner.lock().listeners.push(listener);
    }

    fn play(&mut self, trigger: PlayTrigger) -> Result<(), PlaybackError> {
        let mut inner = self.inner.lock();
        if inner.media.is_none() {
            return Err(PlaybackError::MediaUnavailable(String::new()));
        }
        if trigger == PlayTrigger::Autonomous && !inner.autoplay_allowed {
            return Err(PlaybackError::GestureRequired);
        }
        inner.set_state(PlaybackState::Playing, true);
        Ok(())
    }

    fn pause(&mut self) {
        let mut inner = self.inner.lock();
        let notify = inner.reports_pauses;
        inner.set_state(PlaybackState::Paused, notify);
    }
}

/// Hands out clones of one simulated player.
#[derive(Debug, Clone)]
pub struct SimulatedPlaybackProvider {
    playback: SimulatedPlayback,
}

impl SimulatedPlaybackProvider {
    pub fn new(playback: SimulatedPlayback) -> Self {
        Self { playback }
    }

    pub fn playback(&self) -> &SimulatedPlayback {
        &self.playback
    }
}

impl PlaybackProvider for SimulatedPlaybackProvider {
    fn create(&self) -> Box<dyn PlaybackEngine> {
        Box::new(self.playback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exhibit_core::ManualClock;

    fn engine(clock: &ManualClock) -> SimulatedPlayback {
        SimulatedPlayback::new(Arc::new(clock.clone()), 180.0)
    }

    #[test]
    fn test_position_follows_clock() {
        let clock = ManualClock::new(0);
        let mut e = engine(&clock);
        e.load("clip").unwrap();
        e.play(PlayTrigger::Autonomous).unwrap();
        clock.advance(12_500);
        assert!((e.current_position() - 12.5).abs() < 1e-9);
        e.pause();
        clock.advance(5_000);
        assert!((e.current_position() - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_loops_at_end() {
        let clock = ManualClock::new(0);
        let mut e = engine(&clock);
        e.load("clip").unwrap();
        e.play(PlayTrigger::Autonomous).unwrap();
        clock.advance(190_000);
        assert!((e.current_position() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_blocked_autoplay_needs_gesture() {
        let clock = ManualClock::new(0);
        let mut e = engine(&clock).block_autoplay();
        e.load("clip").unwrap();
        assert_eq!(e.play(PlayTrigger::Autonomous), Err(PlaybackError::GestureRequired));
        assert!(e.play(PlayTrigger::UserGesture).is_ok());
        assert_eq!(e.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_listener_receives_changes_unless_silenced() {
        let clock = ManualClock::new(0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut e = engine(&clock).silent_pauses();
        let sink = Arc::clone(&seen);
        e.subscribe(Box::new(move |s| sink.lock().push(s)));
        e.load("clip").unwrap();
        e.play(PlayTrigger::Autonomous).unwrap();
        e.pause();
        assert_eq!(*seen.lock(), vec![PlaybackState::Playing]);
    }

    #[test]
    fn test_stall_freezes_position() {
        let clock = ManualClock::new(0);
        let mut e = engine(&clock);
        e.load("clip").unwrap();
        e.play(PlayTrigger::Autonomous).unwrap();
        clock.advance(3_000);
        e.stall(true);
        clock.advance(3_000);
        assert!((e.current_position() - 3.0).abs() < 1e-9);
        assert_eq!(e.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_play_before_load_fails() {
        let clock = ManualClock::new(0);
        let mut e = engine(&clock);
        assert!(matches!(
            e.play(PlayTrigger::UserGesture),
            Err(PlaybackError::MediaUnavailable(_))
        ));
    }
}
