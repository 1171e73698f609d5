//! # Autoplay / Countdown
//!
//! A looping media timeline hides one clue at a fixed timestamp. The piece
//! is solved by pausing while the playback position is within tolerance of
//! that clue.
//!
//! ## Design
//!
//! The solver never trusts the engine to report pauses. Every poll it reads
//! the position; a position that does not move for `stuck_polls`
//! consecutive polls while the solver believes the media is playing is
//! handled exactly like an explicit pause. A pause inferred that way is
//! lifted again if a later poll sees the position move.
//!
//! Engine state notifications arrive through a listener that only queues
//! them. The queue is drained on the next poll, so engine callbacks never
//! re-enter the solver.
//!
//! ## States
//!
//! ```text
//! AwaitingGesture --play--> Playing --pause/stuck--> Paused --play--> Playing
//!                              |                       |
//!                              +--pause near clue------+--> Solved
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use exhibit_core::{AutoplayConfig, MechanismId};
use parking_lot::Mutex;

use crate::playback::{PlayTrigger, PlaybackEngine, PlaybackError, PlaybackState};
use crate::scheduler::{TimerId, TimerPurpose};
use crate::solver::{
    Acknowledgement, InputOutcome, MechanismInput, SolveLatch, Solver, SolverContext,
    SolverStatus,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoplayPhase {
    /// Autonomous playback was refused; a begin affordance is shown.
    AwaitingGesture,
    Playing,
    Paused { at_secs: f64 },
    Solved { at_secs: f64 },
}

pub struct AutoplaySolver {
    config: AutoplayConfig,
    engine: Box<dyn PlaybackEngine>,
    inbox: Arc<Mutex<VecDeque<PlaybackState>>>,
    phase: AutoplayPhase,
    last_position: Option<f64>,
    still_polls: u32,
    /// The current `Paused` phase came from a stall, not a pause signal.
    inferred_pause: bool,
    buffering: bool,
    poll_timer: Option<TimerId>,
    latch: SolveLatch,
}

impl std::fmt::Debug for AutoplaySolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoplaySolver")
            .field("phase", &self.phase)
            .field("still_polls", &self.still_polls)
            .finish_non_exhaustive()
    }
}

impl AutoplaySolver {
    pub fn new(config: &AutoplayConfig, engine: Box<dyn PlaybackEngine>) -> Self {
        Self {
            config: config.clone(),
            engine,
            inbox: Arc::new(Mutex::new(VecDeque::new())),
            phase: AutoplayPhase::AwaitingGesture,
            last_position: None,
            still_polls: 0,
            inferred_pause: false,
            buffering: false,
            poll_timer: None,
            latch: SolveLatch::default(),
        }
    }

    pub fn phase(&self) -> AutoplayPhase {
        self.phase
    }

    /// Whether the begin affordance should be shown.
    pub fn needs_gesture(&self) -> bool {
        self.phase == AutoplayPhase::AwaitingGesture
    }

    pub fn position(&self) -> f64 {
        self.engine.current_position()
    }

    /// Seconds left before the media loops.
    pub fn remaining_secs(&self) -> f64 {
        (self.config.duration_secs - self.position()).max(0.0)
    }

    /// Whether the clue flashes on screen right now.
    pub fn clue_visible(&self) -> bool {
        matches!(self.phase, AutoplayPhase::Playing)
            && (self.position() - self.config.clue_secs).abs() <= self.config.clue_display_secs
    }

    fn start(&mut self, trigger: PlayTrigger) -> Result<(), PlaybackError> {
        self.engine.play(trigger)?;
        self.phase = AutoplayPhase::Playing;
        self.last_position = None;
        self.still_polls = 0;
        self.inferred_pause = false;
        Ok(())
    }

    fn on_paused(&mut self, at_secs: f64, ctx: &mut SolverContext<'_>) -> InputOutcome {
        self.last_position = None;
        self.still_polls = 0;
        self.inferred_pause = false;

        if (at_secs - self.config.clue_secs).abs() <= self.config.tolerance_secs {
            self.phase = AutoplayPhase::Solved { at_secs };
            if let Some(id) = self.poll_timer.take() {
                ctx.cancel(id);
            }
            self.latch.fire(MechanismId::Autoplay, ctx);
            tracing::info!(at_secs, "autoplay paused on the clue");
            InputOutcome::Solved
        } else {
            self.phase = AutoplayPhase::Paused { at_secs };
            tracing::debug!(at_secs, "autoplay paused off the clue");
            InputOutcome::Advanced
        }
    }

    fn drain_inbox(&mut self, ctx: &mut SolverContext<'_>) {
        let events: Vec<PlaybackState> = self.inbox.lock().drain(..).collect();
        for event in events {
            match (event, self.phase) {
                (_, AutoplayPhase::Solved { .. }) => return,
                (PlaybackState::Paused, AutoplayPhase::Playing) => {
                    let at = self.engine.current_position();
                    self.on_paused(at, ctx);
                }
                (PlaybackState::Playing, AutoplayPhase::AwaitingGesture)
                | (PlaybackState::Playing, AutoplayPhase::Paused { .. }) => {
                    self.phase = AutoplayPhase::Playing;
                    self.last_position = None;
                    self.still_polls = 0;
                    self.inferred_pause = false;
                }
                (PlaybackState::Paused, AutoplayPhase::Paused { .. }) => {
                    self.inferred_pause = false;
                }
                _ => {}
            }
            self.buffering = event == PlaybackState::Buffering;
        }
    }

    fn poll(&mut self, ctx: &mut SolverContext<'_>) {
        self.drain_inbox(ctx);
        if self.buffering {
            return;
        }
        if let AutoplayPhase::Paused { at_secs } = self.phase {
            self.resume_if_moving(at_secs);
            return;
        }
        if self.phase != AutoplayPhase::Playing {
            return;
        }

        let pos = self.engine.current_position();
        let stuck = self
            .last_position
            .is_some_and(|prev| (pos - prev).abs() <= self.config.stuck_epsilon_secs);
        self.still_polls = if stuck { self.still_polls + 1 } else { 0 };
        self.last_position = Some(pos);

        if self.still_polls >= self.config.stuck_polls {
            tracing::debug!(pos, polls = self.still_polls, "playback stuck, treating as pause");
            self.on_paused(pos, ctx);
            self.inferred_pause = matches!(self.phase, AutoplayPhase::Paused { .. });
        }
    }

    /// Lift a stall-inferred pause once the engine moves on by itself.
    fn resume_if_moving(&mut self, paused_at: f64) {
        if !self.inferred_pause {
            return;
        }
        let pos = self.engine.current_position();
        if (pos - paused_at).abs() <= self.config.stuck_epsilon_secs {
            return;
        }
        tracing::debug!(from = paused_at, to = pos, "stalled playback moving again");
        self.phase = AutoplayPhase::Playing;
        self.inferred_pause = false;
        self.last_position = Some(pos);
        self.still_polls = 0;
    }
}

impl Solver for AutoplaySolver {
    fn mechanism(&self) -> MechanismId {
        MechanismId::Autoplay
    }

    fn status(&self) -> SolverStatus {
        match self.phase {
            AutoplayPhase::Solved { .. } => SolverStatus::Solved,
            _ => SolverStatus::Unsolved,
        }
    }

    fn open(&mut self, ctx: &mut SolverContext<'_>) {
        let inbox = Arc::clone(&self.inbox);
        self.engine
            .subscribe(Box::new(move |state| inbox.lock().push_back(state)));

        if let Err(e) = self.engine.load(&self.config.media_ref) {
            tracing::warn!(error = %e, media = %self.config.media_ref, "autoplay media failed to load");
        }

        match self.start(PlayTrigger::Autonomous) {
            Ok(()) => {}
            Err(PlaybackError::GestureRequired) => {
                tracing::debug!("autoplay blocked, waiting for a gesture");
            }
            Err(e) => tracing::warn!(error = %e, "autoplay could not start"),
        }
        // The notification from our own `play` is already reflected in `phase`.
        self.inbox.lock().clear();

        self.poll_timer =
            Some(ctx.schedule_every(TimerPurpose::PlaybackPoll, self.config.poll_interval_ms));
    }

    fn handle(&mut self, input: MechanismInput, ctx: &mut SolverContext<'_>) -> InputOutcome {
        match (input, self.phase) {
            (_, AutoplayPhase::Solved { .. }) => InputOutcome::Ignored,
            (MechanismInput::Play, AutoplayPhase::AwaitingGesture)
            | (MechanismInput::Play, AutoplayPhase::Paused { .. }) => {
                match self.start(PlayTrigger::UserGesture) {
                    Ok(()) => {
                        self.inbox.lock().clear();
                        InputOutcome::Advanced
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "playback refused a user gesture");
                        InputOutcome::Ignored
                    }
                }
            }
            (MechanismInput::Pause, AutoplayPhase::Playing) => {
                self.engine.pause();
                self.inbox.lock().clear();
                let at = self.engine.current_position();
                self.on_paused(at, ctx)
            }
            _ => InputOutcome::Ignored,
        }
    }

    fn on_timer(&mut self, purpose: TimerPurpose, ctx: &mut SolverContext<'_>) {
        if purpose == TimerPurpose::PlaybackPoll {
            self.poll(ctx);
        }
    }

    fn close(&mut self, _ctx: &mut SolverContext<'_>) {
        if self.phase == AutoplayPhase::Playing {
            self.engine.pause();
        }
        self.poll_timer = None;
    }

    fn acknowledgement(&self) -> Option<Acknowledgement> {
        match self.phase {
            AutoplayPhase::Solved { at_secs } => Some(Acknowledgement::Autoplay {
                paused_at_secs: at_secs,
            }),
            _ => None,
        }
    }
}
