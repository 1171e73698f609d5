//! # Solver Contract
//!
//! Every mechanism is a small state machine behind the [`Solver`] trait.
//! The gate controller opens one solver at a time, feeds it visitor input
//! and fired timers, and closes it when the overlay goes away.
//!
//! ## Invariants
//!
//! - A solver reports success to the store at most once per session
//!   ([`SolveLatch`]).
//! - Reports carry the store generation captured when the solver opened,
//!   so a session that outlives a reset cannot re-solve anything.
//! - Solvers never own threads or timers directly; everything periodic goes
//!   through the [`Scheduler`] under the solver's lease.

use exhibit_core::{MechanismId, Zone};
use exhibit_state::{ExhibitionSnapshot, ExhibitionStore, SolveOutcome};
use serde::{Deserialize, Serialize};

use crate::scheduler::{OwnerId, Scheduler, TimerId, TimerPurpose};

/// Scroll viewport metrics reported by the feed host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    /// How far down the visitor has scrolled, in percent of total height.
    /// An empty container counts as fully scrolled.
    pub fn depth_percent(&self) -> f64 {
        if self.scroll_height <= 0.0 {
            return 100.0;
        }
        ((self.scroll_top + self.client_height) / self.scroll_height * 100.0).clamp(0.0, 100.0)
    }
}

/// Visitor input routed to the active solver.
#[derive(Debug, Clone, PartialEq)]
pub enum MechanismInput {
    /// Confirmshaming: the prominent affirmative choice.
    Accept,
    /// Confirmshaming: the small refusal link.
    Refuse,
    /// Autoplay: start or resume playback (a user gesture).
    Play,
    /// Autoplay: pause playback.
    Pause,
    /// Infinite scroll: the viewport moved.
    Scroll(ScrollMetrics),
    /// Infinite scroll: the exit affordance was activated.
    ActivateExit,
    /// Surveillance: pointer moved inside the panel.
    PointerMove { x: f64, y: f64 },
    /// Surveillance: click at panel coordinates.
    PanelClick { x: f64, y: f64 },
    /// Surveillance: click already resolved to a zone.
    ZoneClick(Zone),
    /// Harmony: accept the terms.
    Agree,
    /// Harmony: submit the verification text.
    Submit(String),
}

/// How a solver reacted to an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Not applicable to this mechanism or its current phase.
    Ignored,
    /// Recorded without changing progress (telemetry).
    Observed,
    /// Progress moved forward.
    Advanced,
    /// Progress was lost and the sequence starts over.
    Restarted,
    /// Input was wrong; a transient error is shown.
    Rejected,
    /// The mechanism is now solved.
    Solved,
}

/// Which condition unlocked the time-out mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockPath {
    /// The wait elapsed.
    Time,
    /// Enough other mechanisms were solved first.
    Progress,
}

impl std::fmt::Display for UnlockPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Time => f.write_str("time"),
            Self::Progress => f.write_str("progress"),
        }
    }
}

/// What the solver shows after success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mechanism", rename_all = "snake_case")]
pub enum Acknowledgement {
    Confirmshaming { refusals: usize },
    Autoplay { paused_at_secs: f64 },
    Timeout { path: UnlockPath },
    InfiniteScroll { exit_index: usize, total_items: usize },
    Surveillance { moves: u64, clicks: u64, observed_secs: u64 },
    Harmony { attempts: u32 },
}

/// Per-call view of the world handed to a solver.
pub struct SolverContext<'a> {
    store: &'a ExhibitionStore,
    scheduler: &'a mut Scheduler,
    owner: OwnerId,
    generation: u64,
    now_ms: u64,
}

impl<'a> SolverContext<'a> {
    pub fn new(
        store: &'a ExhibitionStore,
        scheduler: &'a mut Scheduler,
        owner: OwnerId,
        generation: u64,
        now_ms: u64,
    ) -> Self {
        Self {
            store,
            scheduler,
            owner,
            generation,
            now_ms,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Store generation captured when the session opened.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `false` once the exhibition has been reset since the session opened.
    /// Stale sessions must not write to the store.
    pub fn is_current(&self) -> bool {
        self.store.generation() == self.generation
    }

    pub fn store(&self) -> &ExhibitionStore {
        self.store
    }

    pub fn snapshot(&self) -> ExhibitionSnapshot {
        self.store.snapshot()
    }

    pub fn schedule_once(&mut self, purpose: TimerPurpose, delay_ms: u64) -> TimerId {
        self.scheduler
            .schedule_once(self.owner, purpose, self.now_ms, delay_ms)
    }

    pub fn schedule_every(&mut self, purpose: TimerPurpose, period_ms: u64) -> TimerId {
        self.scheduler
            .schedule_every(self.owner, purpose, self.now_ms, period_ms)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.scheduler.cancel(id)
    }

    /// Cancel every timer of this session.
    pub fn cancel_all(&mut self) -> usize {
        self.scheduler.cancel_owner(self.owner)
    }

    fn report_solved(&self, mechanism: MechanismId) -> SolveOutcome {
        self.store.solve_mechanism_in(mechanism, self.generation)
    }
}

/// Fires the store report exactly once per session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SolveLatch {
    outcome: Option<SolveOutcome>,
}

impl SolveLatch {
    /// Report `mechanism` solved. Later calls return the first outcome
    /// without touching the store.
    pub fn fire(&mut self, mechanism: MechanismId, ctx: &SolverContext<'_>) -> SolveOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let outcome = ctx.report_solved(mechanism);
        if outcome == SolveOutcome::Stale {
            tracing::debug!(mechanism = %mechanism, "solver finished after a reset");
        }
        self.outcome = Some(outcome);
        outcome
    }

    pub fn has_fired(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Coarse solver status for hosts that only need locked/unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    Unsolved,
    Solved,
}

impl SolverStatus {
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved)
    }
}

/// A mechanism challenge.
pub trait Solver: Send {
    fn mechanism(&self) -> MechanismId;

    fn status(&self) -> SolverStatus;

    /// Present the challenge. Called once when the overlay opens.
    fn open(&mut self, ctx: &mut SolverContext<'_>);

    /// Route one visitor input.
    fn handle(&mut self, input: MechanismInput, ctx: &mut SolverContext<'_>) -> InputOutcome;

    /// A timer scheduled by this session fired.
    fn on_timer(&mut self, _purpose: TimerPurpose, _ctx: &mut SolverContext<'_>) {}

    /// The exhibition store changed while this session was open.
    fn on_store_changed(&mut self, _ctx: &mut SolverContext<'_>) {}

    /// The overlay is going away. Timers are cancelled by the caller.
    fn close(&mut self, _ctx: &mut SolverContext<'_>) {}

    /// Success message, once solved.
    fn acknowledgement(&self) -> Option<Acknowledgement>;
}

#[cfg(test)]
pub(crate) mod harness {
    //! Drives a solver the way the gate controller does.

    use super::*;

    pub struct Harness {
        pub store: ExhibitionStore,
        pub scheduler: Scheduler,
        pub owner: OwnerId,
        pub generation: u64,
        pub now_ms: u64,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with_store(ExhibitionStore::in_memory())
        }

        pub fn with_store(store: ExhibitionStore) -> Self {
            let mut scheduler = Scheduler::new();
            let owner = scheduler.new_owner();
            let generation = store.generation();
            Self {
                store,
                scheduler,
                owner,
                generation,
                now_ms: 0,
            }
        }

        pub fn ctx(&mut self) -> SolverContext<'_> {
            SolverContext::new(
                &self.store,
                &mut self.scheduler,
                self.owner,
                self.generation,
                self.now_ms,
            )
        }

        pub fn open(&mut self, solver: &mut dyn Solver) {
            let mut ctx = self.ctx();
            solver.open(&mut ctx);
        }

        pub fn send(&mut self, solver: &mut dyn Solver, input: MechanismInput) -> InputOutcome {
            let mut ctx = self.ctx();
            solver.handle(input, &mut ctx)
        }

        pub fn notify(&mut self, solver: &mut dyn Solver) {
            let mut ctx = self.ctx();
            solver.on_store_changed(&mut ctx);
        }

        pub fn close(&mut self, solver: &mut dyn Solver) {
            let mut ctx = self.ctx();
            solver.close(&mut ctx);
            self.scheduler.cancel_owner(self.owner);
        }

        /// Move time forward to `now_ms`, dispatching fired timers.
        pub fn advance_to(&mut self, solver: &mut dyn Solver, now_ms: u64) {
            self.now_ms = now_ms;
            for fired in self.scheduler.advance(now_ms) {
                if fired.owner != self.owner {
                    continue;
                }
                let mut ctx = self.ctx();
                solver.on_timer(fired.purpose, &mut ctx);
            }
        }

        /// Step time forward in `step_ms` increments until `until_ms`.
        pub fn run_until(&mut self, solver: &mut dyn Solver, until_ms: u64, step_ms: u64) {
            while self.now_ms < until_ms {
                let next = (self.now_ms + step_ms).min(until_ms);
                self.advance_to(solver, next);
            }
        }
    }
}
