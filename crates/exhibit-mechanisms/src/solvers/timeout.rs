//! # Time-Out
//!
//! A lockout that lifts on whichever comes first:
//!
//! 1. **Time.** Wall-clock time since the visitor first opened this solver
//!    reaches the configured wait. The first-open instant and the elapsed
//!    time seen so far are stored durably under
//!    [`TIMEOUT_PROGRESS_KEY`], so the countdown keeps running while the
//!    solver is closed and survives reloads.
//! 2. **Progress.** The number of *other* solved mechanisms reaches the
//!    configured threshold. Re-evaluated on every store change while open.
//!
//! Time is checked before progress so a visitor who qualifies on both in
//! the same tick is credited with the wait.
//!
//! The progress record is flushed periodically and on close, and removed
//! once solved (the store also removes it on reset).

use exhibit_core::{MechanismId, TimeoutConfig};
use exhibit_state::TIMEOUT_PROGRESS_KEY;
use serde::{Deserialize, Serialize};

use crate::scheduler::TimerPurpose;
use crate::solver::{
    Acknowledgement, InputOutcome, MechanismInput, SolveLatch, Solver, SolverContext,
    SolverStatus, UnlockPath,
};

/// Durable countdown record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutProgress {
    pub first_opened_at_ms: u64,
    pub elapsed_ms: u64,
}

impl TimeoutProgress {
    fn started_at(now_ms: u64) -> Self {
        Self {
            first_opened_at_ms: now_ms,
            elapsed_ms: 0,
        }
    }

    /// Elapsed wait as of `now_ms`. Never moves backwards if the clock does.
    pub fn elapsed_at(&self, now_ms: u64) -> u64 {
        let wall = now_ms.saturating_sub(self.first_opened_at_ms);
        self.elapsed_ms.max(wall)
    }

    fn refresh(&mut self, now_ms: u64) {
        self.elapsed_ms = self.elapsed_at(now_ms);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPhase {
    Closed,
    Waiting,
    Solved { path: UnlockPath },
}

#[derive(Debug)]
pub struct TimeoutSolver {
    config: TimeoutConfig,
    progress: Option<TimeoutProgress>,
    other_solved: usize,
    phase: TimeoutPhase,
    latch: SolveLatch,
}

impl TimeoutSolver {
    pub fn new(config: &TimeoutConfig) -> Self {
        Self {
            config: config.clone(),
            progress: None,
            other_solved: 0,
            phase: TimeoutPhase::Closed,
            latch: SolveLatch::default(),
        }
    }

    pub fn phase(&self) -> TimeoutPhase {
        self.phase
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.progress.map_or(0, |p| p.elapsed_ms)
    }

    pub fn remaining_ms(&self) -> u64 {
        self.config.wait_ms.saturating_sub(self.elapsed_ms())
    }

    /// Fraction of the wait already served, in `[0, 1]`.
    pub fn fraction_elapsed(&self) -> f64 {
        if self.config.wait_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms() as f64 / self.config.wait_ms as f64).min(1.0)
    }

    /// Countdown as `m:ss`, rounding partial seconds up.
    pub fn countdown_label(&self) -> String {
        let secs = self.remaining_ms().div_ceil(1000);
        format!("{}:{:02}", secs / 60, secs % 60)
    }

    /// Other mechanisms solved, as of the last evaluation.
    pub fn other_solved(&self) -> usize {
        self.other_solved
    }

    fn flush(&self, ctx: &SolverContext<'_>) {
        if !ctx.is_current() {
            tracing::debug!("skipping time-out flush from before reset");
            return;
        }
        if let (TimeoutPhase::Waiting, Some(progress)) = (self.phase, self.progress) {
            ctx.store().save_record(TIMEOUT_PROGRESS_KEY, &progress);
        }
    }

    fn evaluate(&mut self, ctx: &mut SolverContext<'_>) {
        if self.phase != TimeoutPhase::Waiting || !ctx.is_current() {
            return;
        }
        let now = ctx.now_ms();
        if let Some(progress) = self.progress.as_mut() {
            progress.refresh(now);
        }
        self.other_solved = ctx.snapshot().solved_count_excluding(MechanismId::Timeout);

        let path = if self.elapsed_ms() >= self.config.wait_ms {
            UnlockPath::Time
        } else if self.other_solved >= self.config.required_other_solves {
            UnlockPath::Progress
        } else {
            return;
        };

        self.phase = TimeoutPhase::Solved { path };
        ctx.cancel_all();
        ctx.store().remove_record(TIMEOUT_PROGRESS_KEY);
        self.latch.fire(MechanismId::Timeout, ctx);
        tracing::info!(
            path = %path,
            elapsed_ms = self.elapsed_ms(),
            other_solved = self.other_solved,
            "time-out lifted"
        );
    }
}

impl Solver for TimeoutSolver {
    fn mechanism(&self) -> MechanismId {
        MechanismId::Timeout
    }

    fn status(&self) -> SolverStatus {
        match self.phase {
            TimeoutPhase::Solved { .. } => SolverStatus::Solved,
            _ => SolverStatus::Unsolved,
        }
    }

    fn open(&mut self, ctx: &mut SolverContext<'_>) {
        let now = ctx.now_ms();
        let progress = match ctx.store().load_record::<TimeoutProgress>(TIMEOUT_PROGRESS_KEY) {
            Some(stored) => {
                tracing::debug!(
                    first_opened_at_ms = stored.first_opened_at_ms,
                    elapsed_ms = stored.elapsed_ms,
                    "resuming time-out countdown"
                );
                stored
            }
            None => {
                let fresh = TimeoutProgress::started_at(now);
                ctx.store().save_record(TIMEOUT_PROGRESS_KEY, &fresh);
                fresh
            }
        };
        self.progress = Some(progress);
        self.phase = TimeoutPhase::Waiting;

        ctx.schedule_every(TimerPurpose::CountdownTick, self.config.tick_interval_ms);
        ctx.schedule_every(TimerPurpose::ProgressFlush, self.config.flush_interval_ms);
        self.evaluate(ctx);
    }

    fn handle(&mut self, _input: MechanismInput, _ctx: &mut SolverContext<'_>) -> InputOutcome {
        InputOutcome::Ignored
    }

    fn on_timer(&mut self, purpose: TimerPurpose, ctx: &mut SolverContext<'_>) {
        match purpose {
            TimerPurpose::CountdownTick => self.evaluate(ctx),
            TimerPurpose::ProgressFlush => {
                if let Some(progress) = self.progress.as_mut() {
                    progress.refresh(ctx.now_ms());
                }
                self.flush(ctx);
            }
            _ => {}
        }
    }

    fn on_store_changed(&mut self, ctx: &mut SolverContext<'_>) {
        self.evaluate(ctx);
    }

    fn close(&mut self, ctx: &mut SolverContext<'_>) {
        if let Some(progress) = self.progress.as_mut() {
            progress.refresh(ctx.now_ms());
        }
        self.flush(ctx);
    }

    fn acknowledgement(&self) -> Option<Acknowledgement> {
        match self.phase {
            TimeoutPhase::Solved { path } => Some(Acknowledgement::Timeout { path }),
            _ => None,
        }
    }
}
