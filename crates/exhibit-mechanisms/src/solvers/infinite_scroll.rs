//! # Infinite Scroll
//!
//! A professional-network feed that keeps loading. Posts come from the
//! deterministic [`feed`](crate::feed) generator and are revealed in
//! batches whenever the visitor nears the bottom. Once the feed has grown
//! past the exit slot, an exit affordance sits between two posts; only
//! activating it solves the piece. Scrolling past it does nothing.

use exhibit_core::{InfiniteScrollConfig, MechanismId};
use exhibit_state::SurveillancePatch;

use crate::feed::{generate_range, FeedPost};
use crate::solver::{
    Acknowledgement, InputOutcome, MechanismInput, ScrollMetrics, SolveLatch, Solver,
    SolverContext, SolverStatus,
};

#[derive(Debug)]
pub struct InfiniteScrollSolver {
    config: InfiniteScrollConfig,
    visible_count: usize,
    scroll_depth_percent: f64,
    exit_revealed: bool,
    solved: bool,
    latch: SolveLatch,
}

impl InfiniteScrollSolver {
    pub fn new(config: &InfiniteScrollConfig) -> Self {
        let visible_count = config.batch_size.min(config.total_items);
        Self {
            config: config.clone(),
            visible_count,
            scroll_depth_percent: 0.0,
            exit_revealed: visible_count >= config.exit_index,
            solved: false,
            latch: SolveLatch::default(),
        }
    }

    /// Posts currently rendered.
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn visible_posts(&self) -> impl Iterator<Item = FeedPost> {
        generate_range(0, self.visible_count)
    }

    pub fn scroll_depth_percent(&self) -> f64 {
        self.scroll_depth_percent
    }

    pub fn exit_revealed(&self) -> bool {
        self.exit_revealed
    }

    /// Number of posts rendered above the exit affordance, once revealed.
    pub fn exit_slot(&self) -> Option<usize> {
        self.exit_revealed
            .then(|| self.config.exit_index.saturating_sub(1))
    }

    pub fn is_exhausted(&self) -> bool {
        self.visible_count >= self.config.total_items
    }

    fn on_scroll(&mut self, metrics: ScrollMetrics, ctx: &mut SolverContext<'_>) -> InputOutcome {
        let depth = metrics.depth_percent();
        self.scroll_depth_percent = depth;
        ctx.store()
            .track_surveillance(SurveillancePatch::scroll_depth(depth.round() as u8));

        if depth <= self.config.reveal_threshold_percent || self.is_exhausted() {
            return InputOutcome::Observed;
        }

        self.visible_count = (self.visible_count + self.config.batch_size).min(self.config.total_items);
        if !self.exit_revealed && self.visible_count >= self.config.exit_index {
            self.exit_revealed = true;
            tracing::debug!(visible = self.visible_count, "infinite scroll exit revealed");
        }
        InputOutcome::Advanced
    }
}

impl Solver for InfiniteScrollSolver {
    fn mechanism(&self) -> MechanismId {
        MechanismId::InfiniteScroll
    }

    fn status(&self) -> SolverStatus {
        if self.solved {
            SolverStatus::Solved
        } else {
            SolverStatus::Unsolved
        }
    }

    fn open(&mut self, _ctx: &mut SolverContext<'_>) {}

    fn handle(&mut self, input: MechanismInput, ctx: &mut SolverContext<'_>) -> InputOutcome {
        if self.solved {
            return InputOutcome::Ignored;
        }
        match input {
            MechanismInput::Scroll(metrics) => self.on_scroll(metrics, ctx),
            MechanismInput::ActivateExit if self.exit_revealed => {
                self.solved = true;
                self.latch.fire(MechanismId::InfiniteScroll, ctx);
                tracing::info!(visible = self.visible_count, "infinite scroll exit taken");
                InputOutcome::Solved
            }
            _ => InputOutcome::Ignored,
        }
    }

    fn acknowledgement(&self) -> Option<Acknowledgement> {
        self.solved.then(|| Acknowledgement::InfiniteScroll {
            exit_index: self.config.exit_index,
            total_items: self.config.total_items,
        })
    }
}
