//! # Harmony Button
//!
//! A consent wall with no refusal path followed by a verification prompt.
//! The visitor must agree, then type the verification phrase. Matching is
//! case-insensitive and ignores surrounding whitespace. A mismatch shows an
//! error that clears itself after a fixed delay; there is no attempt limit.

use exhibit_core::{HarmonyConfig, MechanismId};

use crate::scheduler::{TimerId, TimerPurpose};
use crate::solver::{
    Acknowledgement, InputOutcome, MechanismInput, SolveLatch, Solver, SolverContext,
    SolverStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmonyPhase {
    Terms,
    Verification { error_visible: bool },
    Solved,
}

#[derive(Debug)]
pub struct HarmonySolver {
    config: HarmonyConfig,
    phase: HarmonyPhase,
    error_timer: Option<TimerId>,
    attempts: u32,
    latch: SolveLatch,
}

impl HarmonySolver {
    pub fn new(config: &HarmonyConfig) -> Self {
        Self {
            config: config.clone(),
            phase: HarmonyPhase::Terms,
            error_timer: None,
            attempts: 0,
            latch: SolveLatch::default(),
        }
    }

    pub fn phase(&self) -> HarmonyPhase {
        self.phase
    }

    /// The phrase the visitor has to reproduce.
    pub fn verification_text(&self) -> &str {
        &self.config.verification_text
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn matches(&self, submitted: &str) -> bool {
        submitted.trim().to_lowercase() == self.config.verification_text.trim().to_lowercase()
    }

    fn submit(&mut self, text: &str, ctx: &mut SolverContext<'_>) -> InputOutcome {
        self.attempts += 1;
        if let Some(id) = self.error_timer.take() {
            ctx.cancel(id);
        }

        if self.matches(text) {
            self.phase = HarmonyPhase::Solved;
            self.latch.fire(MechanismId::Harmony, ctx);
            tracing::info!(attempts = self.attempts, "harmony verification passed");
            return InputOutcome::Solved;
        }

        self.phase = HarmonyPhase::Verification {
            error_visible: true,
        };
        self.error_timer = Some(ctx.schedule_once(TimerPurpose::ErrorClear, self.config.error_clear_ms));
        tracing::debug!(attempts = self.attempts, "harmony verification mismatch");
        InputOutcome::Rejected
    }
}

impl Solver for HarmonySolver {
    fn mechanism(&self) -> MechanismId {
        MechanismId::Harmony
    }

    fn status(&self) -> SolverStatus {
        match self.phase {
            HarmonyPhase::Solved => SolverStatus::Solved,
            _ => SolverStatus::Unsolved,
        }
    }

    fn open(&mut self, _ctx: &mut SolverContext<'_>) {}

    fn handle(&mut self, input: MechanismInput, ctx: &mut SolverContext<'_>) -> InputOutcome {
        match (input, self.phase) {
            (MechanismInput::Agree, HarmonyPhase::Terms) => {
                self.phase = HarmonyPhase::Verification {
                    error_visible: false,
                };
                InputOutcome::Advanced
            }
            (MechanismInput::Submit(text), HarmonyPhase::Verification { .. }) => {
                self.submit(&text, ctx)
            }
            _ => InputOutcome::Ignored,
        }
    }

    fn on_timer(&mut self, purpose: TimerPurpose, _ctx: &mut SolverContext<'_>) {
        if purpose != TimerPurpose::ErrorClear {
            return;
        }
        self.error_timer = None;
        if let HarmonyPhase::Verification { error_visible: true } = self.phase {
            self.phase = HarmonyPhase::Verification {
                error_visible: false,
            };
        }
    }

    fn acknowledgement(&self) -> Option<Acknowledgement> {
        match self.phase {
            HarmonyPhase::Solved => Some(Acknowledgement::Harmony {
                attempts: self.attempts,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::harness::Harness;

    fn solver() -> HarmonySolver {
        HarmonySolver::new(&HarmonyConfig::default())
    }

    fn submit(text: &str) -> MechanismInput {
        MechanismInput::Submit(text.to_string())
    }

    #[test]
    fn test_agree_then_exact_text_solves() {
        let mut h = Harness::new();
        let mut s = solver();
        h.open(&mut s);
        assert_eq!(h.send(&mut s, MechanismInput::Agree), InputOutcome::Advanced);
        let text = s.verification_text().to_string();
        assert_eq!(h.send(&mut s, submit(&text)), InputOutcome::Solved);
        assert!(h.store.is_solved(MechanismId::Harmony));
    }

    #[test]
    fn test_match_ignores_case() {
        let mut h = Harness::new();
        let mut s = solver();
        h.open(&mut s);
        h.send(&mut s, MechanismInput::Agree);
        assert_eq!(
            h.send(&mut s, submit("search TRANSPARENCY api LABOR conditions")),
            InputOutcome::Solved
        );
    }

    #[test]
    fn test_submit_before_agree_ignored() {
        let mut h = Harness::new();
        let mut s = solver();
        h.open(&mut s);
        assert_eq!(
            h.send(&mut s, submit("SEARCH transparency API labor conditions")),
            InputOutcome::Ignored
        );
        assert_eq!(s.phase(), HarmonyPhase::Terms);
    }

    #[test]
    fn test_mismatch_shows_error_that_clears() {
        let mut h = Harness::new();
        let mut s = solver();
        h.open(&mut s);
        h.send(&mut s, MechanismInput::Agree);
        assert_eq!(h.send(&mut s, submit("I agree")), InputOutcome::Rejected);
        assert_eq!(
            s.phase(),
            HarmonyPhase::Verification {
                error_visible: true
            }
        );
        assert!(!h.store.is_solved(MechanismId::Harmony));

        h.advance_to(&mut s, 1_999);
        assert_eq!(
            s.phase(),
            HarmonyPhase::Verification {
                error_visible: true
            }
        );
        h.advance_to(&mut s, 2_000);
        assert_eq!(
            s.phase(),
            HarmonyPhase::Verification {
                error_visible: false
            }
        );
    }

    #[test]
    fn test_resubmission_restarts_error_timer() {
        let mut h = Harness::new();
        let mut s = solver();
        h.open(&mut s);
        h.send(&mut s, MechanismInput::Agree);
        h.send(&mut s, submit("wrong"));
        h.advance_to(&mut s, 1_500);
        h.send(&mut s, submit("still wrong"));
        h.advance_to(&mut s, 2_500);
        assert_eq!(
            s.phase(),
            HarmonyPhase::Verification {
                error_visible: true
            }
        );
        h.advance_to(&mut s, 3_500);
        assert_eq!(
            s.phase(),
            HarmonyPhase::Verification {
                error_visible: false
            }
        );
        assert_eq!(h.scheduler.pending_for(h.owner), 0);
    }

    #[test]
    fn test_no_attempt_limit() {
        let mut h = Harness::new();
        let mut s = solver();
        h.open(&mut s);
        h.send(&mut s, MechanismInput::Agree);
        for i in 0..50 {
            h.send(&mut s, submit(&format!("attempt {i}")));
        }
        assert_eq!(
            h.send(&mut s, submit("  SEARCH transparency API labor conditions  ")),
            InputOutcome::Solved
        );
        assert_eq!(s.acknowledgement(), Some(Acknowledgement::Harmony { attempts: 51 }));
    }
}
