//! # Confirmshaming
//!
//! A sequence of forced-choice screens. Every screen offers a prominent
//! "accept" that flatters the platform and a small "refuse" phrased to
//! shame the visitor. Refusing on every screen solves the piece; accepting
//! anywhere restarts from the first screen with the refusal count cleared.
//!
//! ```text
//! Presenting{0,0} --refuse--> Presenting{1,1} --refuse--> ... --refuse--> Solved
//!        ^                          |
//!        +---------accept-----------+
//! ```

use exhibit_core::{ConfirmshamingConfig, ConfirmshamingScreen, MechanismId};

use crate::solver::{
    Acknowledgement, InputOutcome, MechanismInput, SolveLatch, Solver, SolverContext,
    SolverStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmshamingState {
    Presenting {
        screen_index: usize,
        refusal_count: usize,
    },
    Solved {
        refusals: usize,
    },
}

#[derive(Debug)]
pub struct ConfirmshamingSolver {
    screens: Vec<ConfirmshamingScreen>,
    state: ConfirmshamingState,
    latch: SolveLatch,
}

impl ConfirmshamingSolver {
    pub fn new(config: &ConfirmshamingConfig) -> Self {
        Self {
            screens: config.screens.clone(),
            state: ConfirmshamingState::Presenting {
                screen_index: 0,
                refusal_count: 0,
            },
            latch: SolveLatch::default(),
        }
    }

    pub fn state(&self) -> ConfirmshamingState {
        self.state
    }

    /// The screen currently shown, `None` once solved.
    pub fn current_screen(&self) -> Option<&ConfirmshamingScreen> {
        match self.state {
            ConfirmshamingState::Presenting { screen_index, .. } => self.screens.get(screen_index),
            ConfirmshamingState::Solved { .. } => None,
        }
    }

    fn required_refusals(&self) -> usize {
        self.screens.len()
    }
}

impl Solver for ConfirmshamingSolver {
    fn mechanism(&self) -> MechanismId {
        MechanismId::Confirmshaming
    }

    fn status(&self) -> SolverStatus {
        match self.state {
            ConfirmshamingState::Solved { .. } => SolverStatus::Solved,
            ConfirmshamingState::Presenting { .. } => SolverStatus::Unsolved,
        }
    }

    fn open(&mut self, _ctx: &mut SolverContext<'_>) {
        tracing::debug!(screens = self.screens.len(), "confirmshaming opened");
    }

    fn handle(&mut self, input: MechanismInput, ctx: &mut SolverContext<'_>) -> InputOutcome {
        let ConfirmshamingState::Presenting {
            screen_index,
            refusal_count,
        } = self.state
        else {
            return InputOutcome::Ignored;
        };

        match input {
            MechanismInput::Refuse => {
                let refusals = refusal_count + 1;
                if refusals >= self.required_refusals() {
                    self.state = ConfirmshamingState::Solved { refusals };
                    self.latch.fire(MechanismId::Confirmshaming, ctx);
                    InputOutcome::Solved
                } else {
                    self.state = ConfirmshamingState::Presenting {
                        screen_index: (screen_index + 1).min(self.screens.len().saturating_sub(1)),
                        refusal_count: refusals,
                    };
                    InputOutcome::Advanced
                }
            }
            MechanismInput::Accept => {
                tracing::debug!(screen = screen_index, "confirmshaming accepted, restarting");
                self.state = ConfirmshamingState::Presenting {
                    screen_index: 0,
                    refusal_count: 0,
                };
                InputOutcome::Restarted
            }
            _ => InputOutcome::Ignored,
        }
    }

    fn acknowledgement(&self) -> Option<Acknowledgement> {
        match self.state {
            ConfirmshamingState::Solved { refusals } => {
                Some(Acknowledgement::Confirmshaming { refusals })
            }
            ConfirmshamingState::Presenting { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::harness::Harness;

    fn solver() -> ConfirmshamingSolver {
        ConfirmshamingSolver::new(&ConfirmshamingConfig::default())
    }

    #[test]
    fn test_five_refusals_solve() {
        let mut h = Harness::new();
        let mut s = solver();
        h.open(&mut s);
        for _ in 0..4 {
            assert_eq!(h.send(&mut s, MechanismInput::Refuse), InputOutcome::Advanced);
        }
        assert_eq!(h.send(&mut s, MechanismInput::Refuse), InputOutcome::Solved);
        assert!(h.store.is_solved(MechanismId::Confirmshaming));
        assert_eq!(
            s.acknowledgement(),
            Some(Acknowledgement::Confirmshaming { refusals: 5 })
        );
        assert!(s.current_screen().is_none());
    }

    #[test]
    fn test_accept_restarts_from_first_screen() {
        let mut h = Harness::new();
        let mut s = solver();
        h.open(&mut s);
        h.send(&mut s, MechanismInput::Refuse);
        h.send(&mut s, MechanismInput::Refuse);
        assert_eq!(h.send(&mut s, MechanismInput::Accept), InputOutcome::Restarted);
        assert_eq!(
            s.state(),
            ConfirmshamingState::Presenting {
                screen_index: 0,
                refusal_count: 0
            }
        );

        for _ in 0..4 {
            h.send(&mut s, MechanismInput::Refuse);
        }
        assert!(!h.store.is_solved(MechanismId::Confirmshaming));
        assert_eq!(h.send(&mut s, MechanismInput::Refuse), InputOutcome::Solved);
    }

    #[test]
    fn test_screens_advance_in_order() {
        let config = ConfirmshamingConfig::default();
        let mut h = Harness::new();
        let mut s = ConfirmshamingSolver::new(&config);
        h.open(&mut s);
        assert_eq!(s.current_screen(), Some(&config.screens[0]));
        h.send(&mut s, MechanismInput::Refuse);
        assert_eq!(s.current_screen(), Some(&config.screens[1]));
    }

    #[test]
    fn test_inputs_after_solve_are_ignored() {
        let mut h = Harness::new();
        let mut s = solver();
        h.open(&mut s);
        for _ in 0..5 {
            h.send(&mut s, MechanismInput::Refuse);
        }
        let revision = h.store.revision();
        assert_eq!(h.send(&mut s, MechanismInput::Accept), InputOutcome::Ignored);
        assert_eq!(h.send(&mut s, MechanismInput::Refuse), InputOutcome::Ignored);
        assert_eq!(h.store.revision(), revision);
        assert!(s.status().is_solved());
    }

    #[test]
    fn test_single_screen_solves_on_first_refusal() {
        let mut config = ConfirmshamingConfig::default();
        config.screens.truncate(1);
        let mut h = Harness::new();
        let mut s = ConfirmshamingSolver::new(&config);
        h.open(&mut s);
        assert_eq!(h.send(&mut s, MechanismInput::Refuse), InputOutcome::Solved);
    }

    #[test]
    fn test_foreign_input_ignored() {
        let mut h = Harness::new();
        let mut s = solver();
        h.open(&mut s);
        assert_eq!(h.send(&mut s, MechanismInput::Agree), InputOutcome::Ignored);
    }
}
