//! The six mechanism solvers and the factory that builds them from
//! configuration.

pub mod autoplay;
pub mod confirmshaming;
pub mod harmony;
pub mod infinite_scroll;
pub mod surveillance;
pub mod timeout;

use std::sync::Arc;

use exhibit_core::{ConfigError, ExhibitionConfig, MechanismId};

use crate::playback::PlaybackProvider;
use crate::solver::Solver;

pub use autoplay::{AutoplayPhase, AutoplaySolver};
pub use confirmshaming::{ConfirmshamingSolver, ConfirmshamingState};
pub use harmony::{HarmonyPhase, HarmonySolver};
pub use infinite_scroll::InfiniteScrollSolver;
pub use surveillance::{PanelGeometry, SurveillanceSolver, Telemetry};
pub use timeout::{TimeoutPhase, TimeoutProgress, TimeoutSolver};

/// Builds a fresh solver per overlay session.
#[derive(Clone)]
pub struct SolverFactory {
    config: ExhibitionConfig,
    playback: Arc<dyn PlaybackProvider>,
    panel: PanelGeometry,
}

impl std::fmt::Debug for SolverFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverFactory")
            .field("panel", &self.panel)
            .finish_non_exhaustive()
    }
}

impl SolverFactory {
    /// Validates `config` first; solvers are only ever built from a valid
    /// configuration.
    pub fn new(
        config: ExhibitionConfig,
        playback: Arc<dyn PlaybackProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            playback,
            panel: PanelGeometry::default(),
        })
    }

    /// Use a non-default surveillance panel size.
    pub fn with_panel(mut self, panel: PanelGeometry) -> Self {
        self.panel = panel;
        self
    }

    pub fn config(&self) -> &ExhibitionConfig {
        &self.config
    }

    pub fn build(&self, mechanism: MechanismId) -> Box<dyn Solver> {
        match mechanism {
            MechanismId::Confirmshaming => {
                Box::new(ConfirmshamingSolver::new(&self.config.confirmshaming))
            }
            MechanismId::Autoplay => Box::new(AutoplaySolver::new(
                &self.config.autoplay,
                self.playback.create(),
            )),
            MechanismId::Timeout => Box::new(TimeoutSolver::new(&self.config.timeout)),
            MechanismId::InfiniteScroll => {
                Box::new(InfiniteScrollSolver::new(&self.config.infinite_scroll))
            }
            MechanismId::Surveillance => Box::new(SurveillanceSolver::new(
                &self.config.surveillance,
                self.panel,
            )),
            MechanismId::Harmony => Box::new(HarmonySolver::new(&self.config.harmony)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{SimulatedPlayback, SimulatedPlaybackProvider};
    use exhibit_core::ManualClock;

    fn provider() -> Arc<dyn PlaybackProvider> {
        let clock = Arc::new(ManualClock::new(0));
        Arc::new(SimulatedPlaybackProvider::new(SimulatedPlayback::new(clock, 180.0)))
    }

    #[test]
    fn test_factory_builds_matching_solver() {
        let factory = SolverFactory::new(ExhibitionConfig::default(), provider()).unwrap();
        for m in MechanismId::all() {
            let solver = factory.build(*m);
            assert_eq!(solver.mechanism(), *m);
            assert!(!solver.status().is_solved());
            assert!(solver.acknowledgement().is_none());
        }
    }

    #[test]
    fn test_factory_rejects_invalid_config() {
        let mut config = ExhibitionConfig::default();
        config.infinite_scroll.exit_index = 0;
        let err = SolverFactory::new(config, provider()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "infinite_scroll.exit_index",
                ..
            }
        ));
    }
}
