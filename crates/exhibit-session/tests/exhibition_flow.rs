//! End-to-end flows through the gate and theme controllers with a manual
//! clock and in-memory storage.

use std::sync::Arc;

use exhibit_core::{
    ArtworkId, Catalog, Clock, ExhibitionConfig, ManualClock, MechanismId, Theme, Zone,
};
use exhibit_mechanisms::{
    Acknowledgement, InputOutcome, MechanismInput, ScrollMetrics, SimulatedPlayback,
    SimulatedPlaybackProvider, SolverFactory, UnlockPath,
};
use exhibit_session::{
    GateController, GateDecision, GateEvent, PageChrome, ThemeController, ThemeTransition,
};
use exhibit_state::{
    ExhibitionStore, MemoryStorage, StateStorage, SurveillancePatch, SurveillanceRecord,
    TIMEOUT_PROGRESS_KEY,
};

struct Exhibition {
    clock: ManualClock,
    storage: Arc<MemoryStorage>,
    gate: GateController,
    theme: ThemeController,
}

impl Exhibition {
    fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()), ManualClock::new(10_000))
    }

    /// Simulates a page load against existing durable storage.
    fn with_storage(storage: Arc<MemoryStorage>, clock: ManualClock) -> Self {
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());
        let playback = SimulatedPlayback::new(Arc::clone(&shared), 180.0);
        let factory = SolverFactory::new(
            ExhibitionConfig::default(),
            Arc::new(SimulatedPlaybackProvider::new(playback)),
        )
        .expect("default config is valid");
        let store = ExhibitionStore::open(storage.clone());
        let theme = ThemeController::new(&store.snapshot());
        let gate = GateController::new(store, Catalog::builtin(), factory, shared);
        Self {
            clock,
            storage,
            gate,
            theme,
        }
    }

    fn reload(self) -> Self {
        Self::with_storage(self.storage, self.clock)
    }

    fn open(&mut self, artwork: &str) -> GateDecision {
        self.gate
            .select_artwork(&ArtworkId::new(artwork))
            .expect("artwork in catalog")
    }

    fn send(&mut self, input: MechanismInput) -> InputOutcome {
        self.gate.input(input)
    }

    /// Advance the clock in `step_ms` ticks.
    fn run_for(&mut self, total_ms: u64, step_ms: u64) {
        let mut elapsed = 0;
        while elapsed < total_ms {
            let step = step_ms.min(total_ms - elapsed);
            self.clock.advance(step);
            self.gate.tick();
            elapsed += step;
        }
    }

    /// Let the post-solve navigation fire and return the navigation target.
    fn settle(&mut self) -> Option<ArtworkId> {
        self.run_for(500, 100);
        self.gate.take_events().into_iter().find_map(|e| match e {
            GateEvent::NavigateTo { artwork } => Some(artwork),
            _ => None,
        })
    }

    fn sync_theme(&mut self) -> Option<ThemeTransition> {
        self.theme.sync(&self.gate.store().snapshot())
    }
}

fn near_bottom() -> MechanismInput {
    MechanismInput::Scroll(ScrollMetrics {
        scroll_top: 1_900.0,
        client_height: 100.0,
        scroll_height: 2_000.0,
    })
}

fn solve_confirmshaming(ex: &mut Exhibition) {
    ex.open("lynch");
    for _ in 0..5 {
        ex.send(MechanismInput::Refuse);
    }
}

fn solve_autoplay(ex: &mut Exhibition) {
    ex.open("weigel");
    ex.run_for(127_300, 250);
    assert_eq!(ex.send(MechanismInput::Pause), InputOutcome::Solved);
}

fn solve_infinite_scroll(ex: &mut Exhibition) {
    ex.open("desire-engineering");
    while ex.send(MechanismInput::ActivateExit) != InputOutcome::Solved {
        ex.send(near_bottom());
    }
}

fn solve_surveillance(ex: &mut Exhibition) {
    ex.open("perfect-users");
    for zone in [
        Zone::TopLeft,
        Zone::TopRight,
        Zone::BottomLeft,
        Zone::BottomRight,
        Zone::Center,
    ] {
        ex.send(MechanismInput::ZoneClick(zone));
    }
}

fn solve_harmony(ex: &mut Exhibition) {
    ex.open("search-engine-scores");
    ex.send(MechanismInput::Agree);
    ex.send(MechanismInput::Submit("Search Transparency API Labor Conditions".into()));
}

// ── Full exhibition ─────────────────────────────────────────────────

#[test]
fn test_full_exhibition_liberates_once() {
    let mut ex = Exhibition::new();
    assert_eq!(ex.theme.chrome(), PageChrome::Platform);

    solve_confirmshaming(&mut ex);
    assert_eq!(ex.settle(), Some(ArtworkId::new("lynch")));
    solve_harmony(&mut ex);
    assert_eq!(ex.settle(), Some(ArtworkId::new("search-engine-scores")));
    assert_eq!(ex.sync_theme(), None);
    assert_eq!(ex.gate.store().visibility_tier().value(), 1);

    // Two others solved: the time-out lifts the moment it opens.
    assert!(matches!(ex.open("gibbins"), GateDecision::SolverOpened(MechanismId::Timeout)));
    assert_eq!(
        ex.gate.overlay().and_then(|o| o.acknowledgement),
        Some(Acknowledgement::Timeout {
            path: UnlockPath::Progress
        })
    );
    assert_eq!(ex.settle(), Some(ArtworkId::new("gibbins")));

    solve_autoplay(&mut ex);
    ex.settle();
    solve_infinite_scroll(&mut ex);
    ex.settle();
    assert_eq!(ex.gate.store().theme(), Theme::Platform);

    solve_surveillance(&mut ex);
    ex.settle();

    let snapshot = ex.gate.store().snapshot();
    assert!(snapshot.is_complete());
    assert_eq!(snapshot.theme, Theme::Resistance);
    assert_eq!(ex.sync_theme(), Some(ThemeTransition::Liberated));
    assert_eq!(ex.sync_theme(), None);

    let presentation = ex.theme.presentation(&snapshot);
    assert_eq!(presentation.chrome, PageChrome::Liberated);
    assert_eq!(presentation.escalation, None);
    assert_eq!(presentation.layers.len(), 3);
    assert!(ex.gate.artwork_states().iter().all(|(_, locked)| !locked));
}

#[test]
fn test_progress_survives_reload() {
    let mut ex = Exhibition::new();
    solve_confirmshaming(&mut ex);
    ex.settle();
    solve_harmony(&mut ex);
    ex.settle();

    let ex = ex.reload();
    let snapshot = ex.gate.store().snapshot();
    assert_eq!(snapshot.solved_count(), 2);
    assert!(!ex.gate.is_locked(&ArtworkId::new("lynch")).unwrap());
    assert!(ex.gate.is_locked(&ArtworkId::new("weigel")).unwrap());
}

#[test]
fn test_liberated_reload_renders_liberated_chrome_without_transition() {
    let ex = Exhibition::new();
    for m in MechanismId::all() {
        ex.gate.store().solve_mechanism(*m);
    }
    let mut ex = ex.reload();
    assert_eq!(ex.theme.chrome(), PageChrome::Liberated);
    assert_eq!(ex.sync_theme(), None);
}

// ── Time-Out ────────────────────────────────────────────────────────

#[test]
fn test_timeout_progress_path_while_open() {
    let mut ex = Exhibition::new();
    ex.open("gibbins");
    ex.run_for(60_000, 1_000);
    assert!(ex.gate.is_locked(&ArtworkId::new("gibbins")).unwrap());

    ex.gate.store().solve_mechanism(MechanismId::Autoplay);
    ex.gate.notify_store_changed();
    assert!(ex.gate.is_locked(&ArtworkId::new("gibbins")).unwrap());

    ex.gate.store().solve_mechanism(MechanismId::Surveillance);
    ex.gate.notify_store_changed();
    assert!(!ex.gate.is_locked(&ArtworkId::new("gibbins")).unwrap());

    let unlocked = ex.gate.take_events().into_iter().find_map(|e| match e {
        GateEvent::Unlocked {
            acknowledgement, ..
        } => acknowledgement,
        _ => None,
    });
    assert_eq!(
        unlocked,
        Some(Acknowledgement::Timeout {
            path: UnlockPath::Progress
        })
    );
}

#[test]
fn test_timeout_keeps_counting_across_reload() {
    let mut ex = Exhibition::new();
    ex.open("gibbins");
    ex.run_for(100_000, 1_000);
    ex.gate.close_overlay();
    assert!(ex.storage.read(TIMEOUT_PROGRESS_KEY).unwrap().is_some());

    // Away from the page for three minutes.
    ex.clock.advance(180_000);
    let mut ex = ex.reload();
    ex.open("gibbins");
    ex.run_for(20_000, 1_000);

    assert!(!ex.gate.is_locked(&ArtworkId::new("gibbins")).unwrap());
    assert_eq!(
        ex.gate.overlay().and_then(|o| o.acknowledgement),
        Some(Acknowledgement::Timeout {
            path: UnlockPath::Time
        })
    );
    assert!(ex.storage.read(TIMEOUT_PROGRESS_KEY).unwrap().is_none());
}

#[test]
fn test_reset_while_timeout_open_restarts_countdown() {
    let mut ex = Exhibition::new();
    ex.open("gibbins");
    ex.run_for(200_000, 1_000);

    ex.gate.reset_exhibition();
    assert!(ex.gate.overlay().is_none());
    assert!(ex.storage.read(TIMEOUT_PROGRESS_KEY).unwrap().is_none());

    ex.run_for(100_000, 1_000);
    ex.open("gibbins");
    ex.run_for(1_000, 1_000);
    assert!(ex.gate.is_locked(&ArtworkId::new("gibbins")).unwrap());
}

#[test]
fn test_external_reset_not_undone_by_pending_flush() {
    let mut ex = Exhibition::new();
    ex.open("gibbins");
    ex.run_for(95_000, 1_000);

    // The next flush falls due in the same tick that notices the reset.
    ex.gate.store().reset_exhibition();
    ex.run_for(5_000, 5_000);
    assert!(ex.gate.overlay().is_none());
    assert!(ex.storage.read(TIMEOUT_PROGRESS_KEY).unwrap().is_none());
}

// ── Reset ───────────────────────────────────────────────────────────

#[test]
fn test_reset_clears_everything() {
    let mut ex = Exhibition::new();
    for m in MechanismId::all() {
        ex.gate.store().solve_mechanism(*m);
    }
    ex.sync_theme();
    ex.open("gibbins");
    ex.gate.store().track_surveillance(SurveillancePatch::scroll_depth(40));

    ex.gate.reset_exhibition();
    let snapshot = ex.gate.store().snapshot();
    assert_eq!(snapshot.solved_count(), 0);
    assert_eq!(snapshot.theme, Theme::Platform);
    assert_eq!(ex.gate.store().surveillance(), SurveillanceRecord::default());
    assert_eq!(ex.sync_theme(), Some(ThemeTransition::Restored));
    assert!(ex.gate.overlay().is_none());
}

#[test]
fn test_stale_solve_after_reset_is_dropped() {
    let mut ex = Exhibition::new();
    ex.open("weigel");
    ex.run_for(127_250, 250);

    // Reset lands outside the gate; the open solver has not noticed yet.
    ex.gate.store().reset_exhibition();
    let outcome = ex.send(MechanismInput::Pause);
    assert_eq!(outcome, InputOutcome::Solved);
    assert!(!ex.gate.store().is_solved(MechanismId::Autoplay));
    assert!(ex.gate.overlay().is_none());
}

#[test]
fn test_unavailable_storage_keeps_session_working() {
    let mut ex = Exhibition::new();
    ex.storage.set_unavailable(true);
    solve_confirmshaming(&mut ex);
    assert!(ex.gate.store().is_solved(MechanismId::Confirmshaming));

    let ex = ex.reload();
    assert_eq!(ex.gate.store().solved_count(), 0);
}
