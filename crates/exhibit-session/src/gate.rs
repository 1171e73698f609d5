//! # Unlock / Gate Controller
//!
//! Decides, per artwork, whether the visitor sees the content or the
//! mechanism guarding it, and hosts the one solver overlay that may be open
//! at a time.
//!
//! ## Lifecycle of an overlay
//!
//! 1. `select_artwork` on a locked artwork builds a fresh solver, leases a
//!    scheduler owner, and captures the store generation.
//! 2. Inputs, timers, and store changes are routed to the solver.
//! 3. When the artwork's mechanism becomes solved (by this solver or any
//!    other path) the controller emits [`GateEvent::Unlocked`] and schedules
//!    navigation after the configured delay, so the acknowledgement stays
//!    visible briefly.
//! 4. Navigation closes the overlay and emits [`GateEvent::NavigateTo`].
//!
//! Closing an overlay cancels its whole lease. Timers from a lease that is
//! no longer live are dropped at dispatch. A reset invalidates the open
//! overlay: it is closed on the next tick or store notification.

use std::sync::Arc;

use exhibit_core::{Artwork, ArtworkId, Catalog, Clock, MechanismId};
use exhibit_mechanisms::{
    Acknowledgement, InputOutcome, MechanismInput, OwnerId, Scheduler, Solver, SolverContext,
    SolverFactory, SolverStatus, TimerId, TimerPurpose,
};
use exhibit_state::ExhibitionStore;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("unknown artwork: {0}")]
    UnknownArtwork(String),
}

/// What selecting an artwork led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The artwork is unlocked; show its content.
    Navigate(ArtworkId),
    /// The artwork is locked; its solver is now open.
    SolverOpened(MechanismId),
}

/// Notifications for the presentation layer, drained with
/// [`GateController::take_events`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GateEvent {
    OverlayOpened {
        artwork: ArtworkId,
        mechanism: MechanismId,
    },
    OverlayClosed {
        artwork: ArtworkId,
        solved: bool,
    },
    Unlocked {
        artwork: ArtworkId,
        mechanism: MechanismId,
        acknowledgement: Option<Acknowledgement>,
    },
    NavigateTo {
        artwork: ArtworkId,
    },
}

/// Read-only view of the open overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub artwork: ArtworkId,
    pub mechanism: MechanismId,
    pub status: SolverStatus,
    pub acknowledgement: Option<Acknowledgement>,
}

struct Overlay {
    artwork: ArtworkId,
    mechanism: MechanismId,
    owner: OwnerId,
    generation: u64,
    solver: Box<dyn Solver>,
    unlocked: bool,
}

pub struct GateController {
    store: ExhibitionStore,
    catalog: Catalog,
    factory: SolverFactory,
    clock: Arc<dyn Clock>,
    scheduler: Scheduler,
    lease: OwnerId,
    overlay: Option<Overlay>,
    pending_navigation: Option<(TimerId, ArtworkId)>,
    seen_revision: u64,
    events: Vec<GateEvent>,
}

impl std::fmt::Debug for GateController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateController")
            .field("overlay", &self.overlay.as_ref().map(|o| &o.artwork))
            .field("pending_navigation", &self.pending_navigation)
            .field("timers", &self.scheduler.len())
            .finish_non_exhaustive()
    }
}

impl GateController {
    pub fn new(
        store: ExhibitionStore,
        catalog: Catalog,
        factory: SolverFactory,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut scheduler = Scheduler::new();
        let lease = scheduler.new_owner();
        let seen_revision = store.revision();
        Self {
            store,
            catalog,
            factory,
            clock,
            scheduler,
            lease,
            overlay: None,
            pending_navigation: None,
            seen_revision,
            events: Vec::new(),
        }
    }

    pub fn store(&self) -> &ExhibitionStore {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn artwork(&self, id: &ArtworkId) -> Result<&Artwork, GateError> {
        self.catalog
            .get(id)
            .ok_or_else(|| GateError::UnknownArtwork(id.to_string()))
    }

    /// `true` until the artwork's mechanism is solved.
    pub fn is_locked(&self, id: &ArtworkId) -> Result<bool, GateError> {
        let artwork = self.artwork(id)?;
        Ok(!self.store.is_solved(artwork.mechanism))
    }

    /// Every artwork with its lock state, in catalog order.
    pub fn artwork_states(&self) -> Vec<(&Artwork, bool)> {
        let snapshot = self.store.snapshot();
        self.catalog
            .iter()
            .map(|a| (a, !snapshot.is_solved(a.mechanism)))
            .collect()
    }

    pub fn overlay(&self) -> Option<OverlayView> {
        self.overlay.as_ref().map(|o| OverlayView {
            artwork: o.artwork.clone(),
            mechanism: o.mechanism,
            status: o.solver.status(),
            acknowledgement: o.solver.acknowledgement(),
        })
    }

    /// The open solver, for hosts that render mechanism-specific detail.
    pub fn solver(&self) -> Option<&dyn Solver> {
        self.overlay.as_ref().map(|o| o.solver.as_ref())
    }

    /// Pending timers across all leases.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn take_events(&mut self) -> Vec<GateEvent> {
        std::mem::take(&mut self.events)
    }

    // ─── Visitor actions ─────────────────────────────────────────────

    /// Route the visitor to an artwork: its content when unlocked, its
    /// solver otherwise. Selecting another artwork closes the open overlay.
    pub fn select_artwork(&mut self, id: &ArtworkId) -> Result<GateDecision, GateError> {
        let mechanism = self.artwork(id)?.mechanism;

        if self.store.is_solved(mechanism) {
            self.close_overlay();
            self.events.push(GateEvent::NavigateTo {
                artwork: id.clone(),
            });
            return Ok(GateDecision::Navigate(id.clone()));
        }

        if self.overlay.as_ref().is_some_and(|o| &o.artwork == id) {
            return Ok(GateDecision::SolverOpened(mechanism));
        }
        self.close_overlay();

        let now = self.clock.now_ms();
        let owner = self.scheduler.new_owner();
        let generation = self.store.generation();
        let mut solver = self.factory.build(mechanism);
        {
            let mut ctx = SolverContext::new(&self.store, &mut self.scheduler, owner, generation, now);
            solver.open(&mut ctx);
        }
        tracing::info!(artwork = %id, mechanism = %mechanism, "solver overlay opened");

        self.overlay = Some(Overlay {
            artwork: id.clone(),
            mechanism,
            owner,
            generation,
            solver,
            unlocked: false,
        });
        self.events.push(GateEvent::OverlayOpened {
            artwork: id.clone(),
            mechanism,
        });
        self.check_unlock();
        Ok(GateDecision::SolverOpened(mechanism))
    }

    /// Send visitor input to the open solver.
    pub fn input(&mut self, input: MechanismInput) -> InputOutcome {
        let now = self.clock.now_ms();
        let Some(overlay) = self.overlay.as_mut() else {
            tracing::debug!("input with no overlay open");
            return InputOutcome::Ignored;
        };
        let outcome = {
            let mut ctx = SolverContext::new(
                &self.store,
                &mut self.scheduler,
                overlay.owner,
                overlay.generation,
                now,
            );
            overlay.solver.handle(input, &mut ctx)
        };
        self.sync_store();
        outcome
    }

    /// Close the overlay without navigating. Its timers are cancelled and a
    /// pending navigation is dropped.
    pub fn close_overlay(&mut self) {
        if let Some((id, _)) = self.pending_navigation.take() {
            self.scheduler.cancel(id);
        }
        let Some(mut overlay) = self.overlay.take() else {
            return;
        };
        let now = self.clock.now_ms();
        {
            let mut ctx = SolverContext::new(
                &self.store,
                &mut self.scheduler,
                overlay.owner,
                overlay.generation,
                now,
            );
            overlay.solver.close(&mut ctx);
        }
        let cancelled = self.scheduler.cancel_owner(overlay.owner);
        let solved = overlay.solver.status().is_solved();
        tracing::debug!(artwork = %overlay.artwork, cancelled, solved, "solver overlay closed");
        self.events.push(GateEvent::OverlayClosed {
            artwork: overlay.artwork,
            solved,
        });
    }

    /// Reset the whole exhibition and close whatever is open.
    pub fn reset_exhibition(&mut self) {
        self.store.reset_exhibition();
        self.sync_store();
    }

    // ─── Time and store reactivity ───────────────────────────────────

    /// Advance to the clock's current time, dispatching every due timer.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        for fired in self.scheduler.advance(now) {
            if fired.owner == self.lease {
                self.on_own_timer(fired.id, fired.purpose);
                continue;
            }
            let Some(overlay) = self.overlay.as_mut().filter(|o| o.owner == fired.owner) else {
                tracing::debug!(purpose = ?fired.purpose, "dropping timer from a closed session");
                continue;
            };
            let mut ctx = SolverContext::new(
                &self.store,
                &mut self.scheduler,
                overlay.owner,
                overlay.generation,
                now,
            );
            overlay.solver.on_timer(fired.purpose, &mut ctx);
        }
        self.sync_store();
    }

    /// React to store changes made outside this controller.
    pub fn notify_store_changed(&mut self) {
        self.sync_store();
    }

    fn on_own_timer(&mut self, id: TimerId, purpose: TimerPurpose) {
        if purpose != TimerPurpose::Navigate {
            return;
        }
        let Some((pending, artwork)) = self.pending_navigation.take() else {
            return;
        };
        if pending != id {
            self.pending_navigation = Some((pending, artwork));
            return;
        }
        self.close_overlay();
        tracing::info!(artwork = %artwork, "navigating to unlocked artwork");
        self.events.push(GateEvent::NavigateTo { artwork });
    }

    fn sync_store(&mut self) {
        let generation = self.store.generation();
        if self.overlay.as_ref().is_some_and(|o| o.generation != generation) {
            tracing::debug!(generation, "closing overlay opened before reset");
            self.close_overlay();
        }

        let revision = self.store.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            let now = self.clock.now_ms();
            if let Some(overlay) = self.overlay.as_mut() {
                let mut ctx = SolverContext::new(
                    &self.store,
                    &mut self.scheduler,
                    overlay.owner,
                    overlay.generation,
                    now,
                );
                overlay.solver.on_store_changed(&mut ctx);
            }
        }
        self.check_unlock();
    }

    fn check_unlock(&mut self) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        if overlay.unlocked || !self.store.is_solved(overlay.mechanism) {
            return;
        }
        overlay.unlocked = true;
        let artwork = overlay.artwork.clone();
        self.events.push(GateEvent::Unlocked {
            artwork: artwork.clone(),
            mechanism: overlay.mechanism,
            acknowledgement: overlay.solver.acknowledgement(),
        });

        let delay = self.factory.config().gate.navigation_delay_ms;
        let now = self.clock.now_ms();
        let id = self
            .scheduler
            .schedule_once(self.lease, TimerPurpose::Navigate, now, delay);
        self.pending_navigation = Some((id, artwork));
        tracing::info!(mechanism = %overlay.mechanism, delay_ms = delay, "artwork unlocked");
    }
}
