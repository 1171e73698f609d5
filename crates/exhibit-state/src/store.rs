//! # Exhibition State Store
//!
//! The single source of truth for unlock progress. Holds the solved set,
//! the derived visibility tier and theme, and the surveillance side-channel.
//!
//! ## Invariants
//!
//! - `solved` is a set; solving an already-solved mechanism is a no-op.
//! - `visibility_tier` is recomputed from `|solved|` after every mutation
//!   and never assigned directly.
//! - `theme` moves `Platform → Resistance` once, when `|solved|` reaches 6,
//!   and only [`ExhibitionStore::reset_exhibition`] moves it back.
//!
//! ## Persistence
//!
//! `solved` and `theme` are written to durable storage under
//! [`EXHIBITION_STATE_KEY`] after every change. Storage failures are logged
//! and swallowed: the session keeps working, progress just may not survive
//! a reload. All operations are total.
//!
//! ## Stale callbacks
//!
//! Every reset bumps [`ExhibitionSnapshot::generation`]. Solvers capture the
//! generation when they open and report through
//! [`ExhibitionStore::solve_mechanism_in`], so a timer that fires after a
//! reset cannot resurrect a mechanism.

use std::collections::BTreeSet;
use std::sync::Arc;

use exhibit_core::{
    escalation_level, InfrastructureLayer, MechanismId, Theme, VisibilityTier, MECHANISM_COUNT,
};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::storage::{read_json, write_json, MemoryStorage, StateStorage};
use crate::surveillance::{SurveillancePatch, SurveillanceRecord};

/// Storage key of the persisted exhibition record.
pub const EXHIBITION_STATE_KEY: &str = "exhibition-state";

/// Storage key of the Time-Out solver's progress record.
pub const TIMEOUT_PROGRESS_KEY: &str = "timeout-progress";

/// The durable subset of the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct PersistedExhibition {
    solved: Vec<MechanismId>,
    theme: Theme,
}

/// Result of a solve report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// The mechanism was newly added to the solved set.
    Solved,
    /// The mechanism was already solved; nothing changed.
    AlreadySolved,
    /// The report came from before the latest reset and was dropped.
    Stale,
}

/// A consistent read-only view of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ExhibitionSnapshot {
    pub solved: BTreeSet<MechanismId>,
    pub visibility_tier: VisibilityTier,
    pub theme: Theme,
    /// Bumped whenever `solved` or `theme` changes.
    pub revision: u64,
    /// Bumped on every reset.
    pub generation: u64,
}

impl ExhibitionSnapshot {
    pub fn is_solved(&self, mechanism: MechanismId) -> bool {
        self.solved.contains(&mechanism)
    }

    pub fn solved_count(&self) -> usize {
        self.solved.len()
    }

    /// Solved mechanisms other than `mechanism`.
    pub fn solved_count_excluding(&self, mechanism: MechanismId) -> usize {
        self.solved.iter().filter(|m| **m != mechanism).count()
    }

    pub fn is_complete(&self) -> bool {
        self.solved.len() == MECHANISM_COUNT
    }

    pub fn infrastructure_layers(&self) -> Vec<InfrastructureLayer> {
        self.visibility_tier.layers()
    }

    /// Notification escalation level. Notifications are not shown at all
    /// under the resistance theme.
    pub fn escalation_level(&self) -> Option<u8> {
        if self.theme.is_resistance() {
            None
        } else {
            Some(escalation_level(self.solved.len()))
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    solved: BTreeSet<MechanismId>,
    visibility_tier: VisibilityTier,
    theme: Theme,
    surveillance: SurveillanceRecord,
    revision: u64,
    generation: u64,
}

impl Inner {
    fn recompute(&mut self) {
        self.visibility_tier = VisibilityTier::from_solved_count(self.solved.len());
        if self.solved.len() == MECHANISM_COUNT {
            self.theme = Theme::Resistance;
        }
    }

    fn snapshot(&self) -> ExhibitionSnapshot {
        ExhibitionSnapshot {
            solved: self.solved.clone(),
            visibility_tier: self.visibility_tier,
            theme: self.theme,
            revision: self.revision,
            generation: self.generation,
        }
    }

    fn persisted(&self) -> PersistedExhibition {
        PersistedExhibition {
            solved: self.solved.iter().copied().collect(),
            theme: self.theme,
        }
    }
}

/// Shared handle to the exhibition state. Clones refer to the same store.
#[derive(Clone)]
pub struct ExhibitionStore {
    inner: Arc<RwLock<Inner>>,
    storage: Arc<dyn StateStorage>,
}

impl std::fmt::Debug for ExhibitionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExhibitionStore")
            .field("state", &*self.inner.read())
            .finish_non_exhaustive()
    }
}

impl ExhibitionStore {
    /// Open the store over `storage`, restoring any persisted progress.
    ///
    /// An unreadable or corrupt record starts a fresh exhibition.
    pub fn open(storage: Arc<dyn StateStorage>) -> Self {
        let mut inner = Inner::default();

        match read_json::<PersistedExhibition>(storage.as_ref(), EXHIBITION_STATE_KEY) {
            Ok(Some(record)) => {
                inner.solved = record.solved.into_iter().collect();
                inner.theme = record.theme;
                inner.recompute();
                tracing::info!(
                    solved = inner.solved.len(),
                    theme = %inner.theme,
                    "restored exhibition state"
                );
            }
            Ok(None) => {
                tracing::debug!("no persisted exhibition state, starting fresh");
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted exhibition state unreadable, starting fresh");
            }
        }

        Self {
            inner: Arc::new(RwLock::new(inner)),
            storage,
        }
    }

    /// A store backed by fresh in-memory storage.
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()))
    }

    pub fn snapshot(&self) -> ExhibitionSnapshot {
        self.inner.read().snapshot()
    }

    pub fn is_solved(&self, mechanism: MechanismId) -> bool {
        self.inner.read().solved.contains(&mechanism)
    }

    pub fn solved_count(&self) -> usize {
        self.inner.read().solved.len()
    }

    pub fn theme(&self) -> Theme {
        self.inner.read().theme
    }

    pub fn visibility_tier(&self) -> VisibilityTier {
        self.inner.read().visibility_tier
    }

    pub fn revision(&self) -> u64 {
        self.inner.read().revision
    }

    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Mark `mechanism` solved. Idempotent.
    pub fn solve_mechanism(&self, mechanism: MechanismId) -> SolveOutcome {
        let persisted = {
            let mut inner = self.inner.write();
            self.apply_solve(&mut inner, mechanism)
        };
        self.finish_solve(mechanism, persisted)
    }

    /// Mark `mechanism` solved on behalf of a solver opened during
    /// `generation`. Reports from before the latest reset are dropped.
    pub fn solve_mechanism_in(&self, mechanism: MechanismId, generation: u64) -> SolveOutcome {
        let persisted = {
            let mut inner = self.inner.write();
            if inner.generation != generation {
                tracing::debug!(
                    mechanism = %mechanism,
                    reported = generation,
                    current = inner.generation,
                    "dropping stale solve report"
                );
                return SolveOutcome::Stale;
            }
            self.apply_solve(&mut inner, mechanism)
        };
        self.finish_solve(mechanism, persisted)
    }

    fn apply_solve(&self, inner: &mut Inner, mechanism: MechanismId) -> Option<PersistedExhibition> {
        if !inner.solved.insert(mechanism) {
            return None;
        }
        let before = inner.theme;
        inner.recompute();
        inner.revision += 1;

        tracing::info!(
            mechanism = %mechanism,
            solved = inner.solved.len(),
            tier = %inner.visibility_tier,
            "mechanism solved"
        );
        if before != inner.theme {
            tracing::info!(theme = %inner.theme, "all mechanisms solved, theme liberated");
        }
        Some(inner.persisted())
    }

    fn finish_solve(&self, mechanism: MechanismId, persisted: Option<PersistedExhibition>) -> SolveOutcome {
        match persisted {
            Some(record) => {
                self.persist(&record);
                SolveOutcome::Solved
            }
            None => {
                tracing::debug!(mechanism = %mechanism, "mechanism already solved");
                SolveOutcome::AlreadySolved
            }
        }
    }

    /// Flip membership of `mechanism`. Operator and test affordance only.
    ///
    /// Returns whether the mechanism is solved afterwards. Reaching six
    /// solved liberates the theme exactly as solving does; removing a
    /// mechanism leaves the theme untouched.
    pub fn toggle_mechanism(&self, mechanism: MechanismId) -> bool {
        let (now_solved, record) = {
            let mut inner = self.inner.write();
            let now_solved = if inner.solved.remove(&mechanism) {
                false
            } else {
                inner.solved.insert(mechanism);
                true
            };
            inner.recompute();
            inner.revision += 1;
            tracing::info!(
                mechanism = %mechanism,
                solved = now_solved,
                count = inner.solved.len(),
                theme = %inner.theme,
                "mechanism toggled"
            );
            (now_solved, inner.persisted())
        };
        self.persist(&record);
        now_solved
    }

    /// Clear all progress: solved set, theme, surveillance record, and the
    /// Time-Out solver's durable timer. Irreversible.
    pub fn reset_exhibition(&self) {
        let record = {
            let mut inner = self.inner.write();
            inner.solved.clear();
            inner.theme = Theme::Platform;
            inner.surveillance = SurveillanceRecord::default();
            inner.recompute();
            inner.revision += 1;
            inner.generation += 1;
            tracing::info!(generation = inner.generation, "exhibition reset");
            inner.persisted()
        };
        self.persist(&record);
        self.remove_record(TIMEOUT_PROGRESS_KEY);
    }

    /// Shallow-merge `patch` into the surveillance record.
    pub fn track_surveillance(&self, patch: SurveillancePatch) {
        if patch.is_empty() {
            return;
        }
        self.inner.write().surveillance.merge(patch);
    }

    pub fn surveillance(&self) -> SurveillanceRecord {
        self.inner.read().surveillance.clone()
    }

    // ─── Auxiliary durable records ───────────────────────────────────

    /// Load a solver-owned record. Failures degrade to `None`.
    pub fn load_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match read_json(self.storage.as_ref(), key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to load durable record");
                None
            }
        }
    }

    /// Save a solver-owned record. Returns whether the write landed.
    pub fn save_record<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match write_json(self.storage.as_ref(), key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to save durable record");
                false
            }
        }
    }

    /// Delete a solver-owned record. Returns whether the delete landed.
    pub fn remove_record(&self, key: &str) -> bool {
        match self.storage.remove(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to remove durable record");
                false
            }
        }
    }

    fn persist(&self, record: &PersistedExhibition) {
        if let Err(e) = write_json(self.storage.as_ref(), EXHIBITION_STATE_KEY, record) {
            tracing::warn!(error = %e, "failed to persist exhibition state; progress may not survive reload");
        }
    }
}
