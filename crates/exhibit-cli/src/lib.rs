//! # exhibit-cli — Operator Console
//!
//! Provides the `exhibit` command-line interface for installing and
//! maintaining the exhibition on a kiosk. Every subcommand works against a
//! directory-backed visitor profile, one JSON file per storage key, so the
//! console sees exactly what a visitor's session persisted.
//!
//! ## Subcommands
//!
//! - `exhibit status` — solved set, visibility tier, theme, lock state.
//! - `exhibit solve <mechanism>` — mark a mechanism solved.
//! - `exhibit toggle <mechanism>` — flip a mechanism (operator affordance).
//! - `exhibit reset --yes` — return the profile to its initial state.
//! - `exhibit check-config <path>` — validate a YAML/JSON exhibition config.
//!
//! ```bash
//! exhibit --profile /var/lib/exhibit status --json
//! exhibit --profile /var/lib/exhibit reset --yes
//! ```

pub mod check;
pub mod progress;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use exhibit_state::{DirectoryStorage, ExhibitionStore};

/// Default profile directory, relative to the working directory.
pub const DEFAULT_PROFILE_DIR: &str = ".exhibit-profile";

/// Open the exhibition store persisted under `profile`.
///
/// A missing directory is a fresh profile; it is created on first write.
pub fn open_profile(profile: &Path) -> ExhibitionStore {
    tracing::debug!(profile = %profile.display(), "opening profile");
    ExhibitionStore::open(Arc::new(DirectoryStorage::new(profile)))
}
