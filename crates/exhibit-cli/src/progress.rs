//! # Progress Subcommands
//!
//! `solve`, `toggle`, and `reset` edit the persisted exhibition state of a
//! profile. They go through [`ExhibitionStore`] so the derived visibility
//! tier and theme are recomputed exactly as a visitor session would.
//!
//! `toggle` can un-solve a mechanism. It exists for installation and
//! rehearsal; visitors never reach it.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use exhibit_core::{Catalog, MechanismId};
use exhibit_state::{ExhibitionStore, SolveOutcome};

/// Arguments for the `exhibit solve` subcommand.
#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Mechanism to mark solved (e.g. `confirmshaming`, `infinite_scroll`).
    #[arg(value_name = "MECHANISM")]
    pub mechanism: MechanismId,
}

/// Arguments for the `exhibit toggle` subcommand.
#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Mechanism to flip.
    #[arg(value_name = "MECHANISM")]
    pub mechanism: MechanismId,
}

/// Arguments for the `exhibit reset` subcommand.
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Confirm that all progress and surveillance data should be erased.
    #[arg(long)]
    pub yes: bool,
}

/// Execute the solve subcommand.
///
/// Returns exit code: 0 on success (including an already-solved mechanism).
pub fn run_solve(args: &SolveArgs, profile: &Path) -> Result<u8> {
    let store = crate::open_profile(profile);
    println!("{}", solve(&store, &Catalog::builtin(), args.mechanism));
    Ok(0)
}

/// Execute the toggle subcommand.
pub fn run_toggle(args: &ToggleArgs, profile: &Path) -> Result<u8> {
    let store = crate::open_profile(profile);
    Ok(toggle(&store, args.mechanism))
}

/// Execute the reset subcommand.
///
/// Returns exit code: 0 on success, 2 when confirmation is missing.
pub fn run_reset(args: &ResetArgs, profile: &Path) -> Result<u8> {
    if !args.yes {
        eprintln!("refusing to reset {} without --yes", profile.display());
        return Ok(2);
    }
    let store = crate::open_profile(profile);
    store.reset_exhibition();
    println!("exhibition reset");
    Ok(0)
}

fn solve(store: &ExhibitionStore, catalog: &Catalog, mechanism: MechanismId) -> String {
    let artwork = catalog
        .by_mechanism(mechanism)
        .map_or_else(|| "(no artwork)".to_string(), |a| format!("\"{}\"", a.title));
    match store.solve_mechanism(mechanism) {
        SolveOutcome::Solved => format!(
            "{mechanism} solved, {artwork} unlocked ({}/{}, theme {})",
            store.solved_count(),
            exhibit_core::MECHANISM_COUNT,
            store.theme()
        ),
        SolveOutcome::AlreadySolved => format!("{mechanism} already solved, {artwork} unlocked"),
        // Generation is read inside the store; nothing can be stale here.
        SolveOutcome::Stale => format!("{mechanism} solve dropped"),
    }
}

fn toggle(store: &ExhibitionStore, mechanism: MechanismId) -> u8 {
    let solved = store.toggle_mechanism(mechanism);
    let state = if solved { "solved" } else { "unsolved" };
    println!("{mechanism} now {state} (theme {})", store.theme());
    0
}
