//! # Status Subcommand
//!
//! Reports what a visitor would currently see: which mechanisms are solved,
//! the infrastructure visibility tier, the active theme and chrome, and the
//! lock state of every artwork in the catalog. A Time-Out countdown left
//! running by a visitor is reported against the system clock.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use exhibit_core::{
    ArtworkId, Catalog, Clock, ExhibitionConfig, InfrastructureLayer, MechanismId, SystemClock,
    Theme, TimeoutConfig,
};
use exhibit_mechanisms::solvers::TimeoutProgress;
use exhibit_session::{PageChrome, ThemeController};
use exhibit_state::{ExhibitionStore, TIMEOUT_PROGRESS_KEY};

/// Arguments for the `exhibit status` subcommand.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Artwork catalog (JSON). Defaults to the built-in catalog.
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Exhibition config (YAML/JSON) for the Time-Out wait. Defaults apply
    /// when omitted.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Lock state of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtworkStatus {
    pub id: ArtworkId,
    pub title: String,
    pub creator: String,
    pub mechanism: MechanismId,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub solved: Vec<MechanismId>,
    pub solved_count: usize,
    pub visibility_tier: u8,
    pub theme: Theme,
    pub chrome: PageChrome,
    pub layers: Vec<InfrastructureLayer>,
    pub escalation: Option<u8>,
    /// Time left on a running Time-Out countdown, if one was started.
    pub timeout_remaining_ms: Option<u64>,
    pub artworks: Vec<ArtworkStatus>,
}

/// Assemble the status report from the store and catalog as of `now_ms`.
pub fn build_report(
    store: &ExhibitionStore,
    catalog: &Catalog,
    timeout: &TimeoutConfig,
    now_ms: u64,
) -> StatusReport {
    let snapshot = store.snapshot();
    let timeout_remaining_ms = if snapshot.is_solved(MechanismId::Timeout) {
        None
    } else {
        store
            .load_record::<TimeoutProgress>(TIMEOUT_PROGRESS_KEY)
            .map(|p| timeout.wait_ms.saturating_sub(p.elapsed_at(now_ms)))
    };
    let presentation = ThemeController::new(&snapshot).presentation(&snapshot);

    let artworks = catalog
        .iter()
        .map(|artwork| ArtworkStatus {
            id: artwork.id.clone(),
            title: artwork.title.clone(),
            creator: artwork.creator.clone(),
            mechanism: artwork.mechanism,
            locked: !snapshot.is_solved(artwork.mechanism),
        })
        .collect();

    StatusReport {
        solved: snapshot.solved.iter().copied().collect(),
        solved_count: presentation.solved_count,
        visibility_tier: presentation.visibility_tier.value(),
        theme: presentation.theme,
        chrome: presentation.chrome,
        layers: presentation.layers,
        escalation: presentation.escalation,
        timeout_remaining_ms,
        artworks,
    }
}

/// Load the catalog at `path`, or the built-in one.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::builtin());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    Catalog::from_json_str(&contents)
        .with_context(|| format!("invalid catalog {}", path.display()))
}

/// Render the report as human-readable lines.
pub fn render_text(report: &StatusReport) -> String {
    let mut out = String::new();
    let solved: Vec<String> = report.solved.iter().map(|m| m.to_string()).collect();
    out.push_str(&format!(
        "solved:     {}/{} [{}]\n",
        report.solved_count,
        exhibit_core::MECHANISM_COUNT,
        solved.join(", ")
    ));
    out.push_str(&format!("theme:      {} ({} chrome)\n", report.theme, report.chrome));
    out.push_str(&format!("tier:       {}\n", report.visibility_tier));
    match report.escalation {
        Some(level) => out.push_str(&format!("escalation: {level}\n")),
        None => out.push_str("escalation: hidden\n"),
    }
    if let Some(ms) = report.timeout_remaining_ms {
        let secs = ms.div_ceil(1_000);
        out.push_str(&format!("time-out:   {}:{:02} remaining\n", secs / 60, secs % 60));
    }
    for artwork in &report.artworks {
        let state = if artwork.locked { "locked" } else { "unlocked" };
        out.push_str(&format!(
            "  {:<8} {:<22} {} ({})\n",
            state,
            artwork.id.as_str(),
            artwork.title,
            artwork.mechanism
        ));
    }
    out
}

/// Execute the status subcommand.
///
/// Returns exit code: 0 on success.
pub fn run_status(args: &StatusArgs, profile: &Path) -> Result<u8> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let config = match &args.config {
        Some(path) => ExhibitionConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ExhibitionConfig::default(),
    };
    let store = crate::open_profile(profile);
    let report = build_report(&store, &catalog, &config.timeout, SystemClock.now_ms());

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize status")?;
        println!("{json}");
    } else {
        print!("{}", render_text(&report));
    }
    Ok(0)
}
