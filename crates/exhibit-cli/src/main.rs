//! # exhibit CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exhibit_cli::check::{run_check_config, CheckConfigArgs};
use exhibit_cli::progress::{run_reset, run_solve, run_toggle, ResetArgs, SolveArgs, ToggleArgs};
use exhibit_cli::status::{run_status, StatusArgs};
use exhibit_cli::DEFAULT_PROFILE_DIR;

/// Operator console for "We Should Be Allowed to Think".
///
/// Inspects and edits the persisted exhibition state of a visitor profile.
#[derive(Parser, Debug)]
#[command(name = "exhibit", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Profile directory holding the persisted exhibition state.
    #[arg(long, global = true, default_value = DEFAULT_PROFILE_DIR)]
    profile: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show solved mechanisms, tier, theme, and per-artwork lock state.
    Status(StatusArgs),

    /// Mark a mechanism solved.
    Solve(SolveArgs),

    /// Flip a mechanism between solved and unsolved.
    Toggle(ToggleArgs),

    /// Clear all progress and surveillance data in the profile.
    Reset(ResetArgs),

    /// Load and validate an exhibition config file.
    CheckConfig(CheckConfigArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise verbosity picks the level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(profile = %cli.profile.display(), "exhibit CLI starting");

    let result = match cli.command {
        Commands::Status(args) => run_status(&args, &cli.profile),
        Commands::Solve(args) => run_solve(&args, &cli.profile),
        Commands::Toggle(args) => run_toggle(&args, &cli.profile),
        Commands::Reset(args) => run_reset(&args, &cli.profile),
        Commands::CheckConfig(args) => run_check_config(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
