//! # Check-Config Subcommand
//!
//! Loads an exhibition config (and optionally an artwork catalog) and runs
//! the same validation a kiosk applies at startup, so a bad edit is caught
//! before the installation is restarted.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use exhibit_core::{ConfigError, ExhibitionConfig};

use crate::status::load_catalog;

/// Arguments for the `exhibit check-config` subcommand.
#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// Config file to validate (.yaml, .yml, or .json).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Also validate an artwork catalog (JSON).
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,
}

/// Execute the check-config subcommand.
///
/// Returns exit code: 0 when valid, 1 on validation failure, 2 when the
/// file cannot be read or its format is unsupported.
pub fn run_check_config(args: &CheckConfigArgs) -> Result<u8> {
    let code = check_config(&args.path);
    if code != 0 {
        return Ok(code);
    }
    if let Some(catalog) = &args.catalog {
        let catalog = load_catalog(Some(catalog))?;
        println!("  OK: catalog with {} artworks", catalog.len());
    }
    Ok(0)
}

fn check_config(path: &Path) -> u8 {
    match ExhibitionConfig::load(path) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "config valid");
            println!(
                "  OK: {} (time-out {}s, exit at post {}, {} confirmshaming screens)",
                path.display(),
                config.timeout.wait_ms / 1_000,
                config.infinite_scroll.exit_index,
                config.confirmshaming.screens.len()
            );
            0
        }
        Err(e @ (ConfigError::Read { .. } | ConfigError::UnsupportedFormat { .. })) => {
            eprintln!("ERROR: {e}");
            2
        }
        Err(e) => {
            eprintln!("INVALID: {}: {e}", path.display());
            1
        }
    }
}
