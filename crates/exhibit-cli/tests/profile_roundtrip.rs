//! Subcommands sharing one profile directory see each other's writes.

use exhibit_cli::progress::{run_reset, run_solve, ResetArgs, SolveArgs};
use exhibit_cli::status::{build_report, load_catalog};
use exhibit_cli::open_profile;
use exhibit_core::{MechanismId, TimeoutConfig};
use exhibit_session::PageChrome;
use exhibit_state::EXHIBITION_STATE_KEY;

#[test]
fn test_status_reads_what_solve_wrote() {
    let dir = tempfile::tempdir().unwrap();
    let profile = dir.path().join("kiosk-1");

    for m in [MechanismId::Surveillance, MechanismId::InfiniteScroll] {
        assert_eq!(run_solve(&SolveArgs { mechanism: m }, &profile).unwrap(), 0);
    }
    assert!(profile.join(format!("{EXHIBITION_STATE_KEY}.json")).exists());

    let catalog = load_catalog(None).unwrap();
    let report = build_report(&open_profile(&profile), &catalog, &TimeoutConfig::default(), 0);
    assert_eq!(report.solved_count, 2);
    assert_eq!(report.visibility_tier, 1);
    assert_eq!(report.chrome, PageChrome::Platform);
    assert_eq!(report.artworks.iter().filter(|a| a.locked).count(), 4);
}

#[test]
fn test_reset_then_status_is_fresh() {
    let dir = tempfile::tempdir().unwrap();
    for m in MechanismId::all() {
        run_solve(&SolveArgs { mechanism: *m }, dir.path()).unwrap();
    }
    let catalog = load_catalog(None).unwrap();
    assert_eq!(
        build_report(&open_profile(dir.path()), &catalog, &TimeoutConfig::default(), 0).chrome,
        PageChrome::Liberated
    );

    run_reset(&ResetArgs { yes: true }, dir.path()).unwrap();
    let report = build_report(&open_profile(dir.path()), &catalog, &TimeoutConfig::default(), 0);
    assert_eq!(report.solved_count, 0);
    assert_eq!(report.chrome, PageChrome::Platform);
    assert!(report.artworks.iter().all(|a| a.locked));
}
