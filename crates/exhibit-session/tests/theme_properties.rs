//! The rendered chrome always agrees with the store's theme, and every
//! swap is reported exactly once.

use exhibit_core::MechanismId;
use exhibit_session::{PageChrome, ThemeController, ThemeTransition};
use exhibit_state::ExhibitionStore;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Solve(MechanismId),
    Toggle(MechanismId),
    Reset,
}

fn mechanism() -> impl Strategy<Value = MechanismId> {
    prop::sample::select(MechanismId::all().to_vec())
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => mechanism().prop_map(Op::Solve),
        2 => mechanism().prop_map(Op::Toggle),
        1 => Just(Op::Reset),
    ]
}

proptest! {
    #[test]
    fn prop_chrome_follows_theme(ops in prop::collection::vec(op(), 0..60)) {
        let store = ExhibitionStore::in_memory();
        let mut theme = ThemeController::new(&store.snapshot());
        let mut liberations = 0usize;
        let mut restorations = 0usize;

        for op in ops {
            match op {
                Op::Solve(m) => { store.solve_mechanism(m); }
                Op::Toggle(m) => { store.toggle_mechanism(m); }
                Op::Reset => store.reset_exhibition(),
            }
            let snapshot = store.snapshot();
            match theme.sync(&snapshot) {
                Some(ThemeTransition::Liberated) => liberations += 1,
                Some(ThemeTransition::Restored) => restorations += 1,
                None => {}
            }
            prop_assert_eq!(theme.chrome(), PageChrome::for_theme(snapshot.theme));
            prop_assert!(liberations >= restorations);
            prop_assert!(liberations - restorations <= 1);
        }
    }
}
