//! # exhibit-state — Exhibition State Store
//!
//! The process-wide record of unlock progress, owned by the application
//! root and handed to solvers and controllers as an explicit
//! [`ExhibitionStore`] handle. Tests instantiate isolated stores over
//! [`MemoryStorage`].
//!
//! ## Operations
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `solve_mechanism` | idempotent set-add, recompute tier and theme, persist |
//! | `toggle_mechanism` | flip membership (operator/test affordance), persist |
//! | `reset_exhibition` | clear everything, bump generation, persist |
//! | `track_surveillance` | shallow-merge observational data, never persisted |
//!
//! All operations are synchronous and total.

pub mod storage;
pub mod store;
pub mod surveillance;

pub use storage::{read_json, write_json, DirectoryStorage, MemoryStorage, StateStorage};
pub use store::{
    ExhibitionSnapshot, ExhibitionStore, SolveOutcome, EXHIBITION_STATE_KEY, TIMEOUT_PROGRESS_KEY,
};
pub use surveillance::{
    PointerSample, SurveillancePatch, SurveillanceRecord, MAX_CLICK_PATTERN, MAX_POINTER_SAMPLES,
};
