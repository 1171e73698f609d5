//! # exhibit-mechanisms — Mechanism Solvers
//!
//! Each exhibited artwork is gated by one manipulative-design mechanism.
//! This crate implements the six of them as independent state machines
//! behind the [`Solver`] trait:
//!
//! | Mechanism | Solve condition |
//! |-----------|-----------------|
//! | Confirmshaming | refuse on every screen in a row |
//! | Autoplay | pause within tolerance of the hidden clue |
//! | Time-Out | wait out the lockout, or solve two other mechanisms |
//! | Infinite Scroll | activate the exit once it has been revealed |
//! | Surveillance | click the zones in the fixed order |
//! | Harmony | agree, then type the verification phrase |
//!
//! ## Time
//!
//! Solvers own no threads. Polling, countdowns, flushes, and transient
//! errors are timers in a single [`Scheduler`], leased per solver session
//! and cancelled together when the session closes.
//!
//! ## Crate Policy
//!
//! - Depends on `exhibit-core` and `exhibit-state` only.
//! - Solvers report success through [`SolveLatch`], never directly.

pub mod feed;
pub mod playback;
pub mod scheduler;
pub mod solver;
pub mod solvers;

pub use feed::{generate_post, generate_range, FeedPost};
pub use playback::{
    PlayTrigger, PlaybackEngine, PlaybackError, PlaybackProvider, PlaybackState,
    SimulatedPlayback, SimulatedPlaybackProvider, StateListener,
};
pub use scheduler::{FiredTimer, OwnerId, Scheduler, TimerId, TimerPurpose};
pub use solver::{
    Acknowledgement, InputOutcome, MechanismInput, ScrollMetrics, SolveLatch, Solver,
    SolverContext, SolverStatus, UnlockPath,
};
pub use solvers::SolverFactory;
