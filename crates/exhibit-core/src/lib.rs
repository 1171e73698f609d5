//! # exhibit-core — Foundational Types for the Exhibition
//!
//! Leaf crate of the exhibition workspace. It defines the closed set of
//! mechanisms, the theme and visibility derivations, the read-only artwork
//! catalog, runtime configuration, and the clock abstraction every timer in
//! the system is driven by.
//!
//! ## Key Design Principles
//!
//! 1. **Closed mechanism enum.** `MechanismId` has exactly six variants.
//!    Invalid mechanism ids are unrepresentable, so store operations never
//!    need to validate them.
//!
//! 2. **Derived, never assigned.** `VisibilityTier` is only constructible
//!    from a solved count. Nothing can set a tier directly.
//!
//! 3. **Explicit time.** Solver logic receives `now` in epoch milliseconds
//!    from a [`Clock`]; tests drive a [`ManualClock`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `exhibit-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod artwork;
pub mod clock;
pub mod config;
pub mod error;
pub mod mechanism;
pub mod theme;
pub mod zone;

pub use artwork::{Artwork, ArtworkId, ArtworkLinks, Catalog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    AutoplayConfig, ConfirmshamingConfig, ConfirmshamingScreen, ExhibitionConfig, GateConfig,
    HarmonyConfig, InfiniteScrollConfig, SurveillanceConfig, TimeoutConfig,
};
pub use error::{CatalogError, ConfigError, ExhibitError, StorageError};
pub use mechanism::{MechanismId, MECHANISM_COUNT};
pub use theme::{escalation_level, InfrastructureLayer, Theme, VisibilityTier, MAX_ESCALATION_LEVEL};
pub use zone::Zone;
