//! # exhibit-session — Gate and Theme Controllers
//!
//! The application-root layer of the exhibition. It owns the store handle,
//! the artwork catalog, and the single tick scheduler, and turns store
//! state into two decisions:
//!
//! - [`GateController`]: locked or unlocked, per artwork. Locked artworks
//!   open their mechanism's solver as an overlay; a solve closes the
//!   overlay and navigates to the content after a short delay.
//! - [`ThemeController`]: page chrome, infrastructure exposure, and
//!   notification escalation, with a one-time swap to the liberated
//!   layout once every mechanism is solved.
//!
//! ## Data Flow
//!
//! ```text
//! solver ──solve──▶ ExhibitionStore ──snapshot──▶ GateController (unlock, navigate)
//!                                      └────────▶ ThemeController (tier, chrome)
//! ```

pub mod gate;
pub mod theme;

pub use gate::{GateController, GateDecision, GateError, GateEvent, OverlayView};
pub use theme::{ChromeRegions, NavLink, PageChrome, Presentation, ThemeController, ThemeTransition};
