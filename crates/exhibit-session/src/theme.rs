//! # Theme / Transition Controller
//!
//! Turns the store snapshot into what the page should look like: which
//! chrome to render, how much simulated infrastructure to expose, and how
//! loud the notification badges are.
//!
//! The platform and liberated chromes are different layouts, not a colour
//! toggle. Header, navigation, and footer are replaced wholesale when the
//! theme flips. The flip is reported once as a [`ThemeTransition`]; the
//! only way back is an exhibition reset.

use exhibit_core::{InfrastructureLayer, Theme, VisibilityTier, MECHANISM_COUNT};
use exhibit_state::ExhibitionSnapshot;
use serde::Serialize;

/// A navigation entry in a chrome layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub target: &'static str,
}

/// The three regions every chrome replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChromeRegions {
    pub header: String,
    pub navigation: Vec<NavLink>,
    pub footer: String,
}

/// Which page layout wraps the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageChrome {
    /// Engagement-platform layout with the feed header and badges.
    Platform,
    /// The post-liberation layout.
    Liberated,
}

impl PageChrome {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Platform => Self::Platform,
            Theme::Resistance => Self::Liberated,
        }
    }

    /// Render the header, navigation, and footer for this chrome.
    pub fn regions(&self, solved_count: usize) -> ChromeRegions {
        match self {
            Self::Platform => ChromeRegions {
                header: "Recommended for You".to_string(),
                navigation: vec![
                    NavLink {
                        label: "Home",
                        target: "/",
                    },
                    NavLink {
                        label: "About",
                        target: "/about",
                    },
                    NavLink {
                        label: "Reset",
                        target: "reset",
                    },
                ],
                footer: "© 2025 We Should Be Allowed to Think | Peripheral Forms".to_string(),
            },
            Self::Liberated => ChromeRegions {
                header: "WE SHOULD BE ALLOWED TO THINK".to_string(),
                navigation: vec![
                    NavLink {
                        label: "→ HOME",
                        target: "/",
                    },
                    NavLink {
                        label: "→ ABOUT",
                        target: "/about",
                    },
                    NavLink {
                        label: "→ RESET EXHIBITION",
                        target: "reset",
                    },
                ],
                footer: format!(
                    "A people's internet is possible. You have unlocked {solved_count}/{MECHANISM_COUNT} mechanisms"
                ),
            },
        }
    }
}

impl std::fmt::Display for PageChrome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Platform => f.write_str("platform"),
            Self::Liberated => f.write_str("liberated"),
        }
    }
}

/// A one-time chrome swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeTransition {
    /// Every mechanism solved; the platform chrome is torn down.
    Liberated,
    /// The exhibition was reset; the platform chrome returns.
    Restored,
}

/// Everything the presentation layer reads from the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub theme: Theme,
    pub chrome: PageChrome,
    pub visibility_tier: VisibilityTier,
    pub layers: Vec<InfrastructureLayer>,
    /// Notification badge intensity, `None` when badges are hidden.
    pub escalation: Option<u8>,
    pub solved_count: usize,
    pub regions: ChromeRegions,
}

/// Tracks the rendered chrome and reports swaps.
#[derive(Debug, Clone)]
pub struct ThemeController {
    chrome: PageChrome,
    generation: u64,
}

impl ThemeController {
    /// Start from a restored snapshot. A reload into a liberated exhibition
    /// renders the liberated chrome directly, with no transition.
    pub fn new(snapshot: &ExhibitionSnapshot) -> Self {
        Self {
            chrome: PageChrome::for_theme(snapshot.theme),
            generation: snapshot.generation,
        }
    }

    pub fn chrome(&self) -> PageChrome {
        self.chrome
    }

    /// Reconcile with the latest snapshot. Returns the swap performed, if
    /// any. Liberated chrome is only ever abandoned across a reset.
    pub fn sync(&mut self, snapshot: &ExhibitionSnapshot) -> Option<ThemeTransition> {
        let target = PageChrome::for_theme(snapshot.theme);
        let reset = snapshot.generation != self.generation;
        self.generation = snapshot.generation;

        let transition = match (self.chrome, target) {
            (PageChrome::Platform, PageChrome::Liberated) => ThemeTransition::Liberated,
            (PageChrome::Liberated, PageChrome::Platform) if reset => ThemeTransition::Restored,
            _ => return None,
        };
        self.chrome = target;
        tracing::info!(chrome = %self.chrome, solved = snapshot.solved_count(), "page chrome swapped");
        Some(transition)
    }

    pub fn presentation(&self, snapshot: &ExhibitionSnapshot) -> Presentation {
        let solved_count = snapshot.solved_count();
        Presentation {
            theme: snapshot.theme,
            chrome: self.chrome,
            visibility_tier: snapshot.visibility_tier,
            layers: snapshot.infrastructure_layers(),
            escalation: snapshot.escalation_level(),
            solved_count,
            regions: self.chrome.regions(solved_count),
        }
    }
}
