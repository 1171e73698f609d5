//! # Theme and Visibility Derivations
//!
//! Pure functions of the solved-mechanism count. The store never assigns a
//! tier; it recomputes one from the solved set after every mutation.
//!
//! ```text
//! solved:  0   1   2   3   4   5   6
//! tier:    0   1   1   2   2   3   3
//! escal.:  0   0   1   1   2   2   3
//! ```

use serde::{Deserialize, Serialize};

use crate::mechanism::MECHANISM_COUNT;

/// Highest notification escalation level.
pub const MAX_ESCALATION_LEVEL: u8 = 3;

/// Site-wide theme. `Resistance` is entered exactly once per reset cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// The manipulative platform chrome.
    #[default]
    Platform,
    /// The liberated chrome, shown after every mechanism is solved.
    Resistance,
}

impl Theme {
    /// The theme reached by a solved count, ignoring history.
    pub fn for_solved_count(count: usize) -> Self {
        if count >= MECHANISM_COUNT {
            Self::Resistance
        } else {
            Self::Platform
        }
    }

    pub fn is_resistance(&self) -> bool {
        matches!(self, Self::Resistance)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Platform => f.write_str("platform"),
            Self::Resistance => f.write_str("resistance"),
        }
    }
}

/// How much simulated infrastructure is exposed, in `0..=3`.
///
/// Computed as `ceil(solved / 6 * 3)` clamped to `[0, 3]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct VisibilityTier(u8);

impl VisibilityTier {
    /// Highest tier.
    pub const MAX: Self = Self(3);

    /// Derive the tier for a solved count.
    pub fn from_solved_count(count: usize) -> Self {
        let count = count.min(MECHANISM_COUNT);
        // ceil(count * 3 / 6) in integer arithmetic.
        let tier = (count * 3).div_ceil(MECHANISM_COUNT);
        Self(tier.min(Self::MAX.0 as usize) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Infrastructure layers exposed at this tier.
    pub fn layers(&self) -> Vec<InfrastructureLayer> {
        InfrastructureLayer::for_tier(*self)
    }
}

impl std::fmt::Display for VisibilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A layer of simulated platform infrastructure chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfrastructureLayer {
    /// Scrolling fake database query log.
    DatabaseLog,
    /// Fake console error stream.
    ConsoleErrors,
    /// Fake network request monitor.
    NetworkMonitor,
}

impl InfrastructureLayer {
    /// Layers are cumulative: each tier adds one on top of the previous.
    pub fn for_tier(tier: VisibilityTier) -> Vec<Self> {
        [Self::DatabaseLog, Self::ConsoleErrors, Self::NetworkMonitor]
            .into_iter()
            .take(tier.value() as usize)
            .collect()
    }
}

/// Notification escalation level for a solved count: `min(solved / 2, 3)`.
pub fn escalation_level(solved_count: usize) -> u8 {
    (solved_count / 2).min(MAX_ESCALATION_LEVEL as usize) as u8
}
