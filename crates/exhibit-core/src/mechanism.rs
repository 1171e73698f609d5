//! # Mechanism Identifiers — Single Source of Truth
//!
//! Defines `MechanismId`, the closed set of six manipulative design patterns
//! the exhibition gates its artworks behind. Every `match` on a mechanism is
//! exhaustive, so adding a seventh pattern forces every consumer (store,
//! solver factory, catalog validation) to handle it at compile time.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ExhibitError;

/// One of the six gating mechanisms, each bound 1:1 to an artwork.
///
/// | # | Mechanism | Protocol |
/// |---|-----------|----------|
/// | 1 | Confirmshaming | refuse every forced-choice screen |
/// | 2 | Autoplay | pause playback on the hidden clue |
/// | 3 | Timeout | wait out the lockout, or solve two others |
/// | 4 | InfiniteScroll | scroll to the exit and activate it |
/// | 5 | Surveillance | click the zones in the fixed order |
/// | 6 | Harmony | agree, then reproduce the verification text |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanismId {
    /// Forced-choice screens phrased to shame refusal.
    Confirmshaming,
    /// Autoplaying media with a hidden clue window.
    Autoplay,
    /// Paternalistic timed lockout.
    Timeout,
    /// Endless procedurally generated feed.
    InfiniteScroll,
    /// Pointer tracking over spatial zones.
    Surveillance,
    /// Mandatory consent wall with a verification CAPTCHA.
    Harmony,
}

/// Total number of mechanisms. Completing all of them liberates the site.
pub const MECHANISM_COUNT: usize = 6;

impl MechanismId {
    /// All mechanisms in exhibition order.
    pub fn all() -> &'static [MechanismId] {
        &[
            Self::Confirmshaming,
            Self::Autoplay,
            Self::Timeout,
            Self::InfiniteScroll,
            Self::Surveillance,
            Self::Harmony,
        ]
    }

    /// The snake_case identifier, matching the serde representation and
    /// the keys persisted in durable storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmshaming => "confirmshaming",
            Self::Autoplay => "autoplay",
            Self::Timeout => "timeout",
            Self::InfiniteScroll => "infinite_scroll",
            Self::Surveillance => "surveillance",
            Self::Harmony => "harmony",
        }
    }

    /// Human-facing name shown on locked feed cards.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Confirmshaming => "Confirmshaming",
            Self::Autoplay => "Autoplay/Countdown",
            Self::Timeout => "Time-Out",
            Self::InfiniteScroll => "Infinite Scroll",
            Self::Surveillance => "Surveillance UI",
            Self::Harmony => "Harmony Button",
        }
    }
}

impl std::fmt::Display for MechanismId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MechanismId {
    type Err = ExhibitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ExhibitError::UnknownMechanism(s.to_string()))
    }
}
