//! # Spatial Zones
//!
//! The surveillance panel is partitioned into four quadrants plus a centred
//! square. The centre square takes priority over quadrant membership, and
//! every point of the panel maps to exactly one zone.

use serde::{Deserialize, Serialize};

/// A clickable region of the surveillance panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Zone {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Zone {
    /// All zones in panel reading order.
    pub fn all() -> &'static [Zone] {
        &[
            Self::TopLeft,
            Self::TopRight,
            Self::BottomLeft,
            Self::BottomRight,
            Self::Center,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Center => "center",
        }
    }

    /// Locate the zone under `(x, y)` in a panel of `width × height`.
    ///
    /// Points strictly within `center_threshold` of the panel centre on both
    /// axes are `Center`. Otherwise the quadrant is chosen with the centre
    /// lines belonging to the right and bottom halves. Coordinates outside
    /// the panel still map to the nearest quadrant.
    pub fn locate(x: f64, y: f64, width: f64, height: f64, center_threshold: f64) -> Self {
        let cx = width / 2.0;
        let cy = height / 2.0;

        if (x - cx).abs() < center_threshold && (y - cy).abs() < center_threshold {
            return Self::Center;
        }

        match (x < cx, y < cy) {
            (true, true) => Self::TopLeft,
            (false, true) => Self::TopRight,
            (true, false) => Self::BottomLeft,
            (false, false) => Self::BottomRight,
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
