//! # Surveillance Side-Channel
//!
//! Observational flavor data collected while the visitor moves around the
//! exhibition. Nothing in the unlock logic reads it.
//!
//! Updates are shallow merges: each field present in a
//! [`SurveillancePatch`] replaces the stored field wholesale.

use serde::{Deserialize, Serialize};

/// Pointer samples retained in the record.
pub const MAX_POINTER_SAMPLES: usize = 50;

/// Click labels retained in the record.
pub const MAX_CLICK_PATTERN: usize = 20;

/// A pointer position observed at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub at_ms: u64,
}

/// The accumulated tracking record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SurveillanceRecord {
    /// Most recent pointer samples, oldest first.
    pub mouse_movements: Vec<PointerSample>,
    /// Scroll depth as a whole percentage.
    pub scroll_depth: u8,
    pub time_on_site_ms: u64,
    /// Most recent click labels (zone or element names), oldest first.
    pub click_pattern: Vec<String>,
}

/// A partial update to the [`SurveillanceRecord`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurveillancePatch {
    pub mouse_movements: Option<Vec<PointerSample>>,
    pub scroll_depth: Option<u8>,
    pub time_on_site_ms: Option<u64>,
    pub click_pattern: Option<Vec<String>>,
}

impl SurveillancePatch {
    pub fn mouse_movements(samples: Vec<PointerSample>) -> Self {
        Self {
            mouse_movements: Some(samples),
            ..Self::default()
        }
    }

    pub fn scroll_depth(percent: u8) -> Self {
        Self {
            scroll_depth: Some(percent.min(100)),
            ..Self::default()
        }
    }

    pub fn time_on_site(ms: u64) -> Self {
        Self {
            time_on_site_ms: Some(ms),
            ..Self::default()
        }
    }

    pub fn click_pattern(labels: Vec<String>) -> Self {
        Self {
            click_pattern: Some(labels),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mouse_movements.is_none()
            && self.scroll_depth.is_none()
            && self.time_on_site_ms.is_none()
            && self.click_pattern.is_none()
    }
}

impl SurveillanceRecord {
    /// Apply `patch` field by field, last write wins.
    pub fn merge(&mut self, patch: SurveillancePatch) {
        if let Some(samples) = patch.mouse_movements {
            self.mouse_movements = keep_tail(samples, MAX_POINTER_SAMPLES);
        }
        if let Some(depth) = patch.scroll_depth {
            self.scroll_depth = depth.min(100);
        }
        if let Some(ms) = patch.time_on_site_ms {
            self.time_on_site_ms = ms;
        }
        if let Some(labels) = patch.click_pattern {
            self.click_pattern = keep_tail(labels, MAX_CLICK_PATTERN);
        }
    }
}

fn keep_tail<T>(mut items: Vec<T>, max: usize) -> Vec<T> {
    if items.len() > max {
        items.drain(..items.len() - max);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(i: u64) -> PointerSample {
        PointerSample {
            x: i as f64,
            y: 0.0,
            at_ms: i,
        }
    }

    #[test]
    fn test_merge_replaces_only_present_fields() {
        let mut record = SurveillanceRecord {
            scroll_depth: 40,
            time_on_site_ms: 9_000,
            ..Default::default()
        };
        record.merge(SurveillancePatch::scroll_depth(75));
        assert_eq!(record.scroll_depth, 75);
        assert_eq!(record.time_on_site_ms, 9_000);
    }

    #[test]
    fn test_last_write_wins() {
        let mut record = SurveillanceRecord::default();
        record.merge(SurveillancePatch::click_pattern(vec!["a".into(), "b".into()]));
        record.merge(SurveillancePatch::click_pattern(vec!["c".into()]));
        assert_eq!(record.click_pattern, vec!["c".to_string()]);
    }

    #[test]
    fn test_pointer_samples_capped_keeping_newest() {
        let mut record = SurveillanceRecord::default();
        record.merge(SurveillancePatch::mouse_movements((0..80).map(sample).collect()));
        assert_eq!(record.mouse_movements.len(), MAX_POINTER_SAMPLES);
        assert_eq!(record.mouse_movements[0].at_ms, 30);
        assert_eq!(record.mouse_movements.last().unwrap().at_ms, 79);
    }

    #[test]
    fn test_scroll_depth_clamped() {
        let mut record = SurveillanceRecord::default();
        record.merge(SurveillancePatch {
            scroll_depth: Some(250),
            ..Default::default()
        });
        assert_eq!(record.scroll_depth, 100);
    }

    #[test]
    fn test_empty_patch() {
        assert!(SurveillancePatch::default().is_empty());
        assert!(!SurveillancePatch::time_on_site(1).is_empty());
    }
}
