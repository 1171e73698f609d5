//! # Exhibition Configuration
//!
//! Every tunable constant of the six mechanisms and the gate lives here,
//! grouped by section. Each section is `#[serde(default)]`, so a config file
//! only needs to name the settings it overrides:
//!
//! ```yaml
//! timeout:
//!   wait_ms: 45000
//! harmony:
//!   verification_text: "open the archive"
//! ```
//!
//! [`ExhibitionConfig::validate`] runs after every load; an invalid config is
//! never handed to a solver.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::zone::Zone;

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhibitionConfig {
    pub confirmshaming: ConfirmshamingConfig,
    pub autoplay: AutoplayConfig,
    pub timeout: TimeoutConfig,
    pub infinite_scroll: InfiniteScrollConfig,
    pub surveillance: SurveillanceConfig,
    pub harmony: HarmonyConfig,
    pub gate: GateConfig,
}

/// One forced-choice confirmshaming screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmshamingScreen {
    /// Corporate copy shown on the screen.
    pub content: String,
    /// Label of the accept action.
    pub accept: String,
    /// Label of the shaming refuse action.
    pub refuse: String,
}

impl ConfirmshamingScreen {
    fn new(content: &str, accept: &str, refuse: &str) -> Self {
        Self {
            content: content.to_string(),
            accept: accept.to_string(),
            refuse: refuse.to_string(),
        }
    }
}

/// Confirmshaming section. The refusal threshold equals the screen count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmshamingConfig {
    pub screens: Vec<ConfirmshamingScreen>,
}

impl ConfirmshamingConfig {
    /// Refusals required to solve.
    pub fn required_refusals(&self) -> usize {
        self.screens.len()
    }
}

impl Default for ConfirmshamingConfig {
    fn default() -> Self {
        Self {
            screens: vec![
                ConfirmshamingScreen::new(
                    "We are pleased to announce the historic rebranding initiative",
                    "I support renaming to Gulf of America",
                    "No thanks, I prefer geographic accuracy",
                ),
                ConfirmshamingScreen::new(
                    "Join millions celebrating this bold new direction for our nation",
                    "Yes, I want to be part of history",
                    "I prefer living with facts",
                ),
                ConfirmshamingScreen::new(
                    "This change reflects our shared values and forward thinking",
                    "I embrace this new vision",
                    "This is corporate propaganda",
                ),
                ConfirmshamingScreen::new(
                    "Corporate partnerships supporting this initiative signal strong consensus",
                    "The market has spoken",
                    "That is exactly the problem",
                ),
                ConfirmshamingScreen::new(
                    "Final confirmation: will you stand with us?",
                    "Count me in",
                    "No, I will not",
                ),
            ],
        }
    }
}

/// Autoplay/countdown section. Positions are in seconds of media time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplayConfig {
    /// Media reference handed to the playback provider.
    pub media_ref: String,
    pub duration_secs: f64,
    /// Timestamp of the hidden clue.
    pub clue_secs: f64,
    /// A pause within this distance of the clue solves.
    pub tolerance_secs: f64,
    /// The clue overlay is visible within this distance of the clue.
    pub clue_display_secs: f64,
    pub poll_interval_ms: u64,
    /// Consecutive non-advancing polls treated as a pause.
    pub stuck_polls: u32,
    /// Position changes at or below this are "not advancing".
    pub stuck_epsilon_secs: f64,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            media_ref: "interrogation-official-statement".to_string(),
            duration_secs: 180.0,
            clue_secs: 127.3,
            tolerance_secs: 0.5,
            clue_display_secs: 0.2,
            poll_interval_ms: 250,
            stuck_polls: 3,
            stuck_epsilon_secs: 0.01,
        }
    }
}

/// Time-out section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Wall-clock wait since the solver was first opened.
    pub wait_ms: u64,
    /// Other mechanisms that must be solved to skip the wait.
    pub required_other_solves: usize,
    /// Countdown refresh period; at most one second.
    pub tick_interval_ms: u64,
    /// Period of durable progress flushes while open.
    pub flush_interval_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            wait_ms: 5 * 60 * 1000,
            required_other_solves: 2,
            tick_interval_ms: 1_000,
            flush_interval_ms: 10_000,
        }
    }
}

/// Infinite scroll section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfiniteScrollConfig {
    pub total_items: usize,
    pub batch_size: usize,
    /// 1-based feed position after which the exit is embedded.
    pub exit_index: usize,
    /// Load the next batch once scroll depth exceeds this percentage.
    pub reveal_threshold_percent: f64,
}

impl Default for InfiniteScrollConfig {
    fn default() -> Self {
        Self {
            total_items: 250,
            batch_size: 20,
            exit_index: 187,
            reveal_threshold_percent: 80.0,
        }
    }
}

/// Surveillance section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveillanceConfig {
    /// Zones in the order they must be clicked.
    pub target_order: Vec<Zone>,
    /// Half-width of the centre square in pixels.
    pub center_threshold_px: f64,
    /// Minimum spacing between pointer samples forwarded to the store.
    pub telemetry_throttle_ms: u64,
    /// Hover-duration refresh period.
    pub hover_sample_ms: u64,
    /// Observation counter period.
    pub observation_tick_ms: u64,
}

impl Default for SurveillanceConfig {
    fn default() -> Self {
        Self {
            target_order: vec![
                Zone::TopLeft,
                Zone::TopRight,
                Zone::BottomLeft,
                Zone::BottomRight,
                Zone::Center,
            ],
            center_threshold_px: 100.0,
            telemetry_throttle_ms: 100,
            hover_sample_ms: 100,
            observation_tick_ms: 1_000,
        }
    }
}

/// Harmony button section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonyConfig {
    /// Text that must be reproduced, compared case-insensitively.
    pub verification_text: String,
    /// How long a mismatch error stays visible.
    pub error_clear_ms: u64,
}

impl Default for HarmonyConfig {
    fn default() -> Self {
        Self {
            verification_text: "SEARCH transparency API labor conditions".to_string(),
            error_clear_ms: 2_000,
        }
    }
}

/// Gate controller section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Delay between a solve and the automatic navigation to the artwork.
    pub navigation_delay_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            navigation_delay_ms: 500,
        }
    }
}

impl ExhibitionConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(ConfigError::UnsupportedFormat { path: display }),
        }
    }

    /// Reject settings that would make a mechanism unsolvable or a timer
    /// degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmshaming.screens.is_empty() {
            return Err(invalid("confirmshaming.screens", "at least one screen is required"));
        }

        let a = &self.autoplay;
        if !(a.duration_secs > 0.0) {
            return Err(invalid("autoplay.duration_secs", "must be positive"));
        }
        if !(0.0..=a.duration_secs).contains(&a.clue_secs) {
            return Err(invalid(
                "autoplay.clue_secs",
                format!("{} is outside the media duration {}", a.clue_secs, a.duration_secs),
            ));
        }
        if !(a.tolerance_secs > 0.0) {
            return Err(invalid("autoplay.tolerance_secs", "must be positive"));
        }
        if a.poll_interval_ms == 0 {
            return Err(invalid("autoplay.poll_interval_ms", "must be positive"));
        }
        if a.stuck_polls == 0 {
            return Err(invalid("autoplay.stuck_polls", "must be positive"));
        }

        let t = &self.timeout;
        if t.wait_ms == 0 {
            return Err(invalid("timeout.wait_ms", "must be positive"));
        }
        if t.tick_interval_ms == 0 || t.tick_interval_ms > 1_000 {
            return Err(invalid("timeout.tick_interval_ms", "must be within 1..=1000"));
        }
        if t.flush_interval_ms == 0 {
            return Err(invalid("timeout.flush_interval_ms", "must be positive"));
        }

        let s = &self.infinite_scroll;
        if s.batch_size == 0 {
            return Err(invalid("infinite_scroll.batch_size", "must be positive"));
        }
        if s.exit_index == 0 || s.exit_index > s.total_items {
            return Err(invalid(
                "infinite_scroll.exit_index",
                format!("must be within 1..={}", s.total_items),
            ));
        }
        if !(0.0..100.0).contains(&s.reveal_threshold_percent) {
            return Err(invalid("infinite_scroll.reveal_threshold_percent", "must be within [0, 100)"));
        }

        let v = &self.surveillance;
        if v.target_order.is_empty() {
            return Err(invalid("surveillance.target_order", "must name at least one zone"));
        }
        for (i, zone) in v.target_order.iter().enumerate() {
            if v.target_order[..i].contains(zone) {
                return Err(invalid(
                    "surveillance.target_order",
                    format!("zone {zone} appears more than once"),
                ));
            }
        }
        if v.hover_sample_ms == 0 || v.observation_tick_ms == 0 {
            return Err(invalid("surveillance", "sampling periods must be positive"));
        }

        if self.harmony.verification_text.trim().is_empty() {
            return Err(invalid("harmony.verification_text", "must not be empty"));
        }
        if self.harmony.error_clear_ms == 0 {
            return Err(invalid("harmony.error_clear_ms", "must be positive"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
