//! # Surveillance UI
//!
//! A tracked panel split into five zones: four quadrants plus a centre
//! region that wins over quadrant membership. Clicking the zones in the
//! configured order solves the piece. Any click that is not the expected
//! next zone empties the sequence.
//!
//! Everything else here is theatre: pointer position, hovered zone, hover
//! duration, and move/click totals are tracked for display and forwarded to
//! the store's side-channel record. None of it feeds the solve decision.

use exhibit_core::{MechanismId, SurveillanceConfig, Zone};
use exhibit_state::{PointerSample, SurveillancePatch, MAX_POINTER_SAMPLES};

use crate::scheduler::TimerPurpose;
use crate::solver::{
    Acknowledgement, InputOutcome, MechanismInput, SolveLatch, Solver, SolverContext,
    SolverStatus,
};

/// Panel size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelGeometry {
    pub width: f64,
    pub height: f64,
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Decorative readout shown next to the panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Telemetry {
    pub pointer: Option<(f64, f64)>,
    pub hovered: Option<Zone>,
    pub hover_duration_ms: u64,
    pub moves: u64,
    pub clicks: u64,
    pub observed_secs: u64,
}

#[derive(Debug)]
pub struct SurveillanceSolver {
    config: SurveillanceConfig,
    geometry: PanelGeometry,
    sequence: Vec<Zone>,
    telemetry: Telemetry,
    hover_started_ms: u64,
    samples: Vec<PointerSample>,
    last_forwarded_ms: Option<u64>,
    solved: bool,
    latch: SolveLatch,
}

impl SurveillanceSolver {
    pub fn new(config: &SurveillanceConfig, geometry: PanelGeometry) -> Self {
        Self {
            config: config.clone(),
            geometry,
            sequence: Vec::new(),
            telemetry: Telemetry::default(),
            hover_started_ms: 0,
            samples: Vec::new(),
            last_forwarded_ms: None,
            solved: false,
            latch: SolveLatch::default(),
        }
    }

    /// Zones clicked correctly so far.
    pub fn sequence(&self) -> &[Zone] {
        &self.sequence
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn zone_at(&self, x: f64, y: f64) -> Zone {
        Zone::locate(
            x,
            y,
            self.geometry.width,
            self.geometry.height,
            self.config.center_threshold_px,
        )
    }

    fn on_pointer_move(&mut self, x: f64, y: f64, ctx: &mut SolverContext<'_>) -> InputOutcome {
        let now = ctx.now_ms();
        let zone = self.zone_at(x, y);
        self.telemetry.moves += 1;
        self.telemetry.pointer = Some((x, y));
        if self.telemetry.hovered != Some(zone) {
            self.telemetry.hovered = Some(zone);
            self.telemetry.hover_duration_ms = 0;
            self.hover_started_ms = now;
        }

        self.samples.push(PointerSample { x, y, at_ms: now });
        if self.samples.len() > MAX_POINTER_SAMPLES {
            self.samples.remove(0);
        }

        let due = self
            .last_forwarded_ms
            .map_or(true, |last| now.saturating_sub(last) >= self.config.telemetry_throttle_ms);
        if due {
            ctx.store()
                .track_surveillance(SurveillancePatch::mouse_movements(self.samples.clone()));
            self.last_forwarded_ms = Some(now);
        }
        InputOutcome::Observed
    }

    fn on_click(&mut self, zone: Zone, ctx: &mut SolverContext<'_>) -> InputOutcome {
        self.telemetry.clicks += 1;

        let expected = self.config.target_order.get(self.sequence.len()).copied();
        let outcome = if expected == Some(zone) {
            self.sequence.push(zone);
            if self.sequence.len() == self.config.target_order.len() {
                self.solved = true;
                self.latch.fire(MechanismId::Surveillance, ctx);
                ctx.cancel_all();
                tracing::info!(clicks = self.telemetry.clicks, "surveillance pattern completed");
                InputOutcome::Solved
            } else {
                InputOutcome::Advanced
            }
        } else {
            tracing::debug!(
                clicked = %zone,
                progress = self.sequence.len(),
                "surveillance pattern broken"
            );
            self.sequence.clear();
            InputOutcome::Restarted
        };

        let labels = self.sequence.iter().map(|z| z.as_str().to_string()).collect();
        ctx.store()
            .track_surveillance(SurveillancePatch::click_pattern(labels));
        outcome
    }
}

impl Solver for SurveillanceSolver {
    fn mechanism(&self) -> MechanismId {
        MechanismId::Surveillance
    }

    fn status(&self) -> SolverStatus {
        if self.solved {
            SolverStatus::Solved
        } else {
            SolverStatus::Unsolved
        }
    }

    fn open(&mut self, ctx: &mut SolverContext<'_>) {
        ctx.schedule_every(TimerPurpose::HoverSample, self.config.hover_sample_ms);
        ctx.schedule_every(TimerPurpose::ObservationTick, self.config.observation_tick_ms);
    }

    fn handle(&mut self, input: MechanismInput, ctx: &mut SolverContext<'_>) -> InputOutcome {
        if self.solved {
            return InputOutcome::Ignored;
        }
        match input {
            MechanismInput::PointerMove { x, y } => self.on_pointer_move(x, y, ctx),
            MechanismInput::PanelClick { x, y } => {
                let zone = self.zone_at(x, y);
                self.on_click(zone, ctx)
            }
            MechanismInput::ZoneClick(zone) => self.on_click(zone, ctx),
            _ => InputOutcome::Ignored,
        }
    }

    fn on_timer(&mut self, purpose: TimerPurpose, ctx: &mut SolverContext<'_>) {
        if self.solved {
            return;
        }
        match purpose {
            TimerPurpose::HoverSample => {
                if self.telemetry.hovered.is_some() {
                    self.telemetry.hover_duration_ms =
                        ctx.now_ms().saturating_sub(self.hover_started_ms);
                }
            }
            TimerPurpose::ObservationTick => {
                self.telemetry.observed_secs += 1;
                ctx.store().track_surveillance(SurveillancePatch::time_on_site(
                    self.telemetry.observed_secs * 1000,
                ));
            }
            _ => {}
        }
    }

    fn acknowledgement(&self) -> Option<Acknowledgement> {
        self.solved.then(|| Acknowledgement::Surveillance {
            moves: self.telemetry.moves,
            clicks: self.telemetry.clicks,
            observed_secs: self.telemetry.observed_secs,
        })
    }
}
