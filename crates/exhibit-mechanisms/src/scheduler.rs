//! # Tick Scheduler
//!
//! One scheduler replaces the many independent intervals a naive UI would
//! run (playback polling, countdown ticks, flushes, error clearing, hover
//! sampling, delayed navigation). The host calls [`Scheduler::advance`]
//! from its single tick; fired timers are fanned out to their owners.
//!
//! ## Ownership and cancellation
//!
//! Every timer belongs to an [`OwnerId`] lease. Closing a solver cancels
//! its lease with [`Scheduler::cancel_owner`], which removes every timer it
//! scheduled. Dispatchers must still check owner liveness for timers that
//! fired in the same batch as a cancellation.
//!
//! ## Periodic timers
//!
//! A periodic timer fires at most once per `advance` call. Missed periods
//! are coalesced: a host that stalls for ten seconds gets one countdown
//! tick, not ten.

use std::collections::BTreeMap;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// A lease grouping the timers of one solver session or controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerId(u64);

/// What a timer is for. Dispatched back to the owner on fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    /// Autoplay: sample the playback position.
    PlaybackPoll,
    /// Time-out: refresh the countdown and re-check unlock conditions.
    CountdownTick,
    /// Time-out: write accumulated progress to durable storage.
    ProgressFlush,
    /// Harmony: hide the transient mismatch error.
    ErrorClear,
    /// Surveillance: refresh hover duration.
    HoverSample,
    /// Surveillance: advance the observation counter.
    ObservationTick,
    /// Gate: navigate to a freshly unlocked artwork.
    Navigate,
}

/// A timer that came due during [`Scheduler::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub owner: OwnerId,
    pub purpose: TimerPurpose,
    pub due_at_ms: u64,
}

#[derive(Debug, Clone)]
struct Timer {
    owner: OwnerId,
    purpose: TimerPurpose,
    due_at_ms: u64,
    period_ms: Option<u64>,
}

/// Single-threaded timer table driven by explicit `now` values.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_timer: u64,
    next_owner: u64,
    timers: BTreeMap<TimerId, Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh owner lease.
    pub fn new_owner(&mut self) -> OwnerId {
        self.next_owner += 1;
        OwnerId(self.next_owner)
    }

    /// Fire once, `delay_ms` after `now_ms`.
    pub fn schedule_once(
        &mut self,
        owner: OwnerId,
        purpose: TimerPurpose,
        now_ms: u64,
        delay_ms: u64,
    ) -> TimerId {
        self.insert(owner, purpose, now_ms.saturating_add(delay_ms), None)
    }

    /// Fire every `period_ms`, first at `now_ms + period_ms`. A zero period
    /// is treated as one millisecond.
    pub fn schedule_every(
        &mut self,
        owner: OwnerId,
        purpose: TimerPurpose,
        now_ms: u64,
        period_ms: u64,
    ) -> TimerId {
        let period = period_ms.max(1);
        self.insert(owner, purpose, now_ms.saturating_add(period), Some(period))
    }

    fn insert(
        &mut self,
        owner: OwnerId,
        purpose: TimerPurpose,
        due_at_ms: u64,
        period_ms: Option<u64>,
    ) -> TimerId {
        self.next_timer += 1;
        let id = TimerId(self.next_timer);
        self.timers.insert(
            id,
            Timer {
                owner,
                purpose,
                due_at_ms,
                period_ms,
            },
        );
        id
    }

    /// Cancel one timer. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Cancel every timer of `owner`. Returns how many were removed.
    pub fn cancel_owner(&mut self, owner: OwnerId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, t| t.owner != owner);
        before - self.timers.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Number of pending timers owned by `owner`.
    pub fn pending_for(&self, owner: OwnerId) -> usize {
        self.timers.values().filter(|t| t.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest pending due time, for hosts that sleep between ticks.
    pub fn next_due(&self) -> Option<u64> {
        self.timers.values().map(|t| t.due_at_ms).min()
    }

    /// Collect every timer due at or before `now_ms`, ordered by due time
    /// then scheduling order. One-shot timers are removed; periodic timers
    /// are rescheduled to their next period strictly after `now_ms`.
    pub fn advance(&mut self, now_ms: u64) -> Vec<FiredTimer> {
        let mut fired: Vec<FiredTimer> = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_at_ms <= now_ms)
            .map(|(id, t)| FiredTimer {
                id: *id,
                owner: t.owner,
                purpose: t.purpose,
                due_at_ms: t.due_at_ms,
            })
            .collect();
        fired.sort_by_key(|f| (f.due_at_ms, f.id));

        for f in &fired {
            let periodic = match self.timers.get_mut(&f.id) {
                Some(timer) => match timer.period_ms {
                    Some(period) => {
                        let missed = (now_ms - timer.due_at_ms) / period;
                        timer.due_at_ms += period * (missed + 1);
                        true
                    }
                    None => false,
                },
                None => true,
            };
            if !periodic {
                self.timers.remove(&f.id);
            }
        }

        fired
    }
}
