use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Mutable scheduling state for one input stream.
///
/// Only `ConversionScheduler` and its watchdog write to this.
#[derive(Debug)]
pub struct ScheduleState {
    pub(super) pending_timer: Option<TimerId>,
    pub(super) timer_task: Option<JoinHandle<()>>,
    pub(super) is_queued: bool,
    pub(super) scheduled_at: Option<Instant>,
    pub(super) debounce: Duration,
    pub(super) in_progress: bool,
    pub(super) run_task: Option<AbortHandle>,
    pub(super) last_input_len: usize,
    /// Bumped on every run start and watchdog reset; a finishing run only
    /// clears `in_progress` when its epoch is still current.
    pub(super) run_epoch: u64,
}

impl ScheduleState {
    pub fn new(debounce: Duration) -> Self {
        Self {
            pending_timer: None,
            timer_task: None,
            is_queued: false,
            scheduled_at: None,
            debounce,
            in_progress: false,
            run_task: None,
            last_input_len: 0,
            run_epoch: 0,
        }
    }

    pub(super) fn cancel_timer(&mut self) {
        self.pending_timer = None;
        if let Some(task) = self.timer_task.take() {
            task.abort();
        }
    }

    /// Drop the queued trigger and any running conversion. Returns the new epoch.
    pub(super) fn reset(&mut self) -> u64 {
        self.cancel_timer();
        if let Some(run) = self.run_task.take() {
            run.abort();
        }
        self.in_progress = false;
        self.is_queued = false;
        self.scheduled_at = None;
        self.run_epoch += 1;
        self.run_epoch
    }

    pub fn snapshot(&self) -> ScheduleSnapshot {
        ScheduleSnapshot {
            pending_timer: self.pending_timer,
            is_queued: self.is_queued,
            waited_ms: self
                .scheduled_at
                .map(|t| t.elapsed().as_millis() as u64),
            debounce_ms: self.debounce.as_millis() as u64,
            in_progress: self.in_progress,
            last_input_len: self.last_input_len,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub pending_timer: Option<TimerId>,
    pub is_queued: bool,
    /// Time since the queued trigger was first scheduled.
    pub waited_ms: Option<u64>,
    pub debounce_ms: u64,
    pub in_progress: bool,
    pub last_input_len: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub triggers: u64,
    pub conversions_started: u64,
    pub conversions_failed: u64,
    pub reschedules: u64,
    pub watchdog_resets: u64,
    pub fast_path_clears: u64,
}
