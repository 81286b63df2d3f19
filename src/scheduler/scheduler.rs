use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::debounce::{DebounceDecision, DebouncePolicy};
use super::state::{ScheduleSnapshot, ScheduleState, SchedulerStats, TimerId};
use crate::config::SchedulerConfig;
use crate::conversion::ConversionManager;
use crate::health::ReadinessProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    Scheduled { timer: TimerId, delay: Duration },
    /// Input was empty: presentation cleared, nothing queued.
    ClearedEmpty,
}

enum FireAction {
    Stale,
    Run(u64),
    Reschedule(Duration),
    WatchdogReset { waited: Duration },
}

struct Inner<M> {
    manager: Arc<M>,
    config: SchedulerConfig,
    policy: DebouncePolicy,
    state: Mutex<ScheduleState>,
    stats: Mutex<SchedulerStats>,
    next_timer: AtomicU64,
}

/// Debounced, single-flight conversion driver for one input stream.
///
/// Every trigger replaces the pending timer. When a timer fires while a
/// conversion is still running, it re-arms until `max_wait` has passed since
/// the trigger was first queued, then the watchdog resets the stream.
pub struct ConversionScheduler<M: ConversionManager> {
    inner: Arc<Inner<M>>,
}

impl<M: ConversionManager> Clone for ConversionScheduler<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: ConversionManager> ConversionScheduler<M> {
    pub fn new(manager: Arc<M>, config: SchedulerConfig) -> Self {
        let policy = DebouncePolicy::new(config.clone());
        let state = ScheduleState::new(config.debounce());
        Self {
            inner: Arc::new(Inner {
                manager,
                config,
                policy,
                state: Mutex::new(state),
                stats: Mutex::new(SchedulerStats::default()),
                next_timer: AtomicU64::new(1),
            }),
        }
    }

    pub fn manager(&self) -> &Arc<M> {
        &self.inner.manager
    }

    /// Record an input change. Must be called from within a tokio runtime.
    pub fn schedule(&self) -> ScheduleDecision {
        let new_len = self.inner.manager.input_source().chars().count();
        self.inner.stats.lock().triggers += 1;

        let mut state = self.inner.state.lock();
        let previous_len = state.last_input_len;
        state.last_input_len = new_len;

        let delay = match self.inner.policy.decide(previous_len, new_len) {
            DebounceDecision::ClearImmediately => {
                // A running conversion would repaint output for text that is gone.
                let aborted = state.in_progress;
                state.reset();
                drop(state);
                if aborted {
                    debug!("Input cleared, aborted in-flight conversion");
                }

                self.inner.stats.lock().fast_path_clears += 1;
                if let Err(e) = self.inner.manager.presentation().clear_output() {
                    warn!(error = %e, "Failed to clear output for empty input");
                }
                debug!("Empty input, cleared output without converting");
                return ScheduleDecision::ClearedEmpty;
            }
            DebounceDecision::Fast(d) => {
                debug!(previous_len, new_len, "Large deletion, using fast debounce");
                d
            }
            DebounceDecision::Normal(d) => d,
        };

        state.debounce = delay;
        if !state.is_queued {
            state.is_queued = true;
            state.scheduled_at = Some(Instant::now());
        }
        let timer = Inner::arm_timer(&self.inner, &mut state, delay);
        ScheduleDecision::Scheduled { timer, delay }
    }

    /// Clear every flag and drop the queued trigger and any running conversion.
    pub fn force_reset(&self) {
        let epoch = self.inner.state.lock().reset();
        info!(epoch, "Schedule state force-reset");
    }

    pub fn snapshot(&self) -> ScheduleSnapshot {
        self.inner.state.lock().snapshot()
    }

    pub fn stats(&self) -> SchedulerStats {
        *self.inner.stats.lock()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }
}

/// Ready when no conversion is running for the stream.
#[async_trait]
impl<M: ConversionManager> ReadinessProbe for ConversionScheduler<M> {
    async fn is_ready(&self) -> bool {
        !self.inner.state.lock().in_progress
    }
}

impl<M: ConversionManager> Inner<M> {
    fn arm_timer(this: &Arc<Self>, state: &mut ScheduleState, delay: Duration) -> TimerId {
        let replaced = state.pending_timer;
        state.cancel_timer();

        let id = TimerId(this.next_timer.fetch_add(1, Ordering::Relaxed));
        let deadline = Instant::now() + delay;
        let inner = Arc::clone(this);
        state.pending_timer = Some(id);
        state.timer_task = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            Inner::fire(&inner, id);
        }));

        debug!(timer = id.0, ?replaced, delay_ms = delay.as_millis() as u64, "Timer armed");
        id
    }

    fn fire(this: &Arc<Self>, id: TimerId) {
        let mut state = this.state.lock();
        let action = Self::decide_fire(&this.config, &mut state, id);

        match action {
            FireAction::Stale => {}
            FireAction::Run(epoch) => {
                let inner = Arc::clone(this);
                let run = tokio::spawn(async move { Inner::run_conversion(&inner, epoch).await });
                state.run_task = Some(run.abort_handle());
                drop(state);
                debug!(timer = id.0, epoch, "Conversion fired");
            }
            FireAction::Reschedule(delay) => {
                Self::arm_timer(this, &mut state, delay);
                drop(state);
                this.stats.lock().reschedules += 1;
                debug!(timer = id.0, "Conversion in progress, rescheduled");
            }
            FireAction::WatchdogReset { waited } => {
                drop(state);
                this.stats.lock().watchdog_resets += 1;
                let waited_ms = waited.as_millis() as u64;
                warn!(
                    waited_ms,
                    max_wait_ms = this.config.max_wait_ms,
                    "Conversion stuck, watchdog reset"
                );
                let message = format!(
                    "Conversion did not finish within {} ms and was reset; edit the input to retry",
                    this.config.max_wait_ms
                );
                if let Err(e) = this.manager.presentation().set_status(&message) {
                    warn!(error = %e, "Failed to report watchdog reset");
                }
            }
        }
    }

    fn decide_fire(config: &SchedulerConfig, state: &mut ScheduleState, id: TimerId) -> FireAction {
        if state.pending_timer != Some(id) {
            return FireAction::Stale;
        }
        state.pending_timer = None;
        // Detach rather than abort: this is the running task's own handle.
        state.timer_task = None;

        if state.in_progress {
            let waited = state
                .scheduled_at
                .map(|at| at.elapsed())
                .unwrap_or_default();
            if waited >= config.max_wait() {
                state.reset();
                return FireAction::WatchdogReset { waited };
            }
            return FireAction::Reschedule(state.debounce);
        }

        state.in_progress = true;
        state.is_queued = false;
        state.scheduled_at = None;
        state.run_epoch += 1;
        FireAction::Run(state.run_epoch)
    }

    async fn run_conversion(this: &Arc<Self>, epoch: u64) {
        this.stats.lock().conversions_started += 1;
        let result = this.manager.convert().await;
        if let Err(e) = &result {
            this.stats.lock().conversions_failed += 1;
            warn!(epoch, error = %e, "Conversion returned an error");
        }

        let mut state = this.state.lock();
        if state.run_epoch == epoch {
            state.in_progress = false;
            state.run_task = None;
        } else {
            debug!(epoch, current = state.run_epoch, "Stale conversion finished after reset");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{BufferedPresentation, Presentation};
    use crate::error::Result;
    use async_trait::async_trait;
    use parking_lot::RwLock;
    use std::sync::atomic::AtomicUsize;

    struct FakeManager {
        input: RwLock<String>,
        presentation: Arc<BufferedPresentation>,
        calls: AtomicUsize,
        running: AtomicUsize,
        max_running: AtomicUsize,
        work: Option<Duration>,
        hang: bool,
    }

    impl FakeManager {
        fn new() -> Self {
            Self {
                input: RwLock::new(String::new()),
                presentation: Arc::new(BufferedPresentation::new()),
                calls: AtomicUsize::new(0),
                running: AtomicUsize::new(0),
                max_running: AtomicUsize::new(0),
                work: None,
                hang: false,
            }
        }

        fn set_input(&self, text: &str) {
            *self.input.write() = text.to_string();
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConversionManager for FakeManager {
        fn input_source(&self) -> String {
            self.input.read().clone()
        }

        fn args_source(&self) -> String {
            String::new()
        }

        fn presentation(&self) -> Arc<dyn Presentation> {
            self.presentation.clone()
        }

        async fn convert(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            if let Some(work) = self.work {
                tokio::time::sleep(work).await;
            }
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn scheduler(manager: FakeManager) -> ConversionScheduler<FakeManager> {
        ConversionScheduler::new(Arc::new(manager), SchedulerConfig::default())
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_one_conversion() {
        let scheduler = scheduler(FakeManager::new());
        for i in 0..5 {
            scheduler.manager().set_input(&"x".repeat(10 + i));
            scheduler.schedule();
            sleep_ms(100).await;
        }
        assert_eq!(scheduler.manager().calls(), 0);

        sleep_ms(800).await;
        assert_eq!(scheduler.manager().calls(), 1);

        sleep_ms(5000).await;
        assert_eq!(scheduler.manager().calls(), 1);
        let stats = scheduler.stats();
        assert_eq!(stats.triggers, 5);
        assert_eq!(stats.conversions_started, 1);
        assert!(!scheduler.snapshot().in_progress);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_trigger_replaces_pending_timer() {
        let scheduler = scheduler(FakeManager::new());
        scheduler.manager().set_input("abc");
        let first = scheduler.schedule();
        let second = scheduler.schedule();
        let (
            ScheduleDecision::Scheduled { timer: a, .. },
            ScheduleDecision::Scheduled { timer: b, .. },
        ) = (first, second)
        else {
            panic!("expected both triggers to schedule");
        };
        assert_ne!(a, b);
        assert_eq!(scheduler.snapshot().pending_timer, Some(b));
        assert!(scheduler.snapshot().is_queued);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_clears_without_converting() {
        let scheduler = scheduler(FakeManager::new());
        scheduler.manager().set_input("some text");
        scheduler.schedule();
        sleep_ms(200).await;

        scheduler.manager().set_input("");
        assert_eq!(scheduler.schedule(), ScheduleDecision::ClearedEmpty);
        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.pending_timer, None);
        assert!(!snapshot.is_queued);

        sleep_ms(2000).await;
        assert_eq!(scheduler.manager().calls(), 0);
        assert_eq!(scheduler.manager().presentation.clear_count(), 1);
        assert_eq!(scheduler.stats().fast_path_clears, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_large_deletion_fires_fast() {
        let scheduler = scheduler(FakeManager::new());
        scheduler.manager().set_input(&"a".repeat(5000));
        scheduler.schedule();
        sleep_ms(1000).await;
        assert_eq!(scheduler.manager().calls(), 1);

        scheduler.manager().set_input("short");
        let decision = scheduler.schedule();
        assert!(matches!(
            decision,
            ScheduleDecision::Scheduled { delay, .. } if delay == Duration::from_millis(100)
        ));
        sleep_ms(150).await;
        assert_eq!(scheduler.manager().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_most_one_conversion_in_flight() {
        let mut manager = FakeManager::new();
        manager.work = Some(Duration::from_millis(2000));
        let scheduler = scheduler(manager);

        scheduler.manager().set_input("first");
        scheduler.schedule();
        sleep_ms(1000).await;
        assert!(scheduler.snapshot().in_progress);

        scheduler.manager().set_input("second");
        scheduler.schedule();
        sleep_ms(6000).await;

        let manager = scheduler.manager();
        assert_eq!(manager.calls(), 2);
        assert_eq!(manager.max_running.load(Ordering::SeqCst), 1);
        assert!(scheduler.stats().reschedules >= 1);
        assert_eq!(scheduler.stats().watchdog_resets, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_resets_stuck_conversion_once() {
        let mut manager = FakeManager::new();
        manager.hang = true;
        let scheduler = scheduler(manager);

        scheduler.manager().set_input("stuck");
        scheduler.schedule();
        sleep_ms(900).await;
        assert!(scheduler.snapshot().in_progress);

        scheduler.manager().set_input("stuck again");
        scheduler.schedule();
        sleep_ms(20_000).await;

        let snapshot = scheduler.snapshot();
        assert!(!snapshot.in_progress);
        assert!(!snapshot.is_queued);
        assert_eq!(snapshot.pending_timer, None);
        let stats = scheduler.stats();
        assert_eq!(stats.watchdog_resets, 1);
        assert_eq!(stats.conversions_started, 1);
        let status = scheduler.manager().presentation.status().unwrap_or_default();
        assert!(status.contains("was reset"));

        sleep_ms(20_000).await;
        assert_eq!(scheduler.stats().watchdog_resets, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_recovers_after_watchdog_reset() {
        let mut manager = FakeManager::new();
        manager.hang = true;
        let scheduler = scheduler(manager);

        scheduler.manager().set_input("stuck");
        scheduler.schedule();
        sleep_ms(900).await;
        scheduler.schedule();
        sleep_ms(20_000).await;
        assert_eq!(scheduler.stats().watchdog_resets, 1);

        // The hung conversion was aborted, so a new trigger runs again.
        scheduler.schedule();
        sleep_ms(900).await;
        assert_eq!(scheduler.manager().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_reset_clears_state() {
        let scheduler = scheduler(FakeManager::new());
        scheduler.manager().set_input("pending");
        scheduler.schedule();
        scheduler.force_reset();

        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.pending_timer, None);
        assert!(!snapshot.is_queued);
        assert!(!snapshot.in_progress);

        sleep_ms(2000).await;
        assert_eq!(scheduler.manager().calls(), 0);
    }
}
