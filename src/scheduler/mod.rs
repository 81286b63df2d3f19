//! Debounced conversion scheduling with stuck-state detection.
//!
//! - `ScheduleState`: per-stream timer, queue and in-progress flags
//! - `DebouncePolicy`: debounce sizing and the empty-input fast path
//! - `ConversionScheduler`: single-flight execution per input stream with a watchdog

mod debounce;
mod scheduler;
mod state;

pub use debounce::{DebounceDecision, DebouncePolicy};
pub use scheduler::{ConversionScheduler, ScheduleDecision};
pub use state::{ScheduleSnapshot, ScheduleState, SchedulerStats, TimerId};
