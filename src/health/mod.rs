//! Collaborator inventory and graceful degradation.
//!
//! - `CollaboratorRegistry`: `resolve(name)` against live collaborators
//! - `DependencyHealthMonitor`: required/optional availability snapshot
//! - `DependencyContext`: per-manager bundle of whichever collaborators exist
//! - `run_battery`: cross-component smoke checks

mod context;
mod integration;
mod monitor;
pub mod names;
mod registry;

pub use context::DependencyContext;
pub use integration::{
    CheckOutcome, ERROR_HANDLER_CLASSIFIES, EVENTS_AVAILABLE, IntegrationCheck, IntegrationResult,
    NOTIFIER_TYPED, ORCHESTRATION_CONSTRUCTED, RETRY_COLLABORATORS_TYPED, STATE_READY_FLAG,
    run_battery,
};
pub use monitor::{
    DependencyHealthMonitor, HealthSnapshot, HealthSummary, ModuleHealthRecord, ModuleStatus,
};
pub use registry::{CollaboratorHandle, CollaboratorRegistry, InMemoryRegistry, ReadinessProbe};
