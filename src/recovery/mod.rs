//! Failure classification and recovery.
//!
//! This module handles:
//! - Classification of raw engine failures into a fixed taxonomy
//! - User-facing messages and remediation suggestions
//! - One bounded retry (chunked or simplified) per user action
//! - Best-effort delivery of failure reports to output, status and announcement sinks

mod advisor;
mod orchestrator;
mod sink;
mod types;

pub use advisor::RecoveryAdvisor;
pub use orchestrator::{RecoveryCollaborators, RecoveryOrchestrator};
pub use sink::{
    AnnouncementSink, OutputSink, ReportSink, ReportSinks, SinkDeliveryReport, SinkFailure,
    StatusSink,
};
pub use types::{
    ErrorReport, ErrorType, FailureSignature, RecoveryOutcome, RecoveryPath, Severity,
};
