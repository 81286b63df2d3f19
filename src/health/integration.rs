use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::names;
use super::registry::{CollaboratorHandle, CollaboratorRegistry};
use crate::engine::{ChunkedRetry, SimplifiedRetry};
use crate::notification::AccessibilityNotifier;
use crate::recovery::{ErrorType, RecoveryOrchestrator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    Passed,
    Failed,
    /// Optional collaborator absent; nothing to check.
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationCheck {
    pub name: &'static str,
    pub outcome: CheckOutcome,
    pub detail: String,
}

impl IntegrationCheck {
    fn passed(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            outcome: CheckOutcome::Passed,
            detail: detail.into(),
        }
    }

    fn failed(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            outcome: CheckOutcome::Failed,
            detail: detail.into(),
        }
    }

    fn skipped(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            outcome: CheckOutcome::Skipped,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationResult {
    pub checks: Vec<IntegrationCheck>,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub success: bool,
}

impl IntegrationResult {
    fn from_checks(checks: Vec<IntegrationCheck>) -> Self {
        let tally = |outcome| checks.iter().filter(|c| c.outcome == outcome).count();
        let passed = tally(CheckOutcome::Passed);
        let failed = tally(CheckOutcome::Failed);
        let skipped = tally(CheckOutcome::Skipped);
        Self {
            success: failed == 0,
            checks,
            passed,
            failed,
            skipped,
        }
    }

    pub fn check(&self, name: &str) -> Option<&IntegrationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

pub const ORCHESTRATION_CONSTRUCTED: &str = "orchestration_constructed";
pub const STATE_READY_FLAG: &str = "state_ready_flag";
pub const EVENTS_AVAILABLE: &str = "events_available";
pub const ERROR_HANDLER_CLASSIFIES: &str = "error_handler_classifies";
pub const RETRY_COLLABORATORS_TYPED: &str = "retry_collaborators_typed";
pub const NOTIFIER_TYPED: &str = "notifier_typed";

fn lookup(
    registry: &dyn CollaboratorRegistry,
    name: &str,
) -> std::result::Result<Option<CollaboratorHandle>, String> {
    registry.resolve(name).map_err(|e| e.to_string())
}

fn required_present(
    registry: &dyn CollaboratorRegistry,
    check: &'static str,
    name: &str,
) -> IntegrationCheck {
    match lookup(registry, name) {
        Ok(Some(_)) => IntegrationCheck::passed(check, format!("{name} resolved")),
        Ok(None) => IntegrationCheck::failed(check, format!("{name} is not registered")),
        Err(e) => IntegrationCheck::failed(check, e),
    }
}

async fn state_ready(registry: &dyn CollaboratorRegistry) -> IntegrationCheck {
    let handle = match lookup(registry, names::STATE_MANAGER) {
        Ok(Some(handle)) => handle,
        Ok(None) => {
            return IntegrationCheck::failed(STATE_READY_FLAG, "StateManager is not registered");
        }
        Err(e) => return IntegrationCheck::failed(STATE_READY_FLAG, e),
    };
    match handle.probe() {
        Some(probe) => {
            let ready = probe.is_ready().await;
            IntegrationCheck::passed(STATE_READY_FLAG, format!("ready={ready}"))
        }
        None => IntegrationCheck::failed(STATE_READY_FLAG, "StateManager exposes no ready flag"),
    }
}

fn error_handler_classifies(registry: &dyn CollaboratorRegistry) -> IntegrationCheck {
    let handle = match lookup(registry, names::ERROR_HANDLER) {
        Ok(Some(handle)) => handle,
        Ok(None) => {
            return IntegrationCheck::failed(
                ERROR_HANDLER_CLASSIFIES,
                "ErrorHandler is not registered",
            );
        }
        Err(e) => return IntegrationCheck::failed(ERROR_HANDLER_CLASSIFIES, e),
    };
    let Some(orchestrator) = handle.downcast::<Arc<RecoveryOrchestrator>>() else {
        return IntegrationCheck::failed(
            ERROR_HANDLER_CLASSIFIES,
            "ErrorHandler is not a recovery orchestrator",
        );
    };

    let advisor = orchestrator.advisor();
    let memory = advisor.classify("out of memory");
    let syntax_recoverable = advisor.is_recoverable("syntax error");
    if memory == ErrorType::Memory && !syntax_recoverable {
        IntegrationCheck::passed(ERROR_HANDLER_CLASSIFIES, "sample failures classified")
    } else {
        IntegrationCheck::failed(
            ERROR_HANDLER_CLASSIFIES,
            format!(
                "unexpected classification: memory={memory}, \
                 syntax_recoverable={syntax_recoverable}"
            ),
        )
    }
}

fn typed<T: 'static>(
    registry: &dyn CollaboratorRegistry,
    name: &str,
) -> std::result::Result<Option<bool>, String> {
    Ok(lookup(registry, name)?.map(|handle| handle.is::<T>()))
}

fn retry_collaborators_typed(registry: &dyn CollaboratorRegistry) -> IntegrationCheck {
    let candidates = [
        (
            names::CHUNKED_PROCESSOR,
            typed::<Arc<dyn ChunkedRetry>>(registry, names::CHUNKED_PROCESSOR),
        ),
        (
            names::SIMPLIFIED_CONVERTER,
            typed::<Arc<dyn SimplifiedRetry>>(registry, names::SIMPLIFIED_CONVERTER),
        ),
    ];

    let mut found = Vec::new();
    for (name, result) in candidates {
        match result {
            Ok(Some(true)) => found.push(name),
            Ok(Some(false)) => {
                return IntegrationCheck::failed(
                    RETRY_COLLABORATORS_TYPED,
                    format!("{name} has an unexpected type"),
                );
            }
            Ok(None) => {}
            Err(e) => return IntegrationCheck::failed(RETRY_COLLABORATORS_TYPED, e),
        }
    }

    if found.is_empty() {
        IntegrationCheck::skipped(RETRY_COLLABORATORS_TYPED, "no retry collaborators registered")
    } else {
        IntegrationCheck::passed(RETRY_COLLABORATORS_TYPED, found.join(", "))
    }
}

fn notifier_typed(registry: &dyn CollaboratorRegistry) -> IntegrationCheck {
    match lookup(registry, names::ACCESSIBILITY_NOTIFIER) {
        Ok(Some(handle)) if handle.is::<Arc<AccessibilityNotifier>>() => {
            IntegrationCheck::passed(NOTIFIER_TYPED, "notifier resolved")
        }
        Ok(Some(_)) => IntegrationCheck::failed(
            NOTIFIER_TYPED,
            "AccessibilityNotifier has an unexpected type",
        ),
        Ok(None) => IntegrationCheck::skipped(NOTIFIER_TYPED, "no notifier registered"),
        Err(e) => IntegrationCheck::failed(NOTIFIER_TYPED, e),
    }
}

/// Fixed battery of cross-component smoke checks.
pub async fn run_battery(registry: &dyn CollaboratorRegistry) -> IntegrationResult {
    let checks = vec![
        required_present(registry, ORCHESTRATION_CONSTRUCTED, names::CONVERSION_ORCHESTRATOR),
        state_ready(registry).await,
        required_present(registry, EVENTS_AVAILABLE, names::EVENT_MANAGER),
        error_handler_classifies(registry),
        retry_collaborators_typed(registry),
        notifier_typed(registry),
    ];

    for check in checks.iter().filter(|c| c.outcome == CheckOutcome::Failed) {
        warn!(check = check.name, detail = %check.detail, "Integration check failed");
    }
    let result = IntegrationResult::from_checks(checks);
    info!(
        passed = result.passed,
        failed = result.failed,
        skipped = result.skipped,
        "Integration checks complete"
    );
    result
}
