use std::sync::Arc;

use tracing::{debug, info, warn};

use super::advisor::RecoveryAdvisor;
use super::sink::ReportSinks;
use super::types::{FailureSignature, RecoveryOutcome, RecoveryPath};
use crate::config::RecoveryConfig;
use crate::engine::{ChunkedRetry, SimplifiedRetry, simplify_args};
use crate::error::TexPilotError;
use crate::health::{DependencyContext, names};

const MEMORY_SIGNATURES: &[&str] = &[
    "out of memory",
    "stack space overflow",
    "stack overflow",
    "memory exhausted",
    "allocation failed",
    "cannot enlarge memory",
];

const RUNTIME_SIGNATURES: &[&str] = &[
    "webassembly",
    "wasm",
    "runtimeerror",
    "unreachable",
    "trap",
];

const TIMEOUT_SIGNATURES: &[&str] = &["timed out", "timeout"];

/// Retry collaborators available for one failure. Absent entries are skipped.
#[derive(Clone, Default)]
pub struct RecoveryCollaborators {
    pub chunked: Option<Arc<dyn ChunkedRetry>>,
    pub simplified: Option<Arc<dyn SimplifiedRetry>>,
}

impl RecoveryCollaborators {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_chunked(mut self, chunked: Arc<dyn ChunkedRetry>) -> Self {
        self.chunked = Some(chunked);
        self
    }

    pub fn with_simplified(mut self, simplified: Arc<dyn SimplifiedRetry>) -> Self {
        self.simplified = Some(simplified);
        self
    }

    /// Same collaborators minus the chunked retry, for runs that already went through it.
    pub fn without_chunked(&self) -> Self {
        Self {
            chunked: None,
            simplified: self.simplified.clone(),
        }
    }

    /// Collaborators present in a dependency context.
    pub fn from_context<M>(context: &DependencyContext<M>) -> Self {
        Self {
            chunked: context.collaborator::<Arc<dyn ChunkedRetry>>(names::CHUNKED_PROCESSOR),
            simplified: context
                .collaborator::<Arc<dyn SimplifiedRetry>>(names::SIMPLIFIED_CONVERTER),
        }
    }
}

/// Decides whether a failed conversion gets one retry and reports when it does not.
pub struct RecoveryOrchestrator {
    advisor: RecoveryAdvisor,
    config: RecoveryConfig,
    sinks: ReportSinks,
}

impl RecoveryOrchestrator {
    pub fn new(config: RecoveryConfig, sinks: ReportSinks) -> Self {
        Self {
            advisor: RecoveryAdvisor::new(),
            config,
            sinks,
        }
    }

    pub fn advisor(&self) -> &RecoveryAdvisor {
        &self.advisor
    }

    pub fn signature(error: &TexPilotError) -> FailureSignature {
        let lowered = error.raw_message().to_lowercase();
        let contains_any = |phrases: &[&str]| phrases.iter().any(|p| lowered.contains(p));

        FailureSignature {
            memory: contains_any(MEMORY_SIGNATURES),
            runtime: contains_any(RUNTIME_SIGNATURES),
            timeout: error.is_timeout() || contains_any(TIMEOUT_SIGNATURES),
        }
    }

    /// Attempt 1 may try at most one retry strategy; later attempts always report.
    pub async fn handle_failure(
        &self,
        error: &TexPilotError,
        input: &str,
        args: &str,
        attempt: u32,
        collaborators: &RecoveryCollaborators,
    ) -> RecoveryOutcome {
        let raw_message = error.raw_message();
        let signature = Self::signature(error);
        debug!(attempt, ?signature, error = %raw_message, "Handling conversion failure");

        if attempt <= 1 {
            if let Some(outcome) = self.try_recover(signature, input, args, collaborators).await {
                return outcome;
            }
        } else {
            debug!(attempt, "Retry ceiling reached, reporting");
        }

        let report = self.advisor.build_report(&raw_message);
        info!(
            error_type = %report.error_type,
            severity = %report.severity,
            recoverable = report.recoverable,
            "Reporting conversion failure"
        );
        let delivery = self.sinks.deliver_all(&report).await;
        RecoveryOutcome::Reported { report, delivery }
    }

    async fn try_recover(
        &self,
        signature: FailureSignature,
        input: &str,
        args: &str,
        collaborators: &RecoveryCollaborators,
    ) -> Option<RecoveryOutcome> {
        let wants_chunked =
            signature.memory || (self.config.chunk_on_timeout && signature.timeout);

        if wants_chunked {
            if let Some(chunked) = &collaborators.chunked {
                info!("Retrying with chunked processing");
                match chunked.process_in_chunks(input, args).await {
                    Ok(output) => {
                        return Some(RecoveryOutcome::Recovered {
                            output,
                            path: RecoveryPath::Chunked,
                        });
                    }
                    Err(e) => warn!(error = %e, "Chunked retry failed"),
                }
                return None;
            }
            debug!("No chunked retry collaborator available");
        }

        if signature.runtime {
            if let Some(simplified) = &collaborators.simplified {
                let simplified_args =
                    simplify_args(args, &self.config.keep_flags, &self.config.baseline_args);
                info!(args = %simplified_args, "Retrying with simplified conversion");
                match simplified
                    .attempt_simplified_conversion(input, &simplified_args)
                    .await
                {
                    Ok(output) => {
                        return Some(RecoveryOutcome::Recovered {
                            output,
                            path: RecoveryPath::Simplified,
                        });
                    }
                    Err(e) => warn!(error = %e, "Simplified retry failed"),
                }
            } else {
                debug!("No simplified retry collaborator available");
            }
        }

        None
    }
}
