use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::ConversionManager;
use super::presentation::Presentation;
use crate::complexity::{
    ComplexityAssessor, ComplexityLevel, ProcessingStrategy, StrategyPreferences,
};
use crate::engine::RenderEngine;
use crate::error::{Result, TexPilotError};
use crate::recovery::{
    ErrorReport, RecoveryCollaborators, RecoveryOrchestrator, RecoveryOutcome, RecoveryPath,
};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionStatus {
    Succeeded,
    Recovered { path: RecoveryPath },
    Failed { report: ErrorReport },
    /// Empty input, nothing converted.
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionRecord {
    pub status: ConversionStatus,
    pub strategy: ProcessingStrategy,
    pub level: ComplexityLevel,
    pub elapsed_ms: u64,
}

impl ConversionRecord {
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            ConversionStatus::Succeeded | ConversionStatus::Recovered { .. }
        )
    }
}

/// Manager for one input stream: assesses, renders and recovers.
pub struct ConversionPipeline {
    input: RwLock<String>,
    args: RwLock<String>,
    assessor: ComplexityAssessor,
    preferences: StrategyPreferences,
    engine: Arc<dyn RenderEngine>,
    orchestrator: Arc<RecoveryOrchestrator>,
    collaborators: RwLock<RecoveryCollaborators>,
    presentation: Arc<dyn Presentation>,
    last_record: Mutex<Option<ConversionRecord>>,
}

impl ConversionPipeline {
    pub fn new(
        engine: Arc<dyn RenderEngine>,
        presentation: Arc<dyn Presentation>,
        assessor: ComplexityAssessor,
        orchestrator: Arc<RecoveryOrchestrator>,
    ) -> Self {
        Self {
            input: RwLock::new(String::new()),
            args: RwLock::new(String::new()),
            assessor,
            preferences: StrategyPreferences::default(),
            engine,
            orchestrator,
            collaborators: RwLock::new(RecoveryCollaborators::none()),
            presentation,
            last_record: Mutex::new(None),
        }
    }

    pub fn with_preferences(mut self, preferences: StrategyPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_args(self, args: impl Into<String>) -> Self {
        *self.args.write() = args.into();
        self
    }

    /// Replace the retry collaborators, e.g. after rebuilding the dependency context.
    pub fn set_collaborators(&self, collaborators: RecoveryCollaborators) {
        *self.collaborators.write() = collaborators;
    }

    pub fn set_input(&self, input: impl Into<String>) {
        *self.input.write() = input.into();
    }

    pub fn set_args(&self, args: impl Into<String>) {
        *self.args.write() = args.into();
    }

    pub fn last_record(&self) -> Option<ConversionRecord> {
        self.last_record.lock().clone()
    }

    /// Input was cleared while this run was rendering.
    fn cleared_since_start(&self) -> bool {
        self.input.read().trim().is_empty()
    }

    fn status(&self, message: &str) {
        if let Err(e) = self.presentation.set_status(message) {
            warn!(error = %e, "Failed to update status");
        }
    }

    pub async fn run(&self) -> Result<ConversionRecord> {
        let started = Instant::now();
        let input = self.input.read().clone();
        let args = self.args.read().clone();

        if input.trim().is_empty() {
            self.presentation.clear_output()?;
            let record = ConversionRecord {
                status: ConversionStatus::Skipped,
                strategy: ProcessingStrategy::Standard,
                level: ComplexityLevel::Unknown,
                elapsed_ms: 0,
            };
            *self.last_record.lock() = Some(record.clone());
            return Ok(record);
        }

        let selection = self.assessor.select_strategy(&input, &self.preferences);
        let strategy = selection.strategy();
        let timeout = selection.assessment.timeout();
        debug!(reasoning = %selection.reasoning, "Selected processing strategy");
        self.status(&format!("Converting ({} processing)...", strategy));

        let collaborators = self.collaborators.read().clone();
        let attempt = self
            .attempt(&input, &args, strategy, timeout, &collaborators)
            .await;

        if self.cleared_since_start() {
            debug!("Input cleared during conversion, discarding result");
            let record = ConversionRecord {
                status: ConversionStatus::Skipped,
                strategy,
                level: selection.assessment.level,
                elapsed_ms: started.elapsed().as_millis() as u64,
            };
            *self.last_record.lock() = Some(record.clone());
            return Ok(record);
        }

        let status = match attempt {
            Ok(output) => {
                self.presentation.set_output_display(&output)?;
                self.status("Conversion complete");
                ConversionStatus::Succeeded
            }
            Err(e) => {
                warn!(error = %e, "Conversion failed");
                // Chunking again would repeat the run that just failed.
                let retry = if strategy == ProcessingStrategy::Chunked
                    && collaborators.chunked.is_some()
                {
                    collaborators.without_chunked()
                } else {
                    collaborators.clone()
                };
                match self
                    .orchestrator
                    .handle_failure(&e, &input, &args, 1, &retry)
                    .await
                {
                    RecoveryOutcome::Recovered { output, path } => {
                        self.presentation.set_output_display(&output)?;
                        self.status(&format!("Conversion complete after {} retry", path));
                        ConversionStatus::Recovered { path }
                    }
                    RecoveryOutcome::Reported { report, .. } => ConversionStatus::Failed { report },
                }
            }
        };

        let record = ConversionRecord {
            status,
            strategy,
            level: selection.assessment.level,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            strategy = %record.strategy,
            level = %record.level,
            success = record.is_success(),
            elapsed_ms = record.elapsed_ms,
            "Conversion finished"
        );
        *self.last_record.lock() = Some(record.clone());
        Ok(record)
    }

    async fn attempt(
        &self,
        input: &str,
        args: &str,
        strategy: ProcessingStrategy,
        timeout: Duration,
        collaborators: &RecoveryCollaborators,
    ) -> Result<String> {
        let render = async {
            match (strategy, &collaborators.chunked) {
                (ProcessingStrategy::Chunked, Some(chunked)) => {
                    chunked.process_in_chunks(input, args).await
                }
                (ProcessingStrategy::Chunked, None) => {
                    debug!("Chunked processing unavailable, rendering in one pass");
                    self.engine.render(input, args).await
                }
                (ProcessingStrategy::Standard, _) => self.engine.render(input, args).await,
            }
        };

        match tokio::time::timeout(timeout, render).await {
            Ok(result) => result,
            Err(_) => Err(TexPilotError::Timeout(timeout)),
        }
    }
}

#[async_trait]
impl ConversionManager for ConversionPipeline {
    fn input_source(&self) -> String {
        self.input.read().clone()
    }

    fn args_source(&self) -> String {
        self.args.read().clone()
    }

    fn presentation(&self) -> Arc<dyn Presentation> {
        Arc::clone(&self.presentation)
    }

    async fn convert(&self) -> Result<()> {
        self.run().await.map(|_| ())
    }
}
