//! Wires one input stream: pipeline, scheduler, recovery, notifier and the
//! collaborator registry the health monitor inspects.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::complexity::{ComplexityAssessor, StrategyPreferences};
use crate::config::TexPilotConfig;
use crate::conversion::{BufferedPresentation, ConversionPipeline, ConversionRecord, Presentation};
use crate::engine::{
    ChunkedRetry, ChunkingRenderer, CommandEngine, RenderEngine, SimplifiedRenderer,
    SimplifiedRetry,
};
use crate::error::{Result, TexPilotError};
use crate::health::{
    CollaboratorHandle, DependencyContext, DependencyHealthMonitor, InMemoryRegistry, names,
};
use crate::notification::{AccessibilityNotifier, AnnouncementSurface, LogSurface};
use crate::recovery::{RecoveryCollaborators, RecoveryOrchestrator, ReportSinks};
use crate::scheduler::{ConversionScheduler, ScheduleDecision};

/// Stands in for the render engine when none is configured.
struct UnconfiguredEngine;

#[async_trait]
impl RenderEngine for UnconfiguredEngine {
    async fn render(&self, _input: &str, _args: &str) -> Result<String> {
        Err(TexPilotError::Config(
            "engine.command is not configured".to_string(),
        ))
    }
}

pub struct HostOptions {
    /// `None` leaves the conversion collaborators unregistered.
    pub engine: Option<Arc<dyn RenderEngine>>,
    pub surface: Arc<dyn AnnouncementSurface>,
    pub preferences: StrategyPreferences,
    /// Collaborator names to leave out of the registry.
    pub disabled: Vec<String>,
}

impl HostOptions {
    pub fn from_config(config: &TexPilotConfig) -> Self {
        let engine = config
            .engine
            .command
            .as_ref()
            .map(|cmd| Arc::new(CommandEngine::new(cmd.clone())) as Arc<dyn RenderEngine>);
        Self {
            engine,
            surface: Arc::new(LogSurface),
            preferences: StrategyPreferences::default(),
            disabled: Vec::new(),
        }
    }
}

pub struct Host {
    config: TexPilotConfig,
    presentation: Arc<BufferedPresentation>,
    notifier: Arc<AccessibilityNotifier>,
    pipeline: Arc<ConversionPipeline>,
    scheduler: ConversionScheduler<ConversionPipeline>,
    registry: Arc<InMemoryRegistry>,
    monitor: DependencyHealthMonitor,
    context: RwLock<Arc<DependencyContext<ConversionPipeline>>>,
}

impl Host {
    pub fn new(config: TexPilotConfig, options: HostOptions) -> Self {
        let presentation = Arc::new(BufferedPresentation::new());
        let shared_presentation: Arc<dyn Presentation> = presentation.clone();
        let notifier = Arc::new(AccessibilityNotifier::new(
            config.notifier.clone(),
            options.surface,
        ));

        let sinks = ReportSinks::standard(
            Arc::clone(&shared_presentation),
            Some(Arc::clone(&notifier)),
        );
        let orchestrator = Arc::new(RecoveryOrchestrator::new(
            config.recovery.clone(),
            sinks.clone(),
        ));
        let assessor = ComplexityAssessor::new(config.complexity.clone());

        let has_engine = options.engine.is_some();
        let engine = options
            .engine
            .unwrap_or_else(|| Arc::new(UnconfiguredEngine) as Arc<dyn RenderEngine>);
        let pipeline = Arc::new(
            ConversionPipeline::new(
                Arc::clone(&engine),
                Arc::clone(&shared_presentation),
                assessor.clone(),
                Arc::clone(&orchestrator),
            )
            .with_preferences(options.preferences)
            .with_args(config.engine.args.clone()),
        );
        let scheduler = ConversionScheduler::new(Arc::clone(&pipeline), config.scheduler.clone());

        let registry = Arc::new(InMemoryRegistry::new());
        let enabled = |name: &str| !options.disabled.iter().any(|d| d == name);
        let register = |name: &str, handle: CollaboratorHandle| {
            if enabled(name) {
                registry.register(name, handle);
            } else {
                debug!(collaborator = name, "Collaborator disabled");
            }
        };

        if has_engine {
            register(
                names::CONVERSION_ORCHESTRATOR,
                CollaboratorHandle::new(Arc::clone(&pipeline)),
            );
            let chunked: Arc<dyn ChunkedRetry> = Arc::new(ChunkingRenderer::new(
                Arc::clone(&engine),
                config.recovery.chunk_max_chars,
            ));
            register(names::CHUNKED_PROCESSOR, CollaboratorHandle::new(chunked));
            let simplified: Arc<dyn SimplifiedRetry> =
                Arc::new(SimplifiedRenderer::new(Arc::clone(&engine)));
            register(names::SIMPLIFIED_CONVERTER, CollaboratorHandle::new(simplified));
        }
        register(
            names::STATE_MANAGER,
            CollaboratorHandle::new(scheduler.clone()).with_probe(Arc::new(scheduler.clone())),
        );
        register(names::EVENT_MANAGER, CollaboratorHandle::new(sinks));
        register(
            names::ERROR_HANDLER,
            CollaboratorHandle::new(Arc::clone(&orchestrator)),
        );
        register(
            names::PROCESSING_STRATEGY,
            CollaboratorHandle::new(Arc::new(assessor)),
        );
        register(
            names::STATUS_INDICATOR,
            CollaboratorHandle::new(Arc::clone(&shared_presentation)),
        );
        register(
            names::ACCESSIBILITY_NOTIFIER,
            CollaboratorHandle::new(Arc::clone(&notifier)),
        );

        let monitor = DependencyHealthMonitor::new(registry.clone(), &config.health);
        let context = monitor.build_context(Arc::clone(&pipeline));
        pipeline.set_collaborators(RecoveryCollaborators::from_context(&context));
        info!(available = context.available().len(), "Host assembled");

        Self {
            config,
            presentation,
            notifier,
            pipeline,
            scheduler,
            registry,
            monitor,
            context: RwLock::new(context),
        }
    }

    pub fn from_config(config: TexPilotConfig) -> Self {
        let options = HostOptions::from_config(&config);
        Self::new(config, options)
    }

    pub fn config(&self) -> &TexPilotConfig {
        &self.config
    }

    pub fn presentation(&self) -> &Arc<BufferedPresentation> {
        &self.presentation
    }

    pub fn notifier(&self) -> &Arc<AccessibilityNotifier> {
        &self.notifier
    }

    pub fn pipeline(&self) -> &Arc<ConversionPipeline> {
        &self.pipeline
    }

    pub fn scheduler(&self) -> &ConversionScheduler<ConversionPipeline> {
        &self.scheduler
    }

    pub fn registry(&self) -> &Arc<InMemoryRegistry> {
        &self.registry
    }

    pub fn monitor(&self) -> &DependencyHealthMonitor {
        &self.monitor
    }

    pub fn context(&self) -> Arc<DependencyContext<ConversionPipeline>> {
        Arc::clone(&self.context.read())
    }

    /// Rebuild the dependency context after registry changes and hand the
    /// pipeline whichever retry collaborators remain.
    pub fn rebuild_context(&self) -> Arc<DependencyContext<ConversionPipeline>> {
        let context = self.monitor.build_context(Arc::clone(&self.pipeline));
        self.pipeline
            .set_collaborators(RecoveryCollaborators::from_context(&context));
        *self.context.write() = Arc::clone(&context);
        context
    }

    /// Convert immediately, bypassing the debounce.
    pub async fn convert_now(&self, input: impl Into<String>) -> Result<ConversionRecord> {
        self.pipeline.set_input(input);
        self.pipeline.run().await
    }

    /// Record an input change and let the scheduler decide when to convert.
    pub fn submit(&self, input: impl Into<String>) -> ScheduleDecision {
        self.pipeline.set_input(input);
        self.scheduler.schedule()
    }
}
