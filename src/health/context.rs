use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::names;
use super::registry::{CollaboratorHandle, CollaboratorRegistry};

/// Collaborators available to one conversion manager.
///
/// Immutable once built. Absent collaborators are `None`; rebuilding always
/// produces a new allocation.
#[derive(Debug)]
pub struct DependencyContext<M> {
    manager: Arc<M>,
    pub orchestration: Option<CollaboratorHandle>,
    pub state: Option<CollaboratorHandle>,
    pub events: Option<CollaboratorHandle>,
    pub error_handling: Option<CollaboratorHandle>,
    /// Fallback strategies.
    pub chunked_processor: Option<CollaboratorHandle>,
    pub simplified_converter: Option<CollaboratorHandle>,
    pub memory: Option<CollaboratorHandle>,
    pub latex_preservation: Option<CollaboratorHandle>,
    pub processing_strategy: Option<CollaboratorHandle>,
    pub utilities: Option<CollaboratorHandle>,
    pub status_indicator: Option<CollaboratorHandle>,
    pub accessibility: Option<CollaboratorHandle>,
    pub built_at: DateTime<Utc>,
}

impl<M> DependencyContext<M> {
    pub fn build(manager: Arc<M>, registry: &dyn CollaboratorRegistry) -> Arc<Self> {
        let lookup = |name: &str| match registry.resolve(name) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(collaborator = name, error = %e, "Collaborator unavailable for context");
                None
            }
        };

        let context = Self {
            manager,
            orchestration: lookup(names::CONVERSION_ORCHESTRATOR),
            state: lookup(names::STATE_MANAGER),
            events: lookup(names::EVENT_MANAGER),
            error_handling: lookup(names::ERROR_HANDLER),
            chunked_processor: lookup(names::CHUNKED_PROCESSOR),
            simplified_converter: lookup(names::SIMPLIFIED_CONVERTER),
            memory: lookup(names::MEMORY_WATCHDOG),
            latex_preservation: lookup(names::LATEX_PRESERVATION),
            processing_strategy: lookup(names::PROCESSING_STRATEGY),
            utilities: lookup(names::UTILITIES),
            status_indicator: lookup(names::STATUS_INDICATOR),
            accessibility: lookup(names::ACCESSIBILITY_NOTIFIER),
            built_at: Utc::now(),
        };
        debug!(available = context.available().len(), "Dependency context built");
        Arc::new(context)
    }

    pub fn manager(&self) -> &Arc<M> {
        &self.manager
    }

    pub fn slot(&self, name: &str) -> Option<&CollaboratorHandle> {
        match name {
            names::CONVERSION_ORCHESTRATOR => self.orchestration.as_ref(),
            names::STATE_MANAGER => self.state.as_ref(),
            names::EVENT_MANAGER => self.events.as_ref(),
            names::ERROR_HANDLER => self.error_handling.as_ref(),
            names::CHUNKED_PROCESSOR => self.chunked_processor.as_ref(),
            names::SIMPLIFIED_CONVERTER => self.simplified_converter.as_ref(),
            names::MEMORY_WATCHDOG => self.memory.as_ref(),
            names::LATEX_PRESERVATION => self.latex_preservation.as_ref(),
            names::PROCESSING_STRATEGY => self.processing_strategy.as_ref(),
            names::UTILITIES => self.utilities.as_ref(),
            names::STATUS_INDICATOR => self.status_indicator.as_ref(),
            names::ACCESSIBILITY_NOTIFIER => self.accessibility.as_ref(),
            _ => None,
        }
    }

    /// Typed collaborator by name; `None` when absent or of another type.
    pub fn collaborator<T: Clone + 'static>(&self, name: &str) -> Option<T> {
        self.slot(name).and_then(|handle| handle.downcast::<T>())
    }

    pub fn available(&self) -> Vec<&'static str> {
        names::REQUIRED
            .iter()
            .chain(names::OPTIONAL)
            .copied()
            .filter(|name| self.slot(name).is_some())
            .collect()
    }
}
