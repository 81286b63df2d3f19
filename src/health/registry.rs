use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Result, TexPilotError};

/// Collaborators that can report whether they are ready to take work.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn is_ready(&self) -> bool;
}

/// Type-erased live collaborator, recovered with [`CollaboratorHandle::downcast`].
#[derive(Clone)]
pub struct CollaboratorHandle {
    value: Arc<dyn Any + Send + Sync>,
    probe: Option<Arc<dyn ReadinessProbe>>,
}

impl CollaboratorHandle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            probe: None,
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn ReadinessProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn downcast<T: Clone + 'static>(&self) -> Option<T> {
        self.value.downcast_ref::<T>().cloned()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn probe(&self) -> Option<&Arc<dyn ReadinessProbe>> {
        self.probe.as_ref()
    }
}

impl fmt::Debug for CollaboratorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollaboratorHandle")
            .field("has_probe", &self.probe.is_some())
            .finish()
    }
}

/// Name-based lookup of live collaborators.
///
/// `Ok(None)` means the collaborator is absent; `Err` means lookup itself failed.
pub trait CollaboratorRegistry: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Option<CollaboratorHandle>>;
}

#[derive(Clone)]
enum Entry {
    Live(CollaboratorHandle),
    Broken(String),
}

#[derive(Default)]
pub struct InMemoryRegistry {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>, handle: CollaboratorHandle) {
        self.entries.write().insert(name.into(), Entry::Live(handle));
    }

    /// Register a value directly.
    pub fn insert<T: Any + Send + Sync>(&self, name: impl Into<String>, value: T) {
        self.register(name, CollaboratorHandle::new(value));
    }

    /// Make resolution of `name` fail with `message`.
    pub fn register_broken(&self, name: impl Into<String>, message: impl Into<String>) {
        self.entries
            .write()
            .insert(name.into(), Entry::Broken(message.into()));
    }

    pub fn remove(&self, name: &str) -> bool {
        self.entries.write().remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

impl CollaboratorRegistry for InMemoryRegistry {
    fn resolve(&self, name: &str) -> Result<Option<CollaboratorHandle>> {
        match self.entries.read().get(name) {
            Some(Entry::Live(handle)) => Ok(Some(handle.clone())),
            Some(Entry::Broken(message)) => Err(TexPilotError::Registry {
                name: name.to_string(),
                message: message.clone(),
            }),
            None => Ok(None),
        }
    }
}
