use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::context::DependencyContext;
use super::integration::{self, IntegrationResult};
use super::registry::CollaboratorRegistry;
use crate::config::HealthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStatus {
    Loaded,
    Missing,
    Error,
}

impl ModuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Missing => "missing",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleHealthRecord {
    pub name: String,
    pub required: bool,
    pub available: bool,
    pub status: ModuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    pub required_available: usize,
    pub required_total: usize,
    pub optional_available: usize,
    pub optional_total: usize,
    pub required_health_percentage: f64,
    pub optional_health_percentage: f64,
    /// Required collaborators that are missing or failed to resolve.
    pub critical_failures: Vec<String>,
    /// Optional collaborators that are missing or failed to resolve.
    pub warnings: Vec<String>,
    pub healthy: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub modules: Vec<ModuleHealthRecord>,
    pub summary: HealthSummary,
    pub checked_at: DateTime<Utc>,
}

impl HealthSnapshot {
    pub fn is_healthy(&self) -> bool {
        self.summary.healthy
    }

    pub fn module(&self, name: &str) -> Option<&ModuleHealthRecord> {
        self.modules.iter().find(|m| m.name == name)
    }
}

fn percentage(available: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        available as f64 / total as f64 * 100.0
    }
}

/// Inventories required and optional collaborators against a live registry.
pub struct DependencyHealthMonitor {
    registry: Arc<dyn CollaboratorRegistry>,
    required: Vec<String>,
    optional: Vec<String>,
}

impl DependencyHealthMonitor {
    pub fn new(registry: Arc<dyn CollaboratorRegistry>, config: &HealthConfig) -> Self {
        Self {
            registry,
            required: config.required.clone(),
            optional: config.optional.clone(),
        }
    }

    pub fn registry(&self) -> &Arc<dyn CollaboratorRegistry> {
        &self.registry
    }

    /// Recomputed on every call.
    pub fn validate(&self) -> HealthSnapshot {
        let modules: Vec<ModuleHealthRecord> = self
            .required
            .iter()
            .map(|name| self.inspect(name, true))
            .chain(self.optional.iter().map(|name| self.inspect(name, false)))
            .collect();

        let count = |required: bool, available: bool| {
            modules
                .iter()
                .filter(|m| m.required == required && (!available || m.available))
                .count()
        };
        let failures = |required: bool| -> Vec<String> {
            modules
                .iter()
                .filter(|m| m.required == required && !m.available)
                .map(|m| m.name.clone())
                .collect()
        };

        let required_available = count(true, true);
        let required_total = count(true, false);
        let optional_available = count(false, true);
        let optional_total = count(false, false);
        let critical_failures = failures(true);
        let warnings = failures(false);

        for name in &critical_failures {
            warn!(collaborator = %name, "Required collaborator unavailable");
        }
        for name in &warnings {
            debug!(collaborator = %name, "Optional collaborator unavailable, running degraded");
        }

        let summary = HealthSummary {
            required_available,
            required_total,
            optional_available,
            optional_total,
            required_health_percentage: percentage(required_available, required_total),
            optional_health_percentage: percentage(optional_available, optional_total),
            healthy: critical_failures.is_empty(),
            critical_failures,
            warnings,
        };
        info!(
            healthy = summary.healthy,
            required = %format!("{}/{}", summary.required_available, summary.required_total),
            optional = %format!("{}/{}", summary.optional_available, summary.optional_total),
            "Dependency validation complete"
        );

        HealthSnapshot {
            modules,
            summary,
            checked_at: Utc::now(),
        }
    }

    fn inspect(&self, name: &str, required: bool) -> ModuleHealthRecord {
        let (available, status, error) = match self.registry.resolve(name) {
            Ok(Some(_)) => (true, ModuleStatus::Loaded, None),
            Ok(None) => (false, ModuleStatus::Missing, None),
            Err(e) => (false, ModuleStatus::Error, Some(e.to_string())),
        };
        ModuleHealthRecord {
            name: name.to_string(),
            required,
            available,
            status,
            error,
        }
    }

    pub fn build_context<M>(&self, manager: Arc<M>) -> Arc<DependencyContext<M>> {
        DependencyContext::build(manager, self.registry.as_ref())
    }

    pub async fn check_integration(&self) -> IntegrationResult {
        integration::run_battery(self.registry.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{InMemoryRegistry, names};

    fn full_registry() -> InMemoryRegistry {
        let registry = InMemoryRegistry::new();
        for name in names::REQUIRED.iter().chain(names::OPTIONAL) {
            registry.insert(*name, ());
        }
        registry
    }

    fn monitor(registry: InMemoryRegistry) -> DependencyHealthMonitor {
        DependencyHealthMonitor::new(Arc::new(registry), &HealthConfig::default())
    }

    #[test]
    fn test_all_present_is_healthy() {
        let snapshot = monitor(full_registry()).validate();
        assert!(snapshot.is_healthy());
        assert_eq!(snapshot.summary.required_health_percentage, 100.0);
        assert_eq!(snapshot.summary.optional_health_percentage, 100.0);
        assert!(snapshot.summary.critical_failures.is_empty());
        assert!(snapshot.summary.warnings.is_empty());
    }

    #[test]
    fn test_missing_required_and_optional() {
        let registry = full_registry();
        registry.remove(names::STATE_MANAGER);
        registry.remove(names::MEMORY_WATCHDOG);

        let snapshot = monitor(registry).validate();
        assert_eq!(snapshot.summary.critical_failures, vec![names::STATE_MANAGER]);
        assert_eq!(snapshot.summary.warnings, vec![names::MEMORY_WATCHDOG]);
        assert!(!snapshot.summary.healthy);
        assert_eq!(snapshot.summary.required_health_percentage, 75.0);
        assert_eq!(
            snapshot.module(names::STATE_MANAGER).map(|m| m.status),
            Some(ModuleStatus::Missing)
        );
    }

    #[test]
    fn test_resolution_error_is_recorded_not_raised() {
        let registry = full_registry();
        registry.register_broken(names::UTILITIES, "init failed");

        let snapshot = monitor(registry).validate();
        let record = snapshot.module(names::UTILITIES).unwrap();
        assert_eq!(record.status, ModuleStatus::Error);
        assert!(!record.available);
        assert!(record.error.as_deref().unwrap().contains("init failed"));
        // Optional only, so still healthy.
        assert!(snapshot.is_healthy());
        assert_eq!(snapshot.summary.warnings.len(), 1);
    }

    #[test]
    fn test_empty_sets_report_full_percentage() {
        let config = HealthConfig {
            required: vec![],
            optional: vec![],
        };
        let monitor = DependencyHealthMonitor::new(Arc::new(InMemoryRegistry::new()), &config);
        let snapshot = monitor.validate();
        assert_eq!(snapshot.summary.required_health_percentage, 100.0);
        assert!(snapshot.is_healthy());
    }

    #[test]
    fn test_snapshot_serializes_lowercase_status() {
        let snapshot = monitor(InMemoryRegistry::new()).validate();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["modules"][0]["status"], "missing");
        assert_eq!(json["summary"]["healthy"], false);
    }
}
