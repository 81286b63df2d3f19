pub mod cli;
pub mod complexity;
pub mod config;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod health;
pub mod host;
pub mod notification;
pub mod recovery;
pub mod scheduler;
pub mod utils;

pub use complexity::{
    ComplexityAssessment, ComplexityAssessor, ComplexityLevel, ProcessingStrategy,
    StrategyPreferences, StrategySelection,
};
pub use config::TexPilotConfig;
pub use conversion::{ConversionManager, ConversionPipeline, ConversionRecord, ConversionStatus};
pub use engine::{ChunkedRetry, RenderEngine, SimplifiedRetry};
pub use error::{Result, TexPilotError};
pub use health::{DependencyContext, DependencyHealthMonitor, HealthSnapshot, IntegrationResult};
pub use host::{Host, HostOptions};
pub use notification::{AccessibilityNotifier, AnnouncementOptions};
pub use recovery::{ErrorReport, RecoveryAdvisor, RecoveryOrchestrator, RecoveryOutcome};
pub use scheduler::{ConversionScheduler, ScheduleDecision};
