//! Configuration types and loading.
//!
//! Provides all configuration structures for tex-pilot:
//! - `TexPilotConfig`: Top-level configuration with validation
//! - `ComplexityConfig`, `ComplexityWeights`, `LevelThresholds`: assessment tuning
//! - `SchedulerConfig`, `NotifierConfig`, `RecoveryConfig`, `HealthConfig`, `EngineConfig`

mod settings;

pub use settings::{
    CONFIG_FILE_NAME, ComplexityConfig, ComplexityWeights, EngineConfig, HealthConfig,
    LevelThresholds, NotifierConfig, RecommendationThresholds, RecoveryConfig, SchedulerConfig,
    TexPilotConfig,
};
