use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Result, TexPilotError};
use crate::notification::{Liveness, Priority, Role};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TexPilotConfig {
    pub complexity: ComplexityConfig,
    pub scheduler: SchedulerConfig,
    pub notifier: NotifierConfig,
    pub recovery: RecoveryConfig,
    pub health: HealthConfig,
    pub engine: EngineConfig,
}

impl TexPilotConfig {
    pub async fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).await?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, config_dir: &Path) -> Result<()> {
        self.validate()?;
        fs::create_dir_all(config_dir).await?;
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let content =
            toml::to_string_pretty(self).map_err(|e| TexPilotError::Config(e.to_string()))?;
        fs::write(&config_path, content).await?;
        Ok(())
    }

    /// Validate configuration values for consistency and safety.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        // Complexity validation
        let c = &self.complexity;
        if !c.weights.all_non_negative() {
            errors.push("complexity.weights must all be non-negative");
        }
        if c.weights.length_per == 0 || c.weights.lines_per == 0 {
            errors.push("complexity.weights.length_per and lines_per must be greater than 0");
        }
        if !(c.levels.basic_below < c.levels.intermediate_below
            && c.levels.intermediate_below < c.levels.advanced_below)
        {
            errors.push("complexity.levels cutoffs must be strictly ascending");
        }
        if c.max_complexity_score < 0.0 {
            errors.push("complexity.max_complexity_score must be non-negative");
        }
        if c.max_document_length == 0 {
            errors.push("complexity.max_document_length must be greater than 0");
        }
        if c.default_timeout_ms == 0 {
            errors.push("complexity.default_timeout_ms must be greater than 0");
        }

        // Scheduler validation
        let s = &self.scheduler;
        if s.debounce_ms == 0 {
            errors.push("scheduler.debounce_ms must be greater than 0");
        }
        if s.fast_debounce_ms > s.debounce_ms {
            errors.push("scheduler.fast_debounce_ms must be <= debounce_ms");
        }
        if s.max_wait_ms <= s.debounce_ms {
            errors.push("scheduler.max_wait_ms must be greater than debounce_ms");
        }
        if s.small_input_threshold >= s.large_input_threshold {
            errors.push("scheduler.small_input_threshold must be less than large_input_threshold");
        }

        // Notifier validation
        if self.notifier.timeout_ms == 0 {
            errors.push("notifier.timeout_ms must be greater than 0");
        }

        // Recovery validation
        if self.recovery.chunk_max_chars == 0 {
            errors.push("recovery.chunk_max_chars must be greater than 0");
        }
        if self.recovery.baseline_args.trim().is_empty() {
            errors.push("recovery.baseline_args must not be empty");
        }

        // Health validation
        if self
            .health
            .required
            .iter()
            .any(|name| self.health.optional.contains(name))
        {
            errors.push("health.required and health.optional must not share names");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TexPilotError::Config(errors.join("; ")))
        }
    }
}

/// Weight table applied to structural indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityWeights {
    pub equations: f64,
    pub display_math: f64,
    pub matrices: f64,
    pub environments: f64,
    pub sections: f64,
    pub tables: f64,
    pub figures: f64,
    pub commands: f64,
    /// One score point per this many characters.
    pub length_per: usize,
    /// One score point per this many lines.
    pub lines_per: usize,
}

impl ComplexityWeights {
    fn all_non_negative(&self) -> bool {
        [
            self.equations,
            self.display_math,
            self.matrices,
            self.environments,
            self.sections,
            self.tables,
            self.figures,
            self.commands,
        ]
        .iter()
        .all(|w| *w >= 0.0)
    }
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            equations: 1.0,
            display_math: 2.0,
            matrices: 5.0,
            environments: 2.0,
            sections: 3.0,
            tables: 3.0,
            figures: 2.0,
            commands: 0.1,
            length_per: 1000,
            lines_per: 100,
        }
    }
}

/// Ascending score cutoffs. Scores at or above `advanced_below` are Complex.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelThresholds {
    pub basic_below: f64,
    pub intermediate_below: f64,
    pub advanced_below: f64,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            basic_below: 10.0,
            intermediate_below: 30.0,
            advanced_below: 70.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub matrix_heavy: usize,
    pub section_heavy: usize,
    pub environment_heavy: usize,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            matrix_heavy: 5,
            section_heavy: 10,
            environment_heavy: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityConfig {
    pub weights: ComplexityWeights,
    pub levels: LevelThresholds,
    pub recommendations: RecommendationThresholds,
    /// Scores strictly above this require chunked processing.
    pub max_complexity_score: f64,
    /// Documents strictly longer than this (in characters) require chunked processing.
    pub max_document_length: usize,
    pub ms_per_score_point: f64,
    pub max_estimated_time_ms: u64,
    pub default_timeout_ms: u64,
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        Self {
            weights: ComplexityWeights::default(),
            levels: LevelThresholds::default(),
            recommendations: RecommendationThresholds::default(),
            max_complexity_score: 50.0,
            max_document_length: 10_000,
            ms_per_score_point: 100.0,
            max_estimated_time_ms: 15_000,
            default_timeout_ms: 10_000,
        }
    }
}

/// Debounce and watchdog timing. These defaults are empirical tuning,
/// not correctness constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub debounce_ms: u64,
    /// Debounce used right after a large deletion.
    pub fast_debounce_ms: u64,
    /// Upper bound on how long a queued trigger may wait behind an in-flight conversion.
    pub max_wait_ms: u64,
    /// Previous input longer than this counts as "large" for deletion detection.
    pub large_input_threshold: usize,
    /// New input shorter than this after a large input counts as a large deletion.
    pub small_input_threshold: usize,
}

impl SchedulerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn fast_debounce(&self) -> Duration {
        Duration::from_millis(self.fast_debounce_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 800,
            fast_debounce_ms: 100,
            max_wait_ms: 15_000,
            large_input_threshold: 1000,
            small_input_threshold: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub timeout_ms: u64,
    pub role: Role,
    pub liveness: Liveness,
    pub priority: Priority,
    pub prefix: Option<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            role: Role::Status,
            liveness: Liveness::Polite,
            priority: Priority::Normal,
            prefix: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Argument set used by the simplified retry when nothing else survives.
    pub baseline_args: String,
    /// Flags preserved (with their values) by the simplified retry.
    pub keep_flags: Vec<String>,
    /// Route timeout failures to the chunked retry as well as memory failures.
    pub chunk_on_timeout: bool,
    pub chunk_max_chars: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            baseline_args: "--from latex --to html5 --mathml".to_string(),
            keep_flags: vec![
                "--from".to_string(),
                "--to".to_string(),
                "--mathml".to_string(),
                "--standalone".to_string(),
            ],
            chunk_on_timeout: false,
            chunk_max_chars: 4000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        use crate::health::names;

        Self {
            required: names::REQUIRED.iter().map(|s| s.to_string()).collect(),
            optional: names::OPTIONAL.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Shell command that reads LaTeX on stdin and writes HTML on stdout.
    pub command: Option<String>,
    pub args: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: "--from latex+raw_tex --to html5 --mathml --standalone --number-sections"
                .to_string(),
        }
    }
}
