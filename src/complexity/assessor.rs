use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::indicators::DocumentIndicators;
use super::strategy::{Recommendation, StrategyPreferences, StrategySelection};
use crate::config::ComplexityConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    /// Fallback for empty or unreadable input.
    Unknown,
    Basic,
    Intermediate,
    Advanced,
    Complex,
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Basic => write!(f, "basic"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStrategy {
    Standard,
    Chunked,
}

impl std::fmt::Display for ProcessingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Chunked => write!(f, "chunked"),
        }
    }
}

/// Immutable result of scoring one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityAssessment {
    pub score: f64,
    pub level: ComplexityLevel,
    pub requires_chunking: bool,
    pub indicators: DocumentIndicators,
    pub estimated_processing_time_ms: u64,
    /// `max(estimated_processing_time_ms, default_timeout_ms)`.
    pub timeout_ms: u64,
    pub strategy: ProcessingStrategy,
    pub forced_by_user: bool,
}

impl ComplexityAssessment {
    fn fallback(default_timeout_ms: u64) -> Self {
        Self {
            score: 0.0,
            level: ComplexityLevel::Unknown,
            requires_chunking: false,
            indicators: DocumentIndicators::default(),
            estimated_processing_time_ms: 0,
            timeout_ms: default_timeout_ms,
            strategy: ProcessingStrategy::Standard,
            forced_by_user: false,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.level == ComplexityLevel::Unknown
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Scores LaTeX source and recommends a processing strategy. Performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct ComplexityAssessor {
    config: ComplexityConfig,
}

impl ComplexityAssessor {
    pub fn new(config: ComplexityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComplexityConfig {
        &self.config
    }

    pub fn assess(&self, content: &str) -> ComplexityAssessment {
        if content.trim().is_empty() {
            return ComplexityAssessment::fallback(self.config.default_timeout_ms);
        }

        let indicators = DocumentIndicators::extract(content);
        let score = self.score(&indicators);
        let level = self.level_for(score);
        let requires_chunking = score > self.config.max_complexity_score
            || indicators.length > self.config.max_document_length;

        let estimated_processing_time_ms = (score * self.config.ms_per_score_point)
            .min(self.config.max_estimated_time_ms as f64)
            .max(0.0) as u64;
        let timeout_ms = estimated_processing_time_ms.max(self.config.default_timeout_ms);

        let strategy = if requires_chunking {
            ProcessingStrategy::Chunked
        } else {
            ProcessingStrategy::Standard
        };

        debug!(score, %level, requires_chunking, %strategy, "Assessed document complexity");

        ComplexityAssessment {
            score,
            level,
            requires_chunking,
            indicators,
            estimated_processing_time_ms,
            timeout_ms,
            strategy,
            forced_by_user: false,
        }
    }

    /// Assess raw bytes. Input that is not valid UTF-8 yields the fallback assessment.
    pub fn assess_bytes(&self, bytes: &[u8]) -> ComplexityAssessment {
        match std::str::from_utf8(bytes) {
            Ok(content) => self.assess(content),
            Err(e) => {
                debug!(error = %e, "Input is not valid UTF-8, using fallback assessment");
                ComplexityAssessment::fallback(self.config.default_timeout_ms)
            }
        }
    }

    pub fn score(&self, ind: &DocumentIndicators) -> f64 {
        let w = &self.config.weights;
        ind.equations as f64 * w.equations
            + ind.display_math as f64 * w.display_math
            + ind.matrices as f64 * w.matrices
            + ind.environments as f64 * w.environments
            + ind.sections as f64 * w.sections
            + ind.tables as f64 * w.tables
            + ind.figures as f64 * w.figures
            + ind.commands as f64 * w.commands
            + (ind.length / w.length_per.max(1)) as f64
            + (ind.line_count / w.lines_per.max(1)) as f64
    }

    pub fn level_for(&self, score: f64) -> ComplexityLevel {
        let levels = &self.config.levels;
        if score < levels.basic_below {
            ComplexityLevel::Basic
        } else if score < levels.intermediate_below {
            ComplexityLevel::Intermediate
        } else if score < levels.advanced_below {
            ComplexityLevel::Advanced
        } else {
            ComplexityLevel::Complex
        }
    }

    pub fn select_strategy(
        &self,
        content: &str,
        preferences: &StrategyPreferences,
    ) -> StrategySelection {
        let mut assessment = self.assess(content);

        if let Some(forced) = preferences.force_strategy {
            assessment.forced_by_user = true;
            assessment.strategy = forced;
        }

        let recommendations = self.recommendations(&assessment.indicators);
        let reasoning = self.reasoning(&assessment);

        StrategySelection {
            assessment,
            recommendations,
            reasoning,
        }
    }

    fn recommendations(&self, ind: &DocumentIndicators) -> Vec<Recommendation> {
        let thresholds = &self.config.recommendations;
        let mut recs = Vec::new();

        if ind.matrices > thresholds.matrix_heavy {
            recs.push(Recommendation::MatrixHeavy {
                count: ind.matrices,
            });
        }
        if ind.sections > thresholds.section_heavy {
            recs.push(Recommendation::SectionHeavy {
                count: ind.sections,
            });
        }
        if ind.environments > thresholds.environment_heavy {
            recs.push(Recommendation::EnvironmentHeavy {
                count: ind.environments,
            });
        }
        if ind.length > self.config.max_document_length {
            recs.push(Recommendation::Oversized {
                length: ind.length,
                limit: self.config.max_document_length,
            });
        }

        recs
    }

    fn reasoning(&self, assessment: &ComplexityAssessment) -> String {
        if assessment.is_fallback() {
            return format!(
                "empty or unreadable input: {} processing",
                assessment.strategy
            );
        }

        let score_cmp = if assessment.score > self.config.max_complexity_score {
            "exceeds"
        } else {
            "within"
        };
        let length_cmp = if assessment.indicators.length > self.config.max_document_length {
            "exceeds"
        } else {
            "within"
        };

        let mut reasoning = format!(
            "score {:.1} {} threshold {:.1}; length {} {} limit {}; {} processing",
            assessment.score,
            score_cmp,
            self.config.max_complexity_score,
            assessment.indicators.length,
            length_cmp,
            self.config.max_document_length,
            assessment.strategy,
        );
        if assessment.forced_by_user {
            reasoning.push_str(" (forced by user preference)");
        }
        reasoning
    }
}
