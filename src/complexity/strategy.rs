use serde::{Deserialize, Serialize};

use super::assessor::{ComplexityAssessment, ProcessingStrategy};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyPreferences {
    pub force_strategy: Option<ProcessingStrategy>,
}

impl StrategyPreferences {
    pub fn forced(strategy: ProcessingStrategy) -> Self {
        Self {
            force_strategy: Some(strategy),
        }
    }
}

/// Qualitative hint derived from indicator counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    MatrixHeavy { count: usize },
    SectionHeavy { count: usize },
    EnvironmentHeavy { count: usize },
    Oversized { length: usize, limit: usize },
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MatrixHeavy { count } => write!(
                f,
                "{} matrix environments: consider splitting large matrices across sections",
                count
            ),
            Self::SectionHeavy { count } => write!(
                f,
                "{} sections: section boundaries make good chunk points",
                count
            ),
            Self::EnvironmentHeavy { count } => write!(
                f,
                "{} environments: nested environments increase engine memory use",
                count
            ),
            Self::Oversized { length, limit } => write!(
                f,
                "{} characters exceeds the {} character limit for single-pass conversion",
                length, limit
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySelection {
    pub assessment: ComplexityAssessment,
    pub recommendations: Vec<Recommendation>,
    pub reasoning: String,
}

impl StrategySelection {
    pub fn strategy(&self) -> ProcessingStrategy {
        self.assessment.strategy
    }
}
