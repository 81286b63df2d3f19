//! Document complexity assessment and processing strategy selection.
//!
//! - `DocumentIndicators`: structural counts extracted from LaTeX source
//! - `ComplexityAssessor`: weighted scoring, level mapping, chunking decision
//! - `StrategySelection`: assessment plus caller override, recommendations and reasoning

mod assessor;
mod indicators;
mod strategy;

pub use assessor::{ComplexityAssessment, ComplexityAssessor, ComplexityLevel, ProcessingStrategy};
pub use indicators::DocumentIndicators;
pub use strategy::{Recommendation, StrategyPreferences, StrategySelection};
