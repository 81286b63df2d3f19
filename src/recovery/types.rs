use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sink::SinkDeliveryReport;
use crate::utils::escape_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Memory,
    WebassemblyRuntime,
    Timeout,
    Syntax,
    Network,
    UnknownCommand,
    General,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::WebassemblyRuntime => "webassembly_runtime",
            Self::Timeout => "timeout",
            Self::Syntax => "syntax",
            Self::Network => "network",
            Self::UnknownCommand => "unknown_command",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// User-facing description of one failure. Never carries engine text in `user_message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error_type: ErrorType,
    pub severity: Severity,
    pub recoverable: bool,
    pub user_message: String,
    pub suggestions: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub original_message: String,
}

impl ErrorReport {
    /// Short single-line form for status indicators.
    pub fn status_line(&self) -> String {
        format!("Conversion failed ({}): {}", self.error_type, self.user_message)
    }

    /// Replacement content for the output display.
    pub fn to_display_html(&self) -> String {
        let mut html = format!(
            "<div class=\"conversion-error\" role=\"alert\" \
             data-error-type=\"{}\" data-severity=\"{}\">\n  <p>{}</p>\n",
            self.error_type,
            self.severity,
            escape_html(&self.user_message)
        );
        if !self.suggestions.is_empty() {
            html.push_str("  <ul>\n");
            for suggestion in &self.suggestions {
                html.push_str(&format!("    <li>{}</li>\n", escape_html(suggestion)));
            }
            html.push_str("  </ul>\n");
        }
        html.push_str("</div>");
        html
    }
}

/// Retry path taken by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPath {
    Chunked,
    Simplified,
}

impl std::fmt::Display for RecoveryPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chunked => write!(f, "chunked"),
            Self::Simplified => write!(f, "simplified"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RecoveryOutcome {
    Recovered {
        output: String,
        path: RecoveryPath,
    },
    Reported {
        report: ErrorReport,
        delivery: SinkDeliveryReport,
    },
}

impl RecoveryOutcome {
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }

    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Recovered { output, .. } => Some(output),
            Self::Reported { .. } => None,
        }
    }

    pub fn report(&self) -> Option<&ErrorReport> {
        match self {
            Self::Recovered { .. } => None,
            Self::Reported { report, .. } => Some(report),
        }
    }
}

/// Fast-path signatures checked independently of classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureSignature {
    pub memory: bool,
    pub runtime: bool,
    pub timeout: bool,
}
