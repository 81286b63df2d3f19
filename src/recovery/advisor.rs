use chrono::Utc;

use super::types::{ErrorReport, ErrorType, Severity};
use crate::error::TexPilotError;

/// One row of the classification table.
struct ClassificationRule {
    error_type: ErrorType,
    severity: Severity,
    recoverable: bool,
    phrases: &'static [&'static str],
}

impl ClassificationRule {
    fn matches(&self, lowered: &str) -> bool {
        self.phrases.iter().any(|p| lowered.contains(p))
    }
}

/// Evaluated top-down; first match wins.
const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        error_type: ErrorType::Memory,
        severity: Severity::High,
        recoverable: true,
        phrases: &[
            "out of memory",
            "stack space",
            "stack overflow",
            "memory exhausted",
            "allocation failed",
            "cannot enlarge memory",
        ],
    },
    ClassificationRule {
        error_type: ErrorType::WebassemblyRuntime,
        severity: Severity::Critical,
        recoverable: true,
        phrases: &[
            "webassembly",
            "wasm",
            "runtimeerror",
            "unreachable executed",
            "trap",
            "abort(",
        ],
    },
    ClassificationRule {
        error_type: ErrorType::Timeout,
        severity: Severity::Medium,
        recoverable: true,
        phrases: &["timed out", "timeout", "time limit"],
    },
    ClassificationRule {
        error_type: ErrorType::Syntax,
        severity: Severity::Low,
        recoverable: false,
        phrases: &[
            "syntax error",
            "parse error",
            "error parsing",
            "unexpected end of input",
            "unexpected token",
            "missing $ inserted",
            "unbalanced",
            "runaway argument",
        ],
    },
    ClassificationRule {
        error_type: ErrorType::UnknownCommand,
        severity: Severity::Low,
        recoverable: false,
        phrases: &[
            "unknown command",
            "undefined control sequence",
            "unknown environment",
            "environment undefined",
        ],
    },
    ClassificationRule {
        error_type: ErrorType::Network,
        severity: Severity::Medium,
        recoverable: true,
        phrases: &[
            "network",
            "failed to fetch",
            "fetch failed",
            "failed to load",
            "connection refused",
            "connection reset",
        ],
    },
];

/// Permission or security failures need user action whatever their type.
const NOT_RECOVERABLE_PHRASES: &[&str] = &[
    "permission denied",
    "not permitted",
    "access denied",
    "securityerror",
    "security error",
];

const GENERIC_SUGGESTIONS: &[&str] = &[
    "Try the conversion again",
    "Simplify recent changes and convert again",
    "Reload the page if the problem persists",
];

/// Pure mapping from raw failure text to taxonomy, severity and user-facing text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryAdvisor;

impl RecoveryAdvisor {
    pub fn new() -> Self {
        Self
    }

    fn rule_for(raw_message: &str) -> Option<&'static ClassificationRule> {
        let lowered = raw_message.to_lowercase();
        RULES.iter().find(|rule| rule.matches(&lowered))
    }

    pub fn classify(&self, raw_message: &str) -> ErrorType {
        Self::rule_for(raw_message)
            .map(|r| r.error_type)
            .unwrap_or(ErrorType::General)
    }

    pub fn assess_severity(&self, raw_message: &str) -> Severity {
        Self::rule_for(raw_message)
            .map(|r| r.severity)
            .unwrap_or(Severity::Medium)
    }

    pub fn is_recoverable(&self, raw_message: &str) -> bool {
        let lowered = raw_message.to_lowercase();
        if NOT_RECOVERABLE_PHRASES.iter().any(|p| lowered.contains(p)) {
            return false;
        }
        Self::rule_for(raw_message)
            .map(|r| r.recoverable)
            .unwrap_or(true)
    }

    pub fn build_user_message(&self, raw_message: &str) -> String {
        let message = match self.classify(raw_message) {
            ErrorType::Memory => {
                "The document is too large or complex to convert in one pass: \
                 the converter ran out of memory."
            }
            ErrorType::WebassemblyRuntime => {
                "The conversion engine hit an internal error and had to stop."
            }
            ErrorType::Timeout => "The conversion took too long and was stopped.",
            ErrorType::Syntax => {
                "The LaTeX source contains a syntax error that prevents conversion."
            }
            ErrorType::UnknownCommand => {
                "Unknown LaTeX command: the document uses a command or environment \
                 the converter does not support."
            }
            ErrorType::Network => "A resource needed for conversion could not be loaded.",
            ErrorType::General => "The conversion failed for an unexpected reason.",
        };
        message.to_string()
    }

    pub fn build_suggestions(&self, raw_message: &str) -> Vec<String> {
        let suggestions: &[&str] = match self.classify(raw_message) {
            ErrorType::Memory => &[
                "Split the document into smaller sections",
                "Reduce the number of large matrices and tables",
                "Convert one chapter at a time",
            ],
            ErrorType::WebassemblyRuntime => &[
                "Reload the page to restart the conversion engine",
                "Remove custom packages or advanced extensions",
                "Try a simpler version of the document",
            ],
            ErrorType::Timeout => &[
                "Reduce the size of the document",
                "Split complex equations into smaller parts",
                "Try again once other conversions have finished",
            ],
            ErrorType::Syntax => &[
                "Check that every $ and \\[ has a matching closing delimiter",
                "Check that braces { } are balanced",
                "Check that every \\begin{...} has a matching \\end{...}",
            ],
            ErrorType::UnknownCommand => &[
                "Check the command name for typos",
                "Replace custom macros with standard LaTeX commands",
                "Define the command with \\newcommand before using it",
            ],
            ErrorType::Network => &[
                "Check your internet connection",
                "Reload the page and try again",
            ],
            ErrorType::General => GENERIC_SUGGESTIONS,
        };
        suggestions.iter().map(|s| s.to_string()).collect()
    }

    pub fn build_report(&self, raw_message: &str) -> ErrorReport {
        ErrorReport {
            error_type: self.classify(raw_message),
            severity: self.assess_severity(raw_message),
            recoverable: self.is_recoverable(raw_message),
            user_message: self.build_user_message(raw_message),
            suggestions: self.build_suggestions(raw_message),
            timestamp: Utc::now(),
            original_message: raw_message.to_string(),
        }
    }

    pub fn report_for(&self, error: &TexPilotError) -> ErrorReport {
        self.build_report(&error.raw_message())
    }
}
