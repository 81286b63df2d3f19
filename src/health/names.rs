//! Collaborator names known to the health monitor.

pub const CONVERSION_ORCHESTRATOR: &str = "ConversionOrchestrator";
pub const STATE_MANAGER: &str = "StateManager";
pub const EVENT_MANAGER: &str = "EventManager";
pub const ERROR_HANDLER: &str = "ErrorHandler";

pub const CHUNKED_PROCESSOR: &str = "ChunkedProcessor";
pub const SIMPLIFIED_CONVERTER: &str = "SimplifiedConverter";
pub const MEMORY_WATCHDOG: &str = "MemoryWatchdog";
pub const LATEX_PRESERVATION: &str = "LatexPreservation";
pub const PROCESSING_STRATEGY: &str = "ProcessingStrategy";
pub const UTILITIES: &str = "Utilities";
pub const STATUS_INDICATOR: &str = "StatusIndicator";
pub const ACCESSIBILITY_NOTIFIER: &str = "AccessibilityNotifier";

/// Missing entries are critical.
pub const REQUIRED: &[&str] = &[
    CONVERSION_ORCHESTRATOR,
    STATE_MANAGER,
    EVENT_MANAGER,
    ERROR_HANDLER,
];

/// Missing entries are warnings.
pub const OPTIONAL: &[&str] = &[
    CHUNKED_PROCESSOR,
    SIMPLIFIED_CONVERTER,
    MEMORY_WATCHDOG,
    LATEX_PRESERVATION,
    PROCESSING_STRATEGY,
    UTILITIES,
    STATUS_INDICATOR,
    ACCESSIBILITY_NOTIFIER,
];
