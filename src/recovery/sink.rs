use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::ErrorReport;
use crate::conversion::Presentation;
use crate::error::{Result, TexPilotError};
use crate::notification::{AccessibilityNotifier, AnnouncementOptions, Liveness, Priority, Role};

/// Destination for a terminal failure report.
#[async_trait]
pub trait ReportSink: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, report: &ErrorReport) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkFailure {
    pub sink: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkDeliveryReport {
    pub delivered: Vec<String>,
    pub failures: Vec<SinkFailure>,
}

impl SinkDeliveryReport {
    pub fn all_delivered(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered list of sinks, each invoked regardless of earlier failures.
#[derive(Clone, Default)]
pub struct ReportSinks {
    sinks: Vec<Arc<dyn ReportSink>>,
}

impl ReportSinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output replacement, status indicator and screen-reader announcement, in that order.
    pub fn standard(
        presentation: Arc<dyn Presentation>,
        notifier: Option<Arc<AccessibilityNotifier>>,
    ) -> Self {
        let mut sinks = Self::new()
            .with(Arc::new(OutputSink::new(Arc::clone(&presentation))))
            .with(Arc::new(StatusSink::new(presentation)));
        if let Some(notifier) = notifier {
            sinks.push(Arc::new(AnnouncementSink::new(notifier)));
        }
        sinks
    }

    pub fn with(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn push(&mut self, sink: Arc<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub async fn deliver_all(&self, report: &ErrorReport) -> SinkDeliveryReport {
        let mut delivery = SinkDeliveryReport::default();

        for sink in &self.sinks {
            match sink.deliver(report).await {
                Ok(()) => {
                    debug!(sink = sink.name(), "Report delivered");
                    delivery.delivered.push(sink.name().to_string());
                }
                Err(e) => {
                    warn!(sink = sink.name(), error = %e, "Report sink failed");
                    delivery.failures.push(SinkFailure {
                        sink: sink.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        delivery
    }
}

pub struct OutputSink {
    presentation: Arc<dyn Presentation>,
}

impl OutputSink {
    pub fn new(presentation: Arc<dyn Presentation>) -> Self {
        Self { presentation }
    }
}

#[async_trait]
impl ReportSink for OutputSink {
    fn name(&self) -> &str {
        "output"
    }

    async fn deliver(&self, report: &ErrorReport) -> Result<()> {
        self.presentation
            .set_output_display(&report.to_display_html())
    }
}

pub struct StatusSink {
    presentation: Arc<dyn Presentation>,
}

impl StatusSink {
    pub fn new(presentation: Arc<dyn Presentation>) -> Self {
        Self { presentation }
    }
}

#[async_trait]
impl ReportSink for StatusSink {
    fn name(&self) -> &str {
        "status"
    }

    async fn deliver(&self, report: &ErrorReport) -> Result<()> {
        self.presentation.set_status(&report.status_line())
    }
}

pub struct AnnouncementSink {
    notifier: Arc<AccessibilityNotifier>,
}

impl AnnouncementSink {
    pub fn new(notifier: Arc<AccessibilityNotifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl ReportSink for AnnouncementSink {
    fn name(&self) -> &str {
        "announcement"
    }

    async fn deliver(&self, report: &ErrorReport) -> Result<()> {
        let options = AnnouncementOptions {
            role: Some(Role::Alert),
            liveness: Some(Liveness::Assertive),
            priority: Some(Priority::High),
            prefix: Some("Conversion error".to_string()),
            ..Default::default()
        };
        if self.notifier.announce(&report.user_message, &options).await {
            Ok(())
        } else {
            Err(TexPilotError::Announcement(
                "announcement was rejected".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::RecoveryAdvisor;

    struct FailingSink;

    #[async_trait]
    impl ReportSink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        async fn deliver(&self, _report: &ErrorReport) -> Result<()> {
            Err(TexPilotError::Presentation("display detached".to_string()))
        }
    }

    struct CountingSink(parking_lot::Mutex<usize>);

    #[async_trait]
    impl ReportSink for CountingSink {
        fn name(&self) -> &str {
            "counting"
        }

        async fn deliver(&self, _report: &ErrorReport) -> Result<()> {
            *self.0.lock() += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_sinks() {
        let counting = Arc::new(CountingSink(parking_lot::Mutex::new(0)));
        let sinks = ReportSinks::new()
            .with(Arc::new(FailingSink))
            .with(counting.clone());

        let report = RecoveryAdvisor::new().build_report("syntax error");
        let delivery = sinks.deliver_all(&report).await;

        assert_eq!(*counting.0.lock(), 1);
        assert_eq!(delivery.delivered, vec!["counting".to_string()]);
        assert_eq!(delivery.failures.len(), 1);
        assert_eq!(delivery.failures[0].sink, "failing");
        assert!(delivery.failures[0].error.contains("display detached"));
        assert!(!delivery.all_delivered());
    }
}
