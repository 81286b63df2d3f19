use console::{Style, style};
use indicatif::{ProgressBar, ProgressStyle};

use crate::complexity::{ComplexityAssessment, ComplexityLevel, StrategySelection};
use crate::conversion::{ConversionRecord, ConversionStatus};
use crate::health::{CheckOutcome, HealthSnapshot, IntegrationResult, ModuleStatus};
use crate::recovery::{ErrorReport, Severity};
use crate::scheduler::SchedulerStats;
use crate::utils::{excerpt, format_percentage};

const MAX_ORIGINAL_CHARS: usize = 120;

pub struct Display;

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl Display {
    pub fn new() -> Self {
        Self
    }

    pub fn print_header(&self, text: &str) {
        println!();
        println!("{}", style(text).bold().cyan());
        println!("{}", style("═".repeat(60)).dim());
        println!();
    }

    fn level_style(&self, level: ComplexityLevel) -> Style {
        match level {
            ComplexityLevel::Unknown => Style::new().dim(),
            ComplexityLevel::Basic => Style::new().green(),
            ComplexityLevel::Intermediate => Style::new().cyan(),
            ComplexityLevel::Advanced => Style::new().yellow(),
            ComplexityLevel::Complex => Style::new().red().bold(),
        }
    }

    fn severity_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Low => Style::new().cyan(),
            Severity::Medium => Style::new().yellow(),
            Severity::High => Style::new().red(),
            Severity::Critical => Style::new().red().bold(),
        }
    }

    pub fn print_assessment(&self, assessment: &ComplexityAssessment) {
        self.print_header("Complexity Assessment");

        println!(
            "Level:     {}",
            self.level_style(assessment.level)
                .apply_to(assessment.level.to_string())
        );
        println!("Score:     {:.1}", assessment.score);
        println!("Strategy:  {}", assessment.strategy);
        println!(
            "Chunking:  {}",
            if assessment.requires_chunking {
                style("required").yellow()
            } else {
                style("not required").green()
            }
        );
        println!(
            "Estimate:  {} ms (timeout {} ms)",
            assessment.estimated_processing_time_ms, assessment.timeout_ms
        );
        println!();

        println!("{}", style("Indicators:").bold());
        for (name, count) in assessment.indicators.as_map() {
            println!("  {:<14} {}", name, count);
        }
    }

    pub fn print_selection(&self, selection: &StrategySelection) {
        let assessment = &selection.assessment;
        let forced = if assessment.forced_by_user {
            style(" (forced)").dim().to_string()
        } else {
            String::new()
        };
        println!(
            "{} {}{}",
            style("Strategy:").bold(),
            style(assessment.strategy.to_string()).cyan().bold(),
            forced
        );
        println!(
            "{} {}",
            style("Level:").bold(),
            self.level_style(assessment.level)
                .apply_to(assessment.level.to_string())
        );
        println!("{} {}", style("Reasoning:").bold(), selection.reasoning);

        if !selection.recommendations.is_empty() {
            println!();
            println!("{}", style("Recommendations:").bold());
            for rec in &selection.recommendations {
                println!("  {} {}", style("→").cyan(), rec);
            }
        }
    }

    pub fn print_report(&self, report: &ErrorReport) {
        println!(
            "{} {} [{}]",
            style("Error:").bold(),
            report.error_type,
            self.severity_style(report.severity)
                .apply_to(report.severity.to_string())
        );
        println!(
            "{} {}",
            style("Recoverable:").bold(),
            if report.recoverable { "yes" } else { "no" }
        );
        println!("{}", report.user_message);

        if !report.suggestions.is_empty() {
            println!();
            println!("{}", style("Suggestions:").bold());
            for (i, suggestion) in report.suggestions.iter().enumerate() {
                println!("  {}. {}", i + 1, suggestion);
            }
        }

        println!();
        println!(
            "{}",
            style(format!(
                "Engine said: {}",
                excerpt(&report.original_message, MAX_ORIGINAL_CHARS)
            ))
            .dim()
        );
    }

    pub fn print_health(&self, snapshot: &HealthSnapshot) {
        self.print_header("Dependency Health");

        for module in &snapshot.modules {
            let marker = match module.status {
                ModuleStatus::Loaded => style("✓").green(),
                ModuleStatus::Missing if module.required => style("✗").red().bold(),
                ModuleStatus::Missing => style("-").yellow(),
                ModuleStatus::Error => style("!").red().bold(),
            };
            let kind = if module.required { "required" } else { "optional" };
            print!(
                "  {} {:<24} {}",
                marker,
                module.name,
                style(kind).dim()
            );
            if let Some(error) = &module.error {
                print!("  {}", style(error).red());
            }
            println!();
        }
        println!();

        let summary = &snapshot.summary;
        println!(
            "Required: {}/{} ({})",
            summary.required_available,
            summary.required_total,
            format_percentage(summary.required_health_percentage)
        );
        println!(
            "Optional: {}/{} ({})",
            summary.optional_available,
            summary.optional_total,
            format_percentage(summary.optional_health_percentage)
        );

        if summary.healthy {
            self.print_success("Healthy");
        } else {
            self.print_error(&format!(
                "Degraded: missing required {}",
                summary.critical_failures.join(", ")
            ));
        }
    }

    pub fn print_integration(&self, result: &IntegrationResult) {
        println!();
        println!("{}", style("Integration checks:").bold());
        for check in &result.checks {
            let marker = match check.outcome {
                CheckOutcome::Passed => style("✓").green(),
                CheckOutcome::Failed => style("✗").red().bold(),
                CheckOutcome::Skipped => style("-").dim(),
            };
            println!("  {} {:<28} {}", marker, check.name, style(&check.detail).dim());
        }
        println!(
            "{} passed, {} failed, {} skipped",
            result.passed, result.failed, result.skipped
        );
    }

    pub fn print_record(&self, record: &ConversionRecord) {
        match &record.status {
            ConversionStatus::Succeeded => self.print_success(&format!(
                "Converted ({} strategy, {} level) in {} ms",
                record.strategy, record.level, record.elapsed_ms
            )),
            ConversionStatus::Recovered { path } => self.print_warning(&format!(
                "Converted after {} retry in {} ms",
                path, record.elapsed_ms
            )),
            ConversionStatus::Failed { report } => {
                self.print_error(&report.status_line());
            }
            ConversionStatus::Skipped => self.print_info("Input is empty, nothing to convert"),
        }
    }

    pub fn print_stats(&self, stats: &SchedulerStats) {
        println!(
            "{}",
            style(format!(
                "triggers={} conversions={} failed={} reschedules={} watchdog_resets={} cleared={}",
                stats.triggers,
                stats.conversions_started,
                stats.conversions_failed,
                stats.reschedules,
                stats.watchdog_resets,
                stats.fast_path_clears
            ))
            .dim()
        );
    }

    pub fn print_success(&self, message: &str) {
        println!("{} {}", style("✓").green().bold(), message);
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red().bold(), message);
    }

    pub fn print_warning(&self, message: &str) {
        println!("{} {}", style("!").yellow().bold(), message);
    }

    pub fn print_info(&self, message: &str) {
        println!("{} {}", style("→").cyan(), message);
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("static template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        pb
    }
}
