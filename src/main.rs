use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tex_pilot::cli::{Cli, Commands, ConfigAction, Display, OutputFormat, StrategyArg};
use tex_pilot::complexity::{ComplexityAssessor, StrategyPreferences};
use tex_pilot::config::{CONFIG_FILE_NAME, TexPilotConfig};
use tex_pilot::conversion::ConversionStatus;
use tex_pilot::error::{Result, TexPilotError};
use tex_pilot::host::{Host, HostOptions};
use tex_pilot::recovery::RecoveryAdvisor;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            Display::new().print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tex_pilot=debug")
    } else {
        EnvFilter::new("tex_pilot=info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let display = Display::new();
    let format = cli.output;
    let config_dir = cli.config_dir.unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Assess { file } => {
            let config = TexPilotConfig::load(&config_dir).await?;
            cmd_assess(&display, format, &config, &file).await
        }
        Commands::Strategy { file, force } => {
            let config = TexPilotConfig::load(&config_dir).await?;
            cmd_strategy(&display, format, &config, &file, force).await
        }
        Commands::Classify { message } => cmd_classify(&display, format, &message),
        Commands::Health {
            integration,
            without,
        } => {
            let config = TexPilotConfig::load(&config_dir).await?;
            cmd_health(&display, format, config, integration, without).await
        }
        Commands::Convert {
            file,
            out,
            args,
            force,
        } => {
            let config = TexPilotConfig::load(&config_dir).await?;
            cmd_convert(&display, format, config, &file, out.as_deref(), args, force).await
        }
        Commands::Watch { file, out, poll_ms } => {
            let config = TexPilotConfig::load(&config_dir).await?;
            cmd_watch(&display, config, &file, out.as_deref(), poll_ms).await
        }
        Commands::Config { action } => cmd_config(&display, &config_dir, action).await,
    }
}

async fn cmd_assess(
    display: &Display,
    format: OutputFormat,
    config: &TexPilotConfig,
    file: &Path,
) -> Result<ExitCode> {
    let bytes = tokio::fs::read(file).await?;
    let assessment = ComplexityAssessor::new(config.complexity.clone()).assess_bytes(&bytes);

    match format {
        OutputFormat::Json => print_json(&assessment)?,
        OutputFormat::Text => display.print_assessment(&assessment),
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_strategy(
    display: &Display,
    format: OutputFormat,
    config: &TexPilotConfig,
    file: &Path,
    force: Option<StrategyArg>,
) -> Result<ExitCode> {
    let content = tokio::fs::read_to_string(file).await?;
    let preferences = StrategyPreferences {
        force_strategy: force.map(Into::into),
    };
    let selection =
        ComplexityAssessor::new(config.complexity.clone()).select_strategy(&content, &preferences);

    match format {
        OutputFormat::Json => print_json(&selection)?,
        OutputFormat::Text => display.print_selection(&selection),
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_classify(display: &Display, format: OutputFormat, message: &str) -> Result<ExitCode> {
    let report = RecoveryAdvisor::new().build_report(message);

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => display.print_report(&report),
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_health(
    display: &Display,
    format: OutputFormat,
    config: TexPilotConfig,
    integration: bool,
    without: Vec<String>,
) -> Result<ExitCode> {
    let mut options = HostOptions::from_config(&config);
    options.disabled = without;
    let host = Host::new(config, options);

    let snapshot = host.monitor().validate();
    let integration = if integration {
        Some(host.monitor().check_integration().await)
    } else {
        None
    };
    let success = snapshot.is_healthy() && integration.as_ref().is_none_or(|r| r.success);

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "health": snapshot,
            "integration": integration,
        }))?,
        OutputFormat::Text => {
            display.print_health(&snapshot);
            if let Some(result) = &integration {
                display.print_integration(result);
            }
        }
    }
    Ok(exit_code(success))
}

async fn cmd_convert(
    display: &Display,
    format: OutputFormat,
    config: TexPilotConfig,
    file: &Path,
    out: Option<&Path>,
    args: Option<String>,
    force: Option<StrategyArg>,
) -> Result<ExitCode> {
    if config.engine.command.is_none() {
        return Err(TexPilotError::Config(format!(
            "engine.command must be set in {} to convert",
            CONFIG_FILE_NAME
        )));
    }
    let content = tokio::fs::read_to_string(file).await?;

    let mut options = HostOptions::from_config(&config);
    options.preferences = StrategyPreferences {
        force_strategy: force.map(Into::into),
    };
    let host = Host::new(config, options);
    if let Some(args) = args {
        host.pipeline().set_args(args);
    }

    let spinner = (format == OutputFormat::Text && out.is_some())
        .then(|| display.create_spinner(&format!("Converting {}", file.display())));
    let record = host.convert_now(content).await?;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let output = host.presentation().output();
    match out {
        Some(path) => tokio::fs::write(path, &output).await?,
        None if format == OutputFormat::Text => println!("{}", output),
        None => {}
    }

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "record": record,
            "output": output,
        }))?,
        OutputFormat::Text => {
            if out.is_some() {
                display.print_record(&record);
            }
            if let ConversionStatus::Failed { report } = &record.status {
                for (i, suggestion) in report.suggestions.iter().enumerate() {
                    eprintln!("  {}. {}", i + 1, suggestion);
                }
            }
        }
    }
    Ok(exit_code(record.is_success()))
}

/// Tracks the watched file's read failures so each one is reported once.
#[derive(Debug, Default)]
struct ReadErrors {
    current: Option<std::io::ErrorKind>,
}

impl ReadErrors {
    /// Returns true when this failure differs from the one already reported.
    fn failed(&mut self, kind: std::io::ErrorKind) -> bool {
        self.current.replace(kind) != Some(kind)
    }

    /// Returns true when a read succeeds after a reported failure.
    fn recovered(&mut self) -> bool {
        self.current.take().is_some()
    }
}

async fn cmd_watch(
    display: &Display,
    config: TexPilotConfig,
    file: &Path,
    out: Option<&Path>,
    poll_ms: u64,
) -> Result<ExitCode> {
    if config.engine.command.is_none() {
        return Err(TexPilotError::Config(format!(
            "engine.command must be set in {} to watch",
            CONFIG_FILE_NAME
        )));
    }
    let host = Host::from_config(config);
    let snapshot = host.monitor().validate();
    if !snapshot.is_healthy() {
        display.print_warning(&format!(
            "Running degraded: missing {}",
            snapshot.summary.critical_failures.join(", ")
        ));
    }

    display.print_info(&format!(
        "Watching {} (Ctrl-C to stop)",
        file.display()
    ));
    let mut interval = tokio::time::interval(Duration::from_millis(poll_ms.max(10)));
    let mut last_content: Option<String> = None;
    let mut reported = 0u64;
    let mut read_errors = ReadErrors::default();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = interval.tick() => {}
        }

        match tokio::fs::read_to_string(file).await {
            Ok(content) => {
                if read_errors.recovered() {
                    display.print_info(&format!("{} is readable again", file.display()));
                }
                if last_content.as_deref() != Some(content.as_str()) {
                    host.submit(content.clone());
                    last_content = Some(content);
                }
            }
            Err(e) => {
                if read_errors.failed(e.kind()) {
                    display.print_warning(&format!("Cannot read {}: {}", file.display(), e));
                }
            }
        }

        let stats = host.scheduler().stats();
        if stats.conversions_started > reported && !host.scheduler().snapshot().in_progress {
            reported = stats.conversions_started;
            if let Some(record) = host.pipeline().last_record() {
                display.print_record(&record);
            }
            if let Some(path) = out {
                tokio::fs::write(path, host.presentation().output()).await?;
            }
        }
    }

    host.scheduler().force_reset();
    display.print_stats(&host.scheduler().stats());
    Ok(ExitCode::SUCCESS)
}

async fn cmd_config(
    display: &Display,
    config_dir: &Path,
    action: ConfigAction,
) -> Result<ExitCode> {
    match action {
        ConfigAction::Show => {
            let config = TexPilotConfig::load(config_dir).await?;
            let content =
                toml::to_string_pretty(&config).map_err(|e| TexPilotError::Config(e.to_string()))?;
            println!("{}", content);
        }
        ConfigAction::Init { force } => {
            let path = config_dir.join(CONFIG_FILE_NAME);
            if path.exists() && !force {
                return Err(TexPilotError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            TexPilotConfig::default().save(config_dir).await?;
            display.print_success(&format!("Wrote {}", path.display()));
        }
        ConfigAction::Validate => {
            TexPilotConfig::load(config_dir).await?;
            display.print_success("Configuration is valid");
        }
    }
    Ok(ExitCode::SUCCESS)
}
