use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::complexity::ProcessingStrategy;

#[derive(Parser)]
#[command(name = "tex-pilot")]
#[command(
    author,
    version,
    about = "Adaptive LaTeX to HTML conversion orchestrator",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Directory holding config.toml (default: current directory)
    #[arg(long, global = true, env = "TEX_PILOT_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,
}

/// Output format for CLI results.
/// - Text: Human-readable text output (default)
/// - Json: Single JSON object
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a document and show its complexity indicators
    Assess {
        /// LaTeX source file
        file: PathBuf,
    },

    /// Choose a processing strategy for a document
    Strategy {
        /// LaTeX source file
        file: PathBuf,

        /// Override the recommended strategy
        #[arg(long, value_enum)]
        force: Option<StrategyArg>,
    },

    /// Classify a raw engine failure message
    Classify {
        /// Failure text as reported by the engine
        message: String,
    },

    /// Check which collaborators are available
    Health {
        /// Also run the cross-component smoke checks
        #[arg(long)]
        integration: bool,

        /// Leave a collaborator unregistered (repeatable)
        #[arg(long = "without", value_name = "NAME")]
        without: Vec<String>,
    },

    /// Convert a document once, recovering from failures where possible
    Convert {
        /// LaTeX source file
        file: PathBuf,

        /// Write the HTML output here instead of stdout
        #[arg(short = 'O', long = "out")]
        out: Option<PathBuf>,

        /// Engine arguments (default: engine.args from config)
        #[arg(long, allow_hyphen_values = true)]
        args: Option<String>,

        /// Override the recommended strategy
        #[arg(long, value_enum)]
        force: Option<StrategyArg>,
    },

    /// Re-convert a document whenever it changes
    Watch {
        /// LaTeX source file
        file: PathBuf,

        /// Write the HTML output here after each conversion
        #[arg(short = 'O', long = "out")]
        out: Option<PathBuf>,

        /// Poll interval in milliseconds
        #[arg(long, default_value = "250")]
        poll_ms: u64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Write a default config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate config.toml
    Validate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    Standard,
    Chunked,
}

impl From<StrategyArg> for ProcessingStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Standard => Self::Standard,
            StrategyArg::Chunked => Self::Chunked,
        }
    }
}
