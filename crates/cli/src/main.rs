//! JetSim CLI
//!
//! Evaluates generated jet samples of challenge submissions against the
//! reference datasets.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use jetsim_cli::commands::{evaluate, validate, CommandContext};
use jetsim_cli::output::OutputFormat;
use jetsim_common::{init_tracing, EvalConfig};
use jetsim_domain::EfpCacheLayout;
use jetsim_evaluation::SubmissionSelector;

/// Output format for CLI commands
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum CliOutputFormat {
    /// JSON output
    Json,
    /// Table output (default)
    #[default]
    Table,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Table => OutputFormat::Table,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "jetsim")]
#[command(author, version, about = "JetSim challenge evaluator")]
#[command(long_about = "Evaluates generated particle-jet samples of challenge submissions.\n\n\
    Without --evaluate, submissions are only loaded and their declared samples listed.")]
struct Cli {
    /// Directory holding the reference datasets
    #[arg(long, value_name = "DIR")]
    real_datasets_dir: Option<PathBuf>,

    /// Directory receiving the generated samples
    #[arg(long, value_name = "DIR")]
    gen_datasets_dir: Option<PathBuf>,

    /// Directory holding one subdirectory per submission
    #[arg(long, value_name = "DIR")]
    submission_dir: Option<PathBuf>,

    /// Directory receiving evaluation reports
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Submission name, or "all" for every submission
    #[arg(long, value_name = "NAME")]
    submission: String,

    /// Evaluate the loaded submissions
    #[arg(long, overrides_with = "no_evaluate")]
    evaluate: bool,

    /// Only load and validate submissions (default)
    #[arg(long, overrides_with = "evaluate")]
    no_evaluate: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "table")]
    format: CliOutputFormat,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Re-download generated samples that are already on disk
    #[arg(long)]
    overwrite: bool,

    /// Name EFP caches `<data_class>_efps.npy`
    #[arg(long)]
    legacy_efp_cache: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON
    #[arg(long)]
    json_logs: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    /// Flags take precedence over every configuration source
    fn apply_overrides(&self, config: &mut EvalConfig) {
        if let Some(dir) = &self.real_datasets_dir {
            config.paths.real_datasets_dir = dir.clone();
        }
        if let Some(dir) = &self.gen_datasets_dir {
            config.paths.gen_datasets_dir = dir.clone();
        }
        if let Some(dir) = &self.submission_dir {
            config.paths.submission_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.paths.output_dir = dir.clone();
        }
        if self.legacy_efp_cache {
            config.evaluation.efp_cache_layout = EfpCacheLayout::Legacy;
        }
        if self.verbose {
            config.telemetry.log_level = "debug".to_string();
        }
        if self.json_logs {
            config.telemetry.json_logging = true;
            config.evaluation.show_progress = false;
        }
    }

    fn should_evaluate(&self) -> bool {
        self.evaluate && !self.no_evaluate
    }
}

async fn run(cli: &Cli) -> Result<bool> {
    let mut config = EvalConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    init_tracing(config.telemetry.json_logging, &config.telemetry.log_level)?;

    let ctx = CommandContext::new(config, cli.format.into(), cli.overwrite);
    let selector = SubmissionSelector::parse(&cli.submission);

    if cli.should_evaluate() {
        evaluate::run(&ctx, &selector).await
    } else {
        validate::run(&ctx, &selector)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup colored output
    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(&cli).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            if cli.verbose {
                eprintln!("\n{}", "Backtrace:".dimmed());
                eprintln!("{:?}", e);
            }
            std::process::exit(1);
        }
    }
}
