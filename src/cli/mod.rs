//! CLI argument parsing for codejudge
//!
//! Global flags: --config, --format, --quiet, --verbose, --log-level, --log-json

pub mod args;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{BatchArgs, CompareArgs, JudgeArgs, ReportArgs};
pub use output::{OutputFormat, ReportFormat};

/// Codejudge - score generated code with an LLM judge and compare variants
#[derive(Parser, Debug)]
#[command(name = "codejudge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ./codejudge.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (human or json)
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Report timing for major phases
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log filter, e.g. `debug` or `codejudge_core=trace`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score one session against one or more rubrics
    Judge(JudgeArgs),

    /// Judge two sessions side by side
    Compare(CompareArgs),

    /// Judge every session below a results root
    Batch(BatchArgs),

    /// Collect score artifacts and write the evaluation report
    Report(ReportArgs),

    /// List available rubrics
    Rubrics,
}
