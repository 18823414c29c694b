//! Per-command arguments

use clap::Args;
use std::path::PathBuf;

use super::output::ReportFormat;

#[derive(Args, Debug, Clone)]
pub struct JudgeArgs {
    /// Session directory to judge
    pub session: PathBuf,

    /// Rubric name or path (repeatable)
    #[arg(long = "rubric", short, required = true)]
    pub rubrics: Vec<String>,

    /// Task description shown to the judge
    #[arg(long)]
    pub context: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// First session (the baseline with --baseline)
    pub session_a: PathBuf,

    /// Second session (the framework with --baseline)
    pub session_b: PathBuf,

    /// Rubric name or path
    #[arg(long, short)]
    pub rubric: String,

    /// Results root the comparison artifact is written under
    #[arg(long)]
    pub results: PathBuf,

    /// Judge the second session relative to the first as a baseline
    #[arg(long)]
    pub baseline: bool,

    /// Task description shown to the judge
    #[arg(long)]
    pub context: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// Results root holding session directories
    pub results_root: PathBuf,

    /// Rubric name or path (repeatable)
    #[arg(long = "rubric", short, required = true)]
    pub rubrics: Vec<String>,

    /// Maximum concurrent judging calls (overrides config)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Skip sessions that already have a score for the rubric
    #[arg(long)]
    pub skip_existing: bool,

    /// Task description shown to the judge
    #[arg(long)]
    pub context: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Results root to collect from
    pub results_root: PathBuf,

    /// Report files to write
    #[arg(long, value_enum, default_value = "both")]
    pub output: ReportFormat,

    /// Significance level (overrides config)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Treatment variant (requires --control)
    #[arg(long, requires = "control")]
    pub treatment: Option<String>,

    /// Control variant (requires --treatment)
    #[arg(long, requires = "treatment")]
    pub control: Option<String>,

    /// Print the report to stdout instead of writing files
    #[arg(long)]
    pub stdout: bool,
}
